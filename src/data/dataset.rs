use std::sync::Arc;

use burn::data::dataset::Dataset;
use serde::{Deserialize, Serialize};

use crate::domain::interaction::StudentSequence;

/// One student's three parallel channels, unpadded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KtSample {
    /// Concept crossed with correctness
    pub features:  Vec<i64>,
    /// Dense concept index
    pub questions: Vec<i64>,
    /// 1 = correct, 0 = not correct
    pub answers:   Vec<i64>,
}

impl KtSample {
    pub fn seq_len(&self) -> usize {
        self.features.len()
    }
}

impl From<&StudentSequence> for KtSample {
    fn from(seq: &StudentSequence) -> Self {
        Self {
            features:  seq.features(),
            questions: seq.questions(),
            answers:   seq.answers(),
        }
    }
}

/// All extracted students, indexable by position.
pub struct KtDataset {
    samples: Vec<KtSample>,
}

impl KtDataset {
    pub fn new(samples: Vec<KtSample>) -> Self { Self { samples } }

    pub fn from_sequences(sequences: &[StudentSequence]) -> Self {
        Self::new(sequences.iter().map(KtSample::from).collect())
    }

    pub fn sample_count(&self) -> usize { self.samples.len() }
}

impl Dataset<KtSample> for KtDataset {
    fn get(&self, index: usize) -> Option<KtSample> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}

/// A view over a shared dataset restricted to some indices,
/// e.g. the training split.
pub struct KtSubset {
    source:  Arc<KtDataset>,
    indices: Vec<usize>,
}

impl KtSubset {
    pub fn new(source: Arc<KtDataset>, indices: Vec<usize>) -> Self {
        Self { source, indices }
    }

    /// Positions in the parent dataset, in subset order.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }
}

impl Dataset<KtSample> for KtSubset {
    fn get(&self, index: usize) -> Option<KtSample> {
        self.indices.get(index).and_then(|&i| self.source.get(i))
    }

    fn len(&self) -> usize {
        self.indices.len()
    }
}
