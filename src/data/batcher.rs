// ============================================================
// Layer 4 — KT Batcher
// ============================================================
// Implements Burn's Batcher trait to stack a Vec<KtSample> into
// three [batch_size, max_len] integer tensors.
//
// Students answer different numbers of questions, so every
// batch is padded on the right to the length of its longest
// sequence. Padding uses PAD_VALUE (-1), which is never a valid
// feature, concept or answer, so the model can mask it out.
//
//   lengths [3, 5, 2]
//
//   f0 f1 f2 -1 -1
//   f0 f1 f2 f3 f4
//   f0 f1 -1 -1 -1
//
// All three channels are padded at exactly the same positions.
//
// Reference: Burn Book §4 (Batcher)

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::data::dataset::KtSample;

/// Sentinel written into every padded position.
pub const PAD_VALUE: i64 = -1;

// ─── KtBatch ──────────────────────────────────────────────────────────────────
/// A padded batch of students. All tensors have shape
/// [batch_size, max_len] where max_len is the longest sequence
/// in this batch.
#[derive(Debug, Clone)]
pub struct KtBatch<B: Backend> {
    /// Concept × correctness cross-features
    pub features: Tensor<B, 2, Int>,

    /// Dense concept indices
    pub questions: Tensor<B, 2, Int>,

    /// Binary correctness
    pub answers: Tensor<B, 2, Int>,

    /// Unpadded length of each sample
    pub lengths: Vec<usize>,
}

// ─── KtBatcher ────────────────────────────────────────────────────────────────
#[derive(Clone, Debug)]
pub struct KtBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> KtBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }

    fn to_tensor(&self, flat: &[i64], rows: usize, width: usize) -> Tensor<B, 2, Int> {
        Tensor::<B, 1, Int>::from_ints(flat, &self.device).reshape([rows, width])
    }
}

/// Right-pad `sequences` to `width` with PAD_VALUE and flatten
/// row-major. Sequences longer than `width` are not truncated;
/// callers pass the batch maximum.
pub fn pad_flat(sequences: &[&[i64]], width: usize) -> Vec<i64> {
    let mut flat = Vec::with_capacity(sequences.len() * width);
    for seq in sequences {
        flat.extend_from_slice(seq);
        flat.extend(std::iter::repeat(PAD_VALUE).take(width.saturating_sub(seq.len())));
    }
    flat
}

impl<B: Backend> Batcher<KtSample, KtBatch<B>> for KtBatcher<B> {
    fn batch(&self, items: Vec<KtSample>) -> KtBatch<B> {
        let rows    = items.len();
        let lengths: Vec<usize> = items.iter().map(KtSample::seq_len).collect();
        let width   = lengths.iter().copied().max().unwrap_or(0);

        let features:  Vec<&[i64]> = items.iter().map(|s| s.features.as_slice()).collect();
        let questions: Vec<&[i64]> = items.iter().map(|s| s.questions.as_slice()).collect();
        let answers:   Vec<&[i64]> = items.iter().map(|s| s.answers.as_slice()).collect();

        KtBatch {
            features:  self.to_tensor(&pad_flat(&features, width), rows, width),
            questions: self.to_tensor(&pad_flat(&questions, width), rows, width),
            answers:   self.to_tensor(&pad_flat(&answers, width), rows, width),
            lengths,
        }
    }
}
