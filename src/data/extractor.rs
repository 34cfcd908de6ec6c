// ============================================================
// Layer 4 — Sequence Extractor
// ============================================================
// Turns the flat interaction log into one sequence per student.
//
// Steps (applied in order):
//   1. Drop rows without a concept id
//   2. Drop students with fewer than 2 remaining rows
//   3. Re-enumerate concept ids densely in sorted id order
//   4. Cross concept index with the response code
//   5. Group by student (sorted student id), keeping log order
//      inside each student
//
// Rows without a student id are dropped together with step 1;
// they cannot be attributed to any sequence.
//
// The result also reports the dimensions the model is built
// with: max sequence length, student count, feature space
// (max cross + 1) and concept space (max concept + 1).

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::data::loader::{is_missing, CsvTable};
use crate::domain::concept::{ConceptUniverse, IdKey};
use crate::domain::error::{PrepError, PrepResult};
use crate::domain::interaction::{InteractionRecord, ResponseEncoding, StudentSequence};

/// Minimum number of answered rows for a student to be kept.
pub const MIN_SEQUENCE_LEN: usize = 2;

/// Names of the three required columns of the interaction log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnNames {
    pub concept:     String,
    pub correctness: String,
    pub student:     String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            concept:     "kc_uid".to_string(),
            correctness: "accuracy".to_string(),
            student:     "knowre_user_id".to_string(),
        }
    }
}

/// Dimensions of an extracted dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub max_seq_len:       usize,
    pub student_num:       usize,
    pub feature_dim:       usize,
    pub concept_num:       usize,
    pub interaction_count: usize,
}

/// Output of the extractor.
#[derive(Debug, Clone)]
pub struct ExtractedSequences {
    pub sequences: Vec<StudentSequence>,

    /// Concept index → original concept id
    pub concepts: ConceptUniverse,

    pub summary: DatasetSummary,
}

pub struct SequenceExtractor {
    columns:  ColumnNames,
    encoding: ResponseEncoding,
}

impl SequenceExtractor {
    pub fn new(columns: ColumnNames, encoding: ResponseEncoding) -> Self {
        Self { columns, encoding }
    }

    pub fn extract(&self, table: &CsvTable) -> PrepResult<ExtractedSequences> {
        let concept_col = table.column(&self.columns.concept)?;
        let answer_col  = table.column(&self.columns.correctness)?;
        let student_col = table.column(&self.columns.student)?;
        let rows = table.rows();

        // ── Step 1: rows with a concept and a student ────────────────────────
        let answered: Vec<usize> = (0..rows.len())
            .filter(|&i| !is_missing(&rows[i][concept_col]) && !is_missing(&rows[i][student_col]))
            .collect();

        // ── Step 2: students with at least MIN_SEQUENCE_LEN rows ─────────────
        let mut counts: HashMap<IdKey, usize> = HashMap::new();
        for &i in &answered {
            *counts.entry(IdKey::parse(&rows[i][student_col])).or_default() += 1;
        }
        let kept: Vec<usize> = answered
            .into_iter()
            .filter(|&i| counts[&IdKey::parse(&rows[i][student_col])] >= MIN_SEQUENCE_LEN)
            .collect();

        if kept.is_empty() {
            return Err(PrepError::EmptyDataset {
                file: table.source().to_string(),
            });
        }

        // ── Step 3: dense concept enumeration ────────────────────────────────
        let concepts = ConceptUniverse::from_ids(kept.iter().map(|&i| rows[i][concept_col].as_str()));

        // ── Steps 4 + 5: cross features, grouped by student ──────────────────
        let mut groups: BTreeMap<IdKey, StudentSequence> = BTreeMap::new();
        for &i in &kept {
            let correctness = table.parse_i64(i, answer_col)?;
            if !self.encoding.accepts(correctness) {
                return Err(table.invalid(i, answer_col));
            }
            let concept = concepts.index_of(&rows[i][concept_col], table.source())?;
            let student = rows[i][student_col].trim();

            groups
                .entry(IdKey::parse(student))
                .or_insert_with(|| StudentSequence::new(student, Vec::new()))
                .records
                .push(InteractionRecord::new(concept, correctness, self.encoding));
        }

        let sequences: Vec<StudentSequence> = groups.into_values().collect();
        let summary = summarize(&sequences);

        tracing::info!("max seq_len: {}", summary.max_seq_len);
        tracing::info!("student num: {}", summary.student_num);
        tracing::info!("feature_dim: {}", summary.feature_dim);
        tracing::info!("question_dim: {}", summary.concept_num);
        tracing::debug!(
            "Kept {} of {} rows from '{}'",
            summary.interaction_count,
            rows.len(),
            table.source()
        );

        Ok(ExtractedSequences {
            sequences,
            concepts,
            summary,
        })
    }
}

fn summarize(sequences: &[StudentSequence]) -> DatasetSummary {
    let records = sequences.iter().flat_map(|s| s.records.iter());

    let max_cross   = records.clone().map(|r| r.cross).max().unwrap_or(-1);
    let max_concept = records.clone().map(|r| r.concept as i64).max().unwrap_or(-1);

    DatasetSummary {
        max_seq_len:       sequences.iter().map(StudentSequence::len).max().unwrap_or(0),
        student_num:       sequences.len(),
        feature_dim:       (max_cross + 1).max(0) as usize,
        concept_num:       (max_concept + 1).max(0) as usize,
        interaction_count: records.count(),
    }
}
