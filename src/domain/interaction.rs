// ============================================================
// Layer 3 — Interaction Records and Student Sequences
// ============================================================
// One InteractionRecord is one answered question:
//
//   concept      dense concept index (0..concept_num)
//   correctness  raw response code from the log
//   cross        concept crossed with correctness, the single
//                categorical input token the model embeds
//
// Cross-feature encodings:
//
//   Binary       codes {0, 1}         base = concept * 2
//   MultiValued  codes {1..=res_len}  base = concept * res_len - 1
//
//   cross = base + correctness
//
// Under both encodings a correct response (code 1) lands on
// base + 1, which the model relies on to locate the "correct"
// slot of every concept.
//
// Reference: Rust Book §5 (Structs), §6 (Enums)

use serde::{Deserialize, Serialize};

/// How response codes are crossed with the concept index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scheme", rename_all = "snake_case")]
pub enum ResponseEncoding {
    /// Codes 0 (wrong) and 1 (correct).
    Binary,

    /// Codes 1..=res_len, where 1 means correct.
    MultiValued { res_len: i64 },
}

/// Response code that denotes a correct answer in every scheme.
pub const CORRECT_CODE: i64 = 1;

impl ResponseEncoding {
    /// Number of cross-feature slots reserved per concept.
    pub fn cardinality(&self) -> i64 {
        match self {
            ResponseEncoding::Binary                 => 2,
            ResponseEncoding::MultiValued { res_len } => *res_len,
        }
    }

    /// Cross-feature offset of a concept.
    pub fn base(&self, concept: usize) -> i64 {
        let concept = concept as i64;
        match self {
            ResponseEncoding::Binary                 => concept * 2,
            ResponseEncoding::MultiValued { res_len } => concept * res_len - 1,
        }
    }

    pub fn cross(&self, concept: usize, correctness: i64) -> i64 {
        self.base(concept) + correctness
    }

    /// Whether a raw code is legal under this scheme.
    pub fn accepts(&self, correctness: i64) -> bool {
        match self {
            ResponseEncoding::Binary                 => (0..=1).contains(&correctness),
            ResponseEncoding::MultiValued { res_len } => (1..=*res_len).contains(&correctness),
        }
    }
}

impl Default for ResponseEncoding {
    fn default() -> Self {
        ResponseEncoding::Binary
    }
}

/// One answered question, immutable once derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InteractionRecord {
    pub concept:     usize,
    pub correctness: i64,
    pub cross:       i64,
}

impl InteractionRecord {
    pub fn new(concept: usize, correctness: i64, encoding: ResponseEncoding) -> Self {
        Self {
            concept,
            correctness,
            cross: encoding.cross(concept, correctness),
        }
    }

    pub fn is_correct(&self) -> bool {
        self.correctness == CORRECT_CODE
    }
}

/// All interactions of one student, in log order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentSequence {
    pub student_id: String,
    pub records:    Vec<InteractionRecord>,
}

impl StudentSequence {
    pub fn new(student_id: impl Into<String>, records: Vec<InteractionRecord>) -> Self {
        Self {
            student_id: student_id.into(),
            records,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Cross-feature channel.
    pub fn features(&self) -> Vec<i64> {
        self.records.iter().map(|r| r.cross).collect()
    }

    /// Concept-index channel.
    pub fn questions(&self) -> Vec<i64> {
        self.records.iter().map(|r| r.concept as i64).collect()
    }

    /// Binary-correct channel: 1 where the code is the correct code.
    pub fn answers(&self) -> Vec<i64> {
        self.records.iter().map(|r| i64::from(r.is_correct())).collect()
    }

    /// Consecutive (previous, next) concept pairs.
    pub fn transitions(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.records.windows(2).map(|w| (w[0].concept, w[1].concept))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_correct_is_base_plus_one_binary() {
        let enc = ResponseEncoding::Binary;
        for concept in 0..20 {
            assert_eq!(enc.cross(concept, CORRECT_CODE), enc.base(concept) + 1);
        }
        assert_eq!(enc.cross(3, 0), 6);
        assert_eq!(enc.cross(3, 1), 7);
    }

    #[test]
    fn test_correct_is_base_plus_one_multi_valued() {
        let enc = ResponseEncoding::MultiValued { res_len: 12 };
        for concept in 0..20 {
            assert_eq!(enc.cross(concept, CORRECT_CODE), enc.base(concept) + 1);
        }
        // concept * res_len + code - 1
        assert_eq!(enc.cross(2, 1), 24);
        assert_eq!(enc.cross(2, 12), 35);
    }

    #[test]
    fn test_accepts_range_per_scheme() {
        assert!(ResponseEncoding::Binary.accepts(0));
        assert!(!ResponseEncoding::Binary.accepts(2));

        let multi = ResponseEncoding::MultiValued { res_len: 3 };
        assert!(!multi.accepts(0));
        assert!(multi.accepts(3));
        assert!(!multi.accepts(4));
    }

    #[test]
    fn test_sequence_channels() {
        let enc = ResponseEncoding::MultiValued { res_len: 3 };
        let seq = StudentSequence::new(
            "s1",
            vec![
                InteractionRecord::new(0, 1, enc),
                InteractionRecord::new(2, 3, enc),
                InteractionRecord::new(1, 2, enc),
            ],
        );
        assert_eq!(seq.features(), vec![0, 8, 4]);
        assert_eq!(seq.questions(), vec![0, 2, 1]);
        assert_eq!(seq.answers(), vec![1, 0, 0]);
        assert_eq!(seq.transitions().collect::<Vec<_>>(), vec![(0, 2), (2, 1)]);
    }
}
