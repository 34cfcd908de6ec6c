// ============================================================
// Layer 5 — Transition Graph
// ============================================================
// Counts how often a student moves from concept `a` straight to
// concept `b`, then normalizes each row into a probability of
// "what comes next".
//
// Only students in the training split are counted. Validation
// and test students never influence the graph, so evaluation
// does not leak into the model's side input.
//
// Self-transitions (answering the same concept twice in a row)
// are dropped by zeroing the diagonal.

use std::collections::HashSet;

use crate::domain::adjacency::AdjacencyMatrix;
use crate::domain::error::{PrepError, PrepResult};
use crate::domain::interaction::StudentSequence;
use crate::domain::traits::GraphBuilder;

/// Raw (prev, next) counts over the training students, with a
/// zero diagonal. Indices outside `sequences` are ignored.
pub fn transition_counts(
    sequences:     &[StudentSequence],
    train_indices: &[usize],
    concept_num:   usize,
) -> PrepResult<AdjacencyMatrix> {
    let train: HashSet<usize> = train_indices.iter().copied().collect();
    let mut counts = AdjacencyMatrix::zeros(concept_num);

    for (i, seq) in sequences.iter().enumerate() {
        if !train.contains(&i) {
            continue;
        }
        for (prev, next) in seq.transitions() {
            let largest = prev.max(next);
            if largest >= concept_num {
                return Err(PrepError::ShapeMismatch {
                    context:  format!("transition from student '{}'", seq.student_id),
                    expected: concept_num,
                    rows:     largest + 1,
                    cols:     largest + 1,
                });
            }
            counts.add(prev, next, 1.0);
        }
    }

    counts.zero_diagonal();
    tracing::debug!(
        "Counted transitions over {} training students: {} distinct edges",
        train.len(),
        counts.edge_count()
    );
    Ok(counts)
}

pub struct TransitionGraph<'a> {
    sequences:     &'a [StudentSequence],
    train_indices: &'a [usize],
    concept_num:   usize,
}

impl<'a> TransitionGraph<'a> {
    pub fn new(sequences: &'a [StudentSequence], train_indices: &'a [usize], concept_num: usize) -> Self {
        Self { sequences, train_indices, concept_num }
    }
}

impl GraphBuilder for TransitionGraph<'_> {
    fn name(&self) -> &'static str {
        "Transition"
    }

    fn build(&self) -> PrepResult<AdjacencyMatrix> {
        let mut graph = transition_counts(self.sequences, self.train_indices, self.concept_num)?;
        graph.row_normalize();
        Ok(graph)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::domain::adjacency::tests::assert_row_stochastic;
    use crate::domain::interaction::{InteractionRecord, ResponseEncoding};

    /// A student answering `concepts` in order, all correct.
    pub(crate) fn student(id: &str, concepts: &[usize]) -> StudentSequence {
        StudentSequence::new(
            id,
            concepts
                .iter()
                .map(|&c| InteractionRecord::new(c, 1, ResponseEncoding::Binary))
                .collect(),
        )
    }

    #[test]
    fn test_counts_only_training_students() {
        let seqs = vec![student("a", &[0, 1, 2]), student("b", &[2, 0])];
        let counts = transition_counts(&seqs, &[0], 3).unwrap();
        assert_eq!(counts.get(0, 1), 1.0);
        assert_eq!(counts.get(1, 2), 1.0);
        // student b is not in training
        assert_eq!(counts.get(2, 0), 0.0);
    }

    #[test]
    fn test_transition_graph_normalized_with_zero_diagonal() {
        let seqs = vec![
            student("a", &[0, 0, 1, 0, 2]),
            student("b", &[0, 1, 1, 2]),
        ];
        let g = TransitionGraph::new(&seqs, &[0, 1], 3).build().unwrap();

        assert_row_stochastic(&g);
        for i in 0..3 {
            assert_eq!(g.get(i, i), 0.0);
        }
        // row 0: 0→1 twice, 0→2 once
        assert!((g.get(0, 1) - 2.0 / 3.0).abs() < 1e-12);
        assert!((g.get(0, 2) - 1.0 / 3.0).abs() < 1e-12);
        // row 2 has no outgoing transitions
        assert_eq!(g.row_sum(2), 0.0);
    }

    #[test]
    fn test_transition_graph_is_deterministic() {
        let seqs = vec![student("a", &[3, 1, 2, 0]), student("b", &[1, 3, 3, 0, 2])];
        let first  = TransitionGraph::new(&seqs, &[1, 0], 4).build().unwrap();
        let second = TransitionGraph::new(&seqs, &[1, 0], 4).build().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_out_of_range_concept_rejected() {
        let seqs = vec![student("a", &[0, 5])];
        assert!(matches!(
            transition_counts(&seqs, &[0], 3),
            Err(PrepError::ShapeMismatch { .. })
        ));
    }
}
