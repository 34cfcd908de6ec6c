// ============================================================
// Layer 5 — Two-Hop Transition Graphs (My2Hop, My2HopD)
// ============================================================
// Starts from the binarized training transition graph and adds
// shortcut edges h → i whenever h → p → i already exists, so a
// concept also "sees" the concepts two steps before it.
//
// Locality filter:
//   A shortcut is only added when the locality keys of h and i
//   differ by less than LOCALITY_WINDOW. Concept ids encode
//   their position in the curriculum in the last two characters
//   ("kc05", "kc09"), so this keeps shortcuts between nearby
//   concepts and drops spurious long-range hops. Keys are parsed
//   only for concepts that end up in a shortcut candidate, so an
//   id without a numeric suffix fails the build only if it would
//   take part in one.
//
// Order matters: concepts are processed from the highest index
// down, and edges added while processing one concept are
// visible when later (lower) concepts look up predecessors.
//
// My2HopD additionally unions in the edges of the relation
// (MyGraph) table before normalizing. Those edges must already be
// indexed by the same universe as the sequences.

use crate::domain::adjacency::AdjacencyMatrix;
use crate::domain::concept::ConceptUniverse;
use crate::domain::error::{PrepError, PrepResult};
use crate::domain::interaction::StudentSequence;
use crate::domain::traits::GraphBuilder;
use crate::graph::transition::transition_counts;

/// Shortcuts need |key(h) - key(i)| strictly below this.
pub const LOCALITY_WINDOW: i64 = 6;

/// Add locality-filtered two-hop edges to a binary graph in place.
/// Concept `c` of the graph is concept `c` of `universe`.
pub fn expand_two_hop(graph: &mut AdjacencyMatrix, universe: &ConceptUniverse) -> PrepResult<()> {
    let mut keys: Vec<Option<i64>> = vec![None; graph.size()];
    let mut key = |c: usize| -> PrepResult<i64> {
        if let Some(k) = keys[c] {
            return Ok(k);
        }
        let k = universe.locality_key(c)?;
        keys[c] = Some(k);
        Ok(k)
    };

    let mut added = 0usize;
    for i in (0..graph.size()).rev() {
        for p in graph.predecessors(i) {
            for h in graph.predecessors(p) {
                if h == i || graph.has_edge(h, i) {
                    continue;
                }
                if (key(h)? - key(i)?).abs() < LOCALITY_WINDOW {
                    graph.set(h, i, 1.0);
                    added += 1;
                }
            }
        }
    }
    tracing::debug!("Two-hop expansion added {} edges", added);
    Ok(())
}

pub struct TwoHopGraph<'a> {
    sequences:     &'a [StudentSequence],
    train_indices: &'a [usize],
    universe:      &'a ConceptUniverse,
    relations:     Option<&'a AdjacencyMatrix>,
}

impl<'a> TwoHopGraph<'a> {
    /// My2Hop: transitions plus two-hop shortcuts.
    pub fn new(
        sequences:     &'a [StudentSequence],
        train_indices: &'a [usize],
        universe:      &'a ConceptUniverse,
    ) -> Self {
        Self { sequences, train_indices, universe, relations: None }
    }

    /// My2HopD: additionally union in `relations` (any non-zero
    /// cell counts as an edge).
    pub fn with_relations(mut self, relations: &'a AdjacencyMatrix) -> Self {
        self.relations = Some(relations);
        self
    }
}

impl GraphBuilder for TwoHopGraph<'_> {
    fn name(&self) -> &'static str {
        match self.relations {
            Some(_) => "My2HopD",
            None    => "My2Hop",
        }
    }

    fn build(&self) -> PrepResult<AdjacencyMatrix> {
        let concept_num = self.universe.len();

        let mut graph = transition_counts(self.sequences, self.train_indices, concept_num)?;
        graph.binarize();
        expand_two_hop(&mut graph, self.universe)?;

        if let Some(relations) = self.relations {
            graph = graph.union(relations).ok_or_else(|| PrepError::ShapeMismatch {
                context:  "relation graph for My2HopD".to_string(),
                expected: concept_num,
                rows:     relations.size(),
                cols:     relations.size(),
            })?;
            graph.zero_diagonal();
        }

        graph.row_normalize();
        Ok(graph)
    }
}
