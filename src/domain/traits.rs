// ============================================================
// Layer 3 — Core Traits
// ============================================================
// Every graph strategy (Dense, Transition, DKT file, relation
// tables, two-hop) is a GraphBuilder. The application layer
// picks one from the configured GraphType and only ever talks
// to the trait, so adding a strategy never touches the loader.
//
// Builders own or borrow all of their inputs up front (loaded
// tables, concept universes, training indices); build() does
// no I/O of its own and always returns the same matrix for the
// same inputs.

use crate::domain::adjacency::AdjacencyMatrix;
use crate::domain::error::PrepResult;

/// A strategy that produces one row-normalized concept graph.
pub trait GraphBuilder {
    /// Short name used in logs and exported summaries.
    fn name(&self) -> &'static str;

    /// Build the graph. Deterministic for identical inputs.
    fn build(&self) -> PrepResult<AdjacencyMatrix>;
}
