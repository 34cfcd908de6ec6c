// ============================================================
// kt-graph-prep — library root
// ============================================================
// Turns raw student-response logs into padded tensor batches
// and a concept-relation graph for a graph-based knowledge
// tracing (GKT) model.
//
//   interaction CSV
//       │
//       ▼
//   SequenceExtractor  → per-student concept / answer sequences
//       │
//       ├──► KtDataset → split → KtBatcher → 3 DataLoaders
//       │
//       └──► graph builder (Dense, Transition, DKT, MyGraph, ...)
//                 │
//                 ▼
//            AdjacencyMatrix → Tensor<B, 2>
//
// The training loop that consumes both outputs lives elsewhere.

#![recursion_limit = "256"]

pub mod application;
pub mod cli;
pub mod data;
pub mod domain;
pub mod graph;
pub mod infra;
