// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// This layer orchestrates all the other layers to accomplish
// a specific goal (loading a dataset or building a graph).
//
// Rules for this layer:
//   - No graph math here (that's Layer 5)
//   - No printing here (that's Layer 1)
//   - No direct CSV parsing (that's Layer 4)
//   - Only workflow coordination and configuration
//
// Reference: Clean Architecture pattern
//            Rust Book §7 (Module System)

// LoadConfig and the load_dataset entry point
pub mod load_use_case;

// GraphType → builder dispatch, plus the graph-only workflow
pub mod graph_use_case;

// Full pipeline run with loader walk and export
pub mod prepare_use_case;
