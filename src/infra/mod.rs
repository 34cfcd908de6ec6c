// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// File output that no business layer should own:
//
//   export.rs — Writes the results of a preparation run to a
//               directory so they can be inspected or reused:
//                 summary.json      dataset statistics + split
//                 load_config.json  the effective LoadConfig
//                 graph.txt         the concept graph, one row
//                                   per line, readable back as
//                                   a DKT graph file
//
// Reference: Rust Book §9 (Error Handling with anyhow)

/// Run summary, config and graph export
pub mod export;
