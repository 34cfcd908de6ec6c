// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust types that describe the problem: interaction
// records, student sequences, concept universes, adjacency
// matrices and the errors that can occur while building them.
//
// Rules for this layer:
//   - NO burn types
//   - NO file I/O
//   - only structs, enums and traits
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

// Square concept graph with row normalization
pub mod adjacency;

// Concept universes and identifier ordering
pub mod concept;

// Typed errors for the whole pipeline
pub mod error;

// Interaction records, cross-feature encodings, student sequences
pub mod interaction;

// Core abstractions implemented by other layers
pub mod traits;
