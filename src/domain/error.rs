// ============================================================
// Layer 3 — Error Types
// ============================================================
// Every failure the preparation pipeline can hit. Lower layers
// return PrepResult so callers (and tests) can match on the
// exact failure; the CLI wraps these with anyhow context.
//
// Nothing here is retried: any error aborts preprocessing and
// no partial dataset or graph is handed out.

use thiserror::Error;

/// Errors raised while reading tables, extracting sequences
/// or building concept graphs.
#[derive(Debug, Error)]
pub enum PrepError {
    /// A required column is absent from an input table.
    #[error("The column '{column}' was not found on {file}")]
    MissingColumn { file: String, column: String },

    /// A matrix or concept universe has the wrong dimensions.
    #[error("{context}: expected {expected}x{expected}, got {rows}x{cols}")]
    ShapeMismatch {
        context:  String,
        expected: usize,
        rows:     usize,
        cols:     usize,
    },

    /// A concept id referenced by a table is not part of the universe.
    #[error("Concept '{id}' not found in {source_table}")]
    ConceptNotFound { id: String, source_table: String },

    /// Fewer ranked relations than required under the `fail` policy.
    #[error("Concept '{concept}' has {found} ranked relations, {wanted} required")]
    InsufficientRelations {
        concept: String,
        wanted:  usize,
        found:   usize,
    },

    /// A cell could not be parsed or is out of range.
    #[error("Invalid value '{value}' in column '{column}' of {file} (row {row})")]
    InvalidValue {
        file:   String,
        column: String,
        row:    usize,
        value:  String,
    },

    /// The last two characters of a concept id are not an integer.
    #[error("Cannot derive a locality key from concept id '{id}'")]
    InvalidLocalityKey { id: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// No student has more than one answered row.
    #[error("No student with more than one interaction in {file}")]
    EmptyDataset { file: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for the preparation pipeline.
pub type PrepResult<T> = Result<T, PrepError>;
