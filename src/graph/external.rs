// ============================================================
// Layer 5 — External (DKT) Graph
// ============================================================
// A concept graph computed elsewhere (e.g. from a trained DKT
// model's influence scores) and saved as a plain numeric
// matrix:
//
//   0 0.3 0.7
//   0.5 0 0.5
//   ...
//
// Values are separated by whitespace or commas; lines starting
// with '#' are comments. The matrix must be concept_num square.
// It is row-normalized like every other graph.

use std::{fs, path::Path};

use crate::domain::adjacency::AdjacencyMatrix;
use crate::domain::error::{PrepError, PrepResult};
use crate::domain::traits::GraphBuilder;

/// Parse matrix text; `source` labels errors.
pub fn parse_matrix(text: &str, source: &str) -> PrepResult<AdjacencyMatrix> {
    let mut rows: Vec<Vec<f64>> = Vec::new();

    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let row = line
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|cell| !cell.is_empty())
            .enumerate()
            .map(|(col, cell)| match cell.parse::<f64>() {
                Ok(v) if v.is_finite() && v >= 0.0 => Ok(v),
                _ => Err(PrepError::InvalidValue {
                    file:   source.to_string(),
                    column: format!("column {col}"),
                    row:    line_no,
                    value:  cell.to_string(),
                }),
            })
            .collect::<PrepResult<Vec<f64>>>()?;
        rows.push(row);
    }

    let n_rows = rows.len();
    let n_cols = rows.first().map(Vec::len).unwrap_or(0);
    AdjacencyMatrix::from_rows(rows).ok_or_else(|| PrepError::ShapeMismatch {
        context:  format!("matrix in {source}"),
        expected: n_rows,
        rows:     n_rows,
        cols:     n_cols,
    })
}

/// Read a matrix file written by `parse_matrix`'s format.
pub fn load_matrix(path: impl AsRef<Path>) -> PrepResult<AdjacencyMatrix> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    parse_matrix(&text, &path.display().to_string())
}

pub struct DktGraph {
    matrix:      AdjacencyMatrix,
    concept_num: usize,
}

impl DktGraph {
    pub fn new(matrix: AdjacencyMatrix, concept_num: usize) -> Self {
        Self { matrix, concept_num }
    }
}

impl GraphBuilder for DktGraph {
    fn name(&self) -> &'static str {
        "DKT"
    }

    fn build(&self) -> PrepResult<AdjacencyMatrix> {
        if self.matrix.size() != self.concept_num {
            return Err(PrepError::ShapeMismatch {
                context:  "DKT graph".to_string(),
                expected: self.concept_num,
                rows:     self.matrix.size(),
                cols:     self.matrix.size(),
            });
        }
        let mut graph = self.matrix.clone();
        graph.row_normalize();
        Ok(graph)
    }
}
