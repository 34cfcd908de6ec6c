// ============================================================
// Layer 3 — Adjacency Matrix
// ============================================================
// A square concept × concept matrix of non-negative weights,
// stored row-major. Every graph builder produces one of these.
//
// Invariants after row_normalize():
//   - every row sums to 1.0 (within float tolerance) or is
//     entirely zero
//   - zero rows are left untouched (no division by zero)
//
// The burn tensor conversion lives in the graph layer so this
// type stays framework-free.
//
// Reference: Rust Book §8 (Vectors)

/// Row-major square matrix of edge weights.
#[derive(Debug, Clone, PartialEq)]
pub struct AdjacencyMatrix {
    size:   usize,
    values: Vec<f64>,
}

impl AdjacencyMatrix {
    /// All-zero `size` × `size` matrix.
    pub fn zeros(size: usize) -> Self {
        Self {
            size,
            values: vec![0.0; size * size],
        }
    }

    /// Build from rows; every row must have `rows.len()` entries.
    /// Returns `None` for ragged input.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Option<Self> {
        let size = rows.len();
        if rows.iter().any(|r| r.len() != size) {
            return None;
        }
        Some(Self {
            size,
            values: rows.into_iter().flatten().collect(),
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values[row * self.size + col]
    }

    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.values[row * self.size + col] = value;
    }

    pub fn add(&mut self, row: usize, col: usize, delta: f64) {
        self.values[row * self.size + col] += delta;
    }

    pub fn row(&self, row: usize) -> &[f64] {
        &self.values[row * self.size..(row + 1) * self.size]
    }

    pub fn row_sum(&self, row: usize) -> f64 {
        self.row(row).iter().sum()
    }

    /// Flat row-major view.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn has_edge(&self, from: usize, to: usize) -> bool {
        self.get(from, to) != 0.0
    }

    /// Rows `p` with an edge `p → col`.
    pub fn predecessors(&self, col: usize) -> Vec<usize> {
        (0..self.size).filter(|&p| self.has_edge(p, col)).collect()
    }

    pub fn zero_diagonal(&mut self) {
        for i in 0..self.size {
            self.set(i, i, 0.0);
        }
    }

    /// Replace every non-zero weight with 1.0.
    pub fn binarize(&mut self) {
        for v in self.values.iter_mut() {
            if *v != 0.0 {
                *v = 1.0;
            }
        }
    }

    /// Edge-wise union with another matrix of the same size,
    /// producing a binary matrix. Returns `None` on size mismatch.
    pub fn union(&self, other: &AdjacencyMatrix) -> Option<AdjacencyMatrix> {
        if self.size != other.size {
            return None;
        }
        let values = self
            .values
            .iter()
            .zip(&other.values)
            .map(|(a, b)| if *a != 0.0 || *b != 0.0 { 1.0 } else { 0.0 })
            .collect();
        Some(Self { size: self.size, values })
    }

    /// Divide each row by its sum; zero-sum rows stay zero.
    pub fn row_normalize(&mut self) {
        for i in 0..self.size {
            let sum = self.row_sum(i);
            if sum == 0.0 {
                continue;
            }
            for v in &mut self.values[i * self.size..(i + 1) * self.size] {
                *v /= sum;
            }
        }
    }

    /// Number of non-zero entries.
    pub fn edge_count(&self) -> usize {
        self.values.iter().filter(|v| **v != 0.0).count()
    }
}
