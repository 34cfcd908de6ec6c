use crate::domain::adjacency::AdjacencyMatrix;
use crate::domain::error::PrepResult;
use crate::domain::traits::GraphBuilder;

/// Every concept linked to every other concept with weight
/// 1 / (n - 1); no self-loops.
pub struct DenseGraph {
    concept_num: usize,
}

impl DenseGraph {
    pub fn new(concept_num: usize) -> Self {
        Self { concept_num }
    }
}

impl GraphBuilder for DenseGraph {
    fn name(&self) -> &'static str {
        "Dense"
    }

    fn build(&self) -> PrepResult<AdjacencyMatrix> {
        let n = self.concept_num;
        let mut graph = AdjacencyMatrix::zeros(n);
        if n < 2 {
            return Ok(graph);
        }

        let weight = 1.0 / (n - 1) as f64;
        for i in 0..n {
            for j in 0..n {
                if i != j {
                    graph.set(i, j, weight);
                }
            }
        }
        Ok(graph)
    }
}
