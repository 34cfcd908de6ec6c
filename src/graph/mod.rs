// ============================================================
// Layer 5 — Concept Graph Construction
// ============================================================
// Builds the static concept × concept graph the GKT model uses
// to propagate knowledge state between related concepts.
//
//   dense.rs       uniform weights over all other concepts
//   transition.rs  counts of consecutive concept pairs in the
//                  training split
//   external.rs    a precomputed matrix file (DKT graph)
//   relation.rs    graphs read from relation tables
//                  (MyGraph, MyHMM, MyERF, MyFIR)
//   two_hop.rs     transition graph expanded with locality-
//                  filtered two-hop edges (My2Hop, My2HopD)
//
// Every builder implements domain::traits::GraphBuilder and
// ends with the same row normalization, so each row of every
// graph sums to 1 or is all zero.
//
// This is the only layer besides the batcher that touches burn:
// to_tensor() places a finished graph on the caller's device.
//
// Reference: Burn Book §2 (Tensors)

use std::{fmt, str::FromStr};

use burn::{prelude::*, tensor::TensorData};
use serde::{Deserialize, Serialize};

use crate::domain::adjacency::AdjacencyMatrix;

/// Uniform dense graph
pub mod dense;

/// Precomputed matrix loaded from a file
pub mod external;

/// Relation-table graphs and the fewer-than-top-k policy
pub mod relation;

/// Training-split transition counts
pub mod transition;

/// Two-hop expansion with a locality filter
pub mod two_hop;

/// The named graph strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GraphType {
    Dense,
    Transition,
    #[serde(rename = "DKT")]
    Dkt,
    MyGraph,
    #[serde(rename = "MyHMM")]
    MyHmm,
    #[serde(rename = "MyERF")]
    MyErf,
    #[serde(rename = "MyFIR")]
    MyFir,
    My2Hop,
    My2HopD,
}

impl GraphType {
    pub const ALL: [GraphType; 9] = [
        GraphType::Dense,
        GraphType::Transition,
        GraphType::Dkt,
        GraphType::MyGraph,
        GraphType::MyHmm,
        GraphType::MyErf,
        GraphType::MyFir,
        GraphType::My2Hop,
        GraphType::My2HopD,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GraphType::Dense      => "Dense",
            GraphType::Transition => "Transition",
            GraphType::Dkt        => "DKT",
            GraphType::MyGraph    => "MyGraph",
            GraphType::MyHmm      => "MyHMM",
            GraphType::MyErf      => "MyERF",
            GraphType::MyFir      => "MyFIR",
            GraphType::My2Hop     => "My2Hop",
            GraphType::My2HopD    => "My2HopD",
        }
    }
}

impl fmt::Display for GraphType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GraphType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GraphType::ALL
            .iter()
            .copied()
            .find(|g| g.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                let names: Vec<&str> = GraphType::ALL.iter().map(GraphType::as_str).collect();
                format!("unknown graph type '{s}', expected one of: {}", names.join(", "))
            })
    }
}

/// Copy a graph onto a burn device as a [n, n] float tensor.
pub fn to_tensor<B: Backend>(graph: &AdjacencyMatrix, device: &B::Device) -> Tensor<B, 2> {
    let n = graph.size();
    let values: Vec<f32> = graph.values().iter().map(|v| *v as f32).collect();
    Tensor::from_data(TensorData::new(values, [n, n]), device)
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    #[test]
    fn test_graph_type_round_trips_names() {
        for g in GraphType::ALL {
            assert_eq!(g.as_str().parse::<GraphType>().unwrap(), g);
        }
        assert_eq!("dkt".parse::<GraphType>().unwrap(), GraphType::Dkt);
        assert!("PAM".parse::<GraphType>().is_err());
    }

    #[test]
    fn test_to_tensor_shape_and_values() {
        let mut m = AdjacencyMatrix::zeros(2);
        m.set(0, 1, 1.0);
        let t = to_tensor::<NdArray>(&m, &Default::default());
        assert_eq!(t.dims(), [2, 2]);
        let v = t.into_data().convert::<f32>().to_vec::<f32>().unwrap();
        assert_eq!(v, vec![0.0, 1.0, 0.0, 0.0]);
    }
}
