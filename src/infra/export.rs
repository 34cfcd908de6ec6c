// ============================================================
// Layer 6 — Exporter
// ============================================================
// Persists what a preparation run produced.
//
// Directory layout:
//   <output_dir>/
//     summary.json      ← DatasetSummary, split sizes, graph info
//     load_config.json  ← the settings that produced it
//     graph.txt         ← whitespace-separated matrix, 6 decimals
//
// graph.txt uses the same format the DKT graph loader reads, so
// an exported graph can be fed back in with --graph-type DKT.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::{Path, PathBuf}};

use crate::application::load_use_case::LoadConfig;
use crate::data::extractor::DatasetSummary;
use crate::domain::adjacency::AdjacencyMatrix;

/// What summary.json contains.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub dataset:     DatasetSummary,
    pub train_size:  usize,
    pub val_size:    usize,
    pub test_size:   usize,
    /// None when the model type uses no graph
    pub graph_type:  Option<String>,
    pub graph_edges: Option<usize>,
}

pub struct Exporter {
    dir: PathBuf,
}

impl Exporter {
    /// Create the output directory (and parents) if needed.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create output directory '{}'", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn write(&self, name: &str, contents: &str) -> Result<PathBuf> {
        let path = self.dir.join(name);
        fs::write(&path, contents)
            .with_context(|| format!("Cannot write '{}'", path.display()))?;
        tracing::debug!("Wrote '{}'", path.display());
        Ok(path)
    }

    pub fn save_summary(&self, summary: &RunSummary) -> Result<PathBuf> {
        self.write("summary.json", &serde_json::to_string_pretty(summary)?)
    }

    pub fn save_config(&self, cfg: &LoadConfig) -> Result<PathBuf> {
        self.write("load_config.json", &serde_json::to_string_pretty(cfg)?)
    }

    pub fn save_graph(&self, graph: &AdjacencyMatrix) -> Result<PathBuf> {
        self.save_graph_as("graph.txt", graph)
    }

    /// Write `graph` under a custom file name in the output directory.
    pub fn save_graph_as(&self, name: &str, graph: &AdjacencyMatrix) -> Result<PathBuf> {
        self.write(name, &format_matrix(graph))
    }
}

/// One row per line, cells separated by a single space.
pub fn format_matrix(graph: &AdjacencyMatrix) -> String {
    let mut out = String::new();
    for r in 0..graph.size() {
        let row: Vec<String> = graph.row(r).iter().map(|v| format!("{v:.6}")).collect();
        out.push_str(&row.join(" "));
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::external::load_matrix;

    fn graph() -> AdjacencyMatrix {
        AdjacencyMatrix::from_rows(vec![
            vec![0.0, 0.5, 0.5],
            vec![1.0, 0.0, 0.0],
            vec![0.0, 0.0, 0.0],
        ])
        .unwrap()
    }

    #[test]
    fn test_format_matrix_precision() {
        let text = format_matrix(&graph());
        assert_eq!(text.lines().next().unwrap(), "0.000000 0.500000 0.500000");
        assert_eq!(text.lines().count(), 3);
        assert!(text.ends_with("0.000000 0.000000 0.000000\n"));
    }

    #[test]
    fn test_exported_graph_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = Exporter::new(dir.path().join("nested/out")).unwrap();
        let path = exporter.save_graph(&graph()).unwrap();

        let back = load_matrix(path.to_str().unwrap()).unwrap();
        assert_eq!(back, graph());
    }

    #[test]
    fn test_summary_and_config_written() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = Exporter::new(dir.path()).unwrap();

        let summary = RunSummary {
            dataset: DatasetSummary {
                max_seq_len:       4,
                student_num:       3,
                feature_dim:       10,
                concept_num:       5,
                interaction_count: 9,
            },
            train_size:  2,
            val_size:    1,
            test_size:   0,
            graph_type:  Some("Dense".to_string()),
            graph_edges: Some(20),
        };
        let path = exporter.save_summary(&summary).unwrap();
        let back: RunSummary = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(back, summary);

        let path = exporter.save_config(&LoadConfig::default()).unwrap();
        assert!(fs::read_to_string(path).unwrap().contains("\"batch_size\": 128"));
    }
}
