// ============================================================
// Layer 2 — Graph Selection
// ============================================================
// Maps a GraphType to its builder, loads whatever tables that
// builder needs, and hands them over explicitly:
//
//   Dense       concept_num
//   Transition  sequences + training indices
//   DKT         matrix file (dkt_graph_path)
//   MyGraph     pair table
//   MyHMM       hmm table + concept dedup table
//   MyERF       erf table + concept dedup table
//   MyFIR       fir table + concept dedup table
//   My2Hop      sequences + training indices + dataset concepts
//   My2HopD     as My2Hop, plus the pair table mapped through the
//               dataset concepts
//
// The two-hop graphs share the sequences' index space, so their
// locality keys and relation edges come from the concepts the
// extractor numbered, never from a second table.
//
// Whatever the strategy, the resulting graph must be
// concept_num × concept_num or the model cannot use it.

use anyhow::{bail, Context, Result};

use crate::application::load_use_case::{extract_sequences, LoadConfig};
use crate::data::{extractor::ExtractedSequences, loader::CsvTable, splitter::split_train_val_test};
use crate::domain::adjacency::AdjacencyMatrix;
use crate::domain::concept::ConceptUniverse;
use crate::domain::error::PrepError;
use crate::domain::traits::GraphBuilder;
use crate::graph::{
    dense::DenseGraph,
    external::{load_matrix, DktGraph},
    relation::{column_universe, ErfGraph, FirGraph, HmmGraph, PairGraph},
    transition::TransitionGraph,
    two_hop::TwoHopGraph,
    GraphType,
};
use crate::infra::export::Exporter;

/// Everything a builder may draw on.
pub struct GraphInputs<'a> {
    pub extracted:     &'a ExtractedSequences,
    pub train_indices: &'a [usize],
    pub config:        &'a LoadConfig,
}

fn read_table(path: &str, purpose: &str) -> Result<CsvTable> {
    CsvTable::read(path).with_context(|| format!("Cannot read {purpose} table '{path}'"))
}

fn dedup_universe(cfg: &LoadConfig) -> Result<ConceptUniverse> {
    let table = read_table(&cfg.relations.concept_dedup, "concept dedup")?;
    Ok(column_universe(&table, &cfg.columns.concept)?)
}

fn ensure_size(context: &str, actual: usize, expected: usize) -> Result<(), PrepError> {
    if actual == expected {
        return Ok(());
    }
    Err(PrepError::ShapeMismatch {
        context:  context.to_string(),
        expected,
        rows:     actual,
        cols:     actual,
    })
}

fn run(builder: &dyn GraphBuilder) -> Result<AdjacencyMatrix> {
    tracing::info!("Building {} graph", builder.name());
    let graph = builder
        .build()
        .with_context(|| format!("Failed to build {} graph", builder.name()))?;
    tracing::info!("{} graph ready: {} concepts, {} edges", builder.name(), graph.size(), graph.edge_count());
    Ok(graph)
}

/// Build the graph selected by `graph_type`.
pub fn build_graph(graph_type: GraphType, inputs: &GraphInputs<'_>) -> Result<AdjacencyMatrix> {
    let cfg         = inputs.config;
    let sequences   = inputs.extracted.sequences.as_slice();
    let concept_num = inputs.extracted.summary.concept_num;

    let graph = match graph_type {
        GraphType::Dense => run(&DenseGraph::new(concept_num))?,

        GraphType::Transition => run(&TransitionGraph::new(sequences, inputs.train_indices, concept_num))?,

        GraphType::Dkt => {
            let Some(path) = cfg.dkt_graph_path.as_deref() else {
                bail!("graph type DKT needs a dkt_graph_path");
            };
            let matrix = load_matrix(path).with_context(|| format!("Cannot load DKT graph '{path}'"))?;
            run(&DktGraph::new(matrix, concept_num))?
        }

        GraphType::MyGraph => {
            let table = read_table(&cfg.relations.pair_graph, "relation")?;
            run(&PairGraph::new(&table))?
        }

        GraphType::MyHmm => {
            let table    = read_table(&cfg.relations.hmm, "HMM")?;
            let universe = dedup_universe(cfg)?;
            run(&HmmGraph::new(&table, &universe))?
        }

        GraphType::MyErf => {
            let table    = read_table(&cfg.relations.erf, "ERF")?;
            let universe = dedup_universe(cfg)?;
            run(&ErfGraph::new(&table, &universe, cfg.shortfall))?
        }

        GraphType::MyFir => {
            let table    = read_table(&cfg.relations.fir, "FIR")?;
            let universe = dedup_universe(cfg)?;
            run(&FirGraph::new(&table, &universe, cfg.shortfall))?
        }

        GraphType::My2Hop | GraphType::My2HopD => {
            let concepts = &inputs.extracted.concepts;
            let builder  = TwoHopGraph::new(sequences, inputs.train_indices, concepts);

            if graph_type == GraphType::My2HopD {
                let table     = read_table(&cfg.relations.pair_graph, "relation")?;
                let relations = PairGraph::new(&table)
                    .edges_in(concepts)
                    .context("Cannot map relation table onto dataset concepts")?;
                run(&builder.with_relations(&relations))?
            } else {
                run(&builder)?
            }
        }
    };

    ensure_size(&format!("{graph_type} graph"), graph.size(), concept_num)?;
    Ok(graph)
}

// ─── GraphUseCase ────────────────────────────────────────────────────────────
// Builds only the graph, without loaders or tensors, and writes
// it to <output_dir>/graph.txt. The split still runs because the
// transition-based graphs only see training students.
pub struct GraphUseCase {
    config:     LoadConfig,
    output_dir: String,
}

impl GraphUseCase {
    pub fn new(config: LoadConfig, output_dir: impl Into<String>) -> Self {
        Self { config, output_dir: output_dir.into() }
    }

    /// Returns the path of the written graph file.
    pub fn execute(&self) -> Result<std::path::PathBuf> {
        let cfg = &self.config;
        cfg.validate()?;

        let extracted = extract_sequences(cfg)?;
        let split = split_train_val_test(
            extracted.summary.student_num,
            cfg.train_ratio,
            cfg.val_ratio,
            cfg.seed,
        )?;

        let inputs = GraphInputs {
            extracted:     &extracted,
            train_indices: &split.train,
            config:        cfg,
        };
        let graph = build_graph(cfg.graph_type, &inputs)?;

        let exporter = Exporter::new(&self.output_dir)?;
        let path = exporter.save_graph(&graph)?;
        tracing::info!("Saved {} graph to '{}'", cfg.graph_type, path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::extractor::{ColumnNames, SequenceExtractor};
    use crate::domain::adjacency::tests::assert_row_stochastic;
    use crate::domain::interaction::ResponseEncoding;
    use std::{fs, path::Path};

    const LOG: &str = "\
knowre_user_id,kc_uid,accuracy
1,kc05,1
1,kc07,0
1,kc09,1
2,kc05,0
2,kc07,1
2,kc20,1
";

    fn extracted() -> ExtractedSequences {
        let table = CsvTable::from_reader("log.csv", LOG.as_bytes()).unwrap();
        SequenceExtractor::new(ColumnNames::default(), ResponseEncoding::Binary)
            .extract(&table)
            .unwrap()
    }

    fn write(dir: &Path, name: &str, body: &str) -> String {
        let path = dir.join(name);
        fs::write(&path, body).unwrap();
        path.display().to_string()
    }

    fn config_in(dir: &Path) -> LoadConfig {
        let mut cfg = LoadConfig::default();
        cfg.relations.concept_dedup = write(dir, "kc.csv", "kc_uid\nkc20\nkc05\nkc09\nkc07\n");
        cfg.relations.pair_graph    = write(dir, "gt.csv", "from,to\nkc09,kc20\nkc05,kc07\n");
        cfg.relations.hmm           = write(dir, "hmm.csv", "before,after,hmm_direction\nkc07,kc09,forward\n");
        cfg
    }

    #[test]
    fn test_every_file_free_graph_is_row_stochastic() {
        let ex  = extracted();
        let cfg = LoadConfig::default();
        let inputs = GraphInputs { extracted: &ex, train_indices: &[0, 1], config: &cfg };

        for graph_type in [GraphType::Dense, GraphType::Transition] {
            let g = build_graph(graph_type, &inputs).unwrap();
            assert_eq!(g.size(), 4);
            assert_row_stochastic(&g);
        }
    }

    #[test]
    fn test_table_backed_graphs() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config_in(dir.path());
        let ex  = extracted();
        let inputs = GraphInputs { extracted: &ex, train_indices: &[0, 1], config: &cfg };

        let hmm = build_graph(GraphType::MyHmm, &inputs).unwrap();
        assert_eq!(hmm.get(1, 2), 1.0);

        let two_hop = build_graph(GraphType::My2Hop, &inputs).unwrap();
        assert!(two_hop.has_edge(0, 2));
        assert!(!two_hop.has_edge(0, 3));

        let with_d = build_graph(GraphType::My2HopD, &inputs).unwrap();
        // kc09 → kc20 comes from the relation table only
        assert!(with_d.has_edge(2, 3));
        assert_row_stochastic(&with_d);
    }

    #[test]
    fn test_graph_use_case_writes_readable_matrix() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = LoadConfig {
            file_path:  write(dir.path(), "log.csv", LOG),
            graph_type: GraphType::Dense,
            seed:       Some(3),
            ..LoadConfig::default()
        };
        let path = GraphUseCase::new(cfg, dir.path().join("out").display().to_string())
            .execute()
            .unwrap();

        let back = crate::graph::external::load_matrix(&path).unwrap();
        assert_eq!(back.size(), 4);
        assert!((back.get(0, 1) - 1.0 / 3.0).abs() < 1e-6);
        assert_eq!(back.get(2, 2), 0.0);
    }

    #[test]
    fn test_dkt_requires_path() {
        let ex  = extracted();
        let cfg = LoadConfig::default();
        let inputs = GraphInputs { extracted: &ex, train_indices: &[0], config: &cfg };
        assert!(build_graph(GraphType::Dkt, &inputs).is_err());
    }

    #[test]
    fn test_two_hop_keys_come_from_dataset_concepts() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = config_in(dir.path());
        // same size as the dataset's concepts, different ids
        cfg.relations.concept_dedup = write(dir.path(), "kc_other.csv", "kc_uid\nkc01\nkc02\nkc03\nkc04\n");
        let ex = extracted();
        let inputs = GraphInputs { extracted: &ex, train_indices: &[0, 1], config: &cfg };

        let g = build_graph(GraphType::My2Hop, &inputs).unwrap();
        // kc05 and kc20 are 15 apart
        assert!(!g.has_edge(0, 3));
        assert!(g.has_edge(0, 2));
    }

    #[test]
    fn test_two_hop_d_with_partial_relation_table() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = config_in(dir.path());
        cfg.relations.pair_graph = write(dir.path(), "gt_part.csv", "from,to\nkc09,kc20\n");
        let ex = extracted();
        let inputs = GraphInputs { extracted: &ex, train_indices: &[0, 1], config: &cfg };

        let g = build_graph(GraphType::My2HopD, &inputs).unwrap();
        assert_eq!(g.size(), 4);
        assert_eq!(g.get(2, 3), 1.0);
        assert_row_stochastic(&g);
    }

    #[test]
    fn test_two_hop_d_rejects_unknown_relation_id() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = config_in(dir.path());
        cfg.relations.pair_graph = write(dir.path(), "gt_bad.csv", "from,to\nkc05,kc07\nkc09,kc99\n");
        let ex = extracted();
        let inputs = GraphInputs { extracted: &ex, train_indices: &[0, 1], config: &cfg };

        let err = build_graph(GraphType::My2HopD, &inputs).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PrepError>(),
            Some(PrepError::ConceptNotFound { id, .. }) if id == "kc99"
        ));
    }
}
