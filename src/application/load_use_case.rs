// ============================================================
// Layer 2 — Load Dataset Use Case
// ============================================================
// The entry point a training loop calls. Orchestrates:
//
//   Step 1: Read the interaction CSV            (Layer 4 - data)
//   Step 2: Extract per-student sequences       (Layer 4 - data)
//   Step 3: Wrap them in a Burn dataset         (Layer 4 - data)
//   Step 4: Split train/validation/test         (Layer 4 - data)
//   Step 5: Build three padded data loaders     (Layer 4 - data)
//   Step 6: Build the static concept graph      (Layer 5 - graph)
//
// Returns concept_num, the graph tensor (GKT only) and the
// three loaders, ready to be handed to the model.
//
// The function is generic over the Burn backend: the caller
// decides whether tensors live on the CPU (NdArray) or on an
// accelerator (Wgpu) by choosing B and the device.

use std::{str::FromStr, sync::Arc};

use anyhow::{Context, Result};
use burn::{
    data::dataloader::{DataLoader, DataLoaderBuilder},
    prelude::*,
};
use serde::{Deserialize, Serialize};

use crate::application::graph_use_case::{build_graph, GraphInputs};
use crate::data::{
    batcher::{KtBatch, KtBatcher},
    dataset::{KtDataset, KtSubset},
    extractor::{ColumnNames, DatasetSummary, ExtractedSequences, SequenceExtractor},
    loader::CsvTable,
    splitter::{split_train_val_test, SplitIndices},
};
use crate::domain::adjacency::AdjacencyMatrix;
use crate::domain::error::PrepError;
use crate::domain::interaction::ResponseEncoding;
use crate::graph::{relation::RelationShortfall, to_tensor, GraphType};

// ─── Model Type ──────────────────────────────────────────────────────────────
/// Only GKT consumes a static concept graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelType {
    #[serde(rename = "GKT")]
    Gkt,
    #[serde(rename = "DKT")]
    Dkt,
}

impl ModelType {
    pub fn uses_graph(&self) -> bool {
        matches!(self, ModelType::Gkt)
    }
}

impl FromStr for ModelType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GKT" => Ok(ModelType::Gkt),
            "DKT" => Ok(ModelType::Dkt),
            other => Err(format!("unknown model type '{other}' (expected GKT or DKT)")),
        }
    }
}

// ─── Relation Table Paths ────────────────────────────────────────────────────
/// Where the auxiliary tables of the relation-based graphs live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationPaths {
    /// `from`,`to` pairs (MyGraph, My2HopD)
    pub pair_graph: String,
    /// `before`,`after`,`hmm_direction` (MyHMM)
    pub hmm: String,
    /// `before`,`after` ranked relations (MyERF)
    pub erf: String,
    /// `target`,`auc`,`rel*` (MyFIR)
    pub fir: String,
    /// Deduplicated concept list, one id per row
    pub concept_dedup: String,
}

impl Default for RelationPaths {
    fn default() -> Self {
        Self {
            pair_graph:    "data/GT_SSM11_1116.csv".to_string(),
            hmm:           "data/HMM_11.csv".to_string(),
            erf:           "data/ElaRF_ssm_11_relation.csv".to_string(),
            fir:           "data/FIR_ssm11.csv".to_string(),
            concept_dedup: "data/kc_dedup_smath11.csv".to_string(),
        }
    }
}

// ─── Load Configuration ──────────────────────────────────────────────────────
// Serialisable so a run's exact settings can be written next
// to its exported graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadConfig {
    pub file_path:      String,
    pub batch_size:     usize,
    pub graph_type:     GraphType,
    pub dkt_graph_path: Option<String>,
    pub train_ratio:    f64,
    pub val_ratio:      f64,
    pub shuffle:        bool,
    pub model_type:     ModelType,
    pub encoding:       ResponseEncoding,
    pub use_gpu:        bool,
    pub seed:           Option<u64>,
    pub num_workers:    usize,
    pub columns:        ColumnNames,
    pub relations:      RelationPaths,
    pub shortfall:      RelationShortfall,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            file_path:      "data/interactions.csv".to_string(),
            batch_size:     128,
            graph_type:     GraphType::Dense,
            dkt_graph_path: None,
            train_ratio:    0.7,
            val_ratio:      0.2,
            shuffle:        true,
            model_type:     ModelType::Gkt,
            encoding:       ResponseEncoding::Binary,
            use_gpu:        false,
            seed:           None,
            num_workers:    0,
            columns:        ColumnNames::default(),
            relations:      RelationPaths::default(),
            shortfall:      RelationShortfall::default(),
        }
    }
}

impl LoadConfig {
    /// Reject settings that would fail later in a less obvious way.
    pub fn validate(&self) -> Result<(), PrepError> {
        if self.batch_size == 0 {
            return Err(PrepError::InvalidConfig("batch_size must be at least 1".to_string()));
        }
        if let ResponseEncoding::MultiValued { res_len } = self.encoding {
            if res_len < 2 {
                return Err(PrepError::InvalidConfig(format!(
                    "res_len must be at least 2, got {res_len}"
                )));
            }
        }
        Ok(())
    }
}

// ─── Loaded Data ─────────────────────────────────────────────────────────────
pub type KtLoader<B> = Arc<dyn DataLoader<KtBatch<B>>>;

/// Everything the training loop needs.
pub struct LoadedData<B: Backend> {
    pub concept_num: usize,

    /// [concept_num, concept_num] on the caller's device; None
    /// when the model does not use a static graph
    pub graph: Option<Tensor<B, 2>>,

    /// Host copy of the same graph, for inspection and export
    pub adjacency: Option<AdjacencyMatrix>,

    pub train_loader: KtLoader<B>,
    pub valid_loader: KtLoader<B>,
    pub test_loader:  KtLoader<B>,

    pub summary: DatasetSummary,
    pub split:   SplitIndices,
}

/// Read the interaction log and extract student sequences.
pub fn extract_sequences(cfg: &LoadConfig) -> Result<ExtractedSequences> {
    tracing::info!("Loading interactions from '{}'", cfg.file_path);
    let table = CsvTable::read(&cfg.file_path)
        .with_context(|| format!("Cannot read interaction file '{}'", cfg.file_path))?;

    let extractor = SequenceExtractor::new(cfg.columns.clone(), cfg.encoding);
    Ok(extractor.extract(&table)?)
}

fn build_loader<B: Backend>(
    cfg:     &LoadConfig,
    source:  &Arc<KtDataset>,
    indices: &[usize],
    device:  &B::Device,
    stream:  u64,
) -> KtLoader<B> {
    let batcher = KtBatcher::<B>::new(device.clone());
    let mut builder = DataLoaderBuilder::new(batcher).batch_size(cfg.batch_size);

    if cfg.shuffle {
        // each loader gets its own stream of the same seed
        let seed = cfg.seed.map(|s| s.wrapping_add(stream)).unwrap_or_else(rand::random);
        builder = builder.shuffle(seed);
    }
    if cfg.num_workers > 0 {
        builder = builder.num_workers(cfg.num_workers);
    }

    builder.build(KtSubset::new(Arc::clone(source), indices.to_vec()))
}

/// Run the whole preparation pipeline.
pub fn load_dataset<B: Backend>(cfg: &LoadConfig, device: &B::Device) -> Result<LoadedData<B>> {
    cfg.validate()?;

    // ── Steps 1 + 2: read and extract ────────────────────────────────────────
    let extracted   = extract_sequences(cfg)?;
    let summary     = extracted.summary;
    let concept_num = summary.concept_num;

    // ── Step 3: dataset ──────────────────────────────────────────────────────
    let dataset = Arc::new(KtDataset::from_sequences(&extracted.sequences));

    // ── Step 4: split ────────────────────────────────────────────────────────
    let split = split_train_val_test(summary.student_num, cfg.train_ratio, cfg.val_ratio, cfg.seed)?;

    // ── Step 5: loaders ──────────────────────────────────────────────────────
    let train_loader = build_loader::<B>(cfg, &dataset, &split.train, device, 0);
    let valid_loader = build_loader::<B>(cfg, &dataset, &split.val, device, 1);
    let test_loader  = build_loader::<B>(cfg, &dataset, &split.test, device, 2);

    // ── Step 6: static graph ─────────────────────────────────────────────────
    let adjacency = if cfg.model_type.uses_graph() {
        let inputs = GraphInputs {
            extracted:     &extracted,
            train_indices: &split.train,
            config:        cfg,
        };
        Some(build_graph(cfg.graph_type, &inputs)?)
    } else {
        tracing::info!("Model type {:?} uses no static graph", cfg.model_type);
        None
    };
    let graph = adjacency.as_ref().map(|g| to_tensor::<B>(g, device));

    Ok(LoadedData {
        concept_num,
        graph,
        adjacency,
        train_loader,
        valid_loader,
        test_loader,
        summary,
        split,
    })
}
