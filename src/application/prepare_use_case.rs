// ============================================================
// Layer 2 — PrepareUseCase
// ============================================================
// Runs the full preparation pipeline once, the way a training
// script would before its first epoch:
//
//   Step 1: Pick the backend and device       (NdArray or Wgpu)
//   Step 2: load_dataset                      (this layer)
//   Step 3: Walk each loader once and report  (sanity check)
//   Step 4: Export summary, config and graph  (Layer 6 - infra)
//
// Step 4 only runs when an output directory was given.

use anyhow::Result;
use burn::{
    backend::{ndarray::NdArrayDevice, wgpu::WgpuDevice, NdArray, Wgpu},
    prelude::*,
};

use crate::application::load_use_case::{load_dataset, KtLoader, LoadConfig, LoadedData};
use crate::infra::export::{Exporter, RunSummary};

/// Batch and student counts seen while walking one loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoaderReport {
    pub batches:  usize,
    pub students: usize,
    pub max_len:  usize,
}

fn walk<B: Backend>(name: &str, loader: &KtLoader<B>) -> LoaderReport {
    let mut report = LoaderReport::default();
    for batch in loader.iter() {
        report.batches  += 1;
        report.students += batch.lengths.len();
        report.max_len   = report.max_len.max(batch.lengths.iter().copied().max().unwrap_or(0));
    }
    tracing::info!(
        "{} loader: {} batches, {} students, longest sequence {}",
        name, report.batches, report.students, report.max_len
    );
    report
}

/// What a prepare run produced, independent of the backend.
#[derive(Debug, Clone)]
pub struct PrepareReport {
    pub summary: RunSummary,
    pub train:   LoaderReport,
    pub valid:   LoaderReport,
    pub test:    LoaderReport,
}

pub struct PrepareUseCase {
    config:     LoadConfig,
    output_dir: Option<String>,
}

impl PrepareUseCase {
    pub fn new(config: LoadConfig, output_dir: Option<String>) -> Self {
        Self { config, output_dir }
    }

    pub fn execute(&self) -> Result<PrepareReport> {
        // ── Step 1: backend ──────────────────────────────────────────────────
        if self.config.use_gpu {
            let device = WgpuDevice::default();
            tracing::info!("Using WGPU device: {:?}", device);
            self.run::<Wgpu>(&device)
        } else {
            let device = NdArrayDevice::default();
            tracing::info!("Using NdArray device: {:?}", device);
            self.run::<NdArray>(&device)
        }
    }

    fn run<B: Backend>(&self, device: &B::Device) -> Result<PrepareReport> {
        let cfg = &self.config;

        // ── Step 2: pipeline ─────────────────────────────────────────────────
        let data: LoadedData<B> = load_dataset(cfg, device)?;
        tracing::info!(
            "Prepared {} students over {} concepts",
            data.summary.student_num, data.concept_num
        );

        // ── Step 3: walk loaders ─────────────────────────────────────────────
        let train = walk("train", &data.train_loader);
        let valid = walk("valid", &data.valid_loader);
        let test  = walk("test", &data.test_loader);

        let summary = RunSummary {
            dataset:     data.summary,
            train_size:  data.split.train.len(),
            val_size:    data.split.val.len(),
            test_size:   data.split.test.len(),
            graph_type:  data.adjacency.as_ref().map(|_| cfg.graph_type.to_string()),
            graph_edges: data.adjacency.as_ref().map(|g| g.edge_count()),
        };

        // ── Step 4: export ───────────────────────────────────────────────────
        if let Some(dir) = &self.output_dir {
            let exporter = Exporter::new(dir)?;
            exporter.save_summary(&summary)?;
            exporter.save_config(cfg)?;
            if let Some(graph) = &data.adjacency {
                exporter.save_graph(graph)?;
            }
            tracing::info!("Exported results to '{}'", exporter.dir().display());
        }

        Ok(PrepareReport { summary, train, valid, test })
    }
}
