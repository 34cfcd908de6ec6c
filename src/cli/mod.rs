// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// This is the entry point for all user interaction.
// It uses the `clap` crate to parse command line arguments.
// All business logic is delegated to Layer 2 (application).
//
// Two commands are supported:
//   1. `prepare` — runs the full pipeline and reports on it
//   2. `graph`   — builds one concept graph and writes it out
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, GraphArgs, PrepareArgs};

#[derive(Parser, Debug)]
#[command(
    name = "kt-prep",
    version,
    about = "Prepare knowledge-tracing sequences, loaders and concept graphs from interaction logs."
)]
pub struct Cli {
    /// The subcommand to run (prepare or graph)
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Dispatch to the matching use case; this layer only routes.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Prepare(args) => run_prepare(args),
            Commands::Graph(args)   => run_graph(args),
        }
    }
}

fn run_prepare(args: PrepareArgs) -> Result<()> {
    use crate::application::prepare_use_case::PrepareUseCase;

    tracing::info!("Preparing data from: {}", args.load.file_path);

    let use_case = PrepareUseCase::new(args.load.into(), args.output_dir.clone());
    let report   = use_case.execute()?;

    let d = &report.summary.dataset;
    println!("Students:    {}", d.student_num);
    println!("Concepts:    {}", d.concept_num);
    println!("Max seq len: {}", d.max_seq_len);
    println!(
        "Split:       {} train / {} valid / {} test",
        report.summary.train_size, report.summary.val_size, report.summary.test_size
    );
    println!(
        "Batches:     {} train / {} valid / {} test",
        report.train.batches, report.valid.batches, report.test.batches
    );
    match (&report.summary.graph_type, report.summary.graph_edges) {
        (Some(kind), Some(edges)) => println!("Graph:       {kind} ({edges} edges)"),
        _                         => println!("Graph:       none"),
    }
    if let Some(dir) = args.output_dir {
        println!("Exported to: {dir}");
    }
    Ok(())
}

fn run_graph(args: GraphArgs) -> Result<()> {
    use crate::application::graph_use_case::GraphUseCase;

    tracing::info!("Building {} graph from: {}", args.load.graph_type, args.load.file_path);

    let path = GraphUseCase::new(args.load.into(), args.output_dir).execute()?;
    println!("Graph written to {}", path.display());
    Ok(())
}
