// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the two subcommands, `prepare` and `graph`, and the
// flags they share. Every LoadConfig field has a flag; the
// defaults below mirror LoadConfig::default().
//
// clap's derive macros automatically generate:
//   - help text (--help)
//   - error messages for bad values
//   - type conversion (string → usize, f64, GraphType, etc.)
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand};

use crate::application::load_use_case::{LoadConfig, ModelType, RelationPaths};
use crate::data::extractor::ColumnNames;
use crate::domain::interaction::ResponseEncoding;
use crate::graph::{relation::RelationShortfall, GraphType};

/// The two top-level subcommands available to the user
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the full pipeline: sequences, split, loaders and graph
    Prepare(PrepareArgs),

    /// Build only the concept graph and write it to a file
    Graph(GraphArgs),
}

/// Arguments for the `prepare` command
#[derive(Args, Debug)]
pub struct PrepareArgs {
    #[command(flatten)]
    pub load: LoadArgs,

    /// Write summary.json, load_config.json and graph.txt here
    #[arg(long)]
    pub output_dir: Option<String>,
}

/// Arguments for the `graph` command
#[derive(Args, Debug)]
pub struct GraphArgs {
    #[command(flatten)]
    pub load: LoadArgs,

    /// Directory that receives graph.txt
    #[arg(long, default_value = "output")]
    pub output_dir: String,
}

/// Flags shared by both commands; converted into a LoadConfig.
#[derive(Args, Debug)]
pub struct LoadArgs {
    /// Interaction log (one row per answered question)
    #[arg(long, default_value = "data/interactions.csv")]
    pub file_path: String,

    /// Students per batch
    #[arg(long, default_value_t = 128)]
    pub batch_size: usize,

    /// Dense, Transition, DKT, MyGraph, MyHMM, MyERF, MyFIR, My2Hop or My2HopD
    #[arg(long, default_value_t = GraphType::Dense)]
    pub graph_type: GraphType,

    /// Matrix file for --graph-type DKT
    #[arg(long)]
    pub dkt_graph_path: Option<String>,

    /// Share of students used for training
    #[arg(long, default_value_t = 0.7)]
    pub train_ratio: f64,

    /// Share of students used for validation; the rest is test
    #[arg(long, default_value_t = 0.2)]
    pub val_ratio: f64,

    /// Keep batches in split order
    #[arg(long)]
    pub no_shuffle: bool,

    /// GKT (uses a concept graph) or DKT (does not)
    #[arg(long, default_value = "GKT")]
    pub model_type: ModelType,

    /// Correctness column holds codes 1..=res_len instead of 0/1
    #[arg(long)]
    pub multi_valued: bool,

    /// Number of response codes when --multi-valued is set
    #[arg(long, default_value_t = 2)]
    pub res_len: i64,

    /// Run on the WGPU backend instead of NdArray
    #[arg(long)]
    pub use_gpu: bool,

    /// Seed for the split and the loader shuffles
    #[arg(long)]
    pub seed: Option<u64>,

    /// Background workers per data loader (0 = load on the caller's thread)
    #[arg(long, default_value_t = 0)]
    pub num_workers: usize,

    #[arg(long, default_value = "kc_uid")]
    pub concept_column: String,

    #[arg(long, default_value = "accuracy")]
    pub correctness_column: String,

    #[arg(long, default_value = "knowre_user_id")]
    pub student_column: String,

    /// from,to relation table (MyGraph, My2HopD)
    #[arg(long, default_value = "data/GT_SSM11_1116.csv")]
    pub pair_graph_path: String,

    #[arg(long, default_value = "data/HMM_11.csv")]
    pub hmm_path: String,

    #[arg(long, default_value = "data/ElaRF_ssm_11_relation.csv")]
    pub erf_path: String,

    #[arg(long, default_value = "data/FIR_ssm11.csv")]
    pub fir_path: String,

    /// Deduplicated concept list
    #[arg(long, default_value = "data/kc_dedup_smath11.csv")]
    pub concept_dedup_path: String,

    /// What MyERF/MyFIR do when a concept has fewer than 5 relations:
    /// truncate or fail
    #[arg(long, default_value_t = RelationShortfall::Truncate)]
    pub shortfall: RelationShortfall,
}

/// Convert CLI LoadArgs into the application-layer LoadConfig.
/// The application layer never sees clap types.
impl From<LoadArgs> for LoadConfig {
    fn from(a: LoadArgs) -> Self {
        let encoding = if a.multi_valued {
            ResponseEncoding::MultiValued { res_len: a.res_len }
        } else {
            ResponseEncoding::Binary
        };

        LoadConfig {
            file_path:      a.file_path,
            batch_size:     a.batch_size,
            graph_type:     a.graph_type,
            dkt_graph_path: a.dkt_graph_path,
            train_ratio:    a.train_ratio,
            val_ratio:      a.val_ratio,
            shuffle:        !a.no_shuffle,
            model_type:     a.model_type,
            encoding,
            use_gpu:        a.use_gpu,
            seed:           a.seed,
            num_workers:    a.num_workers,
            columns: ColumnNames {
                concept:     a.concept_column,
                correctness: a.correctness_column,
                student:     a.student_column,
            },
            relations: RelationPaths {
                pair_graph:    a.pair_graph_path,
                hmm:           a.hmm_path,
                erf:           a.erf_path,
                fir:           a.fir_path,
                concept_dedup: a.concept_dedup_path,
            },
            shortfall: a.shortfall,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;

    fn load_args(cmd: Commands) -> LoadArgs {
        match cmd {
            Commands::Prepare(a) => a.load,
            Commands::Graph(a)   => a.load,
        }
    }

    #[test]
    fn test_defaults_match_load_config() {
        let cli = Cli::try_parse_from(["kt-prep", "prepare"]).unwrap();
        let from_cli: LoadConfig = load_args(cli.command).into();
        let default = LoadConfig::default();

        assert_eq!(from_cli.file_path, default.file_path);
        assert_eq!(from_cli.batch_size, default.batch_size);
        assert_eq!(from_cli.graph_type, default.graph_type);
        assert_eq!(from_cli.model_type, default.model_type);
        assert_eq!(from_cli.encoding, default.encoding);
        assert_eq!(from_cli.shuffle, default.shuffle);
        assert_eq!(from_cli.columns, default.columns);
        assert_eq!(from_cli.relations, default.relations);
        assert_eq!(from_cli.shortfall, default.shortfall);
    }

    #[test]
    fn test_graph_command_flags() {
        let cli = Cli::try_parse_from([
            "kt-prep", "graph",
            "--graph-type", "my2hopd",
            "--multi-valued", "--res-len", "4",
            "--shortfall", "fail",
            "--no-shuffle",
            "--seed", "9",
            "--output-dir", "out",
        ])
        .unwrap();

        let Commands::Graph(args) = cli.command else { panic!("expected graph") };
        assert_eq!(args.output_dir, "out");

        let cfg: LoadConfig = args.load.into();
        assert_eq!(cfg.graph_type, GraphType::My2HopD);
        assert_eq!(cfg.encoding, ResponseEncoding::MultiValued { res_len: 4 });
        assert_eq!(cfg.shortfall, RelationShortfall::Fail);
        assert!(!cfg.shuffle);
        assert_eq!(cfg.seed, Some(9));
    }

    #[test]
    fn test_unknown_graph_type_rejected() {
        assert!(Cli::try_parse_from(["kt-prep", "prepare", "--graph-type", "Sparse"]).is_err());
    }
}
