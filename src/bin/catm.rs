//! CLI entry point for the `catm` command-line tool.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use cat_mastery::cli::commands::{self, CommandContext};
use cat_mastery::config;
use cat_mastery::store::JsonFileStore;
use cat_mastery::CatError;

#[derive(Parser)]
#[command(
    name = "catm",
    about = "Adaptive testing and mastery tracking over a JSON data directory"
)]
struct Cli {
    /// Output format: "text" (default) or "json"
    #[arg(long, default_value = "text")]
    format: String,

    /// Enable debug logging
    #[arg(long)]
    verbose: bool,

    /// Path to a TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Data directory (overrides config and CAT_DATA_DIR)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize the domain graph and, optionally, a learner's mastery
    Info {
        /// Learner ID
        #[arg(long)]
        learner: Option<String>,
        /// Number of recently attempted concepts to show
        #[arg(long, default_value = "5")]
        recent: usize,
    },
    /// List the prerequisites of a concept
    Prereqs {
        /// Concept ID
        concept_id: String,
        /// Include indirect prerequisites
        #[arg(long)]
        transitive: bool,
        /// Show only prerequisites this learner has not made functional
        #[arg(long)]
        learner: Option<String>,
    },
    /// Check the domain graph for dependency cycles
    Cycles {
        /// Only search from this node
        #[arg(long)]
        start: Option<String>,
    },
    /// Run a scripted adaptive session and update mastery
    Run {
        /// Learner ID
        learner: String,
        /// Comma-separated answers, e.g. "1,0,1" or "c,i,c"
        answers: String,
        /// Restrict the item pool to one topic
        #[arg(long)]
        topic: Option<String>,
    },
    /// Apply time-based decay to a learner's mastery
    Decay {
        /// Learner ID
        learner: String,
        /// Decay window in days (defaults to config)
        #[arg(long)]
        window: Option<f64>,
        /// Evaluate as of this time (Unix microseconds)
        #[arg(long)]
        now: Option<u64>,
    },
    /// List concepts due for spaced review
    Due {
        /// Learner ID
        learner: String,
        /// Evaluate as of this time (Unix microseconds)
        #[arg(long)]
        now: Option<u64>,
    },
    /// List a learner's weakest concepts
    Weakest {
        /// Learner ID
        learner: String,
        /// Maximum concepts to show
        #[arg(long, default_value = "10")]
        limit: usize,
    },
    /// List concepts at risk of being forgotten
    AtRisk {
        /// Learner ID
        learner: String,
        /// Minimum decay risk (defaults to config)
        #[arg(long)]
        threshold: Option<f64>,
    },
}

fn main() {
    let cli = Cli::parse();
    let json = cli.format == "json";

    let config = match config::load_or_default(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(3);
        }
    };

    let level = if cli.verbose {
        "debug"
    } else {
        config.log_level.as_str()
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let data_dir = config.data_dir(cli.data_dir.as_deref());
    log::debug!("data dir: {}", data_dir.display());

    let mut ctx = CommandContext {
        store: JsonFileStore::new(data_dir),
        config,
        json,
    };

    let result = match cli.command {
        Commands::Info { learner, recent } => commands::cmd_info(&ctx, learner.as_deref(), recent),
        Commands::Prereqs {
            concept_id,
            transitive,
            learner,
        } => commands::cmd_prereqs(&ctx, &concept_id, transitive, learner.as_deref()),
        Commands::Cycles { start } => match commands::cmd_cycles(&ctx, start.as_deref()) {
            Ok(true) => process::exit(6),
            Ok(false) => Ok(()),
            Err(e) => Err(e),
        },
        Commands::Run {
            learner,
            answers,
            topic,
        } => commands::parse_answers(&answers)
            .and_then(|answers| commands::cmd_run(&mut ctx, &learner, topic.as_deref(), &answers)),
        Commands::Decay {
            learner,
            window,
            now,
        } => commands::cmd_decay(&mut ctx, &learner, window, now),
        Commands::Due { learner, now } => commands::cmd_due(&ctx, &learner, now),
        Commands::Weakest { learner, limit } => commands::cmd_weakest(&ctx, &learner, limit),
        Commands::AtRisk { learner, threshold } => {
            commands::cmd_at_risk(&ctx, &learner, threshold)
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        let code = match &e {
            CatError::Io(_) => 1,
            CatError::Json(_) => 2,
            CatError::Config(_)
            | CatError::InvalidCriteria(_)
            | CatError::InvalidDecayWindow(_)
            | CatError::InvalidLearner(_)
            | CatError::InvalidItem { .. }
            | CatError::LearnerMismatch { .. } => 3,
            CatError::NodeNotFound(_)
            | CatError::InvalidEdgeTarget(_)
            | CatError::EdgeNotFound(_) => 4,
            _ => 5,
        };
        process::exit(code);
    }
}
