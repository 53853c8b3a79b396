//! `rebalance` - run the abalone resampling study from the terminal.
//!
//! Study output goes to stdout, logs to stderr.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use rebalance::datasets::load_abalone_like;
use rebalance::io::{read_table, Frame};
use rebalance::{save_report, Study, StudyConfig, StudyReport};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "rebalance")]
#[command(about = "Compare resampling strategies on an imbalanced classification task", long_about = None)]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the full study on a data file (CSV or KEEL .dat)
    Run {
        /// Input table
        data: PathBuf,

        #[command(flatten)]
        options: StudyOptions,
    },
    /// Run the full study on the built-in synthetic abalone set
    Demo {
        /// Seed of the generated data
        #[arg(long, default_value_t = 50)]
        seed: u64,

        #[command(flatten)]
        options: StudyOptions,
    },
    /// Print only the exploratory section for a data file
    Describe {
        /// Input table
        data: PathBuf,

        /// Study configuration (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
struct StudyOptions {
    /// Study configuration (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Skip the pair plot
    #[arg(long)]
    no_pairplot: bool,

    /// Write the study report as JSON
    #[arg(long)]
    json: Option<PathBuf>,

    /// Write every resampled training set as CSV into this directory
    #[arg(long)]
    export_dir: Option<PathBuf>,
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("rebalance=debug,info"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<StudyConfig> {
    match path {
        Some(p) => StudyConfig::load(p)
            .with_context(|| format!("failed to load configuration from {}", p.display())),
        None => Ok(StudyConfig::default()),
    }
}

fn load_data(path: &Path) -> Result<Frame> {
    read_table(path).with_context(|| format!("failed to read data from {}", path.display()))
}

fn run_study(frame: &Frame, options: &StudyOptions) -> Result<StudyReport> {
    let mut config = load_config(options.config.as_deref())?;
    if options.no_pairplot {
        config.pair_plot = false;
    }

    let mut study = Study::new(config);
    if let Some(dir) = &options.export_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create export directory {}", dir.display()))?;
        study = study.with_export_dir(dir);
    }
    let report = study.run(frame).context("study failed")?;

    if let Some(path) = &options.json {
        save_report(path, &report)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        info!(path = %path.display(), "wrote study report");
    }
    Ok(report)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Run { data, options } => {
            let frame = load_data(&data)?;
            let report = run_study(&frame, &options)?;
            info!(evaluations = report.evaluations.len(), "study finished");
        }
        Command::Demo { seed, options } => {
            let frame = load_abalone_like(Some(seed)).context("failed to generate demo data")?;
            let report = run_study(&frame, &options)?;
            info!(evaluations = report.evaluations.len(), "study finished");
        }
        Command::Describe { data, config } => {
            let frame = load_data(&data)?;
            let config = load_config(config.as_deref())?;
            Study::new(config)
                .explore(&frame)
                .context("exploration failed")?;
        }
    }
    Ok(())
}
