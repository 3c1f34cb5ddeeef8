use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

mod config;
mod diagnostics;
mod error;
mod hist;
mod model;
mod pipeline;
mod render;
mod source;

pub type Result<T> = anyhow::Result<T>;

#[derive(Parser)]
#[command(name = "calo-qa-plots")]
#[command(about = "Calorimeter QA plot generator", long_about = None)]
struct Cli {
    /// Log verbosity level (trace, debug, info, warn; error acts as warn)
    #[arg(long, global = true, default_value = "info")]
    log_level: tracing::Level,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Args)]
struct Common {
    /// QA config file (JSON).
    #[arg(long)]
    config: PathBuf,

    /// Draw raw counts instead of per-event, per-SEB rates.
    #[arg(long)]
    no_normalize: bool,

    /// Only run the plot requests for these histograms.
    #[arg(long = "hist", num_args = 1..)]
    hists: Vec<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Overlay each histogram across all runs on one canvas.
    Overlay {
        #[command(flatten)]
        common: Common,
    },
    /// One image per histogram and run.
    Single {
        #[command(flatten)]
        common: Common,

        /// Zero bins whose center lies below this value.
        #[arg(long)]
        cut: Option<f64>,

        /// Histograms the cut applies to (overrides cutSpec.appliesTo).
        #[arg(long = "cut-hist", num_args = 1..)]
        cut_hists: Vec<String>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(diagnostics::subscriber_level(cli.log_level))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let (mode, common, overrides) = match cli.cmd {
        Commands::Overlay { common } => {
            let o = config::Overrides {
                no_normalize: common.no_normalize,
                only_hists: common.hists.clone(),
                ..config::Overrides::default()
            };
            (pipeline::Mode::Overlay, common, o)
        }
        Commands::Single {
            common,
            cut,
            cut_hists,
        } => {
            let o = config::Overrides {
                no_normalize: common.no_normalize,
                cut,
                cut_hists,
                only_hists: common.hists.clone(),
            };
            (pipeline::Mode::Single, common, o)
        }
    };

    match run(&common.config, &overrides, mode) {
        Ok(summary) => {
            println!("{}", summary);
            summary.exit_code()
        }
        Err(e) => {
            tracing::error!("{:#}", e);
            pipeline::failure_exit_code(&e)
        }
    }
}

/// Load and validate the config, then run the batch.
fn run(
    config_path: &std::path::Path,
    overrides: &config::Overrides,
    mode: pipeline::Mode,
) -> Result<pipeline::Summary> {
    use anyhow::Context;

    let mut cfg = config::Config::load(config_path)
        .with_context(|| format!("load config {}", config_path.display()))?;
    cfg.apply(overrides)
        .context("apply command-line options")?;
    tracing::info!(
        runs = cfg.registry.runs().len(),
        requests = cfg.requests.len(),
        normalize = cfg.normalize_enabled,
        "config loaded"
    );

    let source = source::JsonContainerSource::from_config(&cfg);
    let mut canvas = render::PngCanvas;
    let summary = pipeline::run_batch(&cfg, &source, &mut canvas, mode)?;
    Ok(summary)
}
