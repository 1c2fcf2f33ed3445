use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use ez_diffusion::{run_sweep, ExperimentConfig, RecoveryReport};

#[derive(Debug, Parser)]
#[command(name = "ez-diffusion")]
#[command(about = "EZ-diffusion simulate-and-recover sweep over sample sizes")]
struct Cli {
    /// TOML experiment config (falls back to configs/default.toml, then built-in defaults)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Comma-separated sample sizes, e.g. 10,40,4000
    #[arg(long, value_delimiter = ',')]
    sample_sizes: Option<Vec<u64>>,

    /// Trials per sample size
    #[arg(long)]
    iterations: Option<usize>,

    /// Seed for every experiment stream
    #[arg(long, conflicts_with = "unseeded")]
    seed: Option<u64>,

    /// Seed every experiment stream from OS entropy
    #[arg(long, default_value_t = false)]
    unseeded: bool,

    /// Print reports as JSON instead of text
    #[arg(long, default_value_t = false)]
    json: bool,
}

fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    let local = PathBuf::from("configs").join("default.toml");
    if local.exists() {
        return Some(local);
    }

    let bundled = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("configs")
        .join("default.toml");
    bundled.exists().then_some(bundled)
}

fn load_config(cli: &Cli) -> Result<ExperimentConfig> {
    let mut cfg = match resolve_config_path(cli.config.as_deref()) {
        Some(path) => ExperimentConfig::from_toml_file(&path)
            .with_context(|| format!("failed to load config file: {}", path.display()))?,
        None => ExperimentConfig::default(),
    };

    if let Some(sizes) = &cli.sample_sizes {
        cfg.sample_sizes = sizes.clone();
    }
    if let Some(iterations) = cli.iterations {
        cfg.iterations = iterations;
    }
    if let Some(seed) = cli.seed {
        cfg.seed = Some(seed);
    }
    if cli.unseeded {
        cfg.seed = None;
    }

    cfg.validate().context("invalid experiment configuration")?;
    Ok(cfg)
}

fn fmt_components(values: &[f64; 3]) -> String {
    format!("[{:.6}, {:.6}, {:.6}]", values[0], values[1], values[2])
}

fn print_report(report: &RecoveryReport) {
    println!("Sample size: {}", report.sample_size);
    println!(
        "Mean bias [drift, boundary, nondecision]: {}",
        fmt_components(&report.mean_bias)
    );
    println!(
        "Mean squared error [drift, boundary, nondecision]: {}",
        fmt_components(&report.mean_squared_error)
    );
    if report.failed_trials > 0 {
        println!(
            "Failed trials: {} of {}",
            report.failed_trials, report.iterations
        );
    }
    println!("----------------------------");
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = load_config(&cli)?;

    if cli.json {
        let reports = run_sweep(&cfg)?;
        println!("{}", serde_json::to_string_pretty(&reports)?);
        return Ok(());
    }

    println!(
        "Executing simulation and recovery process ({} iterations per sample size)...",
        cfg.iterations
    );
    let reports = run_sweep(&cfg)?;
    for report in &reports {
        print_report(report);
    }
    println!("Process completed!");

    Ok(())
}
