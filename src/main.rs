//! ScandEval - Main entry point

use anyhow::{Context, Result};
use clap::Parser;
use scandeval::{Benchmark, BenchmarkRequest, FilterSelection, config::BenchmarkConfig};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "scandeval")]
#[command(about = "Benchmark language models on Scandinavian datasets", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Model ID to benchmark (repeatable). Defaults to models found on the hub
    #[arg(short, long = "model-id")]
    model_id: Vec<String>,

    /// Dataset key to benchmark on (repeatable). Defaults to all datasets
    #[arg(short, long)]
    dataset: Vec<String>,

    /// Language code to filter hub models by (repeatable, or "all")
    #[arg(short, long)]
    language: Vec<String>,

    /// Task to filter hub models by (repeatable, or "all")
    #[arg(short, long)]
    task: Vec<String>,

    /// Override number of fine-tunings per dataset
    #[arg(long)]
    num_finetunings: Option<u32>,

    /// Override batch size (1, 2, 4, 8, 16 or 32)
    #[arg(long)]
    batch_size: Option<u32>,

    /// Also evaluate on the training split
    #[arg(long)]
    evaluate_train: bool,

    /// Disable progress bars in the fine-tuning command
    #[arg(long)]
    no_progress_bar: bool,

    /// Write results to the configured results path
    #[arg(long)]
    save_results: bool,

    /// Verbose fine-tuning output; also raises the default log level to debug
    #[arg(short, long)]
    verbose: bool,

    /// Print the registered datasets and exit
    #[arg(long)]
    list_datasets: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Log format (json or pretty)
    #[arg(long, default_value = "json")]
    log_format: String,
}

impl Cli {
    fn request(&self) -> BenchmarkRequest {
        let mut request = BenchmarkRequest::new();

        if !self.model_id.is_empty() {
            request = request.models(self.model_id.clone());
        }
        if !self.dataset.is_empty() {
            request = request.datasets(self.dataset.clone());
        }
        if !self.language.is_empty() {
            request = request.language(FilterSelection::from_codes(self.language.iter().cloned()));
        }
        if !self.task.is_empty() {
            request = request.task(FilterSelection::from_codes(self.task.iter().cloned()));
        }
        if let Some(n) = self.num_finetunings {
            request = request.num_finetunings(n);
        }
        if let Some(batch_size) = self.batch_size {
            request = request.batch_size(batch_size);
        }
        if self.evaluate_train {
            request = request.evaluate_train(true);
        }
        if self.no_progress_bar {
            request = request.progress_bar(false);
        }
        if self.save_results {
            request = request.save_results(true);
        }
        if self.verbose {
            request = request.verbose(true);
        }

        request
    }
}

/// Verbose runs log at debug unless `--log-level` says otherwise
fn default_log_level(verbose: bool) -> &'static str {
    if verbose { "debug" } else { "info" }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = BenchmarkConfig::load(cli.config.clone())?;

    let log_level = cli.log_level.clone().unwrap_or_else(|| {
        default_log_level(cli.verbose || config.verbose).to_string()
    });

    // Setup logging
    match cli.log_format.as_str() {
        "pretty" => {
            tracing_subscriber::fmt()
                .with_env_filter(&log_level)
                .with_writer(std::io::stderr)
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(&log_level)
                .with_writer(std::io::stderr)
                .json()
                .init();
        }
    }

    config.validate()?;

    tracing::info!(
        num_finetunings = config.num_finetunings,
        batch_size = config.batch_size,
        results_path = ?config.results_path,
        runner = %config.runner.binary,
        "Configuration loaded"
    );

    let mut benchmark = Benchmark::new(config).context("Failed to create benchmark")?;

    if cli.list_datasets {
        for registration in benchmark.registry().iter() {
            println!("{}\t{}", registration.key, registration.alias);
        }
        return Ok(());
    }

    let results = benchmark
        .run(cli.request())
        .await
        .context("Benchmark failed")?;

    println!(
        "{}",
        serde_json::to_string_pretty(results).context("Failed to serialize results")?
    );

    Ok(())
}
