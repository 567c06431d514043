//! casc-bruteforce: recover CASC file names from Jenkins96 hashes
//!
//! Usage:
//!   casc-bruteforce --device cpu 'INTERFACE\ICONS\%%%%.BLP'
//!   casc-bruteforce --mirrored masks.txt
//!   casc-bruteforce --benchmark '%%%%%%'

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use casc_core::TargetHashSet;
use casc_search::config::{DEFAULT_LISTFILE_CACHE, DEFAULT_OUTPUT, LISTFILE_URL};
use casc_search::{
    append_results, load_masks, open_backend, render_summary, Bruteforcer, DeviceClass,
    ListfileCache, ListfileConfig, SearchConfig, BENCHMARK_HASH,
};

#[derive(Parser, Debug)]
#[command(name = "casc-bruteforce")]
#[command(about = "Brute-force CASC file names from unknown Jenkins96 hashes")]
struct Args {
    /// Mask containing `%` wildcards, or a file with one mask per line
    mask: String,

    /// Compute device class: cpu, gpu or any
    #[arg(long, default_value = "any")]
    device: DeviceClass,

    /// Treat each mask as two identical halves (even wildcard count)
    #[arg(long)]
    mirrored: bool,

    /// CPU worker threads [default: all cores]
    #[arg(long, short = 't')]
    threads: Option<usize>,

    /// Unknown-hash listfile URL
    #[arg(long, default_value = LISTFILE_URL)]
    listfile_url: String,

    /// Local cache of the unknown-hash listfile
    #[arg(long, default_value = DEFAULT_LISTFILE_CACHE)]
    listfile_cache: PathBuf,

    /// Re-download the listfile once the cache is this many hours old
    #[arg(long, default_value_t = 6)]
    max_age_hours: u64,

    /// File that found names are appended to
    #[arg(long, default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Do not append results to the output file
    #[arg(long)]
    no_export: bool,

    /// Search for a fixed benchmark hash instead of the listfile
    #[arg(long)]
    benchmark: bool,

    /// Print the full run report as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let config = SearchConfig {
        device: args.device,
        mirrored: args.mirrored,
        threads: args.threads,
        benchmark: args.benchmark,
    };

    let masks = load_masks(&args.mask)?;

    let targets = if config.benchmark {
        TargetHashSet::from_hashes([BENCHMARK_HASH])?
    } else {
        let cache = ListfileCache::new(ListfileConfig {
            url: args.listfile_url.clone(),
            cache_path: args.listfile_cache.clone(),
            max_age: Duration::from_secs(args.max_age_hours * 60 * 60),
        });
        let lines = cache.fetch().await?;
        TargetHashSet::build(&lines)?
    };

    tracing::info!(
        masks = masks.len(),
        hashes = targets.target_count(),
        device = %config.device,
        "Loading kernel - this may take a minute..."
    );

    let backend = open_backend(config.device, config.threads)?;

    let progress = ProgressBar::new(masks.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40}] {pos}/{len} masks {msg}")
            .context("invalid progress template")?,
    );

    let bar = progress.clone();
    let report = tokio::task::spawn_blocking(move || {
        let mut bruteforcer = Bruteforcer::new(backend, Arc::new(targets), config);
        bruteforcer.run_with_progress(&masks, |outcome| {
            bar.set_message(outcome.mask.clone());
            bar.inc(1);
        })
    })
    .await
    .context("search task panicked")?;
    progress.finish_and_clear();

    print!("{}", render_summary(&report.results));

    if !report.config.benchmark && !args.no_export && !report.results.is_empty() {
        append_results(&args.output, &report.results)?;
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    Ok(())
}
