// ==============================================================================
// main.rs - QQ Worker Process
// ==============================================================================
// Description: Regenerates QQ JSON for every phenotype whose input changed
// Version: 1.0.0
// ==============================================================================

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod conversions;
mod pool;

use conversions::get_conversions_to_do;
use pool::run_conversions;
use qq_processor::config::DataLayout;
use qq_processor::parsers::read_phenolist;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Data directory path
    #[arg(short, long, env = "PHEWEB_DATA_DIR", default_value = "generated-by-pheweb")]
    data_dir: PathBuf,

    /// Phenotype list (defaults to <data-dir>/pheno-list.json)
    #[arg(long, env = "PHEWEB_PHENOLIST")]
    phenolist: Option<PathBuf>,

    /// Number of phenotypes processed concurrently (defaults to available cores)
    #[arg(short, long, env = "PHEWEB_NUM_PROCS")]
    num_procs: Option<usize>,

    /// Only consider these phenocodes (repeatable)
    #[arg(long = "phenocode")]
    phenocodes: Vec<String>,

    /// Regenerate outputs even when they are newer than their inputs
    #[arg(long)]
    force: bool,

    /// Exit with an error status if any phenotype failed
    #[arg(long)]
    fail_on_error: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    let args = Args::parse();
    let layout = DataLayout::new(&args.data_dir);

    let phenolist_path = args
        .phenolist
        .clone()
        .unwrap_or_else(|| layout.phenolist_path());
    let mut phenotypes = read_phenolist(&phenolist_path)
        .with_context(|| format!("Failed to read phenotype list {:?}", phenolist_path))?;

    if !args.phenocodes.is_empty() {
        phenotypes.retain(|p| args.phenocodes.contains(&p.phenocode));
        for code in &args.phenocodes {
            if !phenotypes.iter().any(|p| &p.phenocode == code) {
                warn!("Phenocode {} is not in {:?}", code, phenolist_path);
            }
        }
    }

    std::fs::create_dir_all(layout.qq_dir())
        .with_context(|| format!("Failed to create {:?}", layout.qq_dir()))?;

    let jobs = get_conversions_to_do(&phenotypes, &layout, args.force)?;
    info!("number of phenos to process: {}", jobs.len());

    let num_procs = args.num_procs.unwrap_or_else(default_num_procs);
    info!("Running with {} concurrent jobs", num_procs);

    let summary = run_conversions(jobs, num_procs).await;

    if !summary.failed.is_empty() {
        let codes: Vec<&str> = summary.failed.iter().map(|f| f.phenocode.as_str()).collect();
        error!("{} phenotypes failed: {}", codes.len(), codes.join(", "));
        if args.fail_on_error {
            anyhow::bail!("{} phenotypes failed", codes.len());
        }
    }

    Ok(())
}

fn default_num_procs() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}
