// ==============================================================================
// main.rs - QQ Processor Entry Point
// ==============================================================================
// Description: Builds the QQ / GC lambda JSON for a single phenotype
// Version: 1.0.0
// ==============================================================================
// The qq-worker binary runs the same job for every stale phenotype in parallel;
// this entry point is for reprocessing or debugging one phenotype.
// ==============================================================================

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use qq_processor::config::DataLayout;
use qq_processor::models::Phenotype;
use qq_processor::parsers::read_phenolist;
use qq_processor::processor::make_json_file;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Phenocode to process
    #[arg(short, long)]
    phenocode: String,

    /// Data directory path
    #[arg(short, long, env = "PHEWEB_DATA_DIR", default_value = "generated-by-pheweb")]
    data_dir: PathBuf,

    /// Phenotype list (defaults to <data-dir>/pheno-list.json)
    #[arg(long)]
    phenolist: Option<PathBuf>,

    /// Variant file to read (defaults to <data-dir>/augmented_pheno/<phenocode>)
    #[arg(long)]
    src: Option<PathBuf>,

    /// JSON file to write (defaults to <data-dir>/qq/<phenocode>.json)
    #[arg(long)]
    dest: Option<PathBuf>,

    /// Sample count used to derive MAF from allele counts when the phenotype list lacks one
    #[arg(long)]
    num_samples: Option<u64>,
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "qq_processor=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let layout = DataLayout::new(&args.data_dir);

    let mut pheno = load_phenotype(&args, &layout)?;
    if pheno.sample_count().is_none() {
        pheno.num_samples = args.num_samples;
    }

    let src = args.src.unwrap_or_else(|| layout.source_path(&pheno.phenocode));
    let dest = args.dest.unwrap_or_else(|| layout.dest_path(&pheno.phenocode));
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory {:?}", parent))?;
    }

    let report = make_json_file(&src, &dest, &pheno)?;
    info!(
        "Wrote {:?}: {} variants, {} skipped with pval 0, stratified by MAF: {}",
        report.dest, report.variants_read, report.skipped_zero_pval, report.stratified
    );

    Ok(())
}

/// Descriptor from the phenotype list, or a bare one if the list is absent
fn load_phenotype(args: &Args, layout: &DataLayout) -> Result<Phenotype> {
    let phenolist_path = args
        .phenolist
        .clone()
        .unwrap_or_else(|| layout.phenolist_path());

    if !phenolist_path.exists() {
        warn!(
            "Phenotype list {:?} not found, processing {} without a descriptor",
            phenolist_path, args.phenocode
        );
        return Ok(Phenotype::new(args.phenocode.clone()));
    }

    read_phenolist(&phenolist_path)
        .with_context(|| format!("Failed to read phenotype list {:?}", phenolist_path))?
        .into_iter()
        .find(|p| p.phenocode == args.phenocode)
        .ok_or_else(|| {
            anyhow::anyhow!(
                "Phenocode {} not found in {:?}",
                args.phenocode,
                phenolist_path
            )
        })
}
