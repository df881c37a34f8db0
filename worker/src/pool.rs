// ==============================================================================
// pool.rs - Bounded Parallel Job Execution
// ==============================================================================
// Description: Runs phenotype jobs concurrently with at most num_procs in flight
// Version: 1.0.0
// ==============================================================================
// Each job is CPU-bound and owns a disjoint output file, so jobs run on the
// blocking thread pool with no shared state. A job's error or panic is logged
// and recorded; it never stops its siblings.
// ==============================================================================

use std::any::Any;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};
use tracing::{error, info};

use qq_processor::models::Phenotype;
use qq_processor::processor::{make_json_file, JobReport};

use crate::conversions::ConversionJob;

/// A job that did not produce its output
#[derive(Debug, Clone)]
pub struct FailedJob {
    pub phenocode: String,
    pub src: PathBuf,
    pub dest: PathBuf,
    pub error: String,
}

/// Outcome of a driver run
#[derive(Debug, Default)]
pub struct RunSummary {
    pub succeeded: Vec<JobReport>,
    pub failed: Vec<FailedJob>,
}

/// Work performed for one job on the blocking pool
type JobFn = fn(&Path, &Path, &Phenotype) -> anyhow::Result<JobReport>;

/// Run every job, at most `num_procs` at a time, and collect the outcomes
///
/// Outcomes arrive in completion order, not submission order.
pub async fn run_conversions(jobs: Vec<ConversionJob>, num_procs: usize) -> RunSummary {
    run_jobs(jobs, num_procs, make_json_file).await
}

async fn run_jobs(jobs: Vec<ConversionJob>, num_procs: usize, run_job: JobFn) -> RunSummary {
    let semaphore = Arc::new(Semaphore::new(num_procs.max(1)));
    let mut tasks = JoinSet::new();

    for job in jobs {
        let semaphore = semaphore.clone();
        tasks.spawn(async move {
            let outcome = match semaphore.acquire_owned().await {
                Ok(_permit) => {
                    let blocking_job = job.clone();
                    tokio::task::spawn_blocking(move || {
                        run_job(&blocking_job.src, &blocking_job.dest, &blocking_job.pheno)
                    })
                    .await
                    .map_err(describe_join_error)
                    .and_then(|result| result.map_err(|e| format!("{:#}", e)))
                }
                Err(e) => Err(format!("worker pool closed: {}", e)),
            };
            (job, outcome)
        });
    }

    let mut summary = RunSummary::default();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((_, Ok(report))) => summary.succeeded.push(report),
            Ok((job, Err(e))) => {
                error!(
                    "Failed to process phenotype {} ({:?} -> {:?}): {}",
                    job.pheno.phenocode, job.src, job.dest, e
                );
                summary.failed.push(FailedJob {
                    phenocode: job.pheno.phenocode,
                    src: job.src,
                    dest: job.dest,
                    error: e,
                });
            }
            Err(e) => error!("Job task failed: {}", describe_join_error(e)),
        }
    }

    info!(
        "Finished: {} succeeded, {} failed",
        summary.succeeded.len(),
        summary.failed.len()
    );
    summary
}

fn describe_join_error(e: JoinError) -> String {
    if e.is_panic() {
        format!("panicked: {}", panic_message(e.into_panic().as_ref()))
    } else {
        format!("cancelled: {}", e)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg
    } else {
        "unknown panic payload"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qq_processor::config::DataLayout;
    use tempfile::TempDir;

    fn job(layout: &DataLayout, phenocode: &str) -> ConversionJob {
        ConversionJob {
            src: layout.source_path(phenocode),
            dest: layout.dest_path(phenocode),
            pheno: Phenotype::new(phenocode),
        }
    }

    #[tokio::test]
    async fn test_failed_job_does_not_stop_siblings() {
        let dir = TempDir::new().unwrap();
        let layout = DataLayout::new(dir.path());
        std::fs::create_dir_all(layout.augmented_pheno_dir()).unwrap();
        std::fs::create_dir_all(layout.qq_dir()).unwrap();

        std::fs::write(
            layout.source_path("good1"),
            "chrom\tpos\tref\talt\tpval\n1\t1\tA\tG\t0.01\n1\t2\tA\tG\t0.5\n",
        )
        .unwrap();
        std::fs::write(
            layout.source_path("good2"),
            "chrom\tpos\tref\talt\tpval\taf\n1\t1\tA\tG\t0.2\t0.3\n",
        )
        .unwrap();
        std::fs::write(
            layout.source_path("bad"),
            "chrom\tpos\tref\talt\tpval\n1\t1\tA\tG\tnot-a-pvalue\n",
        )
        .unwrap();

        let jobs = vec![
            job(&layout, "good1"),
            job(&layout, "bad"),
            job(&layout, "missing"),
            job(&layout, "good2"),
        ];
        let summary = run_conversions(jobs, 2).await;

        let mut succeeded: Vec<&str> = summary.succeeded.iter().map(|r| r.phenocode.as_str()).collect();
        succeeded.sort_unstable();
        assert_eq!(succeeded, vec!["good1", "good2"]);

        let mut failed: Vec<&str> = summary.failed.iter().map(|f| f.phenocode.as_str()).collect();
        failed.sort_unstable();
        assert_eq!(failed, vec!["bad", "missing"]);

        assert!(layout.dest_path("good1").exists());
        assert!(layout.dest_path("good2").exists());
        assert!(!layout.dest_path("bad").exists());

        let bad = summary.failed.iter().find(|f| f.phenocode == "bad").unwrap();
        assert_eq!(bad.src, layout.source_path("bad"));
        assert!(bad.error.contains("Malformed variant row"), "{}", bad.error);
    }

    #[tokio::test]
    async fn test_empty_job_list() {
        let summary = run_conversions(Vec::new(), 4).await;
        assert!(summary.succeeded.is_empty());
        assert!(summary.failed.is_empty());
    }

    #[tokio::test]
    async fn test_panicking_job_does_not_stop_siblings() {
        let dir = TempDir::new().unwrap();
        let layout = DataLayout::new(dir.path());
        std::fs::create_dir_all(layout.augmented_pheno_dir()).unwrap();
        std::fs::create_dir_all(layout.qq_dir()).unwrap();
        for code in ["before", "after"] {
            std::fs::write(
                layout.source_path(code),
                "chrom\tpos\tref\talt\tpval\n1\t1\tA\tG\t0.01\n",
            )
            .unwrap();
        }

        let jobs = vec![
            job(&layout, "before"),
            job(&layout, "unsorted"),
            job(&layout, "after"),
        ];
        let summary = run_jobs(jobs, 1, |src, dest, pheno| {
            if pheno.phenocode == "unsorted" {
                panic!("neglog10_pvals must be sorted in decreasing order");
            }
            make_json_file(src, dest, pheno)
        })
        .await;

        let mut succeeded: Vec<&str> = summary.succeeded.iter().map(|r| r.phenocode.as_str()).collect();
        succeeded.sort_unstable();
        assert_eq!(succeeded, vec!["after", "before"]);
        assert!(layout.dest_path("before").exists());
        assert!(layout.dest_path("after").exists());

        assert_eq!(summary.failed.len(), 1);
        let failed = &summary.failed[0];
        assert_eq!(failed.phenocode, "unsorted");
        assert_eq!(failed.src, layout.source_path("unsorted"));
        assert_eq!(
            failed.error,
            "panicked: neglog10_pvals must be sorted in decreasing order"
        );
    }

    #[tokio::test]
    async fn test_panic_is_reported() {
        let err = tokio::task::spawn_blocking(|| panic!("sorted decreasing"))
            .await
            .unwrap_err();
        assert_eq!(describe_join_error(err), "panicked: sorted decreasing");
    }
}
