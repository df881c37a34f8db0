// ==============================================================================
// conversions.rs - Stale Phenotype Detection
// ==============================================================================
// Description: Decides which phenotypes need their QQ JSON (re)generated
// Version: 1.0.0
// ==============================================================================

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use qq_processor::config::DataLayout;
use qq_processor::models::Phenotype;

/// One unit of work for the pool: a phenotype and its source/destination files
#[derive(Debug, Clone)]
pub struct ConversionJob {
    pub src: PathBuf,
    pub dest: PathBuf,
    pub pheno: Phenotype,
}

/// Jobs for every phenotype whose destination is missing or older than its source
///
/// With `force`, every phenotype is scheduled.
pub fn get_conversions_to_do(
    phenotypes: &[Phenotype],
    layout: &DataLayout,
    force: bool,
) -> Result<Vec<ConversionJob>> {
    let mut jobs = Vec::new();

    for pheno in phenotypes {
        let src = layout.source_path(&pheno.phenocode);
        let dest = layout.dest_path(&pheno.phenocode);

        if force || needs_update(&src, &dest)? {
            jobs.push(ConversionJob {
                src,
                dest,
                pheno: pheno.clone(),
            });
        } else {
            debug!("{} is up to date", pheno.phenocode);
        }
    }

    Ok(jobs)
}

/// True when `dest` is absent or was modified before `src`
fn needs_update(src: &Path, dest: &Path) -> Result<bool> {
    let dest_mtime = match std::fs::metadata(dest) {
        Ok(meta) => meta
            .modified()
            .with_context(|| format!("Failed to read mtime of {:?}", dest))?,
        Err(_) => return Ok(true),
    };

    match std::fs::metadata(src) {
        Ok(meta) => {
            let src_mtime = meta
                .modified()
                .with_context(|| format!("Failed to read mtime of {:?}", src))?;
            Ok(dest_mtime < src_mtime)
        }
        Err(e) => {
            // Output exists but input is gone; keep the output as-is
            warn!("Source {:?} unavailable ({}), keeping {:?}", src, e, dest);
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::time::{Duration, SystemTime};
    use tempfile::TempDir;

    fn setup() -> (TempDir, DataLayout) {
        let dir = TempDir::new().unwrap();
        let layout = DataLayout::new(dir.path());
        std::fs::create_dir_all(layout.augmented_pheno_dir()).unwrap();
        std::fs::create_dir_all(layout.qq_dir()).unwrap();
        (dir, layout)
    }

    fn touch(path: &Path, mtime: SystemTime) {
        let file = File::create(path).unwrap();
        file.set_modified(mtime).unwrap();
    }

    #[test]
    fn test_missing_destination_is_scheduled() {
        let (_dir, layout) = setup();
        touch(&layout.source_path("A"), SystemTime::now());

        let jobs = get_conversions_to_do(&[Phenotype::new("A")], &layout, false).unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].src, layout.source_path("A"));
        assert_eq!(jobs[0].dest, layout.dest_path("A"));
    }

    #[test]
    fn test_staleness_by_mtime() {
        let (_dir, layout) = setup();
        let now = SystemTime::now();
        let earlier = now - Duration::from_secs(3600);

        // Fresh: output newer than input
        touch(&layout.source_path("fresh"), earlier);
        touch(&layout.dest_path("fresh"), now);
        // Stale: input rewritten after output
        touch(&layout.source_path("stale"), now);
        touch(&layout.dest_path("stale"), earlier);

        let phenotypes = vec![Phenotype::new("fresh"), Phenotype::new("stale")];
        let jobs = get_conversions_to_do(&phenotypes, &layout, false).unwrap();
        let codes: Vec<&str> = jobs.iter().map(|j| j.pheno.phenocode.as_str()).collect();
        assert_eq!(codes, vec!["stale"]);

        let forced = get_conversions_to_do(&phenotypes, &layout, true).unwrap();
        assert_eq!(forced.len(), 2);
    }

    #[test]
    fn test_output_without_source_is_kept() {
        let (_dir, layout) = setup();
        touch(&layout.dest_path("orphan"), SystemTime::now());

        let jobs = get_conversions_to_do(&[Phenotype::new("orphan")], &layout, false).unwrap();
        assert!(jobs.is_empty());
    }
}
