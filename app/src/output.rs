// ==============================================================================
// output.rs - QQ JSON Output
// ==============================================================================
// Description: Writes a phenotype's QQ document to disk
// Version: 1.0.0
// ==============================================================================

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::models::PhenotypeResult;

/// Write `result` as compact JSON to `path`
///
/// The document is written to a sibling `.tmp` file and renamed into place, so
/// readers never observe a partially written file.
pub fn write_json(path: &Path, result: &PhenotypeResult) -> Result<PathBuf> {
    let tmp_path = tmp_path_for(path);
    debug!("Writing QQ JSON to {:?} via {:?}", path, tmp_path);

    let file = File::create(&tmp_path)
        .with_context(|| format!("Failed to create JSON output file {:?}", tmp_path))?;
    let mut writer = BufWriter::new(file);

    let written = serde_json::to_writer(&mut writer, result)
        .context("Failed to write JSON output")
        .and_then(|_| writer.flush().context("Failed to flush JSON output"));

    if let Err(e) = written {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(e);
    }
    drop(writer);

    std::fs::rename(&tmp_path, path)
        .with_context(|| format!("Failed to move {:?} into place at {:?}", tmp_path, path))?;

    Ok(path.to_path_buf())
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
