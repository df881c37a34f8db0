// ==============================================================================
// variant_file.rs - Per-Phenotype Variant File Reader
// ==============================================================================
// Description: Streams association results (p-value, allele frequencies) per variant
// Version: 1.0.0
// ==============================================================================
// Format: Tab-delimited text with a header row, optionally gzip-compressed
// Example:
//   chrom    pos      ref    alt    rsids         pval      maf
//   1        869334   G      A      rs11514595    0.3246    0.0871
//   1        870806   T      C                    1.02e-05  0.2265
// Required columns: chrom, pos, ref, alt, pval. Optional: maf, af, ac.
// Other columns are ignored; empty cells read as missing values.
// ==============================================================================

use csv::{ReaderBuilder, StringRecord};
use flate2::read::MultiGzDecoder;
use serde::Deserialize;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::QqError;

/// Gzip magic number (RFC 1952)
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Association result for one variant
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VariantRecord {
    /// Chromosome ("1"-"22", "X", "Y", "MT")
    pub chrom: String,

    /// Base pair position
    pub pos: u64,

    /// Reference allele
    #[serde(rename = "ref")]
    pub ref_allele: String,

    /// Alternate allele
    #[serde(rename = "alt")]
    pub alt_allele: String,

    /// Association p-value (0.0 to 1.0)
    pub pval: f64,

    /// Minor allele frequency, if the study reported one
    #[serde(default)]
    pub maf: Option<f64>,

    /// Alternate allele frequency
    #[serde(default)]
    pub af: Option<f64>,

    /// Alternate allele count
    #[serde(default)]
    pub ac: Option<f64>,
}

impl VariantRecord {
    /// Identifier in chrom-pos-ref-alt form, used in log messages
    pub fn variant_id(&self) -> String {
        format!(
            "{}-{}-{}-{}",
            self.chrom, self.pos, self.ref_allele, self.alt_allele
        )
    }
}

/// Reader over one variant file
pub struct VariantFileReader {
    reader: csv::Reader<Box<dyn Read + Send>>,
    headers: StringRecord,
    record: StringRecord,
}

impl VariantFileReader {
    /// Open a variant file, transparently decompressing gzip input
    pub fn open(path: impl AsRef<Path>) -> Result<Self, QqError> {
        let path = path.as_ref().to_path_buf();
        let read_error = |source| QqError::ReadError {
            path: path.clone(),
            source,
        };

        let file = File::open(&path).map_err(read_error)?;
        let mut buffered = BufReader::new(file);
        let is_gzip = buffered.fill_buf().map_err(read_error)?.starts_with(&GZIP_MAGIC);

        debug!("Opening variant file {:?} (gzip: {})", path, is_gzip);

        let input: Box<dyn Read + Send> = if is_gzip {
            Box::new(MultiGzDecoder::new(buffered))
        } else {
            Box::new(buffered)
        };

        let mut reader = ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(true)
            .from_reader(input);

        let headers = reader
            .headers()
            .map_err(|e| malformed_row(e, 1))?
            .clone();

        Ok(Self {
            reader,
            headers,
            record: StringRecord::new(),
        })
    }

    /// Parse one row already read into `self.record`
    fn parse_record(&self, line: u64) -> Result<VariantRecord, QqError> {
        let record: VariantRecord = self
            .record
            .deserialize(Some(&self.headers))
            .map_err(|e| malformed_row(e, line))?;

        if !(0.0..=1.0).contains(&record.pval) {
            return Err(QqError::InvalidPvalue {
                line,
                value: record.pval,
            });
        }

        let frequencies = [("maf", record.maf, 0.5), ("af", record.af, 1.0)];
        for (column, value, upper) in frequencies {
            if let Some(value) = value.filter(|v| !(0.0..=upper).contains(v)) {
                return Err(QqError::InvalidFrequency { line, column, value });
            }
        }
        if let Some(ac) = record.ac.filter(|v| !v.is_finite() || *v < 0.0) {
            return Err(QqError::InvalidFrequency {
                line,
                column: "ac",
                value: ac,
            });
        }

        Ok(record)
    }
}

impl Iterator for VariantFileReader {
    type Item = Result<VariantRecord, QqError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.reader.read_record(&mut self.record) {
            Ok(false) => None,
            Ok(true) => {
                let line = self.record.position().map(|p| p.line()).unwrap_or(0);
                Some(self.parse_record(line))
            }
            Err(e) => {
                let line = e.position().map(|p| p.line()).unwrap_or(0);
                Some(Err(malformed_row(e, line)))
            }
        }
    }
}

fn malformed_row(error: csv::Error, line: u64) -> QqError {
    QqError::MalformedRow {
        line,
        details: error.to_string(),
    }
}
