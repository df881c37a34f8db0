// ==============================================================================
// models.rs - QQ Result Data Models
// ==============================================================================
// Description: Variants, QQ points, MAF strata and per-phenotype QQ documents
// Version: 1.0.0
// ==============================================================================

use serde::ser::{SerializeMap, SerializeTuple};
use serde::{Deserialize, Serialize, Serializer};
use std::path::PathBuf;

use crate::config::QQ_COORD_SIG_DIGITS;
use crate::gc::round_sig;

/// Variant reduced to the two values the QQ statistics need
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Variant {
    /// -log10(p-value), finite and >= 0
    pub neglog10_pval: f64,

    /// Minor allele frequency (0.0 to 0.5), None if the phenotype has no frequency data
    pub maf: Option<f64>,
}

/// One plotted QQ point: (expected, observed) -log10(p)
///
/// Serialized as a two-element array with each coordinate rounded to
/// `QQ_COORD_SIG_DIGITS` significant digits.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct QqPoint {
    pub expected: f64,
    pub observed: f64,
}

impl QqPoint {
    pub fn new(expected: f64, observed: f64) -> Self {
        Self { expected, observed }
    }
}

impl Serialize for QqPoint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut pair = serializer.serialize_tuple(2)?;
        pair.serialize_element(&round_sig(self.expected, QQ_COORD_SIG_DIGITS))?;
        pair.serialize_element(&round_sig(self.observed, QQ_COORD_SIG_DIGITS))?;
        pair.end()
    }
}

/// Genomic-control lambdas keyed by quantile label, kept in insertion order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GcLambdaTable {
    entries: Vec<(&'static str, f64)>,
}

impl GcLambdaTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, label: &'static str, value: f64) {
        debug_assert!(value.is_finite(), "non-finite lambda for {}", label);
        match self.entries.iter_mut().find(|(l, _)| *l == label) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((label, value)),
        }
    }

    pub fn get(&self, label: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(l, _)| *l == label)
            .map(|(_, v)| *v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        self.entries.iter().copied()
    }
}

impl Serialize for GcLambdaTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (label, value) in &self.entries {
            map.serialize_entry(label, value)?;
        }
        map.end()
    }
}

/// QQ data for one MAF stratum
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stratum {
    /// (lowest MAF, highest MAF) among the stratum's variants
    pub maf_range: (f64, f64),
    pub count: usize,
    pub qq: Vec<QqPoint>,
}

/// Statistics over every variant of a phenotype
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverallSummary {
    /// Omitted when the phenotype is stratified by MAF
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qq: Option<Vec<QqPoint>>,
    pub count: usize,
    pub gc_lambda: GcLambdaTable,
}

/// Complete QQ document written for one phenotype
///
/// A phenotype without any usable variant yields the empty document `{}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PhenotypeResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overall: Option<OverallSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub by_maf: Option<Vec<Stratum>>,
}

impl PhenotypeResult {
    pub fn is_empty(&self) -> bool {
        self.overall.is_none() && self.by_maf.is_none()
    }
}

/// Phenotype descriptor as listed in pheno-list.json
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Phenotype {
    /// Unique phenotype identifier, also the source/destination file stem
    pub phenocode: String,

    /// Original association files this phenotype was loaded from
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assoc_files: Vec<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_samples: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_cases: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_controls: Option<u64>,

    /// Any other descriptor fields, carried through untouched
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Phenotype {
    pub fn new(phenocode: impl Into<String>) -> Self {
        Self {
            phenocode: phenocode.into(),
            assoc_files: Vec::new(),
            num_samples: None,
            num_cases: None,
            num_controls: None,
            extra: serde_json::Map::new(),
        }
    }

    /// Number of samples, from `num_samples` or else cases + controls
    pub fn sample_count(&self) -> Option<u64> {
        self.num_samples.or(match (self.num_cases, self.num_controls) {
            (Some(cases), Some(controls)) => Some(cases + controls),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qq_point_serializes_as_rounded_pair() {
        let point = QqPoint::new(1.234567891, 0.000123456789);
        let json = serde_json::to_string(&point).unwrap();
        assert_eq!(json, "[1.2346,0.00012346]");
    }

    #[test]
    fn test_gc_lambda_table_keeps_quantile_order() {
        let mut table = GcLambdaTable::new();
        table.insert("0.5", 1.0123);
        table.insert("0.1", 1.05);
        table.insert("0.001", 0.98);
        assert_eq!(table.len(), 3);
        assert_eq!(table.get("0.1"), Some(1.05));
        assert_eq!(table.get("0.01"), None);

        let json = serde_json::to_string(&table).unwrap();
        assert_eq!(json, r#"{"0.5":1.0123,"0.1":1.05,"0.001":0.98}"#);
    }

    #[test]
    fn test_empty_result_serializes_as_empty_object() {
        let result = PhenotypeResult::default();
        assert!(result.is_empty());
        assert_eq!(serde_json::to_string(&result).unwrap(), "{}");
    }

    #[test]
    fn test_stratified_result_omits_overall_qq() {
        let result = PhenotypeResult {
            overall: Some(OverallSummary {
                qq: None,
                count: 1,
                gc_lambda: GcLambdaTable::new(),
            }),
            by_maf: Some(vec![Stratum {
                maf_range: (0.1, 0.1),
                count: 1,
                qq: vec![QqPoint::new(0.30103, 2.0)],
            }]),
        };
        let value = serde_json::to_value(&result).unwrap();
        assert!(value["overall"].get("qq").is_none());
        assert_eq!(value["overall"]["count"], 1);
        assert_eq!(value["by_maf"][0]["maf_range"], serde_json::json!([0.1, 0.1]));
        assert_eq!(value["by_maf"][0]["qq"][0], serde_json::json!([0.30103, 2.0]));
    }

    #[test]
    fn test_phenotype_sample_count() {
        let descriptor: Phenotype = serde_json::from_str(
            r#"{"phenocode": "250.2", "num_cases": 120, "num_controls": 880, "category": "endocrine"}"#,
        )
        .unwrap();
        assert_eq!(descriptor.sample_count(), Some(1000));
        assert_eq!(descriptor.extra["category"], "endocrine");

        let mut with_total = Phenotype::new("X");
        with_total.num_samples = Some(50);
        with_total.num_cases = Some(1);
        assert_eq!(with_total.sample_count(), Some(50));

        assert_eq!(Phenotype::new("Y").sample_count(), None);
    }
}
