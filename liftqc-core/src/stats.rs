//! Attribute and coverage aggregation
//!
//! Read-only queries over a feature store that feed the mapping-statistics
//! reports: which feature types exist, the Liftoff QC attributes of each
//! mapped gene, feature counts per sequence and totals per genome.

use crate::annotation::Feature;
use crate::store::FeatureStore;
use crate::types::PLACEHOLDER_TYPE;
use rayon::prelude::*;
use regex::{Regex, RegexBuilder};
use std::collections::BTreeMap;
use thiserror::Error;

pub const ID_KEY: &str = "ID";
pub const DESCRIPTION_KEY: &str = "description";
pub const SEQUENCE_ID_KEY: &str = "sequence_ID";
pub const COVERAGE_KEY: &str = "coverage";
pub const PARTIAL_MAPPING_KEY: &str = "partial_mapping";
pub const LOW_IDENTITY_KEY: &str = "low_identity";

/// Sequence-name fragments Liftoff leaves behind in intermediate files.
pub const DEFAULT_DENYLIST: [&str; 3] = ["extracting", "lifting", "aligning"];

#[derive(Debug, Error, PartialEq)]
pub enum AttributeError {
    #[error("feature '{feature_id}' has no '{key}' attribute")]
    Missing { feature_id: String, key: String },
    #[error("feature '{feature_id}': attribute '{key}' value '{value}' is not a valid {expected}")]
    Type {
        feature_id: String,
        key: String,
        value: String,
        expected: &'static str,
    },
}

/// Liftoff QC attributes of one mapped gene.
#[derive(Debug, Clone, PartialEq)]
pub struct CoverageRecord {
    pub gene_id: String,
    pub description: String,
    pub sequence_identity: f64,
    pub coverage: f64,
    pub is_partial: bool,
    pub low_identity: bool,
}

impl CoverageRecord {
    pub fn from_feature(feature: &Feature) -> Result<Self, AttributeError> {
        let gene_id = required(feature, ID_KEY)?.to_string();
        let description = required(feature, DESCRIPTION_KEY)?.to_string();
        let sequence_identity = required_f64(feature, SEQUENCE_ID_KEY)?;
        let coverage = required_f64(feature, COVERAGE_KEY)?;

        Ok(Self {
            gene_id,
            description,
            sequence_identity,
            coverage,
            // Liftoff writes these as `key=True`; presence is what counts.
            is_partial: feature.attributes.contains_key(PARTIAL_MAPPING_KEY),
            low_identity: feature.attributes.contains_key(LOW_IDENTITY_KEY),
        })
    }
}

fn required<'a>(feature: &'a Feature, key: &str) -> Result<&'a str, AttributeError> {
    feature
        .attributes
        .first(key)
        .ok_or_else(|| AttributeError::Missing {
            feature_id: feature.id.clone(),
            key: key.to_string(),
        })
}

fn required_f64(feature: &Feature, key: &str) -> Result<f64, AttributeError> {
    let value = required(feature, key)?;
    value.trim().parse().map_err(|_| AttributeError::Type {
        feature_id: feature.id.clone(),
        key: key.to_string(),
        value: value.to_string(),
        expected: "float",
    })
}

/// Distinct feature types in the store, ascending, without the `.`
/// placeholder.
pub fn valid_feature_types<S: FeatureStore + ?Sized>(store: &S) -> Vec<String> {
    store
        .feature_types()
        .into_iter()
        .filter(|t| t != PLACEHOLDER_TYPE)
        .collect()
}

/// Coverage records for every feature of `gene_type`, in file order. The
/// first feature missing a mandatory attribute aborts the scan.
pub fn coverage_records<S: FeatureStore + ?Sized>(
    store: &S,
    gene_type: &str,
) -> Result<Vec<CoverageRecord>, AttributeError> {
    store
        .features_of_type(gene_type)
        .into_iter()
        .map(CoverageRecord::from_feature)
        .collect()
}

/// Case-insensitive filter on sequence names.
#[derive(Debug, Clone)]
pub struct SequenceDenylist {
    pattern: Option<Regex>,
}

impl SequenceDenylist {
    pub fn new<S: AsRef<str>>(fragments: &[S]) -> Result<Self, regex::Error> {
        let alternatives: Vec<String> = fragments
            .iter()
            .map(|f| f.as_ref())
            .filter(|f| !f.is_empty())
            .map(regex::escape)
            .collect();
        if alternatives.is_empty() {
            return Ok(Self { pattern: None });
        }

        let pattern = RegexBuilder::new(&alternatives.join("|"))
            .case_insensitive(true)
            .build()?;
        Ok(Self {
            pattern: Some(pattern),
        })
    }

    pub fn is_denied(&self, seqname: &str) -> bool {
        self.pattern.as_ref().map_or(false, |p| p.is_match(seqname))
    }
}

impl Default for SequenceDenylist {
    fn default() -> Self {
        Self::new(&DEFAULT_DENYLIST).expect("default denylist is a valid pattern")
    }
}

/// Feature counts per sequence, sequences ascending, types ascending within
/// each sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SequenceStats {
    per_sequence: Vec<(String, BTreeMap<String, usize>)>,
}

impl SequenceStats {
    /// Count every type in `feature_types` on every sequence the denylist
    /// lets through. Sequences are counted in parallel.
    pub fn collect<S>(store: &S, feature_types: &[String], denylist: &SequenceDenylist) -> Self
    where
        S: FeatureStore + Sync + ?Sized,
    {
        let (kept, denied): (Vec<String>, Vec<String>) = store
            .seqids()
            .into_iter()
            .partition(|seq| !denylist.is_denied(seq));
        for seq in &denied {
            log::debug!("Skipping process-artifact sequence {}", seq);
        }

        let per_sequence: Vec<(String, BTreeMap<String, usize>)> = kept
            .into_par_iter()
            .map(|seq| {
                let counts: BTreeMap<String, usize> = feature_types
                    .iter()
                    .map(|t| (t.clone(), store.region(&seq, None, Some(t.as_str())).len()))
                    .collect();
                (seq, counts)
            })
            .collect();

        Self { per_sequence }
    }

    pub fn sequences(&self) -> impl Iterator<Item = &str> {
        self.per_sequence.iter().map(|(s, _)| s.as_str())
    }

    /// Count for one (sequence, type) pair; zero when either is unknown.
    pub fn count(&self, seqname: &str, feature_type: &str) -> usize {
        self.per_sequence
            .iter()
            .find(|(s, _)| s == seqname)
            .and_then(|(_, counts)| counts.get(feature_type).copied())
            .unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeMap<String, usize>)> {
        self.per_sequence.iter().map(|(s, c)| (s.as_str(), c))
    }

    pub fn len(&self) -> usize {
        self.per_sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.per_sequence.is_empty()
    }
}

impl FromIterator<(String, BTreeMap<String, usize>)> for SequenceStats {
    fn from_iter<T: IntoIterator<Item = (String, BTreeMap<String, usize>)>>(iter: T) -> Self {
        Self {
            per_sequence: iter.into_iter().collect(),
        }
    }
}

/// Whole-genome count of every type in `feature_types`.
pub fn summary_counts<S: FeatureStore + ?Sized>(store: &S, feature_types: &[String]) -> Vec<(String, usize)> {
    feature_types
        .iter()
        .map(|t| (t.clone(), store.count_features_of_type(t)))
        .collect()
}
