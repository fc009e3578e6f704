//! In-memory feature store
//!
//! Features are kept in file order and indexed by id, type and sequence.
//! Parent/child relations come from the `Parent` attribute and are resolved
//! once at load time into a parent-id → child adjacency list.

use crate::annotation::{Feature, Gff3Reader, GffError};
use crate::types::*;
use anyhow::{Context, Result};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::io::BufRead;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("duplicate feature id '{id}' (use the create-unique merge strategy to rename duplicates)")]
    DuplicateId { id: String },
    #[error(transparent)]
    Gff(#[from] GffError),
}

/// Read-only queries the classifier and the aggregator run against a set
/// of features.
pub trait FeatureStore {
    /// Distinct feature types, ascending.
    fn feature_types(&self) -> Vec<String>;

    /// Distinct sequence names, ascending.
    fn seqids(&self) -> Vec<String>;

    /// Features of one type, in file order.
    fn features_of_type(&self, feature_type: &str) -> Vec<&Feature>;

    /// Every descendant of `feature`, each once, ordered by feature id.
    fn children(&self, feature: &Feature) -> Vec<&Feature>;

    /// Features on `seqid`, optionally restricted to those overlapping
    /// `interval` and to one type, in file order.
    fn region(&self, seqid: &str, interval: Option<Interval>, feature_type: Option<&str>) -> Vec<&Feature>;

    fn get(&self, id: &str) -> Option<&Feature>;

    fn count_features_of_type(&self, feature_type: &str) -> usize {
        self.features_of_type(feature_type).len()
    }
}

#[derive(Debug, Default)]
pub struct FeatureDb {
    features: Vec<Feature>,
    id_index: HashMap<String, usize>,
    children_map: HashMap<String, Vec<usize>>,
    type_index: BTreeMap<String, Vec<usize>>,
    seq_index: BTreeMap<String, Vec<usize>>,
    autoincrement: HashMap<String, usize>,
    merge_strategy: MergeStrategy,
}

impl FeatureDb {
    pub fn new(merge_strategy: MergeStrategy) -> Self {
        Self {
            merge_strategy,
            ..Default::default()
        }
    }

    /// Build a store from a GFF3 file (gzip when the path ends in `.gz`).
    pub fn from_path<P: AsRef<Path>>(path: P, merge_strategy: MergeStrategy) -> Result<Self> {
        let path = path.as_ref();
        log::info!("Building feature store from {}", path.display());

        let features = Gff3Reader::new(path)?
            .read_features()
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        let db = Self::from_features(features, merge_strategy)
            .with_context(|| format!("Failed to index {}", path.display()))?;

        log::info!(
            "Loaded {} features ({} feature types on {} sequences)",
            db.len(),
            db.type_index.len(),
            db.seq_index.len()
        );
        Ok(db)
    }

    pub fn from_reader<R: BufRead + Send + 'static>(reader: R, merge_strategy: MergeStrategy) -> Result<Self, StoreError> {
        let features = Gff3Reader::from_reader(reader).read_features()?;
        Self::from_features(features, merge_strategy)
    }

    pub fn from_features<I>(features: I, merge_strategy: MergeStrategy) -> Result<Self, StoreError>
    where
        I: IntoIterator<Item = Feature>,
    {
        let mut db = Self::new(merge_strategy);
        for feature in features {
            db.insert(feature)?;
        }
        Ok(db)
    }

    /// Add a feature, assigning its id. Returns the id it was stored under.
    pub fn insert(&mut self, mut feature: Feature) -> Result<String, StoreError> {
        feature.id = self.assign_id(&feature)?;

        let index = self.features.len();
        self.id_index.insert(feature.id.clone(), index);
        for parent in feature.parents() {
            let siblings = self.children_map.entry(parent.clone()).or_default();
            if !siblings.contains(&index) {
                siblings.push(index);
            }
        }
        self.type_index
            .entry(feature.feature_type.clone())
            .or_default()
            .push(index);
        self.seq_index
            .entry(feature.seqname.clone())
            .or_default()
            .push(index);

        let id = feature.id.clone();
        self.features.push(feature);
        Ok(id)
    }

    fn assign_id(&mut self, feature: &Feature) -> Result<String, StoreError> {
        if feature.id.is_empty() {
            let counter = self
                .autoincrement
                .entry(feature.feature_type.clone())
                .or_insert(0);
            loop {
                *counter += 1;
                let candidate = format!("{}_{}", feature.feature_type, counter);
                if !self.id_index.contains_key(&candidate) {
                    return Ok(candidate);
                }
            }
        }

        if !self.id_index.contains_key(&feature.id) {
            return Ok(feature.id.clone());
        }

        match self.merge_strategy {
            MergeStrategy::Error => Err(StoreError::DuplicateId {
                id: feature.id.clone(),
            }),
            MergeStrategy::CreateUnique => {
                let mut suffix = 1usize;
                loop {
                    let candidate = format!("{}_{}", feature.id, suffix);
                    if !self.id_index.contains_key(&candidate) {
                        log::debug!("Renamed duplicate feature id {} to {}", feature.id, candidate);
                        return Ok(candidate);
                    }
                    suffix += 1;
                }
            }
        }
    }

    /// Features named in the `Parent` attribute that exist in the store.
    pub fn parents(&self, feature: &Feature) -> Vec<&Feature> {
        feature
            .parents()
            .iter()
            .filter_map(|id| self.get(id))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Feature> {
        self.features.iter()
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    fn resolve(&self, indices: &[usize]) -> Vec<&Feature> {
        indices.iter().map(|&i| &self.features[i]).collect()
    }
}

impl FeatureStore for FeatureDb {
    fn feature_types(&self) -> Vec<String> {
        self.type_index.keys().cloned().collect()
    }

    fn seqids(&self) -> Vec<String> {
        self.seq_index.keys().cloned().collect()
    }

    fn features_of_type(&self, feature_type: &str) -> Vec<&Feature> {
        self.type_index
            .get(feature_type)
            .map(|indices| self.resolve(indices))
            .unwrap_or_default()
    }

    fn children(&self, feature: &Feature) -> Vec<&Feature> {
        let root = self.id_index.get(&feature.id).copied();
        let mut seen: HashSet<usize> = HashSet::new();
        let mut stack: Vec<&str> = vec![feature.id.as_str()];

        // Cycles in Parent references end at the first revisit.
        while let Some(parent) = stack.pop() {
            if let Some(direct) = self.children_map.get(parent) {
                for &child in direct {
                    if Some(child) != root && seen.insert(child) {
                        stack.push(self.features[child].id.as_str());
                    }
                }
            }
        }

        let mut descendants: Vec<&Feature> = seen.into_iter().map(|i| &self.features[i]).collect();
        descendants.sort_by(|a, b| a.id.as_bytes().cmp(b.id.as_bytes()));
        descendants
    }

    fn region(&self, seqid: &str, interval: Option<Interval>, feature_type: Option<&str>) -> Vec<&Feature> {
        let Some(indices) = self.seq_index.get(seqid) else {
            return Vec::new();
        };

        indices
            .iter()
            .map(|&i| &self.features[i])
            .filter(|f| feature_type.map_or(true, |t| f.feature_type == t))
            .filter(|f| interval.map_or(true, |iv| f.overlaps(&iv)))
            .collect()
    }

    fn get(&self, id: &str) -> Option<&Feature> {
        self.id_index.get(id).map(|&i| &self.features[i])
    }

    fn count_features_of_type(&self, feature_type: &str) -> usize {
        self.type_index.get(feature_type).map_or(0, |v| v.len())
    }
}
