//! Sequence length index
//!
//! Maps each sequence name in a FASTA genome to its length. Parsing goes
//! through needletail, so gzipped and multi-line FASTA are both accepted.

use crate::types::GenomicPos;
use anyhow::{Context, Result};
use indexmap::IndexMap;
use needletail::{parse_fastx_file, parse_fastx_reader, FastxReader};
use std::io::Read;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FastaError {
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Duplicate sequence name: {0}")]
    DuplicateSequence(String),
    #[error("Empty file or no sequences found")]
    EmptyFile,
    #[error("Sequence '{0}' is not in the genome")]
    UnknownSequence(String),
}

#[derive(Debug, Clone, Default)]
pub struct SequenceLengthIndex {
    lengths: IndexMap<String, GenomicPos>,
}

impl SequenceLengthIndex {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        log::info!("Getting sequence lengths for {}", path.display());

        let reader = parse_fastx_file(path)
            .map_err(|e| FastaError::Parse(e.to_string()))
            .with_context(|| format!("Failed to read genome FASTA {}", path.display()))?;
        let index = Self::collect(reader)
            .with_context(|| format!("Failed to index genome FASTA {}", path.display()))?;

        log::info!("Lengths obtained for {} sequences", index.len());
        Ok(index)
    }

    pub fn from_reader<R: Read + Send>(reader: R) -> Result<Self, FastaError> {
        let reader = parse_fastx_reader(reader).map_err(|e| FastaError::Parse(e.to_string()))?;
        Self::collect(reader)
    }

    fn collect(mut reader: Box<dyn FastxReader + '_>) -> Result<Self, FastaError> {
        let mut lengths = IndexMap::new();

        while let Some(record) = reader.next() {
            let record = record.map_err(|e| FastaError::Parse(e.to_string()))?;
            let name = sequence_name(record.id());
            let length = record.seq().len() as GenomicPos;

            if lengths.insert(name.clone(), length).is_some() {
                return Err(FastaError::DuplicateSequence(name));
            }
        }

        if lengths.is_empty() {
            return Err(FastaError::EmptyFile);
        }
        Ok(Self { lengths })
    }

    /// Length of a sequence, or `None` when the genome does not contain it.
    pub fn get(&self, name: &str) -> Option<GenomicPos> {
        self.lengths.get(name).copied()
    }

    pub fn length(&self, name: &str) -> Result<GenomicPos, FastaError> {
        self.get(name)
            .ok_or_else(|| FastaError::UnknownSequence(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.lengths.keys().map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.lengths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lengths.is_empty()
    }
}

impl FromIterator<(String, GenomicPos)> for SequenceLengthIndex {
    fn from_iter<T: IntoIterator<Item = (String, GenomicPos)>>(iter: T) -> Self {
        Self {
            lengths: iter.into_iter().collect(),
        }
    }
}

/// The sequence name is the header up to the first whitespace.
fn sequence_name(header: &[u8]) -> String {
    let header = String::from_utf8_lossy(header);
    header.split_whitespace().next().unwrap_or_default().to_string()
}
