//! GFF3 annotation parsing
//!
//! Turns tab-separated GFF3 records into [`Feature`]s. Liftoff progress
//! messages that end up inside an annotation (`lifting features` and the
//! like) have no tabs at all; they load as placeholder features named after
//! the whole line so downstream filters can drop them.

use crate::io::open_reader;
use crate::types::*;
use anyhow::Result;
use indexmap::IndexMap;
use std::io::BufRead;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GffError {
    #[error("line {line}: expected 9 tab-separated columns, found {found}")]
    ColumnCount { line: usize, found: usize },
    #[error("line {line}: invalid {column} coordinate '{value}'")]
    Coordinate {
        line: usize,
        column: &'static str,
        value: String,
    },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Column 9 of a GFF3 record: ordered keys, each with ordered values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    inner: IndexMap<String, Vec<String>>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.inner.get(key).map(|v| v.as_slice())
    }

    /// First value of a key, the one GFF consumers treat as canonical.
    pub fn first(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(|v| v.first()).map(|s| s.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.contains_key(key)
    }

    pub fn insert<K: Into<String>>(&mut self, key: K, values: Vec<String>) {
        self.inner.entry(key.into()).or_default().extend(values);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.inner.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl FromStr for Attributes {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut attributes = Attributes::new();

        for pair in s.split(';') {
            let pair = pair.trim();
            if pair.is_empty() {
                continue;
            }

            match pair.split_once('=') {
                Some((key, value)) => {
                    let values = value.split(',').map(decode_value).collect();
                    attributes.insert(key.trim(), values);
                }
                None => attributes.insert(pair, Vec::new()),
            }
        }

        Ok(attributes)
    }
}

/// GFF3 values are percent-encoded; malformed escapes are kept verbatim.
fn decode_value(raw: &str) -> String {
    urlencoding::decode(raw)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| raw.to_string())
}

/// One GFF3 feature line.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    /// Store-assigned identifier; empty until the feature is inserted
    /// into a store unless the record carries an `ID` attribute.
    pub id: String,
    pub seqname: String,
    pub source: String,
    pub feature_type: String,
    pub start: GenomicPos,
    pub end: GenomicPos,
    pub score: Option<f64>,
    pub strand: Strand,
    pub phase: Option<u8>,
    pub attributes: Attributes,
}

impl Feature {
    pub fn interval(&self) -> Interval {
        Interval::new(self.start, self.end)
    }

    pub fn overlaps(&self, interval: &Interval) -> bool {
        self.interval().overlaps(interval)
    }

    pub fn attribute(&self, key: &str) -> Option<&[String]> {
        self.attributes.get(key)
    }

    pub fn parents(&self) -> &[String] {
        self.attributes.get("Parent").unwrap_or(&[])
    }

    /// Placeholder for a line too short to be a record: the whole line
    /// becomes the sequence name and the type is `.`.
    fn placeholder(line: &str) -> Self {
        Feature {
            id: String::new(),
            seqname: line.trim().to_string(),
            source: PLACEHOLDER_TYPE.to_string(),
            feature_type: PLACEHOLDER_TYPE.to_string(),
            start: 0,
            end: 0,
            score: None,
            strand: Strand::Unknown,
            phase: None,
            attributes: Attributes::new(),
        }
    }

    /// Parse one tab-separated feature line. `line_no` is 1-based and only
    /// used in messages. Lines with fewer than 9 columns load as
    /// placeholders; more than 9 is an error.
    pub fn parse_line(line: &str, line_no: usize) -> Result<Self, GffError> {
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 9 {
            log::debug!("line {}: {} columns, loading '{}' as a placeholder", line_no, fields.len(), line.trim());
            return Ok(Self::placeholder(line));
        }
        if fields.len() > 9 {
            return Err(GffError::ColumnCount {
                line: line_no,
                found: fields.len(),
            });
        }

        let start = parse_coordinate(fields[3], "start", line_no)?;
        let end = parse_coordinate(fields[4], "end", line_no)?;
        let score = match fields[5] {
            "." => None,
            s => s.parse().ok(),
        };
        let phase = match fields[7] {
            "." => None,
            s => s.parse().ok(),
        };
        let attributes: Attributes = fields[8].parse().unwrap_or_default();
        let id = attributes.first("ID").unwrap_or_default().to_string();

        Ok(Feature {
            id,
            seqname: fields[0].to_string(),
            source: fields[1].to_string(),
            feature_type: fields[2].to_string(),
            start,
            end,
            score,
            strand: Strand::from(fields[6]),
            phase,
            attributes,
        })
    }
}

fn parse_coordinate(value: &str, column: &'static str, line: usize) -> Result<GenomicPos, GffError> {
    value.trim().parse().map_err(|_| GffError::Coordinate {
        line,
        column,
        value: value.to_string(),
    })
}

/// Line-oriented GFF3 reader. Directives, comments and blank lines are
/// skipped; a `##FASTA` directive ends the feature section.
pub struct Gff3Reader {
    reader: Box<dyn BufRead + Send>,
}

impl Gff3Reader {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self {
            reader: open_reader(path)?,
        })
    }

    pub fn from_reader<R: BufRead + Send + 'static>(reader: R) -> Self {
        Self {
            reader: Box::new(reader),
        }
    }

    pub fn read_features(self) -> Result<Vec<Feature>, GffError> {
        let mut features = Vec::new();

        for (index, line) in self.reader.lines().enumerate() {
            let line = line?;
            let line = line.trim_end_matches(['\r', '\n']);

            if line.starts_with("##FASTA") {
                break;
            }
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }

            features.push(Feature::parse_line(line, index + 1)?);
        }

        Ok(features)
    }
}
