use serde::{Deserialize, Serialize};
use std::fmt;

pub type GenomicPos = u64;

/// Feature type carrying a reading frame.
pub const CDS_TYPE: &str = "CDS";

/// Feature type whose descendants are classified by child signature.
pub const GENE_TYPE: &str = "gene";

/// Gene types carrying Liftoff mapping attributes.
pub const MAPPED_GENE_TYPES: [&str; 3] = ["ncRNA_gene", "protein_coding_gene", "pseudogene"];

/// Literal placeholder type, never reported as a real feature type.
pub const PLACEHOLDER_TYPE: &str = ".";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strand {
    Forward,
    Reverse,
    Unknown,
}

impl From<char> for Strand {
    fn from(c: char) -> Self {
        match c {
            '+' => Strand::Forward,
            '-' => Strand::Reverse,
            _ => Strand::Unknown,
        }
    }
}

impl From<&str> for Strand {
    fn from(s: &str) -> Self {
        match s {
            "+" => Strand::Forward,
            "-" => Strand::Reverse,
            _ => Strand::Unknown,
        }
    }
}

impl From<Strand> for char {
    fn from(strand: Strand) -> Self {
        match strand {
            Strand::Forward => '+',
            Strand::Reverse => '-',
            Strand::Unknown => '.',
        }
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", char::from(*self))
    }
}

/// Closed interval in 1-based GFF coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    pub start: GenomicPos,
    pub end: GenomicPos,
}

impl Interval {
    pub fn new(start: GenomicPos, end: GenomicPos) -> Self {
        Self { start, end }
    }

    /// Number of bases covered; both ends count.
    pub fn len(&self) -> GenomicPos {
        if self.end < self.start {
            0
        } else {
            self.end - self.start + 1
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Two closed intervals overlap when they share at least one base.
    pub fn overlaps(&self, other: &Interval) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

/// How duplicate feature ids are handled while building a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MergeStrategy {
    /// A repeated id aborts store construction.
    #[default]
    Error,
    /// A repeated id is renamed `<id>_1`, `<id>_2`, ...
    CreateUnique,
}
