//! liftqc core library
//!
//! GFF3 model, in-memory feature store, sequence length index and the
//! quality-control passes run over Liftoff output: frame repair, gene
//! classification by child signature and mapping statistics.

pub mod types;
pub mod io;
pub mod annotation;
pub mod store;
pub mod fasta;
pub mod sanity;
pub mod frame;
pub mod children;
pub mod stats;
pub mod report;

// Re-export commonly used types and functions
pub use annotation::{Attributes, Feature, Gff3Reader, GffError};
pub use children::{classify_genes, ChildSignatures};
pub use fasta::{FastaError, SequenceLengthIndex};
pub use frame::{FrameError, FrameRepairStats, FrameRepairer};
pub use stats::{AttributeError, CoverageRecord, SequenceDenylist, SequenceStats};
pub use store::{FeatureDb, FeatureStore, StoreError};
pub use types::{Interval, MergeStrategy, Strand};

/// Version information for the liftqc core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
