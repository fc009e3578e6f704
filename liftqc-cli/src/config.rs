//! Configuration handling for the liftqc CLI
//!
//! Supports loading configuration from liftqc.toml files with CLI argument overrides.

use anyhow::{Context, Result};
use liftqc_core::children::DEFAULT_WANTED_SIGNATURES;
use liftqc_core::frame::DEFAULT_OUTPUT_SUFFIX;
use liftqc_core::report::{DEFAULT_SEQSTATS_REPORT, DEFAULT_SIGNATURE_REPORT, DEFAULT_SUMMARY_REPORT};
use liftqc_core::sanity::LIFTOFF_MARKER;
use liftqc_core::stats::DEFAULT_DENYLIST;
use liftqc_core::types::MAPPED_GENE_TYPES;
use liftqc_core::MergeStrategy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "liftqc.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub frame: FrameConfig,
    #[serde(default)]
    pub children: ChildrenConfig,
    #[serde(default)]
    pub stats: StatsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Default number of threads to use
    #[serde(default = "default_threads")]
    pub threads: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameConfig {
    /// Appended to the input GFF path when no output is given
    #[serde(default = "default_output_suffix")]
    pub output_suffix: String,

    /// Comment line expected in Liftoff output
    #[serde(default = "default_provenance_marker")]
    pub provenance_marker: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChildrenConfig {
    /// Child signatures to report
    #[serde(default = "default_wanted")]
    pub wanted: Vec<String>,

    #[serde(default = "default_signature_report")]
    pub output: PathBuf,

    #[serde(default = "default_children_merge_strategy")]
    pub merge_strategy: MergeStrategy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsConfig {
    /// Gene types that get a coverage report
    #[serde(default = "default_gene_types")]
    pub gene_types: Vec<String>,

    #[serde(default = "default_seqstats")]
    pub seqstats: PathBuf,

    #[serde(default = "default_summary")]
    pub summary: PathBuf,

    /// Directory for the per-gene-type coverage reports
    #[serde(default = "default_outdir")]
    pub outdir: PathBuf,

    /// Sequence-name fragments excluded from per-sequence counts
    #[serde(default = "default_denylist")]
    pub denylist: Vec<String>,

    #[serde(default)]
    pub merge_strategy: MergeStrategy,
}

// Default value functions
fn default_threads() -> usize { num_cpus::get() }
fn default_output_suffix() -> String { DEFAULT_OUTPUT_SUFFIX.to_string() }
fn default_provenance_marker() -> String { LIFTOFF_MARKER.to_string() }
fn default_wanted() -> Vec<String> { DEFAULT_WANTED_SIGNATURES.iter().map(|s| s.to_string()).collect() }
fn default_signature_report() -> PathBuf { PathBuf::from(DEFAULT_SIGNATURE_REPORT) }
fn default_children_merge_strategy() -> MergeStrategy { MergeStrategy::CreateUnique }
fn default_gene_types() -> Vec<String> { MAPPED_GENE_TYPES.iter().map(|s| s.to_string()).collect() }
fn default_seqstats() -> PathBuf { PathBuf::from(DEFAULT_SEQSTATS_REPORT) }
fn default_summary() -> PathBuf { PathBuf::from(DEFAULT_SUMMARY_REPORT) }
fn default_outdir() -> PathBuf { PathBuf::from(".") }
fn default_denylist() -> Vec<String> { DEFAULT_DENYLIST.iter().map(|s| s.to_string()).collect() }

impl Default for GeneralConfig {
    fn default() -> Self {
        Self { threads: default_threads() }
    }
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            output_suffix: default_output_suffix(),
            provenance_marker: default_provenance_marker(),
        }
    }
}

impl Default for ChildrenConfig {
    fn default() -> Self {
        Self {
            wanted: default_wanted(),
            output: default_signature_report(),
            merge_strategy: default_children_merge_strategy(),
        }
    }
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            gene_types: default_gene_types(),
            seqstats: default_seqstats(),
            summary: default_summary(),
            outdir: default_outdir(),
            denylist: default_denylist(),
            merge_strategy: MergeStrategy::Error,
        }
    }
}

impl Config {
    /// Load configuration from file or use defaults
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let config = match config_path {
            Some(path) => {
                log::info!("Loading configuration from: {}", path.display());
                Self::load_from_file(path)?
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    log::info!("Loading configuration from: {}", DEFAULT_CONFIG_FILE);
                    Self::load_from_file(&default_path)?
                } else {
                    log::debug!("Using default configuration");
                    Self::default()
                }
            }
        };

        Ok(config)
    }

    /// Load configuration from a specific TOML file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse configuration file: {}", path.display()))?;

        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write configuration file: {}", path.display()))?;

        Ok(())
    }

    /// Generate example configuration file content
    pub fn example_toml() -> Result<String> {
        toml::to_string_pretty(&Self::default()).context("Failed to serialize default configuration")
    }
}
