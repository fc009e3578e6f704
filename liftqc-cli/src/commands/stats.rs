//! Stats command implementation - coverage and feature count reports

use anyhow::{Context, Result};
use liftqc_core::report::{
    coverage_report_path, write_coverage_report, write_sequence_stats_report, write_summary_report,
};
use liftqc_core::stats::{coverage_records, summary_counts, valid_feature_types};
use liftqc_core::{FeatureDb, MergeStrategy, SequenceDenylist, SequenceStats};
use std::path::PathBuf;

use crate::config::Config;
use crate::error::{ensure_exists, CliError};

/// Command-line overrides for the `[stats]` configuration section.
#[derive(Debug, Default)]
pub struct StatsArgs {
    pub gff: PathBuf,
    pub seqstats: Option<PathBuf>,
    pub summary: Option<PathBuf>,
    pub outdir: Option<PathBuf>,
    pub gene_types: Vec<String>,
    pub merge_strategy: Option<MergeStrategy>,
}

pub fn execute(config: &Config, args: StatsArgs) -> Result<()> {
    log::info!("Collecting mapping statistics");
    log::info!("Annotation: {}", args.gff.display());

    ensure_exists(&args.gff)?;

    let outdir = args.outdir.unwrap_or_else(|| config.stats.outdir.clone());
    let seqstats = args.seqstats.unwrap_or_else(|| config.stats.seqstats.clone());
    let summary = args.summary.unwrap_or_else(|| config.stats.summary.clone());
    let gene_types = if args.gene_types.is_empty() {
        config.stats.gene_types.clone()
    } else {
        args.gene_types
    };
    let merge_strategy = args.merge_strategy.unwrap_or(config.stats.merge_strategy);
    let denylist = SequenceDenylist::new(&config.stats.denylist)
        .map_err(|e| CliError::config(format!("invalid sequence denylist: {}", e)))?;

    std::fs::create_dir_all(&outdir)
        .with_context(|| format!("Failed to create output directory: {}", outdir.display()))?;

    let db = FeatureDb::from_path(&args.gff, merge_strategy)?;

    for gene_type in &gene_types {
        let records = coverage_records(&db, gene_type).with_context(|| format!("Failed to collect coverage for {} features", gene_type))?;
        write_coverage_report(&coverage_report_path(&outdir, gene_type), &records)?;
    }

    let feature_types = valid_feature_types(&db);
    log::info!("Found {} feature types", feature_types.len());

    let per_sequence = SequenceStats::collect(&db, &feature_types, &denylist);
    write_sequence_stats_report(&seqstats, &feature_types, &per_sequence)?;

    let totals = summary_counts(&db, &feature_types);
    write_summary_report(&summary, &totals)?;

    log::info!("Mapping statistics complete");
    Ok(())
}
