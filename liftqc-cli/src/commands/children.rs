//! Children command implementation - group genes by child signature

use anyhow::Result;
use liftqc_core::report::write_signature_report;
use liftqc_core::{classify_genes, FeatureDb, MergeStrategy};
use std::path::PathBuf;

use crate::config::Config;
use crate::error::ensure_exists;

pub fn execute(
    config: &Config,
    gff: PathBuf,
    wanted: Vec<String>,
    out: Option<PathBuf>,
    merge_strategy: Option<MergeStrategy>,
) -> Result<usize> {
    log::info!("Classifying genes by child signature");
    log::info!("Annotation: {}", gff.display());

    ensure_exists(&gff)?;

    let merge_strategy = merge_strategy.unwrap_or(config.children.merge_strategy);
    let wanted = if wanted.is_empty() {
        config.children.wanted.clone()
    } else {
        wanted
    };
    let out = out.unwrap_or_else(|| config.children.output.clone());

    let db = FeatureDb::from_path(&gff, merge_strategy)?;
    let signatures = classify_genes(&db);

    for (signature, count) in signatures.counts() {
        let label = if signature.is_empty() { "(no children)" } else { signature };
        log::info!("{}\t{}", label, count);
    }

    let rows = write_signature_report(&out, &signatures, &wanted)?;
    log::info!("Gene table written to: {}", out.display());
    Ok(rows)
}
