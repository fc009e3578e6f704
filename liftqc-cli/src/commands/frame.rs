//! Frame command implementation - recompute CDS frames in a Liftoff GFF3

use anyhow::Result;
use liftqc_core::frame::{output_path, repair_file, FrameRepairStats};
use liftqc_core::sanity::{check_genome_file, check_provenance_file};
use liftqc_core::SequenceLengthIndex;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::{ensure_exists, CliError};

pub fn execute(
    config: &Config,
    liftoff_gff: PathBuf,
    genome_fasta: PathBuf,
    out: Option<PathBuf>,
) -> Result<FrameRepairStats> {
    log::info!("Starting reading frame repair");
    log::info!("Annotation: {}", liftoff_gff.display());
    log::info!("Genome: {}", genome_fasta.display());

    ensure_exists(&liftoff_gff)?;

    // Input shape problems are reported but never stop the run.
    match check_genome_file(&genome_fasta) {
        Ok(Some(warning)) => log::warn!("{}", warning),
        Ok(None) => {}
        Err(e) => log::warn!("Could not check genome file: {:#}", e),
    }
    match check_provenance_file(&liftoff_gff, &config.frame.provenance_marker) {
        Ok(Some(warning)) => log::warn!("{}", warning),
        Ok(None) => {}
        Err(e) => log::warn!("Could not check annotation provenance: {:#}", e),
    }

    let out = out.unwrap_or_else(|| output_path(&liftoff_gff, &config.frame.output_suffix));
    if same_file(&out, &liftoff_gff) {
        return Err(CliError::validation(format!(
            "output {} would overwrite the input annotation",
            out.display()
        ))
        .into());
    }

    ensure_exists(&genome_fasta)?;
    let lengths = SequenceLengthIndex::from_path(&genome_fasta)?;

    let stats = repair_file(&liftoff_gff, &lengths, &out)?;
    log::debug!("{} rows passed through, {} blank lines", stats.unchanged, stats.blank);

    Ok(stats)
}

/// True when both paths name one existing file.
fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
