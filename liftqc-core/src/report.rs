//! Tab-separated report output
//!
//! Every report is UTF-8, one header row, one `\n`-terminated row per
//! entity. Files are truncated on open and flushed before returning.

use crate::children::ChildSignatures;
use crate::io::create_writer;
use crate::stats::{CoverageRecord, SequenceStats};
use anyhow::{Context, Result};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

pub const SIGNATURE_HEADER: [&str; 2] = ["child_feature", "GeneID"];
pub const COVERAGE_HEADER: [&str; 6] = [
    "gene_id",
    "description",
    "sequence_id",
    "coverage",
    "is_partial",
    "low_identity",
];
pub const SUMMARY_HEADER: [&str; 2] = ["feature_type", "count"];
pub const FEATURE_COLUMN: &str = "Feature";

pub const DEFAULT_SIGNATURE_REPORT: &str = "genes_with_transcripts.tab";
pub const DEFAULT_SEQSTATS_REPORT: &str = "seqstats.tab";
pub const DEFAULT_SUMMARY_REPORT: &str = "summarystats.tab";

pub struct TabWriter<W: Write> {
    inner: W,
    rows: usize,
}

impl<W: Write> TabWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, rows: 0 }
    }

    pub fn write_row<I, S>(&mut self, fields: I) -> io::Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut first = true;
        for field in fields {
            if !first {
                self.inner.write_all(b"\t")?;
            }
            first = false;
            self.inner.write_all(field.as_ref().as_bytes())?;
        }
        self.inner.write_all(b"\n")?;
        self.rows += 1;
        Ok(())
    }

    /// Rows written so far, header included.
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn finish(mut self) -> io::Result<W> {
        self.inner.flush()?;
        Ok(self.inner)
    }
}

/// Render a float the way Python's `str(float)` does for the values Liftoff
/// writes: whole numbers keep a trailing `.0`.
pub fn format_float(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    let rendered = value.to_string();
    if rendered.contains('.') {
        rendered
    } else {
        format!("{}.0", rendered)
    }
}

fn format_flag(flag: bool) -> &'static str {
    if flag {
        "1"
    } else {
        "0"
    }
}

pub fn write_signatures<W: Write, S: AsRef<str>>(
    output: W,
    signatures: &ChildSignatures,
    wanted: &[S],
) -> io::Result<usize> {
    let mut writer = TabWriter::new(output);
    writer.write_row(SIGNATURE_HEADER)?;
    for (signature, gene_id) in signatures.select(wanted) {
        writer.write_row([signature, gene_id])?;
    }
    let rows = writer.rows() - 1;
    writer.finish()?;
    Ok(rows)
}

pub fn write_coverage<W: Write>(output: W, records: &[CoverageRecord]) -> io::Result<()> {
    let mut writer = TabWriter::new(output);
    writer.write_row(COVERAGE_HEADER)?;
    for record in records {
        writer.write_row([
            record.gene_id.as_str(),
            record.description.as_str(),
            format_float(record.sequence_identity).as_str(),
            format_float(record.coverage).as_str(),
            format_flag(record.is_partial),
            format_flag(record.low_identity),
        ])?;
    }
    writer.finish()?;
    Ok(())
}

/// One row per feature type in `feature_types` order, one column per
/// sequence in `stats`.
pub fn write_sequence_stats<W: Write>(output: W, feature_types: &[String], stats: &SequenceStats) -> io::Result<()> {
    let mut writer = TabWriter::new(output);
    writer.write_row(std::iter::once(FEATURE_COLUMN).chain(stats.sequences()))?;
    for feature_type in feature_types {
        let counts = stats.iter().map(|(_, counts)| counts.get(feature_type).copied().unwrap_or(0).to_string());
        writer.write_row(std::iter::once(feature_type.clone()).chain(counts))?;
    }
    writer.finish()?;
    Ok(())
}

pub fn write_summary<W: Write>(output: W, counts: &[(String, usize)]) -> io::Result<()> {
    let mut writer = TabWriter::new(output);
    writer.write_row(SUMMARY_HEADER)?;
    for (feature_type, count) in counts {
        writer.write_row([feature_type.clone(), count.to_string()])?;
    }
    writer.finish()?;
    Ok(())
}

/// `<outdir>/<gene_type>.mapping_stats.tab`
pub fn coverage_report_path(outdir: &Path, gene_type: &str) -> PathBuf {
    outdir.join(format!("{}.mapping_stats.tab", gene_type))
}

pub fn write_signature_report<S: AsRef<str>>(path: &Path, signatures: &ChildSignatures, wanted: &[S]) -> Result<usize> {
    let rows = write_signatures(create_writer(path)?, signatures, wanted)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    log::info!("Wrote {} gene rows to {}", rows, path.display());
    Ok(rows)
}

pub fn write_coverage_report(path: &Path, records: &[CoverageRecord]) -> Result<()> {
    write_coverage(create_writer(path)?, records).with_context(|| format!("Failed to write {}", path.display()))?;
    log::info!("Wrote {} coverage records to {}", records.len(), path.display());
    Ok(())
}

pub fn write_sequence_stats_report(path: &Path, feature_types: &[String], stats: &SequenceStats) -> Result<()> {
    write_sequence_stats(create_writer(path)?, feature_types, stats)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    log::info!("Wrote sequence stats for {} sequences to {}", stats.len(), path.display());
    Ok(())
}

pub fn write_summary_report(path: &Path, counts: &[(String, usize)]) -> Result<()> {
    write_summary(create_writer(path)?, counts).with_context(|| format!("Failed to write {}", path.display()))?;
    log::info!("Wrote summary stats to {}", path.display());
    Ok(())
}
