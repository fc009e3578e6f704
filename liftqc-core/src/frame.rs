//! Reading-frame repair for Liftoff CDS records
//!
//! Liftoff leaves the frame column of lifted CDS features unset or stale.
//! Each CDS record gets a frame computed from its own coordinates:
//!
//! * `+` strand: `start mod 3`
//! * `-` strand: `(sequence_length - end) mod 3`
//!
//! The frame is computed per record. No phase is carried from one CDS
//! segment of a transcript to the next.

use crate::fasta::SequenceLengthIndex;
use crate::io::{create_writer, open_reader};
use crate::types::{Strand, CDS_TYPE};
use anyhow::{Context, Result};
use csv::{QuoteStyle, ReaderBuilder, StringRecord, Terminator, WriterBuilder};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

const COMMENT_MARKER: char = '#';
const GFF_COLUMNS: usize = 9;
const STRAND_COLUMN: usize = 6;
const FRAME_COLUMN: usize = 7;

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("line {line}: expected 9 tab-separated columns, found {found}")]
    MalformedRecord { line: u64, found: usize },
    #[error("line {line}: invalid {column} coordinate '{value}'")]
    InvalidCoordinate {
        line: u64,
        column: &'static str,
        value: String,
    },
    #[error("line {line}: sequence '{seqname}' is not in the genome FASTA")]
    UnknownSequence { line: u64, seqname: String },
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Counts gathered while repairing one annotation stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameRepairStats {
    pub records: usize,
    pub blank: usize,
    pub comments: usize,
    pub forward_cds: usize,
    pub reverse_cds: usize,
    pub unchanged: usize,
}

pub fn plus_strand_frame(start: i64) -> u8 {
    start.rem_euclid(3) as u8
}

pub fn minus_strand_frame(sequence_length: i64, end: i64) -> u8 {
    (sequence_length - end).rem_euclid(3) as u8
}

pub const DEFAULT_OUTPUT_SUFFIX: &str = "_new.gff";

/// `<gff><suffix>` next to the input.
pub fn output_path(gff: &Path, suffix: &str) -> PathBuf {
    let mut name = gff.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}

pub fn default_output_path(gff: &Path) -> PathBuf {
    output_path(gff, DEFAULT_OUTPUT_SUFFIX)
}

enum Outcome {
    Comment,
    Forward,
    Reverse,
    Unchanged,
}

pub struct FrameRepairer<'a> {
    lengths: &'a SequenceLengthIndex,
}

impl<'a> FrameRepairer<'a> {
    pub fn new(lengths: &'a SequenceLengthIndex) -> Self {
        Self { lengths }
    }

    /// Rewrite one annotation stream. Every input line produces exactly one
    /// output line, in the same order; blank lines are copied as they are.
    pub fn repair<R: BufRead, W: Write>(&self, input: R, mut output: W) -> Result<FrameRepairStats, FrameError> {
        let mut readers = ReaderBuilder::new();
        readers.delimiter(b'\t').has_headers(false).flexible(true);
        let mut writers = WriterBuilder::new();
        writers
            .delimiter(b'\t')
            .flexible(true)
            .quote_style(QuoteStyle::Necessary)
            .terminator(Terminator::Any(b'\n'));

        let mut stats = FrameRepairStats::default();
        let mut record = StringRecord::new();

        for (index, text) in input.lines().enumerate() {
            let text = text?;
            let line = index as u64 + 1;
            stats.records += 1;

            if text.trim().is_empty() {
                stats.blank += 1;
                writeln!(output, "{}", text)?;
                continue;
            }

            // Parsed on its own so quoting never joins two lines.
            readers.from_reader(text.as_bytes()).read_record(&mut record)?;
            let (row, outcome) = self.repair_record(&record, line)?;

            match outcome {
                Outcome::Comment => stats.comments += 1,
                Outcome::Forward => stats.forward_cds += 1,
                Outcome::Reverse => stats.reverse_cds += 1,
                Outcome::Unchanged => stats.unchanged += 1,
            }
            let mut writer = writers.from_writer(&mut output);
            writer.write_record(&row)?;
            writer.flush()?;
        }

        output.flush()?;
        Ok(stats)
    }

    fn repair_record(&self, record: &StringRecord, line: u64) -> Result<(StringRecord, Outcome), FrameError> {
        if record.iter().any(|field| field.contains(COMMENT_MARKER)) {
            return Ok((record.clone(), Outcome::Comment));
        }
        if record.len() < GFF_COLUMNS {
            log::debug!("line {}: {} columns, copied unchanged", line, record.len());
            return Ok((record.clone(), Outcome::Unchanged));
        }
        if record.len() > GFF_COLUMNS {
            return Err(FrameError::MalformedRecord {
                line,
                found: record.len(),
            });
        }

        let seqname = &record[0];
        let feature_type = &record[2];
        if feature_type != CDS_TYPE {
            return Ok((record.clone(), Outcome::Unchanged));
        }

        let (frame, outcome) = match Strand::from(&record[STRAND_COLUMN]) {
            Strand::Forward => {
                let start = parse_coordinate(&record[3], "start", line)?;
                (plus_strand_frame(start), Outcome::Forward)
            }
            Strand::Reverse => {
                let length = self
                    .lengths
                    .length(seqname)
                    .map_err(|_| FrameError::UnknownSequence {
                        line,
                        seqname: seqname.to_string(),
                    })?;
                let end = parse_coordinate(&record[4], "end", line)?;
                (minus_strand_frame(length as i64, end), Outcome::Reverse)
            }
            Strand::Unknown => return Ok((record.clone(), Outcome::Unchanged)),
        };

        let frame = frame.to_string();
        let row: StringRecord = record
            .iter()
            .enumerate()
            .map(|(i, field)| if i == FRAME_COLUMN { frame.as_str() } else { field })
            .collect();
        Ok((row, outcome))
    }
}

fn parse_coordinate(value: &str, column: &'static str, line: u64) -> Result<i64, FrameError> {
    value.trim().parse().map_err(|_| FrameError::InvalidCoordinate {
        line,
        column,
        value: value.to_string(),
    })
}

/// Repair `gff` into `output`, overwriting it.
pub fn repair_file(gff: &Path, lengths: &SequenceLengthIndex, output: &Path) -> Result<FrameRepairStats> {
    log::info!("Running reading frame finder for {}", gff.display());

    let input = open_reader(gff)?;
    let writer = create_writer(output)?;
    let stats = FrameRepairer::new(lengths)
        .repair(input, writer)
        .with_context(|| format!("Failed to repair frames in {}", gff.display()))?;

    log::info!(
        "Finished reading frame finder for {}: {} records, {} + strand CDS and {} - strand CDS reframed, {} comment lines",
        gff.display(),
        stats.records,
        stats.forward_cds,
        stats.reverse_cds,
        stats.comments
    );
    log::info!("Repaired annotation written to {}", output.display());
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lengths() -> SequenceLengthIndex {
        vec![("chr1".to_string(), 1000), ("chr2".to_string(), 10)]
            .into_iter()
            .collect()
    }

    fn repair(input: &str) -> Result<(String, FrameRepairStats), FrameError> {
        let index = lengths();
        let mut out = Vec::new();
        let stats = FrameRepairer::new(&index).repair(input.as_bytes(), &mut out)?;
        Ok((String::from_utf8(out).unwrap(), stats))
    }

    #[test]
    fn test_frame_arithmetic() {
        assert_eq!(plus_strand_frame(100), 1);
        assert_eq!(plus_strand_frame(3), 0);
        assert_eq!(minus_strand_frame(1000, 100), 0);
        assert_eq!(minus_strand_frame(1000, 98), 2);
        assert_eq!(minus_strand_frame(10, 12), 1);
    }

    #[test]
    fn test_cds_pair_reframed() {
        let input = "\
chr1\tLiftoff\tCDS\t100\t200\t.\t+\t.\tID=c1
chr1\tLiftoff\tCDS\t50\t98\t.\t-\t0\tID=c2
chr1\tLiftoff\tCDS\t20\t100\t.\t-\t.\tID=c3
";
        let (out, stats) = repair(input).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "chr1\tLiftoff\tCDS\t100\t200\t.\t+\t1\tID=c1");
        assert_eq!(lines[1], "chr1\tLiftoff\tCDS\t50\t98\t.\t-\t2\tID=c2");
        assert_eq!(lines[2], "chr1\tLiftoff\tCDS\t20\t100\t.\t-\t0\tID=c3");
        assert_eq!(stats.forward_cds, 1);
        assert_eq!(stats.reverse_cds, 2);
    }

    #[test]
    fn test_pass_through_is_idempotent() {
        let input = "\
##gff-version 3
# Liftoff v1.6.3
chr1\tLiftoff\tgene\t100\t900\t.\t+\t.\tID=g1
chr1\tLiftoff\texon\t100\t900\t.\t-\t.\tID=e1;Note=see #12
chr1\tLiftoff\tCDS\t100\t900\t.\t.\t.\tID=c0
chr1\tLiftoff\tCDS\t104\t900\t.\t+\t.\tID=c1
";
        let (once, stats) = repair(input).unwrap();
        let (twice, _) = repair(&once).unwrap();
        assert_eq!(once, twice);
        assert_eq!(stats.records, 6);
        assert_eq!(stats.comments, 3);
        assert_eq!(stats.unchanged, 2);

        let in_lines: Vec<&str> = input.lines().collect();
        let out_lines: Vec<&str> = once.lines().collect();
        assert_eq!(out_lines.len(), in_lines.len());
        assert_eq!(&out_lines[..5], &in_lines[..5]);
        assert_eq!(out_lines[5], "chr1\tLiftoff\tCDS\t104\t900\t.\t+\t2\tID=c1");
    }

    #[test]
    fn test_unknown_sequence_is_fatal() {
        let err = repair("chrX\t.\tCDS\t1\t9\t.\t-\t.\tID=c\n").unwrap_err();
        assert!(matches!(err, FrameError::UnknownSequence { ref seqname, line: 1 } if seqname == "chrX"));
    }

    #[test]
    fn test_plus_strand_ignores_missing_sequence() {
        let (out, _) = repair("chrX\t.\tCDS\t7\t9\t.\t+\t.\tID=c\n").unwrap();
        assert_eq!(out, "chrX\t.\tCDS\t7\t9\t.\t+\t1\tID=c\n");
    }

    #[test]
    fn test_malformed_rows() {
        let err = repair("chr1\t.\tgene\t1\t9\t.\t+\t.\tID=g\tx\n").unwrap_err();
        assert!(matches!(err, FrameError::MalformedRecord { line: 1, found: 10 }));

        let err = repair("chr1\t.\tCDS\tx\t9\t.\t+\t.\tID=c\n").unwrap_err();
        assert!(matches!(err, FrameError::InvalidCoordinate { column: "start", .. }));
    }

    #[test]
    fn test_blank_lines_are_kept() {
        let input = "\
chr1\tLiftoff\tgene\t100\t900\t.\t+\t.\tID=g1

chr1\tLiftoff\tCDS\t100\t200\t.\t+\t.\tID=c1
\t
chr1\tLiftoff\tCDS\t50\t98\t.\t-\t.\tID=c2
";
        let (out, stats) = repair(input).unwrap();
        assert_eq!(
            out,
            "\
chr1\tLiftoff\tgene\t100\t900\t.\t+\t.\tID=g1

chr1\tLiftoff\tCDS\t100\t200\t.\t+\t1\tID=c1
\t
chr1\tLiftoff\tCDS\t50\t98\t.\t-\t2\tID=c2
"
        );
        assert_eq!(stats.records, 5);
        assert_eq!(stats.blank, 2);
    }

    #[test]
    fn test_unknown_sequence_reports_line_after_blank() {
        let err = repair("\n\nchrX\t.\tCDS\t1\t9\t.\t-\t.\tID=c\n").unwrap_err();
        assert!(matches!(err, FrameError::UnknownSequence { line: 3, .. }));
    }

    #[test]
    fn test_progress_lines_pass_through() {
        let input = "# Liftoff v1.6.3\nlifting features\nchr1\tLiftoff\tCDS\t100\t200\t.\t+\t.\tID=c1\n";
        let (out, stats) = repair(input).unwrap();
        assert_eq!(
            out,
            "# Liftoff v1.6.3\nlifting features\nchr1\tLiftoff\tCDS\t100\t200\t.\t+\t1\tID=c1\n"
        );
        assert_eq!(stats.unchanged, 1);
        assert_eq!(stats.forward_cds, 1);
    }

    #[test]
    fn test_repair_file_overwrites_output() {
        let dir = tempfile::TempDir::new().unwrap();
        let gff = dir.path().join("liftoff.gff3");
        std::fs::write(&gff, "chr2\t.\tCDS\t1\t4\t.\t-\t.\tID=c\n").unwrap();
        let out = default_output_path(&gff);
        std::fs::write(&out, "stale contents that are longer than the result\n").unwrap();

        let stats = repair_file(&gff, &lengths(), &out).unwrap();
        assert_eq!(stats.reverse_cds, 1);
        assert_eq!(std::fs::read_to_string(&out).unwrap(), "chr2\t.\tCDS\t1\t4\t.\t-\t0\tID=c\n");
        assert!(out.to_string_lossy().ends_with("liftoff.gff3_new.gff"));
    }
}
