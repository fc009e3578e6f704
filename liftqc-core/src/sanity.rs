//! Advisory input checks
//!
//! These never stop a run: each check returns the problems it found and
//! the caller decides how loudly to report them.

use crate::io::open_reader;
use anyhow::Result;
use regex::Regex;
use std::fmt;
use std::io::BufRead;
use std::path::Path;
use std::sync::OnceLock;

/// Comment Liftoff writes at the top of every GFF3 it produces.
pub const LIFTOFF_MARKER: &str = "# Liftoff";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputWarning {
    NotFasta,
    NotNucleotide,
    NotLiftoff { marker: String },
}

impl fmt::Display for InputWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputWarning::NotFasta => write!(f, "Your genome is not a fasta file"),
            InputWarning::NotNucleotide => write!(f, "Your genome is not nucleotide sequence"),
            InputWarning::NotLiftoff { marker } => write!(
                f,
                "This is not a gff produced by Liftoff (no '{}' line) and may not work as expected. Continuing, but please check your outputs!",
                marker
            ),
        }
    }
}

fn nucleotide_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)^[acgtn]*$").expect("nucleotide pattern is valid"))
}

/// Look at the first two lines of a genome file: the first must be a FASTA
/// header and the second must look like nucleotides.
pub fn check_genome<R: BufRead>(mut reader: R) -> std::io::Result<Option<InputWarning>> {
    let mut first = String::new();
    let mut second = String::new();
    reader.read_line(&mut first)?;
    reader.read_line(&mut second)?;

    if !first.contains('>') {
        return Ok(Some(InputWarning::NotFasta));
    }
    if !nucleotide_pattern().is_match(second.trim_end_matches(['\r', '\n'])) {
        return Ok(Some(InputWarning::NotNucleotide));
    }
    Ok(None)
}

/// Scan an annotation for the provenance marker.
pub fn check_provenance<R: BufRead>(reader: R, marker: &str) -> std::io::Result<Option<InputWarning>> {
    for line in reader.lines() {
        if line?.contains(marker) {
            return Ok(None);
        }
    }
    Ok(Some(InputWarning::NotLiftoff {
        marker: marker.to_string(),
    }))
}

pub fn check_genome_file<P: AsRef<Path>>(path: P) -> Result<Option<InputWarning>> {
    Ok(check_genome(open_reader(path)?)?)
}

pub fn check_provenance_file<P: AsRef<Path>>(path: P, marker: &str) -> Result<Option<InputWarning>> {
    Ok(check_provenance(open_reader(path)?, marker)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_genome_checks() {
        assert_eq!(check_genome(Cursor::new(">chr1\nACGTNacgtn\n")).unwrap(), None);
        assert_eq!(check_genome(Cursor::new(">chr1\n")).unwrap(), None);
        assert_eq!(
            check_genome(Cursor::new("chr1\nACGT\n")).unwrap(),
            Some(InputWarning::NotFasta)
        );
        assert_eq!(
            check_genome(Cursor::new(">prot\nMKVLA\n")).unwrap(),
            Some(InputWarning::NotNucleotide)
        );
    }

    #[test]
    fn test_provenance_marker() {
        let liftoff = "##gff-version 3\n# Liftoff v1.6.3\nchr1\t.\tgene\t1\t2\t.\t+\t.\tID=g\n";
        assert_eq!(check_provenance(Cursor::new(liftoff), LIFTOFF_MARKER).unwrap(), None);

        let other = "##gff-version 3\nchr1\t.\tgene\t1\t2\t.\t+\t.\tID=g\n";
        let warning = check_provenance(Cursor::new(other), LIFTOFF_MARKER).unwrap().unwrap();
        assert!(warning.to_string().contains("not a gff produced by Liftoff"));
    }
}
