//! File handle helpers shared by the GFF3 reader, the FASTA checks and the
//! report writers.

use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter};
use std::path::Path;

/// Open a text file for buffered reading, transparently decompressing
/// gzip input when the path ends in `.gz`.
pub fn open_reader<P: AsRef<Path>>(path: P) -> Result<Box<dyn BufRead + Send>> {
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    if is_gzipped(path) {
        Ok(Box::new(BufReader::new(GzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Create (or truncate) a file for buffered writing.
pub fn create_writer<P: AsRef<Path>>(path: P) -> Result<BufWriter<File>> {
    let path = path.as_ref();
    let file = File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    Ok(BufWriter::new(file))
}

pub fn is_gzipped(path: &Path) -> bool {
    path.to_string_lossy().to_lowercase().ends_with(".gz")
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_open_plain_and_gzipped() {
        let dir = TempDir::new().unwrap();
        let plain = dir.path().join("a.gff3");
        std::fs::write(&plain, "line one\nline two\n").unwrap();

        let gz = dir.path().join("a.gff3.gz");
        let mut encoder = GzEncoder::new(File::create(&gz).unwrap(), Compression::default());
        encoder.write_all(b"line one\nline two\n").unwrap();
        encoder.finish().unwrap();

        for path in [&plain, &gz] {
            let lines: Vec<String> = open_reader(path).unwrap().lines().map(|l| l.unwrap()).collect();
            assert_eq!(lines, vec!["line one", "line two"]);
        }
    }

    #[test]
    fn test_missing_file_names_path() {
        let err = open_reader("/nonexistent/liftoff.gff3").err().unwrap();
        assert!(err.to_string().contains("/nonexistent/liftoff.gff3"));
    }
}
