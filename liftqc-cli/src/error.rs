//! Error handling for the liftqc CLI

use liftqc_core::{AttributeError, FastaError, FrameError, GffError, StoreError};
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for liftqc CLI operations
#[derive(Error, Debug, Clone)]
pub enum CliError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Input/Output error: {message}")]
    Io { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Invalid format: {message}")]
    InvalidFormat { message: String },

    #[error("Missing data: {message}")]
    MissingData { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },
}

impl CliError {
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config { message: message.into() }
    }

    pub fn io<S: Into<String>>(message: S) -> Self {
        Self::Io { message: message.into() }
    }

    pub fn file_not_found(path: PathBuf) -> Self {
        Self::FileNotFound { path }
    }

    pub fn invalid_format<S: Into<String>>(message: S) -> Self {
        Self::InvalidFormat { message: message.into() }
    }

    pub fn missing_data<S: Into<String>>(message: S) -> Self {
        Self::MissingData { message: message.into() }
    }

    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation { message: message.into() }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::io(err.to_string())
    }
}

impl From<toml::de::Error> for CliError {
    fn from(err: toml::de::Error) -> Self {
        Self::config(format!("TOML parsing error: {}", err))
    }
}

impl From<&FrameError> for CliError {
    fn from(err: &FrameError) -> Self {
        match err {
            FrameError::UnknownSequence { .. } => Self::missing_data(err.to_string()),
            FrameError::Io(io) => Self::io(io.to_string()),
            other => Self::invalid_format(other.to_string()),
        }
    }
}

impl From<&FastaError> for CliError {
    fn from(err: &FastaError) -> Self {
        match err {
            FastaError::UnknownSequence(_) => Self::missing_data(err.to_string()),
            other => Self::invalid_format(other.to_string()),
        }
    }
}

impl From<&GffError> for CliError {
    fn from(err: &GffError) -> Self {
        match err {
            GffError::Io(io) => Self::io(io.to_string()),
            other => Self::invalid_format(other.to_string()),
        }
    }
}

impl From<&StoreError> for CliError {
    fn from(err: &StoreError) -> Self {
        match err {
            StoreError::DuplicateId { .. } => Self::validation(err.to_string()),
            StoreError::Gff(gff) => gff.into(),
        }
    }
}

impl From<&AttributeError> for CliError {
    fn from(err: &AttributeError) -> Self {
        Self::missing_data(err.to_string())
    }
}

/// The first error in `err`'s chain that has a CLI category, converted.
/// Library errors come back wrapped in context from the core crate, so the
/// whole chain is searched rather than just the outermost error.
pub fn as_cli_error(err: &anyhow::Error) -> Option<CliError> {
    err.chain().find_map(|cause| {
        if let Some(e) = cause.downcast_ref::<CliError>() {
            Some(e.clone())
        } else if let Some(e) = cause.downcast_ref::<FrameError>() {
            Some(e.into())
        } else if let Some(e) = cause.downcast_ref::<StoreError>() {
            Some(e.into())
        } else if let Some(e) = cause.downcast_ref::<GffError>() {
            Some(e.into())
        } else if let Some(e) = cause.downcast_ref::<FastaError>() {
            Some(e.into())
        } else {
            cause.downcast_ref::<AttributeError>().map(CliError::from)
        }
    })
}

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Fail with `FileNotFound` unless `path` exists.
pub fn ensure_exists(path: &std::path::Path) -> CliResult<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(CliError::file_not_found(path.to_path_buf()))
    }
}

/// Provide helpful error messages and suggestions
pub fn format_error_with_suggestions(error: &CliError) -> String {
    let mut message = error.to_string();

    match error {
        CliError::FileNotFound { path } => {
            message.push_str(&format!(
                "\n\nSuggestions:\n\
                 • Check that the file path is correct: {}\n\
                 • Ensure you have read permissions for the file\n\
                 • Compressed inputs must end in .gz",
                path.display()
            ));
        }

        CliError::InvalidFormat { .. } => {
            message.push_str(
                "\n\nSuggestions:\n\
                 • Check that the annotation is GFF3 with 9 tab-separated columns\n\
                 • Check that start and end columns are integers\n\
                 • Ensure the file is not corrupted or truncated",
            );
        }

        CliError::MissingData { .. } => {
            message.push_str(
                "\n\nSuggestions:\n\
                 • Make sure the genome FASTA is the target genome Liftoff mapped onto\n\
                 • Coverage statistics need Liftoff's sequence_ID and coverage attributes",
            );
        }

        CliError::Validation { .. } => {
            message.push_str(
                "\n\nSuggestions:\n\
                 • Use --merge-strategy create-unique to rename duplicate feature ids\n\
                 • Write repaired annotations to a path other than the input",
            );
        }

        CliError::Config { .. } => {
            message.push_str(
                "\n\nSuggestions:\n\
                 • Check your liftqc.toml configuration file\n\
                 • Use 'liftqc config' to generate a sample configuration\n\
                 • Verify that all configuration values are valid",
            );
        }

        CliError::Io { .. } => {}
    }

    message
}

/// Print error with helpful suggestions and exit
pub fn print_error_and_exit(error: &CliError) -> ! {
    eprintln!("Error: {}", format_error_with_suggestions(error));
    std::process::exit(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = CliError::config("test message");
        assert!(matches!(err, CliError::Config { .. }));
        assert_eq!(err.to_string(), "Configuration error: test message");
    }

    #[test]
    fn test_error_suggestions() {
        let err = CliError::file_not_found(PathBuf::from("genome.fa"));
        let formatted = format_error_with_suggestions(&err);
        assert!(formatted.contains("Suggestions:"));
        assert!(formatted.contains("Check that the file path is correct: genome.fa"));
    }

    #[test]
    fn test_library_error_conversion() {
        let err = CliError::from(&FrameError::UnknownSequence {
            line: 3,
            seqname: "chrX".to_string(),
        });
        assert!(matches!(err, CliError::MissingData { ref message } if message.contains("chrX")));

        let err = CliError::from(&StoreError::DuplicateId { id: "g1".to_string() });
        assert!(format_error_with_suggestions(&err).contains("create-unique"));
    }

    #[test]
    fn test_cli_error_found_under_context() {
        use anyhow::Context;

        let inner: Result<(), StoreError> = Err(StoreError::DuplicateId { id: "g1".to_string() });
        let err = inner
            .context("Failed to index in.gff3")
            .context("Failed to load in.gff3")
            .unwrap_err();
        assert!(matches!(as_cli_error(&err), Some(CliError::Validation { .. })));

        let err = anyhow::Error::new(CliError::file_not_found(PathBuf::from("x.gff3"))).context("outer");
        assert!(matches!(as_cli_error(&err), Some(CliError::FileNotFound { .. })));

        assert!(as_cli_error(&anyhow::anyhow!("plain failure")).is_none());
    }

    #[test]
    fn test_ensure_exists() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert!(ensure_exists(file.path()).is_ok());
        let missing = file.path().with_extension("missing");
        assert!(matches!(ensure_exists(&missing), Err(CliError::FileNotFound { .. })));
    }
}
