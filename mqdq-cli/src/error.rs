//! Error handling for the CLI application

use std::fmt;

/// Custom error type for CLI-specific errors
#[derive(Debug)]
pub enum CliError {
    /// File not found or inaccessible
    FileNotFound(String),
    /// Invalid file pattern
    InvalidPattern(String),
    /// Configuration error
    ConfigError(String),
    /// Processing error from core
    ProcessingError(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::FileNotFound(path) => write!(f, "File not found: {path}"),
            CliError::InvalidPattern(pattern) => write!(f, "Invalid file pattern: {pattern}"),
            CliError::ConfigError(msg) => write!(f, "Configuration error: {msg}"),
            CliError::ProcessingError(msg) => write!(f, "Processing error: {msg}"),
        }
    }
}

impl std::error::Error for CliError {}

impl From<mqdq_core::Error> for CliError {
    fn from(error: mqdq_core::Error) -> Self {
        match error {
            mqdq_core::Error::Configuration(msg) => CliError::ConfigError(msg),
            mqdq_core::Error::Toml(e) => CliError::ConfigError(e.to_string()),
            other => CliError::ProcessingError(other.to_string()),
        }
    }
}

/// Result type alias for CLI operations
pub type CliResult<T> = Result<T, anyhow::Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            CliError::FileNotFound("verg.xml".to_string()).to_string(),
            "File not found: verg.xml"
        );
        assert_eq!(
            CliError::InvalidPattern("[invalid".to_string()).to_string(),
            "Invalid file pattern: [invalid"
        );
        assert_eq!(
            CliError::ConfigError("min_rows".to_string()).to_string(),
            "Configuration error: min_rows"
        );
        assert_eq!(
            CliError::ProcessingError("no body".to_string()).to_string(),
            "Processing error: no body"
        );
    }

    #[test]
    fn test_core_error_conversion() {
        let error: CliError = mqdq_core::Error::Configuration("max_rows".to_string()).into();
        assert!(matches!(error, CliError::ConfigError(_)));

        let error: CliError = mqdq_core::Error::MissingElement("text/body".to_string()).into();
        assert!(matches!(error, CliError::ProcessingError(_)));
        assert!(error.to_string().contains("text/body"));
    }

    #[test]
    fn test_cli_result_wraps_cli_error() {
        let failure: CliResult<()> = Err(CliError::FileNotFound("x.json".to_string()).into());
        let error = failure.unwrap_err();
        assert!(error.downcast_ref::<CliError>().is_some());
    }
}
