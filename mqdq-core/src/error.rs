//! Error types for the core library
//!
//! Only fatal conditions travel through [`Error`]: configuration problems,
//! documents lacking their top-level structure, and I/O or format failures.
//! Per-fragment and per-entry problems are reported through a
//! [`Reporter`](crate::report::Reporter) and never abort a document.

use thiserror::Error;

/// Error type for core operations
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid or inconsistent configuration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A required document element is missing
    #[error("Missing required element: {0}")]
    MissingElement(String),

    /// Text which is not a valid word key
    #[error("Invalid word key: {0}")]
    InvalidWordKey(String),

    /// Text which is not a valid tile location
    #[error("Invalid location: {0}")]
    InvalidLocation(String),

    /// XML reading or writing error
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Invalid XML escape sequence
    #[error("XML escape error: {0}")]
    XmlEscape(#[from] quick_xml::escape::EscapeError),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML configuration parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_error_display() {
        let error = Error::Configuration("min_rows > max_rows".to_string());
        assert_eq!(error.to_string(), "Configuration error: min_rows > max_rows");
    }

    #[test]
    fn test_missing_element_display() {
        let error = Error::MissingElement("body".to_string());
        assert_eq!(error.to_string(), "Missing required element: body");
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let error: Error = io.into();
        assert!(matches!(error, Error::Io(_)));
        assert!(error.to_string().contains("gone"));
    }
}
