//! Configuration for partitioning and batch processing

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration constants
pub mod defaults {
    /// Minimum rows per partition before a sentence end is accepted
    pub const MIN_ROWS: usize = 20;

    /// Maximum rows per partition
    pub const MAX_ROWS: usize = 50;

    /// Upper bound for the minimum rows setting
    pub const MIN_ROWS_LIMIT: usize = 100;

    /// Upper bound for the maximum rows setting
    pub const MAX_ROWS_LIMIT: usize = 1000;

    /// Division types eligible for partitioning
    pub const APPLICABLE_TYPES: &[&str] = &["section", "work"];

    /// Maximum partitions written to a single JSON dump
    pub const MAX_ITEMS_PER_FILE: usize = 100;

    /// Facet assigned to text partitions
    pub const TEXT_FACET: &str = "text";

    /// User recorded on imported items
    pub const USER_ID: &str = "zeus";
}

/// Partitioner thresholds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartitionerConfig {
    /// Rows a partition must reach before a sentence end closes it
    pub min_rows: usize,
    /// Rows after which a partition is closed regardless of sentence ends
    pub max_rows: usize,
    /// Values of `div1@type` that make a document eligible
    pub applicable_types: Vec<String>,
}

impl Default for PartitionerConfig {
    fn default() -> Self {
        Self {
            min_rows: defaults::MIN_ROWS,
            max_rows: defaults::MAX_ROWS,
            applicable_types: defaults::APPLICABLE_TYPES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl PartitionerConfig {
    /// Create a configuration builder
    pub fn builder() -> PartitionerConfigBuilder {
        PartitionerConfigBuilder::default()
    }

    /// Validate the thresholds
    pub fn validate(&self) -> Result<()> {
        if self.min_rows < 1 || self.min_rows > defaults::MIN_ROWS_LIMIT {
            return Err(Error::Configuration(format!(
                "min_rows must be between 1 and {}, got {}",
                defaults::MIN_ROWS_LIMIT,
                self.min_rows
            )));
        }

        if self.max_rows < 1 || self.max_rows > defaults::MAX_ROWS_LIMIT {
            return Err(Error::Configuration(format!(
                "max_rows must be between 1 and {}, got {}",
                defaults::MAX_ROWS_LIMIT,
                self.max_rows
            )));
        }

        if self.min_rows > self.max_rows {
            return Err(Error::Configuration(format!(
                "min_rows ({}) must not exceed max_rows ({})",
                self.min_rows, self.max_rows
            )));
        }

        Ok(())
    }
}

/// Fluent builder for [`PartitionerConfig`]
#[derive(Debug, Default)]
pub struct PartitionerConfigBuilder {
    min_rows: Option<usize>,
    max_rows: Option<usize>,
    applicable_types: Option<Vec<String>>,
}

impl PartitionerConfigBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the minimum rows
    pub fn min_rows(mut self, rows: usize) -> Self {
        self.min_rows = Some(rows);
        self
    }

    /// Set the maximum rows
    pub fn max_rows(mut self, rows: usize) -> Self {
        self.max_rows = Some(rows);
        self
    }

    /// Set the division types eligible for partitioning
    pub fn applicable_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.applicable_types = Some(types.into_iter().map(Into::into).collect());
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<PartitionerConfig> {
        let mut config = PartitionerConfig::default();

        if let Some(rows) = self.min_rows {
            config.min_rows = rows;
        }
        if let Some(rows) = self.max_rows {
            config.max_rows = rows;
        }
        if let Some(types) = self.applicable_types {
            config.applicable_types = types;
        }

        config.validate()?;
        Ok(config)
    }
}

/// Complete configuration file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MqdqConfig {
    /// Partitioning thresholds
    #[serde(default)]
    pub partition: PartitionerConfig,

    /// Text import settings
    #[serde(default)]
    pub text: TextConfig,

    /// Apparatus import settings
    #[serde(default)]
    pub apparatus: ApparatusConfig,

    /// Output settings
    #[serde(default)]
    pub output: OutputConfig,

    /// Performance settings
    #[serde(default)]
    pub performance: PerformanceConfig,
}

impl MqdqConfig {
    /// Parse a configuration from TOML text and validate it
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: MqdqConfig = toml::from_str(text)?;
        config.partition.validate()?;
        Ok(config)
    }

    /// Load a configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Render the configuration as TOML
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Configuration(e.to_string()))
    }
}

/// Text import settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TextConfig {
    /// Facet id assigned to text partitions
    pub facet_id: String,
    /// User id recorded on text partitions
    pub user_id: String,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            facet_id: defaults::TEXT_FACET.to_string(),
            user_id: defaults::USER_ID.to_string(),
        }
    }
}

/// Apparatus import settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApparatusConfig {
    /// User id recorded on apparatus layers
    pub user_id: String,
}

impl Default for ApparatusConfig {
    fn default() -> Self {
        Self {
            user_id: defaults::USER_ID.to_string(),
        }
    }
}

/// Output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Maximum partitions or layers per JSON dump
    pub max_items_per_file: usize,
    /// Pretty print JSON output
    pub pretty_json: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            max_items_per_file: defaults::MAX_ITEMS_PER_FILE,
            pretty_json: true,
        }
    }
}

/// Performance settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceConfig {
    /// Number of worker threads (0 = all cores)
    pub worker_threads: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let config = PartitionerConfig::builder().build().unwrap();
        assert_eq!(config.min_rows, 20);
        assert_eq!(config.max_rows, 50);
        assert_eq!(config.applicable_types, vec!["section", "work"]);
    }

    #[test]
    fn test_builder_rejects_out_of_range() {
        assert!(PartitionerConfig::builder().min_rows(0).build().is_err());
        assert!(PartitionerConfig::builder().min_rows(101).max_rows(200).build().is_err());
        assert!(PartitionerConfig::builder().max_rows(1001).build().is_err());
    }

    #[test]
    fn test_builder_rejects_min_above_max() {
        let result = PartitionerConfig::builder().min_rows(30).max_rows(10).build();
        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[test]
    fn test_builder_accepts_equal_bounds() {
        let config = PartitionerConfig::builder()
            .min_rows(10)
            .max_rows(10)
            .applicable_types(["poem"])
            .build()
            .unwrap();
        assert_eq!(config.applicable_types, vec!["poem"]);
    }

    #[test]
    fn test_toml_partial_sections() {
        let config = MqdqConfig::from_toml_str(
            r#"
            [partition]
            min_rows = 5
            max_rows = 20

            [output]
            pretty_json = false
            "#,
        )
        .unwrap();
        assert_eq!(config.partition.min_rows, 5);
        assert_eq!(config.partition.applicable_types.len(), 2);
        assert!(!config.output.pretty_json);
        assert_eq!(config.output.max_items_per_file, 100);
        assert_eq!(config.text.facet_id, "text");
    }

    #[test]
    fn test_toml_invalid_thresholds() {
        let result = MqdqConfig::from_toml_str("[partition]\nmin_rows = 60\nmax_rows = 50\n");
        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[test]
    fn test_toml_roundtrip_default() {
        let text = MqdqConfig::default().to_toml_string().unwrap();
        let parsed = MqdqConfig::from_toml_str(&text).unwrap();
        assert_eq!(parsed.partition, PartitionerConfig::default());
    }
}
