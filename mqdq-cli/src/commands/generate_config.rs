//! Generate config command implementation

use anyhow::{Context, Result};
use clap::Args;
use mqdq_core::MqdqConfig;
use std::fs;
use std::path::PathBuf;

/// Arguments for the generate-config command
#[derive(Debug, Args)]
pub struct GenerateConfigArgs {
    /// Output file path (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

impl GenerateConfigArgs {
    /// Execute the generate-config command
    pub fn execute(&self) -> Result<()> {
        let template = generate_template()?;

        let Some(output) = &self.output else {
            print!("{template}");
            return Ok(());
        };

        fs::write(output, template)
            .with_context(|| format!("Failed to write to {}", output.display()))?;

        println!("✓ Configuration generated: {}", output.display());
        println!();
        println!("Next steps:");
        println!("1. Edit the thresholds and user ids as needed");
        println!("2. Use it for processing:");
        println!(
            "   mqdq partition -i 'texts/*.xml' -o partitioned --config {}",
            output.display()
        );

        Ok(())
    }
}

/// The default configuration as commented TOML
fn generate_template() -> Result<String> {
    let body = MqdqConfig::default().to_toml_string()?;
    Ok(format!("# MQDQ migration configuration\n\n{body}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_template_loads_back() {
        let template = generate_template().unwrap();
        let config = MqdqConfig::from_toml_str(&template).unwrap();
        assert_eq!(config.partition, MqdqConfig::default().partition);
        assert!(template.contains("[partition]"));
    }

    #[test]
    fn test_write_to_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("mqdq.toml");
        GenerateConfigArgs {
            output: Some(path.clone()),
        }
        .execute()
        .unwrap();
        assert!(fs::read_to_string(path).unwrap().contains("max_rows"));
    }
}
