//! CLI command implementations

use anyhow::Result;
use clap::{Args, Subcommand};
use mqdq_core::{BatchSummary, MqdqConfig};
use std::path::{Path, PathBuf};

use crate::config::{init_thread_pool, load_config, worker_threads};
use crate::input::resolve_patterns;

pub mod add_credit;
pub mod export_apparatus;
pub mod export_text;
pub mod generate_config;
pub mod parse_apparatus;
pub mod parse_text;
pub mod parse_thesauri;
pub mod partition;
pub mod prepare_export;
pub mod remove_overlaps;
pub mod report_overlaps;

/// Available CLI commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Insert page breaks into long divisions of text documents
    Partition(partition::PartitionArgs),

    /// Dump text documents as tiled text partitions
    ParseText(parse_text::ParseTextArgs),

    /// Dump apparatus documents as apparatus layers
    ParseApparatus(parse_apparatus::ParseApparatusArgs),

    /// Write a Markdown report of overlapping apparatus entries
    ReportOverlaps(report_overlaps::ReportOverlapsArgs),

    /// Merge overlapping apparatus entries
    RemoveOverlaps(remove_overlaps::RemoveOverlapsArgs),

    /// Rebuild text documents from partition dumps
    ExportText(export_text::ExportTextArgs),

    /// Rebuild apparatus documents from layer dumps
    ExportApparatus(export_apparatus::ExportApparatusArgs),

    /// Dump the witness and author lists of apparatus headers as thesauri
    ParseThesauri(parse_thesauri::ParseThesauriArgs),

    /// Add a responsibility credit to the header of documents
    AddCredit(add_credit::AddCreditArgs),

    /// Pair text documents with their apparatus documents for export
    PrepareExport(prepare_export::PrepareExportArgs),

    /// Generate a configuration file with the default settings
    GenerateConfig(generate_config::GenerateConfigArgs),
}

impl Commands {
    /// Execute the selected command
    pub fn execute(&self) -> Result<()> {
        match self {
            Self::Partition(args) => args.execute(),
            Self::ParseText(args) => args.execute(),
            Self::ParseApparatus(args) => args.execute(),
            Self::ReportOverlaps(args) => args.execute(),
            Self::RemoveOverlaps(args) => args.execute(),
            Self::ExportText(args) => args.execute(),
            Self::ExportApparatus(args) => args.execute(),
            Self::ParseThesauri(args) => args.execute(),
            Self::AddCredit(args) => args.execute(),
            Self::PrepareExport(args) => args.execute(),
            Self::GenerateConfig(args) => args.execute(),
        }
    }
}

/// Arguments shared by the batch commands
#[derive(Debug, Clone, Args)]
pub struct CommonArgs {
    /// Input files or patterns (supports glob)
    #[arg(short, long, value_name = "FILE/PATTERN", required = true)]
    pub input: Vec<String>,

    /// Output directory (or file, for reports)
    #[arg(short, long, value_name = "PATH")]
    pub output: PathBuf,

    /// Configuration file
    #[arg(short, long, value_name = "FILE", env = "MQDQ_CONFIG")]
    pub config: Option<PathBuf>,

    /// Number of worker threads (default: configuration, else one per core)
    #[arg(short, long, value_name = "COUNT")]
    pub threads: Option<usize>,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Increase verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// What a batch command starts from
pub struct BatchSetup {
    pub config: MqdqConfig,
    pub inputs: Vec<PathBuf>,
}

impl CommonArgs {
    /// Initialize logging, load the configuration, size the worker pool and
    /// resolve the input documents
    pub fn prepare(&self) -> Result<BatchSetup> {
        self.init_logging();

        let config = load_config(self.config.as_deref())?;
        init_thread_pool(worker_threads(self.threads, &config));

        let inputs = resolve_patterns(&self.input)?;
        log::info!("Found {} document(s) to process", inputs.len());
        Ok(BatchSetup { config, inputs })
    }

    /// Initialize logging based on verbosity level
    fn init_logging(&self) {
        let log_level = match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };

        if !self.quiet {
            // a second initialization in the same process is harmless
            let _ = env_logger::Builder::from_env(
                env_logger::Env::default().default_filter_or(log_level),
            )
            .try_init();
        }
    }
}

/// Print the final counts of a batch
pub fn print_summary(command: &str, summary: &BatchSummary) {
    println!("{command}: {summary}");
}

/// File name of a path, for messages
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn common(input: &str) -> CommonArgs {
        CommonArgs {
            input: vec![input.to_string()],
            output: PathBuf::from("out"),
            config: None,
            threads: None,
            quiet: true,
            verbose: 0,
        }
    }

    #[test]
    fn test_commands_debug_format() {
        let cmd = Commands::Partition(partition::PartitionArgs {
            common: common("verg.xml"),
            min_rows: None,
            max_rows: Some(25),
        });
        let debug_str = format!("{:?}", cmd);
        assert!(debug_str.contains("Partition"));
        assert!(debug_str.contains("verg.xml"));

        let cmd = Commands::GenerateConfig(generate_config::GenerateConfigArgs { output: None });
        assert!(format!("{:?}", cmd).contains("GenerateConfig"));
    }

    #[test]
    fn test_prepare_without_matches_fails() {
        let args = common("/nonexistent/dir/*.xml");
        let error = args.prepare().err().unwrap();
        assert!(error.to_string().contains("No files found"));
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name(Path::new("in/verg-app.xml")), "verg-app.xml");
    }
}
