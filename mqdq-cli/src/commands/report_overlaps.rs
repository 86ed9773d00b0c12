//! Report-overlaps command implementation

use anyhow::{Context, Result};
use clap::Args;
use mqdq_core::{process_batch, report_overlaps, DocumentOutcome, LogReporter, WordIndex};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::{display_name, print_summary, CommonArgs};
use crate::input::file_reader::text_document_path;
use crate::input::FileReader;
use crate::output::markdown::OverlapEntry;
use crate::output::OverlapReport;
use crate::progress::ProgressReporter;

/// Arguments for the report-overlaps command
#[derive(Debug, Args)]
pub struct ReportOverlapsArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Directory with the text documents (default: next to each apparatus
    /// document)
    #[arg(long, value_name = "DIR")]
    pub text_dir: Option<PathBuf>,
}

/// Word order of the text document matching an apparatus document
pub fn load_word_index(app_path: &Path, text_dir: Option<&Path>) -> Result<WordIndex> {
    let text_path = text_document_path(app_path, text_dir);
    let doc = FileReader::read_document(&text_path)
        .with_context(|| format!("No text document for {}", display_name(app_path)))?;
    Ok(WordIndex::from_document(&doc))
}

impl ReportOverlapsArgs {
    /// Execute the report-overlaps command
    pub fn execute(&self) -> Result<()> {
        let setup = self.common.prepare()?;
        let reporter = LogReporter::new("mqdq::report_overlaps");
        let report = Mutex::new(OverlapReport::new());
        let mut progress = ProgressReporter::new(self.common.quiet);
        progress.init_files(setup.inputs.len() as u64);

        let summary = process_batch(&setup.inputs, &reporter, |path: &PathBuf| -> Result<DocumentOutcome> {
            let index = load_word_index(path, self.text_dir.as_deref())?;
            let doc = FileReader::read_document(path)?;
            let pairs = report_overlaps(&doc, &index, &reporter)?;
            let entries: Vec<OverlapEntry> = pairs
                .iter()
                .map(|pair| OverlapEntry {
                    words: pair
                        .words
                        .iter()
                        .map(|w| (w.id.clone(), w.text.clone()))
                        .collect(),
                    first: doc.node_to_string(pair.first_app),
                    second: doc.node_to_string(pair.second_app),
                })
                .collect();
            let found = !entries.is_empty();
            if let Ok(mut report) = report.lock() {
                report.add_document(display_name(path), entries);
            }
            progress.file_completed(&display_name(path));
            Ok(DocumentOutcome::touched(found))
        });
        progress.finish();

        let mut report = report
            .into_inner()
            .map_err(|_| anyhow::anyhow!("Overlap report lock poisoned"))?;
        let output = &self.common.output;
        let file = File::create(output)
            .with_context(|| format!("Failed to create report: {}", output.display()))?;
        report.write_to(&mut BufWriter::new(file))?;
        log::info!(
            "{} overlap(s) reported to {}",
            report.overlap_count(),
            output.display()
        );

        print_summary("report-overlaps", &summary);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_word_index_from_sibling() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("verg.xml"),
            r#"<TEI><text><body><div1 xml:id="d001"><l><w xml:id="d001w1">arma</w></l></div1></body></text></TEI>"#,
        )
        .unwrap();
        let app = dir.path().join("verg-app.xml");
        let index = load_word_index(&app, None).unwrap();
        assert_eq!(index.text("d001w1"), Some("arma"));

        let error = load_word_index(&dir.path().join("ov-app.xml"), None).unwrap_err();
        assert!(error.to_string().contains("No text document for ov-app.xml"));
    }
}
