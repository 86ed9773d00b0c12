//! Parse-apparatus command implementation

use anyhow::{bail, Context, Result};
use clap::Args;
use mqdq_core::{process_batch, ApparatusParser, DocumentOutcome, LogReporter, TextIndex};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use super::{display_name, print_summary, CommonArgs};
use crate::input::file_reader::file_stem;
use crate::input::{doc_id, find_dumps, FileReader};
use crate::output::{ensure_dir, DumpWriter};
use crate::progress::ProgressReporter;

/// Arguments for the parse-apparatus command
#[derive(Debug, Args)]
pub struct ParseApparatusArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Directory with the text partition dumps written by parse-text
    #[arg(long, value_name = "DIR")]
    pub text_dumps: PathBuf,

    /// Maximum layers per dump file, 0 for a single file
    /// (overrides the configuration)
    #[arg(short, long, value_name = "COUNT")]
    pub max_items: Option<usize>,
}

/// Build the index of the words of a document from its text dumps
pub fn load_text_index(dumps_dir: &Path, doc_id: &str) -> Result<TextIndex> {
    let dumps = find_dumps(dumps_dir, doc_id)?;
    if dumps.is_empty() {
        bail!("No text dumps for {doc_id} in {}", dumps_dir.display());
    }
    let mut index = TextIndex::new();
    for path in &dumps {
        let file =
            File::open(path).with_context(|| format!("Failed to open dump: {}", path.display()))?;
        index
            .index_json(BufReader::new(file))
            .with_context(|| format!("Invalid dump: {}", path.display()))?;
    }
    log::debug!("Indexed {} word(s) of {doc_id}", index.len());
    Ok(index)
}

impl ParseApparatusArgs {
    /// Execute the parse-apparatus command
    pub fn execute(&self) -> Result<()> {
        let setup = self.common.prepare()?;
        let output = &self.common.output;
        ensure_dir(output)?;

        let writer = DumpWriter::new(
            self.max_items
                .unwrap_or(setup.config.output.max_items_per_file),
            setup.config.output.pretty_json,
        );
        let reporter = LogReporter::new("mqdq::parse_apparatus");
        let mut progress = ProgressReporter::new(self.common.quiet);
        progress.init_files(setup.inputs.len() as u64);

        let summary = process_batch(&setup.inputs, &reporter, |path: &PathBuf| -> Result<DocumentOutcome> {
            let id = doc_id(path);
            let index = load_text_index(&self.text_dumps, &id)?;
            let doc = FileReader::read_document(path)?;
            let layers = ApparatusParser::new(setup.config.apparatus.clone(), &index, &reporter)
                .parse(&doc, &id)?;
            writer.write(output, &file_stem(path), &layers)?;
            progress.file_completed(&display_name(path));
            Ok(DocumentOutcome::touched(!layers.is_empty()))
        });
        progress.finish();

        print_summary("parse-apparatus", &summary);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_text_index() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("verg_00001.json"),
            r#"[{"id":"verg-00001","docId":"verg","ordinal":1,"citation":"verg 1","rows":[{"y":1,"tiles":[{"x":1,"data":{"id":"d001w1","text":"arma"}}]}]}]"#,
        )
        .unwrap();
        let index = load_text_index(dir.path(), "verg").unwrap();
        assert_eq!(index.find("d001w1").map(|e| e.row), Some(1));

        let missing = load_text_index(dir.path(), "ov").unwrap_err();
        assert!(missing.to_string().contains("No text dumps for ov"));
    }
}
