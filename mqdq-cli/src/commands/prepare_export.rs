//! Prepare-export command implementation

use anyhow::{Context, Result};
use clap::Args;
use mqdq_core::{process_batch, DocumentOutcome, LogReporter};
use std::fs;
use std::path::{Path, PathBuf};

use super::{display_name, print_summary, CommonArgs};
use crate::input::doc_id;
use crate::input::file_reader::file_stem;
use crate::output::{copy_document, ensure_dir};
use crate::progress::ProgressReporter;

/// Arguments for the prepare-export command
#[derive(Debug, Args)]
pub struct PrepareExportArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Directory with the processed apparatus documents
    #[arg(long, value_name = "DIR")]
    pub app_dir: PathBuf,
}

/// Whether a file is an apparatus document (`*-app.xml`)
fn is_apparatus(path: &Path) -> bool {
    file_stem(path).to_lowercase().ends_with("-app")
}

/// Copy a text document into `<output>/<its directory name>/`, with its
/// apparatus document from `app_dir` when there is one. Returns whether
/// the apparatus document was found.
pub fn pair_documents(text_path: &Path, app_dir: &Path, output: &Path) -> Result<bool> {
    let group = text_path
        .parent()
        .and_then(Path::file_name)
        .map(PathBuf::from)
        .unwrap_or_default();
    let target = output.join(group);
    fs::create_dir_all(&target)
        .with_context(|| format!("Failed to create directory: {}", target.display()))?;

    copy_document(&target, text_path)?;
    let app_path = app_dir.join(format!("{}-app.xml", doc_id(text_path)));
    if !app_path.is_file() {
        return Ok(false);
    }
    copy_document(&target, &app_path)?;
    Ok(true)
}

impl PrepareExportArgs {
    /// Execute the prepare-export command
    pub fn execute(&self) -> Result<()> {
        let setup = self.common.prepare()?;
        let output = &self.common.output;
        ensure_dir(output)?;

        let texts: Vec<PathBuf> = setup
            .inputs
            .into_iter()
            .filter(|p| !is_apparatus(p))
            .collect();
        let reporter = LogReporter::new("mqdq::prepare_export");
        let mut progress = ProgressReporter::new(self.common.quiet);
        progress.init_files(texts.len() as u64);

        let summary = process_batch(&texts, &reporter, |path: &PathBuf| -> Result<DocumentOutcome> {
            let paired = pair_documents(path, &self.app_dir, output)?;
            if !paired {
                log::info!("{}: no apparatus document", display_name(path));
            }
            progress.file_completed(&display_name(path));
            Ok(DocumentOutcome::touched(paired))
        });
        progress.finish();

        print_summary("prepare-export", &summary);
        Ok(())
    }
}
