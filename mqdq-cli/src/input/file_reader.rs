//! File reading utilities

use anyhow::{Context, Result};
use mqdq_core::XmlDocument;
use std::fs;
use std::path::{Path, PathBuf};

/// Suffix of apparatus document file names
const APPARATUS_SUFFIX: &str = "-app";

/// File reader for TEI documents and JSON dumps
pub struct FileReader;

impl FileReader {
    /// Read a file as UTF-8 text
    pub fn read_text(path: &Path) -> Result<String> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))?;

        Ok(content)
    }

    /// Read and parse an XML document
    pub fn read_document(path: &Path) -> Result<XmlDocument> {
        let text = Self::read_text(path)?;
        XmlDocument::parse(&text).with_context(|| format!("Failed to parse: {}", path.display()))
    }

    /// Read the JSON arrays of several dumps into one list
    pub fn read_dumps<T: serde::de::DeserializeOwned>(paths: &[PathBuf]) -> Result<Vec<T>> {
        let mut items = Vec::new();
        for path in paths {
            let file = fs::File::open(path)
                .with_context(|| format!("Failed to open dump: {}", path.display()))?;
            let chunk: Vec<T> = serde_json::from_reader(std::io::BufReader::new(file))
                .with_context(|| format!("Invalid dump: {}", path.display()))?;
            items.extend(chunk);
        }
        Ok(items)
    }
}

/// Document id of a file: its stem, without the `-app` suffix of apparatus
/// documents
pub fn doc_id(path: &Path) -> String {
    let stem = file_stem(path);
    stem.strip_suffix(APPARATUS_SUFFIX)
        .unwrap_or(&stem)
        .to_string()
}

/// File name without extension
pub fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Path of the text document matching an apparatus document: `<doc>.xml`
/// in `text_dir`, else next to the apparatus document
pub fn text_document_path(app_path: &Path, text_dir: Option<&Path>) -> PathBuf {
    let name = format!("{}.xml", doc_id(app_path));
    match text_dir {
        Some(dir) => dir.join(name),
        None => app_path.with_file_name(name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mqdq_core::TextPartition;
    use tempfile::TempDir;

    #[test]
    fn test_read_document() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("verg.xml");
        fs::write(&path, "<TEI><text><body/></text></TEI>").unwrap();
        let doc = FileReader::read_document(&path).unwrap();
        assert!(doc.tei_body().is_ok());
    }

    #[test]
    fn test_read_document_errors() {
        let missing = FileReader::read_document(Path::new("/nonexistent/verg.xml"));
        assert!(missing.unwrap_err().to_string().contains("Failed to read file"));

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.xml");
        fs::write(&path, "<TEI><text></TEI>").unwrap();
        let broken = FileReader::read_document(&path);
        assert!(broken.unwrap_err().to_string().contains("Failed to parse"));
    }

    #[test]
    fn test_read_dumps_concatenates() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("v_00001.json");
        let b = dir.path().join("v_00002.json");
        fs::write(&a, r#"[{"id":"v-00001","docId":"v","ordinal":1,"citation":"v 1","rows":[]}]"#).unwrap();
        fs::write(&b, r#"[{"id":"v-00002","docId":"v","ordinal":2,"citation":"v 2","rows":[]}]"#).unwrap();
        let partitions: Vec<TextPartition> = FileReader::read_dumps(&[a, b]).unwrap();
        assert_eq!(partitions.len(), 2);
        assert_eq!(partitions[1].id, "v-00002");
    }

    #[test]
    fn test_doc_id_and_text_path() {
        assert_eq!(doc_id(Path::new("in/verg-aen-app.xml")), "verg-aen");
        assert_eq!(doc_id(Path::new("in/verg-aen.xml")), "verg-aen");
        assert_eq!(
            text_document_path(Path::new("in/verg-aen-app.xml"), None),
            PathBuf::from("in/verg-aen.xml")
        );
        assert_eq!(
            text_document_path(Path::new("in/verg-aen-app.xml"), Some(Path::new("txt"))),
            PathBuf::from("txt/verg-aen.xml")
        );
    }
}
