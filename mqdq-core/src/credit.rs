//! Responsibility credits in TEI headers

use crate::xml::XmlDocument;

/// Key of the `resp` elements added by the migration
pub const RESP_KEY: &str = "MQDQ";

/// A responsibility statement: what was done, and by whom
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credit {
    pub resp: String,
    pub person: String,
}

impl Credit {
    pub fn new(resp: impl Into<String>, person: impl Into<String>) -> Self {
        Self {
            resp: resp.into(),
            person: person.into(),
        }
    }

    /// Append `<respStmt><resp key="MQDQ">…</resp><persName>…</persName></respStmt>`
    /// to `teiHeader/fileDesc/seriesStmt`.
    ///
    /// Returns false, leaving the document untouched, when the header has
    /// no `seriesStmt`.
    pub fn add_to(&self, doc: &mut XmlDocument) -> bool {
        let series = doc
            .root()
            .and_then(|root| doc.first_child_named(root, "teiHeader"))
            .and_then(|header| doc.first_child_named(header, "fileDesc"))
            .and_then(|file_desc| doc.first_child_named(file_desc, "seriesStmt"));
        let Some(series) = series else {
            return false;
        };

        let resp_stmt = doc.create_element("respStmt");
        let resp = doc.create_element("resp");
        doc.set_attr(resp, "key", RESP_KEY);
        doc.append_text(resp, &self.resp);
        let person = doc.create_element("persName");
        doc.append_text(person, &self.person);
        doc.append(resp_stmt, resp);
        doc.append(resp_stmt, person);
        doc.append(series, resp_stmt);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credit_appended_to_series() {
        let mut doc = XmlDocument::parse(
            r#"<TEI><teiHeader><fileDesc><titleStmt/><seriesStmt><title>MQDQ</title></seriesStmt></fileDesc></teiHeader></TEI>"#,
        )
        .unwrap();
        let added = Credit::new("Revisione", "Paolo Mastandrea & co")
            .add_to(&mut doc);
        assert!(added);
        assert!(doc.to_xml_string().contains(
            r#"<seriesStmt><title>MQDQ</title><respStmt><resp key="MQDQ">Revisione</resp><persName>Paolo Mastandrea &amp; co</persName></respStmt></seriesStmt>"#
        ));
    }

    #[test]
    fn test_missing_series_left_untouched() {
        let source = "<TEI><teiHeader><fileDesc/></teiHeader></TEI>";
        let mut doc = XmlDocument::parse(source).unwrap();
        assert!(!Credit::new("a", "b").add_to(&mut doc));
        assert_eq!(doc.to_xml_string(), source);
    }
}
