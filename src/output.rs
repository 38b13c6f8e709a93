//! Data carried through and produced by the ingestion pipeline.
//!
//! [`PageRecord`] is the only shape extraction strategies produce. Direct
//! text extraction fills in [`DocumentInfo`]; OCR does not. Aggregation code
//! must therefore never assume metadata is present.
//!
//! [`Artifact`] is the persisted record. Its serialised field names
//! (`docAuthor`, `pageContent`, …) are the ones the document store and the
//! embedding workers already read, so they are fixed with `#[serde(rename)]`
//! rather than following Rust naming.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Author recorded when the document carries no creator.
pub const NO_AUTHOR: &str = "no author found";

/// Description recorded when the document carries no title.
pub const NO_DESCRIPTION: &str = "No description found.";

/// Provenance tag stamped on every artifact this crate produces.
pub const SOURCE_KIND: &str = "pdf file uploaded by the user.";

/// Position of a page inside its document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLocation {
    /// 1-indexed page number.
    pub page_number: usize,
    /// Total pages in the document, when known.
    pub total_pages: Option<usize>,
}

/// Document-level metadata read from the PDF info dictionary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentInfo {
    pub title: Option<String>,
    pub author: Option<String>,
    pub creator: Option<String>,
    pub subject: Option<String>,
    pub producer: Option<String>,
}

/// One page of extracted text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageRecord {
    /// Page text; empty when the page carried nothing readable.
    pub text: String,
    pub location: Option<PageLocation>,
    /// Only populated by direct text extraction.
    pub info: Option<DocumentInfo>,
}

impl PageRecord {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            location: None,
            info: None,
        }
    }

    pub fn with_location(mut self, page_number: usize, total_pages: Option<usize>) -> Self {
        self.location = Some(PageLocation {
            page_number,
            total_pages,
        });
        self
    }

    pub fn with_info(mut self, info: DocumentInfo) -> Self {
        self.info = Some(info);
        self
    }

    pub fn page_number(&self) -> Option<usize> {
        self.location.map(|l| l.page_number)
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// The normalised record persisted for one converted document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    pub id: String,
    #[serde(rename = "url")]
    pub source_url: String,
    pub title: String,
    #[serde(rename = "docAuthor")]
    pub author: String,
    pub description: String,
    #[serde(rename = "docSource")]
    pub source_kind: String,
    #[serde(rename = "chunkSource")]
    pub chunk_source: String,
    /// Creation time of the source file, not of the conversion.
    #[serde(rename = "published")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "wordCount")]
    pub word_count: usize,
    #[serde(rename = "pageContent")]
    pub content: String,
    #[serde(rename = "token_count_estimate")]
    pub token_estimate: usize,
}

/// A persisted artifact together with where the store put it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactDescriptor {
    /// Store-relative location, e.g. `custom-documents/report-<id>.json`.
    pub location: String,
    #[serde(flatten)]
    pub artifact: Artifact,
}

/// Result of one [`crate::convert::ConversionPipeline::convert`] call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    pub success: bool,
    /// Set if and only if `success` is false.
    pub reason: Option<String>,
    /// Zero or one persisted artifacts.
    pub documents: Vec<ArtifactDescriptor>,
}

impl Outcome {
    pub fn converted(document: ArtifactDescriptor) -> Self {
        Self {
            success: true,
            reason: None,
            documents: vec![document],
        }
    }

    /// The failure reported when a document yields no text at all.
    pub fn no_text(display_name: &str) -> Self {
        Self {
            success: false,
            reason: Some(format!("No text content found in {display_name}.")),
            documents: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artifact() -> Artifact {
        Artifact {
            id: "abc".into(),
            source_url: "file:///tmp/a.pdf".into(),
            title: "a.pdf".into(),
            author: NO_AUTHOR.into(),
            description: NO_DESCRIPTION.into(),
            source_kind: SOURCE_KIND.into(),
            chunk_source: String::new(),
            created_at: None,
            word_count: 2,
            content: "Hello world".into(),
            token_estimate: 2,
        }
    }

    #[test]
    fn artifact_uses_store_field_names() {
        let json = serde_json::to_value(artifact()).unwrap();
        assert_eq!(json["url"], "file:///tmp/a.pdf");
        assert_eq!(json["docAuthor"], NO_AUTHOR);
        assert_eq!(json["docSource"], SOURCE_KIND);
        assert_eq!(json["pageContent"], "Hello world");
        assert_eq!(json["wordCount"], 2);
        assert_eq!(json["token_count_estimate"], 2);
        assert!(json["published"].is_null());
        assert_eq!(json["chunkSource"], "");
    }

    #[test]
    fn descriptor_flattens_artifact() {
        let desc = ArtifactDescriptor {
            location: "custom-documents/a-abc.json".into(),
            artifact: artifact(),
        };
        let json = serde_json::to_value(&desc).unwrap();
        assert_eq!(json["location"], "custom-documents/a-abc.json");
        assert_eq!(json["id"], "abc");
    }

    #[test]
    fn no_text_outcome_names_the_document() {
        let o = Outcome::no_text("scan.pdf");
        assert!(!o.success);
        assert_eq!(o.reason.as_deref(), Some("No text content found in scan.pdf."));
        assert!(o.documents.is_empty());
    }

    #[test]
    fn page_record_builders() {
        let r = PageRecord::new("x").with_location(2, Some(5));
        assert_eq!(r.page_number(), Some(2));
        assert!(r.info.is_none());
        assert!(PageRecord::new("").is_empty());
    }
}
