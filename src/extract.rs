//! Extraction strategies the pipeline chooses between.
//!
//! Both traits return pages in document order and must not drop pages
//! silently: a page with no readable text is either omitted by contract
//! (direct extraction of an image-only page) or returned with empty text
//! (OCR), never reordered.

use crate::error::IngestError;
use crate::output::PageRecord;
use async_trait::async_trait;
use std::path::Path;

/// Reads the embedded text layer, one record per page that has text.
///
/// A document without a text layer (a scan) yields an empty vector; that is
/// the signal for the pipeline to fall back to OCR.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract_text(&self, path: &Path) -> Result<Vec<PageRecord>, IngestError>;
}

/// Derives text from rendered page images.
///
/// `languages` are OCR language codes (see
/// [`crate::config::SUPPORTED_OCR_LANGUAGES`]); an empty slice means the
/// engine's default.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    async fn ocr_extract(
        &self,
        path: &Path,
        languages: &[String],
    ) -> Result<Vec<PageRecord>, IngestError>;
}
