//! Direct text extraction from the PDF text layer via pdfium.
//!
//! Cheap and exact when a text layer exists. Image-only pages produce no
//! record, so a fully scanned document comes back as an empty vector and the
//! pipeline falls back to OCR.

use super::{input, pdfium};
use crate::error::IngestError;
use crate::extract::TextExtractor;
use crate::output::PageRecord;
use async_trait::async_trait;
use std::path::Path;
use tracing::{debug, info};

/// [`TextExtractor`] reading the embedded text layer with pdfium.
#[derive(Debug, Clone, Default)]
pub struct PdfiumTextExtractor {
    password: Option<String>,
}

impl PdfiumTextExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }
}

#[async_trait]
impl TextExtractor for PdfiumTextExtractor {
    async fn extract_text(&self, path: &Path) -> Result<Vec<PageRecord>, IngestError> {
        input::validate_pdf(path)?;
        let path = path.to_path_buf();
        let password = self.password.clone();

        tokio::task::spawn_blocking(move || extract_blocking(&path, password.as_deref()))
            .await
            .map_err(|e| IngestError::Internal(format!("Text extraction task panicked: {e}")))?
    }
}

/// Blocking implementation of text extraction.
fn extract_blocking(path: &Path, password: Option<&str>) -> Result<Vec<PageRecord>, IngestError> {
    let pdfium = pdfium::create_pdfium()?;
    let document = pdfium::open_document(&pdfium, path, password)?;
    let info = pdfium::document_info(&document);

    let pages = document.pages();
    let total_pages = pages.len() as usize;
    info!("PDF loaded: {} pages", total_pages);

    let mut records = Vec::with_capacity(total_pages);
    for (idx, page) in pages.iter().enumerate() {
        let page_num = idx + 1;
        let text = page
            .text()
            .map_err(|e| IngestError::TextExtractionFailed {
                path: path.to_path_buf(),
                page: page_num,
                detail: format!("{e:?}"),
            })?
            .all();

        if text.trim().is_empty() {
            debug!("Page {}: no text layer", page_num);
            continue;
        }

        debug!("Page {}: {} chars of embedded text", page_num, text.len());
        records.push(
            PageRecord::new(text)
                .with_location(page_num, Some(total_pages))
                .with_info(info.clone()),
        );
    }

    Ok(records)
}
