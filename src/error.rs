//! Error types for the edgequake-pdf-ingest library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`IngestError`] — **Fatal**: a collaborator failed and the document
//!   cannot be ingested (missing file, corrupt PDF, OCR provider not
//!   configured, artifact write failed). Returned as `Err(IngestError)` from
//!   [`crate::convert::ConversionPipeline::convert`].
//!
//! * [`PageError`] — **Non-fatal**: a single OCR page failed (render glitch,
//!   transient API error). The page is kept as an empty record and skipped
//!   during aggregation, so one bad page never loses the whole document.
//!
//! A document that simply has no text is *not* an error at all: it is reported
//! as an unsuccessful [`crate::output::Outcome`].

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the edgequake-pdf-ingest library.
#[derive(Debug, Error)]
pub enum IngestError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Nothing exists at the upload path.
    #[error("Upload not found: '{path}'\nThe file may already have been processed or removed.")]
    FileNotFound { path: PathBuf },

    /// The upload exists but this process cannot read it.
    #[error("Cannot read upload '{path}': permission denied\nCheck the owner and mode of the upload directory.")]
    PermissionDenied { path: PathBuf },

    /// The upload does not start with the `%PDF` signature.
    #[error("'{path}' is not a PDF (leading bytes {magic:?})")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// pdfium could not load the document structure.
    #[error("Cannot open PDF '{path}': {detail}\nThe file is damaged or truncated; re-export or repair it (e.g. qpdf) and upload again.")]
    CorruptPdf { path: PathBuf, detail: String },

    /// Encrypted document and no password configured.
    #[error("PDF '{path}' is password protected\nSet a password on the extractor and OCR config (CLI: --password).")]
    PasswordRequired { path: PathBuf },

    /// Encrypted document and the configured password was rejected.
    #[error("Password rejected for PDF '{path}'")]
    WrongPassword { path: PathBuf },

    /// pdfium could not read the text layer of a page.
    #[error("Text extraction failed for page {page} of '{path}': {detail}")]
    TextExtractionFailed {
        path: PathBuf,
        page: usize,
        detail: String,
    },

    /// pdfium-render returned an error while rasterising a page for OCR.
    #[error("Could not render page {page} for OCR: {detail}")]
    RasterisationFailed { page: usize, detail: String },

    // ── OCR errors ────────────────────────────────────────────────────────
    /// The configured OCR provider is not initialised (missing API key etc.).
    #[error("OCR provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// Every page failed OCR after all retries.
    #[error("OCR failed on all {total} pages after {retries} retries each.\nFirst error: {first_error}")]
    OcrFailed {
        total: usize,
        retries: u32,
        first_error: String,
    },

    // ── Storage errors ────────────────────────────────────────────────────
    /// The artifact could not be written to the store.
    #[error("Failed to persist artifact '{key}' to '{path}': {source}")]
    PersistFailed {
        key: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The artifact could not be serialised.
    #[error("Failed to serialise artifact '{key}': {source}")]
    Serialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Removing the transient input file failed.
    #[error("Failed to delete '{path}': {source}")]
    CleanupFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The tokenizer used for token estimates could not be loaded.
    #[error("Failed to load tokenizer '{encoding}': {detail}")]
    Tokenizer { encoding: String, detail: String },

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Install libpdfium system-wide, place it next to the binary, or\n\
set PDFIUM_LIB_PATH=/path/to/dir/containing/libpdfium.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IngestError {
    /// True for failures raised by the artifact store rather than by
    /// extraction. Useful for callers that retry persistence only.
    pub fn is_persistence_failure(&self) -> bool {
        matches!(
            self,
            IngestError::PersistFailed { .. } | IngestError::Serialization { .. }
        )
    }
}

/// A non-fatal error for a single OCR page.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum PageError {
    /// Page rasterisation or image encoding failed.
    #[error("Page {page}: could not render or encode image: {detail}")]
    RenderFailed { page: usize, detail: String },

    /// LLM call failed after retries.
    #[error("Page {page}: OCR call failed after {retries} retries: {detail}")]
    LlmFailed {
        page: usize,
        retries: u8,
        detail: String,
    },

    /// LLM call timed out on every attempt.
    #[error("Page {page}: OCR call timed out after {secs}s")]
    Timeout { page: usize, secs: u64 },
}
