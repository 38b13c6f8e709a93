//! Progress-callback trait for ingestion events.
//!
//! Inject an [`Arc<dyn IngestProgressCallback>`] via
//! [`crate::convert::ConversionPipelineBuilder::progress_callback`] to follow
//! a conversion as it runs: which strategy was picked, whether OCR had to
//! step in, and how much text each page contributed.
//!
//! # Example
//!
//! ```rust
//! use edgequake_pdf_ingest::IngestProgressCallback;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! struct CharCounter {
//!     chars: AtomicUsize,
//! }
//!
//! impl IngestProgressCallback for CharCounter {
//!     fn on_page_parsed(&self, _page_number: Option<usize>, chars: usize) {
//!         self.chars.fetch_add(chars, Ordering::SeqCst);
//!     }
//! }
//! ```

use crate::convert::ExtractionStrategy;
use crate::error::IngestError;
use std::sync::Arc;

/// Called by the pipeline as it processes a document.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Implementations must be `Send + Sync` because
/// pipelines are shared across tasks.
pub trait IngestProgressCallback: Send + Sync {
    /// Called once, after the strategy is chosen and before any extraction.
    fn on_conversion_start(&self, display_name: &str, strategy: ExtractionStrategy) {
        let _ = (display_name, strategy);
    }

    /// Called when direct extraction found no pages and OCR takes over.
    fn on_ocr_fallback(&self, display_name: &str) {
        let _ = display_name;
    }

    /// Called for every page record during aggregation, including empty ones.
    ///
    /// # Arguments
    /// * `page_number` — 1-indexed page number, if the strategy reported one
    /// * `chars`       — characters of text the page contributed
    fn on_page_parsed(&self, page_number: Option<usize>, chars: usize) {
        let _ = (page_number, chars);
    }

    /// Called once when a structured outcome is produced.
    fn on_conversion_complete(&self, display_name: &str, success: bool) {
        let _ = (display_name, success);
    }

    /// Called once when a collaborator error ends the run. Exactly one of
    /// this and [`Self::on_conversion_complete`] fires per conversion.
    fn on_conversion_failed(&self, display_name: &str, error: &IngestError) {
        let _ = (display_name, error);
    }
}

/// A no-op implementation, useful as a placeholder.
pub struct NoopProgressCallback;

impl IngestProgressCallback for NoopProgressCallback {}

/// Convenience alias for the type stored on the pipeline.
pub type ProgressCallback = Arc<dyn IngestProgressCallback>;
