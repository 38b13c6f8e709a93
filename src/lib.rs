//! # edgequake-pdf-ingest
//!
//! Turn an uploaded PDF into one normalised text artifact ready for
//! embedding.
//!
//! ## Why this crate?
//!
//! Most PDFs carry a text layer, and reading it is fast and exact. Scans do
//! not, and for those only OCR helps. This crate decides per document which
//! path to take, falls back from the text layer to a vision-LLM OCR pass when
//! the layer is missing, and always leaves the upload directory clean.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Strategy  force OCR, or text layer with OCR fallback
//!  ├─ 2. Extract   pdfium text layer │ pdfium render → VLM transcription
//!  ├─ 3. Aggregate concatenate non-empty pages in order
//!  ├─ 4. Artifact  id, provenance, word & token counts
//!  ├─ 5. Persist   JSON document store
//!  └─ 6. Cleanup   delete the transient upload
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_pdf_ingest::{ConversionOptions, ConversionPipeline};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let pipeline = ConversionPipeline::local("./storage/documents")?;
//!     let outcome = pipeline
//!         .convert("/srv/hotdir/report.pdf", "report.pdf", &ConversionOptions::default())
//!         .await?;
//!     match outcome.documents.first() {
//!         Some(doc) => println!("stored at {}", doc.location),
//!         None => eprintln!("{}", outcome.reason.unwrap_or_default()),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf-ingest` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod extract;
pub mod files;
pub mod naming;
pub mod ocr;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod store;
pub mod tokens;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{
    language_name, CleanupPolicy, ConversionOptions, OcrConfig, OcrConfigBuilder,
    DEFAULT_OCR_LANGUAGES, MAX_OCR_RETRIES, SUPPORTED_OCR_LANGUAGES,
};
pub use convert::{ConversionPipeline, ConversionPipelineBuilder, ExtractionStrategy};
pub use error::{IngestError, PageError};
pub use extract::{OcrEngine, TextExtractor};
pub use files::{LocalFiles, SourceFiles};
pub use ocr::VisionOcr;
pub use output::{
    Artifact, ArtifactDescriptor, DocumentInfo, Outcome, PageLocation, PageRecord, NO_AUTHOR,
    NO_DESCRIPTION, SOURCE_KIND,
};
pub use pipeline::text::PdfiumTextExtractor;
pub use progress::{IngestProgressCallback, NoopProgressCallback, ProgressCallback};
pub use store::{ArtifactStore, JsonFileStore};
pub use tokens::{TiktokenEstimator, TokenEstimator, WhitespaceEstimator};
