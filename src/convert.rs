//! The ingestion orchestrator.
//!
//! [`ConversionPipeline::convert`] turns one PDF into one persisted
//! [`Artifact`]:
//!
//! ```text
//! select strategy ──▶ extract pages ──▶ aggregate ──▶ build artifact ──▶ persist ──▶ delete input
//!                      │                    │
//!                      │                    └─ empty ──▶ delete input ──▶ Outcome{success: false}
//!                      └─ direct found no pages ──▶ OCR (once)
//! ```
//!
//! Stages run strictly in sequence; the only parallelism is inside the OCR
//! engine. Collaborators are trait objects so each can be swapped or mocked.

use crate::config::{CleanupPolicy, ConversionOptions, OcrConfig};
use crate::error::IngestError;
use crate::extract::{OcrEngine, TextExtractor};
use crate::files::{LocalFiles, SourceFiles};
use crate::naming;
use crate::ocr::VisionOcr;
use crate::output::{
    Artifact, Outcome, PageRecord, NO_AUTHOR, NO_DESCRIPTION, SOURCE_KIND,
};
use crate::pipeline::input::source_url;
use crate::pipeline::text::PdfiumTextExtractor;
use crate::progress::ProgressCallback;
use crate::store::{ArtifactStore, JsonFileStore};
use crate::tokens::{TiktokenEstimator, TokenEstimator};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// How pages are obtained for a document. Decided once per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExtractionStrategy {
    /// OCR the whole document; the text layer is never read.
    ForceOcr,
    /// Read the text layer; OCR only if it yields zero pages.
    DirectThenFallback,
}

impl ExtractionStrategy {
    pub fn select(options: &ConversionOptions) -> Self {
        if options.force_ocr {
            ExtractionStrategy::ForceOcr
        } else {
            ExtractionStrategy::DirectThenFallback
        }
    }
}

impl fmt::Display for ExtractionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractionStrategy::ForceOcr => f.write_str("forced OCR"),
            ExtractionStrategy::DirectThenFallback => f.write_str("text extraction"),
        }
    }
}

/// Concatenate the text of every non-empty page, in order, with no separator.
pub fn aggregate_pages(pages: &[PageRecord]) -> String {
    let mut content = String::with_capacity(pages.iter().map(|p| p.text.len()).sum());
    for page in pages.iter().filter(|p| !p.is_empty()) {
        content.push_str(&page.text);
    }
    content
}

/// Author and description from the first page's document info, falling back
/// to the sentinel constants. Never empty.
///
/// The author is the info dictionary's `Creator` entry; `Author` is not
/// consulted. Blank values count as absent.
pub fn document_labels(pages: &[PageRecord]) -> (String, String) {
    let info = pages.first().and_then(|p| p.info.as_ref());
    let author = info
        .and_then(|i| non_blank(i.creator.as_deref()))
        .unwrap_or_else(|| NO_AUTHOR.to_string());
    let description = info
        .and_then(|i| non_blank(i.title.as_deref()))
        .unwrap_or_else(|| NO_DESCRIPTION.to_string());
    (author, description)
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .map(str::to_string)
}

/// Number of whitespace-delimited words.
pub fn word_count(content: &str) -> usize {
    content.split_whitespace().count()
}

/// Converts one PDF at a time into a persisted artifact.
///
/// Cheap to share: every collaborator sits behind an `Arc`, and a pipeline
/// holds no per-run state, so independent documents can be converted
/// concurrently through the same instance.
///
/// # Example
/// ```rust,no_run
/// use edgequake_pdf_ingest::{ConversionOptions, ConversionPipeline};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let pipeline = ConversionPipeline::local("./storage/documents")?;
/// let options = ConversionOptions::default().with_ocr_languages(["jpn", "eng"]);
/// let outcome = pipeline.convert("/srv/hotdir/scan.pdf", "scan.pdf", &options).await?;
/// assert!(outcome.success, "{:?}", outcome.reason);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ConversionPipeline {
    text: Arc<dyn TextExtractor>,
    ocr: Arc<dyn OcrEngine>,
    store: Arc<dyn ArtifactStore>,
    files: Arc<dyn SourceFiles>,
    tokens: Arc<dyn TokenEstimator>,
    cleanup: CleanupPolicy,
    progress: Option<ProgressCallback>,
}

impl fmt::Debug for ConversionPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionPipeline")
            .field("cleanup", &self.cleanup)
            .field("progress", &self.progress.as_ref().map(|_| "<dyn IngestProgressCallback>"))
            .finish_non_exhaustive()
    }
}

impl ConversionPipeline {
    pub fn builder() -> ConversionPipelineBuilder {
        ConversionPipelineBuilder::default()
    }

    /// Pipeline with every default collaborator, storing artifacts as JSON
    /// under `storage_root`.
    pub fn local(storage_root: impl Into<PathBuf>) -> Result<Self, IngestError> {
        Self::builder()
            .store(Arc::new(JsonFileStore::new(storage_root)))
            .build()
    }

    pub fn cleanup_policy(&self) -> CleanupPolicy {
        self.cleanup
    }

    /// Convert the PDF at `file_path` and persist the resulting artifact.
    ///
    /// # Returns
    /// * `Ok(Outcome { success: true, .. })` with exactly one descriptor when
    ///   the document yielded text.
    /// * `Ok(Outcome { success: false, .. })` when neither strategy found any
    ///   text. Nothing is persisted.
    ///
    /// The input file is deleted exactly once whenever an `Outcome` is
    /// returned.
    ///
    /// # Errors
    /// Extraction and persistence failures propagate. Whether the input is
    /// deleted on those paths is governed by [`CleanupPolicy`].
    pub async fn convert(
        &self,
        file_path: impl AsRef<Path>,
        display_name: &str,
        options: &ConversionOptions,
    ) -> Result<Outcome, IngestError> {
        let path = file_path.as_ref();
        let start = Instant::now();
        info!("-- Working {} --", display_name);

        let result = self.run(path, display_name, options).await;

        match (&result, self.cleanup) {
            (Ok(_), _) | (Err(_), CleanupPolicy::Always) => self.discard_input(path).await,
            (Err(e), CleanupPolicy::OnOutcome) => {
                warn!(
                    "Conversion of {} failed ({}); leaving {} in place",
                    display_name,
                    e,
                    path.display()
                );
            }
        }

        match result {
            Ok(ref outcome) => {
                if let Some(ref cb) = self.progress {
                    cb.on_conversion_complete(display_name, outcome.success);
                }
                if outcome.success {
                    info!(
                        "[SUCCESS]: {} converted & ready for embedding ({}ms)",
                        display_name,
                        start.elapsed().as_millis()
                    );
                }
            }
            Err(ref e) => {
                if let Some(ref cb) = self.progress {
                    cb.on_conversion_failed(display_name, e);
                }
            }
        }

        result
    }

    /// Synchronous wrapper around [`ConversionPipeline::convert`].
    ///
    /// Creates a temporary tokio runtime internally; do not call from inside
    /// an async context.
    pub fn convert_sync(
        &self,
        file_path: impl AsRef<Path>,
        display_name: &str,
        options: &ConversionOptions,
    ) -> Result<Outcome, IngestError> {
        tokio::runtime::Runtime::new()
            .map_err(|e| IngestError::Internal(format!("Failed to create tokio runtime: {e}")))?
            .block_on(self.convert(file_path, display_name, options))
    }

    /// Everything except input cleanup.
    async fn run(
        &self,
        path: &Path,
        display_name: &str,
        options: &ConversionOptions,
    ) -> Result<Outcome, IngestError> {
        // ── Step 1: Choose and run the extraction strategy ───────────────
        let strategy = ExtractionStrategy::select(options);
        if let Some(ref cb) = self.progress {
            cb.on_conversion_start(display_name, strategy);
        }
        let pages = self.extract(strategy, path, display_name, options).await?;

        // ── Step 2: Aggregate ────────────────────────────────────────────
        for page in &pages {
            match page.page_number() {
                Some(n) => debug!("-- Parsing content from pg {} --", n),
                None => debug!("-- Parsing content from pg unknown --"),
            }
            if let Some(ref cb) = self.progress {
                cb.on_page_parsed(page.page_number(), page.text.chars().count());
            }
        }
        let content = aggregate_pages(&pages);

        if content.is_empty() {
            error!("Resulting text content was empty for {}", display_name);
            return Ok(Outcome::no_text(display_name));
        }

        // ── Step 3: Build the artifact ───────────────────────────────────
        let (author, description) = document_labels(&pages);
        drop(pages);

        let artifact = Artifact {
            id: naming::generate_id(),
            source_url: source_url(path),
            title: display_name.to_string(),
            author,
            description,
            source_kind: SOURCE_KIND.to_string(),
            chunk_source: String::new(),
            created_at: self.files.created_at(path).await,
            word_count: word_count(&content),
            token_estimate: self.tokens.estimate_tokens(&content),
            content,
        };

        // ── Step 4: Persist ──────────────────────────────────────────────
        let key = naming::artifact_key(display_name, &artifact.id);
        let descriptor = self.store.persist(&artifact, &key).await?;

        Ok(Outcome::converted(descriptor))
    }

    async fn extract(
        &self,
        strategy: ExtractionStrategy,
        path: &Path,
        display_name: &str,
        options: &ConversionOptions,
    ) -> Result<Vec<PageRecord>, IngestError> {
        match strategy {
            ExtractionStrategy::ForceOcr => {
                info!(
                    "Force OCR enabled for {}. Skipping text extraction.",
                    display_name
                );
                self.ocr.ocr_extract(path, &options.ocr_languages).await
            }
            ExtractionStrategy::DirectThenFallback => {
                let pages = self.text.extract_text(path).await?;
                if !pages.is_empty() {
                    return Ok(pages);
                }
                info!(
                    "No text content found for {}. Will attempt OCR parse.",
                    display_name
                );
                if let Some(ref cb) = self.progress {
                    cb.on_ocr_fallback(display_name);
                }
                self.ocr.ocr_extract(path, &options.ocr_languages).await
            }
        }
    }

    /// Delete the input; a failed delete is logged, never surfaced.
    async fn discard_input(&self, path: &Path) {
        if let Err(e) = self.files.delete_file(path).await {
            warn!("{}", e);
        }
    }
}

/// Builder for [`ConversionPipeline`].
///
/// Every collaborator except the store has a default: pdfium text
/// extraction, [`VisionOcr`] with [`OcrConfig::default`], [`LocalFiles`], and
/// [`TiktokenEstimator`].
#[derive(Default)]
pub struct ConversionPipelineBuilder {
    text: Option<Arc<dyn TextExtractor>>,
    ocr: Option<Arc<dyn OcrEngine>>,
    store: Option<Arc<dyn ArtifactStore>>,
    files: Option<Arc<dyn SourceFiles>>,
    tokens: Option<Arc<dyn TokenEstimator>>,
    cleanup: CleanupPolicy,
    progress: Option<ProgressCallback>,
}

impl ConversionPipelineBuilder {
    pub fn text_extractor(mut self, extractor: Arc<dyn TextExtractor>) -> Self {
        self.text = Some(extractor);
        self
    }

    pub fn ocr_engine(mut self, engine: Arc<dyn OcrEngine>) -> Self {
        self.ocr = Some(engine);
        self
    }

    /// Use the default [`VisionOcr`] engine with a custom configuration.
    pub fn ocr_config(mut self, config: OcrConfig) -> Self {
        self.ocr = Some(Arc::new(VisionOcr::new(config)));
        self
    }

    pub fn store(mut self, store: Arc<dyn ArtifactStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn source_files(mut self, files: Arc<dyn SourceFiles>) -> Self {
        self.files = Some(files);
        self
    }

    pub fn token_estimator(mut self, tokens: Arc<dyn TokenEstimator>) -> Self {
        self.tokens = Some(tokens);
        self
    }

    pub fn cleanup(mut self, policy: CleanupPolicy) -> Self {
        self.cleanup = policy;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.progress = Some(cb);
        self
    }

    /// Build the pipeline. Fails if no store was given or the default
    /// tokenizer cannot be loaded.
    pub fn build(self) -> Result<ConversionPipeline, IngestError> {
        let store = self.store.ok_or_else(|| {
            IngestError::InvalidConfig("an artifact store is required".into())
        })?;
        let tokens = match self.tokens {
            Some(t) => t,
            None => Arc::new(TiktokenEstimator::new()?),
        };

        Ok(ConversionPipeline {
            text: self
                .text
                .unwrap_or_else(|| Arc::new(PdfiumTextExtractor::new())),
            ocr: self.ocr.unwrap_or_else(|| Arc::new(VisionOcr::default())),
            store,
            files: self.files.unwrap_or_else(|| Arc::new(LocalFiles)),
            tokens,
            cleanup: self.cleanup,
            progress: self.progress,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::DocumentInfo;

    #[test]
    fn strategy_follows_force_flag() {
        let forced = ConversionOptions::default().with_force_ocr(true);
        assert_eq!(ExtractionStrategy::select(&forced), ExtractionStrategy::ForceOcr);
        assert_eq!(
            ExtractionStrategy::select(&ConversionOptions::default()),
            ExtractionStrategy::DirectThenFallback
        );
    }

    #[test]
    fn aggregate_skips_empty_pages_without_separators() {
        let pages = vec![
            PageRecord::new("Hello ").with_location(1, Some(3)),
            PageRecord::new("").with_location(2, Some(3)),
            PageRecord::new("world").with_location(3, Some(3)),
        ];
        assert_eq!(aggregate_pages(&pages), "Hello world");
        assert_eq!(aggregate_pages(&[]), "");
    }

    #[test]
    fn aggregate_keeps_duplicates_and_order() {
        let pages = vec![PageRecord::new("b"), PageRecord::new("a"), PageRecord::new("b")];
        assert_eq!(aggregate_pages(&pages), "bab");
    }

    #[test]
    fn labels_default_to_sentinels() {
        let (author, description) = document_labels(&[PageRecord::new("x")]);
        assert_eq!(author, NO_AUTHOR);
        assert_eq!(description, NO_DESCRIPTION);
    }

    #[test]
    fn labels_come_from_first_page_only() {
        let info = DocumentInfo {
            title: Some("Annual Report".into()),
            creator: Some("Writer".into()),
            ..Default::default()
        };
        let pages = vec![
            PageRecord::new("a"),
            PageRecord::new("b").with_info(info.clone()),
        ];
        assert_eq!(document_labels(&pages).0, NO_AUTHOR);

        let pages = vec![PageRecord::new("a").with_info(info)];
        assert_eq!(
            document_labels(&pages),
            ("Writer".to_string(), "Annual Report".to_string())
        );
    }

    #[test]
    fn author_comes_from_creator_not_author() {
        let info = DocumentInfo {
            author: Some("Ada".into()),
            creator: Some("Word".into()),
            ..Default::default()
        };
        let pages = vec![PageRecord::new("a").with_info(info)];
        assert_eq!(document_labels(&pages).0, "Word");

        let info = DocumentInfo {
            author: Some("Ada".into()),
            ..Default::default()
        };
        let pages = vec![PageRecord::new("a").with_info(info)];
        assert_eq!(document_labels(&pages).0, NO_AUTHOR);
    }

    #[test]
    fn blank_labels_fall_back_to_sentinels() {
        let info = DocumentInfo {
            author: Some("".into()),
            creator: Some("   ".into()),
            title: Some("".into()),
            ..Default::default()
        };
        let pages = vec![PageRecord::new("a").with_info(info)];
        assert_eq!(
            document_labels(&pages),
            (NO_AUTHOR.to_string(), NO_DESCRIPTION.to_string())
        );
    }

    #[test]
    fn word_count_splits_on_any_whitespace() {
        assert_eq!(word_count("Hello world"), 2);
        assert_eq!(word_count("  one\ttwo\n\nthree  "), 3);
        assert_eq!(word_count(""), 0);
    }

    #[test]
    fn builder_requires_store() {
        let err = ConversionPipeline::builder().build().unwrap_err();
        assert!(matches!(err, IngestError::InvalidConfig(_)));
    }
}
