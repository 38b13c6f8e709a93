//! Vision-LLM OCR engine.
//!
//! [`VisionOcr`] is the default [`OcrEngine`]. It rasterises every page,
//! sends each image to a vision model with a language-aware transcription
//! prompt, and returns one [`PageRecord`] per page in page order.
//!
//! Pages are transcribed concurrently (bounded by `OcrConfig::concurrency`)
//! but results are yielded with `buffered`, not `buffer_unordered`, so the
//! record order always matches the document.

use crate::config::OcrConfig;
use crate::error::{IngestError, PageError};
use crate::extract::OcrEngine;
use crate::output::PageRecord;
use crate::pipeline::llm::{self, OcrPage};
use crate::pipeline::{input, render};
use crate::prompts::ocr_system_prompt;
use async_trait::async_trait;
use edgequake_llm::{LLMProvider, ProviderFactory};
use futures::stream::{self, StreamExt};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Model used when the caller names a provider but no model.
pub const DEFAULT_OCR_MODEL: &str = "gpt-4.1-nano";

/// [`OcrEngine`] backed by a vision LLM.
#[derive(Debug, Clone, Default)]
pub struct VisionOcr {
    config: OcrConfig,
}

impl VisionOcr {
    pub fn new(config: OcrConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &OcrConfig {
        &self.config
    }
}

#[async_trait]
impl OcrEngine for VisionOcr {
    async fn ocr_extract(
        &self,
        path: &Path,
        languages: &[String],
    ) -> Result<Vec<PageRecord>, IngestError> {
        let start = Instant::now();
        input::validate_pdf(path)?;
        let provider = resolve_provider(&self.config)?;

        let rendered = render::render_all_pages(path, &self.config).await?;
        let total_pages = rendered.len();
        if total_pages == 0 {
            info!("OCR: {} has no pages", path.display());
            return Ok(Vec::new());
        }

        let prompt = ocr_system_prompt(self.config.system_prompt.as_deref(), languages);
        info!(
            "OCR: {} pages, languages {:?}, concurrency {}",
            total_pages, languages, self.config.concurrency
        );

        let pages: Vec<OcrPage> = stream::iter(rendered.into_iter().map(|(idx, img)| {
            let provider = Arc::clone(&provider);
            let prompt = prompt.as_str();
            let config = &self.config;
            async move {
                let page_num = idx + 1;
                match render::encode_page(&img) {
                    Ok(data) => llm::ocr_page(&provider, page_num, data, prompt, config).await,
                    Err(e) => OcrPage::failed(
                        page_num,
                        PageError::RenderFailed {
                            page: page_num,
                            detail: format!("Image encoding failed: {e}"),
                        },
                    ),
                }
            }
        }))
        .buffered(self.config.concurrency)
        .collect()
        .await;

        let failed: Vec<&PageError> = pages.iter().filter_map(|p| p.error.as_ref()).collect();
        if failed.len() == total_pages {
            return Err(IngestError::OcrFailed {
                total: total_pages,
                retries: self.config.max_retries,
                first_error: failed[0].to_string(),
            });
        }
        for e in &failed {
            warn!("OCR: {}", e);
        }

        info!(
            "OCR complete: {}/{} pages, {} in / {} out tokens, {}ms",
            total_pages - failed.len(),
            total_pages,
            pages.iter().map(|p| p.input_tokens).sum::<usize>(),
            pages.iter().map(|p| p.output_tokens).sum::<usize>(),
            start.elapsed().as_millis()
        );

        Ok(pages
            .into_iter()
            .map(|p| PageRecord::new(p.text).with_location(p.page_num, Some(total_pages)))
            .collect())
    }
}

fn create_vision_provider(
    provider_name: &str,
    model: &str,
) -> Result<Arc<dyn LLMProvider>, IngestError> {
    ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
        IngestError::ProviderNotConfigured {
            provider: provider_name.to_string(),
            hint: format!("{e}"),
        }
    })
}

/// Resolve the vision provider, from most-specific to least-specific:
///
/// 1. Pre-built provider (`config.provider`).
/// 2. Named provider + model (`config.provider_name`).
/// 3. `EDGEQUAKE_LLM_PROVIDER` + `EDGEQUAKE_MODEL`, when both are set.
/// 4. OpenAI when `OPENAI_API_KEY` is set, else [`ProviderFactory::from_env`].
pub fn resolve_provider(config: &OcrConfig) -> Result<Arc<dyn LLMProvider>, IngestError> {
    if let Some(ref provider) = config.provider {
        return Ok(Arc::clone(provider));
    }

    let model = config.model.as_deref().unwrap_or(DEFAULT_OCR_MODEL);

    if let Some(ref name) = config.provider_name {
        return create_vision_provider(name, model);
    }

    if let (Ok(prov), Ok(env_model)) = (
        std::env::var("EDGEQUAKE_LLM_PROVIDER"),
        std::env::var("EDGEQUAKE_MODEL"),
    ) {
        if !prov.is_empty() && !env_model.is_empty() {
            return create_vision_provider(&prov, &env_model);
        }
    }

    if std::env::var("OPENAI_API_KEY").is_ok_and(|k| !k.is_empty()) {
        return create_vision_provider("openai", model);
    }

    let (llm_provider, _embedding) =
        ProviderFactory::from_env().map_err(|e| IngestError::ProviderNotConfigured {
            provider: "auto".to_string(),
            hint: format!(
                "No OCR provider could be auto-detected from environment.\n\
                Set OPENAI_API_KEY, ANTHROPIC_API_KEY, or pass --provider.\n\
                Error: {e}"
            ),
        })?;

    Ok(llm_provider)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_file_fails_before_provider_lookup() {
        let ocr = VisionOcr::default();
        let err = ocr
            .ocr_extract(Path::new("/no/such/scan.pdf"), &["jpn".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, IngestError::FileNotFound { .. }), "got: {err}");
    }

    #[test]
    fn keeps_config() {
        let config = OcrConfig::builder().concurrency(7).build().unwrap();
        assert_eq!(VisionOcr::new(config).config().concurrency, 7);
    }
}
