//! Vision-model call for one rasterised page.
//!
//! ## Retry Strategy
//!
//! Exponential backoff (`retry_backoff_ms * 2^attempt`): with 500 ms base and
//! 3 retries the waits are 500 ms → 1 s → 2 s. Each attempt is bounded by
//! `api_timeout_secs`; a timed-out attempt is retried like any other failure.

use super::postprocess;
use crate::config::OcrConfig;
use crate::error::PageError;
use edgequake_llm::{ChatMessage, CompletionOptions, ImageData, LLMProvider};
use std::sync::Arc;
use std::time::Instant;
use tokio::time::{sleep, timeout, Duration};
use tracing::{debug, warn};

/// Result of OCR on a single page.
#[derive(Debug, Clone)]
pub struct OcrPage {
    /// 1-indexed page number.
    pub page_num: usize,
    /// Cleaned transcription; empty on failure or blank page.
    pub text: String,
    pub input_tokens: usize,
    pub output_tokens: usize,
    pub duration_ms: u64,
    pub retries: u8,
    pub error: Option<PageError>,
}

impl OcrPage {
    /// A page that failed before reaching the model.
    pub fn failed(page_num: usize, error: PageError) -> Self {
        Self {
            page_num,
            text: String::new(),
            input_tokens: 0,
            output_tokens: 0,
            duration_ms: 0,
            retries: 0,
            error: Some(error),
        }
    }
}

/// Transcribe one page image.
///
/// The request is a system message carrying the OCR prompt and a user
/// message carrying only the image. Never returns `Err`: failures are
/// recorded in [`OcrPage::error`] so the engine can decide whether the
/// document as a whole failed.
pub async fn ocr_page(
    provider: &Arc<dyn LLMProvider>,
    page_num: usize,
    image_data: ImageData,
    system_prompt: &str,
    config: &OcrConfig,
) -> OcrPage {
    let start = Instant::now();
    let messages = vec![
        ChatMessage::system(system_prompt),
        ChatMessage::user_with_images("", vec![image_data]),
    ];
    let options = build_options(config);
    let call_timeout = Duration::from_secs(config.api_timeout_secs);

    let mut last_err: Option<PageError> = None;

    for attempt in 0..=config.max_retries {
        if attempt > 0 {
            let backoff = backoff_ms(config.retry_backoff_ms, attempt);
            warn!(
                "Page {}: OCR retry {}/{} after {}ms",
                page_num, attempt, config.max_retries, backoff
            );
            sleep(Duration::from_millis(backoff)).await;
        }

        match timeout(call_timeout, provider.chat(&messages, Some(&options))).await {
            Ok(Ok(response)) => {
                let duration = start.elapsed();
                debug!(
                    "Page {}: {} input tokens, {} output tokens, {:?}",
                    page_num, response.prompt_tokens, response.completion_tokens, duration
                );

                return OcrPage {
                    page_num,
                    text: postprocess::clean_ocr_text(&response.content),
                    input_tokens: response.prompt_tokens,
                    output_tokens: response.completion_tokens,
                    duration_ms: duration.as_millis() as u64,
                    retries: attempt as u8,
                    error: None,
                };
            }
            Ok(Err(e)) => {
                warn!("Page {}: attempt {} failed: {}", page_num, attempt + 1, e);
                last_err = Some(PageError::LlmFailed {
                    page: page_num,
                    retries: config.max_retries as u8,
                    detail: e.to_string(),
                });
            }
            Err(_) => {
                warn!(
                    "Page {}: attempt {} timed out after {}s",
                    page_num,
                    attempt + 1,
                    config.api_timeout_secs
                );
                last_err = Some(PageError::Timeout {
                    page: page_num,
                    secs: config.api_timeout_secs,
                });
            }
        }
    }

    OcrPage {
        duration_ms: start.elapsed().as_millis() as u64,
        retries: config.max_retries as u8,
        ..OcrPage::failed(
            page_num,
            last_err.unwrap_or(PageError::LlmFailed {
                page: page_num,
                retries: config.max_retries as u8,
                detail: "Unknown error".into(),
            }),
        )
    }
}

/// Delay before retry `attempt` (1-based): `base * 2^(attempt - 1)`,
/// saturating at `u64::MAX`.
fn backoff_ms(base: u64, attempt: u32) -> u64 {
    let factor = 2u64.checked_pow(attempt.saturating_sub(1)).unwrap_or(u64::MAX);
    base.saturating_mul(factor)
}

/// Build `CompletionOptions` from the OCR config.
fn build_options(config: &OcrConfig) -> CompletionOptions {
    CompletionOptions {
        temperature: Some(config.temperature),
        max_tokens: Some(config.max_tokens),
        ..Default::default()
    }
}
