//! Configuration types for PDF ingestion.
//!
//! Three layers, each with a different lifetime:
//!
//! * [`ConversionOptions`] — per document. Whether to force OCR and which
//!   languages the OCR engine should expect.
//! * [`OcrConfig`] — per OCR engine. Rendering and vision-LLM knobs, built
//!   through [`OcrConfigBuilder`] so callers only set what they care about.
//! * [`CleanupPolicy`] — per pipeline. What happens to the input file when a
//!   collaborator fails.

use crate::error::IngestError;
use edgequake_llm::LLMProvider;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// OCR language codes offered to users, with their display names.
///
/// Codes follow Tesseract's naming so the same option values work whichever
/// OCR engine sits behind [`crate::extract::OcrEngine`].
pub const SUPPORTED_OCR_LANGUAGES: &[(&str, &str)] = &[
    ("jpn", "Japanese"),
    ("chi_sim", "Simplified Chinese"),
    ("chi_tra", "Traditional Chinese"),
    ("kor", "Korean"),
    ("eng", "English"),
];

/// Languages assumed when the caller does not name any.
pub const DEFAULT_OCR_LANGUAGES: &[&str] = &["eng"];

/// Display name for a known OCR language code.
pub fn language_name(code: &str) -> Option<&'static str> {
    SUPPORTED_OCR_LANGUAGES
        .iter()
        .find(|(c, _)| c.eq_ignore_ascii_case(code))
        .map(|(_, name)| *name)
}

/// Per-document conversion options.
///
/// # Example
/// ```rust
/// use edgequake_pdf_ingest::ConversionOptions;
///
/// let options = ConversionOptions::default()
///     .with_force_ocr(true)
///     .with_ocr_languages(["jpn", "eng"]);
/// assert_eq!(options.ocr_languages, vec!["jpn", "eng"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConversionOptions {
    /// Skip text extraction and OCR the whole document.
    pub force_ocr: bool,

    /// Ordered, duplicate-free language codes guiding OCR. Empty means the
    /// engine default ([`DEFAULT_OCR_LANGUAGES`]).
    pub ocr_languages: Vec<String>,
}

impl ConversionOptions {
    pub fn with_force_ocr(mut self, v: bool) -> Self {
        self.force_ocr = v;
        self
    }

    /// Set the OCR languages, dropping blanks and later duplicates.
    pub fn with_ocr_languages<I, S>(mut self, languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut out: Vec<String> = Vec::new();
        for lang in languages {
            let lang = lang.into().trim().to_string();
            if !lang.is_empty() && !out.contains(&lang) {
                out.push(lang);
            }
        }
        self.ocr_languages = out;
        self
    }
}

/// What the pipeline does with the input file when a collaborator fails.
///
/// Both policies delete the input exactly once whenever a structured
/// [`crate::output::Outcome`] is returned. They only differ on error paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CleanupPolicy {
    /// Delete the input on every exit path, including extraction and
    /// persistence errors. (default)
    #[default]
    Always,
    /// Delete the input only when an `Outcome` is returned; leave it in place
    /// when an error propagates so the caller can retry on the same file.
    OnOutcome,
}

/// Upper bound for [`OcrConfig::max_retries`].
pub const MAX_OCR_RETRIES: u32 = 10;

/// Configuration for the vision-LLM OCR engine.
///
/// # Example
/// ```rust
/// use edgequake_pdf_ingest::OcrConfig;
///
/// let config = OcrConfig::builder()
///     .dpi(200)
///     .concurrency(2)
///     .model("gpt-4.1-mini")
///     .build()
///     .unwrap();
/// assert_eq!(config.concurrency, 2);
/// ```
#[derive(Clone)]
pub struct OcrConfig {
    /// Rendering DPI used when rasterising each page. Range: 72–400. Default: 150.
    pub dpi: u32,

    /// Maximum rendered image dimension (width or height) in pixels. Default: 2000.
    ///
    /// Caps memory on oversized pages independently of DPI.
    pub max_rendered_pixels: u32,

    /// Number of concurrent OCR calls. Default: 4.
    ///
    /// Page order in the result does not depend on this value.
    pub concurrency: usize,

    /// LLM model identifier. If None, uses `gpt-4.1-nano`.
    pub model: Option<String>,

    /// LLM provider name (e.g. "openai", "anthropic", "ollama").
    /// If None along with `provider`, the provider is auto-detected.
    pub provider_name: Option<String>,

    /// Pre-constructed LLM provider. Takes precedence over `provider_name`.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// Sampling temperature. Default: 0.1.
    pub temperature: f32,

    /// Maximum tokens the LLM may generate per page. Default: 4096.
    pub max_tokens: usize,

    /// Maximum retry attempts on a failed OCR call. Range: 0–10. Default: 3.
    pub max_retries: u32,

    /// Initial retry delay in milliseconds, doubled per attempt. Default: 500.
    pub retry_backoff_ms: u64,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Custom system prompt. If None, the built-in OCR prompt is used.
    pub system_prompt: Option<String>,

    /// Per-call timeout in seconds. Default: 60.
    pub api_timeout_secs: u64,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            dpi: 150,
            max_rendered_pixels: 2000,
            concurrency: 4,
            model: None,
            provider_name: None,
            provider: None,
            temperature: 0.1,
            max_tokens: 4096,
            max_retries: 3,
            retry_backoff_ms: 500,
            password: None,
            system_prompt: None,
            api_timeout_secs: 60,
        }
    }
}

impl fmt::Debug for OcrConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OcrConfig")
            .field("dpi", &self.dpi)
            .field("max_rendered_pixels", &self.max_rendered_pixels)
            .field("concurrency", &self.concurrency)
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("max_retries", &self.max_retries)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("api_timeout_secs", &self.api_timeout_secs)
            .finish()
    }
}

impl OcrConfig {
    /// Create a new builder for `OcrConfig`.
    pub fn builder() -> OcrConfigBuilder {
        OcrConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`OcrConfig`].
#[derive(Debug)]
pub struct OcrConfigBuilder {
    config: OcrConfig,
}

impl OcrConfigBuilder {
    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi.clamp(72, 400);
        self
    }

    pub fn max_rendered_pixels(mut self, px: u32) -> Self {
        self.config.max_rendered_pixels = px.max(100);
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n.max(1);
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn max_retries(mut self, n: u32) -> Self {
        self.config.max_retries = n.min(MAX_OCR_RETRIES);
        self
    }

    pub fn retry_backoff_ms(mut self, ms: u64) -> Self {
        self.config.retry_backoff_ms = ms;
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = Some(prompt.into());
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<OcrConfig, IngestError> {
        let c = &self.config;
        if c.dpi < 72 || c.dpi > 400 {
            return Err(IngestError::InvalidConfig(format!(
                "DPI must be 72–400, got {}",
                c.dpi
            )));
        }
        if c.concurrency == 0 {
            return Err(IngestError::InvalidConfig("Concurrency must be ≥ 1".into()));
        }
        if c.api_timeout_secs == 0 {
            return Err(IngestError::InvalidConfig(
                "API timeout must be at least 1 second".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_deserialise_from_camel_case() {
        let o: ConversionOptions =
            serde_json::from_str(r#"{"forceOcr": true, "ocrLanguages": ["jpn", "eng"]}"#).unwrap();
        assert!(o.force_ocr);
        assert_eq!(o.ocr_languages, vec!["jpn", "eng"]);
    }

    #[test]
    fn options_default_when_empty() {
        let o: ConversionOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(o, ConversionOptions::default());
        assert!(!o.force_ocr);
    }

    #[test]
    fn ocr_languages_are_an_ordered_set() {
        let o = ConversionOptions::default().with_ocr_languages(["kor", "eng", " ", "kor"]);
        assert_eq!(o.ocr_languages, vec!["kor", "eng"]);
    }

    #[test]
    fn known_language_names() {
        assert_eq!(language_name("chi_tra"), Some("Traditional Chinese"));
        assert_eq!(language_name("ENG"), Some("English"));
        assert_eq!(language_name("deu"), None);
    }

    #[test]
    fn builder_clamps_values() {
        let c = OcrConfig::builder()
            .dpi(1000)
            .concurrency(0)
            .temperature(5.0)
            .build()
            .unwrap();
        assert_eq!(c.dpi, 400);
        assert_eq!(c.concurrency, 1);
        assert_eq!(c.temperature, 2.0);
    }

    #[test]
    fn builder_caps_retries() {
        let c = OcrConfig::builder().max_retries(u32::MAX).build().unwrap();
        assert_eq!(c.max_retries, MAX_OCR_RETRIES);
        let c = OcrConfig::builder().max_retries(2).build().unwrap();
        assert_eq!(c.max_retries, 2);
    }

    #[test]
    fn builder_rejects_zero_timeout() {
        let err = OcrConfig::builder().api_timeout_secs(0).build().unwrap_err();
        assert!(matches!(err, IngestError::InvalidConfig(_)));
    }

    #[test]
    fn debug_redacts_password() {
        let c = OcrConfig::builder().password("hunter2").build().unwrap();
        let dbg = format!("{c:?}");
        assert!(!dbg.contains("hunter2"));
    }
}
