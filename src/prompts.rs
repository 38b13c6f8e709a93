//! System prompt for vision-LLM OCR.
//!
//! The prompt asks for a plain transcription, not Markdown: the artifact is
//! fed to an embedder, and layout syntax would only add noise tokens.
//! Callers can override it via [`crate::config::OcrConfig::system_prompt`];
//! the language hint is appended in either case.

use crate::config::{language_name, DEFAULT_OCR_LANGUAGES};
use crate::pipeline::postprocess::NO_TEXT_MARKER;

/// Default system prompt for transcribing one page image.
pub const DEFAULT_OCR_PROMPT: &str = r#"You are an OCR engine. Transcribe ALL text visible in the page image exactly as written.

Rules:
1. Preserve the reading order a human would follow, including multi-column layouts.
2. Keep the original language and script. Do NOT translate, summarise, or correct wording.
3. Put each paragraph, list item, heading, and table row on its own line; separate table cells with " | ".
4. Do not describe images, logos, or decorations. Transcribe only text that appears in them.
5. Output plain text only: no Markdown, no code fences, no commentary."#;

/// Build the full system prompt for the given OCR languages.
///
/// Known codes are rendered with their display name (`jpn` → `Japanese (jpn)`);
/// unknown codes are passed through as-is so new languages work without a
/// release. An empty list falls back to [`DEFAULT_OCR_LANGUAGES`].
pub fn ocr_system_prompt(base: Option<&str>, languages: &[String]) -> String {
    let codes: Vec<&str> = if languages.is_empty() {
        DEFAULT_OCR_LANGUAGES.to_vec()
    } else {
        languages.iter().map(String::as_str).collect()
    };

    let described: Vec<String> = codes
        .iter()
        .map(|code| match language_name(code) {
            Some(name) => format!("{name} ({code})"),
            None => (*code).to_string(),
        })
        .collect();

    format!(
        "{}\n\nThe page is expected to contain text in: {}.\n\
If the page contains no readable text, output exactly {}",
        base.unwrap_or(DEFAULT_OCR_PROMPT),
        described.join(", "),
        NO_TEXT_MARKER
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_names_requested_languages_in_order() {
        let p = ocr_system_prompt(None, &["jpn".to_string(), "eng".to_string()]);
        let jpn = p.find("Japanese (jpn)").expect("jpn listed");
        let eng = p.find("English (eng)").expect("eng listed");
        assert!(jpn < eng);
        assert!(p.starts_with(DEFAULT_OCR_PROMPT));
    }

    #[test]
    fn prompt_defaults_to_english() {
        let p = ocr_system_prompt(None, &[]);
        assert!(p.contains("English (eng)"));
    }

    #[test]
    fn unknown_codes_pass_through() {
        let p = ocr_system_prompt(Some("Custom."), &["deu".to_string()]);
        assert!(p.starts_with("Custom."));
        assert!(p.contains("text in: deu."));
        assert!(p.ends_with(NO_TEXT_MARKER));
    }
}
