//! Artifact identity: fresh ids and filesystem-safe storage keys.

use once_cell::sync::Lazy;
use regex::Regex;
use uuid::Uuid;

/// Slug used when a display name contains nothing usable.
const FALLBACK_SLUG: &str = "document";

/// Generate a fresh, globally unique artifact id.
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

static RE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static RE_DASHES: Lazy<Regex> = Lazy::new(|| Regex::new(r"-{2,}").unwrap());

/// Turn a display name into a string safe to use as a file name.
///
/// Whitespace runs become `-`; letters and digits (any script) and `._~-`
/// are kept; everything else, including path separators, is dropped.
/// Leading and trailing `-`/`.` are trimmed so the result can never be a
/// hidden file or a relative path component.
pub fn slugify(display_name: &str) -> String {
    let replaced = display_name.replace('&', " and ");
    let dashed = RE_WHITESPACE.replace_all(replaced.trim(), "-");
    let kept: String = dashed
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, '.' | '_' | '~' | '-'))
        .collect();
    let collapsed = RE_DASHES.replace_all(&kept, "-");
    let slug = collapsed.trim_matches(|c| c == '-' || c == '.');
    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug.to_string()
    }
}

/// Storage key for an artifact: the slugged display name plus the id, so two
/// uploads with the same name never collide.
pub fn artifact_key(display_name: &str, id: &str) -> String {
    format!("{}-{}", slugify(display_name), id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        assert_ne!(generate_id(), generate_id());
        assert_eq!(generate_id().len(), 36);
    }

    #[test]
    fn slugify_replaces_whitespace() {
        assert_eq!(slugify("Quarterly  Report 2024.pdf"), "Quarterly-Report-2024.pdf");
    }

    #[test]
    fn slugify_strips_path_separators() {
        assert_eq!(slugify("../../etc/passwd"), "etcpasswd");
        assert_eq!(slugify(r"C:\docs\a b.pdf"), "Cdocsa-b.pdf");
    }

    #[test]
    fn slugify_keeps_non_latin_letters() {
        assert_eq!(slugify("請求書 2024.pdf"), "請求書-2024.pdf");
    }

    #[test]
    fn slugify_ampersand() {
        assert_eq!(slugify("Q&A.pdf"), "Q-and-A.pdf");
    }

    #[test]
    fn slugify_falls_back_when_empty() {
        assert_eq!(slugify("???"), "document");
        assert_eq!(slugify("   "), "document");
    }

    #[test]
    fn artifact_key_ends_with_id() {
        assert_eq!(artifact_key("My File.pdf", "1234"), "My-File.pdf-1234");
    }
}
