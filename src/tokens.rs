//! Token-count estimates stored alongside each artifact.
//!
//! The estimate is advisory: downstream embedders use it to plan chunking,
//! never to enforce limits. [`TiktokenEstimator`] matches the `cl100k_base`
//! encoding the embedding workers count with; [`WhitespaceEstimator`] is a
//! dependency-free stand-in for tests and offline use.

use crate::error::IngestError;
use std::sync::Arc;
use tiktoken_rs::{cl100k_base, CoreBPE};

/// Estimates how many tokens a text will cost downstream.
pub trait TokenEstimator: Send + Sync {
    fn estimate_tokens(&self, text: &str) -> usize;
}

/// `cl100k_base` BPE token counter.
#[derive(Clone)]
pub struct TiktokenEstimator {
    encoding: Arc<CoreBPE>,
}

impl TiktokenEstimator {
    pub fn new() -> Result<Self, IngestError> {
        let encoding = cl100k_base().map_err(|e| IngestError::Tokenizer {
            encoding: "cl100k_base".into(),
            detail: e.to_string(),
        })?;
        Ok(Self {
            encoding: Arc::new(encoding),
        })
    }
}

impl TokenEstimator for TiktokenEstimator {
    fn estimate_tokens(&self, text: &str) -> usize {
        self.encoding.encode_ordinary(text).len()
    }
}

/// Counts whitespace-delimited words; never returns 0 for non-empty text.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhitespaceEstimator;

impl TokenEstimator for WhitespaceEstimator {
    fn estimate_tokens(&self, text: &str) -> usize {
        let tokens = text.split_whitespace().count();
        if tokens == 0 && !text.is_empty() {
            1
        } else {
            tokens
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_estimator_counts_words() {
        assert_eq!(WhitespaceEstimator.estimate_tokens("Hello brave  new\nworld"), 4);
        assert_eq!(WhitespaceEstimator.estimate_tokens("   "), 1);
        assert_eq!(WhitespaceEstimator.estimate_tokens(""), 0);
    }

    #[test]
    fn tiktoken_counts_tokens() {
        let est = TiktokenEstimator::new().expect("cl100k_base is bundled");
        assert_eq!(est.estimate_tokens(""), 0);
        let n = est.estimate_tokens("Hello world");
        assert_eq!(n, 2);
    }
}
