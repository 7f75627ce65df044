//! Chunking and retrieval settings.

use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};

/// Settings shared by indexing and retrieval.
///
/// The defaults fit a recipe book: a 1500 character window holds one recipe
/// with its ingredient list, and five neighbours are enough for the model to
/// suggest alternatives.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RagConfig {
    /// Upper bound on chunk length, in characters.
    pub chunk_size: usize,
    /// Characters repeated at the start of the next chunk.
    pub chunk_overlap: usize,
    /// Records returned per question.
    pub top_k: usize,
    /// Cosine score a record needs to reach the prompt.
    pub similarity_threshold: f32,
}

impl RagConfig {
    pub const DEFAULT_CHUNK_SIZE: usize = 1500;
    pub const DEFAULT_CHUNK_OVERLAP: usize = 150;
    pub const DEFAULT_TOP_K: usize = 5;

    pub fn builder() -> RagConfigBuilder {
        RagConfigBuilder::default()
    }

    fn validate(&self) -> Result<()> {
        let invalid = |message: String| Err(RagError::ConfigError(message));
        if self.chunk_size == 0 {
            return invalid("chunk_size must be at least one character".into());
        }
        if self.chunk_overlap >= self.chunk_size {
            return invalid(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            ));
        }
        if self.top_k == 0 {
            return invalid("top_k must be at least 1".into());
        }
        if !(-1.0..=1.0).contains(&self.similarity_threshold) {
            return invalid(format!(
                "similarity_threshold ({}) must lie in [-1, 1]",
                self.similarity_threshold
            ));
        }
        Ok(())
    }
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            chunk_size: Self::DEFAULT_CHUNK_SIZE,
            chunk_overlap: Self::DEFAULT_CHUNK_OVERLAP,
            top_k: Self::DEFAULT_TOP_K,
            similarity_threshold: 0.0,
        }
    }
}

/// Builder for [`RagConfig`]; `build` rejects inconsistent settings.
#[derive(Debug, Clone, Default)]
pub struct RagConfigBuilder {
    inner: RagConfig,
}

impl RagConfigBuilder {
    pub fn chunk_size(mut self, chars: usize) -> Self {
        self.inner.chunk_size = chars;
        self
    }

    pub fn chunk_overlap(mut self, chars: usize) -> Self {
        self.inner.chunk_overlap = chars;
        self
    }

    pub fn top_k(mut self, k: usize) -> Self {
        self.inner.top_k = k;
        self
    }

    pub fn similarity_threshold(mut self, score: f32) -> Self {
        self.inner.similarity_threshold = score;
        self
    }

    /// # Errors
    ///
    /// [`RagError::ConfigError`] when the window is empty, the overlap is not
    /// smaller than the window, `top_k` is zero, or the threshold is outside
    /// the cosine range (NaN included).
    pub fn build(self) -> Result<RagConfig> {
        self.inner.validate()?;
        Ok(self.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_recipe_corpus_settings() {
        let config = RagConfig::default();
        assert_eq!(config.chunk_size, 1500);
        assert_eq!(config.chunk_overlap, 150);
        assert_eq!(config.top_k, 5);
        assert_eq!(RagConfig::builder().build().unwrap(), config);
    }

    #[test]
    fn rejects_overlap_not_smaller_than_chunk_size() {
        let err = RagConfig::builder().chunk_size(100).chunk_overlap(100).build().unwrap_err();
        assert!(matches!(err, RagError::ConfigError(_)));
        assert!(RagConfig::builder().chunk_size(0).chunk_overlap(0).build().is_err());
    }

    #[test]
    fn rejects_zero_top_k_and_bad_threshold() {
        assert!(RagConfig::builder().top_k(0).build().is_err());
        assert!(RagConfig::builder().similarity_threshold(f32::NAN).build().is_err());
        assert!(RagConfig::builder().similarity_threshold(1.5).build().is_err());
        assert!(RagConfig::builder().similarity_threshold(-1.0).build().is_ok());
    }
}
