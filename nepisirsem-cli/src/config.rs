//! Resolution of process configuration: credential, paths, models and
//! retrieval parameters.

use std::fmt;
use std::path::PathBuf;

use nepisirsem_rag::{RagConfig, RagError};
use thiserror::Error;

use crate::cli::Settings;

/// Environment variables searched for the API key, in order.
pub const API_KEY_VARS: [&str; 2] = ["GEMINI_API_KEY", "GOOGLE_API_KEY"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(
        "API anahtarı bulunamadı: GEMINI_API_KEY (veya GOOGLE_API_KEY) ortam değişkenini ya da .env dosyasını kontrol edin"
    )]
    MissingApiKey,

    #[error("geçersiz ayar: {0}")]
    Invalid(#[from] RagError),
}

/// A secret that never shows up in `Debug` output or logs.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// Find the API key through `lookup` (usually the process environment).
/// Blank values count as missing.
pub fn resolve_api_key<F>(lookup: F) -> Result<ApiKey, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    API_KEY_VARS
        .iter()
        .filter_map(|var| lookup(var))
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
        .map(ApiKey)
        .ok_or(ConfigError::MissingApiKey)
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_key: ApiKey,
    pub source: PathBuf,
    pub store_dir: PathBuf,
    pub embedding_model: String,
    pub generation_model: String,
    pub rag: RagConfig,
}

impl AppConfig {
    /// Validate `settings` and attach the credential found through `lookup`.
    ///
    /// Nothing is opened or created on disk here, so a missing key stops the
    /// program before any store is touched.
    pub fn resolve<F>(settings: &Settings, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = resolve_api_key(lookup)?;
        let rag = RagConfig::builder()
            .chunk_size(settings.chunk_size)
            .chunk_overlap(settings.chunk_overlap)
            .top_k(settings.top_k)
            .build()?;

        Ok(Self {
            api_key,
            source: settings.source.clone(),
            store_dir: settings.store_dir.clone(),
            embedding_model: settings.embedding_model.clone(),
            generation_model: settings.generation_model.clone(),
            rag,
        })
    }

    /// Read the key from the process environment.
    pub fn from_env(settings: &Settings) -> Result<Self, ConfigError> {
        Self::resolve(settings, |var| std::env::var(var).ok())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn settings() -> Settings {
        Settings {
            source: PathBuf::from("yemektarifleri.pdf"),
            store_dir: PathBuf::from("./vector_db"),
            embedding_model: "text-embedding-004".to_string(),
            generation_model: "gemini-2.5-flash".to_string(),
            top_k: 5,
            chunk_size: 1500,
            chunk_overlap: 150,
        }
    }

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn gemini_key_wins_over_google_key() {
        let key = resolve_api_key(env(&[("GEMINI_API_KEY", "g1"), ("GOOGLE_API_KEY", "g2")])).unwrap();
        assert_eq!(key.expose(), "g1");
    }

    #[test]
    fn blank_key_falls_back_then_fails() {
        let key = resolve_api_key(env(&[("GEMINI_API_KEY", "  "), ("GOOGLE_API_KEY", "g2")])).unwrap();
        assert_eq!(key.expose(), "g2");

        let err = resolve_api_key(env(&[("GEMINI_API_KEY", "")])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingApiKey));
    }

    #[test]
    fn key_is_not_printed() {
        let config = AppConfig::resolve(&settings(), env(&[("GEMINI_API_KEY", "secret")])).unwrap();
        assert!(!format!("{config:?}").contains("secret"));
    }

    #[test]
    fn invalid_chunking_is_a_config_error() {
        let mut settings = settings();
        settings.chunk_overlap = settings.chunk_size;
        let err = AppConfig::resolve(&settings, env(&[("GEMINI_API_KEY", "k")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }
}
