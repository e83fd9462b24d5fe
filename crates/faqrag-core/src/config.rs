//! Layered configuration loader and path helpers.
//!
//! Uses Figment to merge built-in defaults + `config.toml` +
//! `config.<env>.toml` + `APP_*` env vars (`__` separates nested keys, so
//! `APP_FAQ__THRESHOLD=0.3` sets `faq.threshold`). Provides helpers to expand
//! `~` and `${VAR}` and to resolve relative paths against a base directory.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

pub const DEFAULT_FALLBACK_ANSWER: &str = "Maaf, saya belum menemukan jawaban yang sesuai.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub faq: FaqSettings,
    pub rag: RagSettings,
    pub chunking: ChunkingSettings,
    pub normalizer: NormalizerSettings,
    pub embedding: EmbeddingSettings,
    pub format: FormatSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FaqSettings {
    pub path: String,
    pub threshold: f32,
}

impl Default for FaqSettings {
    fn default() -> Self {
        Self { path: "data/faq.json".to_string(), threshold: 0.25 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RagSettings {
    pub enabled: bool,
    pub index_dir: String,
    pub top_k: usize,
    pub score_threshold: f32,
    pub max_answer_chars: usize,
}

impl Default for RagSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            index_dir: "models/vector_store".to_string(),
            top_k: 3,
            score_threshold: 0.20,
            max_answer_chars: 600,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingSettings {
    pub max_chars: usize,
    pub overlap: usize,
}

impl Default for ChunkingSettings {
    fn default() -> Self { Self { max_chars: 300, overlap: 60 } }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizerSettings {
    pub lowercase: bool,
}

impl Default for NormalizerSettings {
    fn default() -> Self { Self { lowercase: true } }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingKind {
    #[default]
    Tfidf,
    Hashing,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    pub kind: EmbeddingKind,
    pub ngram_min: usize,
    pub ngram_max: usize,
    pub hashing_dim: usize,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self { kind: EmbeddingKind::Tfidf, ngram_min: 1, ngram_max: 2, hashing_dim: 1024 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatSettings {
    pub section_markers: Vec<String>,
    pub fallback_answer: String,
}

impl Default for FormatSettings {
    fn default() -> Self {
        Self {
            section_markers: vec!["BAB".to_string()],
            fallback_answer: DEFAULT_FALLBACK_ANSWER.to_string(),
        }
    }
}

impl Settings {
    /// Reject values that would make a later stage misbehave.
    pub fn validate(&self) -> Result<()> {
        let bad = |msg: String| Err(Error::InvalidConfig(msg));
        if !self.faq.threshold.is_finite() {
            return bad(format!("faq.threshold must be finite, got {}", self.faq.threshold));
        }
        if !self.rag.score_threshold.is_finite() {
            return bad(format!("rag.score_threshold must be finite, got {}", self.rag.score_threshold));
        }
        if self.rag.top_k == 0 {
            return bad("rag.top_k must be >= 1".to_string());
        }
        if self.rag.max_answer_chars == 0 {
            return bad("rag.max_answer_chars must be > 0".to_string());
        }
        if self.chunking.max_chars == 0 || self.chunking.overlap >= self.chunking.max_chars {
            return bad(format!(
                "chunking requires 0 <= overlap < max_chars, got overlap={} max_chars={}",
                self.chunking.overlap, self.chunking.max_chars
            ));
        }
        let e = &self.embedding;
        if e.ngram_min == 0 || e.ngram_min > e.ngram_max {
            return bad(format!("embedding ngram range {}..={} is invalid", e.ngram_min, e.ngram_max));
        }
        if e.hashing_dim == 0 {
            return bad("embedding.hashing_dim must be > 0".to_string());
        }
        Ok(())
    }
}

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());
        Ok(Self::load_for_env(&env_name))
    }

    pub fn load_for_env(env_name: &str) -> Self {
        let mut figment = Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file("config.toml"));
        match env_name {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));
        Self { figment }
    }

    pub fn get<T>(&self, key: &str) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| Error::InvalidConfig(format!("Failed to get '{key}': {e}")))
    }

    /// Extract and validate the full typed settings.
    pub fn settings(&self) -> Result<Settings> {
        let settings: Settings = self
            .figment
            .extract()
            .map_err(|e| Error::InvalidConfig(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}
