use serde::{Deserialize, Serialize};
use std::path::Path;

use faqrag_core::config::{EmbeddingKind, EmbeddingSettings};
use faqrag_core::error::{Error, Result};
use faqrag_core::fs::write_atomic;
use faqrag_core::traits::Embedder;

use crate::hashing::HashingEmbedder;
use crate::tfidf::{TfidfOptions, TfidfVectorizer};

/// A persisted embedding model. The `kind` tag selects the variant on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum EmbeddingModel {
    Tfidf(TfidfVectorizer),
    Hashing(HashingEmbedder),
}

impl EmbeddingModel {
    /// Fit the configured model on already-normalized texts.
    pub fn fit(settings: &EmbeddingSettings, corpus: &[String]) -> Result<Self> {
        match settings.kind {
            EmbeddingKind::Tfidf => {
                // texts arrive normalized; casing is the normalizer's call
                let options = TfidfOptions { lowercase: false, ngram_min: settings.ngram_min, ngram_max: settings.ngram_max };
                let vectorizer = TfidfVectorizer::fit(corpus, options)?;
                tracing::info!("fitted tfidf vocabulary of {} terms over {} texts", vectorizer.dim(), corpus.len());
                Ok(Self::Tfidf(vectorizer))
            }
            EmbeddingKind::Hashing => Ok(Self::Hashing(HashingEmbedder::new(settings.hashing_dim)?)),
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        write_atomic(path, &serde_json::to_vec(self)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::NotFound(format!("embedding model {}", path.display())));
        }
        let bytes = std::fs::read(path)?;
        let model: Self = serde_json::from_slice(&bytes)
            .map_err(|e| Error::Capability(format!("unreadable embedding model {}: {e}", path.display())))?;
        match &model {
            Self::Tfidf(v) => v.check_consistent()?,
            Self::Hashing(h) if h.dim() == 0 => {
                return Err(Error::Capability("hashing model has zero dimension".to_string()));
            }
            Self::Hashing(_) => {}
        }
        Ok(model)
    }
}

impl Embedder for EmbeddingModel {
    fn embedder_id(&self) -> String {
        match self {
            Self::Tfidf(v) => {
                let o = v.options();
                format!("tfidf:v{}:n{}-{}", v.dim(), o.ngram_min, o.ngram_max)
            }
            Self::Hashing(h) => format!("hashing:d{}", h.dim()),
        }
    }

    fn dim(&self) -> usize {
        match self {
            Self::Tfidf(v) => v.dim(),
            Self::Hashing(h) => h.dim(),
        }
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(match self {
            Self::Tfidf(v) => v.transform(text),
            Self::Hashing(h) => h.embed_text(text),
        })
    }
}
