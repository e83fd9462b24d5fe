use serde::{Deserialize, Serialize};
use std::path::Path;

use faqrag_core::error::{Error, Result};
use faqrag_core::types::{Meta, MetaValue};
use faqrag_embed::{TfidfOptions, TfidfVectorizer};
use faqrag_text::Normalizer;
use faqrag_vector::VectorStore;

/// One curated question/answer pair as stored in `faq.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqEntry {
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl FaqEntry {
    /// Question text with tags appended, the string that gets vectorized.
    pub fn match_text(&self) -> String {
        if self.tags.is_empty() {
            self.question.clone()
        } else {
            format!("{} {}", self.question, self.tags.join(" "))
        }
    }
}

pub fn load_faq(path: &Path) -> Result<Vec<FaqEntry>> {
    if !path.is_file() {
        return Err(Error::NotFound(format!("FAQ file {}", path.display())));
    }
    let bytes = std::fs::read(path)?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[derive(Debug, Clone, PartialEq)]
pub struct FaqMatch {
    pub id: String,
    pub score: f32,
    pub answer: String,
}

/// Pre-vectorized FAQ questions. Built once and read-only afterwards.
#[derive(Debug, Clone)]
pub struct FaqIndex {
    vectorizer: TfidfVectorizer,
    store: VectorStore,
}

impl FaqIndex {
    pub fn build(entries: &[FaqEntry], normalizer: &Normalizer) -> Result<Self> {
        if entries.is_empty() {
            return Err(Error::Validation("FAQ corpus is empty".to_string()));
        }
        let docs: Vec<String> = entries.iter().map(|e| normalizer.normalize(&e.match_text())).collect();
        let options = TfidfOptions { lowercase: true, ngram_min: 1, ngram_max: 2 };
        let (vectorizer, rows) = TfidfVectorizer::fit_transform(&docs, options)?;

        let ids: Vec<String> = (0..entries.len()).map(|i| format!("faq_{i}")).collect();
        let answers: Vec<String> = entries.iter().map(|e| e.answer.clone()).collect();
        let metadatas: Vec<Meta> = entries
            .iter()
            .map(|e| Meta::from([("question".to_string(), MetaValue::from(e.question.as_str()))]))
            .collect();
        let mut store = VectorStore::new();
        store.add(&ids, &answers, &rows, Some(metadatas.as_slice()))?;

        tracing::info!("FAQ index ready: {} entries, {} terms", store.len(), vectorizer.dim());
        Ok(Self { vectorizer, store })
    }

    pub fn len(&self) -> usize { self.store.len() }

    pub fn is_empty(&self) -> bool { self.store.is_empty() }

    /// Highest-scoring entry for an already-normalized query. Ties go to the
    /// earlier entry; a query sharing no terms scores 0 against entry 0.
    pub fn best_match(&self, normalized_query: &str) -> Result<Option<FaqMatch>> {
        let query = self.vectorizer.transform(normalized_query);
        let best = self.store.search(&query, 1, None)?.into_iter().next();
        Ok(best.map(|hit| FaqMatch { id: hit.doc_id, score: hit.score, answer: hit.text }))
    }
}
