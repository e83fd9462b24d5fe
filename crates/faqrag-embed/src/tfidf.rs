use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use faqrag_core::error::{Error, Result};

use crate::l2_normalize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TfidfOptions {
    pub lowercase: bool,
    pub ngram_min: usize,
    pub ngram_max: usize,
}

impl Default for TfidfOptions {
    fn default() -> Self { Self { lowercase: true, ngram_min: 1, ngram_max: 2 } }
}

impl TfidfOptions {
    fn validate(&self) -> Result<()> {
        if self.ngram_min == 0 || self.ngram_min > self.ngram_max {
            return Err(Error::Validation(format!("invalid ngram range {}..={}", self.ngram_min, self.ngram_max)));
        }
        Ok(())
    }
}

/// Word n-gram TF-IDF with smoothed idf and L2-normalized rows.
///
/// Tokens are runs of alphanumeric/`_` chars at least two chars long.
/// Columns follow the lexicographic order of the vocabulary, so two fits on
/// the same corpus produce identical models.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    options: TfidfOptions,
    vocabulary: BTreeMap<String, usize>,
    idf: Vec<f32>,
}

impl TfidfVectorizer {
    pub fn fit(corpus: &[String], options: TfidfOptions) -> Result<Self> {
        options.validate()?;
        let mut df: BTreeMap<String, usize> = BTreeMap::new();
        for doc in corpus {
            let terms: BTreeSet<String> = analyze(doc, &options).into_iter().collect();
            for term in terms {
                *df.entry(term).or_default() += 1;
            }
        }
        if df.is_empty() {
            return Err(Error::Validation(
                "empty vocabulary; documents contain no terms of two or more characters".to_string(),
            ));
        }

        let n = corpus.len() as f32;
        let vocabulary = df.keys().enumerate().map(|(col, term)| (term.clone(), col)).collect();
        let idf = df.values().map(|&d| ((1.0 + n) / (1.0 + d as f32)).ln() + 1.0).collect();
        Ok(Self { options, vocabulary, idf })
    }

    pub fn fit_transform(corpus: &[String], options: TfidfOptions) -> Result<(Self, Vec<Vec<f32>>)> {
        let vectorizer = Self::fit(corpus, options)?;
        let matrix = corpus.iter().map(|doc| vectorizer.transform(doc)).collect();
        Ok((vectorizer, matrix))
    }

    /// Terms outside the vocabulary are ignored; a text with no known terms
    /// maps to the zero vector.
    pub fn transform(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0f32; self.idf.len()];
        for term in analyze(text, &self.options) {
            if let Some(&col) = self.vocabulary.get(&term) {
                v[col] += 1.0;
            }
        }
        for (x, idf) in v.iter_mut().zip(&self.idf) {
            *x *= idf;
        }
        l2_normalize(&mut v);
        v
    }

    pub fn dim(&self) -> usize { self.idf.len() }

    pub fn options(&self) -> TfidfOptions { self.options }

    pub fn column(&self, term: &str) -> Option<usize> { self.vocabulary.get(term).copied() }

    pub fn idf(&self, term: &str) -> Option<f32> { self.column(term).map(|c| self.idf[c]) }

    pub(crate) fn check_consistent(&self) -> Result<()> {
        if self.vocabulary.len() != self.idf.len() || self.idf.is_empty() {
            return Err(Error::Capability(format!(
                "tfidf model has {} terms but {} idf weights",
                self.vocabulary.len(),
                self.idf.len()
            )));
        }
        if self.vocabulary.values().any(|&col| col >= self.idf.len()) {
            return Err(Error::Capability("tfidf vocabulary column out of range".to_string()));
        }
        self.options.validate().map_err(|e| Error::Capability(e.to_string()))
    }
}

fn analyze(text: &str, options: &TfidfOptions) -> Vec<String> {
    let text = if options.lowercase { text.to_lowercase() } else { text.to_string() };
    let tokens: Vec<&str> = text
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|t| t.chars().count() >= 2)
        .collect();
    let mut terms = Vec::new();
    for n in options.ngram_min..=options.ngram_max {
        terms.extend(tokens.windows(n).map(|w| w.join(" ")));
    }
    terms
}
