//! faqrag-embed
//!
//! Embedding providers: a fitted TF-IDF vectorizer and a stateless hashing
//! embedder, plus `EmbeddingModel`, the closed set of models that can be
//! persisted next to an index and reloaded identically at query time.

pub mod hashing;
pub mod model;
pub mod tfidf;

pub use hashing::HashingEmbedder;
pub use model::EmbeddingModel;
pub use tfidf::{TfidfOptions, TfidfVectorizer};

/// Divide by the Euclidean norm in place. All-zero vectors stay zero.
pub(crate) fn l2_normalize(v: &mut [f32]) {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}
