use crate::error::Result;

/// Maps normalized text to a fixed-width vector.
///
/// Implementations must be pure: the same input always yields the same
/// vector, and `dim()` never changes between index build and query time.
pub trait Embedder: Send + Sync {
    /// Stable identifier for the model (e.g. `tfidf:v5321:n1-2`).
    fn embedder_id(&self) -> String;
    /// Embedding dimensionality (D).
    fn dim(&self) -> usize;
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }
}
