use std::path::Path;

use faqrag_core::error::{Error, Result};
use faqrag_core::traits::Embedder;
use faqrag_core::types::RetrievalHit;
use faqrag_embed::EmbeddingModel;
use faqrag_text::Normalizer;

use crate::store::VectorStore;
use crate::MODEL_FILE;

/// Query-time handle over a built index: normalize, embed, search.
pub struct Retriever {
    store: VectorStore,
    embedder: Box<dyn Embedder>,
    normalizer: Normalizer,
}

impl Retriever {
    /// The embedder must produce vectors as wide as the stored rows.
    pub fn new(store: VectorStore, embedder: Box<dyn Embedder>, normalizer: Normalizer) -> Result<Self> {
        if let Some(dim) = store.dim() {
            if dim != embedder.dim() {
                return Err(Error::Capability(format!(
                    "embedder {} produces {} dims but the index holds {dim}",
                    embedder.embedder_id(),
                    embedder.dim()
                )));
            }
        }
        Ok(Self { store, embedder, normalizer })
    }

    /// Load the store and its persisted embedding model from `index_dir`.
    pub fn open(index_dir: &Path, normalizer: Normalizer) -> Result<Self> {
        let store = VectorStore::load(index_dir)?;
        let model = EmbeddingModel::load(&index_dir.join(MODEL_FILE))?;
        tracing::info!(
            "opened index {} ({} chunks, embedder {})",
            index_dir.display(),
            store.len(),
            model.embedder_id()
        );
        Self::new(store, Box::new(model), normalizer)
    }

    pub fn retrieve(&self, query: &str, top_k: usize, score_threshold: Option<f32>) -> Result<Vec<RetrievalHit>> {
        let normalized = self.normalizer.normalize(query);
        let embedding = self.embedder.embed(&normalized)?;
        self.store.search(&embedding, top_k, score_threshold)
    }

    pub fn store(&self) -> &VectorStore { &self.store }

    pub fn embedder_id(&self) -> String { self.embedder.embedder_id() }
}
