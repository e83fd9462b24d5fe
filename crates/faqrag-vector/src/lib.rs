//! faqrag-vector
//!
//! In-memory cosine-similarity vector store with directory persistence, the
//! query-time `Retriever`, and the offline `index_build` batch job.

pub mod index_build;
pub mod matrix;
pub mod retriever;
pub mod store;

pub use index_build::{build_index, BuildOptions, BuildReport};
pub use matrix::Matrix;
pub use retriever::Retriever;
pub use store::VectorStore;

/// Artifact names inside an index directory.
pub const EMBEDDINGS_FILE: &str = "embeddings.bin";
pub const DOCS_FILE: &str = "docs.json";
pub const MODEL_FILE: &str = "vectorizer.json";
