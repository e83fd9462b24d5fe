//! Append-only vector store with exact cosine search.
//!
//! Rows live in parallel vectors (`ids`, `texts`, `metadatas`) next to the
//! raw embedding matrix and its row-normalized copy. The normalized copy is
//! rebuilt from scratch after every `add` and on `load`; it is never
//! persisted.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use faqrag_core::error::{Error, Result};
use faqrag_core::fs::write_atomic;
use faqrag_core::types::{Meta, RetrievalHit};

use crate::matrix::{dot, normalize_row, Matrix};
use crate::{DOCS_FILE, EMBEDDINGS_FILE};

#[derive(Debug, Default, Serialize, Deserialize)]
struct DocsRecord {
    #[serde(default)]
    ids: Vec<String>,
    #[serde(default)]
    texts: Vec<String>,
    #[serde(default)]
    metadatas: Vec<Meta>,
}

#[derive(Debug, Clone, Default)]
pub struct VectorStore {
    ids: Vec<String>,
    texts: Vec<String>,
    metadatas: Vec<Meta>,
    embeddings: Matrix,
    normalized: Matrix,
}

impl VectorStore {
    pub fn new() -> Self { Self::default() }

    pub fn len(&self) -> usize { self.ids.len() }

    pub fn is_empty(&self) -> bool { self.ids.is_empty() }

    /// Embedding width, fixed by the first successful `add`.
    pub fn dim(&self) -> Option<usize> {
        (self.embeddings.rows() > 0).then(|| self.embeddings.cols())
    }

    pub fn ids(&self) -> &[String] { &self.ids }

    pub fn texts(&self) -> &[String] { &self.texts }

    pub fn metadatas(&self) -> &[Meta] { &self.metadatas }

    /// Raw embeddings as given to `add`.
    pub fn embeddings(&self) -> &Matrix { &self.embeddings }

    /// Unit-length copy of `embeddings()` used for scoring.
    pub fn normalized(&self) -> &Matrix { &self.normalized }

    /// Append a batch. Everything is validated before the store changes, so
    /// a rejected batch leaves earlier rows untouched.
    pub fn add(
        &mut self,
        ids: &[String],
        texts: &[String],
        embeddings: &[Vec<f32>],
        metadatas: Option<&[Meta]>,
    ) -> Result<()> {
        if ids.len() != texts.len() || ids.len() != embeddings.len() {
            return Err(Error::Validation(format!(
                "shape mismatch: {} ids, {} texts, {} embeddings",
                ids.len(),
                texts.len(),
                embeddings.len()
            )));
        }
        if let Some(metas) = metadatas {
            if metas.len() != ids.len() {
                return Err(Error::Validation(format!(
                    "shape mismatch: {} metadatas for {} ids",
                    metas.len(),
                    ids.len()
                )));
            }
        }
        let batch = Matrix::from_rows(embeddings)?;
        if let Some(dim) = self.dim() {
            if batch.cols() != dim {
                return Err(Error::DimensionMismatch { expected: dim, actual: batch.cols() });
            }
        }
        let mut seen: HashSet<&str> = self.ids.iter().map(String::as_str).collect();
        for id in ids {
            if !seen.insert(id.as_str()) {
                return Err(Error::Validation(format!("duplicate id '{id}'")));
            }
        }

        self.embeddings.append(batch);
        self.ids.extend_from_slice(ids);
        self.texts.extend_from_slice(texts);
        match metadatas {
            Some(metas) => self.metadatas.extend_from_slice(metas),
            None => self.metadatas.extend(std::iter::repeat_with(Meta::new).take(ids.len())),
        }
        self.normalized = self.embeddings.normalized_rows();
        Ok(())
    }

    /// Top-`k` rows by cosine similarity, best first.
    ///
    /// `k` is clamped to `[1, len]`. Exact score ties keep insertion order.
    /// `score_threshold` filters the selected rows afterwards, so fewer than
    /// `k` hits may come back. An empty store yields no hits.
    pub fn search(&self, query: &[f32], top_k: usize, score_threshold: Option<f32>) -> Result<Vec<RetrievalHit>> {
        let Some(dim) = self.dim() else {
            return Ok(Vec::new());
        };
        if query.len() != dim {
            return Err(Error::DimensionMismatch { expected: dim, actual: query.len() });
        }
        if query.iter().any(|x| !x.is_finite()) {
            return Err(Error::Validation("query embedding has a non-finite value".to_string()));
        }
        let mut q = query.to_vec();
        normalize_row(&mut q);

        let mut scored: Vec<(usize, f32)> =
            self.normalized.iter_rows().map(|row| dot(row, &q)).enumerate().collect();
        let k = top_k.max(1).min(scored.len());
        let by_rank = |a: &(usize, f32), b: &(usize, f32)| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0));
        if k < scored.len() {
            scored.select_nth_unstable_by(k - 1, by_rank);
            scored.truncate(k);
        }
        scored.sort_unstable_by(by_rank);

        Ok(scored
            .into_iter()
            .filter(|&(_, score)| score_threshold.map_or(true, |t| score >= t))
            .map(|(i, score)| RetrievalHit {
                doc_id: self.ids[i].clone(),
                score,
                text: self.texts[i].clone(),
                metadata: self.metadatas[i].clone(),
            })
            .collect())
    }

    /// Persist ids, texts, metadatas and the raw matrix into `dir`.
    pub fn save(&self, dir: &Path) -> Result<()> {
        if self.is_empty() {
            return Err(Error::Validation("store is empty; nothing to save".to_string()));
        }
        fs::create_dir_all(dir)?;
        let blob = bincode::serialize(&self.embeddings)
            .map_err(|e| Error::Io(std::io::Error::new(std::io::ErrorKind::Other, e)))?;
        write_atomic(&dir.join(EMBEDDINGS_FILE), &blob)?;

        let docs = DocsRecord { ids: self.ids.clone(), texts: self.texts.clone(), metadatas: self.metadatas.clone() };
        write_atomic(&dir.join(DOCS_FILE), &serde_json::to_vec_pretty(&docs)?)?;
        tracing::debug!("saved {} rows (dim {}) to {}", self.len(), self.embeddings.cols(), dir.display());
        Ok(())
    }

    /// Restore a store written by `save`, re-deriving the normalized matrix.
    /// Any disagreement between the artifacts fails the whole load.
    pub fn load(dir: &Path) -> Result<Self> {
        let emb_path = dir.join(EMBEDDINGS_FILE);
        let docs_path = dir.join(DOCS_FILE);
        for path in [&emb_path, &docs_path] {
            if !path.is_file() {
                return Err(Error::NotFound(format!("index artifact {}", path.display())));
            }
        }

        let embeddings: Matrix = bincode::deserialize(&fs::read(&emb_path)?)
            .map_err(|e| Error::Consistency(format!("{}: {e}", emb_path.display())))?;
        embeddings.check_shape()?;

        let docs: DocsRecord = serde_json::from_slice(&fs::read(&docs_path)?)
            .map_err(|e| Error::Consistency(format!("{}: {e}", docs_path.display())))?;
        let (n_ids, n_texts, n_metas, n_rows) =
            (docs.ids.len(), docs.texts.len(), docs.metadatas.len(), embeddings.rows());
        if n_ids != n_texts || n_ids != n_metas || n_ids != n_rows {
            return Err(Error::Consistency(format!(
                "{} ids, {n_texts} texts, {n_metas} metadatas, {n_rows} embedding rows",
                n_ids
            )));
        }
        let mut seen = HashSet::with_capacity(n_ids);
        if let Some(dup) = docs.ids.iter().find(|id| !seen.insert(id.as_str())) {
            return Err(Error::Consistency(format!("duplicate id '{dup}'")));
        }

        let normalized = embeddings.normalized_rows();
        tracing::debug!("loaded {} rows (dim {}) from {}", n_rows, embeddings.cols(), dir.display());
        Ok(Self { ids: docs.ids, texts: docs.texts, metadatas: docs.metadatas, embeddings, normalized })
    }
}
