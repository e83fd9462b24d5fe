//! Offline index build: pages -> chunks -> embeddings -> persisted index.
//!
//! The index is assembled in a staging directory beside `out_dir` and only
//! swapped in once every artifact is on disk, so a failed build leaves the
//! previous index untouched.

use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use faqrag_core::config::EmbeddingSettings;
use faqrag_core::error::{Error, Result};
use faqrag_core::traits::Embedder;
use faqrag_core::types::{Chunk, Meta, MetaValue};
use faqrag_embed::EmbeddingModel;
use faqrag_text::{chunk_text, load_pages, ChunkParams, Normalizer};

use crate::store::VectorStore;
use crate::MODEL_FILE;

#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    pub chunking: ChunkParams,
    pub embedding: EmbeddingSettings,
    pub normalizer: Normalizer,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    pub sources: usize,
    pub pages_used: usize,
    pub pages_skipped: usize,
    pub chunks: usize,
    pub dim: usize,
    pub embedder_id: String,
}

pub fn build_index(sources: &[PathBuf], options: &BuildOptions, out_dir: &Path) -> Result<BuildReport> {
    options.chunking.validate()?;

    let mut stems: HashMap<String, usize> = HashMap::new();
    let mut chunks: Vec<Chunk> = Vec::new();
    let (mut pages_used, mut pages_skipped) = (0usize, 0usize);
    for source in sources {
        let pages = load_pages(source)?;
        let stem = unique_stem(source, &mut stems);
        let file_name = source.file_name().map_or_else(|| stem.clone(), |n| n.to_string_lossy().into_owned());
        let before = chunks.len();
        for page in pages {
            if page.text.is_empty() {
                pages_skipped += 1;
                continue;
            }
            pages_used += 1;
            let mut meta = Meta::new();
            meta.insert("source".to_string(), MetaValue::from(file_name.as_str()));
            meta.insert("page".to_string(), MetaValue::from(page.page_number));
            let base_id = format!("{stem}_p{}", page.page_number);
            chunks.extend(chunk_text(&page.text, &base_id, &meta, options.chunking)?);
        }
        tracing::info!("{}: {} chunks", source.display(), chunks.len() - before);
    }
    if chunks.is_empty() {
        return Err(Error::Validation(format!(
            "no extractable text in {} source(s); nothing to index",
            sources.len()
        )));
    }

    let normalized: Vec<String> = chunks.iter().map(|c| options.normalizer.normalize(&c.text)).collect();
    let model = EmbeddingModel::fit(&options.embedding, &normalized)?;
    let embeddings = embed_with_progress(&model, &normalized)?;

    let ids: Vec<String> = chunks.iter().map(|c| c.chunk_id.clone()).collect();
    let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
    let metadatas: Vec<Meta> = chunks.into_iter().map(|c| c.metadata).collect();
    let mut store = VectorStore::new();
    store.add(&ids, &texts, &embeddings, Some(metadatas.as_slice()))?;

    persist(&store, &model, out_dir)?;

    let report = BuildReport {
        sources: sources.len(),
        pages_used,
        pages_skipped,
        chunks: store.len(),
        dim: model.dim(),
        embedder_id: model.embedder_id(),
    };
    tracing::info!(
        "index written to {}: {} chunks from {} pages ({} blank pages skipped), dim {}",
        out_dir.display(),
        report.chunks,
        report.pages_used,
        report.pages_skipped,
        report.dim
    );
    Ok(report)
}

/// File stem, suffixed with `_2`, `_3`, ... when an earlier source had the
/// same stem so chunk ids stay unique.
fn unique_stem(path: &Path, seen: &mut HashMap<String, usize>) -> String {
    let stem = path.file_stem().map_or_else(|| "doc".to_string(), |s| s.to_string_lossy().into_owned());
    let count = seen.entry(stem.clone()).or_insert(0);
    *count += 1;
    if *count == 1 { stem } else { format!("{stem}_{count}") }
}

fn embed_with_progress(model: &EmbeddingModel, texts: &[String]) -> Result<Vec<Vec<f32>>> {
    let pb = ProgressBar::new(texts.len() as u64);
    let style = ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} chunks ({percent}%) {msg}",
    )
    .map_or_else(|_| ProgressStyle::default_bar(), |s| s.progress_chars("#>-"));
    pb.set_style(style);
    pb.set_message("embedding");

    let mut out = Vec::with_capacity(texts.len());
    for text in texts {
        out.push(model.embed(text)?);
        pb.inc(1);
    }
    pb.finish_with_message("embedded");
    Ok(out)
}

/// Write into a staging dir, then swap it in place of `out_dir`.
fn persist(store: &VectorStore, model: &EmbeddingModel, out_dir: &Path) -> Result<()> {
    let parent = out_dir
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent)?;
    let staging = tempfile::Builder::new().prefix(".faqrag-index-").tempdir_in(parent)?;
    store.save(staging.path())?;
    model.save(&staging.path().join(MODEL_FILE))?;

    let backup = out_dir.with_file_name(format!(
        ".{}.old",
        out_dir.file_name().map_or_else(|| "index".into(), |n| n.to_string_lossy())
    ));
    if backup.exists() {
        fs::remove_dir_all(&backup)?;
    }
    let had_previous = out_dir.exists();
    if had_previous {
        fs::rename(out_dir, &backup)?;
    }
    if let Err(e) = fs::rename(staging.path(), out_dir) {
        tracing::error!("failed to move new index into {}: {e}", out_dir.display());
        if had_previous {
            fs::rename(&backup, out_dir)?;
        }
        return Err(e.into());
    }
    if had_previous {
        if let Err(e) = fs::remove_dir_all(&backup) {
            tracing::warn!("could not remove previous index at {}: {e}", backup.display());
        }
    }
    Ok(())
}
