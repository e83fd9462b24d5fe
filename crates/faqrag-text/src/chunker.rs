use faqrag_core::error::{Error, Result};
use faqrag_core::types::{Chunk, Meta};

use crate::normalize::collapse_whitespace;

/// Window size and overlap, both in chars.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkParams {
    pub max_chars: usize,
    pub overlap: usize,
}

impl Default for ChunkParams {
    fn default() -> Self { Self { max_chars: 300, overlap: 60 } }
}

impl ChunkParams {
    pub fn new(max_chars: usize, overlap: usize) -> Result<Self> {
        let params = Self { max_chars, overlap };
        params.validate()?;
        Ok(params)
    }

    /// `max_chars > 0` and `overlap < max_chars`; anything else would never
    /// advance the window.
    pub fn validate(&self) -> Result<()> {
        if self.max_chars == 0 {
            return Err(Error::Validation("max_chars must be > 0".to_string()));
        }
        if self.overlap >= self.max_chars {
            return Err(Error::Validation(format!(
                "overlap ({}) must be smaller than max_chars ({})",
                self.overlap, self.max_chars
            )));
        }
        Ok(())
    }
}

/// Split `text` into overlapping fixed-length windows.
///
/// Whitespace is collapsed first (punctuation is kept so surfaced spans stay
/// readable). Each non-empty trimmed window becomes a chunk with id
/// `<base_id>_c<n>` (n starts at 1) and its own copy of `metadata`. The
/// window advances to `end - overlap` until it reaches the end of the text.
pub fn chunk_text(text: &str, base_id: &str, metadata: &Meta, params: ChunkParams) -> Result<Vec<Chunk>> {
    params.validate()?;
    let text = collapse_whitespace(text);
    if text.is_empty() {
        return Ok(Vec::new());
    }

    // byte offset of every char boundary, plus the end
    let bounds: Vec<usize> = text.char_indices().map(|(i, _)| i).chain(std::iter::once(text.len())).collect();
    let len = bounds.len() - 1;

    let mut chunks = Vec::new();
    let mut start = 0usize;
    loop {
        let end = (start + params.max_chars).min(len);
        let window = text[bounds[start]..bounds[end]].trim();
        if !window.is_empty() {
            chunks.push(Chunk {
                chunk_id: format!("{base_id}_c{}", chunks.len() + 1),
                text: window.to_string(),
                metadata: metadata.clone(),
                start,
                end,
            });
        }
        if end == len {
            break;
        }
        start = end.saturating_sub(params.overlap);
    }
    Ok(chunks)
}
