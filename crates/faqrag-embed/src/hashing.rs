use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};
use twox_hash::XxHash64;

use faqrag_core::error::{Error, Result};

use crate::l2_normalize;

/// Stateless signed feature hashing of whitespace tokens.
///
/// Needs no fitting, so it is handy for tests and for corpora where a
/// vocabulary would grow too large. Output is L2-normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashingEmbedder {
    dim: usize,
}

impl HashingEmbedder {
    pub fn new(dim: usize) -> Result<Self> {
        if dim == 0 {
            return Err(Error::Validation("hashing dimension must be > 0".to_string()));
        }
        Ok(Self { dim })
    }

    pub fn dim(&self) -> usize { self.dim }

    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0f32; self.dim];
        for token in text.split_whitespace() {
            let mut hasher = XxHash64::with_seed(0);
            token.hash(&mut hasher);
            let h = hasher.finish();
            let idx = (h % self.dim as u64) as usize;
            let sign = if h >> 63 == 0 { 1.0 } else { -1.0 };
            v[idx] += sign;
        }
        l2_normalize(&mut v);
        v
    }
}
