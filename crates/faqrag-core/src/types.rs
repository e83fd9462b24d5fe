//! Domain types shared by the chunker, the vector store and the answer engine.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub type ChunkId = String;

/// Scalar metadata value. Only these kinds are ever stored or persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetaValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl fmt::Display for MetaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Str(v) => f.write_str(v),
        }
    }
}

impl From<&str> for MetaValue {
    fn from(v: &str) -> Self { Self::Str(v.to_string()) }
}

impl From<String> for MetaValue {
    fn from(v: String) -> Self { Self::Str(v) }
}

impl From<i64> for MetaValue {
    fn from(v: i64) -> Self { Self::Int(v) }
}

impl From<u32> for MetaValue {
    fn from(v: u32) -> Self { Self::Int(i64::from(v)) }
}

impl From<f64> for MetaValue {
    fn from(v: f64) -> Self { Self::Float(v) }
}

impl From<bool> for MetaValue {
    fn from(v: bool) -> Self { Self::Bool(v) }
}

/// String-keyed metadata. Ordered so persisted records are stable.
pub type Meta = BTreeMap<String, MetaValue>;

/// A span of a source document that is independently indexed.
///
/// - `chunk_id`: `<base_id>_c<seq>`, 1-based sequence within the base id
/// - `text`: the trimmed, non-empty span
/// - `metadata`: an owned copy of the caller's metadata
/// - `start`/`end`: char offsets of the untrimmed window in the
///   whitespace-collapsed source text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub chunk_id: ChunkId,
    pub text: String,
    pub metadata: Meta,
    pub start: usize,
    pub end: usize,
}

/// One ranked search result. `score` is the cosine similarity in [-1, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalHit {
    pub doc_id: String,
    pub score: f32,
    pub text: String,
    pub metadata: Meta,
}

/// Which path produced an answer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AnswerSource {
    Faq,
    Handbook,
    None,
}

impl fmt::Display for AnswerSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Faq => "faq",
            Self::Handbook => "handbook",
            Self::None => "none",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerResult {
    pub answer: String,
    pub confidence: f32,
    pub source: AnswerSource,
    pub contexts: Vec<RetrievalHit>,
}

/// Wire shape of a surfaced context: the hit without its text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextItem {
    pub id: String,
    pub score: f32,
    #[serde(default)]
    pub metadata: Meta,
}

/// Wire shape of an answer as returned to a chat client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub answer: String,
    pub confidence: f32,
    pub source: AnswerSource,
    #[serde(default)]
    pub contexts: Vec<ContextItem>,
}

impl From<RetrievalHit> for ContextItem {
    fn from(hit: RetrievalHit) -> Self {
        Self { id: hit.doc_id, score: hit.score, metadata: hit.metadata }
    }
}

impl From<AnswerResult> for ChatResponse {
    fn from(result: AnswerResult) -> Self {
        Self {
            answer: result.answer,
            confidence: result.confidence,
            source: result.source,
            contexts: result.contexts.into_iter().map(ContextItem::from).collect(),
        }
    }
}
