//! faqrag-answer
//!
//! The two-stage answer engine: a curated FAQ matched by TF-IDF cosine
//! similarity, with a handbook retrieval fallback when no FAQ entry is
//! close enough.

pub mod engine;
pub mod faq;

pub use engine::{AnswerEngine, EngineOptions, HandbookState};
pub use faq::{load_faq, FaqEntry, FaqIndex, FaqMatch};
