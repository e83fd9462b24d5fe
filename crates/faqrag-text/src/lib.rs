//! faqrag-text
//!
//! Text handling for both sides of the pipeline: query/index normalization,
//! overlapping chunking of handbook pages, display formatting of retrieved
//! spans, and page extraction for the offline index build.

pub mod chunker;
pub mod format;
pub mod normalize;
pub mod pages;

pub use chunker::{chunk_text, ChunkParams};
pub use format::{AnswerFormat, SectionBreakFormatter};
pub use normalize::{collapse_whitespace, Normalizer};
pub use pages::{collect_sources, load_pages, Page};
