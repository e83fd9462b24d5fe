//! faqrag-core
//!
//! Domain types, the error taxonomy, the embedding trait and the layered
//! configuration shared by the text, embed, vector and answer crates.

pub mod config;
pub mod error;
pub mod fs;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
