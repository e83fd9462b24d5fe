//! Per-request decision flow.
//!
//! 1. FAQ stage: the best FAQ entry wins outright when its score reaches
//!    `faq_threshold`.
//! 2. Handbook stage: only when an index was opened at startup. The best
//!    surviving hit is formatted for display; all surviving hits are
//!    returned as contexts.
//! 3. Otherwise the fallback answer, carrying the FAQ stage's best score.
//!
//! The engine is immutable after construction and safe to share behind `Arc`.

use std::fmt;

use faqrag_core::config::{expand_path, Settings};
use faqrag_core::error::{Error, Result};
use faqrag_core::types::{AnswerResult, AnswerSource};
use faqrag_text::{AnswerFormat, Normalizer, SectionBreakFormatter};
use faqrag_vector::Retriever;

use crate::faq::{load_faq, FaqIndex};

/// Outcome of opening the handbook index at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandbookState {
    Ready,
    Disabled,
    Unavailable(String),
}

impl fmt::Display for HandbookState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready => f.write_str("ready"),
            Self::Disabled => f.write_str("disabled"),
            Self::Unavailable(reason) => write!(f, "unavailable ({reason})"),
        }
    }
}

/// Request-time knobs of the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineOptions {
    pub normalizer: Normalizer,
    pub faq_threshold: f32,
    pub top_k: usize,
    pub score_threshold: f32,
    pub fallback_answer: String,
}

impl Default for EngineOptions {
    fn default() -> Self { Self::from(&Settings::default()) }
}

impl From<&Settings> for EngineOptions {
    fn from(s: &Settings) -> Self {
        Self {
            normalizer: Normalizer::new(s.normalizer.lowercase),
            faq_threshold: s.faq.threshold,
            top_k: s.rag.top_k,
            score_threshold: s.rag.score_threshold,
            fallback_answer: s.format.fallback_answer.clone(),
        }
    }
}

pub struct AnswerEngine {
    faq: FaqIndex,
    retriever: Option<Retriever>,
    handbook: HandbookState,
    formatter: Box<dyn AnswerFormat>,
    options: EngineOptions,
}

impl AnswerEngine {
    /// Assemble from parts. The handbook stage is `Ready` when a retriever
    /// is given and `Disabled` otherwise.
    pub fn new(
        faq: FaqIndex,
        retriever: Option<Retriever>,
        formatter: Box<dyn AnswerFormat>,
        options: EngineOptions,
    ) -> Self {
        let handbook = if retriever.is_some() { HandbookState::Ready } else { HandbookState::Disabled };
        Self { faq, retriever, handbook, formatter, options }
    }

    /// Load the FAQ (fatal on failure) and try to open the handbook index.
    /// A handbook index that cannot be opened leaves the engine in FAQ-only
    /// mode.
    pub fn open(settings: &Settings) -> Result<Self> {
        settings.validate()?;
        let options = EngineOptions::from(settings);

        let faq_path = expand_path(&settings.faq.path);
        let entries = load_faq(&faq_path)?;
        let faq = FaqIndex::build(&entries, &options.normalizer)?;

        let formatter = SectionBreakFormatter::new(settings.format.section_markers.clone(), settings.rag.max_answer_chars);
        let mut engine = Self::new(faq, None, Box::new(formatter), options);

        if !settings.rag.enabled {
            tracing::info!("handbook retrieval disabled by config; answering from FAQ only");
            return Ok(engine);
        }
        let index_dir = expand_path(&settings.rag.index_dir);
        match Retriever::open(&index_dir, engine.options.normalizer) {
            Ok(retriever) => {
                engine.retriever = Some(retriever);
                engine.handbook = HandbookState::Ready;
            }
            Err(e) => {
                tracing::warn!("handbook index at {} unavailable, answering from FAQ only: {e}", index_dir.display());
                engine.handbook = HandbookState::Unavailable(e.to_string());
            }
        }
        Ok(engine)
    }

    pub fn handbook_state(&self) -> &HandbookState { &self.handbook }

    pub fn options(&self) -> &EngineOptions { &self.options }

    /// Validate the message, then answer it.
    pub fn ask(&self, message: &str) -> Result<AnswerResult> {
        if message.trim().is_empty() {
            return Err(Error::Validation("message must not be blank".to_string()));
        }
        Ok(self.get_answer(message))
    }

    pub fn get_answer(&self, message: &str) -> AnswerResult {
        let query = self.options.normalizer.normalize(message);

        let best = self.faq.best_match(&query).unwrap_or_else(|e| {
            tracing::warn!("FAQ lookup failed: {e}");
            None
        });
        let faq_score = best.as_ref().map_or(0.0, |m| m.score);
        if let Some(m) = best.filter(|m| m.score >= self.options.faq_threshold) {
            tracing::debug!("FAQ hit {} (score {:.3})", m.id, m.score);
            return AnswerResult { answer: m.answer, confidence: m.score, source: AnswerSource::Faq, contexts: Vec::new() };
        }

        if let Some(retriever) = &self.retriever {
            match retriever.retrieve(&query, self.options.top_k, Some(self.options.score_threshold)) {
                Ok(hits) => {
                    if let Some(best_hit) = hits.first() {
                        tracing::debug!("handbook hit {} (score {:.3})", best_hit.doc_id, best_hit.score);
                        let answer = self.formatter.format(&best_hit.text);
                        let confidence = best_hit.score;
                        return AnswerResult { answer, confidence, source: AnswerSource::Handbook, contexts: hits };
                    }
                }
                Err(e) => tracing::warn!("handbook retrieval failed, treating as no hits: {e}"),
            }
        }

        AnswerResult {
            answer: self.options.fallback_answer.clone(),
            confidence: faq_score,
            source: AnswerSource::None,
            contexts: Vec::new(),
        }
    }
}
