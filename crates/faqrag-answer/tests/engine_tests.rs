use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;

use faqrag_answer::{AnswerEngine, EngineOptions, FaqEntry, FaqIndex, HandbookState};
use faqrag_core::config::{Settings, DEFAULT_FALLBACK_ANSWER};
use faqrag_core::error::{Error, Result};
use faqrag_core::traits::Embedder;
use faqrag_core::types::{AnswerSource, ChatResponse};
use faqrag_text::{Normalizer, SectionBreakFormatter};
use faqrag_vector::{build_index, BuildOptions, Retriever, VectorStore};

const FAQ_JSON: &str = r#"[
  {"question": "How do I register?", "answer": "Register through the student portal.", "tags": ["registration"]},
  {"question": "When are the final semester exams held on campus?", "answer": "In the last two weeks of the semester.", "tags": ["exam", "schedule"]}
]"#;

const HANDBOOK: &str = "BAB 1 Pendaftaran dilakukan online.\x0cBiaya kuliah dibayar per semester.";

fn write_faq(dir: &Path) -> PathBuf {
    let path = dir.join("faq.json");
    std::fs::write(&path, FAQ_JSON).unwrap();
    path
}

fn write_index(dir: &Path) -> PathBuf {
    let src = dir.join("handbook.txt");
    std::fs::write(&src, HANDBOOK).unwrap();
    let out = dir.join("vector_store");
    build_index(&[src], &BuildOptions::default(), &out).unwrap();
    out
}

fn settings(dir: &Path, index_dir: &Path) -> Settings {
    let mut s = Settings::default();
    s.faq.path = write_faq(dir).to_string_lossy().into_owned();
    s.rag.index_dir = index_dir.to_string_lossy().into_owned();
    s
}

fn faq_only_engine() -> AnswerEngine {
    let entries: Vec<FaqEntry> = serde_json::from_str(FAQ_JSON).unwrap();
    let faq = FaqIndex::build(&entries, &Normalizer::default()).unwrap();
    let formatter = SectionBreakFormatter::new(vec!["BAB".into()], 600);
    AnswerEngine::new(faq, None, Box::new(formatter), EngineOptions::default())
}

#[test]
fn close_question_is_answered_from_faq() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let index = write_index(tmp.path());
    let engine = AnswerEngine::open(&settings(tmp.path(), &index))?;
    assert_eq!(engine.handbook_state(), &HandbookState::Ready);

    let res = engine.get_answer("how do I register");
    assert_eq!(res.source, AnswerSource::Faq);
    assert_eq!(res.answer, "Register through the student portal.");
    assert!(res.confidence >= 0.25);
    // five of the entry's seven terms, all with equal weight
    assert!((res.confidence - (5.0f32 / 7.0).sqrt()).abs() < 1e-4, "confidence={}", res.confidence);
    assert!(res.contexts.is_empty());
    Ok(())
}

#[test]
fn handbook_answers_when_faq_misses() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let index = write_index(tmp.path());
    let engine = AnswerEngine::open(&settings(tmp.path(), &index))?;

    let res = engine.get_answer("cara pendaftaran");
    assert_eq!(res.source, AnswerSource::Handbook);
    assert!(res.answer.contains("\nBAB 1"), "answer={:?}", res.answer);
    assert!(res.answer.contains("Pendaftaran dilakukan online."));
    assert!(res.confidence >= 0.20);
    assert_eq!(res.contexts.len(), 1);
    assert_eq!(res.contexts[0].doc_id, "handbook_p1_c1");
    assert!((res.contexts[0].score - res.confidence).abs() < f32::EPSILON);

    let wire = serde_json::to_value(ChatResponse::from(res))?;
    assert_eq!(wire["source"], "handbook");
    assert_eq!(wire["contexts"][0]["metadata"]["source"], "handbook.txt");
    assert_eq!(wire["contexts"][0]["metadata"]["page"], 1);
    Ok(())
}

#[test]
fn unmatched_question_gets_fallback_with_faq_score() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let index = write_index(tmp.path());
    let engine = AnswerEngine::open(&settings(tmp.path(), &index))?;

    let res = engine.get_answer("xyz qwerty");
    assert_eq!(res.source, AnswerSource::None);
    assert_eq!(res.answer, DEFAULT_FALLBACK_ANSWER);
    assert_eq!(res.confidence, 0.0);
    assert!(res.contexts.is_empty());

    // shares one of 21 equally weighted terms with the exam entry
    let res = engine.get_answer("when library");
    assert_eq!(res.source, AnswerSource::None);
    assert!((res.confidence - 1.0 / 21f32.sqrt()).abs() < 1e-4, "confidence={}", res.confidence);
    Ok(())
}

#[test]
fn missing_index_degrades_to_faq_only() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let engine = AnswerEngine::open(&settings(tmp.path(), &tmp.path().join("no_index")))?;
    assert!(matches!(engine.handbook_state(), HandbookState::Unavailable(_)));

    assert_eq!(engine.get_answer("how do I register").source, AnswerSource::Faq);
    assert_eq!(engine.get_answer("cara pendaftaran").source, AnswerSource::None);
    Ok(())
}

#[test]
fn disabled_rag_skips_the_index() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let index = write_index(tmp.path());
    let mut s = settings(tmp.path(), &index);
    s.rag.enabled = false;
    let engine = AnswerEngine::open(&s)?;
    assert_eq!(engine.handbook_state(), &HandbookState::Disabled);
    assert_eq!(engine.get_answer("cara pendaftaran").source, AnswerSource::None);
    Ok(())
}

#[test]
fn faq_problems_are_fatal_at_startup() {
    let tmp = tempfile::tempdir().unwrap();
    let mut s = Settings::default();
    s.faq.path = tmp.path().join("missing.json").to_string_lossy().into_owned();
    assert!(matches!(AnswerEngine::open(&s), Err(Error::NotFound(_))));

    let empty = tmp.path().join("empty.json");
    std::fs::write(&empty, "[]").unwrap();
    s.faq.path = empty.to_string_lossy().into_owned();
    assert!(matches!(AnswerEngine::open(&s), Err(Error::Validation(_))));

    let broken = tmp.path().join("broken.json");
    std::fs::write(&broken, "{not json").unwrap();
    s.faq.path = broken.to_string_lossy().into_owned();
    assert!(matches!(AnswerEngine::open(&s), Err(Error::Json(_))));
}

#[test]
fn ask_rejects_blank_messages() {
    let engine = faq_only_engine();
    assert!(matches!(engine.ask("   \n"), Err(Error::Validation(_))));
    assert_eq!(engine.ask("how do I register").unwrap().source, AnswerSource::Faq);
}

struct BrokenEmbedder;

impl Embedder for BrokenEmbedder {
    fn embedder_id(&self) -> String { "broken".to_string() }
    fn dim(&self) -> usize { 2 }
    fn embed(&self, _text: &str) -> Result<Vec<f32>> { Err(Error::Capability("model went away".to_string())) }
}

#[test]
fn retrieval_errors_count_as_no_hits() {
    let entries: Vec<FaqEntry> = serde_json::from_str(FAQ_JSON).unwrap();
    let faq = FaqIndex::build(&entries, &Normalizer::default()).unwrap();
    let mut store = VectorStore::new();
    store.add(&["h_p1_c1".to_string()], &["BAB 1".to_string()], &[vec![1.0, 0.0]], None).unwrap();
    let retriever = Retriever::new(store, Box::new(BrokenEmbedder), Normalizer::default()).unwrap();
    let formatter = SectionBreakFormatter::new(vec!["BAB".into()], 600);
    let engine = AnswerEngine::new(faq, Some(retriever), Box::new(formatter), EngineOptions::default());

    let res = engine.get_answer("when library");
    assert_eq!(res.source, AnswerSource::None);
    assert!(res.confidence > 0.0);
}

#[test]
fn engine_is_shared_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<AnswerEngine>();

    let engine = Arc::new(faq_only_engine());
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || (0..25).map(|_| engine.get_answer("how do I register").source).collect::<Vec<_>>())
        })
        .collect();
    for handle in handles {
        assert!(handle.join().unwrap().iter().all(|s| *s == AnswerSource::Faq));
    }
}
