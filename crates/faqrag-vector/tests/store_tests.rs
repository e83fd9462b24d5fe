use faqrag_core::types::{Meta, MetaValue};
use faqrag_core::Error;
use faqrag_vector::{VectorStore, DOCS_FILE};

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

fn store_with(rows: &[(&str, Vec<f32>)]) -> VectorStore {
    let ids: Vec<String> = rows.iter().map(|(id, _)| (*id).to_string()).collect();
    let texts: Vec<String> = rows.iter().map(|(id, _)| format!("text of {id}")).collect();
    let embs: Vec<Vec<f32>> = rows.iter().map(|(_, v)| v.clone()).collect();
    let mut store = VectorStore::new();
    store.add(&ids, &texts, &embs, None).expect("add");
    store
}

fn hit_ids(hits: &[faqrag_core::types::RetrievalHit]) -> Vec<&str> {
    hits.iter().map(|h| h.doc_id.as_str()).collect()
}

#[test]
fn width_mismatch_is_rejected_and_store_is_untouched() {
    let mut store = VectorStore::new();
    store.add(&strings(&["a"]), &strings(&["x"]), &[vec![0.5; 50]], None).unwrap();

    let err = store.add(&strings(&["b"]), &strings(&["y"]), &[vec![0.5; 40]], None);
    assert!(matches!(err, Err(Error::DimensionMismatch { expected: 50, actual: 40 })));
    assert_eq!(store.len(), 1);
    assert_eq!(store.dim(), Some(50));
    assert_eq!(store.ids(), &strings(&["a"])[..]);
}

#[test]
fn malformed_batches_are_validation_errors() {
    let mut store = VectorStore::new();
    let err = store.add(&strings(&["a", "b"]), &strings(&["x"]), &[vec![1.0], vec![1.0]], None);
    assert!(matches!(err, Err(Error::Validation(_))), "ids/texts length differ");

    let err = store.add(&strings(&["a", "b"]), &strings(&["x", "y"]), &[vec![1.0, 0.0], vec![1.0]], None);
    assert!(matches!(err, Err(Error::Validation(_))), "ragged rows");

    let err = store.add(&[], &[], &[], None);
    assert!(matches!(err, Err(Error::Validation(_))), "no rows");

    let err = store.add(&strings(&["a"]), &strings(&["x"]), &[vec![f32::NAN, 1.0]], None);
    assert!(matches!(err, Err(Error::Validation(_))), "non-finite");

    let metas = vec![Meta::new(), Meta::new()];
    let err = store.add(&strings(&["a"]), &strings(&["x"]), &[vec![1.0]], Some(metas.as_slice()));
    assert!(matches!(err, Err(Error::Validation(_))), "metadata count");

    assert!(store.is_empty());
    assert_eq!(store.dim(), None);
}

#[test]
fn duplicate_ids_are_rejected() {
    let mut store = store_with(&[("a", vec![1.0, 0.0])]);
    let err = store.add(&strings(&["a"]), &strings(&["again"]), &[vec![0.0, 1.0]], None);
    assert!(matches!(err, Err(Error::Validation(_))));

    let err = store.add(&strings(&["b", "b"]), &strings(&["1", "2"]), &[vec![0.0, 1.0], vec![1.0, 1.0]], None);
    assert!(matches!(err, Err(Error::Validation(_))));
    assert_eq!(store.len(), 1);
}

#[test]
fn empty_store_search_returns_nothing() {
    let store = VectorStore::new();
    assert!(store.search(&[1.0, 2.0], 3, None).unwrap().is_empty());
}

#[test]
fn search_clamps_top_k() {
    let store = store_with(&[("a", vec![1.0, 0.0]), ("b", vec![0.0, 1.0]), ("c", vec![1.0, 1.0])]);
    assert_eq!(store.search(&[1.0, 0.0], 10, None).unwrap().len(), 3);
    assert_eq!(store.search(&[1.0, 0.0], 0, None).unwrap().len(), 1);
    assert_eq!(hit_ids(&store.search(&[1.0, 0.0], 0, None).unwrap()), vec!["a"]);
}

#[test]
fn results_are_descending_with_ties_in_insertion_order() {
    let store = store_with(&[
        ("low", vec![0.0, 1.0]),
        ("first", vec![2.0, 0.0]),
        ("mid", vec![1.0, 1.0]),
        ("second", vec![5.0, 0.0]),
    ]);
    let hits = store.search(&[1.0, 0.0], 4, None).unwrap();
    assert_eq!(hit_ids(&hits), vec!["first", "second", "mid", "low"]);
    assert!(hits.windows(2).all(|w| w[0].score >= w[1].score));
    assert!((hits[0].score - 1.0).abs() < 1e-6);
    assert!((hits[2].score - std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-6);

    let top2 = store.search(&[1.0, 0.0], 2, None).unwrap();
    assert_eq!(hit_ids(&top2), vec!["first", "second"]);
}

#[test]
fn threshold_filters_after_top_k() {
    let store = store_with(&[("a", vec![1.0, 0.0]), ("b", vec![0.6, 0.8]), ("c", vec![0.0, 1.0])]);
    assert_eq!(hit_ids(&store.search(&[1.0, 0.0], 1, Some(0.5)).unwrap()), vec!["a"]);
    assert_eq!(hit_ids(&store.search(&[1.0, 0.0], 3, Some(0.5)).unwrap()), vec!["a", "b"]);
    assert!(store.search(&[1.0, 0.0], 3, Some(1.5)).unwrap().is_empty());
}

#[test]
fn zero_vectors_score_zero() {
    let store = store_with(&[("zero", vec![0.0, 0.0]), ("x", vec![1.0, 0.0])]);
    let hits = store.search(&[1.0, 0.0], 2, None).unwrap();
    assert_eq!(hit_ids(&hits), vec!["x", "zero"]);
    assert_eq!(hits[1].score, 0.0);

    let hits = store.search(&[0.0, 0.0], 2, None).unwrap();
    assert!(hits.iter().all(|h| h.score == 0.0));
    assert_eq!(hit_ids(&hits), vec!["zero", "x"]);
}

#[test]
fn bad_queries_are_rejected() {
    let store = store_with(&[("a", vec![1.0, 0.0])]);
    assert!(matches!(
        store.search(&[1.0, 0.0, 0.0], 1, None),
        Err(Error::DimensionMismatch { expected: 2, actual: 3 })
    ));
    assert!(matches!(store.search(&[f32::INFINITY, 0.0], 1, None), Err(Error::Validation(_))));
}

#[test]
fn normalized_rows_have_unit_norm_even_for_large_values() {
    let store = store_with(&[("big", vec![3e20, 4e20]), ("small", vec![3e-3, 4e-3])]);
    for row in store.normalized().iter_rows() {
        let norm = row.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5, "norm={norm}");
        assert!((row[0] - 0.6).abs() < 1e-5);
    }
    assert_eq!(store.embeddings().row(0), &[3e20_f32, 4e20][..]);
}

#[test]
fn missing_metadata_defaults_to_empty_maps() {
    let store = store_with(&[("a", vec![1.0])]);
    assert_eq!(store.metadatas(), &[Meta::new()][..]);
}

#[test]
fn saving_an_empty_store_fails() {
    let tmp = tempfile::tempdir().unwrap();
    assert!(matches!(VectorStore::new().save(tmp.path()), Err(Error::Validation(_))));
}

#[test]
fn save_and_load_round_trip() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let mut meta = Meta::new();
    meta.insert("source".into(), MetaValue::from("handbook.pdf"));
    meta.insert("page".into(), MetaValue::from(2u32));

    let mut store = VectorStore::new();
    store.add(
        &strings(&["handbook_p2_c1", "handbook_p2_c2"]),
        &strings(&["BAB 1 Pendaftaran", "Biaya kuliah"]),
        &[vec![0.2, 0.9, 0.0], vec![0.7, 0.1, 0.3]],
        Some(vec![meta.clone(), meta].as_slice()),
    )?;
    store.save(tmp.path())?;

    let loaded = VectorStore::load(tmp.path())?;
    assert_eq!(loaded.ids(), store.ids());
    assert_eq!(loaded.texts(), store.texts());
    assert_eq!(loaded.metadatas(), store.metadatas());
    assert_eq!(loaded.embeddings(), store.embeddings());

    let q = [0.3, 0.5, 0.1];
    assert_eq!(loaded.search(&q, 2, None)?, store.search(&q, 2, None)?);
    Ok(())
}

#[test]
fn load_reports_missing_artifacts() {
    let tmp = tempfile::tempdir().unwrap();
    assert!(matches!(VectorStore::load(&tmp.path().join("nope")), Err(Error::NotFound(_))));
}

#[test]
fn load_rejects_inconsistent_docs() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let store = store_with(&[("a", vec![1.0, 0.0]), ("b", vec![0.0, 1.0])]);
    store.save(tmp.path())?;

    let docs = tmp.path().join(DOCS_FILE);
    let mut value: serde_json::Value = serde_json::from_slice(&std::fs::read(&docs)?)?;
    value["ids"] = serde_json::json!(["a"]);
    std::fs::write(&docs, serde_json::to_vec(&value)?)?;
    assert!(matches!(VectorStore::load(tmp.path()), Err(Error::Consistency(_))));

    value["ids"] = serde_json::json!(["a", "a"]);
    std::fs::write(&docs, serde_json::to_vec(&value)?)?;
    assert!(matches!(VectorStore::load(tmp.path()), Err(Error::Consistency(_))));

    std::fs::write(&docs, b"not json")?;
    assert!(matches!(VectorStore::load(tmp.path()), Err(Error::Consistency(_))));
    Ok(())
}
