//! Integration tests for the bundled feature table and similarity engine.

use allophony::error::PhoneticError;
use allophony::prelude::*;

#[test]
fn test_tokenize_aspirated_stop() {
    let table = FeatureTable::shared();
    assert_eq!(table.tokenize("kʰæt"), vec!["kʰ", "æ", "t"]);
}

#[test]
fn test_tokenize_drops_unknown_tone_marks() {
    let table = FeatureTable::shared();
    assert_eq!(table.tokenize("ʔɓaːn˧˧"), vec!["ʔ", "ɓ", "aː", "n"]);
}

#[test]
fn test_tokenize_ascii_variants() {
    let table = FeatureTable::shared();
    // ASCII g and colon are read as their IPA counterparts
    assert_eq!(table.tokenize("ga:"), vec!["ɡ", "aː"]);
}

#[test]
fn test_tokenize_empty_and_spaces() {
    let table = FeatureTable::shared();
    assert!(table.tokenize("").is_empty());
    assert_eq!(table.tokenize_chunks("  "), Vec::<Vec<String>>::new());
}

#[test]
fn test_normalize_is_idempotent() {
    let table = FeatureTable::shared();

    for symbol in ["kʰ", "aː", "ʃ", "ɓ", "t\u{0303}", "ʰk", "e\u{0301}"] {
        let once = table.normalize(symbol).unwrap().to_string();
        let twice = table.normalize(&once).unwrap();
        assert_eq!(once, twice, "normalizing {symbol:?} twice changed it");
        assert!(table.contains_exact(&once));
    }
}

#[test]
fn test_normalize_unknown_symbol() {
    let table = FeatureTable::shared();

    match table.normalize("Q") {
        Err(PhoneticError::SymbolNotFound(s)) => assert_eq!(s, "Q"),
        other => panic!("expected SymbolNotFound, got {other:?}"),
    }
    assert_eq!(table.normalize_or_invalid("Q"), "!");
}

#[test]
fn test_self_similarity() {
    let table = FeatureTable::shared();
    let engine = SimilarityEngine::new(&table);

    for symbol in table.symbols().take(50) {
        let s = engine.similarity(symbol, symbol);
        assert!((s - 1.0).abs() < 1e-9, "similarity({symbol:?}, itself) = {s}");
    }
}

#[test]
fn test_similarity_is_symmetric_and_bounded() {
    let table = FeatureTable::shared();
    let symbols: Vec<&str> = table.symbols().step_by(37).collect();

    for a in &symbols {
        for b in &symbols {
            let ab = table.similarity(a, b);
            let ba = table.similarity(b, a);
            assert!((ab - ba).abs() < 1e-9);
            assert!((0.0..=1.0).contains(&ab));
        }
    }
}

#[test]
fn test_most_similar_prefers_minimal_contrast() {
    let table = FeatureTable::shared();
    let candidates = ["k", "s", "a", "m"];
    assert_eq!(table.most_similar("kʰ", &candidates), Some("k"));
    assert_eq!(table.most_similar("ɡ", &candidates), Some("k"));
}
