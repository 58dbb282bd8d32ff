//! End-to-end alignment of remapped transcriptions.

use allophony::align::{grouped_align, weighted_edit_distance};
use allophony::prelude::*;

fn vowels() -> &'static [&'static str] {
    &["a", "e", "i", "o", "u", "æ", "ə", "ɪ", "ɛ", "ɔ", "ʊ", "ɑ"]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Class {
    Vowel,
    Consonant,
}

fn class_of(symbol: &String) -> Class {
    if vowels().contains(&symbol.as_str()) {
        Class::Vowel
    } else {
        Class::Consonant
    }
}

fn inventory() -> Inventory {
    Inventory::from_phonemes(
        "tst",
        ["p", "t", "k", "s", "m", "n", "a", "i", "u", "ə"],
        FeatureTable::shared(),
    )
}

#[test]
fn test_align_remapped_sequences() {
    let inventory = inventory();

    let reference = inventory.remap_text("kʰaːt", Mode::Broad);
    let hypothesis = inventory.remap_text("kat", Mode::Broad);
    assert_eq!(reference, hypothesis);

    let alignment = align(&reference, &hypothesis);
    assert_eq!(alignment.cost, 0);
    assert_eq!(alignment.matches(), 3);
}

#[test]
fn test_error_rate_over_utterances() {
    let pairs = [
        (vec!["k", "a", "t"], vec!["k", "a", "t"]),
        (vec!["s", "i", "t"], vec!["s", "i"]),
        (vec!["m", "a"], vec!["n", "a", "s"]),
    ];

    let mut rate = ErrorRate::new();
    for (reference, hypothesis) in &pairs {
        rate.add_alignment(&align(reference, hypothesis));
    }

    assert_eq!(rate.utterances(), 3);
    assert_eq!(rate.reference_len(), 8);
    assert_eq!(rate.errors(), 3);
    assert_eq!(rate.deletions(), 1);
    assert_eq!(rate.insertions(), 1);
    assert_eq!(rate.substitutions(), 1);
    assert!((rate.rate().unwrap() - 3.0 / 8.0).abs() < 1e-12);
    assert_eq!(rate.top_deletions(1), vec![("t", 1)]);
    assert_eq!(rate.top_substitutions(1), vec![(("m", "n"), 1)]);
}

#[test]
fn test_grouped_vowel_consonant_rates() {
    let reference: Vec<String> = ["k", "a", "t", "i"].iter().map(|s| s.to_string()).collect();
    let hypothesis: Vec<String> = ["k", "ə", "t", "i"].iter().map(|s| s.to_string()).collect();

    let grouped = grouped_align(&reference, &hypothesis, class_of);
    assert_eq!(grouped.cost, 1);

    let vowel = grouped.count(&Class::Vowel);
    assert_eq!(vowel.total, 2);
    assert_eq!(vowel.errors, 1);
    assert_eq!(vowel.rate(), Some(0.5));

    let consonant = grouped.count(&Class::Consonant);
    assert_eq!(consonant.total, 2);
    assert_eq!(consonant.errors, 0);
}

#[test]
fn test_fuzzy_match_locates_word() {
    let table = FeatureTable::shared();
    let utterance = table.tokenize("ðəkʰætsæt");
    let word = table.tokenize("kʰæt");

    let found = fuzzy_match(&word, &utterance);
    assert_eq!(found.cost, 0);
    assert_eq!(&utterance[found.start..found.end], word.as_slice());
}

#[test]
fn test_phonological_distance_is_graded() {
    let table = FeatureTable::shared();

    let close = phonological_distance(&table, &["p", "a"], &["b", "a"]);
    let far = phonological_distance(&table, &["p", "a"], &["i", "a"]);
    assert!(close > 0.0);
    assert!(close < far);
    assert!(far <= 1.0);

    // insertions cost a whole unit
    let inserted = phonological_distance(&table, &["p"], &["p", "a"]);
    assert!((inserted - 1.0).abs() < 1e-12);
}

#[test]
fn test_weighted_distance_with_unit_costs_matches_edit_distance() {
    let a = ["k", "i", "t", "ə", "n"];
    let b = ["s", "i", "t", "i", "ŋ"];
    let weighted = weighted_edit_distance(&a, &b, |x, y| if x == y { 0.0 } else { 1.0 });
    assert_eq!(weighted, edit_distance(&a, &b) as f64);
}
