//! Phonetic feature model.
//!
//! A [`FeatureTable`] maps every known phonetic symbol to a fixed-length
//! vector of ternary articulatory features (`-1`, `0`, `+1`) and carries a
//! per-dimension weight vector used by the [`similarity`](crate::similarity)
//! metric.
//!
//! Besides plain lookup the table offers three operations designed to absorb
//! messy real-world transcriptions:
//!
//! - [`FeatureTable::normalize`] strips unknown diacritics until a known
//!   symbol is found and returns the canonical member of its
//!   feature-identity class
//! - [`FeatureTable::tokenize`] segments an unspaced string into maximal known
//!   symbols, dropping anything it cannot match (tone letters, stray marks)
//! - [`FeatureTable::base_symbol`] reduces a symbol to its longest base-form
//!   prefix
//!
//! # Example
//!
//! ```rust
//! use allophony::feature::FeatureTable;
//!
//! let table = FeatureTable::shared();
//! assert_eq!(table.tokenize("kʰæt"), vec!["kʰ", "æ", "t"]);
//! assert_eq!(table.normalize("a:").unwrap(), "aː");
//! assert_eq!(table.similarity("a", "a"), 1.0);
//! ```

mod loader;
pub mod normalize;

use std::ops::Deref;
use std::path::Path;
use std::sync::{Arc, OnceLock};

use log::error;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::error::{PhoneticError, Result};
use crate::resource::read_resource;
use crate::similarity::SimilarityEngine;
use normalize::{char_boundaries, prepare};

/// Per-dimension weights for the bundled 24-dimension IPA table.
///
/// Major class features dominate; tone features carry no weight.
pub const IPA_WEIGHTS: [f64; 24] = [
    1.0, 1.0, 1.0, 0.5, 0.25, 0.25, 0.25, 0.125, 0.125, 0.125, 0.125, 0.25, 0.25, 0.125, 0.25,
    0.25, 0.25, 0.25, 0.25, 0.25, 0.25, 0.125, 0.0, 0.0,
];

/// Default bound on the length (in codepoints) of a single symbol during
/// tokenization.
pub const DEFAULT_MAX_SYMBOL_LEN: usize = 8;

/// Marker returned by [`FeatureTable::normalize_or_invalid`] when a symbol
/// cannot be matched.
pub const INVALID_SYMBOL: &str = "!";

const BUNDLED_FEATURES: &str = include_str!("../../data/ipa_features.csv");
const BUNDLED_BASES: &str = include_str!("../../data/ipa_bases.txt");

/// A fixed-length ternary feature vector.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct FeatureVector(SmallVec<[i8; 24]>);

impl FeatureVector {
    /// The all-zero vector of `len` dimensions.
    pub fn zeros(len: usize) -> Self {
        FeatureVector(SmallVec::from_elem(0, len))
    }

    /// Borrow the raw values.
    #[inline]
    pub fn as_slice(&self) -> &[i8] {
        &self.0
    }
}

impl Deref for FeatureVector {
    type Target = [i8];

    #[inline]
    fn deref(&self) -> &[i8] {
        &self.0
    }
}

impl FromIterator<i8> for FeatureVector {
    fn from_iter<I: IntoIterator<Item = i8>>(iter: I) -> Self {
        FeatureVector(iter.into_iter().collect())
    }
}

impl From<&[i8]> for FeatureVector {
    fn from(values: &[i8]) -> Self {
        FeatureVector(SmallVec::from_slice(values))
    }
}

#[derive(Debug, Clone)]
struct Entry {
    symbol: String,
    vector: FeatureVector,
    base: bool,
    /// Row index of the canonical member of this entry's class
    canonical: usize,
}

/// Symbol → feature vector table with canonicalization and tokenization.
///
/// Built once and treated as read-only afterwards; share it between
/// inventories with `Arc<FeatureTable>`.
#[derive(Debug, Clone)]
pub struct FeatureTable {
    dimensions: Vec<String>,
    weights: Vec<f64>,
    weight_sum: f64,
    entries: Vec<Entry>,
    index: FxHashMap<String, usize>,
    max_symbol_len: usize,
}

impl FeatureTable {
    /// Build a table from in-memory feature and base-symbol sources.
    ///
    /// # Arguments
    ///
    /// * `source_name` - name used in malformed-record warnings
    /// * `features` - CSV text, header row followed by `symbol,v1,..,vN`
    /// * `bases` - one base symbol per line
    /// * `weights` - one non-negative weight per feature dimension
    ///
    /// # Errors
    ///
    /// Fails when the header is missing or the weight vector does not match
    /// the header's dimension count. Malformed data rows are skipped.
    pub fn from_sources(
        source_name: &str,
        features: &str,
        bases: &str,
        weights: Vec<f64>,
    ) -> Result<Self> {
        let parsed = loader::parse_features(source_name, features)?;

        if weights.len() != parsed.dimensions.len() {
            return Err(PhoneticError::malformed(
                source_name,
                1,
                format!(
                    "header declares {} dimensions but {} weights were given",
                    parsed.dimensions.len(),
                    weights.len()
                ),
            ));
        }
        if weights.iter().any(|w| !(*w >= 0.0)) {
            return Err(PhoneticError::Config(
                "feature weights must be non-negative".to_string(),
            ));
        }

        let bases = loader::parse_bases(bases);

        let mut entries: Vec<Entry> = parsed
            .rows
            .into_iter()
            .enumerate()
            .map(|(i, row)| Entry {
                base: bases.contains(&row.symbol),
                symbol: row.symbol,
                vector: row.vector,
                canonical: i,
            })
            .collect();

        assign_canonical(&mut entries);

        let index = entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.symbol.clone(), i))
            .collect();

        let weight_sum = weights.iter().sum();

        Ok(Self {
            dimensions: parsed.dimensions,
            weights,
            weight_sum,
            entries,
            index,
            max_symbol_len: DEFAULT_MAX_SYMBOL_LEN,
        })
    }

    /// Load a table from a feature CSV file and a base-symbol file.
    pub fn from_files<P: AsRef<Path>, Q: AsRef<Path>>(
        features: P,
        bases: Q,
        weights: Vec<f64>,
    ) -> Result<Self> {
        let features = features.as_ref();
        let feature_text = read_resource(features)?;
        let base_text = read_resource(bases.as_ref())?;
        Self::from_sources(
            &features.display().to_string(),
            &feature_text,
            &base_text,
            weights,
        )
    }

    /// Parse the bundled 24-dimension IPA table.
    pub fn bundled() -> Result<Self> {
        Self::from_sources(
            "ipa_features.csv",
            BUNDLED_FEATURES,
            BUNDLED_BASES,
            IPA_WEIGHTS.to_vec(),
        )
    }

    /// Process-wide instance of the bundled table, parsed on first use.
    ///
    /// # Panics
    ///
    /// Panics if the bundled data fails to parse. It is compiled into the
    /// crate from `data/`, so this can only happen after a bad edit to those
    /// files, which `test_bundled_table_loads` catches. Callers that load
    /// their own data should use [`from_files`](Self::from_files) and
    /// propagate the error instead.
    pub fn shared() -> Arc<FeatureTable> {
        static SHARED: OnceLock<Arc<FeatureTable>> = OnceLock::new();
        SHARED
            .get_or_init(|| Arc::new(Self::bundled().expect("bundled IPA feature table is well-formed")))
            .clone()
    }

    /// Set the tokenizer's longest-symbol bound (in codepoints).
    pub fn with_max_symbol_len(mut self, max_symbol_len: usize) -> Self {
        self.max_symbol_len = max_symbol_len.max(1);
        self
    }

    /// Names of the feature dimensions, in vector order.
    pub fn dimensions(&self) -> &[String] {
        &self.dimensions
    }

    /// Per-dimension weights.
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Sum of all weights, computed once at construction.
    #[inline]
    pub fn weight_sum(&self) -> f64 {
        self.weight_sum
    }

    /// Number of symbols in the table.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no symbols.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All symbols in table order.
    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.symbol.as_str())
    }

    /// Whether `symbol` is an exact (NFD) table key.
    #[inline]
    pub fn contains_exact(&self, symbol: &str) -> bool {
        self.index.contains_key(symbol)
    }

    /// Whether `symbol` normalizes to some table entry.
    pub fn contains(&self, symbol: &str) -> bool {
        self.lookup(symbol).is_some()
    }

    /// Whether `symbol` is flagged as a base form.
    pub fn is_base(&self, symbol: &str) -> bool {
        self.index
            .get(symbol)
            .map(|&i| self.entries[i].base)
            .unwrap_or(false)
    }

    /// Canonical representative of an exact table key.
    pub fn canonical(&self, symbol: &str) -> Option<&str> {
        self.index
            .get(symbol)
            .map(|&i| self.entries[self.entries[i].canonical].symbol.as_str())
    }

    /// Feature vector of an exact table key.
    pub fn vector_exact(&self, symbol: &str) -> Option<&FeatureVector> {
        self.index.get(symbol).map(|&i| &self.entries[i].vector)
    }

    /// Feature vector of `symbol` after normalization.
    ///
    /// Unknown symbols yield the zero vector of the table's dimension.
    pub fn vector(&self, symbol: &str) -> FeatureVector {
        match self.lookup(symbol) {
            Some(i) => self.entries[i].vector.clone(),
            None => FeatureVector::zeros(self.dimensions.len()),
        }
    }

    /// Normalize `symbol` to the canonical form of its closest known match.
    ///
    /// Steps: NFD decomposition and fixed substitutions, then suffix
    /// truncation until a known prefix is found, then the string without its
    /// first character, then without its first and last characters.
    ///
    /// # Errors
    ///
    /// `SymbolNotFound` if no step matches.
    pub fn normalize(&self, symbol: &str) -> Result<&str> {
        match self.lookup(symbol) {
            Some(i) => Ok(self.entries[self.entries[i].canonical].symbol.as_str()),
            None => Err(PhoneticError::SymbolNotFound(symbol.to_string())),
        }
    }

    /// [`normalize`](Self::normalize), logging failures and returning
    /// [`INVALID_SYMBOL`] instead of an error.
    pub fn normalize_or_invalid(&self, symbol: &str) -> &str {
        match self.normalize(symbol) {
            Ok(s) => s,
            Err(e) => {
                error!("{e}");
                INVALID_SYMBOL
            }
        }
    }

    /// Longest base-form prefix of `symbol`'s canonical form.
    ///
    /// `tː` becomes `t` and `kʷʰ` becomes `k`; a symbol with no base prefix
    /// is returned in canonical form.
    pub fn base_symbol(&self, symbol: &str) -> Result<&str> {
        let canonical = self.normalize(symbol)?;
        let boundaries = char_boundaries(canonical);

        for end in (1..boundaries.len()).rev() {
            let prefix = &canonical[..boundaries[end]];
            if let Some(&i) = self.index.get(prefix) {
                if self.entries[i].base {
                    return Ok(self.entries[i].symbol.as_str());
                }
            }
        }

        Ok(canonical)
    }

    /// Segment `text` into maximal known symbols.
    ///
    /// Greedy left-to-right scan trying the longest substring (up to the
    /// configured bound) at each position. Unmatched codepoints are dropped.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let prepared = prepare(text);
        let boundaries = char_boundaries(&prepared);
        let n = boundaries.len() - 1;

        let mut tokens = Vec::new();
        let mut i = 0;

        while i < n {
            let max_len = self.max_symbol_len.min(n - i);
            let mut longest = 0;

            for len in 1..=max_len {
                if self
                    .index
                    .contains_key(&prepared[boundaries[i]..boundaries[i + len]])
                {
                    longest = len;
                }
            }

            if longest > 0 {
                tokens.push(prepared[boundaries[i]..boundaries[i + longest]].to_string());
                i += longest;
            } else {
                i += 1;
            }
        }

        tokens
    }

    /// [`tokenize`](Self::tokenize) each whitespace-separated chunk of
    /// `text` separately, so no symbol spans a space.
    pub fn tokenize_chunks(&self, text: &str) -> Vec<Vec<String>> {
        text.split_whitespace().map(|chunk| self.tokenize(chunk)).collect()
    }

    /// Similarity in `[0, 1]` between two symbols; 0 if either is unknown.
    pub fn similarity(&self, a: &str, b: &str) -> f64 {
        SimilarityEngine::new(self).similarity(a, b)
    }

    /// The candidate most similar to `target`. See
    /// [`SimilarityEngine::most_similar`].
    pub fn most_similar<'c, S: AsRef<str>>(
        &self,
        target: &str,
        candidates: &'c [S],
    ) -> Option<&'c str> {
        SimilarityEngine::new(self).most_similar(target, candidates)
    }

    /// Row index of the match for `symbol`, following the normalization
    /// fallbacks.
    fn lookup(&self, symbol: &str) -> Option<usize> {
        let prepared = prepare(symbol);
        let boundaries = char_boundaries(&prepared);
        let n = boundaries.len() - 1;

        for end in (1..=n).rev() {
            if let Some(&i) = self.index.get(&prepared[..boundaries[end]]) {
                return Some(i);
            }
        }

        // leading modifier, e.g. ʰk
        if n > 1 {
            if let Some(&i) = self.index.get(&prepared[boundaries[1]..]) {
                return Some(i);
            }
        }

        // modifiers on both sides, e.g. ʰkʷ
        if n > 2 {
            if let Some(&i) = self.index.get(&prepared[boundaries[1]..boundaries[n - 1]]) {
                return Some(i);
            }
        }

        None
    }
}

/// Point every entry at the canonical member of its feature-identity class.
///
/// Base-flagged members are preferred, then the fewest codepoints, then the
/// earliest row.
fn assign_canonical(entries: &mut [Entry]) {
    let mut classes: FxHashMap<&FeatureVector, Vec<usize>> = FxHashMap::default();
    for (i, e) in entries.iter().enumerate() {
        classes.entry(&e.vector).or_default().push(i);
    }

    let mut assignment = vec![0usize; entries.len()];
    for members in classes.values() {
        let any_base = members.iter().any(|&i| entries[i].base);
        let canonical = members
            .iter()
            .copied()
            .filter(|&i| !any_base || entries[i].base)
            .min_by_key(|&i| (entries[i].symbol.chars().count(), i))
            .unwrap_or(members[0]);

        for &i in members {
            assignment[i] = canonical;
        }
    }

    for (entry, canonical) in entries.iter_mut().zip(assignment) {
        entry.canonical = canonical;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_table() -> FeatureTable {
        let features = "ipa,syl,voi,long\n\
                        a,+,+,-\n\
                        aː,+,+,+\n\
                        t,-,-,-\n\
                        tː,-,-,+\n\
                        d,-,+,-\n\
                        ḁ,+,-,-\n\
                        ʔa,+,-,-\n";
        FeatureTable::from_sources("small.csv", features, "a\nt\nd\n", vec![1.0, 0.5, 0.25]).unwrap()
    }

    #[test]
    fn test_bundled_table_loads() {
        let table = FeatureTable::bundled().unwrap();
        assert_eq!(table.dimensions().len(), 24);
        assert_eq!(table.weights().len(), 24);
        assert!(table.len() > 100);
        assert!(table.contains_exact("kʰ"));
    }

    #[test]
    fn test_shared_matches_bundled() {
        let shared = FeatureTable::shared();
        let bundled = FeatureTable::bundled().unwrap();
        assert!(Arc::ptr_eq(&shared, &FeatureTable::shared()));
        assert_eq!(shared.len(), bundled.len());
        assert_eq!(shared.weights(), bundled.weights());
    }

    #[test]
    fn test_weight_sum_cached() {
        let table = FeatureTable::from_sources("x.csv", "ipa,syl,son\na,+,+\n", "", vec![1.5, 2.0])
            .unwrap();
        assert_eq!(table.weight_sum(), 3.5);
        let bundled = FeatureTable::bundled().unwrap();
        assert_eq!(bundled.weight_sum(), IPA_WEIGHTS.iter().sum::<f64>());
    }

    #[test]
    fn test_weight_mismatch_rejected() {
        let result = FeatureTable::from_sources("x.csv", "ipa,syl\na,+\n", "", vec![1.0, 1.0]);
        assert!(result.is_err());
    }

    #[test]
    fn test_normalize_exact_and_stripped() {
        let table = small_table();
        assert_eq!(table.normalize("a").unwrap(), "a");
        assert_eq!(table.normalize("a:").unwrap(), "aː");
        // unknown trailing diacritic is stripped
        assert_eq!(table.normalize("t\u{0320}").unwrap(), "t");
    }

    #[test]
    fn test_normalize_leading_modifier() {
        let table = small_table();
        assert_eq!(table.normalize("ʰt").unwrap(), "t");
        assert_eq!(table.normalize("ʰtʷ").unwrap(), "t");
    }

    #[test]
    fn test_normalize_not_found() {
        let table = small_table();
        assert!(matches!(
            table.normalize("ʃ"),
            Err(PhoneticError::SymbolNotFound(_))
        ));
        assert_eq!(table.normalize_or_invalid("ʃ"), INVALID_SYMBOL);
    }

    #[test]
    fn test_canonical_prefers_shortest_when_no_base() {
        let table = small_table();
        // ḁ and ʔa share a vector; neither is a base, ḁ is the earlier of the
        // two-codepoint members
        assert_eq!(table.canonical("ʔa"), Some("a\u{0325}"));
        assert_eq!(table.normalize("ʔa").unwrap(), "a\u{0325}");
    }

    #[test]
    fn test_canonical_prefers_base() {
        let table = FeatureTable::from_sources(
            "x.csv",
            "ipa,voi\nx,+\ny,+\n",
            "y\n",
            vec![1.0],
        )
        .unwrap();
        assert_eq!(table.canonical("x"), Some("y"));
        assert_eq!(table.canonical("y"), Some("y"));
    }

    #[test]
    fn test_vector_zero_fallback() {
        let table = small_table();
        assert_eq!(table.vector("ʃ"), FeatureVector::zeros(3));
        assert_eq!(table.vector("d").as_slice(), &[-1, 1, -1]);
    }

    #[test]
    fn test_base_symbol() {
        let table = small_table();
        assert_eq!(table.base_symbol("tː").unwrap(), "t");
        assert_eq!(table.base_symbol("a").unwrap(), "a");
    }

    #[test]
    fn test_tokenize_small_table() {
        let table = small_table();
        assert_eq!(table.tokenize("ta:d"), vec!["t", "aː", "d"]);
        assert_eq!(table.tokenize("t a"), vec!["t", "a"]);
        assert!(table.tokenize("").is_empty());
    }

    #[test]
    fn test_tokenize_chunks() {
        let table = small_table();
        assert_eq!(
            table.tokenize_chunks(" ta:  d "),
            vec![vec!["t".to_string(), "aː".to_string()], vec!["d".to_string()]]
        );
    }

    #[test]
    fn test_tokenize_respects_max_len() {
        let table = small_table().with_max_symbol_len(1);
        assert_eq!(table.tokenize("aː"), vec!["a"]);
    }
}
