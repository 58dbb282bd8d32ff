//! Per-language phone and phoneme inventories.
//!
//! An [`Inventory`] owns two [`SymbolTable`]s (surface phones and
//! contrastive phonemes) and the many-to-many allophone relation between
//! them. Symbols outside the inventory are mapped to their nearest member by
//! feature similarity; every resolution is memoized so the similarity search
//! runs at most once per distinct input.
//!
//! # Example
//!
//! ```rust
//! use allophony::feature::FeatureTable;
//! use allophony::inventory::{Inventory, Mode};
//!
//! let inv = Inventory::from_phonemes("xyz", ["p", "t", "k", "a", "i"], FeatureTable::shared());
//! assert_eq!(inv.remap(&["b", "a", "tː"], Mode::Broad), vec!["p", "a", "t"]);
//! ```

mod cache;
pub mod io;
mod symbol_table;

use std::fmt;
use std::sync::Arc;

use log::{debug, warn};
use rustc_hash::FxHashMap;

use crate::error::{PhoneticError, Result, SymbolKind};
use crate::feature::FeatureTable;
use crate::similarity::{Resolution, SimilarityEngine};

pub use cache::NearestCache;
pub use symbol_table::{SymbolTable, BLANK, EOS};

const LENGTH_MARK: char = 'ː';

/// Which table [`Inventory::remap`] resolves against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum Mode {
    /// Phonemic transcription.
    #[default]
    Broad,
    /// Phonetic transcription.
    Narrow,
}

/// One side of an inventory together with its resolution cache.
#[derive(Debug)]
struct Universe {
    table: SymbolTable,
    /// Non-reserved symbols in id order; the candidate list for similarity
    /// search.
    units: Vec<String>,
    cache: NearestCache,
}

impl Universe {
    fn new(table: SymbolTable) -> Self {
        let units = table.units().map(str::to_string).collect();
        Self {
            table,
            units,
            cache: NearestCache::new(),
        }
    }

    fn nearest(&self, features: &FeatureTable, symbol: &str) -> Arc<str> {
        if let Some(hit) = self.cache.get(symbol) {
            return hit;
        }

        let resolved: &str = if self.table.contains(symbol) {
            symbol
        } else if let Some(short) = symbol
            .strip_suffix(LENGTH_MARK)
            .filter(|s| self.table.contains(s))
        {
            short
        } else {
            self.cache.record_search();
            match SimilarityEngine::new(features).resolve(symbol, &self.units) {
                Some((nearest, Resolution::Fallback)) => {
                    self.cache.record_fallback();
                    warn!("no features to resolve {symbol:?}, using first symbol {nearest:?}");
                    nearest
                }
                Some((nearest, _)) => {
                    debug!("resolved {symbol:?} to nearest {nearest:?}");
                    nearest
                }
                None => {
                    warn!("no symbols to resolve {symbol:?} against, using {BLANK}");
                    BLANK
                }
            }
        };

        self.cache.insert(symbol, Arc::from(resolved))
    }
}

/// A language's phone and phoneme tables with their allophone relation.
///
/// Immutable after construction apart from the nearest-symbol caches, which
/// only ever grow. `Inventory` is `Send + Sync`; concurrent lookups of the
/// same unresolved symbol may search twice but always agree on the result.
pub struct Inventory {
    lang_id: String,
    phone: Universe,
    phoneme: Universe,
    phone_to_phoneme: FxHashMap<String, Vec<String>>,
    phoneme_to_phone: FxHashMap<String, Vec<String>>,
    features: Arc<FeatureTable>,
}

impl Inventory {
    /// Build an inventory from its tables and allophone relation.
    ///
    /// `allophones` lists each phoneme with the phones realizing it; list
    /// order is preserved and determines [`phone_to_phoneme`]'s choice. The
    /// reserved [`BLANK`] and [`EOS`] symbols always map to themselves.
    ///
    /// # Errors
    ///
    /// `InventoryInconsistent` if a phoneme is not in `phoneme` or a phone is
    /// not in `phone`.
    ///
    /// [`phone_to_phoneme`]: Self::phone_to_phoneme
    pub fn new(
        lang_id: impl Into<String>,
        phone: SymbolTable,
        phoneme: SymbolTable,
        allophones: Vec<(String, Vec<String>)>,
        features: Arc<FeatureTable>,
    ) -> Result<Self> {
        let lang_id = lang_id.into();

        let mut phone_to_phoneme: FxHashMap<String, Vec<String>> = FxHashMap::default();
        let mut phoneme_to_phone: FxHashMap<String, Vec<String>> = FxHashMap::default();

        for reserved in [BLANK, EOS] {
            phone_to_phoneme.insert(reserved.to_string(), vec![reserved.to_string()]);
            phoneme_to_phone.insert(reserved.to_string(), vec![reserved.to_string()]);
        }

        for (unit, realizations) in allophones {
            if !phoneme.contains(&unit) {
                return Err(PhoneticError::InventoryInconsistent {
                    lang_id,
                    kind: SymbolKind::Phoneme,
                    symbol: unit,
                });
            }

            for surface in realizations {
                if !phone.contains(&surface) {
                    return Err(PhoneticError::InventoryInconsistent {
                        lang_id,
                        kind: SymbolKind::Phone,
                        symbol: surface,
                    });
                }

                let phonemes = phone_to_phoneme.entry(surface.clone()).or_default();
                if !phonemes.contains(&unit) {
                    phonemes.push(unit.clone());
                }
                let phones = phoneme_to_phone.entry(unit.clone()).or_default();
                if !phones.contains(&surface) {
                    phones.push(surface);
                }
            }
        }

        Ok(Self {
            lang_id,
            phone: Universe::new(phone),
            phoneme: Universe::new(phoneme),
            phone_to_phoneme,
            phoneme_to_phone,
            features,
        })
    }

    /// Build an inventory whose phones are its phonemes, each realizing
    /// itself.
    pub fn from_phonemes<I, S>(lang_id: impl Into<String>, phonemes: I, features: Arc<FeatureTable>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let table = SymbolTable::from_symbols(phonemes);
        let identity: FxHashMap<String, Vec<String>> = table
            .symbols()
            .map(|u| (u.to_string(), vec![u.to_string()]))
            .collect();

        Self {
            lang_id: lang_id.into(),
            phone: Universe::new(table.clone()),
            phoneme: Universe::new(table),
            phone_to_phoneme: identity.clone(),
            phoneme_to_phone: identity,
            features,
        }
    }

    /// Language identifier this inventory was built for.
    pub fn lang_id(&self) -> &str {
        &self.lang_id
    }

    /// The phone table.
    pub fn phone(&self) -> &SymbolTable {
        &self.phone.table
    }

    /// The phoneme table.
    pub fn phoneme(&self) -> &SymbolTable {
        &self.phoneme.table
    }

    /// The feature table used for nearest-symbol search.
    pub fn features(&self) -> &Arc<FeatureTable> {
        &self.features
    }

    /// Phonemes a phone realizes, in allophone-file order.
    pub fn phonemes_of(&self, phone: &str) -> &[String] {
        self.phone_to_phoneme
            .get(phone)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Phones realizing a phoneme, in allophone-file order.
    pub fn phones_of(&self, phoneme: &str) -> &[String] {
        self.phoneme_to_phone
            .get(phoneme)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Resolution cache of the phone table.
    pub fn phone_cache(&self) -> &NearestCache {
        &self.phone.cache
    }

    /// Resolution cache of the phoneme table.
    pub fn phoneme_cache(&self) -> &NearestCache {
        &self.phoneme.cache
    }

    /// Map an arbitrary symbol to the closest phoneme in the inventory.
    ///
    /// Order of resolution: cached result, exact membership, a long form
    /// `Xː` whose short form `X` is a phoneme, then feature similarity over
    /// all non-reserved phonemes. The result is cached under `symbol`.
    pub fn nearest_phoneme(&self, symbol: &str) -> Arc<str> {
        self.phoneme.nearest(&self.features, symbol)
    }

    /// Map an arbitrary symbol to the closest phone in the inventory.
    ///
    /// Same resolution order as [`nearest_phoneme`](Self::nearest_phoneme),
    /// against the phone table.
    pub fn nearest_phone(&self, symbol: &str) -> Arc<str> {
        self.phone.nearest(&self.features, symbol)
    }

    /// Resolve each element of `sequence` against the table selected by
    /// `mode`. Empty and whitespace-only elements are dropped.
    ///
    /// Elements are trimmed before resolution, so `" x "` and `"x"` share
    /// one cache entry keyed on `"x"`.
    pub fn remap<S: AsRef<str>>(&self, sequence: &[S], mode: Mode) -> Vec<String> {
        let universe = match mode {
            Mode::Broad => &self.phoneme,
            Mode::Narrow => &self.phone,
        };

        sequence
            .iter()
            .map(|s| s.as_ref().trim())
            .filter(|s| !s.is_empty())
            .map(|s| universe.nearest(&self.features, s).to_string())
            .collect()
    }

    /// Tokenize `text` with the feature table, then [`remap`](Self::remap).
    pub fn remap_text(&self, text: &str, mode: Mode) -> Vec<String> {
        let tokens = self.features.tokenize(text);
        self.remap(&tokens, mode)
    }

    /// Replace each phone with the first phoneme it realizes.
    ///
    /// Phones outside the phone table are first resolved with
    /// [`nearest_phone`](Self::nearest_phone).
    pub fn phone_to_phoneme<S: AsRef<str>>(&self, phones: &[S]) -> Vec<String> {
        self.translate(phones, &self.phone, &self.phone_to_phoneme, &self.phoneme)
    }

    /// Replace each phoneme with the first phone realizing it.
    ///
    /// Phonemes outside the phoneme table are first resolved with
    /// [`nearest_phoneme`](Self::nearest_phoneme).
    pub fn phoneme_to_phone<S: AsRef<str>>(&self, phonemes: &[S]) -> Vec<String> {
        self.translate(phonemes, &self.phoneme, &self.phoneme_to_phone, &self.phone)
    }

    fn translate<S: AsRef<str>>(
        &self,
        sequence: &[S],
        from: &Universe,
        relation: &FxHashMap<String, Vec<String>>,
        to: &Universe,
    ) -> Vec<String> {
        sequence
            .iter()
            .map(|s| s.as_ref().trim())
            .filter(|s| !s.is_empty())
            .map(|s| {
                let resolved = from.nearest(&self.features, s);
                match relation.get(&*resolved).and_then(|targets| targets.first()) {
                    Some(target) => target.clone(),
                    None => {
                        // symbol with no allophone entry
                        debug!("{resolved:?} has no allophone mapping, resolving by similarity");
                        to.nearest(&self.features, &resolved).to_string()
                    }
                }
            })
            .collect()
    }

    /// Whether every element of `phonemes` is in the phoneme table.
    ///
    /// Logs a warning naming the offenders when it is not.
    pub fn validate<S: AsRef<str>>(&self, phonemes: &[S]) -> bool {
        let unknown: Vec<&str> = phonemes
            .iter()
            .map(AsRef::as_ref)
            .filter(|p| !self.phoneme.table.contains(p))
            .collect();

        if unknown.is_empty() {
            true
        } else {
            warn!(
                "inventory {}: phonemes not in inventory: {:?}",
                self.lang_id, unknown
            );
            false
        }
    }
}

impl fmt::Display for Inventory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<Inventory {} phoneme: {}, phone: {}>",
            self.lang_id,
            self.phoneme.table.len(),
            self.phone.table.len()
        )
    }
}

impl fmt::Debug for Inventory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Inventory")
            .field("lang_id", &self.lang_id)
            .field("phone", &self.phone.table)
            .field("phoneme", &self.phoneme.table)
            .finish()
    }
}
