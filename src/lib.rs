//! # allophony
//!
//! Phonetic symbol normalization, nearest-phone remapping and phonetic
//! sequence alignment.
//!
//! The crate is built from three layers:
//!
//! - a [`FeatureTable`](feature::FeatureTable) of articulatory feature
//!   vectors that normalizes diacritic-laden IPA symbols and tokenizes
//!   unspaced transcriptions
//! - per-language [`Inventory`](inventory::Inventory) tables that map any
//!   symbol onto the closest phone or phoneme of the language
//! - an [`align`] module computing edit distances, operation traces, fuzzy
//!   substring matches and error rates over phonetic sequences
//!
//! ## Example
//!
//! ```rust
//! use allophony::prelude::*;
//!
//! let table = FeatureTable::shared();
//! let inventory = Inventory::from_phonemes("xyz", ["k", "a", "t", "i"], table.clone());
//!
//! let reference = inventory.remap_text("kʰaːt", Mode::Broad);
//! assert_eq!(reference, vec!["k", "a", "t"]);
//!
//! let hypothesis = inventory.remap(&["k", "i", "t"], Mode::Broad);
//! let alignment = align(&reference, &hypothesis);
//! assert_eq!(alignment.cost, 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod align;
pub mod config;
pub mod convert;
pub mod error;
pub mod feature;
pub mod inventory;
pub mod lang;
pub mod lexicon;
pub mod similarity;

mod resource;

/// Command-line front end
#[cfg(feature = "cli")]
pub mod cli;

/// Common imports for convenient usage
pub mod prelude {
    pub use crate::align::{
        align, edit_distance, fuzzy_match, grouped_align, phonological_distance, Alignment,
        EditOp, ErrorRate, FuzzyMatch,
    };
    pub use crate::config::Config;
    pub use crate::convert::{ArpaConverter, G2pTable, TimitConverter};
    pub use crate::error::{PhoneticError, Result};
    pub use crate::feature::FeatureTable;
    pub use crate::inventory::{Inventory, Mode, SymbolTable};
    pub use crate::lang::{LangDirResolver, LanguageIdNormalizer, LocalDirResolver, MacroLanguageNormalizer};
    pub use crate::lexicon::Lexicon;
    pub use crate::similarity::{Resolution, SimilarityEngine};
}
