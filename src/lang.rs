//! Language identifiers and inventory directory lookup.
//!
//! Inventories are stored per language under a model directory:
//!
//! ```text
//! <data_dir>/model/<model>/<lang_id>/{phone,phoneme,allophone,lexicon}.txt
//! ```
//!
//! The two traits here are the seams between the phonetic core and the
//! environment it runs in; [`MacroLanguageNormalizer`] and
//! [`LocalDirResolver`] are the local-filesystem implementations.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::convert::g2p::{read_g2p_dir, G2pTable};
use crate::error::{PhoneticError, Result};
use crate::feature::FeatureTable;
use crate::inventory::{io::read_inventory, Inventory};

const BUNDLED_ISO639: &str = include_str!("../data/iso639.tsv");

/// Macro languages mapped to the individual language with the most
/// speakers.
pub const MACRO_TO_INDIVIDUAL: [(&str, &str); 10] = [
    ("zho", "cmn"),
    ("ara", "arb"),
    ("aze", "azb"),
    ("fas", "pes"),
    ("msa", "zlm"),
    ("ori", "ory"),
    ("kok", "gom"),
    ("srd", "sro"),
    ("est", "ekk"),
    ("grn", "gug"),
];

/// Language ids that are reserved device names on Windows and get a `_`
/// prefix as directory names.
pub const RESERVED_DIR_NAMES: [&str; 4] = ["prn", "con", "aux", "null"];

/// Maps user-supplied language ids to the ids inventories are stored under.
pub trait LanguageIdNormalizer: Send + Sync {
    /// Canonical id for `id`. Never fails; unknown ids come back lowercased.
    fn normalize(&self, id: &str) -> String;
}

/// Finds the directory holding a language's inventory files.
pub trait LangDirResolver: Send + Sync {
    /// Directory for language `id` in model `model`.
    ///
    /// # Errors
    ///
    /// `ResourceUnavailable` when no such directory exists.
    fn resolve(&self, id: &str, model: &str) -> Result<PathBuf>;
}

/// ISO 639-1 to 639-3 conversion followed by macro-language remapping.
#[derive(Debug, Clone)]
pub struct MacroLanguageNormalizer {
    iso1_to_iso3: FxHashMap<String, String>,
    names: FxHashMap<String, String>,
    macros: FxHashMap<&'static str, &'static str>,
}

impl MacroLanguageNormalizer {
    /// Normalizer over the bundled ISO 639 table.
    pub fn new() -> Self {
        let mut iso1_to_iso3 = FxHashMap::default();
        let mut names = FxHashMap::default();

        for line in BUNDLED_ISO639.lines() {
            let mut fields = line.split('\t');
            if let (Some(iso1), Some(iso3), Some(name)) = (fields.next(), fields.next(), fields.next()) {
                iso1_to_iso3.insert(iso1.to_string(), iso3.to_string());
                names.insert(iso3.to_string(), name.to_string());
            }
        }

        Self {
            iso1_to_iso3,
            names,
            macros: MACRO_TO_INDIVIDUAL.into_iter().collect(),
        }
    }

    /// English name of a language given its (un-normalized) id, for ids in
    /// the bundled table.
    pub fn language_name(&self, id: &str) -> Option<&str> {
        let id = id.trim().to_lowercase();
        let iso3 = match id.len() {
            2 => self.iso1_to_iso3.get(&id)?.clone(),
            _ => id,
        };
        self.names.get(&iso3).map(String::as_str)
    }

    fn remap_macro(&self, iso3: String) -> String {
        match self.macros.get(iso3.as_str()) {
            Some(individual) => individual.to_string(),
            None => iso3,
        }
    }
}

impl Default for MacroLanguageNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageIdNormalizer for MacroLanguageNormalizer {
    fn normalize(&self, id: &str) -> String {
        let id = id.trim().to_lowercase();
        match id.len() {
            3 => self.remap_macro(id),
            2 => match self.iso1_to_iso3.get(&id) {
                Some(iso3) => self.remap_macro(iso3.clone()),
                None => id,
            },
            _ => id,
        }
    }
}

/// Resolves language directories on the local filesystem. Never downloads.
#[derive(Debug, Clone)]
pub struct LocalDirResolver {
    data_dir: PathBuf,
}

impl LocalDirResolver {
    /// Resolver rooted at `data_dir`.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Root data directory.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Directory name used for `id`.
    pub fn dir_name(id: &str) -> String {
        if RESERVED_DIR_NAMES.contains(&id) {
            format!("_{id}")
        } else {
            id.to_string()
        }
    }
}

impl LangDirResolver for LocalDirResolver {
    /// `model` may itself be a directory containing `<id>/`; otherwise the
    /// lookup falls back to `<data_dir>/model/<model>/<id>`.
    fn resolve(&self, id: &str, model: &str) -> Result<PathBuf> {
        let name = Self::dir_name(id);

        let custom = Path::new(model).join(&name);
        if custom.exists() {
            return Ok(custom);
        }

        let installed = self.data_dir.join("model").join(model).join(&name);
        if installed.is_dir() {
            Ok(installed)
        } else {
            Err(PhoneticError::ResourceUnavailable {
                path: installed,
                reason: format!("no {model} inventory for {id}"),
            })
        }
    }
}

/// Normalize `id`, resolve its directory and read the inventory stored there.
pub fn load_inventory(
    normalizer: &dyn LanguageIdNormalizer,
    resolver: &dyn LangDirResolver,
    id: &str,
    model: &str,
    features: Arc<FeatureTable>,
) -> Result<Inventory> {
    let lang_id = normalizer.normalize(id);
    let dir = resolver.resolve(&lang_id, model)?;
    read_inventory(dir, &lang_id, features)
}

/// Load a grapheme-to-phoneme table for `id`.
///
/// `id` is a language id, or a table id `<lang>-<script>` naming the script.
/// Without a script the language's first table in sorted order is used.
pub fn load_g2p(
    normalizer: &dyn LanguageIdNormalizer,
    resolver: &dyn LangDirResolver,
    id: &str,
    model: &str,
    features: &FeatureTable,
) -> Result<G2pTable> {
    let (lang, script) = match id.split_once('-') {
        Some((lang, script)) => (lang, Some(script)),
        None => (id, None),
    };
    let lang_id = normalizer.normalize(lang);
    let dir = resolver.resolve(&lang_id, model)?;
    read_g2p_dir(dir, &lang_id, script, features)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_macro_languages_remapped() {
        let normalizer = MacroLanguageNormalizer::new();
        assert_eq!(normalizer.normalize("zho"), "cmn");
        assert_eq!(normalizer.normalize("EST"), "ekk");
        assert_eq!(normalizer.normalize("eng"), "eng");
    }

    #[test]
    fn test_two_letter_ids() {
        let normalizer = MacroLanguageNormalizer::new();
        assert_eq!(normalizer.normalize("en"), "eng");
        assert_eq!(normalizer.normalize("zh"), "cmn");
        assert_eq!(normalizer.normalize("fa"), "pes");
        assert_eq!(normalizer.normalize("qq"), "qq");
    }

    #[test]
    fn test_language_name() {
        let normalizer = MacroLanguageNormalizer::new();
        assert_eq!(normalizer.language_name("ru"), Some("Russian"));
        assert_eq!(normalizer.language_name("rus"), Some("Russian"));
        assert_eq!(normalizer.language_name("xyzw"), None);
    }

    #[test]
    fn test_reserved_dir_names() {
        assert_eq!(LocalDirResolver::dir_name("con"), "_con");
        assert_eq!(LocalDirResolver::dir_name("eng"), "eng");
    }

    #[test]
    fn test_load_g2p_by_lang_and_table_id() {
        let normalizer = MacroLanguageNormalizer::new();
        let resolver = LocalDirResolver::new("/nonexistent/allophony");
        let model = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/data");
        let table = FeatureTable::shared();

        let by_lang = load_g2p(&normalizer, &resolver, "es", model, &table).unwrap();
        assert_eq!(by_lang.id(), "spa-Latn");
        assert_eq!(by_lang.phones("b"), vec!["b"]);

        let by_id = load_g2p(&normalizer, &resolver, "spa-Latn", model, &table).unwrap();
        assert_eq!(by_id.len(), by_lang.len());

        let err = load_g2p(&normalizer, &resolver, "spa-Cyrl", model, &table).unwrap_err();
        assert!(matches!(err, PhoneticError::ResourceUnavailable { .. }));
    }

    #[test]
    fn test_resolve_missing() {
        let resolver = LocalDirResolver::new("/nonexistent/allophony");
        let err = resolver.resolve("eng", "latest").unwrap_err();
        assert!(matches!(err, PhoneticError::ResourceUnavailable { .. }));
    }
}
