//! Pronunciation lexicons.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::Path;

use log::{info, warn};
use rustc_hash::FxHashMap;

use crate::error::{PhoneticError, Result};
use crate::inventory::{Inventory, Mode};
use crate::resource::read_resource;

/// Lexicon file name inside a language directory.
pub const LEXICON_FILE: &str = "lexicon.txt";

/// Lowercased word → pronunciation in an inventory's phonemes.
#[derive(Debug, Clone, Default)]
pub struct Lexicon {
    lang_id: String,
    entries: FxHashMap<String, Vec<String>>,
}

impl Lexicon {
    /// Parse `word<TAB>phonemes` lines, remapping every phoneme broad
    /// through `inventory`.
    ///
    /// Lines with other than two tab-separated fields, or with either field
    /// empty, are skipped with a warning. A later entry for the same word
    /// replaces an earlier one.
    pub fn parse(source_name: &str, text: &str, inventory: &Inventory) -> Self {
        let mut entries = FxHashMap::default();

        for (idx, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let fields: Vec<&str> = line.split('\t').collect();
            let (word, pronunciation) = match fields.as_slice() {
                [word, pronunciation] if !word.is_empty() && !pronunciation.trim().is_empty() => {
                    (*word, *pronunciation)
                }
                _ => {
                    warn!(
                        "{}",
                        PhoneticError::malformed(
                            source_name,
                            idx + 1,
                            "expected `word<TAB>phonemes`"
                        )
                    );
                    continue;
                }
            };

            let phonemes: Vec<&str> = pronunciation.split_whitespace().collect();
            entries.insert(word.to_lowercase(), inventory.remap(&phonemes, Mode::Broad));
        }

        Self {
            lang_id: inventory.lang_id().to_string(),
            entries,
        }
    }

    /// Read `path`, or return an empty lexicon if it does not exist.
    pub fn read<P: AsRef<Path>>(path: P, inventory: &Inventory) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            info!("no lexicon at {}, using an empty one", path.display());
            return Ok(Self {
                lang_id: inventory.lang_id().to_string(),
                entries: FxHashMap::default(),
            });
        }

        let text = read_resource(path)?;
        let lexicon = Self::parse(&path.display().to_string(), &text, inventory);
        info!("loaded {} lexicon entries for {}", lexicon.len(), lexicon.lang_id);
        Ok(lexicon)
    }

    /// Write the lexicon as `word<TAB>phonemes` lines sorted by word.
    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let mut file = fs::File::create(path).map_err(|e| PhoneticError::io(path, e))?;
        let sorted: BTreeMap<&String, &Vec<String>> = self.entries.iter().collect();
        for (word, phonemes) in sorted {
            writeln!(file, "{word}\t{}", phonemes.join(" ")).map_err(|e| PhoneticError::io(path, e))?;
        }
        Ok(())
    }

    /// Language the pronunciations belong to.
    pub fn lang_id(&self) -> &str {
        &self.lang_id
    }

    /// Pronunciation of `word`, case-insensitively.
    pub fn get(&self, word: &str) -> Option<&[String]> {
        self.entries.get(&word.to_lowercase()).map(Vec::as_slice)
    }

    /// Whether `word` has a pronunciation, case-insensitively.
    pub fn contains(&self, word: &str) -> bool {
        self.entries.contains_key(&word.to_lowercase())
    }

    /// Number of words.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the lexicon has no words.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All `(word, pronunciation)` pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries.iter().map(|(w, p)| (w.as_str(), p.as_slice()))
    }
}
