//! Grapheme-to-phoneme tables.
//!
//! A table is a two-column CSV with an `Orth,Phon` header:
//!
//! ```text
//! Orth,Phon
//! b,b
//! ch,t͡ʃ
//! "qu",k
//! ```
//!
//! The `Phon` column is tokenized with the feature table. Both columns are
//! NFC-composed and tone letters are removed from phonemes. Tables live in a
//! language directory as `g2p/<lang>-<script>.csv`.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};
use rustc_hash::FxHashMap;
use unicode_normalization::UnicodeNormalization;

use crate::error::{PhoneticError, Result};
use crate::feature::FeatureTable;
use crate::resource::read_resource;

/// Directory holding g2p tables inside a language directory.
pub const G2P_DIR: &str = "g2p";

const HEADER: [&str; 2] = ["Orth", "Phon"];

const TONE_LETTERS: [char; 5] = ['˩', '˨', '˧', '˦', '˥'];

/// Grapheme → phoneme sequences, one per table row.
#[derive(Debug, Clone, Default)]
pub struct G2pTable {
    id: String,
    entries: FxHashMap<String, Vec<Vec<String>>>,
    /// Longest grapheme, in codepoints.
    max_grapheme_len: usize,
}

impl G2pTable {
    /// Parse an `Orth,Phon` table.
    ///
    /// # Errors
    ///
    /// `MalformedRecord` if the header is not `Orth,Phon` or any row does
    /// not have exactly two fields.
    pub fn parse(id: &str, text: &str, table: &FeatureTable) -> Result<Self> {
        let mut lines = text.lines().enumerate();

        let header = lines
            .next()
            .map(|(_, line)| split_row(line.trim_start_matches('\u{feff}').trim_end()))
            .unwrap_or_default();
        if header != HEADER {
            return Err(PhoneticError::malformed(
                id,
                1,
                format!("header is {header:?} instead of {HEADER:?}"),
            ));
        }

        let mut entries: FxHashMap<String, Vec<Vec<String>>> = FxHashMap::default();
        let mut max_grapheme_len = 0;

        for (idx, line) in lines {
            if line.trim().is_empty() {
                continue;
            }

            let (graph, phons) = match split_row(line).as_slice() {
                [graph, phons] => (graph.nfc().collect::<String>(), phons.clone()),
                fields => {
                    return Err(PhoneticError::malformed(
                        id,
                        idx + 1,
                        format!("expected 2 fields, found {}", fields.len()),
                    ))
                }
            };

            let phonemes: Vec<String> = table
                .tokenize(&phons)
                .iter()
                .map(|phon| phon.nfc().filter(|c| !TONE_LETTERS.contains(c)).collect::<String>())
                .filter(|phon| !phon.is_empty())
                .collect();

            max_grapheme_len = max_grapheme_len.max(graph.chars().count());
            entries.entry(graph).or_default().push(phonemes);
        }

        Ok(Self {
            id: id.to_string(),
            entries,
            max_grapheme_len,
        })
    }

    /// Read a table file; its id is the file stem.
    pub fn read<P: AsRef<Path>>(path: P, table: &FeatureTable) -> Result<Self> {
        let path = path.as_ref();
        let text = read_resource(path)?;
        let id = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self::parse(&id, &text, table)
    }

    /// Table id, conventionally `<lang>-<script>`.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Number of distinct graphemes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every pronunciation given for `graph`, in row order.
    pub fn alternatives(&self, graph: &str) -> &[Vec<String>] {
        let graph: String = graph.nfc().collect();
        self.entries.get(&graph).map(Vec::as_slice).unwrap_or_default()
    }

    /// All phonemes listed for `graph`, alternatives concatenated.
    pub fn phones(&self, graph: &str) -> Vec<&str> {
        self.alternatives(graph)
            .iter()
            .flatten()
            .map(String::as_str)
            .collect()
    }

    /// Convert `word` by repeatedly taking the longest known grapheme at the
    /// current position and its first pronunciation. Characters that start
    /// no grapheme are skipped.
    pub fn transliterate(&self, word: &str) -> Vec<String> {
        let word: Vec<char> = word.nfc().collect();
        let mut phonemes = Vec::new();
        let mut i = 0;

        while i < word.len() {
            let longest = (1..=self.max_grapheme_len.min(word.len() - i))
                .rev()
                .find_map(|len| {
                    let graph: String = word[i..i + len].iter().collect();
                    self.entries.get(&graph).map(|alts| (len, alts))
                });

            match longest {
                Some((len, alternatives)) => {
                    if let Some(first) = alternatives.first() {
                        phonemes.extend(first.iter().cloned());
                    }
                    i += len;
                }
                None => {
                    debug!("{}: no grapheme at {:?}", self.id, word[i]);
                    i += 1;
                }
            }
        }

        phonemes
    }
}

/// Split one CSV row on commas. Double-quoted fields may contain commas and
/// `""` escapes.
fn split_row(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut quoted = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if quoted && chars.peek() == Some(&'"') => {
                field.push('"');
                chars.next();
            }
            '"' => quoted = !quoted,
            ',' if !quoted => fields.push(std::mem::take(&mut field)),
            c => field.push(c),
        }
    }
    fields.push(field);

    fields
}

/// Ids of the tables in `<lang_dir>/g2p`, sorted.
pub fn table_ids<P: AsRef<Path>>(lang_dir: P) -> Result<Vec<String>> {
    let dir = lang_dir.as_ref().join(G2P_DIR);
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut ids = Vec::new();
    for entry in fs::read_dir(&dir).map_err(|e| PhoneticError::io(&dir, e))? {
        let path = entry.map_err(|e| PhoneticError::io(&dir, e))?.path();
        if path.extension().is_some_and(|ext| ext == "csv") {
            if let Some(stem) = path.file_stem() {
                ids.push(stem.to_string_lossy().into_owned());
            }
        }
    }
    ids.sort();

    Ok(ids)
}

/// Read the g2p table for `lang_id` from a language directory.
///
/// With a `script`, reads `g2p/<lang_id>-<script>.csv`. Without one, reads
/// the first table id in sorted order.
///
/// # Errors
///
/// `ResourceUnavailable` when the requested table, or any table, is
/// missing.
pub fn read_g2p_dir<P: AsRef<Path>>(
    lang_dir: P,
    lang_id: &str,
    script: Option<&str>,
    table: &FeatureTable,
) -> Result<G2pTable> {
    let lang_dir = lang_dir.as_ref();

    let path: PathBuf = match script {
        Some(script) => lang_dir.join(G2P_DIR).join(format!("{lang_id}-{script}.csv")),
        None => {
            let ids = table_ids(lang_dir)?;
            let first = ids.first().ok_or_else(|| PhoneticError::ResourceUnavailable {
                path: lang_dir.join(G2P_DIR),
                reason: format!("no g2p table for {lang_id}"),
            })?;
            if ids.len() > 1 {
                info!("{lang_id} has g2p tables {ids:?}, using {first}");
            }
            lang_dir.join(G2P_DIR).join(format!("{first}.csv"))
        }
    };

    G2pTable::read(path, table)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPA: &str = "Orth,Phon\n\
                       b,b\n\
                       ch,t͡ʃ\n\
                       c,k\n\
                       c,θ\n\
                       h,\n\
                       \"qu\",k\n\
                       a,a\n\
                       á,a˥\n";

    fn spa() -> G2pTable {
        G2pTable::parse("spa-Latn", SPA, &FeatureTable::shared()).unwrap()
    }

    #[test]
    fn test_parse_entries() {
        let g2p = spa();
        assert_eq!(g2p.id(), "spa-Latn");
        assert_eq!(g2p.phones("b"), vec!["b"]);
        assert_eq!(g2p.phones("c"), vec!["k", "θ"]);
        assert_eq!(g2p.alternatives("c").len(), 2);
        assert_eq!(g2p.alternatives("h"), &[Vec::<String>::new()]);
        assert!(g2p.alternatives("z").is_empty());
    }

    #[test]
    fn test_phonemes_composed_and_toneless() {
        let g2p = spa();
        assert_eq!(g2p.phones("á"), vec!["a"]);
        // decomposed lookup finds the composed grapheme
        assert_eq!(g2p.phones("a\u{0301}"), vec!["a"]);
        assert_eq!(g2p.phones("ch"), vec!["t͡ʃ".nfc().collect::<String>()]);
    }

    #[test]
    fn test_transliterate_longest_grapheme() {
        let g2p = spa();
        let chico = g2p.transliterate("chica");
        assert_eq!(chico[0], "t͡ʃ".nfc().collect::<String>());
        assert_eq!(&chico[1..], ["k", "a"]);
        assert_eq!(g2p.transliterate("queb"), vec!["k", "b"]);
        assert_eq!(g2p.transliterate("hab"), vec!["a", "b"]);
    }

    #[test]
    fn test_bad_header_rejected() {
        let err = G2pTable::parse("x", "Graph,Phon\nb,b\n", &FeatureTable::shared()).unwrap_err();
        assert!(matches!(err, PhoneticError::MalformedRecord { line: 1, .. }));
    }

    #[test]
    fn test_bad_row_rejected() {
        let err = G2pTable::parse("x", "Orth,Phon\nb,b\nc,k,s\n", &FeatureTable::shared()).unwrap_err();
        assert!(matches!(err, PhoneticError::MalformedRecord { line: 3, .. }));
    }

    #[test]
    fn test_split_row_quotes() {
        assert_eq!(split_row("a,b"), vec!["a", "b"]);
        assert_eq!(split_row("\",\",k"), vec![",", "k"]);
        assert_eq!(split_row("\"a\"\"b\",c"), vec!["a\"b", "c"]);
        assert_eq!(split_row("h,"), vec!["h", ""]);
    }

    #[test]
    fn test_read_g2p_dir() {
        let dir = tempfile::tempdir().unwrap();
        let g2p_dir = dir.path().join(G2P_DIR);
        fs::create_dir(&g2p_dir).unwrap();
        fs::write(g2p_dir.join("spa-Latn.csv"), SPA).unwrap();
        fs::write(g2p_dir.join("spa-Brai.csv"), "Orth,Phon\n⠃,b\n").unwrap();

        let table = FeatureTable::shared();
        assert_eq!(table_ids(dir.path()).unwrap(), vec!["spa-Brai", "spa-Latn"]);

        let first = read_g2p_dir(dir.path(), "spa", None, &table).unwrap();
        assert_eq!(first.id(), "spa-Brai");
        let latin = read_g2p_dir(dir.path(), "spa", Some("Latn"), &table).unwrap();
        assert_eq!(latin.phones("b"), vec!["b"]);

        let missing = read_g2p_dir(dir.path(), "spa", Some("Cyrl"), &table).unwrap_err();
        assert!(matches!(missing, PhoneticError::ResourceUnavailable { .. }));
        let none = read_g2p_dir(dir.path().join("nowhere"), "spa", None, &table).unwrap_err();
        assert!(matches!(none, PhoneticError::ResourceUnavailable { .. }));
    }
}
