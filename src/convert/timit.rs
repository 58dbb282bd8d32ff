//! TIMIT phone labels to IPA.
//!
//! Each TIMIT label is first folded onto an ARPAbet symbol and then expanded
//! with [`ArpaConverter`]. Closures, pauses and silence fold onto `sil` and
//! the glottal stop marker `q` onto nothing; both are dropped from the
//! output.

use log::warn;
use rustc_hash::FxHashMap;

use super::ArpaConverter;
use crate::error::{PhoneticError, Result};

const BUNDLED_TIMIT: &str = include_str!("../../data/timit.tsv");

/// Folded label for silence and closures.
pub const SILENCE: &str = "sil";

/// Placeholder for labels with no phonetic content.
const NO_PHONE: &str = "-";

/// Lookup from lowercase TIMIT labels to IPA.
#[derive(Debug, Clone)]
pub struct TimitConverter {
    /// `None` for labels that produce no phone.
    map: FxHashMap<String, Option<String>>,
    arpa: ArpaConverter,
}

impl TimitConverter {
    /// Parse a two-column `timit arpa` table, expanding through `arpa`.
    ///
    /// An ARPAbet column of `-` or `sil` marks a label that is dropped.
    /// Rows without exactly two fields are skipped with a warning.
    pub fn parse(source_name: &str, text: &str, arpa: ArpaConverter) -> Self {
        let mut map = FxHashMap::default();

        for (idx, line) in text.lines().enumerate() {
            let fields: Vec<&str> = line.split_whitespace().collect();
            match fields.as_slice() {
                [] => {}
                [timit, folded] => {
                    let folded = match *folded {
                        NO_PHONE | SILENCE => None,
                        other => Some(other.to_lowercase()),
                    };
                    map.insert(timit.to_lowercase(), folded);
                }
                _ => warn!(
                    "{}",
                    PhoneticError::malformed(source_name, idx + 1, "expected `timit arpa`")
                ),
            }
        }

        Self { map, arpa }
    }

    /// The bundled 61-label TIMIT table over the bundled ARPAbet table.
    pub fn bundled() -> Self {
        Self::parse("timit.tsv", BUNDLED_TIMIT, ArpaConverter::bundled())
    }

    /// Number of known TIMIT labels.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// IPA expansion of one label, case-insensitive.
    ///
    /// Returns `None` for unknown labels and `Some(&[])` for labels that
    /// carry no phone.
    pub fn lookup(&self, label: &str) -> Option<&[String]> {
        match self.map.get(&label.to_lowercase())? {
            Some(arpa) => self.arpa.lookup(arpa),
            None => Some(&[]),
        }
    }

    /// Convert a label sequence; unknown labels are skipped with a warning.
    pub fn convert<S: AsRef<str>>(&self, labels: &[S]) -> Vec<String> {
        let mut ipa = Vec::with_capacity(labels.len());
        for label in labels {
            let label = label.as_ref();
            if label.is_empty() {
                continue;
            }
            match self.lookup(label) {
                Some(symbols) => ipa.extend(symbols.iter().cloned()),
                None => warn!("{label:?} is not a TIMIT phone"),
            }
        }
        ipa
    }

    /// Split `text` on whitespace and [`convert`](Self::convert).
    pub fn convert_text(&self, text: &str) -> Vec<String> {
        let labels: Vec<&str> = text.split_whitespace().collect();
        self.convert(&labels)
    }

    /// Like [`convert`](Self::convert), but fails on the first unknown
    /// label.
    pub fn try_convert<S: AsRef<str>>(&self, labels: &[S]) -> Result<Vec<String>> {
        let mut ipa = Vec::with_capacity(labels.len());
        for label in labels {
            let label = label.as_ref();
            let symbols = self
                .lookup(label)
                .ok_or_else(|| PhoneticError::SymbolNotFound(label.to_string()))?;
            ipa.extend(symbols.iter().cloned());
        }
        Ok(ipa)
    }
}

impl Default for TimitConverter {
    fn default() -> Self {
        Self::bundled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_labels() {
        let timit = TimitConverter::bundled();
        assert_eq!(timit.len(), 61);
        for label in ["bcl", "h#", "pau", "q"] {
            assert_eq!(timit.lookup(label), Some(&[][..]), "{label}");
        }
    }

    #[test]
    fn test_closures_and_silence_dropped() {
        let timit = TimitConverter::bundled();
        assert_eq!(timit.convert_text("h# kcl k ae tcl t h#"), vec!["k", "æ", "t"]);
        assert_eq!(timit.convert(&["q", "aa"]), vec!["ɑ"]);
    }

    #[test]
    fn test_folded_labels() {
        let timit = TimitConverter::bundled();
        let arpa = ArpaConverter::bundled();
        assert_eq!(timit.lookup("HV"), arpa.lookup("hh"));
        assert_eq!(timit.lookup("eng"), arpa.lookup("ng"));
        assert_eq!(timit.lookup("ax-h"), arpa.lookup("ax"));
    }

    #[test]
    fn test_unknown_labels() {
        let timit = TimitConverter::bundled();
        assert_eq!(timit.convert(&["k", "xx", "t"]), vec!["k", "t"]);
        let err = timit.try_convert(&["k", "xx"]).unwrap_err();
        assert!(matches!(err, PhoneticError::SymbolNotFound(s) if s == "xx"));
    }

    #[test]
    fn test_parse_custom_table() {
        let arpa = ArpaConverter::parse("a.csv", "k,k\naa,ɑ\n");
        let timit = TimitConverter::parse("t.tsv", "k k\nkcl sil\nbroken row here\nxx qq\n", arpa);
        assert_eq!(timit.len(), 3);
        assert_eq!(timit.convert_text("kcl k"), vec!["k"]);
        // folds onto an ARPAbet symbol the converter does not know
        assert_eq!(timit.lookup("xx"), None);
    }
}
