//! ARPAbet to IPA conversion.

use log::warn;
use rustc_hash::FxHashMap;

use crate::error::{PhoneticError, Result};

const BUNDLED_ARPABET: &str = include_str!("../../data/arpabet.csv");

/// Lookup table from lowercase ARPAbet symbols to IPA symbol sequences.
#[derive(Debug, Clone)]
pub struct ArpaConverter {
    map: FxHashMap<String, Vec<String>>,
}

impl ArpaConverter {
    /// Parse an `arpa,ipa [ipa ...]` table. Rows without both fields are
    /// skipped with a warning.
    pub fn parse(source_name: &str, text: &str) -> Self {
        let mut map = FxHashMap::default();

        for (idx, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }

            match line.split_once(',') {
                Some((arpa, ipa)) if !arpa.trim().is_empty() && !ipa.trim().is_empty() => {
                    let symbols = ipa.split_whitespace().map(str::to_string).collect();
                    map.insert(arpa.trim().to_lowercase(), symbols);
                }
                _ => warn!(
                    "{}",
                    PhoneticError::malformed(source_name, idx + 1, "expected `arpa,ipa`")
                ),
            }
        }

        Self { map }
    }

    /// The bundled CMU-style ARPAbet table.
    pub fn bundled() -> Self {
        Self::parse("arpabet.csv", BUNDLED_ARPABET)
    }

    /// Number of known ARPAbet symbols.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// IPA expansion of a single ARPAbet symbol.
    ///
    /// One trailing stress digit is ignored and matching is
    /// case-insensitive.
    pub fn lookup(&self, arpa: &str) -> Option<&[String]> {
        let stripped = arpa
            .strip_suffix(|c: char| c.is_ascii_digit())
            .unwrap_or(arpa);
        self.map.get(&stripped.to_lowercase()).map(Vec::as_slice)
    }

    /// Convert a token sequence; unknown tokens are skipped with a warning.
    pub fn convert<S: AsRef<str>>(&self, tokens: &[S]) -> Vec<String> {
        let mut ipa = Vec::with_capacity(tokens.len());
        for token in tokens {
            let token = token.as_ref();
            if token.is_empty() {
                continue;
            }
            match self.lookup(token) {
                Some(symbols) => ipa.extend(symbols.iter().cloned()),
                None => warn!("unknown ARPAbet symbol {token:?}"),
            }
        }
        ipa
    }

    /// Split `text` on whitespace and [`convert`](Self::convert).
    pub fn convert_text(&self, text: &str) -> Vec<String> {
        let tokens: Vec<&str> = text.split_whitespace().collect();
        self.convert(&tokens)
    }

    /// Like [`convert`](Self::convert), but fails on the first unknown
    /// token.
    pub fn try_convert<S: AsRef<str>>(&self, tokens: &[S]) -> Result<Vec<String>> {
        let mut ipa = Vec::with_capacity(tokens.len());
        for token in tokens {
            let token = token.as_ref();
            let symbols = self
                .lookup(token)
                .ok_or_else(|| PhoneticError::SymbolNotFound(token.to_string()))?;
            ipa.extend(symbols.iter().cloned());
        }
        Ok(ipa)
    }
}

impl Default for ArpaConverter {
    fn default() -> Self {
        Self::bundled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_table() {
        let arpa = ArpaConverter::bundled();
        assert!(arpa.len() >= 39);
        assert_eq!(arpa.lookup("AA"), Some(&["ɑ".to_string()][..]));
    }

    #[test]
    fn test_convert_strips_stress() {
        let arpa = ArpaConverter::bundled();
        assert_eq!(arpa.convert_text("K AE1 T"), vec!["k", "æ", "t"]);
        assert_eq!(arpa.convert(&["aw0"]), vec!["a", "ʊ"]);
    }

    #[test]
    fn test_unknown_tokens_skipped() {
        let arpa = ArpaConverter::bundled();
        assert_eq!(arpa.convert(&["k", "qq", "t"]), vec!["k", "t"]);
        assert!(arpa.try_convert(&["qq"]).is_err());
    }

    #[test]
    fn test_parse_skips_malformed_rows() {
        let arpa = ArpaConverter::parse("x.csv", "aa,ɑ\nbroken\nb,\niy,i\n");
        assert_eq!(arpa.len(), 2);
    }
}
