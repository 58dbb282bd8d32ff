//! Unicode preparation applied before any feature-table lookup.
//!
//! Transcriptions from different sources disagree on composition and on a
//! handful of look-alike characters. Every lookup path (normalization and
//! tokenization) runs input through [`prepare`] first so that both agree on
//! the exact byte sequence they search for.

use smallvec::SmallVec;
use unicode_normalization::UnicodeNormalization;

/// Substitutions applied in order after canonical decomposition.
///
/// Keys and replacements are already in NFD form.
pub const SUBSTITUTIONS: &[(&str, &str)] = &[
    // ASCII colon for the length mark
    (":", "ː"),
    // apostrophe for the ejective mark
    ("'", "ʼ"),
    // ASCII g for the IPA voiced velar stop
    ("g", "ɡ"),
    ("ɡ\u{0325}", "k"),
    ("d\u{0325}", "t"),
    ("b\u{0325}", "b"),
];

/// Decompose `symbol` (NFD) and apply [`SUBSTITUTIONS`].
pub fn prepare(symbol: &str) -> String {
    let mut prepared: String = symbol.nfd().collect();
    for (from, to) in SUBSTITUTIONS {
        if prepared.contains(from) {
            prepared = prepared.replace(from, to);
        }
    }
    prepared
}

/// Byte offsets of every character start in `s`, followed by `s.len()`.
///
/// `&s[b[i]..b[j]]` is then the substring of characters `i..j`.
#[inline]
pub(crate) fn char_boundaries(s: &str) -> SmallVec<[usize; 16]> {
    let mut boundaries: SmallVec<[usize; 16]> = s.char_indices().map(|(i, _)| i).collect();
    boundaries.push(s.len());
    boundaries
}
