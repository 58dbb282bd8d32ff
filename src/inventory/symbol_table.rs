//! Ordered, 0-indexed symbol tables with reserved blank and end markers.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::Path;

use log::warn;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::{PhoneticError, Result};
use crate::resource::read_resource;

/// Reserved blank symbol, always index 0.
pub const BLANK: &str = "<blk>";

/// Reserved end-of-sequence symbol, always the last index.
pub const EOS: &str = "<eos>";

/// Bidirectional symbol ↔ index mapping.
///
/// Index 0 is [`BLANK`] and the highest index is [`EOS`]. Indices between
/// them may be sparse when read from a file with explicit ids.
#[derive(Clone, PartialEq, Eq)]
pub struct SymbolTable {
    symbol_to_id: FxHashMap<String, usize>,
    id_to_symbol: BTreeMap<usize, String>,
}

impl SymbolTable {
    /// `symbol_to_id` must hold neither reserved marker and only distinct,
    /// non-zero ids. `eos` is kept when it lies above every other id.
    fn from_map(mut symbol_to_id: FxHashMap<String, usize>, eos: Option<usize>) -> Self {
        let max = symbol_to_id.values().copied().max().unwrap_or(0);
        let eos = eos.filter(|&id| id > max).unwrap_or(max + 1);

        symbol_to_id.insert(BLANK.to_string(), 0);
        symbol_to_id.insert(EOS.to_string(), eos);

        let id_to_symbol = symbol_to_id
            .iter()
            .map(|(s, &i)| (i, s.clone()))
            .collect();

        Self {
            symbol_to_id,
            id_to_symbol,
        }
    }

    /// Build a table from a flat symbol list.
    ///
    /// Symbols are sorted and deduplicated, numbered from 1, and followed by
    /// [`EOS`]. Empty strings and the reserved markers are ignored.
    pub fn from_symbols<I, S>(symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut units: Vec<String> = symbols
            .into_iter()
            .map(|s| s.as_ref().trim().to_string())
            .filter(|s| !s.is_empty() && s != BLANK && s != EOS)
            .collect();
        units.sort();
        units.dedup();

        let map = units
            .into_iter()
            .enumerate()
            .map(|(i, s)| (s, i + 1))
            .collect();

        Self::from_map(map, None)
    }

    /// Parse a unit file: one symbol per line, optionally followed by an
    /// explicit index.
    ///
    /// Implicit indices continue from the previous accepted line's index.
    /// The reserved markers keep their places: `<blk>` lines are ignored and
    /// an explicit `<eos>` index is kept only when it is the largest. Lines
    /// that are not one or two fields, claim index 0, repeat a symbol or
    /// reuse an index are skipped with a warning.
    pub fn parse(source_name: &str, text: &str) -> Self {
        let mut map: FxHashMap<String, usize> = FxHashMap::default();
        let mut taken: FxHashSet<usize> = FxHashSet::default();
        let mut eos: Option<(usize, usize)> = None;
        let mut idx = 0usize;

        for (line_no, line) in text.lines().enumerate() {
            let malformed =
                |reason: String| warn!("{}", PhoneticError::malformed(source_name, line_no + 1, reason));
            let fields: Vec<&str> = line.split_whitespace().collect();

            let (unit, id) = match fields.as_slice() {
                [] => continue,
                [unit] => (*unit, None),
                [unit, explicit] => match explicit.parse::<usize>() {
                    Ok(id) => (*unit, Some(id)),
                    Err(_) => {
                        malformed(format!("index {explicit:?} is not a number"));
                        continue;
                    }
                },
                _ => {
                    malformed(format!("expected 1 or 2 fields, found {}", fields.len()));
                    continue;
                }
            };

            if unit == BLANK {
                if id.is_some_and(|id| id != 0) {
                    malformed(format!("{BLANK} is reserved for index 0"));
                }
                continue;
            }

            let id = id.unwrap_or(idx + 1);
            if id == 0 {
                malformed(format!("index 0 of {unit:?} is reserved for {BLANK}"));
                continue;
            }
            if unit == EOS {
                eos = Some((id, line_no + 1));
                idx = id;
                continue;
            }
            if map.contains_key(unit) {
                malformed(format!("duplicate symbol {unit:?}"));
                continue;
            }
            if !taken.insert(id) {
                malformed(format!("index {id} of {unit:?} is already taken"));
                continue;
            }

            map.insert(unit.to_string(), id);
            idx = id;
        }

        let max = map.values().copied().max().unwrap_or(0);
        if let Some((id, line)) = eos.filter(|&(id, _)| id <= max) {
            warn!(
                "{}",
                PhoneticError::malformed(
                    source_name,
                    line,
                    format!("{EOS} index {id} is not above {max}, using {}", max + 1),
                )
            );
        }

        Self::from_map(map, eos.map(|(id, _)| id))
    }

    /// Read a unit file from disk.
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = read_resource(path)?;
        Ok(Self::parse(&path.display().to_string(), &text))
    }

    /// Write the non-reserved symbols, one per line, in index order.
    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let mut file = fs::File::create(path).map_err(|e| PhoneticError::io(path, e))?;
        for unit in self.units() {
            writeln!(file, "{unit}").map_err(|e| PhoneticError::io(path, e))?;
        }
        Ok(())
    }

    /// Number of symbols including the reserved markers.
    pub fn len(&self) -> usize {
        self.id_to_symbol.len()
    }

    /// Whether the table holds only the reserved markers.
    pub fn is_empty(&self) -> bool {
        self.len() <= 2
    }

    /// Whether `symbol` is in the table (reserved markers included).
    #[inline]
    pub fn contains(&self, symbol: &str) -> bool {
        self.symbol_to_id.contains_key(symbol)
    }

    /// Index of `symbol`.
    pub fn id(&self, symbol: &str) -> Option<usize> {
        self.symbol_to_id.get(symbol).copied()
    }

    /// Symbol at `id`.
    pub fn symbol(&self, id: usize) -> Option<&str> {
        self.id_to_symbol.get(&id).map(String::as_str)
    }

    /// Indices of a symbol sequence; `None` if any symbol is unknown.
    pub fn atoi<S: AsRef<str>>(&self, symbols: &[S]) -> Option<Vec<usize>> {
        symbols.iter().map(|s| self.id(s.as_ref())).collect()
    }

    /// Symbols of an index sequence; `None` if any index is unknown.
    pub fn itoa(&self, ids: &[usize]) -> Option<Vec<&str>> {
        ids.iter().map(|&i| self.symbol(i)).collect()
    }

    /// All symbols in index order, reserved markers included.
    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.id_to_symbol.values().map(String::as_str)
    }

    /// Non-reserved symbols in index order.
    pub fn units(&self) -> impl Iterator<Item = &str> {
        self.symbols().filter(|s| *s != BLANK && *s != EOS)
    }
}

impl fmt::Debug for SymbolTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.symbols()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_symbols_reserved_ends() {
        let table = SymbolTable::from_symbols(["t", "a", "t", "k"]);
        let symbols: Vec<_> = table.symbols().collect();
        assert_eq!(symbols, vec![BLANK, "a", "k", "t", EOS]);
        assert_eq!(table.id(BLANK), Some(0));
        assert_eq!(table.id(EOS), Some(4));
        assert_eq!(table.units().collect::<Vec<_>>(), vec!["a", "k", "t"]);
    }

    #[test]
    fn test_parse_implicit_and_explicit_indices() {
        let table = SymbolTable::parse("phone.txt", "a\nb 5\nc\n");
        assert_eq!(table.id("a"), Some(1));
        assert_eq!(table.id("b"), Some(5));
        assert_eq!(table.id("c"), Some(6));
        assert_eq!(table.id(EOS), Some(7));
    }

    #[test]
    fn test_parse_explicit_eos_kept() {
        let table = SymbolTable::parse("phone.txt", "a\n<eos> 9\n");
        assert_eq!(table.id(EOS), Some(9));
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_parse_skips_malformed_lines() {
        let table = SymbolTable::parse("phone.txt", "a\nb c d\nx y\ne\n");
        assert!(!table.contains("b"));
        assert!(!table.contains("x"));
        assert_eq!(table.id("e"), Some(2));
    }

    fn assert_consistent(table: &SymbolTable) {
        assert_eq!(table.symbol(0), Some(BLANK));
        let max = table.symbols().filter_map(|s| table.id(s)).max();
        assert_eq!(table.id(EOS), max);
        for symbol in table.symbols() {
            let id = table.id(symbol).unwrap();
            assert_eq!(table.symbol(id), Some(symbol));
        }
    }

    #[test]
    fn test_parse_index_zero_stays_blank() {
        let table = SymbolTable::parse("phone.txt", "a 0\nb\nc\n");
        assert_consistent(&table);
        assert!(!table.contains("a"));
        assert_eq!(table.symbols().collect::<Vec<_>>(), vec![BLANK, "b", "c", EOS]);
        assert_eq!(table.id(EOS), Some(3));
    }

    #[test]
    fn test_parse_low_eos_moves_last() {
        let table = SymbolTable::parse("phone.txt", "a\nb\n<eos> 1\n");
        assert_consistent(&table);
        assert_eq!(table.id("a"), Some(1));
        assert_eq!(table.id(EOS), Some(3));
        assert_eq!(table.symbols().last(), Some(EOS));
    }

    #[test]
    fn test_parse_rejects_index_collision() {
        let table = SymbolTable::parse("phone.txt", "a 3\nb 3\n");
        assert_consistent(&table);
        assert!(!table.contains("b"));
        assert_eq!(table.id("a"), Some(3));
        assert_eq!(table.symbol(3), Some("a"));
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_parse_reserved_lines_ignored() {
        let table = SymbolTable::parse("phone.txt", "<blk> 0\na\na\nb\n");
        assert_consistent(&table);
        assert_eq!(table.id("a"), Some(1));
        assert_eq!(table.id("b"), Some(2));
    }

    #[test]
    fn test_atoi_itoa() {
        let table = SymbolTable::from_symbols(["a", "b"]);
        assert_eq!(table.atoi(&["b", "a"]), Some(vec![2, 1]));
        assert_eq!(table.atoi(&["z"]), None);
        assert_eq!(table.itoa(&[1, 2]), Some(vec!["a", "b"]));
    }
}
