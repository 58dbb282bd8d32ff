//! Parsers for feature-table and base-symbol files.

use log::warn;
use rustc_hash::FxHashSet;
use unicode_normalization::UnicodeNormalization;

use super::FeatureVector;
use crate::error::{PhoneticError, Result};

/// One parsed feature-table row.
#[derive(Debug, Clone)]
pub(crate) struct Row {
    pub symbol: String,
    pub vector: FeatureVector,
}

/// Parsed feature table before canonical classes are computed.
#[derive(Debug, Clone)]
pub(crate) struct ParsedTable {
    pub dimensions: Vec<String>,
    pub rows: Vec<Row>,
}

#[inline]
fn parse_value(field: &str) -> Option<i8> {
    match field.trim() {
        "+" => Some(1),
        "-" => Some(-1),
        "0" => Some(0),
        _ => None,
    }
}

/// Parse a comma-separated feature table.
///
/// The header names the dimensions; every later row is a symbol followed by
/// one `+`/`-`/`0` value per dimension. Rows of the wrong width or with an
/// unknown value are skipped with a warning. Symbols are stored in NFD.
pub(crate) fn parse_features(source_name: &str, text: &str) -> Result<ParsedTable> {
    let mut lines = text.lines().enumerate();

    let dimensions: Vec<String> = match lines.next() {
        Some((_, header)) => header
            .split(',')
            .skip(1)
            .map(|d| d.trim().to_string())
            .collect(),
        None => {
            return Err(PhoneticError::malformed(source_name, 1, "missing header row"));
        }
    };

    if dimensions.is_empty() {
        return Err(PhoneticError::malformed(
            source_name,
            1,
            "header declares no feature dimensions",
        ));
    }

    let mut rows = Vec::new();
    let mut seen = FxHashSet::default();

    for (idx, line) in lines {
        let line_no = idx + 1;
        if line.trim().is_empty() {
            continue;
        }

        let mut fields = line.split(',');
        let symbol: String = match fields.next() {
            Some(s) if !s.trim().is_empty() => s.trim().nfd().collect(),
            _ => {
                warn!("{}", PhoneticError::malformed(source_name, line_no, "empty symbol"));
                continue;
            }
        };

        let values: Vec<&str> = fields.collect();
        if values.len() != dimensions.len() {
            warn!(
                "{}",
                PhoneticError::malformed(
                    source_name,
                    line_no,
                    format!(
                        "expected {} feature values, found {}",
                        dimensions.len(),
                        values.len()
                    ),
                )
            );
            continue;
        }

        let parsed: Option<FeatureVector> = values.iter().map(|v| parse_value(v)).collect();
        let vector = match parsed {
            Some(v) => v,
            None => {
                warn!(
                    "{}",
                    PhoneticError::malformed(source_name, line_no, "feature value outside {+,-,0}")
                );
                continue;
            }
        };

        // first occurrence of a symbol wins
        if !seen.insert(symbol.clone()) {
            warn!(
                "{}",
                PhoneticError::malformed(
                    source_name,
                    line_no,
                    format!("duplicate symbol {symbol:?}")
                )
            );
            continue;
        }

        rows.push(Row { symbol, vector });
    }

    Ok(ParsedTable { dimensions, rows })
}

/// Parse a base-symbol list: one symbol per line, blank lines ignored.
pub(crate) fn parse_bases(text: &str) -> FxHashSet<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(|l| l.nfd().collect())
        .collect()
}
