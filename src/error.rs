//! Error types shared by the feature model, inventories and loaders.

use std::path::PathBuf;

use thiserror::Error;

/// Which of an inventory's two symbol tables a symbol belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    /// Surface realization symbols (`phone.txt`).
    Phone,
    /// Contrastive unit symbols (`phoneme.txt`).
    Phoneme,
}

impl std::fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SymbolKind::Phone => write!(f, "phone"),
            SymbolKind::Phoneme => write!(f, "phoneme"),
        }
    }
}

/// Errors produced while loading or querying phonetic resources.
#[derive(Debug, Error)]
pub enum PhoneticError {
    /// A symbol could not be matched against the feature table, even after
    /// diacritic stripping.
    ///
    /// The public remapping API never returns this; it substitutes a
    /// documented fallback instead.
    #[error("cannot normalize phonetic symbol {0:?}")]
    SymbolNotFound(String),

    /// The allophone map references a symbol absent from its table.
    #[error("inventory {lang_id}: allophone map references unknown {kind} {symbol:?}")]
    InventoryInconsistent {
        /// Language the inventory was built for
        lang_id: String,
        /// Table that was expected to contain the symbol
        kind: SymbolKind,
        /// The offending symbol
        symbol: String,
    },

    /// A backing file or directory is missing and cannot be recovered.
    #[error("resource unavailable at {}: {reason}", path.display())]
    ResourceUnavailable {
        /// Path that was looked up
        path: PathBuf,
        /// Human-readable cause
        reason: String,
    },

    /// A table or lexicon row with the wrong shape.
    ///
    /// Loaders log and skip these; the variant exists so the warning has a
    /// uniform rendering.
    #[error("{source_name}:{line}: malformed record: {reason}")]
    MalformedRecord {
        /// File or stream the row came from
        source_name: String,
        /// 1-based line number
        line: usize,
        /// What was wrong with the row
        reason: String,
    },

    /// Reading or writing a file failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// Path being accessed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// A configuration file could not be parsed or written.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl PhoneticError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PhoneticError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn malformed(
        source_name: impl Into<String>,
        line: usize,
        reason: impl Into<String>,
    ) -> Self {
        PhoneticError::MalformedRecord {
            source_name: source_name.into(),
            line,
            reason: reason.into(),
        }
    }
}

/// A specialized `Result` type for phonetic operations.
pub type Result<T> = std::result::Result<T, PhoneticError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_record_display() {
        let err = PhoneticError::malformed("lexicon.txt", 12, "expected 2 fields, found 3");
        assert_eq!(
            err.to_string(),
            "lexicon.txt:12: malformed record: expected 2 fields, found 3"
        );
    }

    #[test]
    fn test_inconsistent_display_names_table() {
        let err = PhoneticError::InventoryInconsistent {
            lang_id: "eng".to_string(),
            kind: SymbolKind::Phone,
            symbol: "ɬ".to_string(),
        };
        assert!(err.to_string().contains("unknown phone \"ɬ\""));
    }
}
