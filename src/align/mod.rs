//! Edit-distance alignment of phonetic sequences.
//!
//! All algorithms work over slices of any `PartialEq` token type and fill a
//! full `O(|a|·|b|)` dynamic-programming grid, except [`edit_distance`] which
//! keeps only two rows.
//!
//! - [`align`]: Levenshtein distance with an operation trace
//! - [`fuzzy_match`]: best-matching substring of a text for a pattern
//! - [`grouped_align`]: per-category error attribution
//! - [`weighted_edit_distance`] and [`phonological_distance`]: substitution
//!   costs from feature similarity
//! - [`ErrorRate`]: corpus-level accumulation of alignments
//!
//! # Example
//!
//! ```rust
//! use allophony::align::{align, edit_distance, EditOp};
//!
//! let reference: Vec<char> = "kitten".chars().collect();
//! let hypothesis: Vec<char> = "sitting".chars().collect();
//!
//! assert_eq!(edit_distance(&reference, &hypothesis), 3);
//!
//! let alignment = align(&reference, &hypothesis);
//! assert_eq!(alignment.cost, 3);
//! assert_eq!(alignment.substitutions(), 2);
//! assert_eq!(alignment.insertions(), 1);
//! assert_eq!(alignment.steps[0].op, EditOp::Substitute);
//! ```

mod fuzzy;
mod grouped;
mod rate;
mod trace;
mod weighted;

use serde::Serialize;

pub use fuzzy::{fuzzy_match, FuzzyMatch};
pub use grouped::{grouped_align, GroupCount, GroupedAlignment};
pub use rate::ErrorRate;
pub use trace::{align, Alignment, Step};
pub use weighted::{phonological_distance, weighted_edit_distance};

/// A single edit operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EditOp {
    /// Reference and hypothesis tokens are equal.
    Match,
    /// Reference token replaced by a different hypothesis token.
    Substitute,
    /// Hypothesis token with no reference counterpart.
    Insert,
    /// Reference token with no hypothesis counterpart.
    Delete,
}

impl EditOp {
    /// Short label used in rendered alignments; empty for matches.
    pub fn label(self) -> &'static str {
        match self {
            EditOp::Match => "",
            EditOp::Substitute => "Sub",
            EditOp::Insert => "Add",
            EditOp::Delete => "Del",
        }
    }

    /// Whether the operation contributes to the edit cost.
    #[inline]
    pub fn is_error(self) -> bool {
        !matches!(self, EditOp::Match)
    }
}

/// Predecessor of a grid cell during traceback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Move {
    /// Origin, or a free start in the fuzzy grid
    Stop,
    /// `(i - 1, j - 1)`
    Diagonal,
    /// `(i - 1, j)`
    Up,
    /// `(i, j - 1)`
    Left,
}

/// Row-major DP grid of `rows × cols` cells.
#[derive(Debug, Clone)]
pub(crate) struct Grid<V> {
    cols: usize,
    cells: Vec<V>,
}

impl<V: Copy> Grid<V> {
    pub(crate) fn new(rows: usize, cols: usize, fill: V) -> Self {
        Self {
            cols,
            cells: vec![fill; rows * cols],
        }
    }

    #[inline(always)]
    pub(crate) fn get(&self, i: usize, j: usize) -> V {
        self.cells[i * self.cols + j]
    }

    #[inline(always)]
    pub(crate) fn set(&mut self, i: usize, j: usize, value: V) {
        self.cells[i * self.cols + j] = value;
    }
}

/// Levenshtein distance between two token sequences.
///
/// Space-optimized dynamic programming over two rows; use [`align`] when
/// the operations themselves are needed.
pub fn edit_distance<T: PartialEq>(a: &[T], b: &[T]) -> usize {
    let m = a.len();
    let n = b.len();

    if m == 0 {
        return n;
    }
    if n == 0 {
        return m;
    }

    let mut prev_row: Vec<usize> = (0..=n).collect();
    let mut curr_row = vec![0; n + 1];

    for i in 1..=m {
        curr_row[0] = i;

        for j in 1..=n {
            let cost = usize::from(a[i - 1] != b[j - 1]);

            curr_row[j] = (prev_row[j] + 1) // deletion
                .min(curr_row[j - 1] + 1) // insertion
                .min(prev_row[j - 1] + cost); // substitution
        }

        std::mem::swap(&mut prev_row, &mut curr_row);
    }

    prev_row[n]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn test_edit_distance_identical() {
        assert_eq!(edit_distance(&chars("test"), &chars("test")), 0);
        assert_eq!(edit_distance::<char>(&[], &[]), 0);
    }

    #[test]
    fn test_edit_distance_empty() {
        assert_eq!(edit_distance(&[], &chars("test")), 4);
        assert_eq!(edit_distance(&chars("test"), &[]), 4);
    }

    #[test]
    fn test_edit_distance_basic() {
        assert_eq!(edit_distance(&chars("kitten"), &chars("sitting")), 3);
        assert_eq!(edit_distance(&chars("saturday"), &chars("sunday")), 3);
        assert_eq!(edit_distance(&chars("test"), &chars("best")), 1);
    }

    #[test]
    fn test_edit_distance_over_symbols() {
        let a = ["kʰ", "æ", "t"];
        let b = ["k", "æ", "t", "s"];
        assert_eq!(edit_distance(&a, &b), 2);
    }

    #[test]
    fn test_labels() {
        assert_eq!(EditOp::Match.label(), "");
        assert_eq!(EditOp::Insert.label(), "Add");
        assert!(!EditOp::Match.is_error());
        assert!(EditOp::Delete.is_error());
    }
}
