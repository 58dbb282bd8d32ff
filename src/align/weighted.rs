//! Edit distance with graded substitution costs.

use crate::feature::FeatureTable;
use crate::similarity::SimilarityEngine;

/// Edit distance with unit insertion/deletion and caller-supplied
/// substitution cost.
///
/// `sub_cost` is consulted only for unequal tokens; equal tokens always
/// match at zero cost. Costs above 2 are never chosen over a deletion plus an
/// insertion.
pub fn weighted_edit_distance<T, F>(a: &[T], b: &[T], sub_cost: F) -> f64
where
    T: PartialEq,
    F: Fn(&T, &T) -> f64,
{
    let n = b.len();

    let mut prev_row: Vec<f64> = (0..=n).map(|j| j as f64).collect();
    let mut curr_row = vec![0.0; n + 1];

    for (i, x) in a.iter().enumerate() {
        curr_row[0] = (i + 1) as f64;

        for (j, y) in b.iter().enumerate() {
            let substitution = if x == y { 0.0 } else { sub_cost(x, y).max(0.0) };

            curr_row[j + 1] = (prev_row[j + 1] + 1.0)
                .min(curr_row[j] + 1.0)
                .min(prev_row[j] + substitution);
        }

        std::mem::swap(&mut prev_row, &mut curr_row);
    }

    prev_row[n]
}

/// Edit distance where substituting one symbol for another costs their
/// feature dissimilarity, `1 - similarity`.
///
/// Symbols the table cannot normalize have similarity 0, so substituting
/// them costs a full edit.
pub fn phonological_distance<S: AsRef<str> + PartialEq>(table: &FeatureTable, a: &[S], b: &[S]) -> f64 {
    let engine = SimilarityEngine::new(table);
    weighted_edit_distance(a, b, |x, y| 1.0 - engine.similarity(x.as_ref(), y.as_ref()))
}
