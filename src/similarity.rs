//! Weighted feature distance and nearest-symbol search.
//!
//! Distance between two feature vectors is the weighted L1 norm of their
//! difference:
//!
//! ```text
//! d(x, y) = Σ |x[i] - y[i]| · w[i]
//! ```
//!
//! Since each component lies in `{-1, 0, 1}`, `d` is bounded by `2 · Σ w`
//! and similarity is reported as `1 - d / (2 · Σ w)` in `[0, 1]`.

use std::cmp::Ordering;

use log::debug;

use crate::feature::FeatureTable;

/// Weighted L1 distance between two equally long feature slices.
///
/// Extra trailing dimensions on either side are ignored.
#[inline]
pub fn weighted_distance(a: &[i8], b: &[i8], weights: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .zip(weights)
        .map(|((x, y), w)| f64::from((x - y).unsigned_abs()) * w)
        .sum()
}

/// Convert a weighted distance to a similarity in `[0, 1]`.
///
/// A zero weight sum yields similarity 1 (every pair is indistinguishable).
#[inline]
pub fn similarity_from_distance(distance: f64, weight_sum: f64) -> f64 {
    if weight_sum <= 0.0 {
        return 1.0;
    }
    1.0 - distance / (2.0 * weight_sum)
}

/// How [`SimilarityEngine::resolve`] picked its answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resolution {
    /// The target was itself a candidate.
    Exact,
    /// The candidate with the smallest feature distance.
    Scored,
    /// No features to compare; the first candidate was taken.
    Fallback,
}

/// Similarity queries over a borrowed [`FeatureTable`].
#[derive(Debug, Clone, Copy)]
pub struct SimilarityEngine<'t> {
    table: &'t FeatureTable,
    weight_sum: f64,
}

impl<'t> SimilarityEngine<'t> {
    /// Create an engine over `table`.
    pub fn new(table: &'t FeatureTable) -> Self {
        Self {
            table,
            weight_sum: table.weight_sum(),
        }
    }

    /// The underlying table.
    pub fn table(&self) -> &'t FeatureTable {
        self.table
    }

    /// Weighted distance between two symbols after normalization.
    ///
    /// Returns `None` if either symbol cannot be normalized.
    pub fn distance(&self, a: &str, b: &str) -> Option<f64> {
        let a = self.table.normalize(a).ok()?;
        let b = self.table.normalize(b).ok()?;
        let va = self.table.vector_exact(a)?;
        let vb = self.table.vector_exact(b)?;
        Some(weighted_distance(va, vb, self.table.weights()))
    }

    /// Similarity in `[0, 1]`; 0 if either symbol cannot be normalized.
    pub fn similarity(&self, a: &str, b: &str) -> f64 {
        match self.distance(a, b) {
            Some(d) => similarity_from_distance(d, self.weight_sum),
            None => 0.0,
        }
    }

    /// The element of `candidates` most similar to `target`.
    ///
    /// - If `target` appears verbatim in `candidates` it is returned directly.
    /// - If `target` cannot be normalized, the first candidate is returned.
    /// - Otherwise every candidate is normalized and scored; candidates that
    ///   fail normalization are skipped and ties keep the earliest candidate.
    ///
    /// Returns `None` only for an empty candidate slice. Use
    /// [`resolve`](Self::resolve) to tell a scored answer from a fallback.
    pub fn most_similar<'c, S: AsRef<str>>(
        &self,
        target: &str,
        candidates: &'c [S],
    ) -> Option<&'c str> {
        self.resolve(target, candidates).map(|(found, _)| found)
    }

    /// [`most_similar`](Self::most_similar) together with how the answer
    /// was reached.
    pub fn resolve<'c, S: AsRef<str>>(
        &self,
        target: &str,
        candidates: &'c [S],
    ) -> Option<(&'c str, Resolution)> {
        let first = candidates.first()?.as_ref();

        if let Some(exact) = candidates.iter().find(|c| c.as_ref() == target) {
            return Some((exact.as_ref(), Resolution::Exact));
        }

        let Some(target_vector) = self
            .table
            .normalize(target)
            .ok()
            .and_then(|norm| self.table.vector_exact(norm))
        else {
            debug!("no features for {target:?}, falling back to first candidate {first:?}");
            return Some((first, Resolution::Fallback));
        };

        let weights = self.table.weights();
        let mut best = first;
        let mut best_distance = f64::INFINITY;

        for candidate in candidates {
            let candidate = candidate.as_ref();
            let Ok(norm) = self.table.normalize(candidate) else {
                continue;
            };
            let Some(vector) = self.table.vector_exact(norm) else {
                continue;
            };

            let d = weighted_distance(target_vector, vector, weights);
            if d < best_distance {
                best = candidate;
                best_distance = d;
            }
        }

        if best_distance.is_infinite() {
            debug!("no candidate of {target:?} has features, falling back to {first:?}");
            return Some((first, Resolution::Fallback));
        }

        Some((best, Resolution::Scored))
    }

    /// Every normalizable candidate paired with its similarity to `target`,
    /// most similar first. Equal scores keep candidate order.
    pub fn ranked<'c, S: AsRef<str>>(&self, target: &str, candidates: &'c [S]) -> Vec<(&'c str, f64)> {
        let mut scored: Vec<(&'c str, f64)> = candidates
            .iter()
            .map(AsRef::as_ref)
            .filter(|c| self.table.contains(c))
            .map(|c| (c, self.similarity(target, c)))
            .collect();

        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        scored
    }
}
