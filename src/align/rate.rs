//! Corpus-level error accounting.

use std::fmt::Display;

use rustc_hash::FxHashMap;

use super::{Alignment, EditOp};

/// Running totals over many reference/hypothesis pairs.
///
/// Feed it either full alignments ([`add_alignment`](Self::add_alignment))
/// or bare edit costs ([`add_cost`](Self::add_cost)) when operation
/// breakdowns are not needed.
#[derive(Debug, Clone, Default)]
pub struct ErrorRate {
    utterances: usize,
    errors: usize,
    reference_len: usize,
    insertions: usize,
    deletions: usize,
    substitutions: usize,
    distance: f64,
    inserted: FxHashMap<String, usize>,
    deleted: FxHashMap<String, usize>,
    substituted: FxHashMap<(String, String), usize>,
}

impl ErrorRate {
    /// Empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one aligned utterance, including its per-token counters.
    pub fn add_alignment<T: Display>(&mut self, alignment: &Alignment<T>) {
        self.utterances += 1;
        self.errors += alignment.cost;

        for step in &alignment.steps {
            if step.reference.is_some() {
                self.reference_len += 1;
            }

            match (step.op, &step.reference, &step.hypothesis) {
                (EditOp::Insert, _, Some(h)) => {
                    self.insertions += 1;
                    *self.inserted.entry(h.to_string()).or_default() += 1;
                }
                (EditOp::Delete, Some(r), _) => {
                    self.deletions += 1;
                    *self.deleted.entry(r.to_string()).or_default() += 1;
                }
                (EditOp::Substitute, Some(r), Some(h)) => {
                    self.substitutions += 1;
                    *self
                        .substituted
                        .entry((r.to_string(), h.to_string()))
                        .or_default() += 1;
                }
                _ => {}
            }
        }
    }

    /// Add one utterance known only by its edit cost and reference length.
    pub fn add_cost(&mut self, cost: usize, reference_len: usize) {
        self.utterances += 1;
        self.errors += cost;
        self.reference_len += reference_len;
    }

    /// Add a graded (phonological) distance to the running distance total.
    pub fn add_distance(&mut self, distance: f64) {
        self.distance += distance;
    }

    /// Number of utterances added.
    pub fn utterances(&self) -> usize {
        self.utterances
    }

    /// Total edit cost.
    pub fn errors(&self) -> usize {
        self.errors
    }

    /// Total reference length.
    pub fn reference_len(&self) -> usize {
        self.reference_len
    }

    /// Total insertions.
    pub fn insertions(&self) -> usize {
        self.insertions
    }

    /// Total deletions.
    pub fn deletions(&self) -> usize {
        self.deletions
    }

    /// Total substitutions.
    pub fn substitutions(&self) -> usize {
        self.substitutions
    }

    /// Total graded distance.
    pub fn distance(&self) -> f64 {
        self.distance
    }

    fn per_token(&self, count: f64) -> Option<f64> {
        (self.reference_len > 0).then(|| count / self.reference_len as f64)
    }

    /// Errors per reference token; `None` when nothing has been added.
    pub fn rate(&self) -> Option<f64> {
        self.per_token(self.errors as f64)
    }

    /// Insertions per reference token.
    pub fn insertion_rate(&self) -> Option<f64> {
        self.per_token(self.insertions as f64)
    }

    /// Deletions per reference token.
    pub fn deletion_rate(&self) -> Option<f64> {
        self.per_token(self.deletions as f64)
    }

    /// Substitutions per reference token.
    pub fn substitution_rate(&self) -> Option<f64> {
        self.per_token(self.substitutions as f64)
    }

    /// Graded distance per reference token.
    pub fn distance_rate(&self) -> Option<f64> {
        self.per_token(self.distance)
    }

    /// The `k` most frequently inserted tokens.
    pub fn top_insertions(&self, k: usize) -> Vec<(&str, usize)> {
        top_k(self.inserted.iter().map(|(t, &c)| (t.as_str(), c)), k)
    }

    /// The `k` most frequently deleted tokens.
    pub fn top_deletions(&self, k: usize) -> Vec<(&str, usize)> {
        top_k(self.deleted.iter().map(|(t, &c)| (t.as_str(), c)), k)
    }

    /// The `k` most frequent `(reference, hypothesis)` substitutions.
    pub fn top_substitutions(&self, k: usize) -> Vec<((&str, &str), usize)> {
        top_k(
            self.substituted
                .iter()
                .map(|((r, h), &c)| ((r.as_str(), h.as_str()), c)),
            k,
        )
    }
}

/// Highest counts first; equal counts in key order.
fn top_k<K: Ord>(items: impl Iterator<Item = (K, usize)>, k: usize) -> Vec<(K, usize)> {
    let mut items: Vec<(K, usize)> = items.collect();
    items.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    items.truncate(k);
    items
}
