//! Error attribution by token category.

use std::hash::Hash;

use rustc_hash::FxHashMap;
use serde::Serialize;

use super::{EditOp, Grid};

/// Reference-token tally for one group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GroupCount {
    /// Reference tokens attributed to the group
    pub total: usize,
    /// Of those, tokens that were substituted or deleted
    pub errors: usize,
}

impl GroupCount {
    /// `errors / total`, or `None` for an empty group.
    pub fn rate(&self) -> Option<f64> {
        (self.total > 0).then(|| self.errors as f64 / self.total as f64)
    }
}

/// Result of [`grouped_align`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupedAlignment<G: Hash + Eq> {
    /// Edit distance between the sequences
    pub cost: usize,
    /// Operations of the grouped traceback, left to right
    pub ops: Vec<EditOp>,
    /// Per-group tallies
    pub groups: FxHashMap<G, GroupCount>,
}

impl<G: Hash + Eq> Default for GroupedAlignment<G> {
    fn default() -> Self {
        Self {
            cost: 0,
            ops: Vec::new(),
            groups: FxHashMap::default(),
        }
    }
}

impl<G: Hash + Eq + Clone> GroupedAlignment<G> {
    /// Tally for `group`; zero if the group never occurred.
    pub fn count(&self, group: &G) -> GroupCount {
        self.groups.get(group).copied().unwrap_or_default()
    }

    /// Add another alignment's cost and tallies into this one. Operations are
    /// not merged.
    pub fn merge(&mut self, other: &GroupedAlignment<G>) {
        self.cost += other.cost;
        for (group, count) in &other.groups {
            let entry = self.groups.entry(group.clone()).or_default();
            entry.total += count.total;
            entry.errors += count.errors;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Back {
    Origin,
    Match,
    Substitute,
    /// Consume a reference token only
    Up,
    /// Consume a hypothesis token only
    Left,
}

/// Align `hypothesis` against `reference` and attribute every reference
/// token to the group `group_of` assigns it.
///
/// Matches add to the group's `total`; substitutions and deletions add to
/// both `total` and `errors`; insertions have no reference token and are not
/// attributed. A substituted token is charged to its own reference group, so
/// per-group error counts include substitutions as well as deletions. Scoring
/// that only charges deletions undercounts these rates.
///
/// The traceback resolves ties differently from [`align`](super::align): a
/// cell takes the diagonal if it attains the cell's value, otherwise it steps
/// up to the previous reference row when that row's cell holds the same
/// value, and otherwise steps left. The step-left fallback can be taken at a
/// cell whose optimum came from above, so the reported operations need not
/// form a minimal path even though `cost` is always the true distance.
pub fn grouped_align<T, G, F>(reference: &[T], hypothesis: &[T], group_of: F) -> GroupedAlignment<G>
where
    T: PartialEq,
    G: Hash + Eq,
    F: Fn(&T) -> G,
{
    let n = reference.len();
    let m = hypothesis.len();

    // rows follow the reference, columns the hypothesis
    let mut dp = Grid::new(n + 1, m + 1, 0usize);
    let mut back = Grid::new(n + 1, m + 1, Back::Origin);

    for j in 1..=m {
        dp.set(0, j, j);
        back.set(0, j, Back::Left);
    }
    for i in 1..=n {
        dp.set(i, 0, i);
        back.set(i, 0, Back::Up);
    }

    for i in 1..=n {
        for j in 1..=m {
            let equal = reference[i - 1] == hypothesis[j - 1];
            let diagonal = dp.get(i - 1, j - 1) + usize::from(!equal);
            let best = diagonal
                .min(dp.get(i - 1, j) + 1)
                .min(dp.get(i, j - 1) + 1);

            let mv = if diagonal == best {
                if equal {
                    Back::Match
                } else {
                    Back::Substitute
                }
            } else if best == dp.get(i - 1, j) {
                Back::Up
            } else {
                Back::Left
            };

            dp.set(i, j, best);
            back.set(i, j, mv);
        }
    }

    let mut result = GroupedAlignment {
        cost: dp.get(n, m),
        ops: Vec::with_capacity(n.max(m)),
        groups: FxHashMap::default(),
    };

    let (mut i, mut j) = (n, m);
    while i > 0 || j > 0 {
        match back.get(i, j) {
            Back::Match => {
                result.groups.entry(group_of(&reference[i - 1])).or_default().total += 1;
                result.ops.push(EditOp::Match);
                i -= 1;
                j -= 1;
            }
            Back::Substitute => {
                let count = result.groups.entry(group_of(&reference[i - 1])).or_default();
                count.total += 1;
                count.errors += 1;
                result.ops.push(EditOp::Substitute);
                i -= 1;
                j -= 1;
            }
            Back::Up => {
                let count = result.groups.entry(group_of(&reference[i - 1])).or_default();
                count.total += 1;
                count.errors += 1;
                result.ops.push(EditOp::Delete);
                i -= 1;
            }
            Back::Left | Back::Origin => {
                result.ops.push(EditOp::Insert);
                j -= 1;
            }
        }
    }

    result.ops.reverse();
    result
}
