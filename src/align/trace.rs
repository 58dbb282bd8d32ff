//! Levenshtein alignment with traceback.

use std::fmt;

use serde::Serialize;

use super::{EditOp, Grid, Move};

/// One aligned position.
///
/// `reference` is `None` for insertions and `hypothesis` is `None` for
/// deletions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Step<T> {
    /// Reference-side token
    pub reference: Option<T>,
    /// Hypothesis-side token
    pub hypothesis: Option<T>,
    /// Operation relating the two
    pub op: EditOp,
}

/// Result of [`align`]: total cost and the operations, left to right.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Alignment<T> {
    /// Edit distance
    pub cost: usize,
    /// Aligned positions in sequence order
    pub steps: Vec<Step<T>>,
}

impl<T> Alignment<T> {
    fn count(&self, op: EditOp) -> usize {
        self.steps.iter().filter(|s| s.op == op).count()
    }

    /// Number of matched positions.
    pub fn matches(&self) -> usize {
        self.count(EditOp::Match)
    }

    /// Number of substitutions.
    pub fn substitutions(&self) -> usize {
        self.count(EditOp::Substitute)
    }

    /// Number of insertions.
    pub fn insertions(&self) -> usize {
        self.count(EditOp::Insert)
    }

    /// Number of deletions.
    pub fn deletions(&self) -> usize {
        self.count(EditOp::Delete)
    }

    /// `(reference, hypothesis)` token pairs of every substitution.
    pub fn substituted(&self) -> Vec<(&T, &T)> {
        self.steps
            .iter()
            .filter_map(|s| match (s.op, &s.reference, &s.hypothesis) {
                (EditOp::Substitute, Some(r), Some(h)) => Some((r, h)),
                _ => None,
            })
            .collect()
    }

    /// Hypothesis tokens of every insertion.
    pub fn inserted(&self) -> Vec<&T> {
        self.steps
            .iter()
            .filter(|s| s.op == EditOp::Insert)
            .filter_map(|s| s.hypothesis.as_ref())
            .collect()
    }

    /// Reference tokens of every deletion.
    pub fn deleted(&self) -> Vec<&T> {
        self.steps
            .iter()
            .filter(|s| s.op == EditOp::Delete)
            .filter_map(|s| s.reference.as_ref())
            .collect()
    }

    /// Reference tokens in order; reconstructs the reference sequence.
    pub fn reference_tokens(&self) -> Vec<&T> {
        self.steps.iter().filter_map(|s| s.reference.as_ref()).collect()
    }

    /// Hypothesis tokens in order; reconstructs the hypothesis sequence.
    pub fn hypothesis_tokens(&self) -> Vec<&T> {
        self.steps.iter().filter_map(|s| s.hypothesis.as_ref()).collect()
    }
}

/// Three right-aligned rows (`REF`, `HYP`, `OPS`), five columns per step.
impl<T: fmt::Display> fmt::Display for Alignment<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cell = |t: &Option<T>| t.as_ref().map(ToString::to_string).unwrap_or_default();

        write!(f, "{:>5}", "REF: ")?;
        for step in &self.steps {
            write!(f, "{:>5}", cell(&step.reference))?;
        }
        writeln!(f)?;

        write!(f, "{:>5}", "HYP: ")?;
        for step in &self.steps {
            write!(f, "{:>5}", cell(&step.hypothesis))?;
        }
        writeln!(f)?;

        write!(f, "{:>5}", "OPS: ")?;
        for step in &self.steps {
            write!(f, "{:>5}", step.op.label())?;
        }
        writeln!(f)
    }
}

/// Align `hypothesis` against `reference` with unit-cost Levenshtein
/// edits.
///
/// When several minimal paths exist the traceback prefers, at each cell, the
/// diagonal (match or substitution), then an insertion, then a deletion.
pub fn align<T: PartialEq + Clone>(reference: &[T], hypothesis: &[T]) -> Alignment<T> {
    let n = reference.len();
    let m = hypothesis.len();

    // rows follow the hypothesis, columns the reference
    let mut dp = Grid::new(m + 1, n + 1, 0usize);
    let mut path = Grid::new(m + 1, n + 1, Move::Stop);

    for j in 1..=n {
        dp.set(0, j, j);
        path.set(0, j, Move::Left);
    }
    for i in 1..=m {
        dp.set(i, 0, i);
        path.set(i, 0, Move::Up);
    }

    for i in 1..=m {
        for j in 1..=n {
            let cost = usize::from(reference[j - 1] != hypothesis[i - 1]);

            let mut best = dp.get(i - 1, j - 1) + cost;
            let mut mv = Move::Diagonal;

            if best > dp.get(i - 1, j) + 1 {
                best = dp.get(i - 1, j) + 1;
                mv = Move::Up;
            }
            if best > dp.get(i, j - 1) + 1 {
                best = dp.get(i, j - 1) + 1;
                mv = Move::Left;
            }

            dp.set(i, j, best);
            path.set(i, j, mv);
        }
    }

    let mut steps = Vec::with_capacity(n.max(m));
    let (mut i, mut j) = (m, n);

    while i > 0 || j > 0 {
        match path.get(i, j) {
            Move::Diagonal => {
                let (r, h) = (&reference[j - 1], &hypothesis[i - 1]);
                let op = if r == h {
                    EditOp::Match
                } else {
                    EditOp::Substitute
                };
                steps.push(Step {
                    reference: Some(r.clone()),
                    hypothesis: Some(h.clone()),
                    op,
                });
                i -= 1;
                j -= 1;
            }
            Move::Up => {
                steps.push(Step {
                    reference: None,
                    hypothesis: Some(hypothesis[i - 1].clone()),
                    op: EditOp::Insert,
                });
                i -= 1;
            }
            Move::Left | Move::Stop => {
                steps.push(Step {
                    reference: Some(reference[j - 1].clone()),
                    hypothesis: None,
                    op: EditOp::Delete,
                });
                j -= 1;
            }
        }
    }

    steps.reverse();

    Alignment {
        cost: dp.get(m, n),
        steps,
    }
}
