//! Approximate substring matching.

use serde::Serialize;

use super::{Grid, Move};

/// Location of the best approximate occurrence of a pattern in a text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FuzzyMatch {
    /// Edit distance between the pattern and `text[start..end]`
    pub cost: usize,
    /// First text index of the match
    pub start: usize,
    /// One past the last text index of the match
    pub end: usize,
}

impl FuzzyMatch {
    /// Number of text tokens covered.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Whether the match covers no text.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Find the substring of `text` closest to `pattern` in edit distance.
///
/// Starting a match is free at every text position. The match end is the
/// first position attaining the minimum cost; the start is recovered by
/// tracing the stored moves back to the first pattern row. An empty pattern
/// matches the empty span at 0.
pub fn fuzzy_match<T: PartialEq>(pattern: &[T], text: &[T]) -> FuzzyMatch {
    let m = pattern.len();
    let n = text.len();

    // rows follow the pattern, columns the text
    let mut dp = Grid::new(m + 1, n + 1, 0usize);
    let mut path = Grid::new(m + 1, n + 1, Move::Stop);

    for i in 1..=m {
        dp.set(i, 0, i);
        path.set(i, 0, Move::Up);
    }

    for i in 1..=m {
        for j in 1..=n {
            let cost = usize::from(text[j - 1] != pattern[i - 1]);

            let (mut best, mut mv) = if dp.get(i - 1, j) < dp.get(i, j - 1) {
                (dp.get(i - 1, j) + 1, Move::Up)
            } else {
                (dp.get(i, j - 1) + 1, Move::Left)
            };

            if dp.get(i - 1, j - 1) + cost < best {
                best = dp.get(i - 1, j - 1) + cost;
                mv = Move::Diagonal;
            }

            dp.set(i, j, best);
            path.set(i, j, mv);
        }
    }

    let mut cost = usize::MAX;
    let mut end = 0;
    for j in 0..=n {
        if dp.get(m, j) < cost {
            cost = dp.get(m, j);
            end = j;
        }
    }

    let (mut i, mut j) = (m, end);
    while i != 0 {
        match path.get(i, j) {
            Move::Diagonal => {
                i -= 1;
                j -= 1;
            }
            Move::Up => i -= 1,
            Move::Left => j -= 1,
            Move::Stop => break,
        }
    }

    FuzzyMatch {
        cost,
        start: j,
        end,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn test_exact_occurrence() {
        let found = fuzzy_match(&chars("abc"), &chars("xxabcxx"));
        assert_eq!(found, FuzzyMatch { cost: 0, start: 2, end: 5 });
        assert_eq!(found.len(), 3);
    }

    #[test]
    fn test_first_occurrence_wins() {
        let found = fuzzy_match(&chars("ab"), &chars("abab"));
        assert_eq!((found.cost, found.start, found.end), (0, 0, 2));
    }

    #[test]
    fn test_approximate_occurrence() {
        let found = fuzzy_match(&["k", "æ", "t"], &["ð", "ə", "k", "a", "t", "s"]);
        assert_eq!(found, FuzzyMatch { cost: 1, start: 2, end: 5 });
    }

    #[test]
    fn test_empty_pattern() {
        let found = fuzzy_match::<char>(&[], &chars("abc"));
        assert_eq!(found, FuzzyMatch { cost: 0, start: 0, end: 0 });
        assert!(found.is_empty());
    }

    #[test]
    fn test_empty_text() {
        let found = fuzzy_match(&chars("ab"), &[]);
        assert_eq!(found, FuzzyMatch { cost: 2, start: 0, end: 0 });
    }
}
