//! Property-based tests for edit distance, traceback and fuzzy matching.
//!
//! 1. **Metric**: identity, symmetry and the triangle inequality
//! 2. **Traceback**: the steps rebuild both inputs and cost as much as the
//!    distance
//! 3. **Fuzzy matching**: the reported span really is that close, and any
//!    contained pattern is found exactly

use allophony::align::grouped_align;
use allophony::prelude::*;
use proptest::prelude::*;

// small alphabets so that matches are common
fn arb_seq() -> impl Strategy<Value = Vec<char>> {
    prop::collection::vec(prop::sample::select(vec!['p', 't', 'k', 'a', 'i']), 0..12)
}

fn arb_nonempty_seq() -> impl Strategy<Value = Vec<char>> {
    prop::collection::vec(prop::sample::select(vec!['p', 't', 'k', 'a', 'i']), 1..8)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn edit_distance_identity(a in arb_seq()) {
        prop_assert_eq!(edit_distance(&a, &a), 0);
    }

    #[test]
    fn edit_distance_symmetric(a in arb_seq(), b in arb_seq()) {
        prop_assert_eq!(edit_distance(&a, &b), edit_distance(&b, &a));
    }

    #[test]
    fn edit_distance_triangle(a in arb_seq(), b in arb_seq(), c in arb_seq()) {
        let ac = edit_distance(&a, &c);
        let ab = edit_distance(&a, &b);
        let bc = edit_distance(&b, &c);
        prop_assert!(ac <= ab + bc, "d(a,c)={} > d(a,b)+d(b,c)={}", ac, ab + bc);
    }

    #[test]
    fn edit_distance_bounds(a in arb_seq(), b in arb_seq()) {
        let d = edit_distance(&a, &b);
        prop_assert!(d >= a.len().abs_diff(b.len()));
        prop_assert!(d <= a.len().max(b.len()));
    }

    #[test]
    fn align_cost_is_edit_distance(a in arb_seq(), b in arb_seq()) {
        let alignment = align(&a, &b);
        prop_assert_eq!(alignment.cost, edit_distance(&a, &b));
        prop_assert_eq!(
            alignment.cost,
            alignment.substitutions() + alignment.insertions() + alignment.deletions()
        );
    }

    #[test]
    fn align_rebuilds_both_sides(a in arb_seq(), b in arb_seq()) {
        let alignment = align(&a, &b);

        let reference: Vec<char> = alignment.reference_tokens().into_iter().copied().collect();
        let hypothesis: Vec<char> = alignment.hypothesis_tokens().into_iter().copied().collect();
        prop_assert_eq!(reference, a);
        prop_assert_eq!(hypothesis, b);
    }

    #[test]
    fn align_steps_are_consistent(a in arb_seq(), b in arb_seq()) {
        for step in align(&a, &b).steps {
            match step.op {
                EditOp::Match => prop_assert_eq!(step.reference, step.hypothesis),
                EditOp::Substitute => {
                    prop_assert!(step.reference.is_some() && step.hypothesis.is_some());
                    prop_assert_ne!(step.reference, step.hypothesis);
                }
                EditOp::Insert => prop_assert!(step.reference.is_none()),
                EditOp::Delete => prop_assert!(step.hypothesis.is_none()),
            }
        }
    }

    #[test]
    fn grouped_cost_and_totals(a in arb_seq(), b in arb_seq()) {
        let grouped = grouped_align(&a, &b, |c| "aeiou".contains(*c));
        prop_assert_eq!(grouped.cost, edit_distance(&a, &b));

        let total: usize = grouped.groups.values().map(|g| g.total).sum();
        prop_assert_eq!(total, a.len());
        for count in grouped.groups.values() {
            prop_assert!(count.errors <= count.total);
        }
    }

    #[test]
    fn fuzzy_span_has_reported_cost(pattern in arb_seq(), text in arb_seq()) {
        let found = fuzzy_match(&pattern, &text);

        prop_assert!(found.start <= found.end && found.end <= text.len());
        prop_assert!(found.cost <= pattern.len());
        prop_assert_eq!(edit_distance(&pattern, &text[found.start..found.end]), found.cost);
    }

    #[test]
    fn fuzzy_never_worse_than_whole_text(pattern in arb_seq(), text in arb_seq()) {
        let found = fuzzy_match(&pattern, &text);
        prop_assert!(found.cost <= edit_distance(&pattern, &text));
    }

    #[test]
    fn fuzzy_finds_contained_pattern(
        prefix in arb_seq(),
        pattern in arb_nonempty_seq(),
        suffix in arb_seq(),
    ) {
        let text: Vec<char> = prefix.iter().chain(&pattern).chain(&suffix).copied().collect();
        let found = fuzzy_match(&pattern, &text);

        prop_assert_eq!(found.cost, 0);
        prop_assert_eq!(&text[found.start..found.end], pattern.as_slice());
        // the first occurrence wins
        prop_assert!(found.end <= prefix.len() + pattern.len());
    }
}
