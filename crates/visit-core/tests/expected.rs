//! Tests for the expected-count formula.

use proptest::prelude::*;
use visit_core::expected_count;

/// Count scheduled months `k` in `[0, elapsed)` with `k % cadence == 0`.
fn expected_by_enumeration(elapsed: u32, cadence: u32) -> u32 {
    (0..elapsed).filter(|month| month % cadence == 0).count() as u32
}

#[test]
fn month_zero_expects_nothing() {
    for cadence in 1..=12 {
        assert_eq!(expected_count(0, cadence), 0);
    }
}

#[test]
fn baseline_counts_after_first_month() {
    assert_eq!(expected_count(1, 3), 1);
    assert_eq!(expected_count(1, 1), 1);
    assert_eq!(expected_count(1, 6), 1);
}

#[test]
fn boundaries_on_cadence() {
    assert_eq!(expected_count(3, 1), 3);
    assert_eq!(expected_count(6, 6), 1);
    assert_eq!(expected_count(7, 6), 2);
    assert_eq!(expected_count(3, 3), 1);
    assert_eq!(expected_count(4, 3), 2);
    assert_eq!(expected_count(12, 3), 4);
}

proptest! {
    #[test]
    fn ceiling_matches_enumeration(elapsed in 0u32..200, cadence in 1u32..13) {
        prop_assert_eq!(
            expected_count(elapsed, cadence),
            expected_by_enumeration(elapsed, cadence)
        );
    }

    #[test]
    fn monotone_in_elapsed_months(elapsed in 0u32..10_000, cadence in 1u32..25) {
        prop_assert!(expected_count(elapsed, cadence) <= expected_count(elapsed + 1, cadence));
    }
}
