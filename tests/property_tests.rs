//! # Property-Based Tests
//!
//! Invariants of counter updates, aggregation and the role policy.

use proptest::collection::vec;
use proptest::prelude::*;
use volley_stats::config::MatchConfig;
use volley_stats::core::ALL_KEYS;
use volley_stats::stats::{
    calc_percentage, category_total, lead_percentage, player_totals, set_faults, summarize_match,
    totals_over,
};
use volley_stats::{
    is_category_applicable, total_faults, update_counter, Category, MatchInfo, MatchState,
    Player, Role, StatKey, StatRecord, Wizard,
};

fn new_match(sets: u8) -> MatchState {
    MatchState::new(
        vec![
            Player::new("Alice", Role::ReceiverAttacker),
            Player::new("Bea", Role::Setter),
        ],
        sets,
        MatchInfo::new("Les Aigles", "12/10/2026"),
    )
    .expect("valid match")
}

fn any_key() -> impl Strategy<Value = StatKey> {
    (0..ALL_KEYS.len()).prop_map(|i| ALL_KEYS[i])
}

fn any_role() -> impl Strategy<Value = Role> {
    (0..Role::ALL.len()).prop_map(|i| Role::ALL[i])
}

// =============================================================================
// PROPERTY TESTS
// =============================================================================

proptest! {
    /// Counters never go below zero whatever the sequence of deltas.
    #[test]
    fn counters_never_negative(
        key in any_key(),
        deltas in vec(-5i64..5, 0..50)
    ) {
        let mut record = StatRecord::zero();
        let mut expected: i64 = 0;
        for delta in deltas {
            record = update_counter(&record, key, delta);
            expected = (expected + delta).max(0);
            prop_assert_eq!(i64::from(record.get(key)), expected);
        }
    }

    /// Updating one counter leaves every other counter untouched.
    #[test]
    fn update_touches_one_cell(key in any_key(), delta in -3i64..3) {
        let before = StatRecord::zero();
        let after = update_counter(&before, key, delta);
        for other in ALL_KEYS.iter().filter(|k| **k != key) {
            prop_assert_eq!(after.get(*other), 0);
        }
        prop_assert_eq!(before, StatRecord::zero());
    }

    /// Percentages stay within 0..=100 and are 0 for empty totals.
    #[test]
    fn percentage_bounds(value in 0u32..10_000, extra in 0u32..10_000) {
        let total = value + extra;
        let pct = calc_percentage(value, total).value();
        prop_assert!(pct <= 100);
        if total == 0 {
            prop_assert_eq!(pct, 0);
        }
        if value == total && total > 0 {
            prop_assert_eq!(pct, 100);
        }
        prop_assert_eq!(calc_percentage(value, 0).value(), 0);
    }

    /// Totals over split ranges add up to the full-match totals.
    #[test]
    fn totals_are_additive(
        entries in vec((1u32..=5, any_key(), 0i64..4), 0..60),
        split in 1u8..5
    ) {
        let mut state = new_match(5);
        for (set, key, delta) in entries {
            state.update_counter("Alice", set, key, delta).expect("valid update");
        }

        let head = totals_over(&state, "Alice", 1..=split);
        let tail = totals_over(&state, "Alice", split + 1..=5);
        prop_assert_eq!(head.merged(&tail), player_totals(&state, "Alice"));
    }

    /// Total faults is the sum of direct, service and attack misses over all sets.
    #[test]
    fn total_faults_identity(entries in vec((1u32..=3, any_key(), 0i64..4), 0..40)) {
        let mut state = new_match(3);
        for (set, key, delta) in entries {
            state.update_counter("Alice", set, key, delta).expect("valid update");
        }

        let totals = player_totals(&state, "Alice");
        let expected = totals.faults.direct + totals.service.missed + totals.attack.missed;
        prop_assert_eq!(total_faults(&state, "Alice"), expected);

        let per_set: u32 = state
            .sets()
            .map(|set| set_faults(state.record("Alice", set).expect("record")))
            .sum();
        prop_assert_eq!(per_set, expected);
    }

    /// Lead percentage is computed from the category's own total.
    #[test]
    fn lead_percentage_matches_counters(ace in 0i64..20, missed in 0i64..20) {
        let mut record = StatRecord::zero();
        record = update_counter(&record, StatKey::parse(Category::Service, "ace").expect("key"), ace);
        record = update_counter(&record, StatKey::parse(Category::Service, "missed").expect("key"), missed);

        let total = category_total(&record, Category::Service);
        prop_assert_eq!(i64::from(total), ace + missed);
        prop_assert_eq!(
            lead_percentage(&record, Category::Service),
            calc_percentage(record.service.ace, total)
        );
    }

    /// Entry accepts a counter exactly when its category applies to the role.
    #[test]
    fn entry_follows_role_policy(role in any_role(), key in any_key()) {
        let mut wizard = Wizard::new(MatchConfig::default());
        wizard.setup_mut().expect("setup").add_player("Zoé", role);
        wizard.start().expect("start");

        let accepted = wizard.record("Zoé", key, 1).is_ok();
        prop_assert_eq!(accepted, is_category_applicable(role, key.category()));

        let summary = summarize_match(wizard.state().expect("match"));
        prop_assert_eq!(summary.players[0].categories.len(), Category::ALL.len());
    }

    /// Aggregating twice gives the same answer and leaves the state alone.
    #[test]
    fn aggregation_is_idempotent(entries in vec((1u32..=3, any_key(), 0i64..4), 0..30)) {
        let mut state = new_match(3);
        for (set, key, delta) in entries {
            state.update_counter("Bea", set, key, delta).expect("valid update");
        }
        let before = state.clone();

        let first = summarize_match(&state);
        let second = summarize_match(&state);
        prop_assert_eq!(first, second);
        prop_assert_eq!(state, before);
    }
}

// =============================================================================
// SCENARIOS
// =============================================================================

#[test]
fn service_scenario_over_two_sets() {
    let mut state = new_match(2);
    let ace = StatKey::parse(Category::Service, "ace").expect("key");
    let missed = StatKey::parse(Category::Service, "missed").expect("key");
    let difficult = StatKey::parse(Category::Service, "difficult").expect("key");

    state.update_counter("Alice", 1, ace, 1).expect("update");
    state.update_counter("Alice", 1, ace, 1).expect("update");
    state.update_counter("Alice", 1, missed, 1).expect("update");
    state.update_counter("Alice", 2, difficult, 1).expect("update");

    let totals = player_totals(&state, "Alice");
    assert_eq!(category_total(&totals, Category::Service), 4);
    assert_eq!(lead_percentage(&totals, Category::Service).value(), 50);
    assert_eq!(total_faults(&state, "Alice"), 1);
}
