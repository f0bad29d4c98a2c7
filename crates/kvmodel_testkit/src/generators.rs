//! Property-based test generators using proptest.
//!
//! Provides strategies for generating records and index scores that
//! respect the invariants the mapping layer relies on.

use kvmodel_codec::Record;
use proptest::prelude::*;
use std::collections::BTreeSet;

/// Strategy for generating usernames.
pub fn username_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z][a-z0-9_]{0,15}").expect("Invalid regex")
}

/// Strategy for generating model and field names.
pub fn name_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z][a-z_]{0,15}").expect("Invalid regex")
}

/// Strategy for generating between 1 and `max` distinct, whole index scores
/// in random order.
pub fn distinct_scores_strategy(max: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::btree_set(-10_000i32..10_000, 1..=max)
        .prop_map(|set: BTreeSet<i32>| set.into_iter().map(f64::from).collect::<Vec<_>>())
        .prop_shuffle()
}

/// Strategy for a closed score window `[min, max]` within the score range.
pub fn score_window_strategy() -> impl Strategy<Value = (f64, f64)> {
    (-10_000i32..10_000, -10_000i32..10_000).prop_map(|(a, b)| {
        let (min, max) = if a <= b { (a, b) } else { (b, a) };
        (f64::from(min), f64::from(max))
    })
}

/// Strategy for generating insertable user records with an age.
pub fn user_record_strategy() -> impl Strategy<Value = Record> {
    (username_strategy(), 0u8..120).prop_map(|(username, age)| {
        Record::new()
            .with("email", format!("{username}@x.com"))
            .with("username", username)
            .with("age", i64::from(age))
    })
}
