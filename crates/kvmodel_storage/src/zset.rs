//! Score-sorted set.

use crate::store::ScoreRange;
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

/// Totally ordered wrapper around an `f64` score.
#[derive(Debug, Clone, Copy)]
struct Score(f64);

impl PartialEq for Score {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Score {}

impl PartialOrd for Score {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Score {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// A set of members ordered by score, ties broken by member name.
///
/// Each member appears once; re-adding a member moves it to its new score.
#[derive(Debug, Default, Clone)]
pub struct SortedSet {
    /// Member to current score.
    scores: HashMap<String, f64>,
    /// Ordered (score, member) pairs.
    ordered: BTreeSet<(Score, String)>,
}

impl SortedSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `member` or updates its score.
    ///
    /// Returns true if the member was new.
    pub fn insert(&mut self, score: f64, member: &str) -> bool {
        let score = normalize(score);
        match self.scores.insert(member.to_string(), score) {
            Some(previous) => {
                self.ordered.remove(&(Score(previous), member.to_string()));
                self.ordered.insert((Score(score), member.to_string()));
                false
            }
            None => {
                self.ordered.insert((Score(score), member.to_string()));
                true
            }
        }
    }

    /// Returns the score of `member`.
    #[must_use]
    pub fn score(&self, member: &str) -> Option<f64> {
        self.scores.get(member).copied()
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    /// Returns true if the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Members ranked `start..=stop`, lowest score first unless `reverse`.
    #[must_use]
    pub fn range_by_rank(&self, start: usize, stop: usize, reverse: bool) -> Vec<String> {
        if start > stop {
            return Vec::new();
        }
        let take = (stop - start).saturating_add(1);
        let members = self.ordered.iter().map(|(_, m)| m.clone());
        if reverse {
            members.rev().skip(start).take(take).collect()
        } else {
            members.skip(start).take(take).collect()
        }
    }

    /// Members whose score lies in `range`, paginated by `offset`/`limit`.
    #[must_use]
    pub fn range_by_score(
        &self,
        range: ScoreRange,
        offset: usize,
        limit: usize,
        reverse: bool,
    ) -> Vec<String> {
        if range.min > range.max {
            return Vec::new();
        }
        let (min, max) = (normalize(range.min), normalize(range.max));
        let lower = (Score(min), String::new());
        let within = self
            .ordered
            .range(lower..)
            .take_while(|(score, _)| score.0 <= max)
            .map(|(_, m)| m.clone());
        if reverse {
            let all: Vec<String> = within.collect();
            all.into_iter().rev().skip(offset).take(limit).collect()
        } else {
            within.skip(offset).take(limit).collect()
        }
    }
}

/// Folds NaN and `-0.0` onto `0.0` so they order as zero.
fn normalize(score: f64) -> f64 {
    if score.is_nan() || score == 0.0 {
        0.0
    } else {
        score
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn populated() -> SortedSet {
        let mut set = SortedSet::new();
        for (score, member) in [(30.0, "c"), (10.0, "a"), (50.0, "e"), (20.0, "b"), (40.0, "d")] {
            set.insert(score, member);
        }
        set
    }

    #[test]
    fn rank_range_ascending() {
        let set = populated();
        assert_eq!(set.range_by_rank(0, 2, false), vec!["a", "b", "c"]);
        assert_eq!(set.range_by_rank(3, 100, false), vec!["d", "e"]);
        assert!(set.range_by_rank(5, 10, false).is_empty());
    }

    #[test]
    fn rank_range_descending() {
        let set = populated();
        assert_eq!(set.range_by_rank(0, 1, true), vec!["e", "d"]);
    }

    #[test]
    fn rescoring_moves_member() {
        let mut set = populated();
        assert!(!set.insert(60.0, "a"));
        assert_eq!(set.len(), 5);
        assert_eq!(set.score("a"), Some(60.0));
        assert_eq!(set.range_by_rank(4, 4, false), vec!["a"]);
    }

    #[test]
    fn score_range_is_inclusive() {
        let set = populated();
        let found = set.range_by_score(ScoreRange::new(20.0, 40.0), 0, 10, false);
        assert_eq!(found, vec!["b", "c", "d"]);
    }

    #[test]
    fn score_range_paginates_in_direction() {
        let set = populated();
        let found = set.range_by_score(ScoreRange::all(), 1, 2, true);
        assert_eq!(found, vec!["d", "c"]);
        let found = set.range_by_score(ScoreRange::from_bounds(Some(25.0), None), 1, 10, false);
        assert_eq!(found, vec!["d", "e"]);
    }

    #[test]
    fn ties_order_by_member() {
        let mut set = SortedSet::new();
        set.insert(1.0, "b");
        set.insert(1.0, "a");
        assert_eq!(set.range_by_rank(0, 1, false), vec!["a", "b"]);
    }

    #[test]
    fn negative_zero_scores_as_zero() {
        let mut set = SortedSet::new();
        set.insert(-0.0, "a");
        set.insert(1.0, "b");

        assert_eq!(set.score("a").map(f64::to_bits), Some(0.0f64.to_bits()));
        let closed = ScoreRange::from_bounds(Some(0.0), Some(10.0));
        assert_eq!(set.range_by_score(closed, 0, 10, false), vec!["a", "b"]);
        let from_negative_zero = ScoreRange::from_bounds(Some(-0.0), Some(0.0));
        assert_eq!(set.range_by_score(from_negative_zero, 0, 10, false), vec!["a"]);
    }

    #[test]
    fn inverted_bounds_are_empty() {
        let set = populated();
        assert!(set
            .range_by_score(ScoreRange::new(40.0, 20.0), 0, 10, false)
            .is_empty());
    }

    proptest! {
        #[test]
        fn rank_order_follows_latest_scores(
            writes in prop::collection::vec((0u8..16, -1_000i32..1_000), 1..64)
        ) {
            let mut set = SortedSet::new();
            let mut latest = HashMap::new();
            for (member, score) in &writes {
                let member = format!("m{member}");
                set.insert(f64::from(*score), &member);
                latest.insert(member, f64::from(*score));
            }

            prop_assert_eq!(set.len(), latest.len());
            let ascending = set.range_by_rank(0, set.len(), false);
            prop_assert_eq!(ascending.len(), latest.len());
            for pair in ascending.windows(2) {
                prop_assert!(latest[&pair[0]] <= latest[&pair[1]]);
            }

            let mut descending = set.range_by_rank(0, set.len(), true);
            descending.reverse();
            prop_assert_eq!(descending, ascending);
        }
    }
}
