//! Integration tests for ordered indices and unique lookups.

use kvmodel_codec::{Record, RecordId};
use kvmodel_core::{CoreError, ListQuery, ModelRegistry, ModelSchema};
use kvmodel_storage::InMemoryStore;
use kvmodel_testkit::prelude::*;
use proptest::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("failed to build runtime")
        .block_on(future)
}

/// Inserts one post per score and returns each id's score.
async fn seed(fx: &TestRegistry, scores: &[f64]) -> HashMap<RecordId, f64> {
    let author = scenarios::seed_users(fx, 1).await[0];
    let ids = scenarios::seed_posts(fx, author, scores).await;
    ids.into_iter().zip(scores.iter().copied()).collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn ascending_follows_score_and_descending_reverses(scores in distinct_scores_strategy(24)) {
        block_on(async {
            let fx = TestRegistry::new();
            let by_id = seed(&fx, &scores).await;
            let posts = fx.model("post").unwrap();
            let all = ListQuery::ascending().limit(scores.len());

            let ascending = posts.list_ids("votes", &all).await.unwrap();
            assert_eq!(ascending.len(), scores.len());
            for pair in ascending.windows(2) {
                assert!(by_id[&pair[0]] < by_id[&pair[1]]);
            }

            let descending = posts
                .list_ids("votes", &ListQuery::descending().limit(scores.len()))
                .await
                .unwrap();
            let mut reversed = ascending.clone();
            reversed.reverse();
            assert_eq!(descending, reversed);
        });
    }

    #[test]
    fn range_returns_exactly_the_window(
        scores in distinct_scores_strategy(24),
        (min, max) in score_window_strategy(),
    ) {
        block_on(async {
            let fx = TestRegistry::new();
            let by_id = seed(&fx, &scores).await;
            let posts = fx.model("post").unwrap();

            let listed = posts
                .list_ids("votes", &ListQuery::range(min, max).limit(scores.len()))
                .await
                .unwrap();

            let mut expected: Vec<(f64, RecordId)> = by_id
                .iter()
                .filter(|(_, s)| **s >= min && **s <= max)
                .map(|(id, s)| (*s, *id))
                .collect();
            expected.sort_by(|a, b| a.0.total_cmp(&b.0));
            let expected: Vec<RecordId> = expected.into_iter().map(|(_, id)| id).collect();
            assert_eq!(listed, expected);
        });
    }
}

#[tokio::test]
async fn rank_window_spans_offset_to_offset_plus_limit() {
    let fx = TestRegistry::new();
    seed(&fx, &[50.0, 10.0, 40.0, 20.0, 30.0]).await;
    let posts = fx.model("post").unwrap();

    let page = posts
        .list("votes", &ListQuery::ascending().offset(1).limit(2))
        .await
        .unwrap();
    let votes: Vec<f64> = page.iter().filter_map(|p| p.number("votes")).collect();
    assert_eq!(votes, vec![20.0, 30.0, 40.0]);

    let page = posts
        .list("votes", &ListQuery::descending().offset(3).limit(10))
        .await
        .unwrap();
    let votes: Vec<f64> = page.iter().filter_map(|p| p.number("votes")).collect();
    assert_eq!(votes, vec![20.0, 10.0]);
}

#[tokio::test]
async fn score_window_paginates_in_both_directions() {
    let fx = TestRegistry::new();
    seed(&fx, &[10.0, 20.0, 30.0, 40.0, 50.0, 60.0]).await;
    let posts = fx.model("post").unwrap();

    let page = posts
        .list("votes", &ListQuery::range(20, 50).offset(1).limit(2))
        .await
        .unwrap();
    let votes: Vec<f64> = page.iter().filter_map(|p| p.number("votes")).collect();
    assert_eq!(votes, vec![30.0, 40.0]);

    let page = posts
        .list("votes", &ListQuery::descending().min(35))
        .await
        .unwrap();
    let votes: Vec<f64> = page.iter().filter_map(|p| p.number("votes")).collect();
    assert_eq!(votes, vec![60.0, 50.0, 40.0]);
}

#[tokio::test]
async fn rescoring_moves_a_record() {
    let fx = TestRegistry::new();
    let by_id = seed(&fx, &[1.0, 2.0, 3.0]).await;
    let posts = fx.model("post").unwrap();
    let lowest = by_id.iter().find(|(_, s)| **s == 1.0).map(|(id, _)| *id).unwrap();

    let post = posts.get(lowest).await.unwrap();
    posts.update(post.with("votes", 10)).await.unwrap();

    let ids = posts.list_ids("votes", &ListQuery::descending()).await.unwrap();
    assert_eq!(ids[0], lowest);
    assert_eq!(ids.len(), 3);
}

#[tokio::test]
async fn list_full_expands_references() {
    let fx = TestRegistry::new();
    seed(&fx, &[5.0]).await;
    let posts = fx.model("post").unwrap();

    let full = posts.list_full("votes", &ListQuery::ascending()).await.unwrap();
    assert_eq!(full.len(), 1);
    assert_eq!(full[0].nested("author").and_then(|a| a.text("username")), Some("u0"));
}

#[tokio::test]
async fn unique_lookup_finds_the_inserted_record() {
    let fx = TestRegistry::new();
    let ids = scenarios::seed_users(&fx, 3).await;
    let users = fx.model("user").unwrap();

    assert_eq!(users.lookup_unique("username", "u1").await.unwrap(), Some(ids[1]));
    assert_eq!(users.lookup_unique("email", "u2@x.com").await.unwrap(), Some(ids[2]));
    assert_eq!(users.lookup_unique("email", "nobody@x.com").await.unwrap(), None);

    let full = users.get_full_by_unique("username", "u0").await.unwrap().unwrap();
    assert_eq!(full.id(), Some(ids[0]));
    assert!(full.get("invitor").is_some_and(|v| v.is_null()));
}

#[tokio::test]
async fn changed_unique_value_leaves_the_old_entry() {
    let fx = TestRegistry::new();
    let users = fx.model("user").unwrap();
    let user = users.insert(user_record("a")).await.unwrap();
    let id = user.id().unwrap();

    users.update(user.with("email", "new@x.com")).await.unwrap();

    assert_eq!(users.lookup_unique("email", "new@x.com").await.unwrap(), Some(id));
    assert_eq!(users.lookup_unique("email", "a@x.com").await.unwrap(), Some(id));
}

#[tokio::test]
async fn duplicate_unique_value_is_last_write_wins() {
    let fx = TestRegistry::new();
    let users = fx.model("user").unwrap();
    users.insert(user_record("a")).await.unwrap();
    let second = users
        .insert(Record::new().with("username", "b").with("email", "a@x.com"))
        .await
        .unwrap();

    assert_eq!(users.lookup_unique("email", "a@x.com").await.unwrap(), second.id());
}

#[tokio::test]
async fn undeclared_index_is_rejected() {
    let fx = TestRegistry::new();
    let users = fx.model("user").unwrap();
    let err = users.list_ids("age", &ListQuery::ascending()).await.unwrap_err();
    assert!(matches!(err, CoreError::Precondition { .. }));
    let err = users.lookup_unique("age", 3).await.unwrap_err();
    assert!(matches!(err, CoreError::Precondition { .. }));
}

#[tokio::test]
async fn untyped_index_keeps_its_score_across_get_and_update() {
    let kv = Arc::new(InMemoryStore::new());
    let registry = ModelRegistry::builder(kv.clone())
        .model(ModelSchema::new("player").index("rank"))
        .build()
        .unwrap();
    let players = registry.model("player").unwrap();
    let id = players
        .insert(Record::new().with("rank", 5))
        .await
        .unwrap()
        .id()
        .unwrap();
    assert_eq!(kv.zscore("player+rank", "1"), Some(5.0));

    let fetched = players.get(id).await.unwrap();
    players.update(fetched).await.unwrap();

    assert_eq!(kv.zscore("player+rank", "1"), Some(5.0));
}

#[tokio::test]
async fn negative_zero_falls_inside_a_range_starting_at_zero() {
    let fx = TestRegistry::new();
    let author = scenarios::seed_users(&fx, 1).await[0];
    let post = scenarios::seed_posts(&fx, author, &[-0.0]).await[0];
    let posts = fx.model("post").unwrap();

    let ids = posts
        .list_ids("votes", &ListQuery::range(0, 10))
        .await
        .unwrap();
    assert_eq!(ids, vec![post]);
}
