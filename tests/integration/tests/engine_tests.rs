//! Engine Integration Tests
//!
//! End-to-end scenarios against the services on the in-memory store. The
//! PostgreSQL scenario at the bottom needs DATABASE_URL and skips otherwise.
//!
//! Run with: cargo test -p integration-tests --test engine_tests

use integration_tests::{anonymous, day, user, user_from, TestEngine};
use serde_json::json;
use tally_core::{
    paths, AttitudeCategory, CommentReaction, EmotionCategory, ErrorKind, Figure, Rating,
    VoteCategory, VoteKind,
};
use tally_service::dto::{PostCommentRequest, PostReplyRequest};
use tally_service::projection::{project_comment, VoteView};
use tally_service::{
    EngineLimits, ProjectionKey, ProjectionKind, ProjectionStore, RetryPolicy,
};

fn attitude_total(figure: &Figure) -> i64 {
    AttitudeCategory::ALL.iter().map(|c| figure.attitude(*c)).sum()
}

// ============================================================================
// Vote Toggle Tests
// ============================================================================

#[tokio::test]
async fn test_fan_hater_hater_scenario() {
    let engine = TestEngine::memory();
    let f = engine.seed_figure("ada").await;
    let u = user("u1");

    let mut seen = Vec::new();
    for value in [AttitudeCategory::Fan, AttitudeCategory::Hater, AttitudeCategory::Hater] {
        engine.votes().cast_vote(&u, &f, value).await.unwrap();
        let figure = engine.figure(&f).await;
        seen.push((
            figure.attitude(AttitudeCategory::Fan),
            figure.attitude(AttitudeCategory::Hater),
        ));
    }

    assert_eq!(seen, vec![(1, 0), (0, 1), (0, 0)]);
    assert!(engine
        .doc(&paths::user_vote(&u.user_id, &f, VoteKind::Attitude))
        .await
        .is_none());
}

#[tokio::test]
async fn test_repeat_cast_restores_baseline() {
    let engine = TestEngine::memory();
    let f = engine.seed_figure("ada").await;
    for i in 0..3 {
        engine
            .votes()
            .cast_vote(&user(&format!("other{i}")), &f, EmotionCategory::Joy)
            .await
            .unwrap();
    }
    let baseline = engine.figure(&f).await;

    let u = user("u1");
    engine.votes().cast_vote(&u, &f, EmotionCategory::Joy).await.unwrap();
    engine.votes().cast_vote(&u, &f, EmotionCategory::Joy).await.unwrap();

    assert_eq!(engine.figure(&f).await.emotion_counts, baseline.emotion_counts);
}

#[tokio::test]
async fn test_each_user_holds_at_most_one_unit() {
    let engine = TestEngine::memory();
    let f = engine.seed_figure("ada").await;
    let sequences = [
        ("a", vec!["fan", "hater", "simp"]),
        ("b", vec!["neutral", "neutral"]),
        ("c", vec!["simp", "fan", "fan", "hater"]),
    ];

    for (name, values) in &sequences {
        for value in values {
            let value = AttitudeCategory::parse(value).unwrap();
            engine.votes().cast_vote(&user(name), &f, value).await.unwrap();
        }
    }

    // a holds simp, b retracted, c holds hater
    let figure = engine.figure(&f).await;
    assert_eq!(attitude_total(&figure), 2);
    assert_eq!(figure.attitude(AttitudeCategory::Simp), 1);
    assert_eq!(figure.attitude(AttitudeCategory::Hater), 1);
    assert_eq!(figure.attitude(AttitudeCategory::Neutral), 0);
}

#[tokio::test]
async fn test_vote_record_snapshots_profile() {
    let engine = TestEngine::memory();
    let f = engine.seed_figure("ada").await;
    let u = user_from("u1", "PE", "female");

    engine.votes().cast_vote(&u, &f, AttitudeCategory::Fan).await.unwrap();

    let record = engine
        .doc(&paths::user_vote(&u.user_id, &f, VoteKind::Attitude))
        .await
        .unwrap();
    assert_eq!(record.get("value"), Some(&json!("fan")));
    assert_eq!(record.get("userCountry"), Some(&json!("PE")));
    assert_eq!(record.get("userGender"), Some(&json!("female")));
}

#[tokio::test]
async fn test_anonymous_first_vote_creates_profile() {
    let engine = TestEngine::memory();
    let f = engine.seed_figure("ada").await;
    let guest = anonymous("guest1");

    engine
        .votes()
        .cast_vote(&guest, &f, EmotionCategory::Surprise)
        .await
        .unwrap();

    let profile = engine.doc(&paths::user(&guest.user_id)).await.unwrap();
    assert_eq!(profile.get("anonymous"), Some(&json!(true)));
    assert_eq!(profile.get("country"), Some(&json!("unknown")));
    assert_eq!(profile.get("gender"), Some(&json!("unknown")));
}

#[tokio::test]
async fn test_vote_on_missing_figure_is_not_found() {
    let engine = TestEngine::memory();
    let missing = integration_tests::unique_figure_id("ghost");
    let err = engine
        .votes()
        .cast_vote(&user("u1"), &missing, AttitudeCategory::Fan)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_voters_all_counted() {
    let engine = std::sync::Arc::new(TestEngine::memory_with(
        TestEngine::contended_retry(),
        EngineLimits::default(),
    ));
    let f = engine.seed_figure("ada").await;

    let mut handles = Vec::new();
    for i in 0..16 {
        let engine = engine.clone();
        let f = f.clone();
        handles.push(tokio::spawn(async move {
            engine
                .votes()
                .cast_vote(&user(&format!("racer{i}")), &f, AttitudeCategory::Fan)
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(engine.figure(&f).await.attitude(AttitudeCategory::Fan), 16);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_same_user_racing_casts_hold_one_unit() {
    let engine = std::sync::Arc::new(TestEngine::memory_with(
        TestEngine::contended_retry(),
        EngineLimits::default(),
    ));
    let f = engine.seed_figure("ada").await;
    let voter = user("racer");
    let record = paths::user_vote(&voter.user_id, &f, VoteKind::Attitude);

    for _ in 0..20 {
        let mut handles = Vec::new();
        for value in [
            AttitudeCategory::Fan,
            AttitudeCategory::Hater,
            AttitudeCategory::Simp,
            AttitudeCategory::Fan,
        ] {
            let engine = engine.clone();
            let f = f.clone();
            let voter = voter.clone();
            handles.push(tokio::spawn(async move {
                engine.votes().cast_vote(&voter, &f, value).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let figure = engine.figure(&f).await;
        match engine.doc(&record).await {
            Some(doc) => {
                assert_eq!(attitude_total(&figure), 1);
                let held = AttitudeCategory::parse(doc["value"].as_str().unwrap()).unwrap();
                assert_eq!(figure.attitude(held), 1);
            }
            None => assert_eq!(attitude_total(&figure), 0),
        }
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_racing_duplicate_comments_post_once() {
    let engine = std::sync::Arc::new(TestEngine::memory_with(
        TestEngine::contended_retry(),
        EngineLimits::default(),
    ));
    let f = engine.seed_figure("ada").await;
    let author = user("eager");

    let mut handles = Vec::new();
    for i in 0..8 {
        let engine = engine.clone();
        let f = f.clone();
        let author = author.clone();
        handles.push(tokio::spawn(async move {
            engine
                .comments()
                .post_comment(&author, &f, PostCommentRequest::new(4, format!("take {i}")))
                .await
        }));
    }
    let mut posted = 0;
    for handle in handles {
        if handle.await.unwrap().is_ok() {
            posted += 1;
        }
    }

    assert_eq!(posted, 1);
    assert_eq!(engine.figure(&f).await.rating_count, 1);
}

// ============================================================================
// Retry Tests
// ============================================================================

#[tokio::test]
async fn test_conflicts_are_retried_transparently() {
    let engine = TestEngine::memory();
    let f = engine.seed_figure("ada").await;
    engine.store().inject_conflicts(3);

    engine
        .votes()
        .cast_vote(&user("u1"), &f, AttitudeCategory::Simp)
        .await
        .unwrap();
    assert_eq!(engine.figure(&f).await.attitude(AttitudeCategory::Simp), 1);
}

#[tokio::test]
async fn test_exhausted_retries_leave_no_partial_state() {
    let engine = TestEngine::memory_with(RetryPolicy::immediate(2), EngineLimits::default());
    let f = engine.seed_figure("ada").await;
    let before = engine.store().snapshot();
    engine.store().inject_conflicts(3);

    let err = engine
        .votes()
        .cast_vote(&anonymous("guest"), &f, AttitudeCategory::Fan)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Unavailable);
    assert_eq!(engine.store().snapshot(), before);
}

// ============================================================================
// Comment & Rating Tests
// ============================================================================

#[tokio::test]
async fn test_rating_breakdown_scenario() {
    let engine = TestEngine::memory();
    let f = engine.seed_figure("ada").await;
    let author = user_from("u1", "PE", "male");

    let posted = engine
        .comments()
        .post_comment(&author, &f, PostCommentRequest::new(4, "great"))
        .await
        .unwrap();
    let view = engine.figures().get_figure(&f).await.unwrap();
    assert_eq!(view.breakdown(4).total("PE"), 1);
    assert_eq!(view.breakdown(4).gender("PE", "male"), 1);
    assert_eq!(view.average_rating, Some(4.0));

    engine
        .comments()
        .delete_comment(&author.user_id, &f, &posted.comment_id)
        .await
        .unwrap();
    let view = engine.figures().get_figure(&f).await.unwrap();
    assert_eq!(view.breakdown(4).total("PE"), 0);
    assert_eq!(view.breakdown(4).gender("PE", "male"), 0);
}

#[tokio::test]
async fn test_delete_restores_rating_aggregates() {
    let engine = TestEngine::memory();
    let f = engine.seed_figure("ada").await;
    for (name, rating) in [("a", 5), ("b", 2), ("c", -1)] {
        engine
            .comments()
            .post_comment(&user(name), &f, PostCommentRequest::new(rating, "opinion"))
            .await
            .unwrap();
    }
    let baseline = engine.figure(&f).await;

    let author = user("d");
    let posted = engine
        .comments()
        .post_comment(&author, &f, PostCommentRequest::new(3, "meh").with_tag("fair"))
        .await
        .unwrap();
    let with_comment = engine.figure(&f).await;
    assert_eq!(with_comment.rating_count, baseline.rating_count + 1);
    assert_eq!(with_comment.rating_sum, baseline.rating_sum + 3);
    assert_eq!(with_comment.histogram(3), baseline.histogram(3) + 1);

    engine
        .comments()
        .delete_comment(&author.user_id, &f, &posted.comment_id)
        .await
        .unwrap();
    let after = engine.figure(&f).await;
    assert_eq!(after.rating_count, baseline.rating_count);
    assert_eq!(after.rating_sum, baseline.rating_sum);
    assert_eq!(after.histogram(3), baseline.histogram(3));
    assert_eq!(after.comment_count, 3);
    assert!(after.is_histogram_consistent());
}

#[tokio::test]
async fn test_unrated_comment_leaves_ratings_alone() {
    let engine = TestEngine::memory();
    let f = engine.seed_figure("ada").await;

    engine
        .comments()
        .post_comment(&user("u1"), &f, PostCommentRequest::new(-1, "no stars"))
        .await
        .unwrap();

    let view = engine.figures().get_figure(&f).await.unwrap();
    assert_eq!(view.figure.rating_count, 0);
    assert_eq!(view.figure.comment_count, 1);
    assert!(view.rating_stats.is_empty());
}

#[tokio::test]
async fn test_delete_never_drives_counters_negative() {
    let engine = TestEngine::memory();
    let f = engine.seed_figure("ada").await;
    let author = user_from("u1", "PE", "female");
    let posted = engine
        .comments()
        .post_comment(&author, &f, PostCommentRequest::new(5, "top"))
        .await
        .unwrap();

    // Aggregates drifted below the comment's contribution
    let figure_path = paths::figure(&f);
    let mut drifted = engine.doc(&figure_path).await.unwrap();
    drifted.insert("ratingCount".to_string(), json!(0));
    drifted.insert("ratingSum".to_string(), json!(2));
    engine.store().insert(figure_path, drifted);

    engine
        .comments()
        .delete_comment(&author.user_id, &f, &posted.comment_id)
        .await
        .unwrap();
    let after = engine.figure(&f).await;
    assert_eq!(after.rating_count, 0);
    assert_eq!(after.rating_sum, 0);
    assert_eq!(after.histogram(5), 0);
}

#[tokio::test]
async fn test_cascade_removes_replies_and_votes() {
    let engine = TestEngine::memory_with(
        RetryPolicy::immediate(3),
        EngineLimits {
            max_cascade_children: 3,
            leaderboard_page_size: 100,
        },
    );
    let f = engine.seed_figure("ada").await;
    let author = user("author");
    let posted = engine
        .comments()
        .post_comment(&author, &f, PostCommentRequest::new(1, "hot take"))
        .await
        .unwrap();
    let c = posted.comment_id;

    for i in 0..3 {
        let replier = user(&format!("replier{i}"));
        let reply = engine
            .comments()
            .post_reply(&replier, &f, &c, PostReplyRequest::new("no"))
            .await
            .unwrap();
        engine
            .votes()
            .vote_on_comment(&user("voter"), &f, &c, Some(&reply.reply_id), CommentReaction::Like)
            .await
            .unwrap();
    }
    engine
        .votes()
        .vote_on_comment(&user("voter"), &f, &c, None, CommentReaction::Dislike)
        .await
        .unwrap();

    let outcome = engine
        .comments()
        .delete_comment(&author.user_id, &f, &c)
        .await
        .unwrap();

    assert_eq!(outcome.children_deleted, 3);
    assert_eq!(outcome.children_deleted + outcome.children_deferred, 7);
    assert!(engine.store().paths_under(&paths::comment(&f, &c)).is_empty());
    assert_eq!(engine.figure(&f).await.rating_count, 0);
}

#[tokio::test]
async fn test_comment_permissions_and_uniqueness() {
    let engine = TestEngine::memory();
    let f = engine.seed_figure("ada").await;
    let author = user("u1");
    let posted = engine
        .comments()
        .post_comment(&author, &f, PostCommentRequest::new(2, "first"))
        .await
        .unwrap();

    let dup = engine
        .comments()
        .post_comment(&author, &f, PostCommentRequest::new(2, "again"))
        .await
        .unwrap_err();
    assert_eq!(dup.kind(), ErrorKind::AlreadyExists);

    let before = engine.store().snapshot();
    let denied = engine
        .comments()
        .delete_comment(&user("intruder").user_id, &f, &posted.comment_id)
        .await
        .unwrap_err();
    assert_eq!(denied.kind(), ErrorKind::PermissionDenied);
    assert_eq!(engine.store().snapshot(), before);

    // The author can comment again once the first comment is gone
    engine
        .comments()
        .delete_comment(&author.user_id, &f, &posted.comment_id)
        .await
        .unwrap();
    engine
        .comments()
        .post_comment(&author, &f, PostCommentRequest::new(3, "second thoughts"))
        .await
        .unwrap();
}

// ============================================================================
// Streak Tests
// ============================================================================

#[tokio::test]
async fn test_streak_scenario() {
    let engine = TestEngine::memory();
    let f = engine.seed_figure("ada").await;
    let u = user("u1");

    let mut streaks = Vec::new();
    for iso in ["2024-01-01", "2024-01-02", "2024-01-05"] {
        let response = engine
            .streaks()
            .record_activity(&u.user_id, &f, tally_core::ActivityKind::Comment, day(iso))
            .await
            .unwrap();
        assert!(response.streak_gained);
        streaks.push(response.new_streak);
    }
    assert_eq!(streaks, vec![1, 2, 1]);

    let public = engine.doc(&paths::public_streak(&f, &u.user_id)).await.unwrap();
    assert_eq!(public.get("currentStreak"), Some(&json!(1)));
    assert_eq!(public.get("longestStreak"), Some(&json!(2)));
    assert_eq!(public.get("lastActivityDate"), Some(&json!("2024-01-05")));
}

#[tokio::test]
async fn test_same_day_counts_once() {
    let engine = TestEngine::memory();
    let f = engine.seed_figure("ada").await;
    let u = user("u1");

    let mut gained = 0;
    for _ in 0..5 {
        let response = engine
            .streaks()
            .record_activity(&u.user_id, &f, tally_core::ActivityKind::Vote, day("2024-03-10"))
            .await
            .unwrap();
        gained += i32::from(response.streak_gained);
        assert_eq!(response.new_streak, 1);
    }
    assert_eq!(gained, 1);

    let next = engine
        .streaks()
        .record_activity(&u.user_id, &f, tally_core::ActivityKind::Share, day("2024-03-11"))
        .await
        .unwrap();
    assert_eq!(next.new_streak, 2);

    let gap = engine
        .streaks()
        .record_activity(&u.user_id, &f, tally_core::ActivityKind::Share, day("2024-03-14"))
        .await
        .unwrap();
    assert_eq!(gap.new_streak, 1);
}

#[tokio::test]
async fn test_leaderboard_shows_only_active_streaks() {
    let engine = TestEngine::memory();
    let f = engine.seed_figure("ada").await;
    for (name, days) in [
        ("amy", vec!["2024-05-01", "2024-05-02", "2024-05-03"]),
        ("ben", vec!["2024-05-03"]),
        ("cyd", vec!["2024-04-01", "2024-04-02"]),
    ] {
        for iso in days {
            engine
                .streaks()
                .record_activity(&user(name).user_id, &f, tally_core::ActivityKind::Vote, day(iso))
                .await
                .unwrap();
        }
    }

    let board = engine.streaks().leaderboard(&f, day("2024-05-04"), 10).await.unwrap();
    let names: Vec<_> = board.iter().map(|e| e.user_id.to_string()).collect();
    assert_eq!(names, vec!["amy", "ben"]);
    assert_eq!(board[0].current_streak, 3);
}

// ============================================================================
// Projection Tests
// ============================================================================

#[tokio::test]
async fn test_projection_rolls_back_failed_vote() {
    let engine = TestEngine::memory_with(RetryPolicy::immediate(0), EngineLimits::default());
    let f = engine.seed_figure("ada").await;
    let u = user("u1");
    let projections = ProjectionStore::new();
    let key = ProjectionKey::vote(u.user_id.clone(), f.clone(), VoteKind::Attitude);

    let confirmed = VoteView::of(&engine.figure(&f).await, None);
    projections.confirmed(key.clone(), confirmed.clone());

    let ticket = projections.begin(&key, |v| {
        v.cast(AttitudeCategory::Fan);
    });
    let ticket = ticket.unwrap();
    engine.store().inject_conflicts(1);
    let result = engine.votes().cast_vote(&u, &f, AttitudeCategory::Fan).await;
    assert!(result.is_err());

    let restored = projections.rollback(ticket).unwrap();
    assert_eq!(restored, confirmed);
    assert_eq!(engine.figure(&f).await.attitude(AttitudeCategory::Fan), 0);

    // Retry succeeds and the speculative view matches the committed state
    let ticket = projections
        .begin(&key, |v| {
            v.cast(AttitudeCategory::Fan);
        })
        .unwrap();
    engine.votes().cast_vote(&u, &f, AttitudeCategory::Fan).await.unwrap();
    let authoritative = VoteView::of(&engine.figure(&f).await, Some(AttitudeCategory::Fan));
    assert_eq!(projections.view(&key), Some(authoritative.clone()));
    projections.commit(ticket, Some(authoritative)).unwrap();
    assert!(!projections.is_in_flight(&key));
}

#[tokio::test]
async fn test_rating_projection_matches_engine() {
    let engine = TestEngine::memory();
    let f = engine.seed_figure("ada").await;
    let author = user_from("u1", "PE", "female");
    let projections = ProjectionStore::new();
    let key = ProjectionKey::new(author.user_id.clone(), f.clone(), ProjectionKind::Rating);
    projections.confirmed(key.clone(), engine.figure(&f).await);

    let ticket = projections
        .begin(&key, |figure| {
            project_comment(figure, Rating::new(4).unwrap(), author.demographics());
        })
        .unwrap();
    engine
        .comments()
        .post_comment(&author, &f, PostCommentRequest::new(4, "predictable"))
        .await
        .unwrap();

    assert_eq!(projections.view(&key), Some(engine.figure(&f).await));
    projections.commit(ticket, None).unwrap();
}

// ============================================================================
// PostgreSQL
// ============================================================================

#[tokio::test]
async fn test_postgres_vote_and_comment_roundtrip() {
    let Some(engine) = TestEngine::postgres().await.unwrap() else {
        return;
    };
    let f = engine.seed_figure("pg").await;
    let u = user_from(&format!("pg-{}", integration_tests::unique_suffix()), "PE", "female");

    engine.votes().cast_vote(&u, &f, AttitudeCategory::Fan).await.unwrap();
    engine.votes().cast_vote(&u, &f, AttitudeCategory::Hater).await.unwrap();
    let posted = engine
        .comments()
        .post_comment(&u, &f, PostCommentRequest::new(4, "from postgres"))
        .await
        .unwrap();

    let view = engine.figures().get_figure(&f).await.unwrap();
    assert_eq!(view.figure.attitude(AttitudeCategory::Hater), 1);
    assert_eq!(view.figure.attitude(AttitudeCategory::Fan), 0);
    assert_eq!(view.breakdown(4).total("PE"), 1);

    engine
        .comments()
        .delete_comment(&u.user_id, &f, &posted.comment_id)
        .await
        .unwrap();
    assert_eq!(engine.figure(&f).await.rating_count, 0);
}
