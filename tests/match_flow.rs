mod common;

use common::{
    SPORT, contended_state, player_rating, score, scheduled_match, state, state_with, team,
    team_view,
};
use matchday_back::{
    config::AppConfig,
    dto::{
        activities::CreateActivityRequest,
        matches::{GoalInput, RecordGoalsRequest, TeamActionRequest},
    },
    error::ServiceError,
    rating::{MatchResult, TeamTier},
    services::{activity_service, match_service},
    state::match_lifecycle::MatchStatus,
};

#[tokio::test]
async fn agreed_scores_confirm_and_credit_both_sides() {
    let state = state();
    let home = team(&state, "Harbour FC", "alice", &["ann"]).await;
    let away = team(&state, "Rovers", "bob", &["ben"]).await;

    let proposed = match_service::propose(
        &state,
        "alice",
        matchday_back::dto::matches::ProposeMatchRequest {
            home_team_id: Some(home.id),
            away_team_id: Some(away.id),
            sport: Some("soccer".into()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(proposed.status, MatchStatus::Proposed);

    let accepted = match_service::accept(&state, proposed.id, "bob").await.unwrap();
    assert_eq!(accepted.status, MatchStatus::Scheduled);

    let after_home = match_service::submit_score(&state, proposed.id, "alice", score(home.id, 2, 1))
        .await
        .unwrap();
    assert_eq!(after_home.status, MatchStatus::HomeSubmitted);
    assert_eq!(after_home.home_score, Some(2));
    assert_eq!(after_home.away_score, None);

    let confirmed = match_service::submit_score(&state, proposed.id, "bob", score(away.id, 1, 2))
        .await
        .unwrap();
    assert_eq!(confirmed.status, MatchStatus::Confirmed);
    assert_eq!(confirmed.home_score, Some(2));
    assert_eq!(confirmed.away_score, Some(1));
    assert!(confirmed.confirmed_at.is_some());

    let home_rating = team_view(&state, home.id).await.rating;
    assert_eq!(home_rating.tp, 7);
    assert_eq!(home_rating.wins, 1);
    assert_eq!(home_rating.win_streak, 1);
    assert_eq!(home_rating.tier, TeamTier::Rookie);

    let away_rating = team_view(&state, away.id).await.rating;
    assert_eq!(away_rating.tp, 3);
    assert_eq!(away_rating.games, 1);
    assert_eq!(away_rating.wins, 0);

    for identity in ["alice", "ann"] {
        let bucket = player_rating(&state, identity).await;
        assert_eq!(bucket.points, 7, "{identity}");
        assert_eq!(bucket.wins, 1);
    }
    for identity in ["bob", "ben"] {
        assert_eq!(player_rating(&state, identity).await.points, 3, "{identity}");
    }
}

#[tokio::test]
async fn confirmed_matches_reject_new_scores_and_never_credit_twice() {
    let state = state();
    let home = team(&state, "Home", "alice", &[]).await;
    let away = team(&state, "Away", "bob", &[]).await;
    let fixture = scheduled_match(&state, &home, &away).await;

    match_service::submit_score(&state, fixture.id, "alice", score(home.id, 1, 1))
        .await
        .unwrap();
    match_service::submit_score(&state, fixture.id, "bob", score(away.id, 1, 1))
        .await
        .unwrap();

    for (caller, team_id) in [("alice", home.id), ("bob", away.id)] {
        let err = match_service::submit_score(&state, fixture.id, caller, score(team_id, 3, 0))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)), "{err:?}");
    }

    let replayed = match_service::settle_match(
        &state,
        fixture.id,
        "alice",
        TeamActionRequest {
            team_id: Some(home.id),
        },
    )
    .await
    .unwrap();
    assert_eq!(replayed.status, MatchStatus::Confirmed);

    // a draw is worth 4 and stays worth 4 after the replay
    assert_eq!(team_view(&state, home.id).await.rating.tp, 4);
    assert_eq!(team_view(&state, away.id).await.rating.tp, 4);
    assert_eq!(player_rating(&state, "alice").await.games, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_agreeing_submissions_credit_exactly_once() {
    let mut conflicts = 0;
    for _ in 0..20 {
        let (state, store) = contended_state();
        let home = team(&state, "Home", "alice", &["ann"]).await;
        let away = team(&state, "Away", "bob", &[]).await;
        let fixture = scheduled_match(&state, &home, &away).await;
        let before = store.conflicts();

        let (from_home, from_away) = tokio::join!(
            match_service::submit_score(&state, fixture.id, "alice", score(home.id, 3, 0)),
            match_service::submit_score(&state, fixture.id, "bob", score(away.id, 0, 3)),
        );
        from_home.unwrap();
        from_away.unwrap();
        conflicts += store.conflicts() - before;

        let fixture = match_service::get_match(&state, fixture.id).await.unwrap();
        assert_eq!(fixture.status, MatchStatus::Confirmed);

        let home_rating = team_view(&state, home.id).await.rating;
        assert_eq!(home_rating.tp, 7);
        assert_eq!(home_rating.games, 1);
        assert_eq!(team_view(&state, away.id).await.rating.tp, 3);
        assert_eq!(player_rating(&state, "ann").await.points, 7);
    }
    assert!(conflicts > 0, "submissions never raced");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_settles_do_not_double_credit() {
    let (state, _) = contended_state();
    let home = team(&state, "Home", "alice", &["ann"]).await;
    let away = team(&state, "Away", "bob", &["ben"]).await;
    let fixture = scheduled_match(&state, &home, &away).await;
    match_service::submit_score(&state, fixture.id, "alice", score(home.id, 0, 2))
        .await
        .unwrap();
    match_service::submit_score(&state, fixture.id, "bob", score(away.id, 2, 0))
        .await
        .unwrap();

    let match_id = fixture.id;
    let settle = |caller: &'static str, team_id| {
        let state = state.clone();
        tokio::spawn(async move {
            match_service::settle_match(
                &state,
                match_id,
                caller,
                TeamActionRequest {
                    team_id: Some(team_id),
                },
            )
            .await
        })
    };
    let (a, b) = tokio::join!(settle("alice", home.id), settle("bob", away.id));
    a.unwrap().unwrap();
    b.unwrap().unwrap();
    let (c, d) = tokio::join!(
        match_service::settle_match(
            &state,
            match_id,
            "alice",
            TeamActionRequest {
                team_id: Some(home.id),
            },
        ),
        match_service::settle_match(
            &state,
            match_id,
            "bob",
            TeamActionRequest {
                team_id: Some(away.id),
            },
        ),
    );
    c.unwrap();
    d.unwrap();

    assert_eq!(team_view(&state, away.id).await.rating.tp, 7);
    assert_eq!(team_view(&state, home.id).await.rating.tp, 3);
    assert_eq!(player_rating(&state, "ben").await.points, 7);
    assert_eq!(player_rating(&state, "ann").await.points, 3);
}

#[tokio::test]
async fn settle_stays_exact_after_the_ledger_rolls_over() {
    let state = state_with(AppConfig {
        ledger_capacity: 1,
        ..AppConfig::default()
    });
    let home = team(&state, "Home", "alice", &["ann"]).await;
    let away = team(&state, "Away", "bob", &[]).await;
    let fixture = scheduled_match(&state, &home, &away).await;
    match_service::submit_score(&state, fixture.id, "alice", score(home.id, 1, 0))
        .await
        .unwrap();
    match_service::submit_score(&state, fixture.id, "bob", score(away.id, 0, 1))
        .await
        .unwrap();
    assert_eq!(team_view(&state, home.id).await.rating.tp, 7);

    // later outcomes push the match out of every bounded ledger
    for _ in 0..3 {
        let activity = activity_service::create_activity(
            &state,
            "alice",
            CreateActivityRequest {
                club_id: Some(home.id),
                sport: Some(SPORT.into()),
                title: Some("Training".into()),
                scheduled_at: None,
            },
        )
        .await
        .unwrap();
        activity_service::join(&state, activity.id, "ann").await.unwrap();
        activity_service::complete(&state, activity.id, "alice")
            .await
            .unwrap();
    }
    let tp_before = team_view(&state, home.id).await.rating.tp;
    let ann_before = player_rating(&state, "ann").await.points;
    assert_eq!(tp_before, 7 + 3 * 5);

    for _ in 0..2 {
        match_service::settle_match(
            &state,
            fixture.id,
            "alice",
            TeamActionRequest {
                team_id: Some(home.id),
            },
        )
        .await
        .unwrap();
    }

    assert_eq!(team_view(&state, home.id).await.rating.tp, tp_before);
    assert_eq!(player_rating(&state, "ann").await.points, ann_before);
    assert_eq!(team_view(&state, away.id).await.rating.tp, 3);
}

#[tokio::test]
async fn disagreeing_scores_dispute_until_a_captain_corrects() {
    let state = state();
    let home = team(&state, "Home", "alice", &[]).await;
    let away = team(&state, "Away", "bob", &[]).await;
    let fixture = scheduled_match(&state, &home, &away).await;

    match_service::submit_score(&state, fixture.id, "alice", score(home.id, 2, 1))
        .await
        .unwrap();
    let disputed = match_service::submit_score(&state, fixture.id, "bob", score(away.id, 2, 2))
        .await
        .unwrap();
    assert_eq!(disputed.status, MatchStatus::Disputed);
    assert_eq!(disputed.home_score, Some(2));
    assert_eq!(disputed.away_score, Some(2));
    assert_eq!(team_view(&state, home.id).await.rating.games, 0);

    let settle_err = match_service::settle_match(
        &state,
        fixture.id,
        "alice",
        TeamActionRequest {
            team_id: Some(home.id),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(settle_err, ServiceError::InvalidState(_)));

    let corrected = match_service::submit_score(&state, fixture.id, "bob", score(away.id, 1, 2))
        .await
        .unwrap();
    assert_eq!(corrected.status, MatchStatus::Confirmed);
    assert_eq!(corrected.away_score, Some(1));
    assert_eq!(team_view(&state, home.id).await.rating.tp, 7);
}

#[tokio::test]
async fn submissions_are_checked_before_anything_is_written() {
    let state = state();
    let home = team(&state, "Home", "alice", &[]).await;
    let away = team(&state, "Away", "bob", &[]).await;
    let outsider = team(&state, "Outsiders", "olga", &[]).await;
    let fixture = scheduled_match(&state, &home, &away).await;

    let negative = match_service::submit_score(&state, fixture.id, "alice", score(home.id, -1, 0))
        .await
        .unwrap_err();
    assert!(matches!(negative, ServiceError::InvalidArgument(_)));

    let mut missing = score(home.id, 1, 0);
    missing.their_score = None;
    let missing = match_service::submit_score(&state, fixture.id, "alice", missing)
        .await
        .unwrap_err();
    assert!(matches!(missing, ServiceError::InvalidArgument(_)));

    let wrong_captain = match_service::submit_score(&state, fixture.id, "bob", score(home.id, 1, 0))
        .await
        .unwrap_err();
    assert!(matches!(wrong_captain, ServiceError::Forbidden(_)));

    let not_a_party =
        match_service::submit_score(&state, fixture.id, "olga", score(outsider.id, 1, 0))
            .await
            .unwrap_err();
    assert!(matches!(not_a_party, ServiceError::InvalidState(_)));

    let unknown = match_service::submit_score(&state, uuid::Uuid::new_v4(), "alice", score(home.id, 1, 0))
        .await
        .unwrap_err();
    assert!(matches!(unknown, ServiceError::NotFound(_)));

    let untouched = match_service::get_match(&state, fixture.id).await.unwrap();
    assert_eq!(untouched.status, MatchStatus::Scheduled);
    assert!(untouched.home_submitted_by.is_none());
}

#[tokio::test]
async fn proposals_need_the_home_captain_and_responses_the_away_captain() {
    let state = state();
    let home = team(&state, "Home", "alice", &[]).await;
    let away = team(&state, "Away", "bob", &[]).await;

    let request = |home_id, away_id| matchday_back::dto::matches::ProposeMatchRequest {
        home_team_id: Some(home_id),
        away_team_id: Some(away_id),
        sport: Some("soccer".into()),
        ..Default::default()
    };

    let err = match_service::propose(&state, "bob", request(home.id, away.id))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Forbidden(_)));

    let err = match_service::propose(&state, "alice", request(home.id, home.id))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidArgument(_)));

    let err = match_service::propose(&state, "alice", request(home.id, uuid::Uuid::new_v4()))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));

    let proposed = match_service::propose(&state, "alice", request(home.id, away.id))
        .await
        .unwrap();
    let err = match_service::accept(&state, proposed.id, "alice").await.unwrap_err();
    assert!(matches!(err, ServiceError::Forbidden(_)));

    let declined = match_service::decline(&state, proposed.id, "bob").await.unwrap();
    assert_eq!(declined.status, MatchStatus::Declined);
    let err = match_service::accept(&state, proposed.id, "bob").await.unwrap_err();
    assert!(matches!(err, ServiceError::InvalidState(_)));
}

#[tokio::test]
async fn goals_credit_scorers_and_assisters_once() {
    let state = state();
    let home = team(&state, "Home", "alice", &["ann", "amy"]).await;
    let away = team(&state, "Away", "bob", &[]).await;
    let fixture = scheduled_match(&state, &home, &away).await;

    let goals = RecordGoalsRequest {
        team_id: Some(home.id),
        goals: vec![GoalInput {
            scorer: "ann".into(),
            count: 2,
            assist: Some("amy".into()),
        }],
    };
    let early = match_service::record_goals(&state, fixture.id, "alice", goals)
        .await
        .unwrap_err();
    assert!(matches!(early, ServiceError::InvalidState(_)));

    // lifecycle is checked before the roster
    let stranger = RecordGoalsRequest {
        team_id: Some(home.id),
        goals: vec![GoalInput {
            scorer: "zed".into(),
            count: 1,
            assist: None,
        }],
    };
    let early = match_service::record_goals(&state, fixture.id, "alice", stranger)
        .await
        .unwrap_err();
    assert!(matches!(early, ServiceError::InvalidState(_)));

    match_service::submit_score(&state, fixture.id, "alice", score(home.id, 3, 1))
        .await
        .unwrap();
    match_service::submit_score(&state, fixture.id, "bob", score(away.id, 1, 3))
        .await
        .unwrap();

    let recorded = match_service::record_goals(
        &state,
        fixture.id,
        "alice",
        RecordGoalsRequest {
            team_id: Some(home.id),
            goals: vec![GoalInput {
                scorer: "ann".into(),
                count: 2,
                assist: Some("amy".into()),
            }],
        },
    )
    .await
    .unwrap();
    assert_eq!(recorded.goals.len(), 1);

    let ann = player_rating(&state, "ann").await;
    assert_eq!(ann.points, 7 + 4);
    assert_eq!(ann.goals, 2);
    let amy = player_rating(&state, "amy").await;
    assert_eq!(amy.points, 7);
    assert_eq!(amy.assists, 1);

    // only one more goal fits under the confirmed score of 3
    let too_many = match_service::record_goals(
        &state,
        fixture.id,
        "alice",
        RecordGoalsRequest {
            team_id: Some(home.id),
            goals: vec![GoalInput {
                scorer: "alice".into(),
                count: 2,
                assist: None,
            }],
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(too_many, ServiceError::InvalidArgument(_)));

    let stranger = match_service::record_goals(
        &state,
        fixture.id,
        "alice",
        RecordGoalsRequest {
            team_id: Some(home.id),
            goals: vec![GoalInput {
                scorer: "bob".into(),
                count: 1,
                assist: None,
            }],
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(stranger, ServiceError::InvalidArgument(_)));

    match_service::settle_match(
        &state,
        fixture.id,
        "bob",
        TeamActionRequest {
            team_id: Some(away.id),
        },
    )
    .await
    .unwrap();
    assert_eq!(player_rating(&state, "ann").await.points, 11);
    assert_eq!(team_view(&state, home.id).await.rating.tp, 7);
}

#[tokio::test]
async fn alternating_results_reset_the_team_streak() {
    let state = state();
    let home = team(&state, "Home", "alice", &[]).await;
    let away = team(&state, "Away", "bob", &[]).await;

    let mut expected_tp = 0;
    for (ours, theirs, result) in [
        (1, 0, MatchResult::Win),
        (0, 1, MatchResult::Loss),
        (2, 0, MatchResult::Win),
        (3, 1, MatchResult::Win),
    ] {
        let fixture = scheduled_match(&state, &home, &away).await;
        match_service::submit_score(&state, fixture.id, "alice", score(home.id, ours, theirs))
            .await
            .unwrap();
        match_service::submit_score(&state, fixture.id, "bob", score(away.id, theirs, ours))
            .await
            .unwrap();
        let rating = team_view(&state, home.id).await.rating;
        expected_tp += match (result, rating.win_streak) {
            (MatchResult::Win, 2) => 8,
            (MatchResult::Win, _) => 7,
            _ => 3,
        };
        assert_eq!(rating.tp, expected_tp);
        if result != MatchResult::Win {
            assert_eq!(rating.win_streak, 0);
        }
        assert!(rating.win_streak <= 2);
    }

    let listed = match_service::list_matches_for_team(&state, home.id).await.unwrap();
    assert_eq!(listed.len(), 4);
    assert!(listed.iter().all(|fixture| fixture.status == MatchStatus::Confirmed));
}

#[tokio::test]
async fn outcomes_are_announced_on_the_event_stream() {
    let state = state();
    let home = team(&state, "Home", "alice", &[]).await;
    let away = team(&state, "Away", "bob", &[]).await;
    let fixture = scheduled_match(&state, &home, &away).await;
    let mut events = state.outcomes().subscribe();

    match_service::submit_score(&state, fixture.id, "alice", score(home.id, 4, 2))
        .await
        .unwrap();
    match_service::submit_score(&state, fixture.id, "bob", score(away.id, 2, 3))
        .await
        .unwrap();
    match_service::submit_score(&state, fixture.id, "bob", score(away.id, 2, 4))
        .await
        .unwrap();

    let disputed = events.recv().await.unwrap();
    assert_eq!(disputed.event.as_deref(), Some("match.disputed"));
    let confirmed = events.recv().await.unwrap();
    assert_eq!(confirmed.event.as_deref(), Some("match.confirmed"));
    let payload: serde_json::Value = serde_json::from_str(&confirmed.data).unwrap();
    assert_eq!(payload["homeScore"], 4);
    assert_eq!(payload["homeResult"], "win");
}
