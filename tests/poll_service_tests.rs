use pollhub::{
    repositories::{
        poll_repository::SqlitePollRepository, user_repository::SqliteUserRepository,
    },
    services::{
        poll_service::{PollService, PollServiceError},
        CreatePollRequest,
    },
    test_utils::test_helpers,
};
use sqlx::SqlitePool;
use std::sync::Arc;

fn service_over(pool: SqlitePool) -> PollService {
    let users = Arc::new(SqliteUserRepository::new(pool.clone()));
    let polls = Arc::new(SqlitePollRepository::new(pool));
    PollService::new(polls, users)
}

#[tokio::test]
async fn test_create_poll_and_get() {
    let pool = test_helpers::create_test_db().await.unwrap();
    let user_id = test_helpers::insert_test_user(&pool, "alice@example.com", "password123", true)
        .await
        .unwrap();
    let service = service_over(pool);

    let summary = service
        .create_poll(
            user_id,
            CreatePollRequest {
                question: "Best language?".to_string(),
                description: Some("Pick one".to_string()),
                options: vec!["Rust".to_string(), "Go".to_string(), "Python".to_string()],
            },
        )
        .await
        .unwrap();

    assert_eq!(summary.question, "Best language?");
    assert_eq!(summary.options.len(), 3);
    assert_eq!(summary.total_votes, 0);
    assert_eq!(summary.created_by.id, user_id);
    assert!(summary.options.iter().all(|o| o.votes == 0 && o.percentage == 0.0));

    let fetched = service.get_poll(summary.id, None).await.unwrap();
    assert_eq!(fetched.id, summary.id);
}

#[tokio::test]
async fn test_create_poll_requires_two_options() {
    let pool = test_helpers::create_test_db().await.unwrap();
    let user_id = test_helpers::insert_test_user(&pool, "alice@example.com", "password123", true)
        .await
        .unwrap();
    let service = service_over(pool);

    let result = service
        .create_poll(
            user_id,
            CreatePollRequest {
                question: "Lonely option?".to_string(),
                description: None,
                options: vec!["Only one".to_string()],
            },
        )
        .await;

    assert!(matches!(result, Err(PollServiceError::Validation(_))));
}

#[tokio::test]
async fn test_vote_and_results_percentages() {
    let pool = test_helpers::create_test_db().await.unwrap();
    let owner = test_helpers::insert_test_user(&pool, "owner@example.com", "password123", true)
        .await
        .unwrap();
    let (poll_id, option_ids) =
        test_helpers::create_test_poll(&pool, owner, "Pizza?", &["Yes", "No", "Maybe"])
            .await
            .unwrap();

    let service = service_over(pool.clone());

    // Three voters: two for the first option, one for the second
    for (i, option) in [option_ids[0], option_ids[0], option_ids[1]].iter().enumerate() {
        let voter = test_helpers::insert_test_user(
            &pool,
            &format!("voter{}@example.com", i),
            "password123",
            true,
        )
        .await
        .unwrap();
        service.cast_vote(voter, poll_id, *option).await.unwrap();
    }

    let results = service.poll_results(poll_id).await.unwrap();
    assert_eq!(results.total_votes, 3);

    let by_id = |id: i64| results.options.iter().find(|o| o.id == id).unwrap();
    assert_eq!(by_id(option_ids[0]).votes, 2);
    assert_eq!(by_id(option_ids[0]).percentage, 66.67);
    assert_eq!(by_id(option_ids[1]).votes, 1);
    assert_eq!(by_id(option_ids[1]).percentage, 33.33);
    assert_eq!(by_id(option_ids[2]).votes, 0);
    assert_eq!(by_id(option_ids[2]).percentage, 0.0);
}

#[tokio::test]
async fn test_duplicate_vote_rejected() {
    let pool = test_helpers::create_test_db().await.unwrap();
    let owner = test_helpers::insert_test_user(&pool, "owner@example.com", "password123", true)
        .await
        .unwrap();
    let voter = test_helpers::insert_test_user(&pool, "voter@example.com", "password123", true)
        .await
        .unwrap();
    let (poll_id, option_ids) =
        test_helpers::create_test_poll(&pool, owner, "Pizza?", &["Yes", "No"])
            .await
            .unwrap();

    let service = service_over(pool);

    service.cast_vote(voter, poll_id, option_ids[0]).await.unwrap();

    // Second vote fails even when it targets a different option
    let result = service.cast_vote(voter, poll_id, option_ids[1]).await;
    assert!(matches!(result, Err(PollServiceError::DuplicateVote)));

    let results = service.poll_results(poll_id).await.unwrap();
    assert_eq!(results.total_votes, 1);
}

#[tokio::test]
async fn test_concurrent_duplicate_votes_single_winner() {
    let (pool, _db_file) = test_helpers::create_test_db_file().await.unwrap();
    let owner = test_helpers::insert_test_user(&pool, "owner@example.com", "password123", true)
        .await
        .unwrap();
    let voter = test_helpers::insert_test_user(&pool, "voter@example.com", "password123", true)
        .await
        .unwrap();
    let (poll_id, option_ids) =
        test_helpers::create_test_poll(&pool, owner, "Race?", &["Yes", "No"])
            .await
            .unwrap();

    let service = Arc::new(service_over(pool.clone()));

    // Two simultaneous votes from the same user; the unique constraint lets
    // exactly one through regardless of interleaving
    let (option_a, option_b) = (option_ids[0], option_ids[1]);
    let first = tokio::spawn({
        let service = service.clone();
        async move { service.cast_vote(voter, poll_id, option_a).await }
    });
    let second = tokio::spawn({
        let service = service.clone();
        async move { service.cast_vote(voter, poll_id, option_b).await }
    });

    let first = first.await.unwrap();
    let second = second.await.unwrap();

    assert_eq!(first.is_ok() as u8 + second.is_ok() as u8, 1);
    let loser = if first.is_ok() { second } else { first };
    assert!(matches!(loser, Err(PollServiceError::DuplicateVote)));

    let results = service.poll_results(poll_id).await.unwrap();
    assert_eq!(results.total_votes, 1);
}

#[tokio::test]
async fn test_vote_option_from_another_poll() {
    let pool = test_helpers::create_test_db().await.unwrap();
    let owner = test_helpers::insert_test_user(&pool, "owner@example.com", "password123", true)
        .await
        .unwrap();
    let (poll_a, _) = test_helpers::create_test_poll(&pool, owner, "A?", &["a1", "a2"])
        .await
        .unwrap();
    let (_, options_b) = test_helpers::create_test_poll(&pool, owner, "B?", &["b1", "b2"])
        .await
        .unwrap();

    let service = service_over(pool);

    let result = service.cast_vote(owner, poll_a, options_b[0]).await;
    assert!(matches!(result, Err(PollServiceError::OptionNotFound)));
}

#[tokio::test]
async fn test_vote_on_missing_poll() {
    let pool = test_helpers::create_test_db().await.unwrap();
    let voter = test_helpers::insert_test_user(&pool, "voter@example.com", "password123", true)
        .await
        .unwrap();
    let service = service_over(pool);

    let result = service.cast_vote(voter, 9999, 1).await;
    assert!(matches!(result, Err(PollServiceError::PollNotFound)));
}

#[tokio::test]
async fn test_list_polls_annotates_viewer_vote() {
    let pool = test_helpers::create_test_db().await.unwrap();
    let owner = test_helpers::insert_test_user(&pool, "owner@example.com", "password123", true)
        .await
        .unwrap();
    let viewer = test_helpers::insert_test_user(&pool, "viewer@example.com", "password123", true)
        .await
        .unwrap();
    let (poll_id, option_ids) =
        test_helpers::create_test_poll(&pool, owner, "Tabs or spaces?", &["Tabs", "Spaces"])
            .await
            .unwrap();

    let service = service_over(pool);
    service.cast_vote(viewer, poll_id, option_ids[1]).await.unwrap();

    let polls = service.list_polls(Some(viewer)).await.unwrap();
    let poll = polls.iter().find(|p| p.id == poll_id).unwrap();
    let user_vote = poll.user_vote.as_ref().unwrap();
    assert_eq!(user_vote.option_id, option_ids[1]);

    // Anonymous listing carries no vote annotation
    let polls = service.list_polls(None).await.unwrap();
    let poll = polls.iter().find(|p| p.id == poll_id).unwrap();
    assert!(poll.user_vote.is_none());
}

#[tokio::test]
async fn test_delete_poll_owner_only() {
    let pool = test_helpers::create_test_db().await.unwrap();
    let owner = test_helpers::insert_test_user(&pool, "owner@example.com", "password123", true)
        .await
        .unwrap();
    let other = test_helpers::insert_test_user(&pool, "other@example.com", "password123", true)
        .await
        .unwrap();
    let (poll_id, _) = test_helpers::create_test_poll(&pool, owner, "Mine?", &["Yes", "No"])
        .await
        .unwrap();

    let service = service_over(pool);

    let result = service.delete_poll(poll_id, other).await;
    assert!(matches!(result, Err(PollServiceError::NotOwner)));

    service.delete_poll(poll_id, owner).await.unwrap();

    let result = service.get_poll(poll_id, None).await;
    assert!(matches!(result, Err(PollServiceError::PollNotFound)));
}

#[tokio::test]
async fn test_delete_poll_cascades() {
    let pool = test_helpers::create_test_db().await.unwrap();
    let owner = test_helpers::insert_test_user(&pool, "owner@example.com", "password123", true)
        .await
        .unwrap();
    let voter = test_helpers::insert_test_user(&pool, "voter@example.com", "password123", true)
        .await
        .unwrap();
    let (poll_id, option_ids) =
        test_helpers::create_test_poll(&pool, owner, "Gone soon?", &["Yes", "No"])
            .await
            .unwrap();

    let service = service_over(pool.clone());
    service.cast_vote(voter, poll_id, option_ids[0]).await.unwrap();
    service.delete_poll(poll_id, owner).await.unwrap();

    let options: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM options WHERE poll_id = ?")
        .bind(poll_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    let votes: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM votes WHERE poll_id = ?")
        .bind(poll_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(options, 0);
    assert_eq!(votes, 0);
}

#[tokio::test]
async fn test_user_stats() {
    let pool = test_helpers::create_test_db().await.unwrap();
    let owner = test_helpers::insert_test_user(&pool, "owner@example.com", "password123", true)
        .await
        .unwrap();
    let voter = test_helpers::insert_test_user(&pool, "voter@example.com", "password123", true)
        .await
        .unwrap();

    let (quiet_poll, _) = test_helpers::create_test_poll(&pool, owner, "Quiet?", &["Yes", "No"])
        .await
        .unwrap();
    let (busy_poll, busy_options) =
        test_helpers::create_test_poll(&pool, owner, "Busy?", &["Yes", "No"])
            .await
            .unwrap();

    let service = service_over(pool);
    service.cast_vote(voter, busy_poll, busy_options[0]).await.unwrap();
    service.cast_vote(owner, busy_poll, busy_options[1]).await.unwrap();

    let stats = service.user_stats(owner).await.unwrap();
    assert_eq!(stats.polls_created, 2);
    assert_eq!(stats.votes_cast, 1);
    assert_eq!(stats.total_votes_received, 2);
    let popular = stats.most_popular_poll.unwrap();
    assert_eq!(popular.id, busy_poll);
    assert_ne!(popular.id, quiet_poll);
}

#[tokio::test]
async fn test_my_votes_detail() {
    let pool = test_helpers::create_test_db().await.unwrap();
    let owner = test_helpers::insert_test_user(&pool, "owner@example.com", "password123", true)
        .await
        .unwrap();
    let voter = test_helpers::insert_test_user(&pool, "voter@example.com", "password123", true)
        .await
        .unwrap();
    let (poll_id, option_ids) =
        test_helpers::create_test_poll(&pool, owner, "Coffee?", &["Yes", "No"])
            .await
            .unwrap();

    let service = service_over(pool);
    service.cast_vote(voter, poll_id, option_ids[0]).await.unwrap();

    let votes = service.my_votes(voter).await.unwrap();
    assert_eq!(votes.len(), 1);
    assert_eq!(votes[0].poll_id, poll_id);
    assert_eq!(votes[0].poll_question, "Coffee?");
    assert_eq!(votes[0].option_text, "Yes");
}
