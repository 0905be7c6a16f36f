use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use pollhub::test_utils::test_helpers;
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tower::ServiceExt;

async fn test_app() -> (Router, SqlitePool) {
    let pool = test_helpers::create_test_db().await.unwrap();
    let state = test_helpers::build_test_state(pool.clone());
    (pollhub::app(state, None), pool)
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn login(app: &Router, email: &str, password: &str) -> String {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            None,
            json!({ "email": email, "password": password }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health_endpoint() {
    let (app, _pool) = test_app().await;

    let response = app.oneshot(get_request("/api/health", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_register_verify_login_flow() {
    let (app, pool) = test_app().await;

    // Register
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/register",
            None,
            json!({
                "name": "Alice",
                "email": "alice@example.com",
                "password": "password123",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["user"]["email"], "alice@example.com");
    assert_eq!(body["user"]["isVerified"], false);
    // The password never leaves the server
    assert!(body["user"].get("passwordHash").is_none());
    assert!(body["user"].get("password_hash").is_none());

    // Login before verification is rejected with the resend hint
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            None,
            json!({ "email": "alice@example.com", "password": "password123" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = body_json(response).await;
    assert_eq!(body["needsVerification"], true);

    // Verify with the stored code
    let code: String =
        sqlx::query_scalar("SELECT verification_code FROM users WHERE email = ?")
            .bind("alice@example.com")
            .fetch_one(&pool)
            .await
            .unwrap();
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/verify",
            None,
            json!({ "email": "alice@example.com", "verificationCode": code }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Login now succeeds
    let token = login(&app, "alice@example.com", "password123").await;
    assert!(!token.is_empty());
}

#[tokio::test]
async fn test_register_validation_errors() {
    let (app, _pool) = test_app().await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/register",
            None,
            json!({ "name": "Bob", "email": "not-an-email", "password": "password123" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/auth/register",
            None,
            json!({ "name": "Bob", "email": "bob@example.com", "password": "short" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Password must be at least 6 characters");
}

#[tokio::test]
async fn test_register_duplicate_email_is_conflict() {
    let (app, pool) = test_app().await;
    test_helpers::insert_test_user(&pool, "taken@example.com", "password123", true)
        .await
        .unwrap();

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/auth/register",
            None,
            json!({ "name": "Imposter", "email": "taken@example.com", "password": "password123" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "User already exists with this email");
}

#[tokio::test]
async fn test_login_wrong_password() {
    let (app, pool) = test_app().await;
    test_helpers::insert_test_user(&pool, "alice@example.com", "password123", true)
        .await
        .unwrap();

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            None,
            json!({ "email": "alice@example.com", "password": "wrong-password" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_poll_requires_auth() {
    let (app, _pool) = test_app().await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/polls",
            None,
            json!({ "question": "Q?", "options": ["a", "b"] }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_poll_lifecycle_over_http() {
    let (app, pool) = test_app().await;
    test_helpers::insert_test_user(&pool, "owner@example.com", "password123", true)
        .await
        .unwrap();
    test_helpers::insert_test_user(&pool, "voter@example.com", "password123", true)
        .await
        .unwrap();

    let owner_token = login(&app, "owner@example.com", "password123").await;
    let voter_token = login(&app, "voter@example.com", "password123").await;

    // Create
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/polls",
            Some(&owner_token),
            json!({
                "question": "Tabs or spaces?",
                "description": "The eternal question",
                "options": ["Tabs", "Spaces"],
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    let poll_id = body["poll"]["id"].as_i64().unwrap();
    let option_id = body["poll"]["options"][1]["id"].as_i64().unwrap();

    // Too few options is a 400
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/polls",
            Some(&owner_token),
            json!({ "question": "One option?", "options": ["only"] }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Vote
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/polls/{}/vote", poll_id),
            Some(&voter_token),
            json!({ "optionId": option_id }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    // Voting again is a conflict
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/polls/{}/vote", poll_id),
            Some(&voter_token),
            json!({ "optionId": option_id }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Results are public
    let response = app
        .clone()
        .oneshot(get_request(&format!("/api/polls/{}/results", poll_id), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["results"]["totalVotes"], 1);
    let options = body["results"]["options"].as_array().unwrap();
    let spaces = options.iter().find(|o| o["text"] == "Spaces").unwrap();
    assert_eq!(spaces["votes"], 1);
    assert_eq!(spaces["percentage"], 100.0);

    // Listing as the voter carries the userVote annotation
    let response = app
        .clone()
        .oneshot(get_request("/api/polls", Some(&voter_token)))
        .await
        .unwrap();
    let body = body_json(response).await;
    let poll = body["polls"]
        .as_array()
        .unwrap()
        .iter()
        .find(|p| p["id"].as_i64() == Some(poll_id))
        .unwrap();
    assert_eq!(poll["userVote"]["optionId"].as_i64(), Some(option_id));

    // Only the owner may delete
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/polls/{}", poll_id))
                .header(header::AUTHORIZATION, format!("Bearer {}", voter_token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/polls/{}", poll_id))
                .header(header::AUTHORIZATION, format!("Bearer {}", owner_token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // The poll is gone
    let response = app
        .oneshot(get_request(&format!("/api/polls/{}", poll_id), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_vote_on_missing_poll_is_404() {
    let (app, pool) = test_app().await;
    test_helpers::insert_test_user(&pool, "voter@example.com", "password123", true)
        .await
        .unwrap();
    let token = login(&app, "voter@example.com", "password123").await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/polls/9999/vote",
            Some(&token),
            json!({ "optionId": 1 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_profile_and_stats() {
    let (app, pool) = test_app().await;
    let user_id = test_helpers::insert_test_user(&pool, "alice@example.com", "password123", true)
        .await
        .unwrap();
    test_helpers::create_test_poll(&pool, user_id, "Mine?", &["Yes", "No"])
        .await
        .unwrap();

    let token = login(&app, "alice@example.com", "password123").await;

    let response = app
        .clone()
        .oneshot(get_request("/api/users/profile", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["user"]["email"], "alice@example.com");
    assert_eq!(body["user"]["pollsCount"], 1);
    assert_eq!(body["user"]["votesCount"], 0);

    let response = app
        .clone()
        .oneshot(get_request("/api/users/stats", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["pollsCreated"], 1);
    assert_eq!(body["votesCast"], 0);

    // Unauthenticated requests are rejected
    let response = app
        .oneshot(get_request("/api/users/profile", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_token_endpoint() {
    let (app, pool) = test_app().await;
    test_helpers::insert_test_user(&pool, "alice@example.com", "password123", true)
        .await
        .unwrap();
    let token = login(&app, "alice@example.com", "password123").await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/refresh",
            Some(&token),
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["token"].as_str().is_some());

    let response = app
        .oneshot(json_request("POST", "/api/auth/refresh", None, json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
