use axum::{extract::State, response::IntoResponse, Json};
use serde_json::json;

use crate::{auth::AuthUser, error::AppError, error::Result, AppState};

pub async fn profile(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse> {
    let profile = state
        .user_service
        .find_user_by_id(user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let polls_count = state.poll_service.count_polls_by_user(user.id).await?;
    let votes_count = state.poll_service.count_votes_by_user(user.id).await?;

    Ok(Json(json!({
        "user": {
            "id": profile.id,
            "name": profile.name,
            "email": profile.email,
            "isVerified": profile.is_verified,
            "createdAt": profile.created_at,
            "pollsCount": polls_count,
            "votesCount": votes_count,
        }
    })))
}

pub async fn stats(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse> {
    let stats = state.poll_service.user_stats(user.id).await?;

    Ok(Json(stats))
}

pub async fn list_users(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let users = state.user_service.list_users(None, None).await?;

    let mut out = Vec::with_capacity(users.len());
    for user in users {
        let polls_count = state.poll_service.count_polls_by_user(user.id).await?;
        let votes_count = state.poll_service.count_votes_by_user(user.id).await?;
        out.push(json!({
            "id": user.id,
            "name": user.name,
            "email": user.email,
            "isVerified": user.is_verified,
            "createdAt": user.created_at,
            "pollsCount": polls_count,
            "votesCount": votes_count,
        }));
    }

    Ok(Json(json!({ "users": out })))
}

pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}
