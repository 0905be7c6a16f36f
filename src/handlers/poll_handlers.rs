use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::{
    auth::{AuthUser, MaybeAuthUser},
    error::Result,
    services::CreatePollRequest,
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct CreatePollBody {
    pub question: String,
    pub description: Option<String>,
    pub options: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteBody {
    pub option_id: i64,
}

pub async fn create_poll(
    State(state): State<AppState>,
    user: AuthUser,
    Json(body): Json<CreatePollBody>,
) -> Result<impl IntoResponse> {
    let poll = state
        .poll_service
        .create_poll(
            user.id,
            CreatePollRequest {
                question: body.question,
                description: body.description,
                options: body.options,
            },
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Poll created successfully",
            "poll": poll,
        })),
    ))
}

pub async fn list_polls(
    State(state): State<AppState>,
    MaybeAuthUser(user): MaybeAuthUser,
) -> Result<impl IntoResponse> {
    let polls = state
        .poll_service
        .list_polls(user.map(|u| u.id))
        .await?;

    Ok(Json(json!({ "polls": polls })))
}

pub async fn get_poll(
    State(state): State<AppState>,
    MaybeAuthUser(user): MaybeAuthUser,
    Path(poll_id): Path<i64>,
) -> Result<impl IntoResponse> {
    let poll = state
        .poll_service
        .get_poll(poll_id, user.map(|u| u.id))
        .await?;

    Ok(Json(json!({ "poll": poll })))
}

pub async fn vote(
    State(state): State<AppState>,
    user: AuthUser,
    Path(poll_id): Path<i64>,
    Json(body): Json<VoteBody>,
) -> Result<impl IntoResponse> {
    let vote = state
        .poll_service
        .cast_vote(user.id, poll_id, body.option_id)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Vote cast successfully",
            "vote": vote,
        })),
    ))
}

pub async fn poll_results(
    State(state): State<AppState>,
    Path(poll_id): Path<i64>,
) -> Result<impl IntoResponse> {
    let results = state.poll_service.poll_results(poll_id).await?;

    Ok(Json(json!({ "results": results })))
}

pub async fn my_polls(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse> {
    let polls = state.poll_service.my_polls(user.id).await?;

    Ok(Json(json!({ "polls": polls })))
}

pub async fn my_votes(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse> {
    let votes = state.poll_service.my_votes(user.id).await?;

    Ok(Json(json!({ "votes": votes })))
}

pub async fn delete_poll(
    State(state): State<AppState>,
    user: AuthUser,
    Path(poll_id): Path<i64>,
) -> Result<impl IntoResponse> {
    state.poll_service.delete_poll(poll_id, user.id).await?;

    Ok(Json(json!({ "message": "Poll deleted successfully" })))
}
