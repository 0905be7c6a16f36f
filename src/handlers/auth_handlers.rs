use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::{
    auth::AuthUser,
    error::Result,
    models::PublicUser,
    services::{auth_service::AuthServiceError, LoginRequest, RegisterRequest},
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct RegisterBody {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyEmailBody {
    pub email: String,
    pub verification_code: String,
}

#[derive(Debug, Deserialize)]
pub struct ResendVerificationBody {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginBody {
    pub email: String,
    pub password: String,
}

pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterBody>,
) -> Result<impl IntoResponse> {
    let outcome = state
        .user_service
        .register(RegisterRequest {
            name: body.name,
            email: body.email,
            password: body.password,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "User registered successfully. Please check your email for verification code.",
            "user": PublicUser::from(outcome.user),
            "emailSent": outcome.email_sent,
        })),
    ))
}

pub async fn verify_email(
    State(state): State<AppState>,
    Json(body): Json<VerifyEmailBody>,
) -> Result<impl IntoResponse> {
    state
        .user_service
        .verify_email(&body.email, &body.verification_code)
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Email verified successfully",
    })))
}

pub async fn resend_verification(
    State(state): State<AppState>,
    Json(body): Json<ResendVerificationBody>,
) -> Result<impl IntoResponse> {
    state.user_service.resend_verification(&body.email).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Verification code resent successfully",
    })))
}

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginBody>,
) -> Result<Response> {
    let result = state
        .auth_service
        .authenticate(LoginRequest {
            email: body.email,
            password: body.password,
        })
        .await;

    match result {
        Ok(outcome) => Ok(Json(json!({
            "success": true,
            "message": "Login successful",
            "user": PublicUser::from(outcome.user),
            "token": outcome.token,
        }))
        .into_response()),
        // Carries a flag so the client can offer to resend the code
        Err(AuthServiceError::EmailNotVerified) => Ok((
            StatusCode::FORBIDDEN,
            Json(json!({
                "success": false,
                "error": "Please verify your email before logging in",
                "needsVerification": true,
            })),
        )
            .into_response()),
        Err(e) => Err(e.into()),
    }
}

pub async fn logout() -> impl IntoResponse {
    Json(json!({
        "success": true,
        "message": "Logout successful. Please remove the token from client storage.",
    }))
}

pub async fn refresh_token(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse> {
    let token = state.auth_service.refresh_token(&user)?;

    Ok(Json(json!({
        "success": true,
        "message": "Token refreshed successfully",
        "token": token,
    })))
}
