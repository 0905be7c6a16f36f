use crate::auth::{AuthUser, JwtManager};
use crate::models::User;
use crate::repositories::{RepositoryError, UserRepository};
use argon2::{password_hash::PasswordHash, Argon2, PasswordVerifier};
use std::sync::Arc;

/// Issued tokens are valid for 7 days.
const TOKEN_TTL_SECS: i64 = 7 * 24 * 3600;

#[derive(Debug, thiserror::Error)]
pub enum AuthServiceError {
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Please verify your email before logging in")]
    EmailNotVerified,
    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

pub struct LoginOutcome {
    pub user: User,
    pub token: String,
}

pub struct AuthService {
    user_repository: Arc<dyn UserRepository>,
    jwt: JwtManager,
}

impl AuthService {
    pub fn new(user_repository: Arc<dyn UserRepository>, jwt_secret: &str) -> Self {
        Self {
            user_repository,
            jwt: JwtManager::new(jwt_secret.as_bytes(), TOKEN_TTL_SECS),
        }
    }

    /// Checks credentials and issues a bearer token. Unverified accounts are
    /// rejected before the password is checked, so the client can prompt for
    /// verification.
    pub async fn authenticate(&self, request: LoginRequest) -> Result<LoginOutcome, AuthServiceError> {
        let user = self
            .user_repository
            .find_by_email(&request.email)
            .await?
            .ok_or(AuthServiceError::InvalidCredentials)?;

        if !user.is_verified {
            return Err(AuthServiceError::EmailNotVerified);
        }

        if !verify_password(&request.password, &user.password_hash) {
            return Err(AuthServiceError::InvalidCredentials);
        }

        let token = self.jwt.issue(user.id, &user.email)?;

        Ok(LoginOutcome { user, token })
    }

    /// Re-issues a token for an already-authenticated caller.
    pub fn refresh_token(&self, user: &AuthUser) -> Result<String, AuthServiceError> {
        Ok(self.jwt.issue(user.id, &user.email)?)
    }

    pub fn validate_token(&self, token: &str) -> Result<AuthUser, AuthServiceError> {
        let claims = self
            .jwt
            .validate(token)
            .map_err(|_| AuthServiceError::InvalidCredentials)?;

        let id = claims
            .user_id()
            .ok_or(AuthServiceError::InvalidCredentials)?;

        Ok(AuthUser {
            id,
            email: claims.email,
        })
    }
}

fn verify_password(password: &str, password_hash: &str) -> bool {
    if let Ok(parsed_hash) = PasswordHash::new(password_hash) {
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    } else {
        false
    }
}
