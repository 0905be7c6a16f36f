use crate::models::User;
use crate::repositories::{RepositoryError, UserRepository};
use crate::services::email_service::{EmailError, EmailService};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
    Argon2,
};
use rand::Rng;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum UserServiceError {
    #[error("Name is required")]
    InvalidName,
    #[error("Valid email is required")]
    InvalidEmail,
    #[error("Password must be at least 6 characters")]
    WeakPassword,
    #[error("User already exists with this email")]
    EmailTaken,
    #[error("User not found")]
    UserNotFound,
    #[error("Email is already verified")]
    AlreadyVerified,
    #[error("Invalid verification code")]
    InvalidCode,
    #[error("Password hashing failed: {0}")]
    HashingError(String),
    #[error("Email error: {0}")]
    Email(#[from] EmailError),
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

pub struct RegisterOutcome {
    pub user: User,
    pub email_sent: bool,
}

pub struct UserService {
    repository: Arc<dyn UserRepository>,
    email_service: Arc<dyn EmailService>,
}

impl UserService {
    pub fn new(repository: Arc<dyn UserRepository>, email_service: Arc<dyn EmailService>) -> Self {
        Self {
            repository,
            email_service,
        }
    }

    /// Creates an unverified account and sends the verification code.
    /// A failed email send does not fail registration; the outcome reports it.
    pub async fn register(
        &self,
        request: RegisterRequest,
    ) -> Result<RegisterOutcome, UserServiceError> {
        self.validate_name(&request.name)?;
        self.validate_email(&request.email)?;
        self.validate_password(&request.password)?;

        let password_hash = self.hash_password(&request.password)?;
        let code = generate_verification_code();

        let user = match self
            .repository
            .create_user(&request.name, &request.email, &password_hash, &code)
            .await
        {
            Ok(user) => user,
            Err(RepositoryError::AlreadyExists) => return Err(UserServiceError::EmailTaken),
            Err(e) => return Err(UserServiceError::Repository(e)),
        };

        let email_sent = match self
            .email_service
            .send_verification_email(&user.email, &code)
            .await
        {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(
                    "Failed to send verification email to {}: {} (user was created)",
                    user.email,
                    e
                );
                false
            }
        };

        Ok(RegisterOutcome { user, email_sent })
    }

    /// Matches the submitted code against the stored one; on success marks
    /// the user verified and clears the code.
    pub async fn verify_email(&self, email: &str, code: &str) -> Result<User, UserServiceError> {
        let user = self
            .repository
            .find_by_email(email)
            .await?
            .ok_or(UserServiceError::UserNotFound)?;

        if user.is_verified {
            return Err(UserServiceError::AlreadyVerified);
        }

        if user.verification_code.as_deref() != Some(code) {
            return Err(UserServiceError::InvalidCode);
        }

        self.repository.mark_verified(email).await?;

        if let Err(e) = self.email_service.send_welcome_email(email, &user.name).await {
            tracing::warn!("Failed to send welcome email to {}: {}", email, e);
        }

        self.repository
            .find_by_email(email)
            .await?
            .ok_or(UserServiceError::UserNotFound)
    }

    /// Rotates the verification code and re-sends it.
    pub async fn resend_verification(&self, email: &str) -> Result<(), UserServiceError> {
        let user = self
            .repository
            .find_by_email(email)
            .await?
            .ok_or(UserServiceError::UserNotFound)?;

        if user.is_verified {
            return Err(UserServiceError::AlreadyVerified);
        }

        let code = generate_verification_code();
        self.repository.set_verification_code(email, &code).await?;

        self.email_service
            .send_verification_email(email, &code)
            .await?;

        Ok(())
    }

    pub async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, UserServiceError> {
        Ok(self.repository.find_by_id(id).await?)
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, UserServiceError> {
        Ok(self.repository.find_by_email(email).await?)
    }

    pub async fn list_users(
        &self,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<User>, UserServiceError> {
        Ok(self.repository.list_users(limit, offset).await?)
    }

    fn validate_name(&self, name: &str) -> Result<(), UserServiceError> {
        if name.trim().is_empty() {
            return Err(UserServiceError::InvalidName);
        }
        Ok(())
    }

    fn validate_email(&self, email: &str) -> Result<(), UserServiceError> {
        if !email.contains('@') || email.len() > 255 || email.is_empty() {
            return Err(UserServiceError::InvalidEmail);
        }
        Ok(())
    }

    fn validate_password(&self, password: &str) -> Result<(), UserServiceError> {
        if password.len() < 6 {
            return Err(UserServiceError::WeakPassword);
        }
        Ok(())
    }

    fn hash_password(&self, password: &str) -> Result<String, UserServiceError> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| UserServiceError::HashingError(e.to_string()))
    }
}

/// Random 6-digit code, zero-padding never needed since the range starts at 100000.
pub fn generate_verification_code() -> String {
    let mut rng = rand::thread_rng();
    rng.gen_range(100_000..1_000_000).to_string()
}
