pub mod auth_service;
pub mod email_service;
pub mod poll_service;
pub mod user_service;

pub use auth_service::{AuthService, LoginOutcome, LoginRequest};
pub use email_service::{create_email_service, EmailService, MockEmailService, SmtpEmailService};
pub use poll_service::{CreatePollRequest, PollService};
pub use user_service::{RegisterOutcome, RegisterRequest, UserService};
