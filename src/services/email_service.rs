use async_trait::async_trait;
use lettre::{
    message::header::ContentType, transport::smtp::authentication::Credentials, AsyncSmtpTransport,
    AsyncTransport, Message, Tokio1Executor,
};
use std::env;

#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    #[error("Failed to build email message: {0}")]
    MessageBuild(String),
    #[error("Failed to send email: {0}")]
    SendFailed(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

#[async_trait]
pub trait EmailService: Send + Sync {
    async fn send_verification_email(&self, to_email: &str, code: &str) -> Result<(), EmailError>;
    async fn send_welcome_email(&self, to_email: &str, name: &str) -> Result<(), EmailError>;
}

/// Logs emails instead of sending them. Used in development and tests.
pub struct MockEmailService;

impl MockEmailService {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MockEmailService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmailService for MockEmailService {
    async fn send_verification_email(&self, to_email: &str, code: &str) -> Result<(), EmailError> {
        tracing::info!("[MOCK EMAIL] Verification email to: {}", to_email);
        tracing::info!("   Subject: Verify your Email - Polling App");
        tracing::info!("   Verification code: {}", code);
        Ok(())
    }

    async fn send_welcome_email(&self, to_email: &str, name: &str) -> Result<(), EmailError> {
        tracing::info!("[MOCK EMAIL] Welcome email to: {}", to_email);
        tracing::info!("   Subject: Welcome to Polling App!");
        tracing::info!("   Name: {}", name);
        Ok(())
    }
}

pub struct SmtpEmailService {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from_email: String,
    from_name: String,
}

impl SmtpEmailService {
    pub fn new() -> Result<Self, EmailError> {
        let smtp_host = env::var("SMTP_HOST")
            .map_err(|_| EmailError::ConfigError("SMTP_HOST not set".to_string()))?;
        let smtp_port = env::var("SMTP_PORT")
            .unwrap_or_else(|_| "587".to_string())
            .parse::<u16>()
            .map_err(|_| EmailError::ConfigError("Invalid SMTP_PORT".to_string()))?;
        let smtp_username = env::var("SMTP_USERNAME")
            .map_err(|_| EmailError::ConfigError("SMTP_USERNAME not set".to_string()))?;
        let smtp_password = env::var("SMTP_PASSWORD")
            .map_err(|_| EmailError::ConfigError("SMTP_PASSWORD not set".to_string()))?;
        let from_email = env::var("SMTP_FROM_EMAIL")
            .map_err(|_| EmailError::ConfigError("SMTP_FROM_EMAIL not set".to_string()))?;
        let from_name = env::var("SMTP_FROM_NAME").unwrap_or_else(|_| "Polling App".to_string());

        let credentials = Credentials::new(smtp_username, smtp_password);

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&smtp_host)
            .map_err(|e| EmailError::ConfigError(format!("SMTP starttls error: {}", e)))?
            .port(smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self {
            mailer,
            from_email,
            from_name,
        })
    }

    async fn send(&self, to_email: &str, subject: &str, html_body: String) -> Result<(), EmailError> {
        let email = Message::builder()
            .from(
                format!("{} <{}>", self.from_name, self.from_email)
                    .parse()
                    .map_err(|e| {
                        EmailError::MessageBuild(format!("Invalid from address: {}", e))
                    })?,
            )
            .to(to_email
                .parse()
                .map_err(|e| EmailError::MessageBuild(format!("Invalid to address: {}", e)))?)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html_body)
            .map_err(|e| EmailError::MessageBuild(e.to_string()))?;

        self.mailer
            .send(email)
            .await
            .map_err(|e| EmailError::SendFailed(e.to_string()))?;

        Ok(())
    }
}

#[async_trait]
impl EmailService for SmtpEmailService {
    async fn send_verification_email(&self, to_email: &str, code: &str) -> Result<(), EmailError> {
        let html_body = format!(
            r#"
<!DOCTYPE html>
<html>
<body style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto; padding: 20px;">
    <h1 style="color: #333;">Verify your email</h1>
    <p>Thank you for signing up for Polling App. Your verification code is:</p>
    <p style="text-align: center; font-size: 28px; letter-spacing: 6px; font-weight: bold;">{}</p>
    <p style="color: #666; font-size: 14px;">Enter this code in the app to activate your account.</p>
</body>
</html>
"#,
            code
        );

        self.send(to_email, "Verify your Email - Polling App", html_body)
            .await
    }

    async fn send_welcome_email(&self, to_email: &str, name: &str) -> Result<(), EmailError> {
        let html_body = format!(
            r#"
<!DOCTYPE html>
<html>
<body style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto; padding: 20px;">
    <h1 style="color: #333;">Welcome, {}!</h1>
    <p>Your email is verified. Thank you for joining our polling community.</p>
</body>
</html>
"#,
            name
        );

        self.send(to_email, "Welcome to Polling App!", html_body).await
    }
}

pub fn create_email_service() -> std::sync::Arc<dyn EmailService> {
    use std::sync::Arc;

    if env::var("SMTP_HOST").is_ok() {
        match SmtpEmailService::new() {
            Ok(service) => {
                tracing::info!("Using SMTP email service");
                Arc::new(service)
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to initialize SMTP email service: {}. Falling back to mock service",
                    e
                );
                Arc::new(MockEmailService::new())
            }
        }
    } else {
        tracing::info!(
            "SMTP not configured. Using mock email service (emails will be logged to console)"
        );
        Arc::new(MockEmailService::new())
    }
}
