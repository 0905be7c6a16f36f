use std::env;
use tracing::warn;

/// Server configuration derived from the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub cors_origin: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3001".to_string())
            .parse::<u16>()
            .unwrap_or(3001);

        let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| {
            warn!("JWT_SECRET not set, using an insecure development secret");
            "dev-secret-change-me".to_string()
        });

        let cors_origin = env::var("CORS_ORIGIN").ok();

        AppConfig {
            host,
            port,
            jwt_secret,
            cors_origin,
        }
    }
}

pub fn validate_production_config() {
    let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());
    if environment != "production" {
        return;
    }

    if env::var("JWT_SECRET").is_err() {
        panic!("FATAL: Production environment requires JWT_SECRET to be set");
    }
}
