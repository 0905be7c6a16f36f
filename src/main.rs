use pollhub::{
    config::{validate_production_config, AppConfig},
    db, graphql,
    repositories::{poll_repository::SqlitePollRepository, user_repository::SqliteUserRepository},
    services::{create_email_service, AuthService, PollService, UserService},
    AppState,
};

use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pollhub=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    validate_production_config();
    let config = AppConfig::from_env();

    // Database connection
    let pool = db::create_pool().await?;

    // Run migrations
    sqlx::migrate!("./migrations").run(&pool).await?;

    // Initialize repositories
    let user_repository = Arc::new(SqliteUserRepository::new(pool.clone()));
    let poll_repository = Arc::new(SqlitePollRepository::new(pool.clone()));

    // Initialize services
    let email_service = create_email_service();
    let user_service = Arc::new(UserService::new(user_repository.clone(), email_service));
    let auth_service = Arc::new(AuthService::new(user_repository.clone(), &config.jwt_secret));
    let poll_service = Arc::new(PollService::new(poll_repository, user_repository));

    let schema = graphql::build_schema(
        user_service.clone(),
        auth_service.clone(),
        poll_service.clone(),
    );

    let app_state = AppState {
        user_service,
        auth_service,
        poll_service,
        schema,
        pool: pool.clone(),
    };

    let app = pollhub::app(app_state, config.cors_origin.as_deref());

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("listening on {}", addr);
    tracing::info!("GraphQL playground available at http://{}/graphql", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
