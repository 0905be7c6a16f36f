pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod graphql;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod services;

// Make test_utils available for both unit tests and integration tests
pub mod test_utils;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use graphql::PollhubSchema;
use services::{AuthService, PollService, UserService};

#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<UserService>,
    pub auth_service: Arc<AuthService>,
    pub poll_service: Arc<PollService>,
    pub schema: PollhubSchema,
    pub pool: sqlx::SqlitePool,
}

/// Builds the full application router: REST under /api, GraphQL at /graphql.
pub fn app(state: AppState, cors_origin: Option<&str>) -> Router {
    let cors = match cors_origin {
        Some(origin) => match origin.parse::<axum::http::HeaderValue>() {
            Ok(value) => CorsLayer::new()
                .allow_origin(value)
                .allow_methods(Any)
                .allow_headers(Any),
            Err(_) => {
                tracing::warn!("invalid CORS_ORIGIN, allowing any origin");
                CorsLayer::permissive()
            }
        },
        None => CorsLayer::permissive(),
    };

    let auth_routes = Router::new()
        .route("/register", post(handlers::auth_handlers::register))
        .route("/verify", post(handlers::auth_handlers::verify_email))
        .route(
            "/resend-verification",
            post(handlers::auth_handlers::resend_verification),
        )
        .route("/login", post(handlers::auth_handlers::login))
        .route("/logout", post(handlers::auth_handlers::logout))
        .route("/refresh", post(handlers::auth_handlers::refresh_token));

    let poll_routes = Router::new()
        .route(
            "/",
            get(handlers::poll_handlers::list_polls).post(handlers::poll_handlers::create_poll),
        )
        .route("/user/my-polls", get(handlers::poll_handlers::my_polls))
        .route("/user/my-votes", get(handlers::poll_handlers::my_votes))
        .route(
            "/{id}",
            get(handlers::poll_handlers::get_poll).delete(handlers::poll_handlers::delete_poll),
        )
        .route("/{id}/vote", post(handlers::poll_handlers::vote))
        .route("/{id}/results", get(handlers::poll_handlers::poll_results));

    let user_routes = Router::new()
        .route("/", get(handlers::user_handlers::list_users))
        .route("/profile", get(handlers::user_handlers::profile))
        .route("/stats", get(handlers::user_handlers::stats));

    Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api/polls", poll_routes)
        .nest("/api/users", user_routes)
        .route("/api/health", get(handlers::user_handlers::health))
        .route(
            "/graphql",
            get(graphql::graphiql).post(graphql::graphql_handler),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
