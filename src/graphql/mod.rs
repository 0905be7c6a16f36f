pub mod schema;
pub mod types;

pub use schema::{build_schema, MutationRoot, PollhubSchema, QueryRoot};

use async_graphql::http::GraphiQLSource;
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::{
    extract::State,
    http::HeaderMap,
    response::{Html, IntoResponse},
};

use crate::{auth::bearer_token, AppState};

/// Executes a GraphQL request. A valid bearer token puts the authenticated
/// identity into the request context; resolvers that need auth check for it.
pub async fn graphql_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    req: GraphQLRequest,
) -> GraphQLResponse {
    let mut request = req.into_inner();

    if let Some(user) =
        bearer_token(&headers).and_then(|token| state.auth_service.validate_token(token).ok())
    {
        request = request.data(user);
    }

    state.schema.execute(request).await.into()
}

pub async fn graphiql() -> impl IntoResponse {
    Html(GraphiQLSource::build().endpoint("/graphql").finish())
}
