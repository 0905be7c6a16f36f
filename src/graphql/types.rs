use async_graphql::{Context, ErrorExtensions, InputObject, Object, Result, SimpleObject, ID};
use std::sync::Arc;

use crate::error::AppError;
use crate::models::{OptionTally, PollSummary, PublicUser, VoteDetail};
use crate::services::{PollService, UserService};

/// Turns a service error into a GraphQL error carrying its `code` extension.
/// The blanket `Display` conversion would lose the extension, so every
/// resolver goes through this instead of `?` on the raw error.
pub(crate) fn graphql_error(err: impl Into<AppError>) -> async_graphql::Error {
    err.into().extend()
}

/// GraphQL view of a user. Poll and vote fields resolve lazily against the
/// poll service, mirroring how both API surfaces share one aggregator.
pub struct GqlUser(pub PublicUser);

#[Object(name = "User")]
impl GqlUser {
    async fn id(&self) -> ID {
        ID(self.0.id.to_string())
    }

    async fn name(&self) -> &str {
        &self.0.name
    }

    async fn email(&self) -> &str {
        &self.0.email
    }

    async fn is_verified(&self) -> bool {
        self.0.is_verified
    }

    async fn created_at(&self) -> &str {
        &self.0.created_at
    }

    async fn polls_count(&self, ctx: &Context<'_>) -> Result<i64> {
        let polls = ctx.data::<Arc<PollService>>()?;
        Ok(polls
            .count_polls_by_user(self.0.id)
            .await
            .map_err(graphql_error)?)
    }

    async fn votes_count(&self, ctx: &Context<'_>) -> Result<i64> {
        let polls = ctx.data::<Arc<PollService>>()?;
        Ok(polls
            .count_votes_by_user(self.0.id)
            .await
            .map_err(graphql_error)?)
    }

    async fn polls(&self, ctx: &Context<'_>) -> Result<Vec<GqlPoll>> {
        let polls = ctx.data::<Arc<PollService>>()?;
        let summaries = polls.my_polls(self.0.id).await.map_err(graphql_error)?;
        Ok(summaries.into_iter().map(GqlPoll).collect())
    }

    async fn votes(&self, ctx: &Context<'_>) -> Result<Vec<GqlVote>> {
        let polls = ctx.data::<Arc<PollService>>()?;
        let votes = polls.my_votes(self.0.id).await.map_err(graphql_error)?;
        Ok(votes.into_iter().map(GqlVote).collect())
    }
}

pub struct GqlPoll(pub PollSummary);

#[Object(name = "Poll")]
impl GqlPoll {
    async fn id(&self) -> ID {
        ID(self.0.id.to_string())
    }

    async fn question(&self) -> &str {
        &self.0.question
    }

    async fn description(&self) -> Option<&str> {
        self.0.description.as_deref()
    }

    async fn options(&self) -> Vec<GqlOption> {
        self.0.options.iter().cloned().map(GqlOption).collect()
    }

    async fn created_by(&self) -> GqlUser {
        GqlUser(self.0.created_by.clone())
    }

    async fn created_at(&self) -> &str {
        &self.0.created_at
    }

    async fn total_votes(&self) -> i64 {
        self.0.total_votes
    }

    async fn user_vote(&self) -> Option<GqlVote> {
        self.0.user_vote.clone().map(GqlVote)
    }
}

pub struct GqlOption(pub OptionTally);

#[Object(name = "Option")]
impl GqlOption {
    async fn id(&self) -> ID {
        ID(self.0.id.to_string())
    }

    async fn text(&self) -> &str {
        &self.0.text
    }

    async fn votes_count(&self) -> i64 {
        self.0.votes
    }

    async fn percentage(&self) -> f64 {
        self.0.percentage
    }

    async fn votes(&self, ctx: &Context<'_>) -> Result<Vec<GqlVote>> {
        let polls = ctx.data::<Arc<PollService>>()?;
        let votes = polls.option_votes(self.0.id).await.map_err(graphql_error)?;
        Ok(votes.into_iter().map(GqlVote).collect())
    }
}

pub struct GqlVote(pub VoteDetail);

#[Object(name = "Vote")]
impl GqlVote {
    async fn id(&self) -> ID {
        ID(self.0.id.to_string())
    }

    async fn created_at(&self) -> &str {
        &self.0.created_at
    }

    async fn user(&self, ctx: &Context<'_>) -> Result<GqlUser> {
        let users = ctx.data::<Arc<UserService>>()?;
        let user = users
            .find_user_by_id(self.0.user_id)
            .await
            .map_err(graphql_error)?
            .ok_or_else(|| graphql_error(AppError::NotFound("User not found".to_string())))?;
        Ok(GqlUser(PublicUser::from(user)))
    }

    async fn option(&self, ctx: &Context<'_>) -> Result<GqlOption> {
        let polls = ctx.data::<Arc<PollService>>()?;
        let summary = polls
            .get_poll(self.0.poll_id, None)
            .await
            .map_err(graphql_error)?;
        let tally = summary
            .options
            .into_iter()
            .find(|o| o.id == self.0.option_id)
            .ok_or_else(|| graphql_error(AppError::NotFound("Option not found in this poll".to_string())))?;
        Ok(GqlOption(tally))
    }
}

#[derive(SimpleObject)]
pub struct AuthPayload {
    pub token: String,
    pub user: GqlUser,
    pub success: bool,
    pub message: String,
}

#[derive(SimpleObject)]
pub struct VerificationResponse {
    pub success: bool,
    pub message: String,
}

#[derive(SimpleObject)]
pub struct OptionResult {
    pub id: ID,
    pub text: String,
    pub votes: i64,
    pub percentage: f64,
}

#[derive(SimpleObject)]
pub struct PollResult {
    pub poll: GqlPoll,
    pub total_votes: i64,
    pub options: Vec<OptionResult>,
}

#[derive(SimpleObject)]
#[graphql(name = "UserStats")]
pub struct GqlUserStats {
    pub polls_created: i64,
    pub votes_cast: i64,
    pub total_votes_received: i64,
    pub most_popular_poll: Option<GqlPoll>,
}

#[derive(InputObject)]
pub struct RegisterInput {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(InputObject)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

#[derive(InputObject)]
pub struct VerifyEmailInput {
    pub email: String,
    pub verification_code: String,
}

#[derive(InputObject)]
pub struct ResendVerificationInput {
    pub email: String,
}

#[derive(InputObject)]
pub struct CreatePollInput {
    pub question: String,
    pub description: Option<String>,
    pub options: Vec<String>,
}
