use async_graphql::{Context, EmptySubscription, Object, Result, Schema, ID};
use std::sync::Arc;

use crate::auth::AuthUser;
use crate::error::AppError;
use crate::models::PublicUser;
use crate::services::{
    AuthService, CreatePollRequest, LoginRequest, PollService, RegisterRequest, UserService,
};

use super::types::*;

pub type PollhubSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

pub fn build_schema(
    user_service: Arc<UserService>,
    auth_service: Arc<AuthService>,
    poll_service: Arc<PollService>,
) -> PollhubSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(user_service)
        .data(auth_service)
        .data(poll_service)
        .finish()
}

fn require_auth<'a>(ctx: &'a Context<'_>) -> Result<&'a AuthUser> {
    ctx.data_opt::<AuthUser>().ok_or_else(|| {
        graphql_error(AppError::Unauthenticated(
            "You must be logged in to perform this action".to_string(),
        ))
    })
}

fn parse_id(id: &ID, what: &str) -> Result<i64> {
    id.0.parse::<i64>()
        .map_err(|_| graphql_error(AppError::Validation(format!("Invalid {} ID", what))))
}

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    async fn me(&self, ctx: &Context<'_>) -> Result<GqlUser> {
        let auth = require_auth(ctx)?;
        let users = ctx.data::<Arc<UserService>>()?;

        let user = users
            .find_user_by_id(auth.id)
            .await
            .map_err(graphql_error)?
            .ok_or_else(|| graphql_error(AppError::NotFound("User not found".to_string())))?;

        Ok(GqlUser(PublicUser::from(user)))
    }

    async fn users(&self, ctx: &Context<'_>) -> Result<Vec<GqlUser>> {
        let users = ctx.data::<Arc<UserService>>()?;
        let all = users.list_users(None, None).await.map_err(graphql_error)?;
        Ok(all
            .into_iter()
            .map(|u| GqlUser(PublicUser::from(u)))
            .collect())
    }

    async fn user_stats(&self, ctx: &Context<'_>) -> Result<GqlUserStats> {
        let auth = require_auth(ctx)?;
        let polls = ctx.data::<Arc<PollService>>()?;

        let stats = polls.user_stats(auth.id).await.map_err(graphql_error)?;

        Ok(GqlUserStats {
            polls_created: stats.polls_created,
            votes_cast: stats.votes_cast,
            total_votes_received: stats.total_votes_received,
            most_popular_poll: stats.most_popular_poll.map(GqlPoll),
        })
    }

    async fn polls(&self, ctx: &Context<'_>) -> Result<Vec<GqlPoll>> {
        let polls = ctx.data::<Arc<PollService>>()?;
        let viewer = ctx.data_opt::<AuthUser>().map(|u| u.id);

        let summaries = polls.list_polls(viewer).await.map_err(graphql_error)?;
        Ok(summaries.into_iter().map(GqlPoll).collect())
    }

    async fn poll(&self, ctx: &Context<'_>, id: ID) -> Result<GqlPoll> {
        let polls = ctx.data::<Arc<PollService>>()?;
        let viewer = ctx.data_opt::<AuthUser>().map(|u| u.id);
        let poll_id = parse_id(&id, "poll")?;

        let summary = polls
            .get_poll(poll_id, viewer)
            .await
            .map_err(graphql_error)?;
        Ok(GqlPoll(summary))
    }

    async fn poll_results(&self, ctx: &Context<'_>, id: ID) -> Result<PollResult> {
        let polls = ctx.data::<Arc<PollService>>()?;
        let poll_id = parse_id(&id, "poll")?;

        let results = polls.poll_results(poll_id).await.map_err(graphql_error)?;

        Ok(PollResult {
            total_votes: results.total_votes,
            options: results
                .options
                .into_iter()
                .map(|o| OptionResult {
                    id: ID(o.id.to_string()),
                    text: o.text,
                    votes: o.votes,
                    percentage: o.percentage,
                })
                .collect(),
            poll: GqlPoll(results.poll),
        })
    }

    async fn my_polls(&self, ctx: &Context<'_>) -> Result<Vec<GqlPoll>> {
        let auth = require_auth(ctx)?;
        let polls = ctx.data::<Arc<PollService>>()?;

        let summaries = polls.my_polls(auth.id).await.map_err(graphql_error)?;
        Ok(summaries.into_iter().map(GqlPoll).collect())
    }

    async fn my_votes(&self, ctx: &Context<'_>) -> Result<Vec<GqlVote>> {
        let auth = require_auth(ctx)?;
        let polls = ctx.data::<Arc<PollService>>()?;

        let votes = polls.my_votes(auth.id).await.map_err(graphql_error)?;
        Ok(votes.into_iter().map(GqlVote).collect())
    }
}

pub struct MutationRoot;

#[Object]
impl MutationRoot {
    async fn register(
        &self,
        ctx: &Context<'_>,
        input: RegisterInput,
    ) -> Result<VerificationResponse> {
        let users = ctx.data::<Arc<UserService>>()?;

        users
            .register(RegisterRequest {
                name: input.name,
                email: input.email,
                password: input.password,
            })
            .await
            .map_err(graphql_error)?;

        Ok(VerificationResponse {
            success: true,
            message:
                "User registered successfully. Please check your email for verification code."
                    .to_string(),
        })
    }

    async fn verify_email(
        &self,
        ctx: &Context<'_>,
        input: VerifyEmailInput,
    ) -> Result<VerificationResponse> {
        let users = ctx.data::<Arc<UserService>>()?;

        users
            .verify_email(&input.email, &input.verification_code)
            .await
            .map_err(graphql_error)?;

        Ok(VerificationResponse {
            success: true,
            message: "Email verified successfully".to_string(),
        })
    }

    async fn resend_verification(
        &self,
        ctx: &Context<'_>,
        input: ResendVerificationInput,
    ) -> Result<VerificationResponse> {
        let users = ctx.data::<Arc<UserService>>()?;

        users
            .resend_verification(&input.email)
            .await
            .map_err(graphql_error)?;

        Ok(VerificationResponse {
            success: true,
            message: "Verification code resent successfully".to_string(),
        })
    }

    async fn login(&self, ctx: &Context<'_>, input: LoginInput) -> Result<AuthPayload> {
        let auth = ctx.data::<Arc<AuthService>>()?;

        let outcome = auth
            .authenticate(LoginRequest {
                email: input.email,
                password: input.password,
            })
            .await
            .map_err(graphql_error)?;

        Ok(AuthPayload {
            token: outcome.token,
            user: GqlUser(PublicUser::from(outcome.user)),
            success: true,
            message: "Login successful".to_string(),
        })
    }

    async fn logout(&self) -> String {
        "Logout successful. Please remove the token from client storage.".to_string()
    }

    async fn create_poll(&self, ctx: &Context<'_>, input: CreatePollInput) -> Result<GqlPoll> {
        let auth = require_auth(ctx)?;
        let polls = ctx.data::<Arc<PollService>>()?;

        let summary = polls
            .create_poll(
                auth.id,
                CreatePollRequest {
                    question: input.question,
                    description: input.description,
                    options: input.options,
                },
            )
            .await
            .map_err(graphql_error)?;

        Ok(GqlPoll(summary))
    }

    async fn vote(&self, ctx: &Context<'_>, poll_id: ID, option_id: ID) -> Result<GqlVote> {
        let auth = require_auth(ctx)?;
        let polls = ctx.data::<Arc<PollService>>()?;

        let poll_id = parse_id(&poll_id, "poll")?;
        let option_id = parse_id(&option_id, "option")?;

        let vote = polls
            .cast_vote(auth.id, poll_id, option_id)
            .await
            .map_err(graphql_error)?;

        Ok(GqlVote(vote))
    }

    async fn delete_poll(&self, ctx: &Context<'_>, id: ID) -> Result<String> {
        let auth = require_auth(ctx)?;
        let polls = ctx.data::<Arc<PollService>>()?;
        let poll_id = parse_id(&id, "poll")?;

        polls
            .delete_poll(poll_id, auth.id)
            .await
            .map_err(graphql_error)?;

        Ok("Poll deleted successfully".to_string())
    }
}
