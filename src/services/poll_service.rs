use crate::models::{
    OptionTally, Poll, PollResults, PollSummary, PublicUser, UserStats, VoteDetail,
};
use crate::repositories::{PollRepository, RepositoryError, UserRepository};
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum PollServiceError {
    #[error("{0}")]
    Validation(String),
    #[error("Poll not found")]
    PollNotFound,
    #[error("Option not found in this poll")]
    OptionNotFound,
    #[error("User not found")]
    UserNotFound,
    #[error("You have already voted on this poll")]
    DuplicateVote,
    #[error("You can only delete your own polls")]
    NotOwner,
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

pub struct CreatePollRequest {
    pub question: String,
    pub description: Option<String>,
    pub options: Vec<String>,
}

/// The vote ledger and aggregator. Both the REST and GraphQL layers go
/// through this service, so counting and rounding happen exactly once.
pub struct PollService {
    polls: Arc<dyn PollRepository>,
    users: Arc<dyn UserRepository>,
}

impl PollService {
    pub fn new(polls: Arc<dyn PollRepository>, users: Arc<dyn UserRepository>) -> Self {
        Self { polls, users }
    }

    pub async fn create_poll(
        &self,
        user_id: i64,
        request: CreatePollRequest,
    ) -> Result<PollSummary, PollServiceError> {
        if request.question.trim().is_empty() || request.options.len() < 2 {
            return Err(PollServiceError::Validation(
                "Question and at least 2 options are required".to_string(),
            ));
        }

        if request.options.iter().any(|o| o.trim().is_empty()) {
            return Err(PollServiceError::Validation(
                "Option text cannot be empty".to_string(),
            ));
        }

        let poll = self
            .polls
            .create_poll(
                user_id,
                request.question.trim(),
                request.description.as_deref(),
                &request.options,
            )
            .await?;

        self.summarize(poll, None).await
    }

    pub async fn list_polls(
        &self,
        viewer: Option<i64>,
    ) -> Result<Vec<PollSummary>, PollServiceError> {
        let polls = self.polls.list_polls().await?;

        let mut summaries = Vec::with_capacity(polls.len());
        for poll in polls {
            summaries.push(self.summarize(poll, viewer).await?);
        }

        Ok(summaries)
    }

    pub async fn get_poll(
        &self,
        poll_id: i64,
        viewer: Option<i64>,
    ) -> Result<PollSummary, PollServiceError> {
        let poll = self
            .polls
            .find_poll(poll_id)
            .await?
            .ok_or(PollServiceError::PollNotFound)?;

        self.summarize(poll, viewer).await
    }

    pub async fn poll_results(&self, poll_id: i64) -> Result<PollResults, PollServiceError> {
        let summary = self.get_poll(poll_id, None).await?;

        Ok(PollResults {
            total_votes: summary.total_votes,
            options: summary.options.clone(),
            poll: summary,
        })
    }

    /// Records one vote. The poll and option are validated first; the
    /// duplicate-vote invariant itself is enforced by the storage layer's
    /// unique constraint, so two racing requests cannot both succeed.
    pub async fn cast_vote(
        &self,
        user_id: i64,
        poll_id: i64,
        option_id: i64,
    ) -> Result<VoteDetail, PollServiceError> {
        self.polls
            .find_poll(poll_id)
            .await?
            .ok_or(PollServiceError::PollNotFound)?;

        let option = self
            .polls
            .find_option(option_id)
            .await?
            .filter(|o| o.poll_id == poll_id)
            .ok_or(PollServiceError::OptionNotFound)?;

        let vote = match self.polls.insert_vote(user_id, poll_id, option.id).await {
            Ok(vote) => vote,
            Err(RepositoryError::AlreadyExists) => return Err(PollServiceError::DuplicateVote),
            Err(e) => return Err(PollServiceError::Repository(e)),
        };

        self.polls
            .find_vote_detail(vote.id)
            .await?
            .ok_or(PollServiceError::Repository(RepositoryError::NotFound))
    }

    pub async fn my_polls(&self, user_id: i64) -> Result<Vec<PollSummary>, PollServiceError> {
        let polls = self.polls.list_polls_by_user(user_id).await?;

        let mut summaries = Vec::with_capacity(polls.len());
        for poll in polls {
            summaries.push(self.summarize(poll, None).await?);
        }

        Ok(summaries)
    }

    pub async fn my_votes(&self, user_id: i64) -> Result<Vec<VoteDetail>, PollServiceError> {
        Ok(self.polls.list_user_votes(user_id).await?)
    }

    pub async fn option_votes(&self, option_id: i64) -> Result<Vec<VoteDetail>, PollServiceError> {
        Ok(self.polls.list_option_votes(option_id).await?)
    }

    pub async fn find_user_vote(
        &self,
        user_id: i64,
        poll_id: i64,
    ) -> Result<Option<VoteDetail>, PollServiceError> {
        Ok(self.polls.find_user_vote(user_id, poll_id).await?)
    }

    pub async fn delete_poll(&self, poll_id: i64, user_id: i64) -> Result<(), PollServiceError> {
        let poll = self
            .polls
            .find_poll(poll_id)
            .await?
            .ok_or(PollServiceError::PollNotFound)?;

        if poll.user_id != user_id {
            return Err(PollServiceError::NotOwner);
        }

        Ok(self.polls.delete_poll(poll_id).await?)
    }

    pub async fn count_polls_by_user(&self, user_id: i64) -> Result<i64, PollServiceError> {
        Ok(self.polls.count_polls_by_user(user_id).await?)
    }

    pub async fn count_votes_by_user(&self, user_id: i64) -> Result<i64, PollServiceError> {
        Ok(self.polls.count_votes_by_user(user_id).await?)
    }

    pub async fn user_stats(&self, user_id: i64) -> Result<UserStats, PollServiceError> {
        let polls_created = self.polls.count_polls_by_user(user_id).await?;
        let votes_cast = self.polls.count_votes_by_user(user_id).await?;
        let total_votes_received = self.polls.count_votes_received(user_id).await?;

        let own_polls = self.my_polls(user_id).await?;
        let most_popular_poll = own_polls
            .into_iter()
            .filter(|p| p.total_votes > 0)
            .max_by_key(|p| p.total_votes);

        Ok(UserStats {
            polls_created,
            votes_cast,
            total_votes_received,
            most_popular_poll,
        })
    }

    /// Builds the aggregate view of a poll: per-option counts, percentages
    /// and, if a viewer is given, that viewer's own vote.
    async fn summarize(
        &self,
        poll: Poll,
        viewer: Option<i64>,
    ) -> Result<PollSummary, PollServiceError> {
        let creator = self
            .users
            .find_by_id(poll.user_id)
            .await?
            .ok_or(PollServiceError::UserNotFound)?;

        let counts = self.polls.option_counts(poll.id).await?;
        let total_votes: i64 = counts.iter().map(|c| c.votes).sum();

        let options = counts
            .into_iter()
            .map(|c| OptionTally {
                id: c.id,
                text: c.text,
                votes: c.votes,
                percentage: percentage(c.votes, total_votes),
            })
            .collect();

        let user_vote = match viewer {
            Some(user_id) => self.polls.find_user_vote(user_id, poll.id).await?,
            None => None,
        };

        Ok(PollSummary {
            id: poll.id,
            question: poll.question,
            description: poll.description,
            created_by: PublicUser::from(creator),
            created_at: poll.created_at,
            options,
            total_votes,
            user_vote,
        })
    }
}

/// Share of the poll total, rounded half-up to two decimals. Zero when the
/// poll has no votes.
pub fn percentage(votes: i64, total_votes: i64) -> f64 {
    if total_votes <= 0 {
        return 0.0;
    }
    let raw = votes as f64 / total_votes as f64 * 100.0;
    (raw * 100.0).round() / 100.0
}
