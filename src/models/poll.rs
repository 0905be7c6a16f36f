use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::user::PublicUser;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Poll {
    pub id: i64,
    pub user_id: i64,
    pub question: String,
    pub description: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollOption {
    pub id: i64,
    pub poll_id: i64,
    pub text: String,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vote {
    pub id: i64,
    pub user_id: i64,
    pub option_id: i64,
    pub poll_id: i64,
    pub created_at: String,
}

/// One option with its vote count joined in.
#[derive(Debug, Clone, FromRow)]
pub struct OptionCount {
    pub id: i64,
    pub poll_id: i64,
    pub text: String,
    pub votes: i64,
}

/// A vote joined with its voter, option and poll context.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteDetail {
    pub id: i64,
    pub user_id: i64,
    pub user_name: String,
    pub option_id: i64,
    pub option_text: String,
    pub poll_id: i64,
    pub poll_question: String,
    pub created_at: String,
}

/// Derived per-option statistics. Never stored; computed on read.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionTally {
    pub id: i64,
    pub text: String,
    pub votes: i64,
    pub percentage: f64,
}

/// A poll with its aggregates, creator and (optionally) the viewer's vote.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollSummary {
    pub id: i64,
    pub question: String,
    pub description: Option<String>,
    pub created_by: PublicUser,
    pub created_at: String,
    pub options: Vec<OptionTally>,
    pub total_votes: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_vote: Option<VoteDetail>,
}

/// Aggregated results for one poll.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollResults {
    pub poll: PollSummary,
    pub total_votes: i64,
    pub options: Vec<OptionTally>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub polls_created: i64,
    pub votes_cast: i64,
    pub total_votes_received: i64,
    pub most_popular_poll: Option<PollSummary>,
}
