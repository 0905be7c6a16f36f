use crate::models::{OptionCount, Poll, PollOption, Vote, VoteDetail};
use async_trait::async_trait;
use sqlx::SqlitePool;

use super::{map_unique_violation, RepositoryError, RepositoryResult};

#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait PollRepository: Send + Sync {
    /// Inserts the poll and all of its options in one transaction.
    async fn create_poll(
        &self,
        user_id: i64,
        question: &str,
        description: Option<&str>,
        options: &[String],
    ) -> RepositoryResult<Poll>;
    async fn find_poll(&self, id: i64) -> RepositoryResult<Option<Poll>>;
    async fn list_polls(&self) -> RepositoryResult<Vec<Poll>>;
    async fn list_polls_by_user(&self, user_id: i64) -> RepositoryResult<Vec<Poll>>;
    async fn find_option(&self, option_id: i64) -> RepositoryResult<Option<PollOption>>;
    /// Per-option vote counts for a poll, in option id order.
    async fn option_counts(&self, poll_id: i64) -> RepositoryResult<Vec<OptionCount>>;
    /// Single atomic insert; the UNIQUE (user_id, poll_id) constraint turns a
    /// duplicate vote into `AlreadyExists` even under concurrent requests.
    async fn insert_vote(
        &self,
        user_id: i64,
        poll_id: i64,
        option_id: i64,
    ) -> RepositoryResult<Vote>;
    async fn find_user_vote(
        &self,
        user_id: i64,
        poll_id: i64,
    ) -> RepositoryResult<Option<VoteDetail>>;
    async fn list_user_votes(&self, user_id: i64) -> RepositoryResult<Vec<VoteDetail>>;
    async fn list_option_votes(&self, option_id: i64) -> RepositoryResult<Vec<VoteDetail>>;
    async fn find_vote_detail(&self, vote_id: i64) -> RepositoryResult<Option<VoteDetail>>;
    /// Options and votes go with the poll (ON DELETE CASCADE).
    async fn delete_poll(&self, id: i64) -> RepositoryResult<()>;
    async fn count_polls_by_user(&self, user_id: i64) -> RepositoryResult<i64>;
    async fn count_votes_by_user(&self, user_id: i64) -> RepositoryResult<i64>;
    /// Votes cast on polls owned by the given user.
    async fn count_votes_received(&self, user_id: i64) -> RepositoryResult<i64>;
}

pub struct SqlitePollRepository {
    pool: SqlitePool,
}

impl SqlitePollRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

const POLL_COLUMNS: &str = "id, user_id, question, description, created_at";

const VOTE_DETAIL_QUERY: &str = "SELECT v.id, v.user_id, u.name AS user_name, \
     v.option_id, o.text AS option_text, v.poll_id, p.question AS poll_question, v.created_at \
     FROM votes v \
     JOIN users u ON u.id = v.user_id \
     JOIN options o ON o.id = v.option_id \
     JOIN polls p ON p.id = v.poll_id";

#[async_trait]
impl PollRepository for SqlitePollRepository {
    async fn create_poll(
        &self,
        user_id: i64,
        question: &str,
        description: Option<&str>,
        options: &[String],
    ) -> RepositoryResult<Poll> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("INSERT INTO polls (user_id, question, description) VALUES (?, ?, ?)")
            .bind(user_id)
            .bind(question)
            .bind(description)
            .execute(&mut *tx)
            .await?;

        let poll_id = result.last_insert_rowid();

        for text in options {
            sqlx::query("INSERT INTO options (poll_id, text) VALUES (?, ?)")
                .bind(poll_id)
                .bind(text)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        self.find_poll(poll_id)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    async fn find_poll(&self, id: i64) -> RepositoryResult<Option<Poll>> {
        let poll = sqlx::query_as::<_, Poll>(&format!(
            "SELECT {POLL_COLUMNS} FROM polls WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(poll)
    }

    async fn list_polls(&self) -> RepositoryResult<Vec<Poll>> {
        let polls = sqlx::query_as::<_, Poll>(&format!(
            "SELECT {POLL_COLUMNS} FROM polls ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(polls)
    }

    async fn list_polls_by_user(&self, user_id: i64) -> RepositoryResult<Vec<Poll>> {
        let polls = sqlx::query_as::<_, Poll>(&format!(
            "SELECT {POLL_COLUMNS} FROM polls WHERE user_id = ? ORDER BY created_at DESC, id DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(polls)
    }

    async fn find_option(&self, option_id: i64) -> RepositoryResult<Option<PollOption>> {
        let option =
            sqlx::query_as::<_, PollOption>("SELECT id, poll_id, text FROM options WHERE id = ?")
                .bind(option_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(option)
    }

    async fn option_counts(&self, poll_id: i64) -> RepositoryResult<Vec<OptionCount>> {
        let counts = sqlx::query_as::<_, OptionCount>(
            "SELECT o.id, o.poll_id, o.text, COUNT(v.id) AS votes \
             FROM options o \
             LEFT JOIN votes v ON v.option_id = o.id \
             WHERE o.poll_id = ? \
             GROUP BY o.id \
             ORDER BY o.id",
        )
        .bind(poll_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(counts)
    }

    async fn insert_vote(
        &self,
        user_id: i64,
        poll_id: i64,
        option_id: i64,
    ) -> RepositoryResult<Vote> {
        let result = sqlx::query("INSERT INTO votes (user_id, option_id, poll_id) VALUES (?, ?, ?)")
            .bind(user_id)
            .bind(option_id)
            .bind(poll_id)
            .execute(&self.pool)
            .await
            .map_err(map_unique_violation)?;

        let vote_id = result.last_insert_rowid();

        let vote = sqlx::query_as::<_, Vote>(
            "SELECT id, user_id, option_id, poll_id, created_at FROM votes WHERE id = ?",
        )
        .bind(vote_id)
        .fetch_optional(&self.pool)
        .await?;

        vote.ok_or(RepositoryError::NotFound)
    }

    async fn find_user_vote(
        &self,
        user_id: i64,
        poll_id: i64,
    ) -> RepositoryResult<Option<VoteDetail>> {
        let vote = sqlx::query_as::<_, VoteDetail>(&format!(
            "{VOTE_DETAIL_QUERY} WHERE v.user_id = ? AND v.poll_id = ?"
        ))
        .bind(user_id)
        .bind(poll_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(vote)
    }

    async fn list_user_votes(&self, user_id: i64) -> RepositoryResult<Vec<VoteDetail>> {
        let votes = sqlx::query_as::<_, VoteDetail>(&format!(
            "{VOTE_DETAIL_QUERY} WHERE v.user_id = ? ORDER BY v.created_at DESC, v.id DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(votes)
    }

    async fn list_option_votes(&self, option_id: i64) -> RepositoryResult<Vec<VoteDetail>> {
        let votes = sqlx::query_as::<_, VoteDetail>(&format!(
            "{VOTE_DETAIL_QUERY} WHERE v.option_id = ? ORDER BY v.created_at DESC, v.id DESC"
        ))
        .bind(option_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(votes)
    }

    async fn find_vote_detail(&self, vote_id: i64) -> RepositoryResult<Option<VoteDetail>> {
        let vote = sqlx::query_as::<_, VoteDetail>(&format!(
            "{VOTE_DETAIL_QUERY} WHERE v.id = ?"
        ))
        .bind(vote_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(vote)
    }

    async fn delete_poll(&self, id: i64) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM polls WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn count_polls_by_user(&self, user_id: i64) -> RepositoryResult<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM polls WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }

    async fn count_votes_by_user(&self, user_id: i64) -> RepositoryResult<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM votes WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }

    async fn count_votes_received(&self, user_id: i64) -> RepositoryResult<i64> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM votes v JOIN polls p ON p.id = v.poll_id WHERE p.user_id = ?",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0)
    }
}
