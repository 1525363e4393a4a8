//! Atomic upsert of validated comments
//!
//! All records of one call land in a single transaction, keyed on `comment_id`.
//! Existing rows get `post_id`, `name`, `email` and `body` replaced while `id`
//! and `created_at` stay as they were. Records are applied in input order, so a
//! `comment_id` repeated within one batch ends up with its last values. Any
//! failure rolls the whole batch back.

use commentdb_common::NewComment;
use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, Transaction};

const UPSERT_COMMENT: &str = r#"
    INSERT INTO comments (post_id, comment_id, name, email, body)
    VALUES ($1, $2, $3, $4, $5)
    ON CONFLICT (comment_id) DO UPDATE
    SET post_id = EXCLUDED.post_id,
        name = EXCLUDED.name,
        email = EXCLUDED.email,
        body = EXCLUDED.body
"#;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitCommentsCommand {
    pub records: Vec<NewComment>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CommitCommentsResponse {
    /// Records written, inserts and updates alike
    pub committed: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum CommitCommentsError {
    #[error("Failed to store comments, nothing was committed: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<CommitCommentsResponse, CommitCommentsError>> for CommitCommentsCommand {}

impl crate::cqrs::middleware::Command for CommitCommentsCommand {}

#[tracing::instrument(skip(pool, command), fields(records = command.records.len()))]
pub async fn handle(
    pool: PgPool,
    command: CommitCommentsCommand,
) -> Result<CommitCommentsResponse, CommitCommentsError> {
    if command.records.is_empty() {
        return Ok(CommitCommentsResponse { committed: 0 });
    }

    let mut tx = pool.begin().await?;

    match upsert_all(&mut tx, &command.records).await {
        Ok(committed) => {
            tx.commit().await?;
            tracing::info!(committed, "Comments committed");
            Ok(CommitCommentsResponse { committed })
        },
        Err(e) => {
            if let Err(rollback) = tx.rollback().await {
                tracing::warn!(error = %rollback, "Rollback after failed upsert also failed");
            }
            tracing::error!(error = %e, "Comment upsert failed, batch rolled back");
            Err(CommitCommentsError::Database(e))
        },
    }
}

async fn upsert_all(
    tx: &mut Transaction<'_, Postgres>,
    records: &[NewComment],
) -> Result<usize, sqlx::Error> {
    for record in records {
        sqlx::query(UPSERT_COMMENT)
            .bind(record.post_id)
            .bind(record.comment_id)
            .bind(&record.name)
            .bind(&record.email)
            .bind(&record.body)
            .execute(&mut **tx)
            .await?;
    }
    Ok(records.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Comment;

    fn comment(post_id: i64, comment_id: i64, name: &str) -> NewComment {
        NewComment {
            post_id,
            comment_id,
            name: name.to_string(),
            email: format!("user{}@example.com", comment_id),
            body: format!("Body of {}", comment_id),
        }
    }

    async fn all_comments(pool: &PgPool) -> sqlx::Result<Vec<Comment>> {
        sqlx::query_as::<_, Comment>(
            "SELECT id, post_id, comment_id, name, email, body, created_at FROM comments ORDER BY comment_id",
        )
        .fetch_all(pool)
        .await
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_empty_batch_is_noop(pool: PgPool) -> sqlx::Result<()> {
        let response = handle(pool.clone(), CommitCommentsCommand { records: vec![] })
            .await
            .unwrap();
        assert_eq!(response.committed, 0);
        assert!(all_comments(&pool).await?.is_empty());
        Ok(())
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_inserts_round_trip(pool: PgPool) -> sqlx::Result<()> {
        let records = vec![comment(1, 10, "First"), comment(1, 11, "Second")];
        let response = handle(pool.clone(), CommitCommentsCommand { records: records.clone() })
            .await
            .unwrap();
        assert_eq!(response.committed, 2);

        let stored = all_comments(&pool).await?;
        assert_eq!(stored.len(), 2);
        for (stored, input) in stored.iter().zip(&records) {
            assert_eq!(stored.post_id, input.post_id);
            assert_eq!(stored.comment_id, input.comment_id);
            assert_eq!(stored.name, input.name);
            assert_eq!(stored.email, input.email);
            assert_eq!(stored.body, input.body);
        }
        Ok(())
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_recommit_is_idempotent(pool: PgPool) -> sqlx::Result<()> {
        let records = vec![comment(1, 1, "A"), comment(2, 2, "B")];
        handle(pool.clone(), CommitCommentsCommand { records: records.clone() })
            .await
            .unwrap();
        let first = all_comments(&pool).await?;

        let again = handle(pool.clone(), CommitCommentsCommand { records })
            .await
            .unwrap();
        assert_eq!(again.committed, 2);
        assert_eq!(all_comments(&pool).await?, first);
        Ok(())
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_conflict_updates_in_place(pool: PgPool) -> sqlx::Result<()> {
        handle(pool.clone(), CommitCommentsCommand { records: vec![comment(1, 5, "Old")] })
            .await
            .unwrap();
        let before = all_comments(&pool).await?.remove(0);

        let mut updated = comment(9, 5, "New");
        updated.email = "changed@example.com".to_string();
        handle(pool.clone(), CommitCommentsCommand { records: vec![updated] })
            .await
            .unwrap();

        let after = all_comments(&pool).await?;
        assert_eq!(after.len(), 1);
        let after = &after[0];
        assert_eq!(after.id, before.id);
        assert_eq!(after.created_at, before.created_at);
        assert_eq!(after.post_id, 9);
        assert_eq!(after.name, "New");
        assert_eq!(after.email, "changed@example.com");
        Ok(())
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_duplicate_key_in_batch_last_wins(pool: PgPool) -> sqlx::Result<()> {
        let records = vec![comment(1, 7, "Earlier"), comment(2, 7, "Later")];
        let response = handle(pool.clone(), CommitCommentsCommand { records })
            .await
            .unwrap();
        assert_eq!(response.committed, 2);

        let stored = all_comments(&pool).await?;
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].name, "Later");
        assert_eq!(stored[0].post_id, 2);
        Ok(())
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_failure_rolls_back_whole_batch(pool: PgPool) -> sqlx::Result<()> {
        handle(pool.clone(), CommitCommentsCommand { records: vec![comment(1, 1, "Kept")] })
            .await
            .unwrap();
        let before = all_comments(&pool).await?;

        // The name column holds 255 characters at most.
        let records = vec![
            comment(1, 1, "Would overwrite"),
            comment(1, 2, "Would insert"),
            comment(1, 3, &"x".repeat(300)),
        ];
        let result = handle(pool.clone(), CommitCommentsCommand { records }).await;
        assert!(matches!(result, Err(CommitCommentsError::Database(_))));

        assert_eq!(all_comments(&pool).await?, before);
        Ok(())
    }
}
