use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::DiscussionStore;
use crate::{
    error::{AppError, Result},
    models::{
        Comment, Discussion, DiscussionSummary, NewComment, Reaction, ReactionKey,
        ReactionTarget, ReactionToggle,
    },
};

const COMMENT_COLUMNS: &str =
    "id, discussion_id, user_id, content, stance, parent_id, created_at, updated_at";
const REACTION_COLUMNS: &str = "id, discussion_id, user_id, comment_id, emoji, created_at";

#[derive(Clone)]
pub struct PgDiscussionStore {
    db: PgPool,
}

impl PgDiscussionStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

// Result of the single-statement toggle: the inserted row (if any) and how
// many rows the delete branch removed.
#[derive(Debug, FromRow)]
struct ToggleRow {
    id: Option<Uuid>,
    discussion_id: Option<Uuid>,
    user_id: Option<Uuid>,
    comment_id: Option<Uuid>,
    emoji: Option<String>,
    created_at: Option<DateTime<Utc>>,
    removed_count: i64,
}

impl ToggleRow {
    fn into_reaction(self) -> Option<Reaction> {
        Some(Reaction {
            id: self.id?,
            discussion_id: self.discussion_id?,
            user_id: self.user_id?,
            comment_id: self.comment_id,
            emoji: self.emoji?,
            created_at: self.created_at?,
        })
    }
}

impl PgDiscussionStore {
    async fn find_reaction(&self, key: &ReactionKey) -> Result<Option<Reaction>> {
        let reaction = sqlx::query_as::<_, Reaction>(&format!(
            r#"
            SELECT {REACTION_COLUMNS} FROM reactions
            WHERE discussion_id = $1 AND user_id = $2
              AND comment_id IS NOT DISTINCT FROM $3 AND emoji = $4
            "#
        ))
        .bind(key.discussion_id)
        .bind(key.user_id)
        .bind(key.target.comment_id())
        .bind(&key.emoji)
        .fetch_optional(&self.db)
        .await?;

        Ok(reaction)
    }
}

#[async_trait]
impl DiscussionStore for PgDiscussionStore {
    async fn get_discussion_by_id(&self, id: Uuid) -> Result<Option<Discussion>> {
        let discussion = sqlx::query_as::<_, Discussion>(
            r#"
            SELECT id, title, description, discussion_type, created_at, updated_at
            FROM discussions
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(discussion)
    }

    async fn list_discussions(&self, limit: u32, offset: u32) -> Result<Vec<DiscussionSummary>> {
        let summaries = sqlx::query_as::<_, DiscussionSummary>(
            r#"
            SELECT
                d.id, d.title, d.description, d.discussion_type, d.created_at, d.updated_at,
                COUNT(c.id) AS comment_count
            FROM discussions d
            LEFT JOIN comments c ON c.discussion_id = d.id
            GROUP BY d.id
            ORDER BY d.created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit as i64)
        .bind(offset as i64)
        .fetch_all(&self.db)
        .await?;

        Ok(summaries)
    }

    async fn list_comments_by_discussion(&self, discussion_id: Uuid) -> Result<Vec<Comment>> {
        let comments = sqlx::query_as::<_, Comment>(&format!(
            r#"
            SELECT {COMMENT_COLUMNS} FROM comments
            WHERE discussion_id = $1
            ORDER BY created_at ASC, id ASC
            "#
        ))
        .bind(discussion_id)
        .fetch_all(&self.db)
        .await?;

        Ok(comments)
    }

    async fn get_comment_by_id(&self, id: Uuid) -> Result<Option<Comment>> {
        let comment = sqlx::query_as::<_, Comment>(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(comment)
    }

    async fn list_reactions(
        &self,
        discussion_id: Uuid,
        target: Option<ReactionTarget>,
    ) -> Result<Vec<Reaction>> {
        let reactions = match target {
            None => {
                sqlx::query_as::<_, Reaction>(&format!(
                    r#"
                    SELECT {REACTION_COLUMNS} FROM reactions
                    WHERE discussion_id = $1
                    ORDER BY created_at ASC
                    "#
                ))
                .bind(discussion_id)
                .fetch_all(&self.db)
                .await?
            }
            Some(target) => {
                sqlx::query_as::<_, Reaction>(&format!(
                    r#"
                    SELECT {REACTION_COLUMNS} FROM reactions
                    WHERE discussion_id = $1 AND comment_id IS NOT DISTINCT FROM $2
                    ORDER BY created_at ASC
                    "#
                ))
                .bind(discussion_id)
                .bind(target.comment_id())
                .fetch_all(&self.db)
                .await?
            }
        };

        Ok(reactions)
    }

    async fn create_comment(&self, comment: NewComment) -> Result<Comment> {
        let now = Utc::now();

        let created = sqlx::query_as::<_, Comment>(&format!(
            r#"
            INSERT INTO comments (
                id, discussion_id, user_id, content, stance, parent_id, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
            RETURNING {COMMENT_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(comment.discussion_id)
        .bind(comment.user_id)
        .bind(&comment.content)
        .bind(comment.stance)
        .bind(comment.parent_id)
        .bind(now)
        .fetch_one(&self.db)
        .await?;

        Ok(created)
    }

    async fn create_reaction(&self, key: &ReactionKey) -> Result<Reaction> {
        let inserted = sqlx::query_as::<_, Reaction>(&format!(
            r#"
            INSERT INTO reactions (id, discussion_id, user_id, comment_id, emoji, created_at)
            VALUES ($1, $2, $3, $4, $5, NOW())
            ON CONFLICT DO NOTHING
            RETURNING {REACTION_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(key.discussion_id)
        .bind(key.user_id)
        .bind(key.target.comment_id())
        .bind(&key.emoji)
        .fetch_optional(&self.db)
        .await?;

        match inserted {
            Some(reaction) => Ok(reaction),
            None => self
                .find_reaction(key)
                .await?
                .ok_or_else(|| AppError::Internal("Reaction vanished after conflict".to_string())),
        }
    }

    async fn delete_reaction(&self, key: &ReactionKey) -> Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM reactions
            WHERE discussion_id = $1 AND user_id = $2
              AND comment_id IS NOT DISTINCT FROM $3 AND emoji = $4
            "#,
        )
        .bind(key.discussion_id)
        .bind(key.user_id)
        .bind(key.target.comment_id())
        .bind(&key.emoji)
        .execute(&self.db)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn toggle_reaction(&self, key: &ReactionKey) -> Result<ReactionToggle> {
        // Delete and conditional insert share one statement snapshot, so a
        // reaction is either removed or added, never both.
        let row = sqlx::query_as::<_, ToggleRow>(
            r#"
            WITH removed AS (
                DELETE FROM reactions
                WHERE discussion_id = $1 AND user_id = $2
                  AND comment_id IS NOT DISTINCT FROM $3 AND emoji = $4
                RETURNING id
            ),
            inserted AS (
                INSERT INTO reactions (id, discussion_id, user_id, comment_id, emoji, created_at)
                SELECT $5, $1, $2, $3, $4, NOW()
                WHERE NOT EXISTS (SELECT 1 FROM removed)
                ON CONFLICT DO NOTHING
                RETURNING id, discussion_id, user_id, comment_id, emoji, created_at
            )
            SELECT
                i.id, i.discussion_id, i.user_id, i.comment_id, i.emoji, i.created_at,
                (SELECT COUNT(*) FROM removed) AS removed_count
            FROM (SELECT 1) AS one
            LEFT JOIN inserted i ON TRUE
            "#,
        )
        .bind(key.discussion_id)
        .bind(key.user_id)
        .bind(key.target.comment_id())
        .bind(&key.emoji)
        .bind(Uuid::new_v4())
        .fetch_one(&self.db)
        .await?;

        if row.removed_count > 0 {
            return Ok(ReactionToggle::Removed);
        }

        if let Some(reaction) = row.into_reaction() {
            return Ok(ReactionToggle::Added(reaction));
        }

        // A concurrent toggle inserted the same key first; the persisted row wins.
        tracing::debug!(
            discussion_id = %key.discussion_id,
            user_id = %key.user_id,
            emoji = %key.emoji,
            "Reaction toggle raced with another insert"
        );
        let existing = self
            .find_reaction(key)
            .await?
            .ok_or_else(|| AppError::Internal("Reaction vanished after conflict".to_string()))?;

        Ok(ReactionToggle::Added(existing))
    }
}
