use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::ReactionTally;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "comment_stance", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Stance {
    For,
    Against,
    Neutral,
}

impl Stance {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "for" => Some(Stance::For),
            "against" => Some(Stance::Against),
            "neutral" => Some(Stance::Neutral),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Uuid,
    pub discussion_id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub stance: Option<Stance>,
    pub parent_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Comment {
    #[inline]
    pub fn is_top_level(&self) -> bool {
        self.parent_id.is_none()
    }
}

// Create comment request
//
// Stance arrives as free text so an unknown value surfaces as a validation
// error instead of a deserialization rejection.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    pub content: String,
    pub stance: Option<String>,
    pub parent_id: Option<Uuid>,
}

/// A submission that passed validation, ready to be persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedComment {
    pub content: String,
    pub stance: Option<Stance>,
    pub parent_id: Option<Uuid>,
}

// Insert payload handed to the store
#[derive(Debug, Clone)]
pub struct NewComment {
    pub discussion_id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub stance: Option<Stance>,
    pub parent_id: Option<Uuid>,
}

/// Comment as it appears inside a discussion aggregate.
///
/// `reactions` is the per-emoji tally with viewer flags; individual reaction
/// rows are not exposed.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    #[serde(flatten)]
    pub comment: Comment,
    pub reply_count: usize,
    pub reactions: ReactionTally,
}
