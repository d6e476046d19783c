use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::{CommentView, ReactionTally};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "discussion_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DiscussionType {
    Debate,
    Free,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Discussion {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub discussion_type: DiscussionType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Discussion {
    pub fn is_debate(&self) -> bool {
        self.discussion_type == DiscussionType::Debate
    }
}

// Listing entry
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DiscussionSummary {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub discussion: Discussion,
    pub comment_count: i64,
}

/// For/against split of a debate. Percentages are preformatted with one
/// decimal place so clients render them verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebateStats {
    pub for_count: u32,
    pub against_count: u32,
    pub neutral_count: u32,
    pub total_count: u32,
    pub for_percentage: String,
    pub against_percentage: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub neutral_percentage: Option<String>,
}

// Full read model of a discussion page
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscussionAggregate {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub discussion_type: DiscussionType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub comments: Vec<CommentView>,
    /// Tally of reactions on the discussion itself, not the raw rows.
    pub reactions: ReactionTally,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debate_stats: Option<DebateStats>,
}
