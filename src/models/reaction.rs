use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Reaction {
    pub id: Uuid,
    pub discussion_id: Uuid,
    pub user_id: Uuid,
    pub comment_id: Option<Uuid>,
    pub emoji: String,
    pub created_at: DateTime<Utc>,
}

impl Reaction {
    #[inline]
    pub fn is_emoji(&self, emoji: &str) -> bool {
        self.emoji == emoji
    }

    #[inline]
    pub fn target(&self) -> ReactionTarget {
        ReactionTarget::from(self.comment_id)
    }
}

/// What a reaction is attached to inside a discussion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReactionTarget {
    Discussion,
    Comment(Uuid),
}

impl ReactionTarget {
    pub fn comment_id(self) -> Option<Uuid> {
        match self {
            ReactionTarget::Discussion => None,
            ReactionTarget::Comment(id) => Some(id),
        }
    }
}

impl From<Option<Uuid>> for ReactionTarget {
    fn from(comment_id: Option<Uuid>) -> Self {
        comment_id.map_or(ReactionTarget::Discussion, ReactionTarget::Comment)
    }
}

/// Unique key of a reaction: one emoji per viewer per target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactionKey {
    pub discussion_id: Uuid,
    pub user_id: Uuid,
    pub target: ReactionTarget,
    pub emoji: String,
}

impl ReactionKey {
    pub fn matches(&self, reaction: &Reaction) -> bool {
        reaction.discussion_id == self.discussion_id
            && reaction.user_id == self.user_id
            && reaction.target() == self.target
            && reaction.is_emoji(&self.emoji)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReactionToggle {
    Added(Reaction),
    Removed,
}

// Toggle reaction request
#[derive(Debug, Clone, Validate, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleReactionRequest {
    #[validate(length(min = 1, max = 32, message = "emoji must be 1-32 characters"))]
    pub emoji: String,
    pub comment_id: Option<Uuid>,
}

/// Aggregated count for one emoji on one target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactionCount {
    pub emoji: String,
    pub count: u32,
    pub me: bool,
}

/// Per-emoji tallies for a single target, in first-seen emoji order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ReactionTally {
    pub counts: Vec<ReactionCount>,
}

impl ReactionTally {
    pub fn count(&self, emoji: &str) -> u32 {
        self.find(emoji).map_or(0, |entry| entry.count)
    }

    pub fn viewer_has_reacted(&self, emoji: &str) -> bool {
        self.find(emoji).is_some_and(|entry| entry.me)
    }

    pub fn viewer_emojis(&self) -> impl Iterator<Item = &str> {
        self.counts
            .iter()
            .filter(|entry| entry.me)
            .map(|entry| entry.emoji.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    fn find(&self, emoji: &str) -> Option<&ReactionCount> {
        self.counts.iter().find(|entry| entry.emoji == emoji)
    }
}
