//! Persistence boundary for discussions, comments and reactions.
//!
//! Services only talk to [`DiscussionStore`]; the Postgres implementation backs
//! the running server and [`InMemoryStore`] backs tests and local runs.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    error::Result,
    models::{
        Comment, Discussion, DiscussionSummary, NewComment, Reaction, ReactionKey,
        ReactionTarget, ReactionToggle,
    },
};

pub use memory::InMemoryStore;
pub use postgres::PgDiscussionStore;

#[async_trait]
pub trait DiscussionStore: Send + Sync {
    /// Find a discussion by ID
    async fn get_discussion_by_id(&self, id: Uuid) -> Result<Option<Discussion>>;

    /// Newest discussions first, with their comment counts
    async fn list_discussions(&self, limit: u32, offset: u32) -> Result<Vec<DiscussionSummary>>;

    /// All comments of a discussion, replies included, in creation order
    async fn list_comments_by_discussion(&self, discussion_id: Uuid) -> Result<Vec<Comment>>;

    /// Find a comment by ID
    async fn get_comment_by_id(&self, id: Uuid) -> Result<Option<Comment>>;

    /// Reactions of a discussion, restricted to one target when `target` is set
    async fn list_reactions(
        &self,
        discussion_id: Uuid,
        target: Option<ReactionTarget>,
    ) -> Result<Vec<Reaction>>;

    async fn create_comment(&self, comment: NewComment) -> Result<Comment>;

    /// Insert a reaction; an existing row with the same key is returned unchanged
    async fn create_reaction(&self, key: &ReactionKey) -> Result<Reaction>;

    /// Delete a reaction, reporting whether a row was removed
    async fn delete_reaction(&self, key: &ReactionKey) -> Result<bool>;

    /// Delete the reaction under `key` if present, insert it otherwise, as one
    /// atomic write.
    async fn toggle_reaction(&self, key: &ReactionKey) -> Result<ReactionToggle>;
}
