use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::DiscussionStore;
use crate::{
    error::Result,
    models::{
        Comment, Discussion, DiscussionSummary, DiscussionType, NewComment, Reaction,
        ReactionKey, ReactionTarget, ReactionToggle,
    },
};

#[derive(Debug, Default)]
struct Tables {
    discussions: Vec<Discussion>,
    comments: Vec<Comment>,
    reactions: Vec<Reaction>,
}

/// Store kept entirely in process memory. Every write happens under a single
/// write lock, so toggles are atomic with respect to each other.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a discussion. Discussions are created outside this service, so
    /// this only exists for tests and local runs.
    pub async fn insert_discussion(
        &self,
        title: &str,
        description: &str,
        discussion_type: DiscussionType,
    ) -> Discussion {
        let now = Utc::now();
        let discussion = Discussion {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: description.to_string(),
            discussion_type,
            created_at: now,
            updated_at: now,
        };

        self.tables.write().await.discussions.push(discussion.clone());
        discussion
    }
}

fn new_reaction(key: &ReactionKey) -> Reaction {
    Reaction {
        id: Uuid::new_v4(),
        discussion_id: key.discussion_id,
        user_id: key.user_id,
        comment_id: key.target.comment_id(),
        emoji: key.emoji.clone(),
        created_at: Utc::now(),
    }
}

#[async_trait]
impl DiscussionStore for InMemoryStore {
    async fn get_discussion_by_id(&self, id: Uuid) -> Result<Option<Discussion>> {
        let tables = self.tables.read().await;
        Ok(tables.discussions.iter().find(|d| d.id == id).cloned())
    }

    async fn list_discussions(&self, limit: u32, offset: u32) -> Result<Vec<DiscussionSummary>> {
        let tables = self.tables.read().await;

        // Later inserts win ties on created_at
        let mut discussions: Vec<&Discussion> = tables.discussions.iter().rev().collect();
        discussions.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let summaries = discussions
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .map(|discussion| DiscussionSummary {
                discussion: discussion.clone(),
                comment_count: tables
                    .comments
                    .iter()
                    .filter(|c| c.discussion_id == discussion.id)
                    .count() as i64,
            })
            .collect();

        Ok(summaries)
    }

    async fn list_comments_by_discussion(&self, discussion_id: Uuid) -> Result<Vec<Comment>> {
        let tables = self.tables.read().await;
        Ok(tables
            .comments
            .iter()
            .filter(|c| c.discussion_id == discussion_id)
            .cloned()
            .collect())
    }

    async fn get_comment_by_id(&self, id: Uuid) -> Result<Option<Comment>> {
        let tables = self.tables.read().await;
        Ok(tables.comments.iter().find(|c| c.id == id).cloned())
    }

    async fn list_reactions(
        &self,
        discussion_id: Uuid,
        target: Option<ReactionTarget>,
    ) -> Result<Vec<Reaction>> {
        let tables = self.tables.read().await;
        Ok(tables
            .reactions
            .iter()
            .filter(|r| r.discussion_id == discussion_id)
            .filter(|r| target.is_none_or(|t| r.target() == t))
            .cloned()
            .collect())
    }

    async fn create_comment(&self, comment: NewComment) -> Result<Comment> {
        let now = Utc::now();
        let comment = Comment {
            id: Uuid::new_v4(),
            discussion_id: comment.discussion_id,
            user_id: comment.user_id,
            content: comment.content,
            stance: comment.stance,
            parent_id: comment.parent_id,
            created_at: now,
            updated_at: now,
        };

        self.tables.write().await.comments.push(comment.clone());
        Ok(comment)
    }

    async fn create_reaction(&self, key: &ReactionKey) -> Result<Reaction> {
        let mut tables = self.tables.write().await;

        if let Some(existing) = tables.reactions.iter().find(|r| key.matches(r)) {
            return Ok(existing.clone());
        }

        let reaction = new_reaction(key);
        tables.reactions.push(reaction.clone());
        Ok(reaction)
    }

    async fn delete_reaction(&self, key: &ReactionKey) -> Result<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.reactions.len();
        tables.reactions.retain(|r| !key.matches(r));
        Ok(tables.reactions.len() != before)
    }

    async fn toggle_reaction(&self, key: &ReactionKey) -> Result<ReactionToggle> {
        let mut tables = self.tables.write().await;

        if let Some(index) = tables.reactions.iter().position(|r| key.matches(r)) {
            tables.reactions.remove(index);
            return Ok(ReactionToggle::Removed);
        }

        let reaction = new_reaction(key);
        tables.reactions.push(reaction.clone());
        Ok(ReactionToggle::Added(reaction))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thumbs_up(discussion_id: Uuid, user_id: Uuid) -> ReactionKey {
        ReactionKey {
            discussion_id,
            user_id,
            target: ReactionTarget::Discussion,
            emoji: "👍".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_reaction_is_unique_per_key() {
        let store = InMemoryStore::new();
        let discussion = store.insert_discussion("t", "d", DiscussionType::Free).await;
        let key = thumbs_up(discussion.id, Uuid::new_v4());

        let first = store.create_reaction(&key).await.unwrap();
        let second = store.create_reaction(&key).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(store.list_reactions(discussion.id, None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_reaction_reports_removal() {
        let store = InMemoryStore::new();
        let discussion = store.insert_discussion("t", "d", DiscussionType::Free).await;
        let key = thumbs_up(discussion.id, Uuid::new_v4());

        assert!(!store.delete_reaction(&key).await.unwrap());
        store.create_reaction(&key).await.unwrap();
        assert!(store.delete_reaction(&key).await.unwrap());
        assert!(store.list_reactions(discussion.id, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_reactions_filters_by_target() {
        let store = InMemoryStore::new();
        let discussion = store.insert_discussion("t", "d", DiscussionType::Free).await;
        let user_id = Uuid::new_v4();
        let comment_id = Uuid::new_v4();

        store
            .create_reaction(&thumbs_up(discussion.id, user_id))
            .await
            .unwrap();
        store
            .create_reaction(&ReactionKey {
                target: ReactionTarget::Comment(comment_id),
                ..thumbs_up(discussion.id, user_id)
            })
            .await
            .unwrap();

        let all = store.list_reactions(discussion.id, None).await.unwrap();
        let on_discussion = store
            .list_reactions(discussion.id, Some(ReactionTarget::Discussion))
            .await
            .unwrap();
        let on_comment = store
            .list_reactions(discussion.id, Some(ReactionTarget::Comment(comment_id)))
            .await
            .unwrap();

        assert_eq!(all.len(), 2);
        assert_eq!(on_discussion.len(), 1);
        assert_eq!(on_comment.len(), 1);
        assert_eq!(on_comment[0].comment_id, Some(comment_id));
    }

    #[tokio::test]
    async fn test_list_discussions_newest_first_with_counts() {
        let store = InMemoryStore::new();
        let older = store.insert_discussion("older", "", DiscussionType::Free).await;
        let newer = store.insert_discussion("newer", "", DiscussionType::Debate).await;

        store
            .create_comment(NewComment {
                discussion_id: older.id,
                user_id: Uuid::new_v4(),
                content: "hi".to_string(),
                stance: None,
                parent_id: None,
            })
            .await
            .unwrap();

        let summaries = store.list_discussions(10, 0).await.unwrap();
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].discussion.id, newer.id);
        assert_eq!(summaries[0].comment_count, 0);
        assert_eq!(summaries[1].discussion.id, older.id);
        assert_eq!(summaries[1].comment_count, 1);

        let page = store.list_discussions(1, 1).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].discussion.id, older.id);
    }
}
