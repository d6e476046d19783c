use std::collections::HashMap;

use tracing::instrument;
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    models::{CommentView, Discussion, DiscussionAggregate, DiscussionSummary, Reaction},
    services::{
        comment_tree::{self, CommentThread},
        reaction_service,
        stance_tally::{self, StanceCounts, StancePolicy},
    },
    store::DiscussionStore,
};

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

pub async fn get_discussion(
    store: &dyn DiscussionStore,
    discussion_id: Uuid,
) -> Result<Discussion> {
    store
        .get_discussion_by_id(discussion_id)
        .await?
        .ok_or_else(|| AppError::not_found("Discussion not found"))
}

pub async fn list_discussions(
    store: &dyn DiscussionStore,
    limit: Option<u32>,
    offset: Option<u32>,
) -> Result<Vec<DiscussionSummary>> {
    let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
    let offset = offset.unwrap_or(0);

    store.list_discussions(limit, offset).await
}

/// Assembles a discussion, its flat comment list with reply counts and
/// reactions, its own reactions and, for debates, the stance tally.
#[instrument(skip(store))]
pub async fn get_discussion_aggregate(
    store: &dyn DiscussionStore,
    discussion_id: Uuid,
    viewer_id: Option<Uuid>,
    policy: StancePolicy,
) -> Result<DiscussionAggregate> {
    let discussion = get_discussion(store, discussion_id).await?;
    let comments = store.list_comments_by_discussion(discussion_id).await?;
    let reactions = store.list_reactions(discussion_id, None).await?;

    let mut reply_counts: HashMap<Uuid, usize> = HashMap::new();
    for parent_id in comments.iter().filter_map(|c| c.parent_id) {
        *reply_counts.entry(parent_id).or_default() += 1;
    }

    let mut discussion_reactions: Vec<&Reaction> = Vec::new();
    let mut comment_reactions: HashMap<Uuid, Vec<&Reaction>> = HashMap::new();
    for reaction in &reactions {
        match reaction.comment_id {
            None => discussion_reactions.push(reaction),
            Some(comment_id) => comment_reactions.entry(comment_id).or_default().push(reaction),
        }
    }

    let debate_stats = discussion
        .is_debate()
        .then(|| stance_tally::tally(StanceCounts::from_comments(&comments), policy));

    let comments = comments
        .into_iter()
        .map(|comment| CommentView {
            reply_count: reply_counts.get(&comment.id).copied().unwrap_or(0),
            reactions: reaction_service::tally(
                comment_reactions.get(&comment.id).into_iter().flatten().copied(),
                viewer_id,
            ),
            comment,
        })
        .collect();

    tracing::debug!(discussion_id = %discussion_id, "Discussion aggregate assembled");

    Ok(DiscussionAggregate {
        id: discussion.id,
        title: discussion.title,
        description: discussion.description,
        discussion_type: discussion.discussion_type,
        created_at: discussion.created_at,
        updated_at: discussion.updated_at,
        comments,
        reactions: reaction_service::tally(discussion_reactions, viewer_id),
        debate_stats,
    })
}

/// Comments of a discussion grouped into reply threads, all collapsed.
pub async fn get_comment_threads(
    store: &dyn DiscussionStore,
    discussion_id: Uuid,
) -> Result<Vec<CommentThread>> {
    get_discussion(store, discussion_id).await?;
    let comments = store.list_comments_by_discussion(discussion_id).await?;

    Ok(comment_tree::project(&comments))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DiscussionType, NewComment, ReactionKey, ReactionTarget, Stance};
    use crate::store::InMemoryStore;

    async fn add_comment(
        store: &InMemoryStore,
        discussion_id: Uuid,
        stance: Option<Stance>,
        parent_id: Option<Uuid>,
    ) -> Uuid {
        store
            .create_comment(NewComment {
                discussion_id,
                user_id: Uuid::new_v4(),
                content: "comment".to_string(),
                stance,
                parent_id,
            })
            .await
            .unwrap()
            .id
    }

    async fn react(
        store: &InMemoryStore,
        discussion_id: Uuid,
        user_id: Uuid,
        comment_id: Option<Uuid>,
        emoji: &str,
    ) {
        store
            .create_reaction(&ReactionKey {
                discussion_id,
                user_id,
                target: ReactionTarget::from(comment_id),
                emoji: emoji.to_string(),
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_missing_discussion_is_not_found() {
        let store = InMemoryStore::new();
        let result =
            get_discussion_aggregate(&store, Uuid::new_v4(), None, StancePolicy::default()).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_aggregate_annotates_comments() {
        let store = InMemoryStore::new();
        let discussion = store
            .insert_discussion("Tabs or spaces?", "Settle it", DiscussionType::Free)
            .await;
        let viewer = Uuid::new_v4();

        let top = add_comment(&store, discussion.id, None, None).await;
        let reply = add_comment(&store, discussion.id, None, Some(top)).await;
        add_comment(&store, discussion.id, None, Some(top)).await;

        react(&store, discussion.id, viewer, None, "👍").await;
        react(&store, discussion.id, Uuid::new_v4(), None, "👍").await;
        react(&store, discussion.id, viewer, Some(top), "🔥").await;

        let aggregate =
            get_discussion_aggregate(&store, discussion.id, Some(viewer), StancePolicy::default())
                .await
                .unwrap();

        assert_eq!(aggregate.id, discussion.id);
        assert_eq!(aggregate.comments.len(), 3);
        assert!(aggregate.debate_stats.is_none());

        let top_view = aggregate.comments.iter().find(|c| c.comment.id == top).unwrap();
        assert_eq!(top_view.reply_count, 2);
        assert_eq!(top_view.reactions.count("🔥"), 1);
        assert!(top_view.reactions.viewer_has_reacted("🔥"));

        let reply_view = aggregate.comments.iter().find(|c| c.comment.id == reply).unwrap();
        assert_eq!(reply_view.reply_count, 0);
        assert!(reply_view.reactions.is_empty());

        assert_eq!(aggregate.reactions.count("👍"), 2);
        assert!(aggregate.reactions.viewer_has_reacted("👍"));
    }

    #[tokio::test]
    async fn test_debate_aggregate_carries_stats() {
        let store = InMemoryStore::new();
        let discussion = store
            .insert_discussion("Rust vs Go", "", DiscussionType::Debate)
            .await;

        let first = add_comment(&store, discussion.id, Some(Stance::For), None).await;
        add_comment(&store, discussion.id, Some(Stance::For), None).await;
        add_comment(&store, discussion.id, Some(Stance::For), None).await;
        add_comment(&store, discussion.id, Some(Stance::Against), None).await;
        add_comment(&store, discussion.id, Some(Stance::Neutral), None).await;
        add_comment(&store, discussion.id, None, Some(first)).await;

        let aggregate =
            get_discussion_aggregate(&store, discussion.id, None, StancePolicy::ExcludeNeutral)
                .await
                .unwrap();

        let stats = aggregate.debate_stats.unwrap();
        assert_eq!(stats.for_count, 3);
        assert_eq!(stats.against_count, 1);
        assert_eq!(stats.neutral_count, 1);
        assert_eq!(stats.total_count, 5);
        assert_eq!(stats.for_percentage, "75.0");
        assert_eq!(stats.against_percentage, "25.0");
    }

    #[tokio::test]
    async fn test_comment_threads() {
        let store = InMemoryStore::new();
        let discussion = store.insert_discussion("t", "", DiscussionType::Free).await;
        let top = add_comment(&store, discussion.id, None, None).await;
        add_comment(&store, discussion.id, None, Some(top)).await;
        add_comment(&store, discussion.id, None, None).await;

        let threads = get_comment_threads(&store, discussion.id).await.unwrap();
        assert_eq!(threads.len(), 2);
        assert_eq!(threads[0].comment.id, top);
        assert_eq!(threads[0].reply_count(), 1);
        assert!(threads.iter().all(|t| !t.replies_visible));
    }

    #[tokio::test]
    async fn test_list_clamps_limit() {
        let store = InMemoryStore::new();
        for i in 0..3 {
            store
                .insert_discussion(&format!("d{i}"), "", DiscussionType::Free)
                .await;
        }

        assert_eq!(list_discussions(&store, Some(0), None).await.unwrap().len(), 1);
        assert_eq!(list_discussions(&store, None, None).await.unwrap().len(), 3);
        assert_eq!(list_discussions(&store, Some(500), Some(2)).await.unwrap().len(), 1);
    }
}
