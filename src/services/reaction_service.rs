use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::{AppError, Result},
    models::{
        Reaction, ReactionCount, ReactionKey, ReactionTally, ReactionTarget, ReactionToggle,
        ToggleReactionRequest,
    },
    store::DiscussionStore,
};

/// Tallies reactions per emoji and marks the ones left by `viewer_id`.
///
/// Emojis keep the order in which they first appear in `reactions`.
pub fn tally<'a>(
    reactions: impl IntoIterator<Item = &'a Reaction>,
    viewer_id: Option<Uuid>,
) -> ReactionTally {
    let mut counts: Vec<ReactionCount> = Vec::new();

    for reaction in reactions {
        let mine = viewer_id.is_some_and(|viewer| reaction.user_id == viewer);

        match counts.iter_mut().find(|entry| entry.emoji == reaction.emoji) {
            Some(entry) => {
                entry.count += 1;
                entry.me |= mine;
            }
            None => counts.push(ReactionCount {
                emoji: reaction.emoji.clone(),
                count: 1,
                me: mine,
            }),
        }
    }

    ReactionTally { counts }
}

pub async fn get_reaction_tally(
    store: &dyn DiscussionStore,
    discussion_id: Uuid,
    target: ReactionTarget,
    viewer_id: Option<Uuid>,
) -> Result<ReactionTally> {
    store
        .get_discussion_by_id(discussion_id)
        .await?
        .ok_or_else(|| AppError::not_found("Discussion not found"))?;

    let reactions = store.list_reactions(discussion_id, Some(target)).await?;
    Ok(tally(&reactions, viewer_id))
}

#[instrument(skip(store, request), fields(emoji = %request.emoji))]
pub async fn toggle_reaction(
    store: &dyn DiscussionStore,
    discussion_id: Uuid,
    viewer_id: Uuid,
    request: &ToggleReactionRequest,
) -> Result<ReactionToggle> {
    request.validate()?;

    let emoji = request.emoji.trim();
    if emoji.is_empty() {
        return Err(AppError::validation("emoji: must not be blank"));
    }

    store
        .get_discussion_by_id(discussion_id)
        .await?
        .ok_or_else(|| AppError::not_found("Discussion not found"))?;

    if let Some(comment_id) = request.comment_id {
        store
            .get_comment_by_id(comment_id)
            .await?
            .filter(|c| c.discussion_id == discussion_id)
            .ok_or_else(|| AppError::not_found("Comment not found"))?;
    }

    let key = ReactionKey {
        discussion_id,
        user_id: viewer_id,
        target: ReactionTarget::from(request.comment_id),
        emoji: emoji.to_string(),
    };

    let outcome = store.toggle_reaction(&key).await?;

    info!(
        discussion_id = %discussion_id,
        comment_id = ?request.comment_id,
        user_id = %viewer_id,
        emoji = %key.emoji,
        added = matches!(outcome, ReactionToggle::Added(_)),
        "Reaction toggled"
    );

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DiscussionType, NewComment};
    use crate::store::InMemoryStore;
    use chrono::Utc;

    fn reaction(user_id: Uuid, emoji: &str) -> Reaction {
        Reaction {
            id: Uuid::new_v4(),
            discussion_id: Uuid::nil(),
            user_id,
            comment_id: None,
            emoji: emoji.to_string(),
            created_at: Utc::now(),
        }
    }

    fn request(emoji: &str, comment_id: Option<Uuid>) -> ToggleReactionRequest {
        ToggleReactionRequest {
            emoji: emoji.to_string(),
            comment_id,
        }
    }

    #[test]
    fn test_tally_counts_and_viewer_flags() {
        let viewer = Uuid::new_v4();
        let other = Uuid::new_v4();
        let reactions = vec![
            reaction(other, "👍"),
            reaction(viewer, "🔥"),
            reaction(viewer, "👍"),
            reaction(other, "🔥"),
            reaction(other, "🎉"),
        ];

        let tally = tally(&reactions, Some(viewer));

        assert_eq!(tally.count("👍"), 2);
        assert_eq!(tally.count("🔥"), 2);
        assert_eq!(tally.count("🎉"), 1);
        assert_eq!(tally.count("😢"), 0);
        assert!(tally.viewer_has_reacted("👍"));
        assert!(tally.viewer_has_reacted("🔥"));
        assert!(!tally.viewer_has_reacted("🎉"));

        let order: Vec<&str> = tally.counts.iter().map(|c| c.emoji.as_str()).collect();
        assert_eq!(order, vec!["👍", "🔥", "🎉"]);
        assert_eq!(tally.viewer_emojis().collect::<Vec<_>>(), vec!["👍", "🔥"]);
    }

    #[test]
    fn test_tally_without_viewer() {
        let reactions = vec![reaction(Uuid::new_v4(), "👍")];
        let tally = tally(&reactions, None);
        assert_eq!(tally.count("👍"), 1);
        assert!(!tally.viewer_has_reacted("👍"));
    }

    #[tokio::test]
    async fn test_toggle_twice_restores_state() {
        let store = InMemoryStore::new();
        let discussion = store.insert_discussion("t", "d", DiscussionType::Free).await;
        let viewer = Uuid::new_v4();

        let first = toggle_reaction(&store, discussion.id, viewer, &request("👍", None))
            .await
            .unwrap();
        assert!(matches!(first, ReactionToggle::Added(ref r) if r.emoji == "👍"));

        let after_first =
            get_reaction_tally(&store, discussion.id, ReactionTarget::Discussion, Some(viewer))
                .await
                .unwrap();
        assert!(after_first.viewer_has_reacted("👍"));

        let second = toggle_reaction(&store, discussion.id, viewer, &request("👍", None))
            .await
            .unwrap();
        assert_eq!(second, ReactionToggle::Removed);

        let after_second =
            get_reaction_tally(&store, discussion.id, ReactionTarget::Discussion, Some(viewer))
                .await
                .unwrap();
        assert!(after_second.is_empty());
    }

    #[tokio::test]
    async fn test_toggle_on_comment_is_scoped_to_comment() {
        let store = InMemoryStore::new();
        let discussion = store.insert_discussion("t", "d", DiscussionType::Free).await;
        let viewer = Uuid::new_v4();
        let comment = store
            .create_comment(NewComment {
                discussion_id: discussion.id,
                user_id: viewer,
                content: "hello".to_string(),
                stance: None,
                parent_id: None,
            })
            .await
            .unwrap();

        toggle_reaction(&store, discussion.id, viewer, &request("🔥", Some(comment.id)))
            .await
            .unwrap();

        let on_comment = get_reaction_tally(
            &store,
            discussion.id,
            ReactionTarget::Comment(comment.id),
            Some(viewer),
        )
        .await
        .unwrap();
        let on_discussion =
            get_reaction_tally(&store, discussion.id, ReactionTarget::Discussion, Some(viewer))
                .await
                .unwrap();

        assert_eq!(on_comment.count("🔥"), 1);
        assert!(on_discussion.is_empty());
    }

    #[tokio::test]
    async fn test_toggle_rejects_unknown_targets() {
        let store = InMemoryStore::new();
        let discussion = store.insert_discussion("t", "d", DiscussionType::Free).await;
        let viewer = Uuid::new_v4();

        let missing_discussion =
            toggle_reaction(&store, Uuid::new_v4(), viewer, &request("👍", None)).await;
        assert!(matches!(missing_discussion, Err(AppError::NotFound(_))));

        let missing_comment = toggle_reaction(
            &store,
            discussion.id,
            viewer,
            &request("👍", Some(Uuid::new_v4())),
        )
        .await;
        assert!(matches!(missing_comment, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_toggle_rejects_comment_from_another_discussion() {
        let store = InMemoryStore::new();
        let home = store.insert_discussion("a", "", DiscussionType::Free).await;
        let elsewhere = store.insert_discussion("b", "", DiscussionType::Free).await;
        let viewer = Uuid::new_v4();
        let comment = store
            .create_comment(NewComment {
                discussion_id: home.id,
                user_id: viewer,
                content: "hello".to_string(),
                stance: None,
                parent_id: None,
            })
            .await
            .unwrap();

        let result =
            toggle_reaction(&store, elsewhere.id, viewer, &request("👍", Some(comment.id))).await;
        assert!(matches!(result, Err(AppError::NotFound(ref m)) if m == "Comment not found"));

        let stored = store
            .list_reactions(home.id, Some(ReactionTarget::Comment(comment.id)))
            .await
            .unwrap();
        assert!(stored.is_empty());
    }

    #[tokio::test]
    async fn test_emoji_length_limit() {
        let store = InMemoryStore::new();
        let discussion = store.insert_discussion("t", "d", DiscussionType::Free).await;
        let viewer = Uuid::new_v4();

        let too_long = "x".repeat(33);
        let result = toggle_reaction(&store, discussion.id, viewer, &request(&too_long, None)).await;
        assert!(matches!(result, Err(AppError::Validation(_))));

        let longest = "🔥".repeat(32);
        let outcome = toggle_reaction(&store, discussion.id, viewer, &request(&longest, None))
            .await
            .unwrap();
        assert!(matches!(outcome, ReactionToggle::Added(ref r) if r.emoji == longest));
    }

    #[tokio::test]
    async fn test_toggle_rejects_blank_emoji() {
        let store = InMemoryStore::new();
        let discussion = store.insert_discussion("t", "d", DiscussionType::Free).await;

        let empty = toggle_reaction(&store, discussion.id, Uuid::new_v4(), &request("", None)).await;
        assert!(matches!(empty, Err(AppError::Validation(_))));

        let blank =
            toggle_reaction(&store, discussion.id, Uuid::new_v4(), &request("   ", None)).await;
        assert!(matches!(blank, Err(AppError::Validation(_))));
    }
}
