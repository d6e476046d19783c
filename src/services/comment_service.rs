use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    models::{Comment, CreateCommentRequest, NewComment},
    services::{comment_tree, discussion_service},
    store::DiscussionStore,
};

/// Validates and stores a new comment.
///
/// Replies to a reply are re-parented onto the top-level comment of that
/// thread before they are written.
#[instrument(skip(store, request))]
pub async fn submit_comment(
    store: &dyn DiscussionStore,
    discussion_id: Uuid,
    author_id: Uuid,
    request: &CreateCommentRequest,
    max_length: usize,
) -> Result<Comment> {
    let discussion = discussion_service::get_discussion(store, discussion_id).await?;
    let validated =
        comment_tree::validate_submission(discussion.discussion_type, request, max_length)?;

    let parent_id = match validated.parent_id {
        Some(parent_id) => Some(resolve_thread_parent(store, discussion_id, parent_id).await?),
        None => None,
    };

    let comment = store
        .create_comment(NewComment {
            discussion_id,
            user_id: author_id,
            content: validated.content,
            stance: validated.stance,
            parent_id,
        })
        .await?;

    info!(
        discussion_id = %discussion_id,
        comment_id = %comment.id,
        user_id = %author_id,
        parent_id = ?comment.parent_id,
        "Comment created"
    );

    Ok(comment)
}

// Replies only ever nest one level deep.
async fn resolve_thread_parent(
    store: &dyn DiscussionStore,
    discussion_id: Uuid,
    parent_id: Uuid,
) -> Result<Uuid> {
    let parent = store
        .get_comment_by_id(parent_id)
        .await?
        .filter(|c| c.discussion_id == discussion_id)
        .ok_or_else(|| AppError::not_found("Parent comment not found"))?;

    Ok(parent.parent_id.unwrap_or(parent.id))
}
