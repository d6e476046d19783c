//! Projection of a flat comment list into one-level reply threads.
//!
//! Threads are rebuilt from scratch on every fetch. Replies always hang
//! directly under their top-level ancestor; there is no deeper nesting.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    models::{Comment, CreateCommentRequest, DiscussionType, Stance, ValidatedComment},
};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentThread {
    pub comment: Comment,
    pub replies: Vec<Comment>,
    pub replies_visible: bool,
}

impl CommentThread {
    fn new(comment: Comment) -> Self {
        Self {
            comment,
            replies: Vec::new(),
            replies_visible: false,
        }
    }

    pub fn reply_count(&self) -> usize {
        self.replies.len()
    }

    /// Threads without replies offer no expand/collapse toggle.
    pub fn can_toggle_replies(&self) -> bool {
        !self.replies.is_empty()
    }

    /// Flips reply visibility and returns the new state.
    pub fn toggle_replies(&mut self) -> bool {
        if self.can_toggle_replies() {
            self.replies_visible = !self.replies_visible;
        }
        self.replies_visible
    }
}

/// Groups `comments` into threads, preserving input order.
///
/// A comment whose parent is missing from the list is promoted to a top-level
/// thread. Every member of a parent loop becomes its own thread, and comments
/// hanging off a loop reply to the loop member they first reach. Each comment
/// appears exactly once.
pub fn project(comments: &[Comment]) -> Vec<CommentThread> {
    let by_id: HashMap<Uuid, &Comment> = comments.iter().map(|c| (c.id, c)).collect();

    let mut threads: Vec<CommentThread> = Vec::new();
    let mut thread_index: HashMap<Uuid, usize> = HashMap::new();
    let mut roots: Vec<Uuid> = Vec::with_capacity(comments.len());

    for comment in comments {
        let root = thread_root(comment, &by_id);
        roots.push(root);

        if root == comment.id && !thread_index.contains_key(&comment.id) {
            thread_index.insert(comment.id, threads.len());
            threads.push(CommentThread::new(comment.clone()));
        }
    }

    for (comment, root) in comments.iter().zip(roots) {
        if root == comment.id {
            continue;
        }
        if let Some(&index) = thread_index.get(&root) {
            threads[index].replies.push(comment.clone());
        }
    }

    threads
}

fn thread_root(comment: &Comment, by_id: &HashMap<Uuid, &Comment>) -> Uuid {
    let mut current = comment;
    let mut seen = HashSet::new();

    while let Some(parent_id) = current.parent_id {
        if !seen.insert(current.id) {
            // Entered a loop; its members each head their own thread.
            return current.id;
        }
        match by_id.get(&parent_id) {
            Some(parent) => current = parent,
            None => break,
        }
    }

    current.id
}

/// Checks a submission against the rules of its discussion.
///
/// Content is trimmed. Top-level comments in a debate must declare a stance;
/// replies and comments in free discussions never carry one.
pub fn validate_submission(
    discussion_type: DiscussionType,
    request: &CreateCommentRequest,
    max_length: usize,
) -> Result<ValidatedComment> {
    let content = request.content.trim();
    if content.is_empty() {
        return Err(AppError::validation("empty content"));
    }
    if content.chars().count() > max_length {
        return Err(AppError::validation(format!(
            "content exceeds {max_length} characters"
        )));
    }

    let stance = match (request.parent_id, discussion_type) {
        (Some(_), _) | (None, DiscussionType::Free) => None,
        (None, DiscussionType::Debate) => Some(
            request
                .stance
                .as_deref()
                .and_then(Stance::parse)
                .ok_or_else(|| AppError::validation("stance required"))?,
        ),
    };

    Ok(ValidatedComment {
        content: content.to_string(),
        stance,
        parent_id: request.parent_id,
    })
}

/// Client-side view of one discussion's comments: the flat list, its threads,
/// and which threads have their replies expanded.
#[derive(Debug, Clone)]
pub struct CommentBoard {
    discussion_type: DiscussionType,
    max_length: usize,
    comments: Vec<Comment>,
    threads: Vec<CommentThread>,
}

impl CommentBoard {
    pub fn new(discussion_type: DiscussionType, comments: Vec<Comment>, max_length: usize) -> Self {
        let threads = project(&comments);
        Self {
            discussion_type,
            max_length,
            comments,
            threads,
        }
    }

    pub fn threads(&self) -> &[CommentThread] {
        &self.threads
    }

    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    /// Toggles reply visibility of a top-level comment. `None` when the id is
    /// not a thread.
    pub fn toggle_replies(&mut self, comment_id: Uuid) -> Option<bool> {
        self.threads
            .iter_mut()
            .find(|t| t.comment.id == comment_id)
            .map(CommentThread::toggle_replies)
    }

    pub fn validate(&self, request: &CreateCommentRequest) -> Result<ValidatedComment> {
        validate_submission(self.discussion_type, request, self.max_length)
    }

    /// Appends a freshly created comment and re-projects. Expanded threads stay
    /// expanded; a new reply never opens its parent.
    pub fn push(&mut self, comment: Comment) {
        let expanded: HashSet<Uuid> = self
            .threads
            .iter()
            .filter(|t| t.replies_visible)
            .map(|t| t.comment.id)
            .collect();

        self.comments.push(comment);
        self.threads = project(&self.comments);

        for thread in &mut self.threads {
            thread.replies_visible = expanded.contains(&thread.comment.id);
        }
    }
}
