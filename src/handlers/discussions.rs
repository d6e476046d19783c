use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::{
    AppState,
    auth::OptionalAuthUser,
    error::Result,
    models::DiscussionAggregate,
    services::discussion_service,
};

#[derive(Debug, Deserialize)]
pub struct ListDiscussionsQuery {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

pub async fn list_discussions(
    State(state): State<AppState>,
    Query(params): Query<ListDiscussionsQuery>,
) -> Result<Json<Value>> {
    let discussions =
        discussion_service::list_discussions(state.store.as_ref(), params.limit, params.offset)
            .await?;

    Ok(Json(json!({
        "discussions": discussions
    })))
}

pub async fn get_discussion(
    State(state): State<AppState>,
    Path(discussion_id): Path<Uuid>,
    auth_user: OptionalAuthUser,
) -> Result<Json<DiscussionAggregate>> {
    let aggregate = discussion_service::get_discussion_aggregate(
        state.store.as_ref(),
        discussion_id,
        auth_user.user_id(),
        state.config.stance_policy,
    )
    .await?;

    Ok(Json(aggregate))
}

pub async fn get_comment_threads(
    State(state): State<AppState>,
    Path(discussion_id): Path<Uuid>,
) -> Result<Json<Value>> {
    let threads =
        discussion_service::get_comment_threads(state.store.as_ref(), discussion_id).await?;

    Ok(Json(json!({
        "discussionId": discussion_id,
        "threads": threads
    })))
}
