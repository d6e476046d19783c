use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use uuid::Uuid;

use crate::{
    AppState,
    auth::AuthUser,
    error::Result,
    models::{Comment, CreateCommentRequest},
    services::comment_service,
};

use super::enforce_rate_limit;

pub async fn create_comment(
    State(state): State<AppState>,
    Path(discussion_id): Path<Uuid>,
    auth_user: AuthUser,
    Json(payload): Json<CreateCommentRequest>,
) -> Result<(StatusCode, Json<Comment>)> {
    let rate_limit_key = format!("comment_create:user:{}", auth_user.user_id);
    enforce_rate_limit(&state, &rate_limit_key, state.config.comment_rate_limit).await?;

    let comment = comment_service::submit_comment(
        state.store.as_ref(),
        discussion_id,
        auth_user.user_id,
        &payload,
        state.config.max_comment_length,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(comment)))
}
