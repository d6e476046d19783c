use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::{
    AppState,
    auth::{AuthUser, OptionalAuthUser},
    error::Result,
    models::{ReactionTarget, ReactionToggle, ToggleReactionRequest},
    services::reaction_service,
};

use super::enforce_rate_limit;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactionQuery {
    pub comment_id: Option<Uuid>,
}

pub async fn toggle_reaction(
    State(state): State<AppState>,
    Path(discussion_id): Path<Uuid>,
    auth_user: AuthUser,
    Json(payload): Json<ToggleReactionRequest>,
) -> Result<Json<Value>> {
    let rate_limit_key = format!("reaction_toggle:user:{}", auth_user.user_id);
    enforce_rate_limit(&state, &rate_limit_key, state.config.reaction_rate_limit).await?;

    let outcome = reaction_service::toggle_reaction(
        state.store.as_ref(),
        discussion_id,
        auth_user.user_id,
        &payload,
    )
    .await?;

    let body = match outcome {
        ReactionToggle::Added(reaction) => json!({
            "action": "added",
            "reaction": reaction
        }),
        ReactionToggle::Removed => json!({
            "action": "removed"
        }),
    };

    Ok(Json(body))
}

pub async fn get_reactions(
    State(state): State<AppState>,
    Path(discussion_id): Path<Uuid>,
    Query(params): Query<ReactionQuery>,
    auth_user: OptionalAuthUser,
) -> Result<Json<Value>> {
    let tally = reaction_service::get_reaction_tally(
        state.store.as_ref(),
        discussion_id,
        ReactionTarget::from(params.comment_id),
        auth_user.user_id(),
    )
    .await?;

    Ok(Json(json!({
        "discussionId": discussion_id,
        "commentId": params.comment_id,
        "reactions": tally
    })))
}
