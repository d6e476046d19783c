pub mod comments;
pub mod discussions;
pub mod health;
pub mod reactions;

use crate::{
    AppState,
    error::{AppError, Result},
};

// Per-user throttle; a no-op when redis is not configured.
async fn enforce_rate_limit(state: &AppState, key: &str, limit: u32) -> Result<()> {
    let Some(redis) = &state.redis else {
        return Ok(());
    };

    if !redis
        .check_rate_limit(key, limit, state.config.rate_limit_window_seconds)
        .await?
    {
        return Err(AppError::RateLimit);
    }

    Ok(())
}
