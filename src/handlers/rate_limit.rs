use axum::{
    extract::State,
    response::{IntoResponse, Json, Response},
};

use crate::{errors::Result, handlers::AppState, middleware::Visitor};

/// `{remaining, resetAt}` for the calling visitor. A visitor without a cookie gets one and a
/// full quota.
pub async fn get_rate_limit(State(state): State<AppState>, visitor: Visitor) -> Result<Response> {
    let remaining = state
        .rate_limiter
        .get_remaining_generations(&visitor.id)
        .await?;
    state.metrics.record_quota_check(remaining.remaining > 0);

    Ok(visitor.attach_cookie(Json(remaining).into_response(), state.config.cookie_secure))
}
