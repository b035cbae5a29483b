use axum::{extract::State, Json};
use uspshare_common::db::PlatformStats;

use crate::{ApiResult, AppState};

/// GET /api/stats
pub async fn get_stats(State(state): State<AppState>) -> ApiResult<Json<PlatformStats>> {
    Ok(Json(state.store.platform_stats().await?))
}
