//! Settings API endpoints - JSON API

use crate::AppState;
use axum::extract::State;
use axum::Json;
use carledger_config::Config;

/// GET /api/settings - the running configuration
pub async fn api_settings(State(state): State<AppState>) -> Json<Config> {
    Json(state.config.clone())
}
