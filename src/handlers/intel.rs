// src/handlers/intel.rs
use log::{error, info};
use std::sync::Arc;
use warp::reply::Json;
use warp::Rejection;

use super::error::ApiError;
use super::AppState;
use crate::services::llm::LlmClient;
use crate::services::market_intel;

pub async fn get_intel(state: Arc<AppState>) -> Result<Json, Rejection> {
    let intel = state.intel.current();
    Ok(warp::reply::json(&*intel))
}

/// Operator path: run the full acquisition pipeline now and install the
/// snapshot. Stage failures degrade to fallbacks inside the pipeline; only
/// a store-level failure surfaces here.
pub async fn refresh_intel(state: Arc<AppState>) -> Result<Json, Rejection> {
    info!("Manual MarketIntel refresh requested");
    let llm = LlmClient::from_env().ok();
    if llm.is_none() {
        info!("LLM not configured; pipeline will use deterministic fallbacks");
    }
    let snapshot = market_intel::build_snapshot(llm.as_ref()).await;
    state.intel.replace(snapshot).map_err(|e| {
        error!("Failed to install refreshed snapshot: {}", e);
        warp::reject::custom(ApiError::config_error(e.to_string()))
    })?;
    Ok(warp::reply::json(&*state.intel.current()))
}
