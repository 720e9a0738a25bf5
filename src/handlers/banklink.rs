// src/handlers/banklink.rs
use log::{error, info};
use serde::Deserialize;
use std::sync::Arc;
use warp::reply::Json;
use warp::Rejection;

use super::error::ApiError;
use super::scenario::SessionQuery;
use super::AppState;

#[derive(Debug, Deserialize)]
pub struct FinalizeBody {
    pub link_token: String,
}

pub async fn create_link(query: SessionQuery, state: Arc<AppState>) -> Result<Json, Rejection> {
    let user = query.user.unwrap_or_else(|| "anonymous".to_string());
    let session = state.banklink.create_link(&user).await.map_err(|e| {
        error!("BankLink create failed for {}: {}", user, e);
        warp::reject::custom(ApiError::integration_error(e.to_string()))
    })?;
    Ok(warp::reply::json(&session))
}

/// Finalize the link and fold the liabilities straight into the profile:
/// estimated credit-card minimums and the student loan's last payment.
pub async fn finalize_link(
    query: SessionQuery,
    body: FinalizeBody,
    state: Arc<AppState>,
) -> Result<Json, Rejection> {
    let summary = state.banklink.finalize(&body.link_token).await.map_err(|e| {
        error!("BankLink finalize failed: {}", e);
        warp::reject::custom(ApiError::integration_error(e.to_string()))
    })?;

    info!("Applying linked liabilities to profile");
    state.scenario.write(
        "profile",
        "cc_pmt",
        serde_json::json!(summary.cc_pmt),
        query.user.as_deref(),
    );
    state.scenario.write(
        "profile",
        "student_loan",
        serde_json::json!(summary.student_loan),
        query.user.as_deref(),
    );

    Ok(warp::reply::json(&summary))
}
