// src/handlers/scenario.rs
use log::{debug, info};
use serde::Deserialize;
use std::sync::Arc;
use warp::reply::Json;
use warp::Rejection;

use super::AppState;

#[derive(Debug, Deserialize)]
pub struct SessionQuery {
    pub user: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FieldWrite {
    pub value: serde_json::Value,
}

pub async fn get_section(
    section: String,
    state: Arc<AppState>,
) -> Result<Json, Rejection> {
    debug!("Reading scenario section {}", section);
    let body = state
        .scenario
        .section(&section)
        .unwrap_or_else(|| serde_json::json!({}));
    Ok(warp::reply::json(&body))
}

/// Field-level write-through: the in-memory set always succeeds, the Vault
/// leg is fire-and-forget, and the response carries the sticky warning
/// flag so the UI can badge unsaved edits.
pub async fn put_field(
    section: String,
    key: String,
    query: SessionQuery,
    body: FieldWrite,
    state: Arc<AppState>,
) -> Result<Json, Rejection> {
    state
        .scenario
        .write(&section, &key, body.value, query.user.as_deref());
    let persist_warning = state.scenario.take_persist_warning();
    Ok(warp::reply::json(&serde_json::json!({
        "ok": true,
        "persist_warning": persist_warning,
    })))
}

pub async fn hydrate(query: SessionQuery, state: Arc<AppState>) -> Result<Json, Rejection> {
    let user = query.user.unwrap_or_else(|| "anonymous".to_string());
    info!("Hydrating scenario for {}", user);
    state.scenario.hydrate(&user).await;
    let persist_warning = state.scenario.take_persist_warning();
    Ok(warp::reply::json(&serde_json::json!({
        "ok": true,
        "persist_warning": persist_warning,
    })))
}
