// src/services/vault.rs
//
// Client for the external per-user persistence collaborator. One JSON
// `data` column per user id; the workbench never sees credentials or other
// users' rows. Configured by VAULT_URL and VAULT_KEY; without them the
// client is inert and every call reports a persistence failure the caller
// treats as non-fatal.

use log::{info, warn};
use reqwest::Client;
use serde_json::Value;
use std::env;
use std::time::Duration;

use crate::BoxError;

const VAULT_TIMEOUT: Duration = Duration::from_secs(10);

pub struct VaultClient {
    client: Client,
    base_url: Option<String>,
    key: String,
}

impl VaultClient {
    pub fn from_env() -> Self {
        let base_url = env::var("VAULT_URL").ok();
        if base_url.is_none() {
            warn!("VAULT_URL not set; scenario edits will not persist");
        }
        VaultClient {
            client: Client::builder()
                .timeout(VAULT_TIMEOUT)
                .build()
                .expect("reqwest client"),
            base_url,
            key: env::var("VAULT_KEY").unwrap_or_default(),
        }
    }

    #[cfg(test)]
    pub fn disabled() -> Self {
        VaultClient {
            client: Client::new(),
            base_url: None,
            key: String::new(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.base_url.is_some()
    }

    fn record_url(&self, id: &str) -> Result<String, BoxError> {
        let base = self.base_url.as_deref().ok_or("vault not configured")?;
        Ok(format!("{}/records/{}", base.trim_end_matches('/'), id))
    }

    /// Fetch the stored blob for a user; Ok(None) when no row exists.
    pub async fn select(&self, id: &str) -> Result<Option<Value>, BoxError> {
        let url = self.record_url(id)?;
        let response = self.client.get(&url).bearer_auth(&self.key).send().await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let body: Value = response.error_for_status()?.json().await?;
        Ok(body.get("data").cloned().or(Some(body)))
    }

    /// Insert-or-replace the blob for a user.
    pub async fn upsert(&self, id: &str, data: &Value) -> Result<(), BoxError> {
        let url = self.record_url(id)?;
        self.client
            .put(&url)
            .bearer_auth(&self.key)
            .json(&serde_json::json!({ "id": id, "data": data }))
            .send()
            .await?
            .error_for_status()?;
        info!("Vault upsert for {} ok", id);
        Ok(())
    }

    /// Update an existing row; identical wire shape to upsert on this
    /// collaborator, kept separate to mirror its API surface.
    pub async fn update(&self, id: &str, data: &Value) -> Result<(), BoxError> {
        let url = self.record_url(id)?;
        self.client
            .patch(&url)
            .bearer_auth(&self.key)
            .json(&serde_json::json!({ "data": data }))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unconfigured_vault_fails_softly() {
        let vault = VaultClient::disabled();
        assert!(!vault.is_configured());
        assert!(vault.select("alice").await.is_err());
        assert!(vault.upsert("alice", &serde_json::json!({})).await.is_err());
    }
}
