// src/services/llm.rs
//
// Thin chat-completions client for the pipeline's two interpretation
// stages. The model is an untrusted suggester: callers schema-validate
// whatever comes back and fall through to baked-in defaults on anything
// malformed, so nothing here retries or raises past the pipeline.

use log::info;
use regex::Regex;
use reqwest::Client;
use serde_json::{json, Value};
use std::env;
use std::time::Duration;

use crate::BoxError;

pub const LLM_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";

pub struct LlmClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl LlmClient {
    /// Reads LLM_API_KEY (required), LLM_BASE_URL and LLM_MODEL (optional).
    pub fn from_env() -> Result<Self, BoxError> {
        let api_key = env::var("LLM_API_KEY").map_err(|_| "LLM_API_KEY not set")?;
        Ok(LlmClient {
            client: Client::builder().timeout(LLM_TIMEOUT).build()?,
            base_url: env::var("LLM_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            api_key,
            model: env::var("LLM_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
        })
    }

    /// One deterministic completion: temperature 0, single user turn.
    pub async fn complete(&self, system: &str, user: &str) -> Result<String, BoxError> {
        let url = format!("{}/chat/completions", self.base_url);
        info!("LLM completion via {} ({})", url, self.model);

        let body = json!({
            "model": self.model,
            "temperature": 0,
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": user},
            ],
        });

        let response: Value = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        response
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .map(String::from)
            .ok_or_else(|| "no content in LLM response".into())
    }
}

/// Pull the first JSON object out of a model reply. Models wrap JSON in
/// prose and code fences often enough that a bare parse is not reliable.
pub fn extract_json(reply: &str) -> Result<Value, BoxError> {
    if let Ok(v) = serde_json::from_str::<Value>(reply.trim()) {
        if v.is_object() {
            return Ok(v);
        }
    }
    let re = Regex::new(r"\{[^{}]*\}")?;
    let m = re.find(reply).ok_or("no JSON object in LLM reply")?;
    Ok(serde_json::from_str(m.as_str())?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_json_handles_bare_object() {
        let v = extract_json(r#"{"five_year_variable": 5.9}"#).unwrap();
        assert_eq!(v["five_year_variable"].as_f64(), Some(5.9));
    }

    #[test]
    fn extract_json_handles_fenced_reply() {
        let reply = "Here you go:\n```json\n{\"five_year_variable\": 6.1}\n```\nLet me know!";
        let v = extract_json(reply).unwrap();
        assert_eq!(v["five_year_variable"].as_f64(), Some(6.1));
    }

    #[test]
    fn extract_json_rejects_prose() {
        assert!(extract_json("the variable rate is around six percent").is_err());
    }
}
