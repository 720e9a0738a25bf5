// src/services/banklink.rs
//
// Bank-linking collaborator. The exchange itself lives with the provider;
// the workbench only starts a link session and, once finalized, folds the
// returned liabilities into the two profile fields it cares about.

use log::info;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::env;
use std::time::Duration;

use crate::BoxError;

const BANKLINK_TIMEOUT: Duration = Duration::from_secs(10);

/// Minimum-payment proxy applied to aggregate revolving balances.
pub const CC_MIN_PAYMENT_FACTOR: f64 = 0.03;

#[derive(Debug, Clone, Serialize)]
pub struct LinkSession {
    pub link_token: String,
    pub hosted_link_url: String,
}

/// The two numbers the profile actually consumes.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct LiabilitySummary {
    pub cc_pmt: f64,
    pub student_loan: f64,
}

pub struct BankLinkClient {
    client: Client,
    base_url: Option<String>,
    client_id: String,
    secret: String,
}

impl BankLinkClient {
    pub fn from_env() -> Self {
        BankLinkClient {
            client: Client::builder()
                .timeout(BANKLINK_TIMEOUT)
                .build()
                .expect("reqwest client"),
            base_url: env::var("BANKLINK_URL").ok(),
            client_id: env::var("BANKLINK_CLIENT_ID").unwrap_or_default(),
            secret: env::var("BANKLINK_SECRET").unwrap_or_default(),
        }
    }

    fn base(&self) -> Result<&str, BoxError> {
        self.base_url.as_deref().ok_or_else(|| "BANKLINK_URL not configured".into())
    }

    pub async fn create_link(&self, user_id: &str) -> Result<LinkSession, BoxError> {
        let url = format!("{}/link/create", self.base()?.trim_end_matches('/'));
        let body: Value = self
            .client
            .post(&url)
            .json(&serde_json::json!({
                "client_id": self.client_id,
                "secret": self.secret,
                "user_id": user_id,
            }))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let field = |name: &str| -> Result<String, BoxError> {
            body.get(name)
                .and_then(|v| v.as_str())
                .map(String::from)
                .ok_or_else(|| format!("missing {} in link response", name).into())
        };

        Ok(LinkSession {
            link_token: field("link_token")?,
            hosted_link_url: field("hosted_link_url")?,
        })
    }

    pub async fn finalize(&self, link_token: &str) -> Result<LiabilitySummary, BoxError> {
        let url = format!("{}/link/finalize", self.base()?.trim_end_matches('/'));
        let body: Value = self
            .client
            .post(&url)
            .json(&serde_json::json!({
                "client_id": self.client_id,
                "secret": self.secret,
                "link_token": link_token,
            }))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let summary = summarize_liabilities(&body);
        info!(
            "BankLink finalize: cc_pmt {:.2}, student_loan {:.2}",
            summary.cc_pmt, summary.student_loan
        );
        Ok(summary)
    }
}

/// Credit-card balances become an estimated minimum payment; the student
/// loan contributes its last actual payment. Everything else the provider
/// returns is ignored.
pub fn summarize_liabilities(liabilities: &Value) -> LiabilitySummary {
    let credit_total: f64 = liabilities
        .get("credit")
        .and_then(|c| c.as_array())
        .map(|cards| {
            cards
                .iter()
                .filter_map(|c| c.get("balance").and_then(|b| b.as_f64()))
                .sum()
        })
        .unwrap_or(0.0);

    let student_loan = liabilities
        .get("student")
        .and_then(|s| s.as_array())
        .and_then(|loans| loans.first())
        .and_then(|l| l.get("last_payment_amount").and_then(|p| p.as_f64()))
        .unwrap_or(0.0);

    LiabilitySummary {
        cc_pmt: credit_total * CC_MIN_PAYMENT_FACTOR,
        student_loan,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn credit_balances_become_minimum_payments() {
        let payload = json!({
            "credit": [{"balance": 4_000.0}, {"balance": 6_000.0}],
            "student": [{"last_payment_amount": 280.0}],
        });
        let summary = summarize_liabilities(&payload);
        assert!((summary.cc_pmt - 300.0).abs() < 1e-9);
        assert_eq!(summary.student_loan, 280.0);
    }

    #[test]
    fn missing_sections_read_as_zero() {
        let summary = summarize_liabilities(&json!({}));
        assert_eq!(summary.cc_pmt, 0.0);
        assert_eq!(summary.student_loan, 0.0);
    }
}
