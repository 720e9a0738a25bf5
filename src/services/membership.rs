// src/services/membership.rs
//
// Entitlement collaborator. The engine itself never checks tiers; the
// handlers consult this adapter before invoking a pro-gated analysis.
// Without MEMBERSHIP_URL the deployment is single-tenant and everything
// is unlocked; with it configured, a failed call fails closed.

use chrono::{DateTime, Utc};
use log::warn;
use reqwest::Client;
use serde::Serialize;
use std::env;
use std::time::Duration;

const MEMBERSHIP_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Tier {
    Public,
    #[serde(rename = "48h")]
    FortyEightHour,
    Monthly,
    Life,
    Expired,
    Error,
}

impl Tier {
    fn parse(s: &str) -> Tier {
        match s {
            "48h" => Tier::FortyEightHour,
            "Monthly" => Tier::Monthly,
            "Life" => Tier::Life,
            "Expired" => Tier::Expired,
            "Public" => Tier::Public,
            _ => Tier::Error,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MembershipStatus {
    pub is_pro: bool,
    pub tier: Tier,
    pub pro_until: Option<DateTime<Utc>>,
}

impl MembershipStatus {
    fn from_tier(tier: Tier, pro_until: Option<DateTime<Utc>>) -> Self {
        let is_pro = match tier {
            Tier::Life => true,
            Tier::FortyEightHour | Tier::Monthly => {
                pro_until.map(|t| t > Utc::now()).unwrap_or(false)
            }
            Tier::Public | Tier::Expired | Tier::Error => false,
        };
        MembershipStatus { is_pro, tier, pro_until }
    }
}

pub struct MembershipClient {
    client: Client,
    base_url: Option<String>,
}

impl MembershipClient {
    pub fn from_env() -> Self {
        MembershipClient {
            client: Client::builder()
                .timeout(MEMBERSHIP_TIMEOUT)
                .build()
                .expect("reqwest client"),
            base_url: env::var("MEMBERSHIP_URL").ok(),
        }
    }

    #[cfg(test)]
    pub fn disabled() -> Self {
        MembershipClient { client: Client::new(), base_url: None }
    }

    pub async fn status(&self, user: &str) -> MembershipStatus {
        let Some(base) = self.base_url.as_deref() else {
            // Single-tenant deployment: no gate to consult.
            return MembershipStatus::from_tier(Tier::Life, None);
        };

        let url = format!("{}/status?user={}", base.trim_end_matches('/'), user);
        let fetched: Result<serde_json::Value, _> = async {
            self.client
                .get(&url)
                .send()
                .await?
                .error_for_status()?
                .json()
                .await
        }
        .await;

        match fetched {
            Ok(body) => {
                let tier = body
                    .get("tier")
                    .and_then(|t| t.as_str())
                    .map(Tier::parse)
                    .unwrap_or(Tier::Error);
                let pro_until = body
                    .get("pro_until")
                    .and_then(|t| t.as_str())
                    .and_then(|t| t.parse::<DateTime<Utc>>().ok());
                MembershipStatus::from_tier(tier, pro_until)
            }
            Err(e) => {
                warn!("membership lookup for {} failed: {}", user, e);
                MembershipStatus::from_tier(Tier::Error, None)
            }
        }
    }
}
