// src/services/net_worth.rs

use serde::Serialize;

use crate::models::Scenario;

#[derive(Debug, Clone, Serialize)]
pub struct NetWorthBucket {
    pub label: String,
    pub amount: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct NetWorthResult {
    pub assets: Vec<NetWorthBucket>,
    pub liabilities: Vec<NetWorthBucket>,
    pub total_assets: f64,
    pub total_liabilities: f64,
    pub net_worth: f64,
}

/// Assets minus liabilities straight off the profile and net_worth
/// sections; the home only counts when the household owns it.
pub fn analyze(scenario: &Scenario) -> NetWorthResult {
    let mut assets = Vec::new();
    if scenario.text("profile", "housing_status", "Renting") == "Owning" {
        assets.push(NetWorthBucket {
            label: "Home".to_string(),
            amount: scenario.num("net_worth", "home_value", 0.0),
        });
    }
    for (label, key) in [
        ("TFSA", "tfsa"),
        ("RRSP", "rrsp"),
        ("Non-registered", "non_registered"),
        ("Cash", "cash"),
        ("Rental properties", "rental_value"),
    ] {
        assets.push(NetWorthBucket {
            label: label.to_string(),
            amount: scenario.num("net_worth", key, 0.0),
        });
    }

    let liabilities = vec![
        NetWorthBucket {
            label: "Mortgage".to_string(),
            amount: scenario.num("profile", "m_bal", 0.0),
        },
        NetWorthBucket {
            label: "Line of credit".to_string(),
            amount: scenario.num("profile", "loc_balance", 0.0),
        },
        NetWorthBucket {
            label: "Other debt".to_string(),
            amount: scenario.num("net_worth", "other_debt", 0.0),
        },
    ];

    let total_assets: f64 = assets.iter().map(|b| b.amount).sum();
    let total_liabilities: f64 = liabilities.iter().map(|b| b.amount).sum();

    NetWorthResult {
        assets,
        liabilities,
        total_assets,
        total_liabilities,
        net_worth: total_assets - total_liabilities,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn renters_home_is_not_an_asset() {
        let mut s = Scenario::new();
        s.set("net_worth", "home_value", json!(800_000.0));
        s.set("net_worth", "tfsa", json!(50_000.0));
        let result = analyze(&s);
        assert_eq!(result.total_assets, 50_000.0);
    }

    #[test]
    fn owner_nets_home_against_mortgage() {
        let mut s = Scenario::new();
        s.set("profile", "housing_status", json!("Owning"));
        s.set("profile", "m_bal", json!(450_000.0));
        s.set("net_worth", "home_value", json!(800_000.0));
        s.set("net_worth", "rrsp", json!(120_000.0));
        let result = analyze(&s);
        assert_eq!(result.net_worth, 470_000.0);
    }
}
