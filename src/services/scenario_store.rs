// src/services/scenario_store.rs
//
// Session-scoped scenario tree with write-through persistence. Every field
// edit lands in memory first and is durable-on-best-effort: a Vault
// failure keeps the in-memory value, raises a sticky warning flag for the
// UI, and never blocks the edit.

use log::warn;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use crate::models::Scenario;
use crate::services::vault::VaultClient;

pub struct ScenarioStore {
    inner: RwLock<Scenario>,
    vault: Arc<VaultClient>,
    persist_warning: Arc<AtomicBool>,
}

impl ScenarioStore {
    pub fn new(vault: Arc<VaultClient>) -> Self {
        let mut scenario = Scenario::new();
        scenario.ensure_defaults(&defaults());
        ScenarioStore {
            inner: RwLock::new(scenario),
            vault,
            persist_warning: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn read(&self, section: &str, key: &str) -> Option<Value> {
        self.inner
            .read()
            .expect("scenario lock poisoned")
            .get(section, key)
            .cloned()
    }

    pub fn section(&self, section: &str) -> Option<Value> {
        self.inner
            .read()
            .expect("scenario lock poisoned")
            .sections
            .get(section)
            .map(|s| serde_json::to_value(s).unwrap_or(Value::Null))
    }

    /// A full copy for the pure analysis functions.
    pub fn snapshot(&self) -> Scenario {
        self.inner.read().expect("scenario lock poisoned").clone()
    }

    /// Idempotent in-memory set, then fire-and-forget persistence when a
    /// user is attached to the session.
    pub fn write(&self, section: &str, key: &str, value: Value, user: Option<&str>) {
        {
            let mut scenario = self.inner.write().expect("scenario lock poisoned");
            scenario.set(section, key, value);
        }
        if let Some(user) = user {
            self.persist_async(user.to_string());
        }
    }

    pub fn ensure_defaults(&self) {
        let mut scenario = self.inner.write().expect("scenario lock poisoned");
        scenario.ensure_defaults(&defaults());
    }

    /// Pull the user's blob out of the Vault. A stored blob replaces the
    /// in-memory tree (defaults merged underneath); a missing one seeds
    /// the Vault with the defaults so the next login finds a row.
    pub async fn hydrate(&self, user: &str) {
        match self.vault.select(user).await {
            Ok(Some(blob)) => match serde_json::from_value::<Scenario>(blob) {
                Ok(mut stored) => {
                    stored.ensure_defaults(&defaults());
                    *self.inner.write().expect("scenario lock poisoned") = stored;
                }
                Err(e) => {
                    warn!("stored scenario for {} unreadable ({}); keeping defaults", user, e);
                    self.persist_warning.store(true, Ordering::Relaxed);
                }
            },
            Ok(None) => {
                self.ensure_defaults();
                self.persist_async(user.to_string());
            }
            Err(e) => {
                warn!("vault hydrate for {} failed: {}", user, e);
                self.persist_warning.store(true, Ordering::Relaxed);
            }
        }
    }

    fn persist_async(&self, user: String) {
        // Serialize before spawning so the task carries exactly the state
        // the edit produced.
        let blob = match serde_json::to_value(self.snapshot()) {
            Ok(v) => v,
            Err(e) => {
                warn!("scenario serialization failed: {}", e);
                return;
            }
        };
        let vault = self.vault.clone();
        let warning = self.persist_warning.clone();
        tokio::spawn(async move {
            if let Err(e) = vault.upsert(&user, &blob).await {
                warn!("vault upsert for {} failed (edit kept in memory): {}", user, e);
                warning.store(true, Ordering::Relaxed);
            }
        });
    }

    /// Sticky persistence warning for the UI; reading clears it.
    pub fn take_persist_warning(&self) -> bool {
        self.persist_warning.swap(false, Ordering::Relaxed)
    }
}

/// The defaults tree a fresh session starts from. Only load-bearing keys
/// are listed; analyses fill the rest with their own defaults on read.
pub fn defaults() -> Scenario {
    let mut d = Scenario::new();
    let set_num = |d: &mut Scenario, section: &str, key: &str, v: f64| {
        d.set(section, key, serde_json::json!(v));
    };

    d.set("profile", "province", serde_json::json!("Ontario"));
    d.set("profile", "p1_name", serde_json::json!("Investor"));
    d.set("profile", "housing_status", serde_json::json!("Renting"));
    for key in [
        "p1_t4",
        "p1_bonus",
        "p1_commission",
        "p1_pension",
        "p2_t4",
        "p2_bonus",
        "p2_commission",
        "p2_pension",
        "inv_rental_income",
        "rent_pmt",
        "m_bal",
        "m_rate",
        "m_amort",
        "prop_taxes",
        "heat_pmt",
        "car_loan",
        "student_loan",
        "cc_pmt",
        "loc_balance",
    ] {
        set_num(&mut d, "profile", key, 0.0);
    }

    set_num(&mut d, "affordability", "bank_rate", 5.0);
    set_num(&mut d, "affordability", "down_payment", 100_000.0);
    d.set("affordability", "prop_type", serde_json::json!("Detached"));
    d.set("affordability", "is_fthb", serde_json::json!(false));
    d.set("affordability", "is_toronto", serde_json::json!(false));

    set_num(&mut d, "smith_maneuver", "mortgage_amt", 500_000.0);
    set_num(&mut d, "smith_maneuver", "mortgage_rate", 5.0);
    set_num(&mut d, "smith_maneuver", "heloc_rate", 6.0);
    set_num(&mut d, "smith_maneuver", "inv_return", 7.0);
    set_num(&mut d, "smith_maneuver", "div_yield", 5.0);
    set_num(&mut d, "smith_maneuver", "tax_rate", 43.0);

    set_num(&mut d, "retire_calc", "current_age", 35.0);
    set_num(&mut d, "retire_calc", "annual_return", 7.0);
    set_num(&mut d, "retire_calc", "target_spend", 60_000.0);
    set_num(&mut d, "retire_calc", "swr", 4.0);
    set_num(&mut d, "coast_fire", "target_age", 65.0);

    set_num(&mut d, "renewal_analysis", "balance", 500_000.0);
    set_num(&mut d, "renewal_analysis", "fixed_rate", 4.79);
    set_num(&mut d, "renewal_analysis", "var_start", 5.5);
    set_num(&mut d, "renewal_analysis", "target_rate", 3.0);
    set_num(&mut d, "renewal_analysis", "months_to_reach", 12.0);

    set_num(&mut d, "tfsa_rrsp", "initial_lump", 10_000.0);
    set_num(&mut d, "tfsa_rrsp", "annual_contribution", 5_000.0);
    set_num(&mut d, "tfsa_rrsp", "years", 20.0);
    set_num(&mut d, "tfsa_rrsp", "swr", 4.0);

    d
}
