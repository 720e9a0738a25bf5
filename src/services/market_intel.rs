// src/services/market_intel.rs
//
// Assembles the MarketIntel snapshot the analyses read: live macro rates
// from the Bank of Canada, an LLM-estimated discounted variable rate, and
// LLM-extracted statutory thresholds, each with a hard-coded fallback.
// The statutory LTT bracket tables live here; they change by legislation,
// not by market, so they ship with the binary and the pipeline only
// refreshes the rebate thresholds on top of them.

use chrono::{NaiveTime, Utc};
use chrono_tz::America::Toronto;
use log::{info, warn};
use std::collections::HashMap;

use crate::models::{Bracket, MarketIntel, Rates, Rebates, TaxRules};
use crate::services::legislative::{self, FthbLimits};
use crate::services::llm::{extract_json, LlmClient};
use crate::services::boc;

/// Upper bound standing in for "no upper bound" in persisted bracket
/// tables. JSON has no infinity, so the open-ended band carries a sentinel
/// no purchase price will ever reach.
pub const OPEN_THRESHOLD: f64 = 9_999_999_999.0;

/// Baked-in defaults when the BoC endpoint is unreachable.
pub const FALLBACK_PRIME: f64 = 6.45;
pub const FALLBACK_OVERNIGHT: f64 = 4.25;
pub const FALLBACK_FIVE_YEAR_FIXED: f64 = 5.89;
pub const FALLBACK_FIVE_YEAR_VARIABLE: f64 = 5.50;

const VARIABLE_RATE_PROMPT: &str = "You are a Canadian mortgage analyst. Given the current bank \
prime rate, estimate the typical discounted 5-year variable mortgage rate available from major \
lenders and return ONLY a JSON object {\"five_year_variable\": number} in percent.";

/// Statutory land-transfer-tax brackets per jurisdiction. Ontario and the
/// Toronto municipal set share the same tiering; single-band provinces use
/// their flat deed/title rate.
pub fn statutory_ltt_tables() -> HashMap<String, Vec<Bracket>> {
    let on = vec![
        Bracket::new(55_000.0, 0.5),
        Bracket::new(250_000.0, 1.0),
        Bracket::new(400_000.0, 1.5),
        Bracket::new(2_000_000.0, 2.0),
        Bracket::new(OPEN_THRESHOLD, 2.5),
    ];

    let mut tables = HashMap::new();
    tables.insert("ON".to_string(), on.clone());
    tables.insert("Toronto".to_string(), on);
    tables.insert(
        "BC".to_string(),
        vec![
            Bracket::new(200_000.0, 1.0),
            Bracket::new(2_000_000.0, 2.0),
            Bracket::new(3_000_000.0, 3.0),
            Bracket::new(OPEN_THRESHOLD, 5.0),
        ],
    );
    tables.insert(
        "MB".to_string(),
        vec![
            Bracket::new(30_000.0, 0.0),
            Bracket::new(90_000.0, 0.5),
            Bracket::new(150_000.0, 1.0),
            Bracket::new(200_000.0, 1.5),
            Bracket::new(OPEN_THRESHOLD, 2.0),
        ],
    );
    tables.insert(
        "QC".to_string(),
        vec![
            Bracket::new(58_900.0, 0.5),
            Bracket::new(294_600.0, 1.0),
            Bracket::new(OPEN_THRESHOLD, 1.5),
        ],
    );
    tables.insert(
        "NB".to_string(),
        vec![Bracket::new(OPEN_THRESHOLD, 1.0)],
    );
    tables.insert(
        "NS".to_string(),
        vec![Bracket::new(OPEN_THRESHOLD, 1.5)],
    );
    // Flat-band fallbacks: land registry fees, not true transfer taxes.
    tables.insert("AB".to_string(), vec![Bracket::new(OPEN_THRESHOLD, 0.0)]);
    tables.insert("SK".to_string(), vec![Bracket::new(OPEN_THRESHOLD, 0.3)]);
    tables.insert("PE".to_string(), vec![Bracket::new(OPEN_THRESHOLD, 1.0)]);
    tables.insert("NL".to_string(), vec![Bracket::new(OPEN_THRESHOLD, 0.4)]);
    tables
}

/// Gross rental yields by province, percent. Coarse market colour for the
/// rental-vs-stock comparison, refreshed rarely.
pub fn provincial_yield_table() -> HashMap<String, f64> {
    let mut yields = HashMap::new();
    yields.insert("ON".to_string(), 4.3);
    yields.insert("BC".to_string(), 3.9);
    yields.insert("AB".to_string(), 6.2);
    yields.insert("QC".to_string(), 5.1);
    yields.insert("MB".to_string(), 5.8);
    yields.insert("SK".to_string(), 6.5);
    yields.insert("NS".to_string(), 5.4);
    yields.insert("NB".to_string(), 6.8);
    yields.insert("PE".to_string(), 5.6);
    yields.insert("NL".to_string(), 6.9);
    yields
}

pub fn fallback_rates() -> Rates {
    Rates {
        bank_prime: FALLBACK_PRIME,
        boc_overnight: FALLBACK_OVERNIGHT,
        five_year_fixed_uninsured: FALLBACK_FIVE_YEAR_FIXED,
        five_year_variable: FALLBACK_FIVE_YEAR_VARIABLE,
    }
}

/// Complete snapshot from fallbacks only. Serves as the zero-state before
/// the first pipeline run and as the floor under every failure mode.
pub fn fallback_snapshot() -> MarketIntel {
    let limits = FthbLimits::fallback();
    MarketIntel {
        last_updated: Utc::now(),
        rates: fallback_rates(),
        provincial_yields: provincial_yield_table(),
        tax_rules: TaxRules {
            ltt: statutory_ltt_tables(),
            rebates: Rebates {
                bc_fthb_threshold: limits.full_limit,
                bc_fthb_partial_limit: limits.partial_limit,
                on_fthb_max: 4_000.0,
                toronto_fthb_max: 4_475.0,
            },
        },
    }
}

/// Stage two: ask the model for the discounted variable rate given the
/// fresh prime. Malformed or out-of-range output falls back.
async fn estimate_variable_rate(llm: Option<&LlmClient>, bank_prime: f64) -> f64 {
    let Some(llm) = llm else {
        return FALLBACK_FIVE_YEAR_VARIABLE;
    };
    let user = format!(
        "The current Canadian bank prime rate is {:.2}%. What is the typical discounted \
         5-year variable mortgage rate right now?",
        bank_prime
    );
    match llm.complete(VARIABLE_RATE_PROMPT, &user).await {
        Ok(reply) => match extract_json(&reply)
            .ok()
            .and_then(|v| v.get("five_year_variable").and_then(|r| r.as_f64()))
        {
            Some(rate) if rate > 0.0 && rate < 25.0 => rate,
            other => {
                warn!("variable-rate estimate unusable ({:?}), using fallback", other);
                FALLBACK_FIVE_YEAR_VARIABLE
            }
        },
        Err(e) => {
            warn!("variable-rate estimation failed: {}", e);
            FALLBACK_FIVE_YEAR_VARIABLE
        }
    }
}

/// Run all three acquisition stages and assemble a complete snapshot.
/// Nothing here propagates an error: every stage degrades to its fallback
/// and the result is always a full, valid MarketIntel.
pub async fn build_snapshot(llm: Option<&LlmClient>) -> MarketIntel {
    let (bank_prime, boc_overnight, five_year_fixed) = match boc::fetch_boc_rates().await {
        Ok(r) => (r.bank_prime, r.boc_overnight, r.five_year_fixed),
        Err(e) => {
            warn!("BoC fetch failed, using fallback rates: {}", e);
            (FALLBACK_PRIME, FALLBACK_OVERNIGHT, FALLBACK_FIVE_YEAR_FIXED)
        }
    };

    let five_year_variable = estimate_variable_rate(llm, bank_prime).await;

    let limits = match llm {
        Some(llm) => legislative::fetch_fthb_limits(llm).await,
        None => FthbLimits::fallback(),
    };

    let intel = MarketIntel {
        last_updated: Utc::now(),
        rates: Rates {
            bank_prime,
            boc_overnight,
            five_year_fixed_uninsured: five_year_fixed,
            five_year_variable,
        },
        provincial_yields: provincial_yield_table(),
        tax_rules: TaxRules {
            ltt: statutory_ltt_tables(),
            rebates: Rebates {
                bc_fthb_threshold: limits.full_limit,
                bc_fthb_partial_limit: limits.partial_limit,
                on_fthb_max: 4_000.0,
                toronto_fthb_max: 4_475.0,
            },
        },
    };
    info!(
        "Assembled MarketIntel snapshot: prime {} / variable {} / FTHB full {}",
        intel.rates.bank_prime, intel.rates.five_year_variable, limits.full_limit
    );
    intel
}

/// The BoC publishes end-of-day data around 16:30 Eastern; the scheduler
/// checks this one-minute window when deciding whether a cron tick should
/// trigger a refresh.
pub fn should_refresh_daily() -> bool {
    let now_et = Utc::now().with_timezone(&Toronto);
    let target = NaiveTime::from_hms_opt(16, 30, 0).unwrap();
    let now = now_et.time();
    now >= target && now < target + chrono::Duration::minutes(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_snapshot_is_valid_and_complete() {
        let intel = fallback_snapshot();
        assert!(intel.validate().is_ok());
        for p in crate::models::Province::all() {
            assert!(
                intel.tax_rules.ltt.contains_key(p.code()),
                "missing LTT table for {}",
                p
            );
            assert!(
                intel.provincial_yields.contains_key(p.code()),
                "missing yield for {}",
                p
            );
        }
        assert!(intel.tax_rules.ltt.contains_key("Toronto"));
        assert!(intel.rates.bank_prime > 0.0);
        assert!(intel.rates.five_year_variable > 0.0);
    }

    #[test]
    fn snapshot_round_trips_through_json() {
        let intel = fallback_snapshot();
        let text = serde_json::to_string(&intel).unwrap();
        let back: MarketIntel = serde_json::from_str(&text).unwrap();
        assert!(back.validate().is_ok());
        assert_eq!(back.tax_rules.rebates.on_fthb_max, 4_000.0);
        assert_eq!(
            back.tax_rules.ltt["ON"].len(),
            intel.tax_rules.ltt["ON"].len()
        );
    }
}
