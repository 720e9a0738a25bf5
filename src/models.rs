// src/models.rs
use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// One piecewise band. The same shape services both income-tax tiers and
/// land-transfer-tax brackets: the band covers income/price from the previous
/// threshold up to `threshold`, taxed at `rate` percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bracket {
    pub threshold: f64,
    pub rate: f64,
}

impl Bracket {
    pub fn new(threshold: f64, rate: f64) -> Self {
        Bracket { threshold, rate }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Rates {
    pub bank_prime: f64,
    pub boc_overnight: f64,
    pub five_year_fixed_uninsured: f64,
    pub five_year_variable: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Rebates {
    #[serde(rename = "BC_FTHB_Threshold")]
    pub bc_fthb_threshold: f64,
    #[serde(rename = "BC_FTHB_Partial_Limit")]
    pub bc_fthb_partial_limit: f64,
    #[serde(rename = "ON_FTHB_Max")]
    pub on_fthb_max: f64,
    #[serde(rename = "Toronto_FTHB_Max")]
    pub toronto_fthb_max: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxRules {
    pub ltt: HashMap<String, Vec<Bracket>>,
    pub rebates: Rebates,
}

/// Immutable snapshot of everything the analyses need from the outside
/// world. A pipeline refresh either produces a complete new snapshot or the
/// previous one stays in place; readers never see a partial update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketIntel {
    pub last_updated: DateTime<Utc>,
    pub rates: Rates,
    pub provincial_yields: HashMap<String, f64>,
    pub tax_rules: TaxRules,
}

impl MarketIntel {
    /// Bracket lists must be sorted ascending by threshold with non-negative
    /// rates. Called on every load so a hand-edited file fails loudly.
    pub fn validate(&self) -> Result<(), String> {
        for (juris, brackets) in &self.tax_rules.ltt {
            if brackets.is_empty() {
                return Err(format!("empty LTT bracket list for {}", juris));
            }
            let mut prev = f64::NEG_INFINITY;
            for b in brackets {
                if b.threshold <= prev {
                    return Err(format!(
                        "LTT brackets for {} not strictly ascending at {}",
                        juris, b.threshold
                    ));
                }
                if b.rate < 0.0 {
                    return Err(format!("negative LTT rate for {}", juris));
                }
                prev = b.threshold;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Province {
    ON,
    BC,
    AB,
    QC,
    MB,
    SK,
    NS,
    NB,
    PE,
    NL,
}

impl Province {
    pub fn code(&self) -> &'static str {
        match self {
            Province::ON => "ON",
            Province::BC => "BC",
            Province::AB => "AB",
            Province::QC => "QC",
            Province::MB => "MB",
            Province::SK => "SK",
            Province::NS => "NS",
            Province::NB => "NB",
            Province::PE => "PE",
            Province::NL => "NL",
        }
    }

    pub fn all() -> [Province; 10] {
        [
            Province::ON,
            Province::BC,
            Province::AB,
            Province::QC,
            Province::MB,
            Province::SK,
            Province::NS,
            Province::NB,
            Province::PE,
            Province::NL,
        ]
    }
}

impl fmt::Display for Province {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Province {
    type Err = String;

    // Profiles saved by older UI builds carry full names, so accept both.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "ON" | "Ontario" => Ok(Province::ON),
            "BC" | "British Columbia" => Ok(Province::BC),
            "AB" | "Alberta" => Ok(Province::AB),
            "QC" | "Quebec" | "Québec" => Ok(Province::QC),
            "MB" | "Manitoba" => Ok(Province::MB),
            "SK" | "Saskatchewan" => Ok(Province::SK),
            "NS" | "Nova Scotia" => Ok(Province::NS),
            "NB" | "New Brunswick" => Ok(Province::NB),
            "PE" | "PEI" | "Prince Edward Island" => Ok(Province::PE),
            "NL" | "Newfoundland" | "Newfoundland and Labrador" => Ok(Province::NL),
            other => Err(format!("unknown province: {}", other)),
        }
    }
}

/// The per-session input tree: named sections, each a flat map of scalar
/// values. The UI writes one field at a time; analyses read through the
/// typed accessors which clamp and default so bad input never panics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(flatten)]
    pub sections: HashMap<String, HashMap<String, Value>>,
}

impl Scenario {
    pub fn new() -> Self {
        Scenario::default()
    }

    pub fn get(&self, section: &str, key: &str) -> Option<&Value> {
        self.sections.get(section).and_then(|s| s.get(key))
    }

    pub fn set(&mut self, section: &str, key: &str, value: Value) {
        self.sections
            .entry(section.to_string())
            .or_default()
            .insert(key.to_string(), value);
    }

    /// Numeric read, clamped to >= 0. Monetary inputs and percentages are
    /// non-negative by invariant; a missing or non-numeric value reads as
    /// the supplied default.
    pub fn num(&self, section: &str, key: &str, default: f64) -> f64 {
        self.get(section, key)
            .and_then(|v| v.as_f64().or_else(|| v.as_str().and_then(|s| s.parse().ok())))
            .unwrap_or(default)
            .max(0.0)
    }

    /// Numeric read without the non-negative clamp, for fields that are
    /// legitimately signed (cashflow deltas).
    pub fn num_signed(&self, section: &str, key: &str, default: f64) -> f64 {
        self.get(section, key)
            .and_then(|v| v.as_f64().or_else(|| v.as_str().and_then(|s| s.parse().ok())))
            .unwrap_or(default)
    }

    pub fn text(&self, section: &str, key: &str, default: &str) -> String {
        self.get(section, key)
            .and_then(|v| v.as_str().map(String::from))
            .unwrap_or_else(|| default.to_string())
    }

    pub fn flag(&self, section: &str, key: &str, default: bool) -> bool {
        self.get(section, key)
            .and_then(|v| {
                v.as_bool()
                    .or_else(|| v.as_str().map(|s| matches!(s, "true" | "Yes" | "yes" | "1")))
            })
            .unwrap_or(default)
    }

    /// A scenario always carries profile.province; unrecognized values fall
    /// back to Ontario rather than erroring on the analysis path.
    pub fn province(&self) -> Province {
        self.text("profile", "province", "ON")
            .parse()
            .unwrap_or(Province::ON)
    }

    /// Merge defaults in without clobbering anything the user already set.
    pub fn ensure_defaults(&mut self, defaults: &Scenario) {
        for (section, keys) in &defaults.sections {
            let target = self.sections.entry(section.clone()).or_default();
            for (key, value) in keys {
                target.entry(key.clone()).or_insert_with(|| value.clone());
            }
        }
    }
}
