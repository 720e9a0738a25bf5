// src/services/tax.rs
//
// Combined federal+provincial marginal tables, the shared piecewise-bracket
// walk, and the statutory constants the decumulation analyses need. Every
// analysis that wants a marginal rate comes through here so the numbers
// agree across the workbench.

use crate::models::{Bracket, Province, TaxRules};
use crate::BoxError;

/// Capital gains inclusion rate on dispositions that are not flips.
pub const CAPITAL_GAINS_INCLUSION: f64 = 0.50;

/// OAS recovery tax ("clawback") starts above this net income.
pub const OAS_RECOVERY_THRESHOLD: f64 = 90_997.0;

/// GIS is only payable below this income (single senior, excluding OAS).
pub const GIS_ELIGIBILITY_THRESHOLD: f64 = 21_624.0;

/// GIS is reduced by fifty cents per incremental dollar of income.
pub const GIS_REDUCTION_RATE: f64 = 0.50;

/// OAS recovery rate above the threshold.
pub const OAS_RECOVERY_RATE: f64 = 0.15;

/// Combined federal + provincial marginal tiers, percent, sorted ascending.
/// Thresholds are the upper bound of each band; the last band is open-ended.
/// Planning-grade approximations, not filing-grade tables.
fn combined_brackets(province: Province) -> &'static [Bracket] {
    const INF: f64 = f64::INFINITY;
    match province {
        Province::ON => &[
            Bracket { threshold: 51_446.0, rate: 20.05 },
            Bracket { threshold: 55_867.0, rate: 24.15 },
            Bracket { threshold: 90_599.0, rate: 29.65 },
            Bracket { threshold: 111_733.0, rate: 33.89 },
            Bracket { threshold: 173_205.0, rate: 43.41 },
            Bracket { threshold: 246_752.0, rate: 48.29 },
            Bracket { threshold: INF, rate: 53.53 },
        ],
        Province::BC => &[
            Bracket { threshold: 47_937.0, rate: 20.06 },
            Bracket { threshold: 55_867.0, rate: 22.70 },
            Bracket { threshold: 95_875.0, rate: 28.20 },
            Bracket { threshold: 111_733.0, rate: 31.00 },
            Bracket { threshold: 173_205.0, rate: 40.70 },
            Bracket { threshold: 252_752.0, rate: 46.12 },
            Bracket { threshold: INF, rate: 53.50 },
        ],
        Province::AB => &[
            Bracket { threshold: 55_867.0, rate: 25.00 },
            Bracket { threshold: 111_733.0, rate: 30.50 },
            Bracket { threshold: 148_269.0, rate: 36.00 },
            Bracket { threshold: 173_205.0, rate: 38.00 },
            Bracket { threshold: 246_752.0, rate: 42.32 },
            Bracket { threshold: INF, rate: 48.00 },
        ],
        Province::QC => &[
            Bracket { threshold: 51_780.0, rate: 26.53 },
            Bracket { threshold: 55_867.0, rate: 31.53 },
            Bracket { threshold: 103_545.0, rate: 36.12 },
            Bracket { threshold: 111_733.0, rate: 41.12 },
            Bracket { threshold: 126_000.0, rate: 45.71 },
            Bracket { threshold: 173_205.0, rate: 47.46 },
            Bracket { threshold: INF, rate: 53.31 },
        ],
        Province::MB => &[
            Bracket { threshold: 47_000.0, rate: 25.80 },
            Bracket { threshold: 55_867.0, rate: 27.75 },
            Bracket { threshold: 100_000.0, rate: 33.25 },
            Bracket { threshold: 111_733.0, rate: 37.90 },
            Bracket { threshold: 173_205.0, rate: 43.40 },
            Bracket { threshold: INF, rate: 50.40 },
        ],
        Province::SK => &[
            Bracket { threshold: 52_057.0, rate: 25.50 },
            Bracket { threshold: 55_867.0, rate: 27.50 },
            Bracket { threshold: 111_733.0, rate: 33.00 },
            Bracket { threshold: 148_734.0, rate: 38.50 },
            Bracket { threshold: 173_205.0, rate: 40.50 },
            Bracket { threshold: INF, rate: 47.50 },
        ],
        Province::NS => &[
            Bracket { threshold: 29_590.0, rate: 23.79 },
            Bracket { threshold: 55_867.0, rate: 29.95 },
            Bracket { threshold: 59_180.0, rate: 35.45 },
            Bracket { threshold: 93_000.0, rate: 37.17 },
            Bracket { threshold: 111_733.0, rate: 43.50 },
            Bracket { threshold: 154_650.0, rate: 47.00 },
            Bracket { threshold: INF, rate: 54.00 },
        ],
        Province::NB => &[
            Bracket { threshold: 49_958.0, rate: 24.40 },
            Bracket { threshold: 55_867.0, rate: 29.00 },
            Bracket { threshold: 99_916.0, rate: 36.50 },
            Bracket { threshold: 111_733.0, rate: 42.00 },
            Bracket { threshold: 185_064.0, rate: 45.32 },
            Bracket { threshold: INF, rate: 52.50 },
        ],
        Province::PE => &[
            Bracket { threshold: 32_656.0, rate: 24.80 },
            Bracket { threshold: 55_867.0, rate: 28.80 },
            Bracket { threshold: 64_313.0, rate: 34.30 },
            Bracket { threshold: 111_733.0, rate: 40.37 },
            Bracket { threshold: 173_205.0, rate: 44.37 },
            Bracket { threshold: INF, rate: 51.37 },
        ],
        Province::NL => &[
            Bracket { threshold: 43_198.0, rate: 23.70 },
            Bracket { threshold: 55_867.0, rate: 29.50 },
            Bracket { threshold: 86_322.0, rate: 35.00 },
            Bracket { threshold: 111_733.0, rate: 41.30 },
            Bracket { threshold: 154_244.0, rate: 43.80 },
            Bracket { threshold: 215_943.0, rate: 47.12 },
            Bracket { threshold: INF, rate: 54.80 },
        ],
    }
}

/// Combined marginal rate (percent) at the band containing `income`.
pub fn marginal_rate(income: f64, province: Province) -> f64 {
    let income = income.max(0.0);
    for b in combined_brackets(province) {
        if income < b.threshold {
            return b.rate;
        }
    }
    // Unreachable: the last threshold is infinite.
    combined_brackets(province).last().map(|b| b.rate).unwrap_or(0.0)
}

/// Total tax from 0 to `income`: the piecewise-linear integral of the
/// marginal table. Non-decreasing, convex, zero at zero.
pub fn cumulative_tax(income: f64, province: Province) -> f64 {
    progressive_amount(combined_brackets(province), income)
}

/// The bracket walk shared by income tax and land-transfer tax: each band
/// taxes the slice between the previous threshold and its own at its rate.
pub fn progressive_amount(brackets: &[Bracket], amount: f64) -> f64 {
    let amount = amount.max(0.0);
    let mut total = 0.0;
    let mut prev = 0.0;
    for b in brackets {
        if amount <= prev {
            break;
        }
        let slice = amount.min(b.threshold) - prev;
        total += slice * b.rate / 100.0;
        prev = b.threshold;
    }
    total
}

/// LTT bracket list for a jurisdiction label ("ON", "BC", "Toronto", ...).
pub fn ltt_brackets<'a>(rules: &'a TaxRules, jurisdiction: &str) -> Result<&'a [Bracket], BoxError> {
    rules
        .ltt
        .get(jurisdiction)
        .map(|v| v.as_slice())
        .ok_or_else(|| format!("no LTT brackets configured for {}", jurisdiction).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marginal_rate_is_monotone_in_income() {
        for province in Province::all() {
            let mut prev = 0.0;
            for income in (0..400_000).step_by(5_000) {
                let r = marginal_rate(income as f64, province);
                assert!(
                    r >= prev,
                    "{}: rate fell from {} to {} at {}",
                    province,
                    prev,
                    r,
                    income
                );
                prev = r;
            }
        }
    }

    #[test]
    fn cumulative_tax_zero_at_zero() {
        for province in Province::all() {
            assert_eq!(cumulative_tax(0.0, province), 0.0);
            assert_eq!(cumulative_tax(-5_000.0, province), 0.0);
        }
    }

    #[test]
    fn cumulative_tax_matches_marginal_slope() {
        // Away from a boundary, the derivative of cumulative tax is the
        // marginal rate.
        let income = 70_000.0;
        let eps = 10.0;
        let slope =
            (cumulative_tax(income + eps, Province::ON) - cumulative_tax(income, Province::ON)) / eps;
        let marginal = marginal_rate(income, Province::ON) / 100.0;
        assert!((slope - marginal).abs() < 1e-9, "slope {} vs marginal {}", slope, marginal);
    }

    #[test]
    fn on_first_band_hand_computed() {
        // 50,000 entirely inside the first ON band at 20.05%.
        let tax = cumulative_tax(50_000.0, Province::ON);
        assert!((tax - 50_000.0 * 0.2005).abs() < 0.01);
    }

    #[test]
    fn ltt_lookup_fails_for_unknown_jurisdiction() {
        use crate::models::Rebates;
        let rules = TaxRules {
            ltt: Default::default(),
            rebates: Rebates {
                bc_fthb_threshold: 835_000.0,
                bc_fthb_partial_limit: 860_000.0,
                on_fthb_max: 4_000.0,
                toronto_fthb_max: 4_475.0,
            },
        };
        assert!(ltt_brackets(&rules, "YT").is_err());
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(proptest::test_runner::Config::with_cases(64))]

            #[test]
            fn cumulative_tax_non_decreasing(a in 0.0..500_000.0f64, b in 0.0..500_000.0f64) {
                let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
                prop_assert!(cumulative_tax(lo, Province::BC) <= cumulative_tax(hi, Province::BC) + 1e-9);
            }

            #[test]
            fn cumulative_tax_convex(x in 0.0..400_000.0f64) {
                // Marginal rate (the derivative) never decreases, so the
                // integral is convex: the forward difference grows with x.
                let h = 1_000.0;
                let d1 = cumulative_tax(x + h, Province::ON) - cumulative_tax(x, Province::ON);
                let d2 = cumulative_tax(x + 2.0 * h, Province::ON) - cumulative_tax(x + h, Province::ON);
                prop_assert!(d2 >= d1 - 1e-9);
            }
        }
    }
}
