// src/services/renewal.rs
//
// Fixed-vs-variable renewal race over a five-year term. The variable leg
// walks linearly toward the target rate and re-prices its payment every
// month on the remaining amortization; the stay-high stress mode pins the
// target at the starting rate.

use serde::Serialize;

use crate::models::Scenario;
use crate::services::amort;

pub const TERM_MONTHS: u32 = 60;

#[derive(Debug, Clone, Copy)]
pub struct RenewalInputs {
    pub balance: f64,
    pub remaining_amort_years: f64,
    pub fixed_rate: f64,
    pub var_start: f64,
    pub target_rate: f64,
    pub months_to_reach: u32,
    pub stay_high: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct RenewalMonthRow {
    pub month: u32,
    pub variable_rate: f64,
    pub fixed_balance: f64,
    pub variable_balance: f64,
    pub fixed_cum_interest: f64,
    pub variable_cum_interest: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RenewalResult {
    pub months: Vec<RenewalMonthRow>,
    pub fixed_total_interest: f64,
    pub variable_total_interest: f64,
    pub verdict: &'static str,
}

pub fn inputs_from(scenario: &Scenario) -> RenewalInputs {
    RenewalInputs {
        balance: scenario.num("renewal_analysis", "balance", 500_000.0),
        remaining_amort_years: scenario.num("renewal_analysis", "remaining_amort", 25.0).max(1.0),
        fixed_rate: scenario.num("renewal_analysis", "fixed_rate", 4.79),
        var_start: scenario.num("renewal_analysis", "var_start", 5.5),
        target_rate: scenario.num("renewal_analysis", "target_rate", 3.0),
        months_to_reach: scenario.num("renewal_analysis", "months_to_reach", 12.0).max(1.0) as u32,
        stay_high: scenario.flag("renewal_analysis", "stay_high", false),
    }
}

pub fn simulate(inputs: RenewalInputs) -> RenewalResult {
    let fixed_payment =
        amort::monthly_payment(inputs.balance, inputs.fixed_rate, inputs.remaining_amort_years);
    let target = if inputs.stay_high { inputs.var_start } else { inputs.target_rate };
    let reach = inputs.months_to_reach.max(1) as f64;

    let mut fixed_balance = inputs.balance;
    let mut variable_balance = inputs.balance;
    let mut fixed_cum = 0.0;
    let mut variable_cum = 0.0;
    let mut months = Vec::with_capacity(TERM_MONTHS as usize);

    let total_amort_months = (inputs.remaining_amort_years * 12.0).round() as u32;

    for month in 1..=TERM_MONTHS {
        // Fixed leg.
        if fixed_balance > 0.0 {
            let interest = fixed_balance * inputs.fixed_rate / 100.0 / 12.0;
            let principal = (fixed_payment - interest).max(0.0).min(fixed_balance);
            fixed_cum += interest;
            fixed_balance -= principal;
        }

        // Variable leg: rate ramps to the target, payment re-solved on the
        // months of amortization still ahead.
        let progress = (month as f64).min(reach) / reach;
        let variable_rate = inputs.var_start + (target - inputs.var_start) * progress;
        if variable_balance > 0.0 {
            let remaining_months = total_amort_months.saturating_sub(month - 1).max(1);
            let payment = amort::monthly_payment(
                variable_balance,
                variable_rate,
                remaining_months as f64 / 12.0,
            );
            let interest = variable_balance * variable_rate / 100.0 / 12.0;
            let principal = (payment - interest).max(0.0).min(variable_balance);
            variable_cum += interest;
            variable_balance -= principal;
        }

        months.push(RenewalMonthRow {
            month,
            variable_rate,
            fixed_balance,
            variable_balance,
            fixed_cum_interest: fixed_cum,
            variable_cum_interest: variable_cum,
        });
    }

    RenewalResult {
        months,
        fixed_total_interest: fixed_cum,
        variable_total_interest: variable_cum,
        verdict: if variable_cum < fixed_cum { "variable" } else { "fixed" },
    }
}
