// src/services/smith.rs
//
// Month-by-month Smith Maneuver simulation: principal paid on the mortgage
// is re-borrowed on a readvanceable HELOC and invested, and each spring the
// refund on the year's deductible HELOC interest is applied against the
// mortgage. The refund is drawn as new HELOC borrowing in the same month
// it lands.

use serde::Serialize;

use crate::models::Scenario;
use crate::services::amort;

#[derive(Debug, Clone, Copy)]
pub struct SmithInputs {
    pub mortgage_amt: f64,
    pub mortgage_rate: f64,
    pub amort_years: f64,
    pub heloc_rate: f64,
    pub inv_return: f64,
    pub div_yield: f64,
    pub marginal_rate: f64,
    pub horizon_years: u32,
    pub initial_lump: f64,
}

/// Optional market shock overlay for the stress run.
#[derive(Debug, Clone, Copy)]
pub struct CrashParams {
    pub crash_year: u32,
    pub drop_pct: f64,
    pub recovery_years: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct SmithYearRow {
    pub year: u32,
    pub mortgage_balance: f64,
    pub heloc_balance: f64,
    pub portfolio: f64,
    pub annual_refund: f64,
    pub annual_dividends: f64,
    pub annual_heloc_interest: f64,
    pub active_net_equity: f64,
    pub baseline_net_worth: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SmithResult {
    pub years: Vec<SmithYearRow>,
    pub months_to_payoff: Option<u32>,
    pub baseline_months_to_payoff: Option<u32>,
    pub total_refunds: f64,
    pub final_net_equity: f64,
    pub final_baseline_net_worth: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SmithStressResult {
    pub final_net_equity: f64,
    pub trough_net_equity: f64,
    pub solvent: bool,
    pub heloc_interest_during_stall: f64,
}

pub fn inputs_from(scenario: &Scenario) -> SmithInputs {
    SmithInputs {
        mortgage_amt: scenario.num("smith_maneuver", "mortgage_amt", 500_000.0),
        mortgage_rate: scenario.num("smith_maneuver", "mortgage_rate", 5.0),
        amort_years: scenario.num("smith_maneuver", "amort_years", 25.0).max(1.0),
        heloc_rate: scenario.num("smith_maneuver", "heloc_rate", 6.0),
        inv_return: scenario.num("smith_maneuver", "inv_return", 7.0),
        div_yield: scenario.num("smith_maneuver", "div_yield", 5.0),
        marginal_rate: scenario.num("smith_maneuver", "tax_rate", 43.0),
        horizon_years: scenario.num("smith_maneuver", "horizon_years", 25.0).max(1.0) as u32,
        initial_lump: scenario.num("smith_maneuver", "initial_lump", 0.0),
    }
}

pub fn simulate(inputs: SmithInputs) -> SmithResult {
    run(inputs, None).0
}

pub fn simulate_stress(inputs: SmithInputs, crash: CrashParams) -> SmithStressResult {
    let (result, stall_interest) = run(inputs, Some(crash));
    let trough = result
        .years
        .iter()
        .map(|y| y.active_net_equity)
        .fold(f64::INFINITY, f64::min);
    SmithStressResult {
        final_net_equity: result.final_net_equity,
        trough_net_equity: trough,
        solvent: result.final_net_equity > 0.0,
        heloc_interest_during_stall: stall_interest,
    }
}

fn run(inputs: SmithInputs, crash: Option<CrashParams>) -> (SmithResult, f64) {
    let months = (inputs.amort_years.max(inputs.horizon_years as f64) * 12.0) as u32;
    let months = months.min(amort::MAX_MONTHS as u32).max(12);

    let payment = amort::monthly_payment(inputs.mortgage_amt, inputs.mortgage_rate, inputs.amort_years);
    let m_rate = inputs.mortgage_rate / 100.0 / 12.0;
    let h_rate = inputs.heloc_rate / 100.0 / 12.0;
    let g_rate = inputs.inv_return / 100.0 / 12.0;
    let marginal = inputs.marginal_rate / 100.0;

    // Active track.
    let mut mortgage = inputs.mortgage_amt;
    let mut heloc = 0.0;
    let mut portfolio = inputs.initial_lump;
    let mut year_heloc_interest = 0.0;
    let mut prior_year_heloc_interest = 0.0;
    let mut year_refund = 0.0;
    let mut total_refunds = 0.0;
    let mut months_to_payoff = None;

    // Baseline track: plain amortization, nothing invested.
    let mut baseline_balance = inputs.mortgage_amt;
    let mut baseline_months_to_payoff = None;

    let mut years = Vec::new();
    let mut stall_interest = 0.0;

    for month in 1..=months {
        let year = (month - 1) / 12 + 1;

        // Crash overlay: the portfolio drops entering the crash year and
        // stops compounding for the recovery window, while HELOC interest
        // keeps running.
        let (crashed_this_month, stalled) = match crash {
            Some(c) => {
                let crash_month = (c.crash_year.max(1) - 1) * 12 + 1;
                let stall_end = crash_month + c.recovery_years * 12;
                (month == crash_month, month >= crash_month && month < stall_end)
            }
            None => (false, false),
        };
        if crashed_this_month {
            if let Some(c) = crash {
                portfolio *= (1.0 - c.drop_pct / 100.0).max(0.0);
            }
        }

        // Annual refund lands on the first month of each subsequent year.
        let mut refund_borrowing = 0.0;
        if month % 12 == 1 && month > 1 {
            let refund = prior_year_heloc_interest * marginal;
            if refund > 0.0 {
                if mortgage > 0.0 {
                    mortgage = (mortgage - refund).max(0.0);
                } else {
                    portfolio += refund;
                }
                refund_borrowing = refund;
                year_refund += refund;
                total_refunds += refund;
            }
        }

        // Mortgage leg.
        let mut principal_paid = 0.0;
        if mortgage > 0.0 {
            let interest = mortgage * m_rate;
            principal_paid = (payment - interest).max(0.0).min(mortgage);
            mortgage -= principal_paid;
            if mortgage <= 0.005 {
                mortgage = 0.0;
                months_to_payoff.get_or_insert(month);
            }
        }

        // HELOC leg: interest accrues on the outstanding balance, then the
        // month's new borrowing (readvanced principal plus any refund) is
        // drawn and pushed into the portfolio.
        let heloc_interest = heloc * h_rate;
        year_heloc_interest += heloc_interest;
        if stalled {
            stall_interest += heloc_interest;
        }
        let new_borrowing = principal_paid + refund_borrowing;
        heloc += new_borrowing;

        portfolio += new_borrowing;
        if !stalled {
            portfolio *= 1.0 + g_rate;
        }

        // Baseline leg.
        if baseline_balance > 0.0 {
            let interest = baseline_balance * m_rate;
            let paid = (payment - interest).max(0.0).min(baseline_balance);
            baseline_balance -= paid;
            if baseline_balance <= 0.005 {
                baseline_balance = 0.0;
                baseline_months_to_payoff.get_or_insert(month);
            }
        }

        if month % 12 == 0 {
            years.push(SmithYearRow {
                year,
                mortgage_balance: mortgage,
                heloc_balance: heloc,
                portfolio,
                annual_refund: year_refund,
                annual_dividends: portfolio * inputs.div_yield / 100.0,
                annual_heloc_interest: year_heloc_interest,
                active_net_equity: portfolio - heloc + (inputs.mortgage_amt - mortgage),
                baseline_net_worth: inputs.mortgage_amt - baseline_balance,
            });
            prior_year_heloc_interest = year_heloc_interest;
            year_heloc_interest = 0.0;
            year_refund = 0.0;
        }
    }

    let final_net_equity = years.last().map(|y| y.active_net_equity).unwrap_or(0.0);
    let final_baseline = years.last().map(|y| y.baseline_net_worth).unwrap_or(0.0);

    (
        SmithResult {
            years,
            months_to_payoff,
            baseline_months_to_payoff,
            total_refunds,
            final_net_equity,
            final_baseline_net_worth: final_baseline,
        },
        stall_interest,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed_inputs() -> SmithInputs {
        SmithInputs {
            mortgage_amt: 500_000.0,
            mortgage_rate: 5.0,
            amort_years: 25.0,
            heloc_rate: 6.0,
            inv_return: 7.0,
            div_yield: 5.0,
            marginal_rate: 43.0,
            horizon_years: 25,
            initial_lump: 0.0,
        }
    }

    #[test]
    fn refunds_accelerate_payoff_under_300_months() {
        let result = simulate(seed_inputs());
        let payoff = result.months_to_payoff.expect("mortgage should discharge");
        assert!(payoff < 300, "paid off at month {}", payoff);
        assert_eq!(result.baseline_months_to_payoff, Some(300));
    }

    #[test]
    fn active_track_beats_baseline_by_year_25() {
        let result = simulate(seed_inputs());
        let last = result.years.last().unwrap();
        assert_eq!(last.year, 25);
        assert!(
            last.active_net_equity > last.baseline_net_worth,
            "active {} vs baseline {}",
            last.active_net_equity,
            last.baseline_net_worth
        );
    }

    #[test]
    fn year_two_refund_matches_year_one_heloc_interest() {
        let result = simulate(seed_inputs());
        let y1 = &result.years[0];
        let y2 = &result.years[1];
        assert!((y2.annual_refund - y1.annual_heloc_interest * 0.43).abs() < 0.01);
    }

    #[test]
    fn conversion_ledger_balances_while_amortizing() {
        // Every dollar leaving the mortgage (scheduled principal or refund
        // prepayment) reappears as HELOC borrowing, so the two balances sum
        // to the starting mortgage until discharge.
        let result = simulate(seed_inputs());
        for row in &result.years {
            if row.mortgage_balance > 0.0 {
                let total = row.mortgage_balance + row.heloc_balance;
                assert!(
                    (total - 500_000.0).abs() < 1.0,
                    "year {}: mortgage {} + heloc {} != 500k",
                    row.year,
                    row.mortgage_balance,
                    row.heloc_balance
                );
            }
        }
    }

    #[test]
    fn net_equity_monotone_when_return_beats_heloc() {
        let result = simulate(seed_inputs());
        let mut prev = f64::NEG_INFINITY;
        for row in &result.years {
            assert!(
                row.active_net_equity >= prev - 1.0,
                "net equity fell at year {}",
                row.year
            );
            prev = row.active_net_equity;
        }
    }

    #[test]
    fn stress_crash_dents_but_seed_case_stays_solvent() {
        let stressed = simulate_stress(
            seed_inputs(),
            CrashParams { crash_year: 10, drop_pct: 35.0, recovery_years: 3 },
        );
        let calm = simulate(seed_inputs());
        assert!(stressed.final_net_equity < calm.final_net_equity);
        assert!(stressed.heloc_interest_during_stall > 0.0);
        assert!(stressed.solvent);
    }

    #[test]
    fn zero_mortgage_is_a_quiet_no_op() {
        let mut inputs = seed_inputs();
        inputs.mortgage_amt = 0.0;
        let result = simulate(inputs);
        assert_eq!(result.total_refunds, 0.0);
        assert_eq!(result.final_net_equity, 0.0);
    }
}
