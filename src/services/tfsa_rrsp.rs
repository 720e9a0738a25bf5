// src/services/tfsa_rrsp.rs
//
// Accumulate the same out-of-pocket commitment through a TFSA and an RRSP,
// then compare what a safe-withdrawal-rate drawdown actually leaves in the
// retiree's pocket once bracket tax, the OAS recovery tax and GIS
// reduction have taken their cuts from the RRSP side.

use serde::Serialize;

use crate::models::{Province, Scenario};
use crate::services::tax;

#[derive(Debug, Clone, Copy)]
pub struct TfsaRrspInputs {
    pub initial_lump: f64,
    pub annual_contribution: f64,
    pub years: u32,
    pub annual_return: f64,
    pub current_marginal: f64,
    pub base_retirement_income: f64,
    pub swr: f64,
    pub retirement_years: u32,
    pub province: Province,
}

#[derive(Debug, Clone, Serialize)]
pub struct DecumulationYear {
    pub year: u32,
    pub tfsa_balance: f64,
    pub rrsp_balance: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TfsaRrspResult {
    pub tfsa_final: f64,
    pub rrsp_final: f64,
    pub tfsa_withdrawal: f64,
    pub rrsp_withdrawal: f64,
    pub tfsa_net_spendable: f64,
    pub rrsp_net_spendable: f64,
    pub rrsp_income_tax: f64,
    pub oas_clawback: f64,
    pub gis_clawback: f64,
    pub trajectory: Vec<DecumulationYear>,
}

pub fn inputs_from(scenario: &Scenario) -> TfsaRrspInputs {
    TfsaRrspInputs {
        initial_lump: scenario.num("tfsa_rrsp", "initial_lump", 10_000.0),
        annual_contribution: scenario.num("tfsa_rrsp", "annual_contribution", 5_000.0),
        years: scenario.num("tfsa_rrsp", "years", 20.0).max(1.0) as u32,
        annual_return: scenario.num("tfsa_rrsp", "annual_return", 7.0),
        current_marginal: scenario.num("tfsa_rrsp", "current_marginal", 40.0).min(99.0),
        base_retirement_income: scenario.num("tfsa_rrsp", "base_income", 25_000.0),
        swr: scenario.num("tfsa_rrsp", "swr", 4.0),
        retirement_years: scenario.num("tfsa_rrsp", "retirement_years", 25.0).max(1.0) as u32,
        province: scenario.province(),
    }
}

/// Future value of a lump plus an end-of-year contribution stream.
fn accumulate(lump: f64, annual: f64, rate_pct: f64, years: u32) -> f64 {
    let r = rate_pct / 100.0;
    let growth = (1.0 + r).powi(years as i32);
    if r.abs() < 1e-12 {
        return lump + annual * years as f64;
    }
    lump * growth + annual * (growth - 1.0) / r
}

pub fn optimize(inputs: TfsaRrspInputs) -> TfsaRrspResult {
    let tfsa_final = accumulate(
        inputs.initial_lump,
        inputs.annual_contribution,
        inputs.annual_return,
        inputs.years,
    );

    // The RRSP deposit is grossed up: committing the same after-tax dollars
    // shelters more principal because the refund goes straight back in.
    let gross_up = 1.0 / (1.0 - inputs.current_marginal / 100.0).max(0.01);
    let rrsp_final = accumulate(
        inputs.initial_lump * gross_up,
        inputs.annual_contribution * gross_up,
        inputs.annual_return,
        inputs.years,
    );

    let swr = inputs.swr / 100.0;
    let tfsa_withdrawal = tfsa_final * swr;
    let rrsp_withdrawal = rrsp_final * swr;
    let base = inputs.base_retirement_income;

    // TFSA withdrawals are invisible to the income tests.
    let tfsa_net_spendable = tfsa_withdrawal;

    // RRSP withdrawals stack on top of base income: incremental bracket
    // tax, then OAS recovery, then GIS reduction.
    let rrsp_income_tax = tax::cumulative_tax(base + rrsp_withdrawal, inputs.province)
        - tax::cumulative_tax(base, inputs.province);

    let total_income = base + rrsp_withdrawal;
    let oas_clawback = if total_income > tax::OAS_RECOVERY_THRESHOLD {
        tax::OAS_RECOVERY_RATE * (total_income - tax::OAS_RECOVERY_THRESHOLD.max(base))
    } else {
        0.0
    };

    let gis_clawback = if base < tax::GIS_ELIGIBILITY_THRESHOLD {
        tax::GIS_REDUCTION_RATE
            * rrsp_withdrawal.min(tax::GIS_ELIGIBILITY_THRESHOLD - base)
    } else {
        0.0
    };

    let rrsp_net_spendable = rrsp_withdrawal - rrsp_income_tax - oas_clawback - gis_clawback;

    let r = inputs.annual_return / 100.0;
    let mut tfsa_balance = tfsa_final;
    let mut rrsp_balance = rrsp_final;
    let mut trajectory = Vec::with_capacity(inputs.retirement_years as usize);
    for year in 1..=inputs.retirement_years {
        tfsa_balance = ((tfsa_balance - tfsa_withdrawal) * (1.0 + r)).max(0.0);
        rrsp_balance = ((rrsp_balance - rrsp_withdrawal) * (1.0 + r)).max(0.0);
        trajectory.push(DecumulationYear { year, tfsa_balance, rrsp_balance });
    }

    TfsaRrspResult {
        tfsa_final,
        rrsp_final,
        tfsa_withdrawal,
        rrsp_withdrawal,
        tfsa_net_spendable,
        rrsp_net_spendable,
        rrsp_income_tax,
        oas_clawback,
        gis_clawback,
        trajectory,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rrsp_shelters_more_principal() {
        let inputs = TfsaRrspInputs {
            initial_lump: 10_000.0,
            annual_contribution: 5_000.0,
            years: 20,
            annual_return: 7.0,
            current_marginal: 40.0,
            base_retirement_income: 25_000.0,
            swr: 4.0,
            retirement_years: 25,
            province: Province::ON,
        };
        let result = optimize(inputs);
        assert!(result.rrsp_final > result.tfsa_final);
        assert!((result.rrsp_final - result.tfsa_final / 0.6).abs() < 1.0);
    }

    #[test]
    fn equal_brackets_no_clawback_is_a_wash() {
        // Contribution-time and withdrawal-time rates agree (both sit in
        // the 29.65% ON band) and income stays clear of OAS/GIS: the two
        // wrappers net out the same.
        let inputs = TfsaRrspInputs {
            initial_lump: 10_000.0,
            annual_contribution: 2_000.0,
            years: 15,
            annual_return: 5.0,
            current_marginal: 29.65,
            base_retirement_income: 60_000.0,
            swr: 4.0,
            retirement_years: 10,
            province: Province::ON,
        };
        let result = optimize(inputs);
        assert_eq!(result.oas_clawback, 0.0);
        assert_eq!(result.gis_clawback, 0.0);
        // Withdrawal must stay inside the same band for the identity.
        assert!(60_000.0 + result.rrsp_withdrawal < 90_599.0);
        assert!(
            (result.tfsa_net_spendable - result.rrsp_net_spendable).abs() < 1.0,
            "tfsa {} vs rrsp {}",
            result.tfsa_net_spendable,
            result.rrsp_net_spendable
        );
    }

    #[test]
    fn gis_reduction_bites_low_income_retirees() {
        let inputs = TfsaRrspInputs {
            initial_lump: 50_000.0,
            annual_contribution: 5_000.0,
            years: 20,
            annual_return: 6.0,
            current_marginal: 30.0,
            base_retirement_income: 10_000.0,
            swr: 4.0,
            retirement_years: 25,
            province: Province::ON,
        };
        let result = optimize(inputs);
        assert!(result.gis_clawback > 0.0);
        assert!(result.rrsp_net_spendable < result.tfsa_net_spendable);
    }

    #[test]
    fn oas_clawback_engages_above_threshold() {
        let inputs = TfsaRrspInputs {
            initial_lump: 500_000.0,
            annual_contribution: 30_000.0,
            years: 25,
            annual_return: 7.0,
            current_marginal: 43.41,
            base_retirement_income: 70_000.0,
            swr: 4.0,
            retirement_years: 25,
            province: Province::ON,
        };
        let result = optimize(inputs);
        assert!(result.oas_clawback > 0.0);
    }

    #[test]
    fn trajectory_floors_at_zero() {
        let inputs = TfsaRrspInputs {
            initial_lump: 10_000.0,
            annual_contribution: 0.0,
            years: 1,
            annual_return: 0.0,
            current_marginal: 30.0,
            base_retirement_income: 20_000.0,
            swr: 50.0,
            retirement_years: 10,
            province: Province::ON,
        };
        let result = optimize(inputs);
        let last = result.trajectory.last().unwrap();
        assert_eq!(last.tfsa_balance, 0.0);
        assert_eq!(last.rrsp_balance, 0.0);
    }
}
