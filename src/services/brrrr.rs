// src/services/brrrr.rs
//
// Buy-Rehab-Rent-Refinance-Repeat engine: how much capital the refinance
// pulls back out, whether the tenant carries the new debt, and the DSCR a
// lender will underwrite against.

use serde::Serialize;

use crate::models::Scenario;
use crate::services::amort;

/// Operating expense proxy when no itemized costs exist yet.
pub const OPEX_RENT_FACTOR: f64 = 0.25;

pub const REFI_AMORT_YEARS: f64 = 30.0;

#[derive(Debug, Clone, Copy)]
pub struct BrrrrInputs {
    pub purchase_price: f64,
    pub rehab_cost: f64,
    pub holding_cost: f64,
    pub arv: f64,
    pub refi_ltv_pct: f64,
    pub refi_rate: f64,
    pub refi_costs: f64,
    pub monthly_rent: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BrrrrResult {
    pub total_invested: f64,
    pub new_loan: f64,
    pub cash_left_in_deal: f64,
    pub monthly_piti: f64,
    pub monthly_opex: f64,
    pub monthly_net: f64,
    pub dscr: f64,
    pub verdict: &'static str,
}

pub fn inputs_from(scenario: &Scenario) -> BrrrrInputs {
    BrrrrInputs {
        purchase_price: scenario.num("brrrr", "purchase_price", 400_000.0),
        rehab_cost: scenario.num("brrrr", "rehab_cost", 60_000.0),
        holding_cost: scenario.num("brrrr", "holding_cost", 12_000.0),
        arv: scenario.num("brrrr", "arv", 600_000.0),
        refi_ltv_pct: scenario.num("brrrr", "refi_ltv", 75.0).min(100.0),
        refi_rate: scenario.num("brrrr", "refi_rate", 5.5),
        refi_costs: scenario.num("brrrr", "refi_costs", 3_000.0),
        monthly_rent: scenario.num("brrrr", "monthly_rent", 3_200.0),
    }
}

pub fn analyze(inputs: BrrrrInputs) -> BrrrrResult {
    let total_invested = inputs.purchase_price + inputs.rehab_cost + inputs.holding_cost;

    // Refi loan against the after-repair value, rounded to the $1k a
    // lender would actually advance.
    let new_loan = (inputs.arv * inputs.refi_ltv_pct / 100.0 / 1_000.0).round() * 1_000.0;
    let cash_left_in_deal = total_invested - (new_loan - inputs.refi_costs);

    let monthly_piti = amort::monthly_payment(new_loan, inputs.refi_rate, REFI_AMORT_YEARS);
    let monthly_opex = inputs.monthly_rent * OPEX_RENT_FACTOR;
    let monthly_net = inputs.monthly_rent - monthly_piti - monthly_opex;

    let annual_debt_service = monthly_piti * 12.0;
    let dscr = if annual_debt_service > 0.0 {
        (inputs.monthly_rent - monthly_opex) * 12.0 / annual_debt_service
    } else {
        0.0
    };

    BrrrrResult {
        total_invested,
        new_loan,
        cash_left_in_deal,
        monthly_piti,
        monthly_opex,
        monthly_net,
        dscr,
        verdict: if cash_left_in_deal <= 0.0 && monthly_net > 0.0 {
            "Holy Grail"
        } else if monthly_net > 0.0 {
            "Cashflowing"
        } else {
            "Negative"
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_inputs() -> BrrrrInputs {
        BrrrrInputs {
            purchase_price: 400_000.0,
            rehab_cost: 60_000.0,
            holding_cost: 12_000.0,
            arv: 650_000.0,
            refi_ltv_pct: 75.0,
            refi_rate: 5.5,
            refi_costs: 3_000.0,
            monthly_rent: 3_800.0,
        }
    }

    #[test]
    fn refi_loan_rounds_to_thousands() {
        let result = analyze(base_inputs());
        assert_eq!(result.new_loan, 488_000.0);
        assert_eq!(result.new_loan % 1_000.0, 0.0);
    }

    #[test]
    fn cash_left_accounts_for_refi_costs() {
        let result = analyze(base_inputs());
        assert!((result.cash_left_in_deal - (472_000.0 - 485_000.0)).abs() < 0.01);
    }

    #[test]
    fn dscr_uses_noi_over_debt_service() {
        let result = analyze(base_inputs());
        let noi = (3_800.0 - 950.0) * 12.0;
        assert!((result.dscr - noi / (result.monthly_piti * 12.0)).abs() < 1e-9);
    }

    #[test]
    fn full_capital_recovery_with_cashflow_is_the_holy_grail() {
        let result = analyze(base_inputs());
        assert!(result.cash_left_in_deal <= 0.0);
        assert!(result.monthly_net > 0.0, "net {}", result.monthly_net);
        assert_eq!(result.verdict, "Holy Grail");
    }

    #[test]
    fn thin_rent_turns_the_verdict_negative() {
        let mut inputs = base_inputs();
        inputs.monthly_rent = 2_000.0;
        let result = analyze(inputs);
        assert!(result.monthly_net < 0.0);
        assert_eq!(result.verdict, "Negative");
    }

    #[test]
    fn cash_heavy_deal_is_merely_cashflowing() {
        let mut inputs = base_inputs();
        inputs.arv = 500_000.0;
        let result = analyze(inputs);
        assert!(result.cash_left_in_deal > 0.0);
        assert_eq!(result.verdict, "Cashflowing");
    }
}
