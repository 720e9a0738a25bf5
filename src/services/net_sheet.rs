// src/services/net_sheet.rs
//
// Seller's net sheet: what actually hits the seller's account after the
// mortgage, commissions and their GST, the discharge penalty, fees and any
// capital-gains tax on an investment disposition or a flip.

use serde::Serialize;

use crate::models::Scenario;
use crate::services::tax;

pub const GST_RATE: f64 = 0.05;

/// IRD approximation factor on fixed-rate discharges.
pub const IRD_FACTOR: f64 = 0.015;

#[derive(Debug, Clone)]
pub struct NetSheetInputs {
    pub sale_price: f64,
    pub mortgage_balance: f64,
    pub mortgage_rate: f64,
    pub months_remaining: f64,
    pub mortgage_is_variable: bool,
    pub commission_tier1_pct: f64,
    pub commission_rem_pct: f64,
    pub legal_fees: f64,
    pub adjustments: f64,
    pub staging: f64,
    pub is_investment: bool,
    pub is_flip: bool,
    pub acb: f64,
    pub marginal_rate: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct NetSheetResult {
    pub commission: f64,
    pub commission_gst: f64,
    pub discharge_penalty: f64,
    pub capital_gains_tax: f64,
    pub other_costs: f64,
    pub net_proceeds: f64,
}

pub fn inputs_from(scenario: &Scenario) -> NetSheetInputs {
    NetSheetInputs {
        sale_price: scenario.num("sales_proceeds", "sale_price", 900_000.0),
        mortgage_balance: scenario.num("sales_proceeds", "mortgage_balance", 400_000.0),
        mortgage_rate: scenario.num("sales_proceeds", "mortgage_rate", 5.0),
        months_remaining: scenario.num("sales_proceeds", "months_remaining", 24.0),
        mortgage_is_variable: scenario.text("sales_proceeds", "mortgage_type", "Fixed") == "Variable",
        commission_tier1_pct: scenario.num("sales_proceeds", "commission_tier1_pct", 7.0),
        commission_rem_pct: scenario.num("sales_proceeds", "commission_rem_pct", 2.5),
        legal_fees: scenario.num("sales_proceeds", "legal_fees", 1_500.0),
        adjustments: scenario.num("sales_proceeds", "adjustments", 500.0),
        staging: scenario.num("sales_proceeds", "staging", 0.0),
        is_investment: scenario.text("sales_proceeds", "property_use", "Primary") == "Investment",
        is_flip: scenario.flag("sales_proceeds", "is_flip", false),
        acb: scenario.num("sales_proceeds", "acb", 0.0),
        marginal_rate: scenario.num("sales_proceeds", "marginal_rate", 43.41),
    }
}

/// Tiered listing commission: tier-1 on the first $100k, the remainder
/// rate on everything above.
fn commission(sale_price: f64, tier1_pct: f64, rem_pct: f64) -> f64 {
    let tier1_base = sale_price.min(100_000.0);
    tier1_base * tier1_pct / 100.0 + (sale_price - 100_000.0).max(0.0) * rem_pct / 100.0
}

/// Discharge penalty: three months' interest on a variable, the greater of
/// that and the IRD approximation on a fixed.
fn discharge_penalty(inputs: &NetSheetInputs) -> f64 {
    let three_months_interest =
        3.0 * inputs.mortgage_balance * inputs.mortgage_rate / 100.0 / 12.0;
    if inputs.mortgage_is_variable {
        three_months_interest
    } else {
        let ird =
            inputs.mortgage_balance * IRD_FACTOR * inputs.months_remaining / 12.0;
        three_months_interest.max(ird)
    }
}

pub fn compute(inputs: &NetSheetInputs) -> NetSheetResult {
    let commission = commission(
        inputs.sale_price,
        inputs.commission_tier1_pct,
        inputs.commission_rem_pct,
    );
    let commission_gst = commission * GST_RATE;
    let discharge_penalty = discharge_penalty(inputs);

    // Capital gains only on investment property or a flip; flips are fully
    // included as business income, everything else at the inclusion rate.
    let capital_gains_tax = if inputs.is_investment || inputs.is_flip {
        let inclusion = if inputs.is_flip { 1.0 } else { tax::CAPITAL_GAINS_INCLUSION };
        let net_gain = (inputs.sale_price - inputs.acb).max(0.0);
        inclusion * net_gain * inputs.marginal_rate / 100.0
    } else {
        0.0
    };

    let other_costs = inputs.legal_fees + inputs.adjustments + inputs.staging;
    let net_proceeds = inputs.sale_price
        - inputs.mortgage_balance
        - commission
        - commission_gst
        - discharge_penalty
        - other_costs
        - capital_gains_tax;

    NetSheetResult {
        commission,
        commission_gst,
        discharge_penalty,
        capital_gains_tax,
        other_costs,
        net_proceeds,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_inputs() -> NetSheetInputs {
        NetSheetInputs {
            sale_price: 900_000.0,
            mortgage_balance: 400_000.0,
            mortgage_rate: 5.0,
            months_remaining: 24.0,
            mortgage_is_variable: false,
            commission_tier1_pct: 7.0,
            commission_rem_pct: 2.5,
            legal_fees: 1_500.0,
            adjustments: 500.0,
            staging: 2_000.0,
            is_investment: false,
            is_flip: false,
            acb: 600_000.0,
            marginal_rate: 43.41,
        }
    }

    #[test]
    fn commission_tiers_hand_computed() {
        // 100k at 7% + 800k at 2.5% = 7,000 + 20,000.
        let result = compute(&base_inputs());
        assert!((result.commission - 27_000.0).abs() < 0.01);
        assert!((result.commission_gst - 1_350.0).abs() < 0.01);
    }

    #[test]
    fn fixed_penalty_takes_the_larger_of_ird_and_interest() {
        // 3 months interest = 400k * 5% / 4 = 5,000.
        // IRD proxy = 400k * 1.5% * 2 = 12,000.
        let result = compute(&base_inputs());
        assert!((result.discharge_penalty - 12_000.0).abs() < 0.01);

        let mut variable = base_inputs();
        variable.mortgage_is_variable = true;
        let result = compute(&variable);
        assert!((result.discharge_penalty - 5_000.0).abs() < 0.01);
    }

    #[test]
    fn primary_residence_pays_no_capital_gains() {
        let result = compute(&base_inputs());
        assert_eq!(result.capital_gains_tax, 0.0);
    }

    #[test]
    fn investment_sale_taxes_half_the_gain() {
        let mut inputs = base_inputs();
        inputs.is_investment = true;
        let result = compute(&inputs);
        let expected = 0.5 * 300_000.0 * 0.4341;
        assert!((result.capital_gains_tax - expected).abs() < 0.01);
    }

    #[test]
    fn flip_is_fully_included() {
        let mut inputs = base_inputs();
        inputs.is_flip = true;
        let result = compute(&inputs);
        let expected = 1.0 * 300_000.0 * 0.4341;
        assert!((result.capital_gains_tax - expected).abs() < 0.01);
    }

    #[test]
    fn underwater_gain_is_floored_at_zero() {
        let mut inputs = base_inputs();
        inputs.is_investment = true;
        inputs.acb = 1_200_000.0;
        let result = compute(&inputs);
        assert_eq!(result.capital_gains_tax, 0.0);
    }

    #[test]
    fn net_proceeds_sums_every_line() {
        let result = compute(&base_inputs());
        let expected = 900_000.0 - 400_000.0 - 27_000.0 - 1_350.0 - 12_000.0 - 4_000.0;
        assert!((result.net_proceeds - expected).abs() < 0.01);
    }
}
