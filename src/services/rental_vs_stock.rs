// src/services/rental_vs_stock.rs
//
// Levered rental against an unlevered index position over the same
// horizon, seeded with the provincial gross yield from the current intel
// snapshot. Annual steps, interest-only debt, a one-third operating drag
// on gross rent.

use serde::Serialize;

use crate::models::{MarketIntel, Scenario};

#[derive(Debug, Clone, Copy)]
pub struct RentalVsStockInputs {
    pub capital: f64,
    pub ltv_pct: f64,
    pub gross_yield_pct: f64,
    pub property_appreciation: f64,
    pub mortgage_rate: f64,
    pub stock_return: f64,
    pub years: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct RentalVsStockResult {
    pub property_price: f64,
    pub gross_yield_pct: f64,
    pub rental_terminal_wealth: f64,
    pub stock_terminal_wealth: f64,
    pub verdict: &'static str,
}

pub fn inputs_from(scenario: &Scenario, intel: &MarketIntel) -> RentalVsStockInputs {
    let province = scenario.province();
    let gross_yield = intel
        .provincial_yields
        .get(province.code())
        .copied()
        .unwrap_or(4.5);
    RentalVsStockInputs {
        capital: scenario.num("rental_vs_stock", "capital", 150_000.0),
        ltv_pct: scenario.num("rental_vs_stock", "ltv", 75.0).min(95.0),
        gross_yield_pct: scenario.num("rental_vs_stock", "gross_yield", gross_yield),
        property_appreciation: scenario.num("rental_vs_stock", "appreciation", 3.0),
        mortgage_rate: scenario.num("rental_vs_stock", "mortgage_rate", 5.0),
        stock_return: scenario.num("rental_vs_stock", "stock_return", 7.0),
        years: scenario.num("rental_vs_stock", "years", 20.0).max(1.0) as u32,
    }
}

pub fn compare(inputs: RentalVsStockInputs) -> RentalVsStockResult {
    // The capital is the down payment; leverage buys the rest.
    let property_price = inputs.capital / (1.0 - inputs.ltv_pct / 100.0).max(0.05);
    let loan = property_price - inputs.capital;

    let mut property_value = property_price;
    let mut rental_cash = 0.0;
    let mut stock = inputs.capital;

    for _ in 0..inputs.years {
        // Net rental carry: gross yield on value, less interest-only debt
        // cost and a third of gross for operating drag.
        let gross_rent = property_value * inputs.gross_yield_pct / 100.0;
        let carry = gross_rent * (1.0 - 1.0 / 3.0) - loan * inputs.mortgage_rate / 100.0;
        rental_cash = rental_cash * (1.0 + inputs.stock_return / 100.0) + carry;
        property_value *= 1.0 + inputs.property_appreciation / 100.0;
        stock *= 1.0 + inputs.stock_return / 100.0;
    }

    let rental_terminal_wealth = property_value - loan + rental_cash;
    RentalVsStockResult {
        property_price,
        gross_yield_pct: inputs.gross_yield_pct,
        rental_terminal_wealth,
        stock_terminal_wealth: stock,
        verdict: if rental_terminal_wealth > stock {
            "rental"
        } else {
            "stock"
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::market_intel;

    #[test]
    fn leverage_sets_the_purchase_price() {
        let inputs = RentalVsStockInputs {
            capital: 150_000.0,
            ltv_pct: 75.0,
            gross_yield_pct: 5.0,
            property_appreciation: 3.0,
            mortgage_rate: 5.0,
            stock_return: 7.0,
            years: 20,
        };
        let result = compare(inputs);
        assert!((result.property_price - 600_000.0).abs() < 0.01);
    }

    #[test]
    fn provincial_yield_seeds_the_default() {
        let intel = market_intel::fallback_snapshot();
        let mut scenario = Scenario::new();
        scenario.set("profile", "province", serde_json::json!("AB"));
        let inputs = inputs_from(&scenario, &intel);
        assert_eq!(inputs.gross_yield_pct, intel.provincial_yields["AB"]);
    }

    #[test]
    fn zero_yield_zero_appreciation_loses_to_stocks() {
        let inputs = RentalVsStockInputs {
            capital: 100_000.0,
            ltv_pct: 75.0,
            gross_yield_pct: 0.0,
            property_appreciation: 0.0,
            mortgage_rate: 5.0,
            stock_return: 7.0,
            years: 15,
        };
        assert_eq!(compare(inputs).verdict, "stock");
    }
}
