// src/services/buy_vs_rent.rs
//
// Owner-vs-renter wealth race. Both parties commit the same housing budget:
// the owner services the mortgage and sunk costs, the renter pays rent and
// invests the difference (down payment included) at the stock return. The
// race runs monthly and reports year-end rows.

use serde::Serialize;

use crate::models::Scenario;
use crate::services::amort;

/// Disposition cost assumed when marking the owner to market.
pub const SELLING_COST_PCT: f64 = 5.0;

#[derive(Debug, Clone, Copy)]
pub struct BuyVsRentInputs {
    pub home_price: f64,
    pub down_payment: f64,
    pub mortgage_rate: f64,
    pub amort_years: f64,
    pub annual_prop_tax: f64,
    pub annual_maintenance: f64,
    pub appreciation: f64,
    pub rent: f64,
    pub rent_increase: f64,
    pub stock_return: f64,
    pub years: u32,
    pub selling_cost_pct: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BuyVsRentYearRow {
    pub year: u32,
    pub home_value: f64,
    pub mortgage_balance: f64,
    pub owner_net_wealth: f64,
    pub owner_sunk_to_date: f64,
    pub renter_wealth: f64,
    pub monthly_rent: f64,
    pub monthly_savings_gap: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BuyVsRentResult {
    pub years: Vec<BuyVsRentYearRow>,
    pub break_even_year: Option<u32>,
}

pub fn inputs_from(scenario: &Scenario) -> BuyVsRentInputs {
    BuyVsRentInputs {
        home_price: scenario.num("buy_vs_rent", "home_price", 800_000.0),
        down_payment: scenario.num("buy_vs_rent", "down_payment", 160_000.0),
        mortgage_rate: scenario.num("buy_vs_rent", "mortgage_rate", 5.0),
        amort_years: scenario.num("buy_vs_rent", "amort_years", 25.0).max(1.0),
        annual_prop_tax: scenario.num("buy_vs_rent", "prop_tax", 4_000.0),
        annual_maintenance: scenario.num("buy_vs_rent", "maintenance", 8_000.0),
        appreciation: scenario.num("buy_vs_rent", "appreciation", 3.0),
        rent: scenario.num("buy_vs_rent", "rent", 2_600.0),
        rent_increase: scenario.num("buy_vs_rent", "rent_inc", 2.5),
        stock_return: scenario.num("buy_vs_rent", "stock_return", 7.0),
        years: scenario.num("buy_vs_rent", "years", 25.0).max(1.0) as u32,
        selling_cost_pct: SELLING_COST_PCT,
    }
}

pub fn compare(inputs: BuyVsRentInputs) -> BuyVsRentResult {
    let loan = (inputs.home_price - inputs.down_payment).max(0.0);
    let payment = amort::monthly_payment(loan, inputs.mortgage_rate, inputs.amort_years);
    let m_rate = inputs.mortgage_rate / 100.0 / 12.0;
    let app_rate = inputs.appreciation / 100.0 / 12.0;
    let stock_rate = inputs.stock_return / 100.0 / 12.0;

    let mut home_value = inputs.home_price;
    let mut balance = loan;
    let mut sunk_to_date = 0.0;
    // The renter's head start is the down payment they did not spend.
    let mut portfolio = inputs.down_payment;
    let mut rent = inputs.rent;

    let mut years = Vec::new();
    let mut break_even_year = None;

    for year in 1..=inputs.years {
        let mut gap = 0.0;
        for _ in 0..12 {
            let interest = balance * m_rate;
            let principal = (payment - interest).max(0.0).min(balance);
            balance -= principal;

            let owner_outlay = if balance > 0.0 || principal > 0.0 {
                payment + inputs.annual_prop_tax / 12.0 + inputs.annual_maintenance / 12.0
            } else {
                inputs.annual_prop_tax / 12.0 + inputs.annual_maintenance / 12.0
            };
            sunk_to_date += interest + inputs.annual_prop_tax / 12.0 + inputs.annual_maintenance / 12.0;

            // Negative gap means the renter draws down to keep pace.
            gap = owner_outlay - rent;
            portfolio = (portfolio + gap) * (1.0 + stock_rate);
            home_value *= 1.0 + app_rate;
        }

        let owner_net_wealth =
            home_value - balance - home_value * inputs.selling_cost_pct / 100.0;
        if break_even_year.is_none() && owner_net_wealth >= portfolio {
            break_even_year = Some(year);
        }

        years.push(BuyVsRentYearRow {
            year,
            home_value,
            mortgage_balance: balance,
            owner_net_wealth,
            owner_sunk_to_date: sunk_to_date,
            renter_wealth: portfolio,
            monthly_rent: rent,
            monthly_savings_gap: gap,
        });

        rent *= 1.0 + inputs.rent_increase / 100.0;
    }

    BuyVsRentResult { years, break_even_year }
}
