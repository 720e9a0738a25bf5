// src/services/land_residual.rs
//
// Developer's land-residual pro-forma: back into the most a builder can
// pay for dirt given what the finished product sells for, what it costs to
// build, and the profit the project must clear. The cashflow curve uses a
// flat spend during construction and a flat sell-out after, the way these
// are penciled at the letter-of-intent stage.

use serde::Serialize;

use crate::models::Scenario;

#[derive(Debug, Clone)]
pub struct LandResidualInputs {
    pub lot_sf: f64,
    pub fsr: f64,
    pub sell_per_sf: f64,
    pub hard_per_sf: f64,
    pub soft_pct: f64,
    pub city_fees_per_sf: f64,
    pub profit_pct: f64,
    pub ltc_pct: f64,
    pub finance_rate: f64,
    pub project_months: u32,
    pub product_type: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CashflowMonth {
    pub month: u32,
    pub net_flow: f64,
    pub cumulative: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct LandResidualResult {
    pub buildable_sf: f64,
    pub gdv: f64,
    pub target_profit: f64,
    pub construction_cost: f64,
    pub finance_cost: f64,
    pub residual_land_value: f64,
    pub equity_required: f64,
    pub return_on_equity: f64,
    pub sell_months: u32,
    pub peak_exposure: f64,
    pub cashflow: Vec<CashflowMonth>,
}

pub fn inputs_from(scenario: &Scenario) -> LandResidualInputs {
    LandResidualInputs {
        lot_sf: scenario.num("land_residual", "lot_sf", 10_000.0),
        fsr: scenario.num("land_residual", "fsr", 2.5),
        sell_per_sf: scenario.num("land_residual", "sell_per_sf", 1_100.0),
        hard_per_sf: scenario.num("land_residual", "hard_per_sf", 350.0),
        soft_pct: scenario.num("land_residual", "soft_pct", 15.0),
        city_fees_per_sf: scenario.num("land_residual", "city_fees_per_sf", 60.0),
        profit_pct: scenario.num("land_residual", "profit_pct", 15.0),
        ltc_pct: scenario.num("land_residual", "ltc_pct", 65.0),
        finance_rate: scenario.num("land_residual", "finance_rate", 8.0),
        project_months: scenario.num("land_residual", "project_months", 30.0).max(1.0) as u32,
        product_type: scenario.text("land_residual", "product_type", "Condo"),
    }
}

/// Sell-out window by product: condos close in bulk, ground-oriented
/// product trickles out faster.
fn sell_out_months(product_type: &str) -> u32 {
    match product_type {
        "Condo" => 18,
        "Townhouse" => 12,
        _ => 6,
    }
}

pub fn analyze(inputs: &LandResidualInputs) -> LandResidualResult {
    let buildable_sf = inputs.lot_sf * inputs.fsr;
    let gdv = buildable_sf * inputs.sell_per_sf;
    let target_profit = gdv * inputs.profit_pct / 100.0;

    let hard = buildable_sf * inputs.hard_per_sf;
    let soft = hard * inputs.soft_pct / 100.0;
    let city = buildable_sf * inputs.city_fees_per_sf;
    let construction_cost = hard + soft + city;

    // Average-balance approximation: half the construction debt
    // outstanding over the build at the facility rate.
    let finance_cost = 0.5
        * construction_cost
        * inputs.finance_rate
        / 100.0
        * inputs.project_months as f64
        / 12.0;

    let residual_land_value = gdv - target_profit - construction_cost - finance_cost;

    let financed = inputs.ltc_pct / 100.0 * (gdv - target_profit);
    let equity_required = (gdv - target_profit - financed).max(0.0);
    let return_on_equity = if equity_required > 0.0 {
        target_profit / equity_required
    } else {
        0.0
    };

    let sell_months = sell_out_months(&inputs.product_type);
    let monthly_cost =
        (construction_cost + finance_cost) / inputs.project_months as f64;
    let monthly_revenue = gdv / sell_months as f64;

    let mut cumulative = -residual_land_value;
    let mut peak_exposure = cumulative;
    let mut cashflow = Vec::new();
    for month in 1..=(inputs.project_months + sell_months) {
        let net_flow = if month <= inputs.project_months {
            -monthly_cost
        } else {
            monthly_revenue
        };
        cumulative += net_flow;
        peak_exposure = peak_exposure.min(cumulative);
        cashflow.push(CashflowMonth { month, net_flow, cumulative });
    }

    LandResidualResult {
        buildable_sf,
        gdv,
        target_profit,
        construction_cost,
        finance_cost,
        residual_land_value,
        equity_required,
        return_on_equity,
        sell_months,
        peak_exposure,
        cashflow,
    }
}
