// src/services/fire.rs
//
// Standard, Coast and Barista FIRE arithmetic. The projection loop runs
// monthly so contribution timing matters the way it does in a real
// account, and an unreachable target degrades to a status instead of
// spinning forever.

use serde::Serialize;

use crate::models::Scenario;

/// Projection cap, months. Past this the target is reported unreachable.
pub const MAX_PROJECTION_MONTHS: u32 = 1200;

#[derive(Debug, Clone, Copy)]
pub struct FireInputs {
    pub current_age: f64,
    pub invested: f64,
    pub monthly_contribution: f64,
    pub annual_return: f64,
    pub target_annual_spend: f64,
    pub swr: f64,
    pub coast_target_age: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct FireResult {
    pub fire_number: f64,
    pub years_to_fire: f64,
    pub fire_age: f64,
    pub coast_number: f64,
    pub coast_attained: bool,
    pub projected_at_target_age: f64,
    pub barista_shortfall: f64,
    pub status: &'static str,
}

pub fn inputs_from(scenario: &Scenario) -> FireInputs {
    FireInputs {
        current_age: scenario.num("retire_calc", "current_age", 35.0).max(1.0),
        invested: scenario.num("retire_calc", "invested", 0.0),
        monthly_contribution: scenario.num("retire_calc", "monthly_contribution", 0.0),
        annual_return: scenario.num("retire_calc", "annual_return", 7.0),
        target_annual_spend: scenario.num("retire_calc", "target_spend", 60_000.0),
        swr: scenario.num("retire_calc", "swr", 4.0).max(0.1),
        coast_target_age: scenario.num("coast_fire", "target_age", 65.0),
    }
}

pub fn analyze(inputs: FireInputs) -> FireResult {
    let swr = inputs.swr / 100.0;
    let fire_number = inputs.target_annual_spend / swr;
    let monthly_rate = inputs.annual_return / 100.0 / 12.0;

    // Months until the balance crosses the FIRE number.
    let mut balance = inputs.invested;
    let mut months = 0u32;
    let mut status = "reachable";
    if balance < fire_number {
        loop {
            if months >= MAX_PROJECTION_MONTHS {
                status = "unreachable";
                break;
            }
            balance = balance * (1.0 + monthly_rate) + inputs.monthly_contribution;
            months += 1;
            if balance >= fire_number {
                break;
            }
        }
    }
    let years_to_fire = if status == "unreachable" {
        f64::INFINITY
    } else {
        months as f64 / 12.0
    };

    // Coast: the balance that compounds to the FIRE number by the target
    // age without another dollar contributed.
    let years_to_target = (inputs.coast_target_age - inputs.current_age).max(0.0);
    let annual_growth = (1.0 + inputs.annual_return / 100.0).powf(years_to_target);
    let coast_number = fire_number / annual_growth;
    let projected_at_target_age = inputs.invested * annual_growth;
    let barista_shortfall =
        (inputs.target_annual_spend - projected_at_target_age * swr).max(0.0);

    FireResult {
        fire_number,
        years_to_fire,
        fire_age: if years_to_fire.is_finite() {
            inputs.current_age + years_to_fire
        } else {
            f64::INFINITY
        },
        coast_number,
        coast_attained: inputs.invested >= coast_number,
        projected_at_target_age,
        barista_shortfall,
        status,
    }
}
