// src/handlers/analysis.rs
//
// One thin async shim per analysis: snapshot the scenario, grab the
// current intel, call the pure engine function, serialize. The pro gate
// lives here and only here; the engine modules know nothing about tiers.

use log::{debug, warn};
use std::sync::Arc;
use warp::reply::Json;
use warp::Rejection;

use super::error::ApiError;
use super::scenario::SessionQuery;
use super::AppState;
use crate::services::{
    affordability, amort, brrrr, budget, buy_vs_rent, fire, land_residual, net_sheet, net_worth,
    pay_vs_invest, rental, rental_vs_stock, renewal, smith, tfsa_rrsp,
};

/// Membership check for pro-gated analyses. Anonymous sessions are gated
/// the same way named ones are.
async fn require_pro(state: &AppState, query: &SessionQuery) -> Result<(), Rejection> {
    let user = query.user.as_deref().unwrap_or("anonymous");
    let status = state.membership.status(user).await;
    if status.is_pro {
        Ok(())
    } else {
        warn!("pro analysis blocked for {} (tier {:?})", user, status.tier);
        Err(warp::reject::custom(ApiError::entitlement_error(format!(
            "analysis requires a pro membership (current tier {:?})",
            status.tier
        ))))
    }
}

pub async fn get_affordability(state: Arc<AppState>) -> Result<Json, Rejection> {
    debug!("Running affordability analysis");
    let scenario = state.scenario.snapshot();
    Ok(warp::reply::json(&affordability::analyze(&scenario)))
}

pub async fn get_closing_costs(state: Arc<AppState>) -> Result<Json, Rejection> {
    let scenario = state.scenario.snapshot();
    let intel = state.intel.current();
    Ok(warp::reply::json(&affordability::closing_costs(&scenario, &intel)))
}

pub async fn get_rental(state: Arc<AppState>) -> Result<Json, Rejection> {
    let scenario = state.scenario.snapshot();
    Ok(warp::reply::json(&rental::analyze(&scenario)))
}

pub async fn get_buy_vs_rent(state: Arc<AppState>) -> Result<Json, Rejection> {
    let scenario = state.scenario.snapshot();
    Ok(warp::reply::json(&buy_vs_rent::compare(buy_vs_rent::inputs_from(&scenario))))
}

pub async fn get_smith(query: SessionQuery, state: Arc<AppState>) -> Result<Json, Rejection> {
    require_pro(&state, &query).await?;
    let scenario = state.scenario.snapshot();
    Ok(warp::reply::json(&smith::simulate(smith::inputs_from(&scenario))))
}

pub async fn get_smith_stress(
    query: SessionQuery,
    state: Arc<AppState>,
) -> Result<Json, Rejection> {
    require_pro(&state, &query).await?;
    let scenario = state.scenario.snapshot();
    let crash = smith::CrashParams {
        crash_year: scenario.num("smith_maneuver", "stress_crash_year", 10.0).max(1.0) as u32,
        drop_pct: scenario.num("smith_maneuver", "stress_drop", 35.0).min(100.0),
        recovery_years: scenario.num("smith_maneuver", "stress_recovery", 3.0) as u32,
    };
    Ok(warp::reply::json(&smith::simulate_stress(
        smith::inputs_from(&scenario),
        crash,
    )))
}

pub async fn get_tfsa_rrsp(query: SessionQuery, state: Arc<AppState>) -> Result<Json, Rejection> {
    require_pro(&state, &query).await?;
    let scenario = state.scenario.snapshot();
    Ok(warp::reply::json(&tfsa_rrsp::optimize(tfsa_rrsp::inputs_from(&scenario))))
}

pub async fn get_fire(state: Arc<AppState>) -> Result<Json, Rejection> {
    let scenario = state.scenario.snapshot();
    Ok(warp::reply::json(&fire::analyze(fire::inputs_from(&scenario))))
}

pub async fn get_renewal(state: Arc<AppState>) -> Result<Json, Rejection> {
    let scenario = state.scenario.snapshot();
    Ok(warp::reply::json(&renewal::simulate(renewal::inputs_from(&scenario))))
}

pub async fn get_land_residual(
    query: SessionQuery,
    state: Arc<AppState>,
) -> Result<Json, Rejection> {
    require_pro(&state, &query).await?;
    let scenario = state.scenario.snapshot();
    Ok(warp::reply::json(&land_residual::analyze(&land_residual::inputs_from(&scenario))))
}

pub async fn get_net_sheet(query: SessionQuery, state: Arc<AppState>) -> Result<Json, Rejection> {
    require_pro(&state, &query).await?;
    let scenario = state.scenario.snapshot();
    Ok(warp::reply::json(&net_sheet::compute(&net_sheet::inputs_from(&scenario))))
}

pub async fn get_brrrr(query: SessionQuery, state: Arc<AppState>) -> Result<Json, Rejection> {
    require_pro(&state, &query).await?;
    let scenario = state.scenario.snapshot();
    Ok(warp::reply::json(&brrrr::analyze(brrrr::inputs_from(&scenario))))
}

pub async fn get_budget(state: Arc<AppState>) -> Result<Json, Rejection> {
    let scenario = state.scenario.snapshot();
    Ok(warp::reply::json(&budget::analyze(&scenario)))
}

pub async fn get_net_worth(state: Arc<AppState>) -> Result<Json, Rejection> {
    let scenario = state.scenario.snapshot();
    Ok(warp::reply::json(&net_worth::analyze(&scenario)))
}

pub async fn get_pay_vs_invest(state: Arc<AppState>) -> Result<Json, Rejection> {
    let scenario = state.scenario.snapshot();
    Ok(warp::reply::json(&pay_vs_invest::compare(pay_vs_invest::inputs_from(&scenario))))
}

pub async fn get_rental_vs_stock(state: Arc<AppState>) -> Result<Json, Rejection> {
    let scenario = state.scenario.snapshot();
    let intel = state.intel.current();
    Ok(warp::reply::json(&rental_vs_stock::compare(rental_vs_stock::inputs_from(
        &scenario, &intel,
    ))))
}

pub async fn get_simple_mortgage(state: Arc<AppState>) -> Result<Json, Rejection> {
    let scenario = state.scenario.snapshot();
    let principal = scenario.num("simple_mortgage", "principal", 500_000.0);
    let rate = scenario.num("simple_mortgage", "rate", 5.0);
    let years = scenario.num("simple_mortgage", "amort_years", 25.0).max(1.0);
    let extra = scenario.num("simple_mortgage", "extra_monthly", 0.0);
    let frequency = if scenario.text("simple_mortgage", "frequency", "monthly")
        == "biweekly_accelerated"
    {
        amort::PaymentFrequency::BiweeklyAccelerated
    } else {
        amort::PaymentFrequency::Monthly
    };

    let rows: Vec<_> =
        amort::schedule_until_paid_off(principal, rate, years, extra, frequency).collect();
    let total_interest = rows.last().map(|r| r.cum_interest).unwrap_or(0.0);
    let months = rows.len();
    let first_year: Vec<_> = rows.into_iter().take(12).collect();

    Ok(warp::reply::json(&serde_json::json!({
        "monthly_payment": amort::monthly_payment(principal, rate, years),
        "months_to_payoff": months,
        "total_interest": total_interest,
        "first_year": first_year,
    })))
}
