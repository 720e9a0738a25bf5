// src/routes.rs
use std::convert::Infallible;
use std::sync::Arc;

use log::info;
use warp::reject::Rejection;
use warp::{Filter, Reply};

use crate::handlers::error::ApiError;
use crate::handlers::{analysis, banklink, intel, scenario, AppState};

// Recovery handling for our custom errors.
async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let (code, message) = if err.is_not_found() {
        (warp::http::StatusCode::NOT_FOUND, "Not Found".to_string())
    } else if let Some(api_error) = err.find::<ApiError>() {
        (api_error.status(), api_error.message.clone())
    } else {
        (
            warp::http::StatusCode::INTERNAL_SERVER_ERROR,
            "Internal Server Error".to_string(),
        )
    };

    Ok(warp::reply::with_status(
        warp::reply::json(&serde_json::json!({
            "error": message,
        })),
        code,
    ))
}

pub fn routes(state: Arc<AppState>) -> impl Filter<Extract = impl Reply, Error = Infallible> + Clone {
    info!("Configuring routes...");

    let state_filter = warp::any().map(move || state.clone());

    let intel_route = warp::path!("api" / "v1" / "intel")
        .and(warp::get())
        .and(state_filter.clone())
        .and_then(intel::get_intel);

    let intel_refresh_route = warp::path!("api" / "v1" / "intel" / "refresh")
        .and(warp::post())
        .and(state_filter.clone())
        .and_then(intel::refresh_intel);

    let scenario_get_route = warp::path!("api" / "v1" / "scenario" / String)
        .and(warp::get())
        .and(state_filter.clone())
        .and_then(scenario::get_section);

    let scenario_put_route = warp::path!("api" / "v1" / "scenario" / String / String)
        .and(warp::put())
        .and(warp::query())
        .and(warp::body::json())
        .and(state_filter.clone())
        .and_then(scenario::put_field);

    let hydrate_route = warp::path!("api" / "v1" / "scenario" / "hydrate")
        .and(warp::post())
        .and(warp::query())
        .and(state_filter.clone())
        .and_then(scenario::hydrate);

    let banklink_create_route = warp::path!("api" / "v1" / "banklink" / "create")
        .and(warp::post())
        .and(warp::query())
        .and(state_filter.clone())
        .and_then(banklink::create_link);

    let banklink_finalize_route = warp::path!("api" / "v1" / "banklink" / "finalize")
        .and(warp::post())
        .and(warp::query())
        .and(warp::body::json())
        .and(state_filter.clone())
        .and_then(banklink::finalize_link);

    // Open analyses.
    let affordability_route = warp::path!("api" / "v1" / "analysis" / "affordability")
        .and(warp::get())
        .and(state_filter.clone())
        .and_then(analysis::get_affordability);

    let closing_costs_route = warp::path!("api" / "v1" / "analysis" / "closing_costs")
        .and(warp::get())
        .and(state_filter.clone())
        .and_then(analysis::get_closing_costs);

    let rental_route = warp::path!("api" / "v1" / "analysis" / "rental")
        .and(warp::get())
        .and(state_filter.clone())
        .and_then(analysis::get_rental);

    let buy_vs_rent_route = warp::path!("api" / "v1" / "analysis" / "buy_vs_rent")
        .and(warp::get())
        .and(state_filter.clone())
        .and_then(analysis::get_buy_vs_rent);

    let fire_route = warp::path!("api" / "v1" / "analysis" / "fire")
        .and(warp::get())
        .and(state_filter.clone())
        .and_then(analysis::get_fire);

    let renewal_route = warp::path!("api" / "v1" / "analysis" / "renewal")
        .and(warp::get())
        .and(state_filter.clone())
        .and_then(analysis::get_renewal);

    let budget_route = warp::path!("api" / "v1" / "analysis" / "budget")
        .and(warp::get())
        .and(state_filter.clone())
        .and_then(analysis::get_budget);

    let net_worth_route = warp::path!("api" / "v1" / "analysis" / "net_worth")
        .and(warp::get())
        .and(state_filter.clone())
        .and_then(analysis::get_net_worth);

    let pay_vs_invest_route = warp::path!("api" / "v1" / "analysis" / "pay_vs_invest")
        .and(warp::get())
        .and(state_filter.clone())
        .and_then(analysis::get_pay_vs_invest);

    let rental_vs_stock_route = warp::path!("api" / "v1" / "analysis" / "rental_vs_stock")
        .and(warp::get())
        .and(state_filter.clone())
        .and_then(analysis::get_rental_vs_stock);

    let simple_mortgage_route = warp::path!("api" / "v1" / "analysis" / "simple_mortgage")
        .and(warp::get())
        .and(state_filter.clone())
        .and_then(analysis::get_simple_mortgage);

    // Pro-gated analyses carry the session query for the membership check.
    let smith_route = warp::path!("api" / "v1" / "analysis" / "smith")
        .and(warp::get())
        .and(warp::query())
        .and(state_filter.clone())
        .and_then(analysis::get_smith);

    let smith_stress_route = warp::path!("api" / "v1" / "analysis" / "smith_stress")
        .and(warp::get())
        .and(warp::query())
        .and(state_filter.clone())
        .and_then(analysis::get_smith_stress);

    let tfsa_rrsp_route = warp::path!("api" / "v1" / "analysis" / "tfsa_rrsp")
        .and(warp::get())
        .and(warp::query())
        .and(state_filter.clone())
        .and_then(analysis::get_tfsa_rrsp);

    let land_residual_route = warp::path!("api" / "v1" / "analysis" / "land_residual")
        .and(warp::get())
        .and(warp::query())
        .and(state_filter.clone())
        .and_then(analysis::get_land_residual);

    let net_sheet_route = warp::path!("api" / "v1" / "analysis" / "net_sheet")
        .and(warp::get())
        .and(warp::query())
        .and(state_filter.clone())
        .and_then(analysis::get_net_sheet);

    let brrrr_route = warp::path!("api" / "v1" / "analysis" / "brrrr")
        .and(warp::get())
        .and(warp::query())
        .and(state_filter.clone())
        .and_then(analysis::get_brrrr);

    info!("All routes configured successfully.");

    intel_route
        .or(intel_refresh_route)
        .or(hydrate_route)
        .or(scenario_get_route)
        .or(scenario_put_route)
        .or(banklink_create_route)
        .or(banklink_finalize_route)
        .or(affordability_route)
        .or(closing_costs_route)
        .or(rental_route)
        .or(buy_vs_rent_route)
        .or(fire_route)
        .or(renewal_route)
        .or(budget_route)
        .or(net_worth_route)
        .or(pay_vs_invest_route)
        .or(rental_vs_stock_route)
        .or(simple_mortgage_route)
        .or(smith_route)
        .or(smith_stress_route)
        .or(tfsa_rrsp_route)
        .or(land_residual_route)
        .or(net_sheet_route)
        .or(brrrr_route)
        .recover(handle_rejection)
}
