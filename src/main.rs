use dotenv::dotenv;
use env_logger;
use log::{error, info, warn};
use std::env;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio_cron_scheduler::{Job, JobScheduler};
use warp::Filter;

use fin_workbench::handlers::AppState;
use fin_workbench::routes;
use fin_workbench::services::banklink::BankLinkClient;
use fin_workbench::services::intel_store::IntelStore;
use fin_workbench::services::llm::LlmClient;
use fin_workbench::services::market_intel;
use fin_workbench::services::membership::MembershipClient;
use fin_workbench::services::scenario_store::ScenarioStore;
use fin_workbench::services::vault::VaultClient;

#[tokio::main]
async fn main() {
    dotenv().ok();
    env_logger::init();
    info!("Logger initialized. Starting the workbench...");

    let port_str = env::var("PORT").unwrap_or_else(|_| {
        warn!("$PORT not set, defaulting to 3030");
        "3030".to_string()
    });
    let port: u16 = port_str.parse().expect("PORT must be a number");
    info!("Using PORT: {}", port);

    let addr: SocketAddr = ([0, 0, 0, 0], port).into();

    let vault = Arc::new(VaultClient::from_env());
    let state = Arc::new(AppState {
        scenario: Arc::new(ScenarioStore::new(vault)),
        intel: Arc::new(IntelStore::from_env()),
        membership: MembershipClient::from_env(),
        banklink: BankLinkClient::from_env(),
    });

    // Catch up if the on-disk snapshot is stale, then keep the daily
    // 16:30 Eastern refresh running out-of-band.
    let stale = chrono::Utc::now() - state.intel.current().last_updated
        > chrono::Duration::hours(24);
    if stale {
        info!("MarketIntel snapshot stale; refreshing in the background");
        let intel = state.intel.clone();
        tokio::spawn(async move {
            let llm = LlmClient::from_env().ok();
            let snapshot = market_intel::build_snapshot(llm.as_ref()).await;
            if let Err(e) = intel.replace(snapshot) {
                error!("Startup intel refresh failed to install: {}", e);
            }
        });
    }

    let scheduler = JobScheduler::new().await.expect("scheduler init");
    let intel_for_job = state.intel.clone();
    let job = Job::new_async("0 * * * * *", move |_uuid, _lock| {
        let intel = intel_for_job.clone();
        Box::pin(async move {
            if !market_intel::should_refresh_daily() {
                return;
            }
            info!("Scheduled MarketIntel refresh window reached");
            let llm = LlmClient::from_env().ok();
            let snapshot = market_intel::build_snapshot(llm.as_ref()).await;
            if let Err(e) = intel.replace(snapshot) {
                error!("Scheduled intel refresh failed to install: {}", e);
            }
        })
    })
    .expect("refresh job");
    scheduler.add(job).await.expect("schedule refresh job");
    scheduler.start().await.expect("scheduler start");
    info!("MarketIntel refresh scheduler running");

    let cors = warp::cors()
        .allow_any_origin()
        .allow_header("content-type")
        .allow_methods(vec!["GET", "POST", "PUT", "DELETE"]);

    let api = routes::routes(state).with(cors);
    info!("Routes configured successfully with CORS.");

    info!("Starting server on {}", addr);
    warp::serve(api).run(addr).await;
}
