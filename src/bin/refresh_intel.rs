// Out-of-band MarketIntel pipeline run. Transient network or LLM failures
// are absorbed by the stage fallbacks and still produce a valid snapshot;
// only a broken store path or malformed assembly exits non-zero.

use dotenv::dotenv;
use log::{error, info, warn};

use fin_workbench::services::intel_store::IntelStore;
use fin_workbench::services::llm::LlmClient;
use fin_workbench::services::market_intel;

#[tokio::main]
async fn main() {
    dotenv().ok();
    env_logger::init();

    info!("Running MarketIntel refresh...");

    let llm = match LlmClient::from_env() {
        Ok(client) => Some(client),
        Err(e) => {
            warn!("LLM unavailable ({}); interpretation stages will use fallbacks", e);
            None
        }
    };

    let store = IntelStore::from_env();
    let snapshot = market_intel::build_snapshot(llm.as_ref()).await;

    match store.replace(snapshot) {
        Ok(()) => {
            let current = store.current();
            info!(
                "Snapshot installed: prime {} / 5y fixed {} / 5y variable {} (as of {})",
                current.rates.bank_prime,
                current.rates.five_year_fixed_uninsured,
                current.rates.five_year_variable,
                current.last_updated
            );
        }
        Err(e) => {
            error!("Failed to install snapshot: {}", e);
            std::process::exit(1);
        }
    }
}
