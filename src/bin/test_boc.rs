use dotenv::dotenv;
use log::{error, info};

use fin_workbench::services::boc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    env_logger::init();

    info!("Testing Bank of Canada Valet fetch...");
    match boc::fetch_boc_rates().await {
        Ok(rates) => {
            info!("Prime: {}", rates.bank_prime);
            info!("Overnight: {}", rates.boc_overnight);
            info!("5y fixed: {}", rates.five_year_fixed);
        }
        Err(e) => {
            error!("BoC fetch failed: {}", e);
        }
    }
    Ok(())
}
