// Dump the current MarketIntel snapshot for inspection.

use dotenv::dotenv;

use fin_workbench::services::intel_store::IntelStore;

fn main() {
    dotenv().ok();
    env_logger::init();

    let store = IntelStore::from_env();
    let intel = store.current();
    println!(
        "{}",
        serde_json::to_string_pretty(&*intel).expect("snapshot serializes")
    );
}
