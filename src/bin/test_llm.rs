use dotenv::dotenv;
use log::{error, info};

use fin_workbench::services::llm::{extract_json, LlmClient};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    dotenv().ok();
    env_logger::init();

    info!("Testing LLM completion round trip...");
    let client = LlmClient::from_env()?;

    let reply = client
        .complete(
            "You are a Canadian mortgage analyst. Return ONLY a JSON object \
             {\"five_year_variable\": number} in percent.",
            "The current Canadian bank prime rate is 6.45%. What is the typical discounted \
             5-year variable mortgage rate right now?",
        )
        .await;

    match reply {
        Ok(text) => {
            info!("Raw reply: {}", text);
            match extract_json(&text) {
                Ok(parsed) => info!("Parsed: {}", parsed),
                Err(e) => error!("Reply did not contain usable JSON: {}", e),
            }
        }
        Err(e) => error!("Completion failed: {}", e),
    }
    Ok(())
}
