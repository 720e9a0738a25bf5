// src/services/boc.rs
use log::{error, info};
use reqwest::Client;
use std::time::Duration;

use crate::BoxError;

/// Valet series: prime, overnight target, conventional 5-yr fixed.
pub const SERIES_PRIME: &str = "V121758";
pub const SERIES_OVERNIGHT: &str = "V39079";
pub const SERIES_FIVE_YEAR_FIXED: &str = "V122667786";

pub const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy)]
pub struct BocRates {
    pub bank_prime: f64,
    pub boc_overnight: f64,
    pub five_year_fixed: f64,
}

/// Fetch the most recent observation for the three series from the Bank of
/// Canada Valet API. Any failure is returned to the caller, which
/// substitutes the baked-in defaults.
pub async fn fetch_boc_rates() -> Result<BocRates, BoxError> {
    let url = format!(
        "https://www.bankofcanada.ca/valet/observations/{},{},{}/json?recent=1",
        SERIES_PRIME, SERIES_OVERNIGHT, SERIES_FIVE_YEAR_FIXED
    );
    info!("Fetching BoC rates from URL: {}", url);

    let client = Client::builder().timeout(FETCH_TIMEOUT).build()?;
    let body: serde_json::Value = client.get(&url).send().await?.json().await?;

    let observation = body
        .get("observations")
        .and_then(|o| o.as_array())
        .and_then(|rows| rows.last())
        .ok_or("no observations in BoC payload")?;

    let series_value = |series: &str| -> Result<f64, BoxError> {
        observation
            .get(series)
            .and_then(|s| s.get("v"))
            .and_then(|v| v.as_str())
            .ok_or_else(|| format!("missing series {} in BoC observation", series))?
            .trim()
            .parse::<f64>()
            .map_err(|e| format!("bad value for series {}: {}", series, e).into())
    };

    let rates = BocRates {
        bank_prime: series_value(SERIES_PRIME)?,
        boc_overnight: series_value(SERIES_OVERNIGHT)?,
        five_year_fixed: series_value(SERIES_FIVE_YEAR_FIXED)?,
    };

    if rates.bank_prime <= 0.0 || rates.boc_overnight <= 0.0 || rates.five_year_fixed <= 0.0 {
        error!("BoC returned a non-positive rate: {:?}", rates);
        return Err("non-positive rate in BoC payload".into());
    }

    info!(
        "BoC rates: prime {} / overnight {} / 5y fixed {}",
        rates.bank_prime, rates.boc_overnight, rates.five_year_fixed
    );
    Ok(rates)
}
