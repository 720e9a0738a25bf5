// src/services/legislative.rs
//
// Stage three of the intel pipeline: read the BC first-time-home-buyer
// exemption page and have the LLM pull the statutory thresholds out of the
// prose. The page is plain government HTML, so the text is stripped with
// scraper before it goes to the model, and the model's answer is
// bounds-checked before anyone trusts it.

use log::{info, warn};
use reqwest::Client;
use scraper::Html;

use crate::services::llm::{extract_json, LlmClient};
use crate::BoxError;

pub const BC_FTHB_PAGE: &str = "https://www2.gov.bc.ca/gov/content/taxes/property-taxes/\
property-transfer-tax/exemptions/first-time-home-buyers";

/// Statutory fallbacks if the page or the model is unavailable.
pub const FALLBACK_FULL_LIMIT: f64 = 835_000.0;
pub const FALLBACK_PARTIAL_LIMIT: f64 = 860_000.0;

const EXTRACTION_PROMPT: &str = "You are a specialised Canadian tax analyst. From the page text \
you are given, extract the BC first-time home buyer property-transfer-tax thresholds and return \
ONLY a JSON object {\"fthb_full_limit\": number, \"fthb_partial_limit\": number} with dollar \
amounts and no commentary.";

/// Maximum page text forwarded to the model.
const PAGE_TEXT_LIMIT: usize = 4000;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FthbLimits {
    pub full_limit: f64,
    pub partial_limit: f64,
}

impl FthbLimits {
    pub fn fallback() -> Self {
        FthbLimits {
            full_limit: FALLBACK_FULL_LIMIT,
            partial_limit: FALLBACK_PARTIAL_LIMIT,
        }
    }
}

/// Strip tags and collapse whitespace; the model gets prose, not markup.
pub fn strip_html(body: &str) -> String {
    let document = Html::parse_document(body);
    let text: Vec<&str> = document.root_element().text().collect();
    let joined = text.join(" ");
    joined.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Sanity window for either threshold. Anything outside means the model
/// hallucinated or the page changed shape; use the fallback.
fn plausible(limits: &FthbLimits) -> bool {
    let in_range = |v: f64| (500_000.0..=2_000_000.0).contains(&v);
    in_range(limits.full_limit)
        && in_range(limits.partial_limit)
        && limits.full_limit <= limits.partial_limit
}

pub async fn fetch_fthb_limits(llm: &LlmClient) -> FthbLimits {
    match try_fetch(llm).await {
        Ok(limits) => limits,
        Err(e) => {
            warn!("FTHB threshold extraction failed, using fallback: {}", e);
            FthbLimits::fallback()
        }
    }
}

async fn try_fetch(llm: &LlmClient) -> Result<FthbLimits, BoxError> {
    info!("Fetching FTHB exemption page: {}", BC_FTHB_PAGE);
    let client = Client::builder()
        .timeout(crate::services::boc::FETCH_TIMEOUT)
        .user_agent("Mozilla/5.0")
        .build()?;
    let body = client.get(BC_FTHB_PAGE).send().await?.text().await?;

    let mut text = strip_html(&body);
    if text.len() > PAGE_TEXT_LIMIT {
        // Back off to a char boundary; the page mixes English and French.
        let mut cut = PAGE_TEXT_LIMIT;
        while !text.is_char_boundary(cut) {
            cut -= 1;
        }
        text.truncate(cut);
    }

    let reply = llm.complete(EXTRACTION_PROMPT, &text).await?;
    let parsed = extract_json(&reply)?;

    let limits = FthbLimits {
        full_limit: parsed
            .get("fthb_full_limit")
            .and_then(|v| v.as_f64())
            .ok_or("fthb_full_limit missing from extraction")?,
        partial_limit: parsed
            .get("fthb_partial_limit")
            .and_then(|v| v.as_f64())
            .ok_or("fthb_partial_limit missing from extraction")?,
    };

    if !plausible(&limits) {
        return Err(format!("implausible FTHB limits {:?}", limits).into());
    }
    Ok(limits)
}
