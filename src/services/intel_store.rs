// src/services/intel_store.rs
//
// Single-writer, multi-reader home for the current MarketIntel snapshot.
// On disk it is one JSON file; in process it is an Arc swapped under a
// lock, so an analysis mid-read keeps the snapshot it started with while
// the pipeline installs a new one.

use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use crate::models::MarketIntel;
use crate::services::market_intel;
use crate::BoxError;

pub const DEFAULT_INTEL_PATH: &str = "market_intel.json";

pub struct IntelStore {
    path: PathBuf,
    cache: RwLock<Arc<MarketIntel>>,
}

impl IntelStore {
    /// Open the store at `path`. A readable, valid file wins; anything
    /// else starts from the baked-in fallback snapshot without failing.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let initial = match load_file(&path) {
            Ok(intel) => {
                info!("Loaded MarketIntel from {} (as of {})", path.display(), intel.last_updated);
                intel
            }
            Err(e) => {
                warn!(
                    "No usable MarketIntel at {} ({}); starting from fallback snapshot",
                    path.display(),
                    e
                );
                market_intel::fallback_snapshot()
            }
        };
        IntelStore {
            path,
            cache: RwLock::new(Arc::new(initial)),
        }
    }

    pub fn from_env() -> Self {
        let path =
            std::env::var("INTEL_PATH").unwrap_or_else(|_| DEFAULT_INTEL_PATH.to_string());
        IntelStore::open(path)
    }

    /// The current snapshot. Cheap to call; clones an Arc.
    pub fn current(&self) -> Arc<MarketIntel> {
        self.cache.read().expect("intel cache poisoned").clone()
    }

    /// Install a freshly assembled snapshot: validate, persist via
    /// write-then-rename, then swap the in-process cache. A failure at any
    /// step leaves the previous snapshot fully in place.
    pub fn replace(&self, mut intel: MarketIntel) -> Result<(), BoxError> {
        intel.validate().map_err(|e| format!("invalid MarketIntel: {}", e))?;

        // last_updated is strictly monotone across refreshes.
        let previous = self.current();
        if intel.last_updated <= previous.last_updated {
            intel.last_updated = chrono::Utc::now().max(
                previous.last_updated + chrono::Duration::milliseconds(1),
            );
        }

        let tmp = self.path.with_extension("json.tmp");
        let payload = serde_json::to_string_pretty(&intel)?;
        fs::write(&tmp, payload)?;
        fs::rename(&tmp, &self.path)?;

        let mut cache = self.cache.write().expect("intel cache poisoned");
        *cache = Arc::new(intel);
        info!("MarketIntel snapshot replaced at {}", self.path.display());
        Ok(())
    }
}

fn load_file(path: &Path) -> Result<MarketIntel, BoxError> {
    let text = fs::read_to_string(path)?;
    let intel: MarketIntel = serde_json::from_str(&text)?;
    intel.validate().map_err(|e| format!("malformed MarketIntel file: {}", e))?;
    Ok(intel)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("fin_workbench_{}_{}.json", name, std::process::id()))
    }

    #[test]
    fn open_without_file_serves_fallback() {
        let path = temp_path("absent");
        let _ = fs::remove_file(&path);
        let store = IntelStore::open(&path);
        let intel = store.current();
        assert!(intel.validate().is_ok());
        assert!(intel.tax_rules.ltt.contains_key("ON"));
    }

    #[test]
    fn replace_persists_and_reloads() {
        let path = temp_path("roundtrip");
        let _ = fs::remove_file(&path);

        let store = IntelStore::open(&path);
        let mut intel = market_intel::fallback_snapshot();
        intel.rates.bank_prime = 7.2;
        store.replace(intel).unwrap();

        let reopened = IntelStore::open(&path);
        assert_eq!(reopened.current().rates.bank_prime, 7.2);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn replace_keeps_last_updated_monotone() {
        let path = temp_path("monotone");
        let _ = fs::remove_file(&path);

        let store = IntelStore::open(&path);
        let first = store.current().last_updated;

        let mut stale = market_intel::fallback_snapshot();
        stale.last_updated = first - chrono::Duration::days(1);
        store.replace(stale).unwrap();

        assert!(store.current().last_updated > first);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn invalid_snapshot_is_rejected_and_previous_kept() {
        let path = temp_path("reject");
        let _ = fs::remove_file(&path);

        let store = IntelStore::open(&path);
        let before = store.current().rates.bank_prime;

        let mut bad = market_intel::fallback_snapshot();
        bad.tax_rules.ltt.insert(
            "ON".to_string(),
            vec![
                crate::models::Bracket::new(250_000.0, 1.0),
                crate::models::Bracket::new(55_000.0, 0.5),
            ],
        );
        assert!(store.replace(bad).is_err());
        assert_eq!(store.current().rates.bank_prime, before);
        let _ = fs::remove_file(&path);
    }
}
