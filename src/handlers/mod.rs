// src/handlers/mod.rs

use std::sync::Arc;

use crate::services::banklink::BankLinkClient;
use crate::services::intel_store::IntelStore;
use crate::services::membership::MembershipClient;
use crate::services::scenario_store::ScenarioStore;

pub mod analysis;
pub mod banklink;
pub mod error;
pub mod intel;
pub mod scenario;

/// Everything a request handler can reach, injected once at startup.
pub struct AppState {
    pub scenario: Arc<ScenarioStore>,
    pub intel: Arc<IntelStore>,
    pub membership: MembershipClient,
    pub banklink: BankLinkClient,
}
