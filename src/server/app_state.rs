use std::sync::Arc;

use crate::{configs::Config, party::PartyService};

/// Top-level application state.
pub struct AppState {
    pub service: Arc<PartyService>,
    pub config: Config,
}

impl AppState {
    pub fn new(service: Arc<PartyService>, config: Config) -> Self {
        Self { service, config }
    }
}
