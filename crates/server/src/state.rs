use std::sync::Arc;

use common::utils::logging::StructuredLogger;
use service::sighting::{SightingRepository, SightingService};

/// Shared request state. Built once at startup and cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    pub sightings: Arc<SightingService<dyn SightingRepository>>,
    pub logger: Arc<dyn StructuredLogger>,
}

impl AppState {
    pub fn new(repo: Arc<dyn SightingRepository>, logger: Arc<dyn StructuredLogger>) -> Self {
        Self { sightings: Arc::new(SightingService::new(repo)), logger }
    }
}
