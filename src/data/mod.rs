pub mod feed;
pub mod http;
pub mod polling;
pub mod search;
pub mod summary;

pub use feed::FeedPayload;
pub use http::{HttpServices, OsrmRouter};
pub use polling::PollingStrategy;
pub use search::{RouteCheck, SearchStrategy};
pub use summary::{RouteLeg, RouteSummary};

use crate::{core::config::AcquisitionMode, traits::AcquisitionStrategy};
use std::sync::Arc;

/// Builds the acquisition strategy selected by `mode` on top of the HTTP services
pub fn strategy_for(mode: &AcquisitionMode, services: Arc<HttpServices>) -> Arc<dyn AcquisitionStrategy> {
    match mode {
        AcquisitionMode::Polling => Arc::new(PollingStrategy::new(services)),
        AcquisitionMode::Search {
            origin,
            destination,
        } => Arc::new(SearchStrategy::new(
            origin.clone(),
            destination.clone(),
            services.clone(),
            services,
        )),
    }
}
