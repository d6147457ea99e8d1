//! # floatmap
//!
//! A floating, draggable map overlay controller.
//!
//! The overlay keeps one long-lived map instance per mount, keeps its marker
//! and route layers in step with freshly acquired location data (either a
//! polled tracking feed or a one-shot route search), and moves around the page
//! through a pointer-capture drag state machine on its header. The mapping
//! engine, routing and geocoding services are consumed through traits so the
//! controller can run headless, in tests, or against a real renderer.

pub mod background;
pub mod core;
pub mod data;
pub mod input;
pub mod layers;
pub mod prelude;
pub mod runtime;
pub mod traits;
pub mod ui;
pub use crate::core::constants;

// Re-export public API
pub use core::{
    config::{AcquisitionMode, WidgetConfig},
    geo::{LatLng, LatLngBounds, LocationPoint, Point, Snapshot, WidgetPosition},
    holder::{MapHandle, MapHolder},
};

pub use layers::{headless::HeadlessEngine, manager::LayerSynchronizer};

pub use data::{polling::PollingStrategy, search::SearchStrategy, summary::RouteSummary};

pub use background::scheduler::{CycleId, CycleOutcome, PollScheduler};

pub use input::{drag::DragController, events::PointerEvent};

pub use ui::{driver::OverlayDriver, overlay::OverlayWidget};

pub use traits::{AcquisitionStrategy, Geocoder, MapEngine, RenderTarget, RouteService};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum WidgetError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    Http { status: u16, url: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("No route found: {0}")]
    NoRouteFound(String),

    #[error("Could not resolve location: {0}")]
    ResolutionFailure(String),

    #[error("Routing error: {0}")]
    Routing(String),

    #[error("Engine error: {0}")]
    Engine(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl WidgetError {
    /// Inline message shown inside the overlay for a failed cycle.
    pub fn user_message(&self) -> String {
        match self {
            WidgetError::NoRouteFound(_) => "Route not found".to_string(),
            WidgetError::ResolutionFailure(name) => format!("Could not locate {name}"),
            WidgetError::Network(_) | WidgetError::Http { .. } | WidgetError::Serialization(_) => {
                "Failed to load map data.".to_string()
            }
            WidgetError::Routing(_) => "Route unavailable".to_string(),
            WidgetError::Engine(_) | WidgetError::Config(_) => "Map unavailable".to_string(),
        }
    }

    /// Whether this error came from the network layer rather than from data.
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            WidgetError::Network(_) | WidgetError::Http { .. } | WidgetError::Serialization(_)
        )
    }
}

/// Error type alias for convenience
pub type Error = WidgetError;
