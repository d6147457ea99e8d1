//! Prelude module for common floatmap types and traits
//!
//! This module re-exports the most commonly used types, traits, and functions
//! for easy importing with `use floatmap::prelude::*;`

pub use crate::core::{
    config::{AcquisitionMode, WidgetConfig},
    geo::{LatLng, LatLngBounds, LocationPoint, Point, Snapshot, WidgetPosition},
    holder::{MapHandle, MapHolder, MapOptions},
};

pub use crate::layers::{
    base::{LayerId, LayerKind, TileLayerSpec},
    headless::{HeadlessEngine, HeadlessTarget},
    manager::{LayerSynchronizer, SyncReport},
    marker::MarkerLayer,
    route::{Route, RouteLayer},
};

pub use crate::data::{
    feed::FeedPayload,
    http::{HttpServices, OsrmRouter},
    polling::PollingStrategy,
    search::{RouteCheck, SearchStrategy},
    strategy_for,
    summary::{RouteLeg, RouteSummary},
};

pub use crate::input::{
    drag::{DragController, DragEffect, DragState},
    events::{EventHandled, HitRegion, KeyCode, PointerEvent, PointerKind},
};

pub use crate::background::scheduler::{CycleId, CycleOutcome, PollScheduler};

pub use crate::runtime::{runtime, spawn, AsyncHandle, AsyncSpawner};

pub use crate::ui::{
    driver::{OverlayDriver, UiEvent},
    overlay::{Applied, OverlayView, OverlayWidget},
};

pub use crate::traits::{
    AcquisitionStrategy, FeedSource, Geocoder, MapEngine, RenderTarget, RouteChecker,
    RouteService,
};

pub use crate::{Error as WidgetError, Result};

pub use std::{sync::Arc, time::Duration};
