//! Collaborator seams
//!
//! The overlay never talks to a renderer or a web service directly. Every
//! external capability it consumes is one of the traits below, so the same
//! controller runs against a browser map, the [`HeadlessEngine`], or test fakes.
//!
//! [`HeadlessEngine`]: crate::layers::headless::HeadlessEngine

use crate::{
    core::{
        geo::{LatLng, LatLngBounds, Snapshot},
        holder::{MapHandle, MapOptions},
    },
    data::{feed::FeedPayload, search::RouteCheck},
    layers::{
        base::{LayerId, TileLayerSpec},
        marker::MarkerLayer,
        route::{Route, RouteLayer},
    },
    Result,
};
use async_trait::async_trait;

/// The page region a map instance is mounted into
pub trait RenderTarget {
    /// Stable identity of the region
    fn id(&self) -> &str;

    /// Whether the region is currently part of the document
    fn is_attached(&self) -> bool;
}

/// Capability surface of the tile-rendering engine
///
/// Engine calls are synchronous, mirroring how browser map libraries expose
/// them; only routing and data acquisition suspend.
pub trait MapEngine {
    /// Create a map instance inside `target`
    fn create_map(&mut self, target: &dyn RenderTarget, options: &MapOptions) -> Result<MapHandle>;

    /// Release an instance and every layer on it
    fn destroy_map(&mut self, handle: MapHandle) -> Result<()>;

    fn add_tile_layer(&mut self, handle: MapHandle, tiles: &TileLayerSpec) -> Result<LayerId>;

    fn add_marker(&mut self, handle: MapHandle, marker: &MarkerLayer) -> Result<LayerId>;

    fn add_route(&mut self, handle: MapHandle, route: &RouteLayer) -> Result<LayerId>;

    fn remove_layer(&mut self, handle: MapHandle, layer: LayerId) -> Result<()>;

    fn has_layer(&self, handle: MapHandle, layer: LayerId) -> bool;

    fn fit_view(&mut self, handle: MapHandle, bounds: &LatLngBounds) -> Result<()>;
}

/// Path computation between ordered waypoints
#[async_trait]
pub trait RouteService: Send + Sync {
    async fn compute_route(&self, waypoints: &[LatLng]) -> Result<Route>;
}

/// Place-name to coordinate resolution
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// `Ok(None)` when the service knows no coordinates for `name`
    async fn resolve_location(&self, name: &str) -> Result<Option<LatLng>>;
}

/// Route existence check performed before geocoding a search
#[async_trait]
pub trait RouteChecker: Send + Sync {
    async fn check_route(&self, origin: &str, destination: &str) -> Result<RouteCheck>;
}

/// Source of the live-tracking coordinates feed
#[async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch_feed(&self) -> Result<FeedPayload>;
}

/// One acquisition pass producing the snapshot to render
#[async_trait]
pub trait AcquisitionStrategy: Send + Sync {
    async fn fetch(&self) -> Result<Snapshot>;

    /// Short name used in logs
    fn name(&self) -> &str;
}
