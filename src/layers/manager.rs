use crate::{
    core::{
        geo::{LatLng, Snapshot},
        holder::MapHandle,
    },
    layers::{base::LayerId, marker::MarkerLayer, route::Route, route::RouteLayer},
    traits::{MapEngine, RouteService},
    Result,
};
use futures::future::{BoxFuture, FutureExt};
use std::sync::Arc;

/// Outcome of one synchronization pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncReport {
    /// Markers now on the map
    pub markers: usize,
    /// Whether a route layer is now on the map
    pub routed: bool,
    /// Routing failure, if the pass degraded to markers only
    pub route_error: Option<String>,
    /// Markers the engine refused to add
    pub marker_errors: usize,
}

/// Keeps the marker and route layers of one map in step with the latest snapshot.
///
/// The tracked layer ids never leave this type; callers only see the report
/// and the destination label.
pub struct LayerSynchronizer {
    router: Arc<dyn RouteService>,
    markers: Vec<LayerId>,
    route: Option<LayerId>,
    destination: String,
    route_error: Option<String>,
    last_route: Option<Route>,
}

impl LayerSynchronizer {
    pub fn new(router: Arc<dyn RouteService>) -> Self {
        Self {
            router,
            markers: Vec::new(),
            route: None,
            destination: String::new(),
            route_error: None,
            last_route: None,
        }
    }

    /// Replaces every tracked layer with ones built from `snapshot`.
    ///
    /// A routing failure leaves the markers in place and is recorded in the
    /// report rather than returned as an error. Callers that must stay
    /// responsive while the router works use [`draw_markers`](Self::draw_markers),
    /// [`route_request`](Self::route_request) and [`attach_route`](Self::attach_route)
    /// directly.
    pub async fn apply<E: MapEngine>(
        &mut self,
        engine: &mut E,
        handle: MapHandle,
        snapshot: &Snapshot,
    ) -> SyncReport {
        let mut report = self.draw_markers(engine, handle, snapshot);
        if let Some(request) = self.route_request(snapshot) {
            let result = request.await;
            report.routed = self.attach_route(engine, handle, snapshot.waypoints(), result);
            report.route_error = self.route_error.clone();
        }
        report
    }

    /// Clears the previous layer set and draws one marker per snapshot point.
    pub fn draw_markers<E: MapEngine>(
        &mut self,
        engine: &mut E,
        handle: MapHandle,
        snapshot: &Snapshot,
    ) -> SyncReport {
        self.clear(engine, handle);

        let mut report = SyncReport::default();
        if snapshot.is_empty() {
            log::debug!("empty snapshot, map left without overlays");
            return report;
        }

        self.destination = snapshot.destination_label();
        for (index, point) in snapshot.points().iter().enumerate() {
            let marker = MarkerLayer::new(point.lat_lng()).with_popup(snapshot.display_label(index));
            match engine.add_marker(handle, &marker) {
                Ok(id) => self.markers.push(id),
                Err(e) => {
                    log::error!("failed to add marker {}: {}", index, e);
                    report.marker_errors += 1;
                }
            }
        }
        report.markers = self.markers.len();
        log::debug!("drew {} markers", report.markers);
        report
    }

    /// Router call for `snapshot`, or `None` when there is nothing to route.
    ///
    /// The future owns everything it needs, so it can be polled while the
    /// synchronizer is borrowed elsewhere.
    pub fn route_request(&self, snapshot: &Snapshot) -> Option<BoxFuture<'static, Result<Route>>> {
        if snapshot.len() < 2 {
            return None;
        }
        let router = self.router.clone();
        let waypoints = snapshot.waypoints();
        Some(async move { router.compute_route(&waypoints).await }.boxed())
    }

    /// Draws a resolved route; returns whether a route layer is now on the map.
    pub fn attach_route<E: MapEngine>(
        &mut self,
        engine: &mut E,
        handle: MapHandle,
        waypoints: Vec<LatLng>,
        result: Result<Route>,
    ) -> bool {
        if let Some(stale) = self.route.take() {
            if engine.has_layer(handle, stale) {
                if let Err(e) = engine.remove_layer(handle, stale) {
                    log::error!("failed to remove {}: {}", stale, e);
                }
            }
        }
        self.last_route = None;

        let route = match result {
            Ok(route) => route,
            Err(e) => {
                log::warn!("routing failed, showing markers only: {}", e);
                self.route_error = Some(e.to_string());
                return false;
            }
        };
        let layer = RouteLayer::new(waypoints, route);
        match engine.add_route(handle, &layer) {
            Ok(id) => {
                self.route = Some(id);
                self.route_error = None;
                if let Some(bounds) = layer.fit_bounds() {
                    if let Err(e) = engine.fit_view(handle, &bounds) {
                        log::warn!("could not fit view to route: {}", e);
                    }
                }
                self.last_route = Some(layer.route);
                true
            }
            Err(e) => {
                log::warn!("route layer rejected: {}", e);
                self.route_error = Some(e.to_string());
                false
            }
        }
    }

    /// Removes every tracked layer still present on the map.
    pub fn clear<E: MapEngine>(&mut self, engine: &mut E, handle: MapHandle) {
        let tracked = self.markers.drain(..).chain(self.route.take());
        for id in tracked {
            if !engine.has_layer(handle, id) {
                continue;
            }
            if let Err(e) = engine.remove_layer(handle, id) {
                log::error!("failed to remove {}: {}", id, e);
            }
        }
        self.destination.clear();
        self.route_error = None;
        self.last_route = None;
    }

    /// Forgets tracked layers without touching the engine (the map is gone).
    pub fn reset(&mut self) {
        self.markers.clear();
        self.route = None;
        self.destination.clear();
        self.route_error = None;
        self.last_route = None;
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    pub fn route_error(&self) -> Option<&str> {
        self.route_error.as_deref()
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    pub fn has_route(&self) -> bool {
        self.route.is_some()
    }

    /// Route currently drawn, if any
    pub fn route(&self) -> Option<&Route> {
        self.last_route.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        core::{
            config::WidgetConfig,
            geo::{LatLng, LocationPoint},
            holder::MapHolder,
        },
        layers::headless::{HeadlessEngine, HeadlessTarget},
        Error, Result,
    };
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct DirectRouter {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl RouteService for DirectRouter {
        async fn compute_route(&self, waypoints: &[LatLng]) -> Result<Route> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Route::new(waypoints.to_vec()))
        }
    }

    struct DownRouter;

    #[async_trait]
    impl RouteService for DownRouter {
        async fn compute_route(&self, _waypoints: &[LatLng]) -> Result<Route> {
            Err(Error::Routing("service unavailable".into()))
        }
    }

    fn mounted() -> (HeadlessEngine, MapHandle) {
        let mut engine = HeadlessEngine::new();
        let target = HeadlessTarget::attached("map");
        let handle = MapHolder::new(&WidgetConfig::default())
            .init(&mut engine, &target)
            .unwrap()
            .unwrap();
        (engine, handle)
    }

    fn karachi_hyderabad() -> Snapshot {
        Snapshot::new(vec![
            LocationPoint::new(24.86, 67.01).with_label("Karachi"),
            LocationPoint::new(25.39, 68.37).with_label("Hyderabad"),
        ])
    }

    #[tokio::test]
    async fn test_two_points_draw_markers_and_route() {
        let (mut engine, handle) = mounted();
        let router = Arc::new(DirectRouter {
            calls: AtomicUsize::new(0),
        });
        let mut sync = LayerSynchronizer::new(router.clone());

        let report = sync.apply(&mut engine, handle, &karachi_hyderabad()).await;

        assert_eq!(report.markers, 2);
        assert!(report.routed);
        assert_eq!(engine.marker_count(handle), 2);
        assert_eq!(engine.route_count(handle), 1);
        assert_eq!(sync.destination(), "Hyderabad");
        assert_eq!(router.calls.load(Ordering::SeqCst), 1);

        let route = &engine.routes(handle)[0];
        assert_eq!(
            route.waypoints,
            vec![LatLng::new(24.86, 67.01), LatLng::new(25.39, 68.37)]
        );
        assert!(engine.fitted_view(handle).is_some());
    }

    #[tokio::test]
    async fn test_empty_snapshot_clears_everything() {
        let (mut engine, handle) = mounted();
        let mut sync = LayerSynchronizer::new(Arc::new(DirectRouter {
            calls: AtomicUsize::new(0),
        }));
        sync.apply(&mut engine, handle, &karachi_hyderabad()).await;

        let report = sync.apply(&mut engine, handle, &Snapshot::empty()).await;

        assert_eq!(report, SyncReport::default());
        assert_eq!(engine.marker_count(handle), 0);
        assert_eq!(engine.route_count(handle), 0);
        assert_eq!(sync.destination(), "");
        // base tiles survive
        assert_eq!(engine.tile_layer_count(handle), 1);
    }

    #[tokio::test]
    async fn test_repeated_sync_does_not_leak_layers() {
        let (mut engine, handle) = mounted();
        let mut sync = LayerSynchronizer::new(Arc::new(DirectRouter {
            calls: AtomicUsize::new(0),
        }));
        let three = Snapshot::new(vec![
            LocationPoint::new(24.86, 67.01),
            LocationPoint::new(25.0, 67.5),
            LocationPoint::new(25.39, 68.37),
        ]);

        for _ in 0..5 {
            sync.apply(&mut engine, handle, &three).await;
        }
        sync.apply(&mut engine, handle, &karachi_hyderabad()).await;

        assert_eq!(engine.marker_count(handle), 2);
        assert_eq!(engine.route_count(handle), 1);
    }

    #[tokio::test]
    async fn test_single_point_has_no_route() {
        let (mut engine, handle) = mounted();
        let router = Arc::new(DirectRouter {
            calls: AtomicUsize::new(0),
        });
        let mut sync = LayerSynchronizer::new(router.clone());
        let one = Snapshot::new(vec![LocationPoint::new(24.86, 67.01)]);

        let report = sync.apply(&mut engine, handle, &one).await;

        assert_eq!(report.markers, 1);
        assert!(!report.routed);
        assert_eq!(engine.markers(handle)[0].popup_text(), "Point 1");
        assert_eq!(router.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_routing_failure_keeps_markers() {
        let (mut engine, handle) = mounted();
        let mut sync = LayerSynchronizer::new(Arc::new(DownRouter));

        let report = sync.apply(&mut engine, handle, &karachi_hyderabad()).await;

        assert_eq!(report.markers, 2);
        assert!(!report.routed);
        assert!(report.route_error.is_some());
        assert_eq!(engine.marker_count(handle), 2);
        assert_eq!(engine.route_count(handle), 0);
        assert_eq!(sync.destination(), "Hyderabad");
    }

    #[tokio::test]
    async fn test_clear_skips_layers_already_gone() {
        let (mut engine, handle) = mounted();
        let mut sync = LayerSynchronizer::new(Arc::new(DirectRouter {
            calls: AtomicUsize::new(0),
        }));
        sync.apply(&mut engine, handle, &karachi_hyderabad()).await;

        // Something else removed the route behind our back
        let route_id = sync.route.unwrap();
        engine.remove_layer(handle, route_id).unwrap();

        sync.clear(&mut engine, handle);
        assert_eq!(engine.marker_count(handle), 0);
        assert!(!sync.has_route());
    }
}
