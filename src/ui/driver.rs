//! Async event loop around one overlay

use crate::{
    background::scheduler::CycleOutcome,
    input::events::{HitRegion, KeyCode, PointerEvent},
    traits::{MapEngine, RenderTarget},
    ui::overlay::{Applied, OverlayWidget, PendingRoute},
    Error, Result,
};
use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::mpsc;

/// Host input forwarded to the overlay
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    Pointer { region: HitRegion, event: PointerEvent },
    Key(KeyCode),
    /// Close button in the header
    Close,
    /// Reopen a closed overlay (full remount)
    Open,
    /// Render tick; retries a deferred mount
    Render,
}

/// Feeds UI events and cycle outcomes into an [`OverlayWidget`] one at a time
///
/// Router calls run alongside input: markers are drawn as soon as a cycle
/// lands and the route is attached when it resolves.
pub struct OverlayDriver<E: MapEngine> {
    widget: OverlayWidget<E>,
    events: mpsc::UnboundedReceiver<UiEvent>,
    outcomes: mpsc::UnboundedReceiver<CycleOutcome>,
    routes: FuturesUnordered<PendingRoute>,
}

impl<E: MapEngine> OverlayDriver<E> {
    pub fn new(
        mut widget: OverlayWidget<E>,
        events: mpsc::UnboundedReceiver<UiEvent>,
    ) -> Result<Self> {
        let outcomes = widget
            .take_outcomes()
            .ok_or_else(|| Error::Config("overlay outcomes already taken".into()))?;
        Ok(Self {
            widget,
            events,
            outcomes,
            routes: FuturesUnordered::new(),
        })
    }

    /// Runs until the user closes the overlay or the event channel ends.
    ///
    /// A widget that starts closed waits for [`UiEvent::Open`].
    pub async fn run(&mut self, target: &dyn RenderTarget) -> Result<()> {
        self.widget.mount(target)?;
        loop {
            tokio::select! {
                Some(outcome) = self.outcomes.recv() => {
                    let (applied, pending) = self.widget.begin_outcome(outcome);
                    if let Some(pending) = pending {
                        self.routes.push(pending);
                    }
                    if let (Applied::Synced(report), Some(view)) = (applied, self.widget.render()) {
                        log::debug!("{} ({} markers)", view.title, report.markers);
                    }
                }
                Some(resolution) = self.routes.next(), if !self.routes.is_empty() => {
                    if let Some(report) = self.widget.finish_route(resolution) {
                        log::debug!("route ready (routed: {})", report.routed);
                    }
                }
                event = self.events.recv() => {
                    let Some(event) = event else {
                        log::info!("event source closed, shutting overlay down");
                        self.widget.close();
                        break;
                    };
                    let was_open = self.widget.is_open();
                    self.dispatch(event, target)?;
                    if was_open && !self.widget.is_open() {
                        break;
                    }
                }
            }
        }
        Ok(())
    }

    fn dispatch(&mut self, event: UiEvent, target: &dyn RenderTarget) -> Result<()> {
        match event {
            UiEvent::Pointer { region, event } => {
                self.widget.handle_pointer(region, event);
            }
            UiEvent::Key(key) => {
                self.widget.handle_key(key);
            }
            UiEvent::Close => self.widget.close(),
            UiEvent::Open => {
                self.widget.reopen(target)?;
            }
            UiEvent::Render => {
                self.widget.mount(target)?;
            }
        }
        Ok(())
    }

    /// Router calls not yet resolved
    pub fn pending_routes(&self) -> usize {
        self.routes.len()
    }

    pub fn widget(&self) -> &OverlayWidget<E> {
        &self.widget
    }

    pub fn into_widget(self) -> OverlayWidget<E> {
        self.widget
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        core::{
            config::WidgetConfig,
            geo::{LatLng, LocationPoint, Point, Snapshot},
        },
        layers::{
            headless::{HeadlessEngine, HeadlessTarget},
            route::Route,
        },
        traits::{AcquisitionStrategy, RouteService},
    };
    use async_trait::async_trait;
    use std::{sync::Arc, time::Duration};
    use tokio::time::Instant;

    struct OnePoint;

    #[async_trait]
    impl AcquisitionStrategy for OnePoint {
        async fn fetch(&self) -> Result<Snapshot> {
            Ok(Snapshot::new(vec![
                LocationPoint::new(24.86, 67.01).with_label("Karachi")
            ]))
        }

        fn name(&self) -> &str {
            "one-point"
        }
    }

    struct NoRouter;

    #[async_trait]
    impl RouteService for NoRouter {
        async fn compute_route(&self, _waypoints: &[LatLng]) -> Result<Route> {
            Err(Error::Routing("offline".into()))
        }
    }

    #[tokio::test]
    async fn test_driver_stops_on_close_event() {
        let widget = OverlayWidget::new(
            WidgetConfig::default(),
            HeadlessEngine::new(),
            Arc::new(OnePoint),
            Arc::new(NoRouter),
        )
        .unwrap();
        let (tx, rx) = mpsc::unbounded_channel();
        let mut driver = OverlayDriver::new(widget, rx).unwrap();
        let target = HeadlessTarget::attached("root");

        tx.send(UiEvent::Key(KeyCode::Escape)).unwrap();
        driver.run(&target).await.unwrap();

        let widget = driver.into_widget();
        assert!(!widget.is_open());
        assert_eq!(widget.engine().live_maps(), 0);
    }

    #[tokio::test]
    async fn test_dropped_event_source_shuts_down() {
        let widget = OverlayWidget::new(
            WidgetConfig::default(),
            HeadlessEngine::new(),
            Arc::new(OnePoint),
            Arc::new(NoRouter),
        )
        .unwrap();
        let (tx, rx) = mpsc::unbounded_channel::<UiEvent>();
        drop(tx);
        let mut driver = OverlayDriver::new(widget, rx).unwrap();
        driver.run(&HeadlessTarget::attached("root")).await.unwrap();
        assert!(driver.widget().render().is_none());
    }

    struct Trip;

    #[async_trait]
    impl AcquisitionStrategy for Trip {
        async fn fetch(&self) -> Result<Snapshot> {
            Ok(Snapshot::new(vec![
                LocationPoint::new(24.86, 67.01).with_label("Karachi"),
                LocationPoint::new(25.39, 68.37).with_label("Hyderabad"),
            ]))
        }

        fn name(&self) -> &str {
            "trip"
        }
    }

    /// Router that takes half a minute to answer
    struct SlowRouter;

    #[async_trait]
    impl RouteService for SlowRouter {
        async fn compute_route(&self, waypoints: &[LatLng]) -> Result<Route> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(Route::new(waypoints.to_vec()))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_input_is_handled_while_route_is_pending() {
        let widget = OverlayWidget::new(
            WidgetConfig::default().with_search("Karachi", "Hyderabad"),
            HeadlessEngine::new(),
            Arc::new(Trip),
            Arc::new(SlowRouter),
        )
        .unwrap();
        let (tx, rx) = mpsc::unbounded_channel();
        let mut driver = OverlayDriver::new(widget, rx).unwrap();
        let target = HeadlessTarget::attached("root");

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            let events = [
                UiEvent::Pointer {
                    region: HitRegion::Header,
                    event: PointerEvent::down(1, 140.0, 90.0),
                },
                UiEvent::Pointer {
                    region: HitRegion::Header,
                    event: PointerEvent::moved(1, 200.0, 150.0),
                },
                UiEvent::Key(KeyCode::Escape),
            ];
            for event in events {
                let _ = tx.send(event);
            }
        });

        let started = Instant::now();
        driver.run(&target).await.unwrap();

        assert!(started.elapsed() < Duration::from_secs(30));
        assert_eq!(driver.pending_routes(), 1);
        let widget = driver.into_widget();
        assert_eq!(widget.position(), Point::new(100.0, 100.0));
        assert!(!widget.is_open());
        assert_eq!(widget.engine().live_maps(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_route_attaches_once_router_answers() {
        let widget = OverlayWidget::new(
            WidgetConfig::default().with_search("Karachi", "Hyderabad"),
            HeadlessEngine::new(),
            Arc::new(Trip),
            Arc::new(SlowRouter),
        )
        .unwrap();
        let (_tx, rx) = mpsc::unbounded_channel();
        let mut driver = OverlayDriver::new(widget, rx).unwrap();
        let target = HeadlessTarget::attached("root");

        // Let the loop run past the router's answer, then inspect the open overlay
        {
            let run = driver.run(&target);
            tokio::pin!(run);
            tokio::select! {
                _ = &mut run => panic!("driver exited while the overlay was open"),
                _ = tokio::time::sleep(Duration::from_secs(45)) => {}
            }
        }

        assert_eq!(driver.pending_routes(), 0);
        let widget = driver.widget();
        let handle = widget.map_handle().unwrap();
        assert_eq!(widget.engine().marker_count(handle), 2);
        assert_eq!(widget.engine().route_count(handle), 1);
        let view = widget.render().unwrap();
        assert!(!view.routing);
        assert_eq!(view.title, "Route to Hyderabad");
    }
}
