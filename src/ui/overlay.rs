//! The floating overlay: open/close lifecycle, header drag, and the glue
//! between the poll scheduler and the layer synchronizer.

use crate::{
    background::scheduler::{CycleId, CycleOutcome, PollScheduler},
    core::{
        config::{AcquisitionMode, WidgetConfig},
        constants::{TITLE_FALLBACK, TITLE_PREFIX},
        geo::{LatLng, Snapshot, WidgetPosition},
        holder::{MapHandle, MapHolder},
    },
    data::summary::RouteSummary,
    input::{
        drag::{DragController, DragEffect},
        events::{EventHandled, HitRegion, KeyCode, PointerEvent},
    },
    layers::{
        manager::{LayerSynchronizer, SyncReport},
        route::Route,
    },
    traits::{AcquisitionStrategy, MapEngine, RenderTarget, RouteService},
    Result,
};
use futures::future::{BoxFuture, FutureExt};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Everything a renderer needs to draw the open overlay
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayView {
    pub position: WidgetPosition,
    pub title: String,
    pub destination: String,
    pub loading: bool,
    /// Markers are drawn and the route is still being computed
    pub routing: bool,
    /// Inline message for the last failed cycle
    pub error: Option<String>,
    /// Set when the last pass fell back to markers only
    pub route_error: Option<String>,
    pub summary: Option<String>,
    pub text_selection_suppressed: bool,
    #[serde(skip)]
    pub map: Option<MapHandle>,
}

/// What happened to a delivered cycle outcome
#[derive(Debug, Clone, PartialEq)]
pub enum Applied {
    Synced(SyncReport),
    /// The cycle failed; layers were left as they were
    Failed(String),
    /// Closed widget, older cycle, or no live map
    Discarded,
}

/// A finished router call, ready for [`OverlayWidget::finish_route`]
pub struct RouteResolution {
    cycle: CycleId,
    handle: MapHandle,
    waypoints: Vec<LatLng>,
    result: Result<Route>,
}

impl RouteResolution {
    pub fn cycle(&self) -> CycleId {
        self.cycle
    }
}

/// Router call started by [`OverlayWidget::begin_outcome`]
pub type PendingRoute = BoxFuture<'static, RouteResolution>;

pub struct OverlayWidget<E: MapEngine> {
    config: WidgetConfig,
    engine: E,
    holder: MapHolder,
    sync: LayerSynchronizer,
    drag: DragController,
    scheduler: PollScheduler,
    strategy: Arc<dyn AcquisitionStrategy>,
    outcomes_tx: mpsc::UnboundedSender<CycleOutcome>,
    outcomes_rx: Option<mpsc::UnboundedReceiver<CycleOutcome>>,
    position: WidgetPosition,
    open: bool,
    acquiring: bool,
    loading: bool,
    error: Option<String>,
    last_applied: Option<CycleId>,
    summary: Option<RouteSummary>,
    drawn: Option<Snapshot>,
    route_pending: Option<CycleId>,
    captured_pointer: Option<u64>,
    text_selection_suppressed: bool,
}

impl<E: MapEngine> OverlayWidget<E> {
    /// Fails with [`Error::Config`](crate::Error::Config) when `config` does not validate.
    pub fn new(
        config: WidgetConfig,
        engine: E,
        strategy: Arc<dyn AcquisitionStrategy>,
        router: Arc<dyn RouteService>,
    ) -> Result<Self> {
        config.validate()?;
        let (outcomes_tx, outcomes_rx) = mpsc::unbounded_channel();
        Ok(Self {
            holder: MapHolder::new(&config),
            sync: LayerSynchronizer::new(router),
            drag: DragController::new(),
            scheduler: PollScheduler::new(config.poll_interval()),
            strategy,
            outcomes_tx,
            outcomes_rx: Some(outcomes_rx),
            position: config.initial_position,
            open: config.initially_open,
            acquiring: false,
            loading: false,
            error: None,
            last_applied: None,
            summary: None,
            drawn: None,
            route_pending: None,
            captured_pointer: None,
            text_selection_suppressed: false,
            engine,
            config,
        })
    }

    /// Hands out the receiving end of the cycle outcome channel; only once.
    pub fn take_outcomes(&mut self) -> Option<mpsc::UnboundedReceiver<CycleOutcome>> {
        self.outcomes_rx.take()
    }

    /// Creates the map in `target` and starts acquisition.
    ///
    /// Returns `Ok(false)` while the widget is closed or the target is not
    /// attached yet; call again on the next render. Repeated calls are cheap.
    pub fn mount(&mut self, target: &dyn RenderTarget) -> Result<bool> {
        if !self.open {
            return Ok(false);
        }
        let previous = self.holder.handle();
        let result = self.holder.init(&mut self.engine, target);
        if previous.is_some() && self.holder.handle() != previous {
            self.map_lost();
        }
        match result {
            Ok(Some(_)) => {}
            Ok(None) => return Ok(false),
            Err(e) => {
                log::error!("map init failed: {}", e);
                self.error = Some(e.user_message());
                return Err(e);
            }
        }

        if !self.acquiring {
            self.start_acquisition();
        }
        Ok(true)
    }

    /// The held map was destroyed or replaced; its layers went with it.
    ///
    /// Acquisition stops so the next successful mount starts a fresh session
    /// and redraws on the new instance.
    fn map_lost(&mut self) {
        log::info!("map instance lost, acquisition restarts on next mount");
        self.scheduler.stop();
        self.acquiring = false;
        self.sync.reset();
        self.summary = None;
        self.drawn = None;
        self.route_pending = None;
    }

    /// Opens a closed widget and mounts it again
    pub fn reopen(&mut self, target: &dyn RenderTarget) -> Result<bool> {
        if !self.open {
            log::info!("reopening overlay");
            self.open = true;
            self.position = self.config.initial_position;
        }
        self.mount(target)
    }

    fn start_acquisition(&mut self) {
        self.acquiring = true;
        self.loading = true;
        self.error = None;
        let tx = self.outcomes_tx.clone();
        let deliver = move |outcome: CycleOutcome| {
            if tx.send(outcome).is_err() {
                log::debug!("overlay gone, cycle outcome dropped");
            }
        };
        match self.config.mode {
            AcquisitionMode::Polling => self.scheduler.start(self.strategy.clone(), deliver),
            AcquisitionMode::Search { .. } => {
                self.scheduler.run_once(self.strategy.clone(), deliver);
            }
        }
    }

    /// Applies one cycle result to the map, in cycle order, routing included.
    pub async fn apply_outcome(&mut self, outcome: CycleOutcome) -> Applied {
        match self.begin_outcome(outcome) {
            (Applied::Synced(mut report), Some(pending)) => {
                if let Some(routed) = self.finish_route(pending.await) {
                    report.routed = routed.routed;
                    report.route_error = routed.route_error;
                }
                Applied::Synced(report)
            }
            (applied, _) => applied,
        }
    }

    /// Draws the markers of one cycle result and hands back its router call.
    ///
    /// The returned future borrows nothing from the widget; poll it next to
    /// the input source and pass its output to [`finish_route`](Self::finish_route).
    pub fn begin_outcome(&mut self, outcome: CycleOutcome) -> (Applied, Option<PendingRoute>) {
        let cycle = outcome.cycle();
        if !self.open {
            log::debug!("cycle {} arrived after close, discarded", cycle.0);
            return (Applied::Discarded, None);
        }
        let stale = cycle < self.scheduler.session_floor()
            || self.last_applied.map_or(false, |last| cycle <= last);
        if stale {
            log::warn!("stale cycle {} discarded", cycle.0);
            return (Applied::Discarded, None);
        }
        let Some(handle) = self.holder.handle() else {
            log::warn!("cycle {} arrived with no live map, discarded", cycle.0);
            return (Applied::Discarded, None);
        };

        self.last_applied = Some(cycle);
        self.loading = false;
        match outcome {
            CycleOutcome::Snapshot { snapshot, .. } => {
                let report = self.sync.draw_markers(&mut self.engine, handle, &snapshot);
                self.error = None;
                self.summary = RouteSummary::build(&snapshot, None);
                let pending = self.sync.route_request(&snapshot).map(|request| {
                    let waypoints = snapshot.waypoints();
                    request
                        .map(move |result| RouteResolution {
                            cycle,
                            handle,
                            waypoints,
                            result,
                        })
                        .boxed()
                });
                self.route_pending = pending.as_ref().map(|_| cycle);
                self.drawn = Some(snapshot);
                log::info!(
                    "cycle {} applied: {} markers, routing: {}",
                    cycle.0,
                    report.markers,
                    pending.is_some()
                );
                (Applied::Synced(report), pending)
            }
            CycleOutcome::Failed { error, .. } => {
                let message = error.user_message();
                self.error = Some(message.clone());
                (Applied::Failed(message), None)
            }
        }
    }

    /// Attaches a resolved route if its markers are still the ones on screen.
    ///
    /// Returns `None` when the route was discarded: the widget closed, the
    /// map was replaced, or a newer snapshot has been drawn since.
    pub fn finish_route(&mut self, resolution: RouteResolution) -> Option<SyncReport> {
        let RouteResolution {
            cycle,
            handle,
            waypoints,
            result,
        } = resolution;
        if !self.open
            || self.route_pending != Some(cycle)
            || self.holder.handle() != Some(handle)
        {
            log::debug!("route for cycle {} no longer current, discarded", cycle.0);
            return None;
        }
        self.route_pending = None;

        let routed = self
            .sync
            .attach_route(&mut self.engine, handle, waypoints, result);
        if let Some(snapshot) = &self.drawn {
            self.summary = RouteSummary::build(snapshot, self.sync.route());
        }
        log::info!("cycle {} route attached: {}", cycle.0, routed);
        Some(SyncReport {
            markers: self.sync.marker_count(),
            routed,
            route_error: self.sync.route_error().map(str::to_string),
            marker_errors: 0,
        })
    }

    /// Routes a pointer event; only the header (or the captured pointer) drags.
    pub fn handle_pointer(&mut self, region: HitRegion, event: PointerEvent) -> EventHandled {
        if !self.open {
            return EventHandled::NotHandled;
        }
        let captured = self.captured_pointer == Some(event.pointer_id);
        if region == HitRegion::MapBody && !captured {
            return EventHandled::NotHandled;
        }

        for effect in self.drag.handle(&event, self.position) {
            match effect {
                DragEffect::CapturePointer(id) => self.captured_pointer = Some(id),
                DragEffect::ReleasePointer(_) => self.captured_pointer = None,
                DragEffect::SuppressTextSelection => self.text_selection_suppressed = true,
                DragEffect::RestoreTextSelection => self.text_selection_suppressed = false,
                DragEffect::MoveTo(position) => self.position = position,
            }
        }
        if !self.drag.is_dragging() {
            self.captured_pointer = None;
        }
        EventHandled::Handled
    }

    pub fn handle_key(&mut self, key: KeyCode) -> EventHandled {
        match key {
            KeyCode::Escape if self.open => {
                self.close();
                EventHandled::Handled
            }
            _ => EventHandled::NotHandled,
        }
    }

    /// Stops polling, removes overlays and destroys the map
    pub fn close(&mut self) {
        if !self.open {
            return;
        }
        log::info!("closing overlay");
        self.open = false;
        self.scheduler.stop();
        self.acquiring = false;
        if let Some(handle) = self.holder.handle() {
            self.sync.clear(&mut self.engine, handle);
        }
        self.sync.reset();
        if let Err(e) = self.holder.teardown(&mut self.engine) {
            log::error!("map teardown failed: {}", e);
        }
        self.drag = DragController::new();
        self.captured_pointer = None;
        self.text_selection_suppressed = false;
        self.loading = false;
        self.error = None;
        self.summary = None;
        self.drawn = None;
        self.route_pending = None;
    }

    /// `None` while closed
    pub fn render(&self) -> Option<OverlayView> {
        if !self.open {
            return None;
        }
        let destination = self.sync.destination().to_string();
        let title = if destination.is_empty() {
            TITLE_FALLBACK.to_string()
        } else {
            format!("{TITLE_PREFIX} {destination}")
        };
        Some(OverlayView {
            position: self.position,
            title,
            destination,
            loading: self.loading,
            routing: self.route_pending.is_some(),
            error: self.error.clone(),
            route_error: self.sync.route_error().map(str::to_string),
            summary: self.summary.as_ref().map(RouteSummary::headline),
            text_selection_suppressed: self.text_selection_suppressed,
            map: self.holder.handle(),
        })
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn position(&self) -> WidgetPosition {
        self.position
    }

    pub fn map_handle(&self) -> Option<MapHandle> {
        self.holder.handle()
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn scheduler(&self) -> &PollScheduler {
        &self.scheduler
    }

    pub fn synchronizer(&self) -> &LayerSynchronizer {
        &self.sync
    }

    pub fn summary(&self) -> Option<&RouteSummary> {
        self.summary.as_ref()
    }

    pub fn last_applied(&self) -> Option<CycleId> {
        self.last_applied
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_dragging()
    }
}
