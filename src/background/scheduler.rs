//! Recurring acquisition with a re-entrancy guard
//!
//! The ticker task only decides *whether* to start a cycle; each cycle runs
//! as its own task so that stopping the ticker never aborts a request that is
//! already on the wire. Its result is simply dropped instead.

use crate::{
    core::{constants::MIN_POLL_INTERVAL_MS, geo::Snapshot},
    runtime::{self, AsyncHandle},
    traits::AcquisitionStrategy,
    Error, Result,
};
use instant::Instant;
use std::sync::{
    atomic::{AtomicBool, AtomicU64, Ordering},
    Arc, Mutex,
};
use std::time::Duration;
use tokio::time::MissedTickBehavior;

/// Sequence number of one acquisition cycle; strictly increasing per scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CycleId(pub u64);

/// What one cycle produced
#[derive(Debug)]
pub enum CycleOutcome {
    Snapshot { cycle: CycleId, snapshot: Snapshot },
    Failed { cycle: CycleId, error: Error },
}

impl CycleOutcome {
    pub fn cycle(&self) -> CycleId {
        match self {
            CycleOutcome::Snapshot { cycle, .. } | CycleOutcome::Failed { cycle, .. } => *cycle,
        }
    }

    fn from_result(cycle: CycleId, result: Result<Snapshot>) -> Self {
        match result {
            Ok(snapshot) => CycleOutcome::Snapshot { cycle, snapshot },
            Err(error) => CycleOutcome::Failed { cycle, error },
        }
    }
}

type Sink = Arc<Mutex<Box<dyn FnMut(CycleOutcome) + Send>>>;

/// Per-session flags; a fresh one is made on every start
#[derive(Debug, Default)]
struct PollState {
    in_flight: AtomicBool,
    stopped: AtomicBool,
    skipped_ticks: AtomicU64,
}

pub struct PollScheduler {
    interval: Duration,
    next_cycle: Arc<AtomicU64>,
    state: Arc<PollState>,
    ticker: Option<Box<dyn AsyncHandle>>,
    session_floor: CycleId,
}

impl PollScheduler {
    /// Intervals below [`MIN_POLL_INTERVAL_MS`] (zero included) are raised to it.
    pub fn new(interval: Duration) -> Self {
        let floor = Duration::from_millis(MIN_POLL_INTERVAL_MS);
        let interval = if interval < floor {
            log::warn!("poll interval {:?} below minimum, using {:?}", interval, floor);
            floor
        } else {
            interval
        };
        Self {
            interval,
            next_cycle: Arc::new(AtomicU64::new(1)),
            state: Arc::new(PollState::default()),
            ticker: None,
            session_floor: CycleId(1),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Fetches now, then every interval, until [`stop`](Self::stop).
    ///
    /// A tick that fires while a fetch is still pending is skipped, not queued.
    /// Restarting a running scheduler stops the previous session first.
    pub fn start<S>(&mut self, strategy: Arc<dyn AcquisitionStrategy>, sink: S)
    where
        S: FnMut(CycleOutcome) + Send + 'static,
    {
        self.stop();
        let state = self.begin_session();
        let sink: Sink = Arc::new(Mutex::new(Box::new(sink)));
        let next_cycle = self.next_cycle.clone();
        let interval = self.interval;

        log::info!(
            "polling {} every {:?}",
            strategy.name(),
            interval
        );
        self.ticker = Some(runtime::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                if state.stopped.load(Ordering::SeqCst) {
                    break;
                }
                if !try_begin_cycle(&strategy, &state, &next_cycle, &sink) {
                    let skipped = state.skipped_ticks.fetch_add(1, Ordering::SeqCst) + 1;
                    log::debug!("previous fetch still pending, skipped tick ({} so far)", skipped);
                }
            }
        }));
    }

    /// Runs a single cycle with no timer. Returns `false` if one is already pending.
    pub fn run_once<S>(&mut self, strategy: Arc<dyn AcquisitionStrategy>, sink: S) -> bool
    where
        S: FnMut(CycleOutcome) + Send + 'static,
    {
        self.stop();
        let state = self.begin_session();
        let sink: Sink = Arc::new(Mutex::new(Box::new(sink)));
        try_begin_cycle(&strategy, &state, &self.next_cycle, &sink)
    }

    /// Cancels the timer. A fetch already in flight completes, but its result
    /// is discarded.
    pub fn stop(&mut self) {
        self.state.stopped.store(true, Ordering::SeqCst);
        if let Some(ticker) = self.ticker.take() {
            ticker.cancel();
            log::debug!("poll timer cancelled");
        }
    }

    pub fn is_running(&self) -> bool {
        self.ticker
            .as_ref()
            .map(|t| !t.is_finished())
            .unwrap_or(false)
            && !self.state.stopped.load(Ordering::SeqCst)
    }

    pub fn in_flight(&self) -> bool {
        self.state.in_flight.load(Ordering::SeqCst)
    }

    /// Ticks skipped in the current session because a fetch was pending
    pub fn skipped_ticks(&self) -> u64 {
        self.state.skipped_ticks.load(Ordering::SeqCst)
    }

    /// First cycle id of the current session; anything older is stale
    pub fn session_floor(&self) -> CycleId {
        self.session_floor
    }

    fn begin_session(&mut self) -> Arc<PollState> {
        self.state = Arc::new(PollState::default());
        self.session_floor = CycleId(self.next_cycle.load(Ordering::SeqCst));
        self.state.clone()
    }
}

impl Drop for PollScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Starts a cycle unless one is pending in this session
fn try_begin_cycle(
    strategy: &Arc<dyn AcquisitionStrategy>,
    state: &Arc<PollState>,
    next_cycle: &Arc<AtomicU64>,
    sink: &Sink,
) -> bool {
    if state.in_flight.swap(true, Ordering::SeqCst) {
        return false;
    }
    let cycle = CycleId(next_cycle.fetch_add(1, Ordering::SeqCst));
    let strategy = strategy.clone();
    let state = state.clone();
    let sink = sink.clone();

    runtime::spawn(async move {
        let started = Instant::now();
        log::debug!("cycle {} ({}) started", cycle.0, strategy.name());
        let result = strategy.fetch().await;
        state.in_flight.store(false, Ordering::SeqCst);

        if state.stopped.load(Ordering::SeqCst) {
            log::debug!("cycle {} finished after stop, result discarded", cycle.0);
            return;
        }
        match &result {
            Ok(snapshot) => log::debug!(
                "cycle {} fetched {} locations in {:?}",
                cycle.0,
                snapshot.len(),
                started.elapsed()
            ),
            Err(e) => log::warn!("cycle {} failed: {}", cycle.0, e),
        }
        let outcome = CycleOutcome::from_result(cycle, result);
        match sink.lock() {
            Ok(mut deliver) => deliver(outcome),
            Err(_) => log::error!("outcome sink poisoned, cycle {} dropped", cycle.0),
        }
    });
    true
}
