use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use engine_logging::{engine_debug, engine_info, engine_trace, engine_warn};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::fetch::Fetcher;
use crate::sink::EventSink;
use crate::EngineEvent;

#[derive(Debug, Clone)]
pub struct PollSettings {
    pub interval: Duration,
    /// Whether ticking starts immediately or waits for a connectivity report.
    pub start_active: bool,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            start_active: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Connectivity is down; nothing was sent.
    Suspended,
    /// A previous tick is still waiting on the server.
    Busy,
    Published { jobs: usize },
    Failed,
}

/// Count of job-list requests sent so far, shared with whoever needs to
/// order other responses against polls.
#[derive(Debug, Clone, Default)]
pub struct PollSequence(Arc<AtomicU64>);

impl PollSequence {
    pub fn issued(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }

    fn next(&self) -> u64 {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }
}

struct PollerShared {
    fetcher: Arc<dyn Fetcher>,
    sink: Arc<dyn EventSink>,
    active: AtomicBool,
    in_flight: AtomicBool,
    sequence: PollSequence,
    wake: Notify,
}

impl PollerShared {
    async fn tick(&self) -> TickOutcome {
        if !self.active.load(Ordering::SeqCst) {
            return TickOutcome::Suspended;
        }
        if self.in_flight.swap(true, Ordering::SeqCst) {
            engine_trace!("Poll skipped; previous request still in flight");
            return TickOutcome::Busy;
        }
        let _guard = InFlightGuard(&self.in_flight);
        let seq = self.sequence.next();

        match self.fetcher.list_jobs().await {
            Ok(jobs) => {
                let count = jobs.len();
                self.sink.emit(EngineEvent::JobsListed { jobs, seq });
                TickOutcome::Published { jobs: count }
            }
            Err(err) => {
                engine_warn!("Poll failed, retrying next tick: {}", err);
                self.sink.emit(EngineEvent::PollFailed(err));
                TickOutcome::Failed
            }
        }
    }
}

struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Periodic job-list refresher with an explicit start/stop handle.
///
/// Ticks run as separate tasks so a slow server never delays the timer;
/// the `in_flight` flag keeps at most one request outstanding.
pub struct Poller {
    shared: Arc<PollerShared>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl Poller {
    /// Builds a poller without starting its timer. Useful for driving ticks by hand.
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        sink: Arc<dyn EventSink>,
        settings: &PollSettings,
    ) -> Self {
        Self {
            shared: Arc::new(PollerShared {
                fetcher,
                sink,
                active: AtomicBool::new(settings.start_active),
                in_flight: AtomicBool::new(false),
                sequence: PollSequence::default(),
                wake: Notify::new(),
            }),
            cancel: CancellationToken::new(),
            task: None,
        }
    }

    /// Builds a poller and starts its timer on the current tokio runtime.
    pub fn spawn(
        fetcher: Arc<dyn Fetcher>,
        sink: Arc<dyn EventSink>,
        settings: PollSettings,
    ) -> Self {
        let mut poller = Self::new(fetcher, sink, &settings);
        poller.start(settings.interval);
        poller
    }

    fn start(&mut self, interval: Duration) {
        let shared = self.shared.clone();
        let cancel = self.cancel.clone();
        engine_info!("Polling every {:?}", interval);
        self.task = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {}
                    _ = shared.wake.notified() => {
                        engine_debug!("Out-of-cycle poll requested");
                    }
                }
                let shared = shared.clone();
                tokio::spawn(async move {
                    shared.tick().await;
                });
            }
            engine_debug!("Poll loop stopped");
        }));
    }

    /// Runs one guarded tick inline.
    pub async fn tick(&self) -> TickOutcome {
        self.shared.tick().await
    }

    pub fn is_active(&self) -> bool {
        self.shared.active.load(Ordering::SeqCst)
    }

    pub fn is_in_flight(&self) -> bool {
        self.shared.in_flight.load(Ordering::SeqCst)
    }

    pub fn sequence(&self) -> PollSequence {
        self.shared.sequence.clone()
    }

    /// Down suspends ticking. Up resumes it and fires one immediate tick.
    pub fn set_connectivity(&self, online: bool) {
        let was_active = self.shared.active.swap(online, Ordering::SeqCst);
        if online && !was_active {
            engine_info!("Polling resumed");
            self.shared.wake.notify_one();
        } else if !online && was_active {
            engine_info!("Polling suspended");
        }
    }

    /// Requests an out-of-cycle tick, subject to the same busy guard.
    pub fn poll_now(&self) {
        self.shared.wake.notify_one();
    }

    pub fn stop(&mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.stop();
    }
}
