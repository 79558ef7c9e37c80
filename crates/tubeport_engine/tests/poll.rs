use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use tokio::sync::Notify;
use tubeport_core::{
    Job, JobId, JobStatus, OutputFormat, OutputSelection, Quality, Subject, SubjectKind,
};
use tubeport_engine::{
    EngineEvent, EventSink, FailureKind, FetchError, Fetcher, PollSettings, Poller, TickOutcome,
};

fn job(id: &str) -> Job {
    Job {
        id: JobId::new(id),
        title: format!("title {id}"),
        url: format!("https://example.com/{id}"),
        format: OutputFormat::Mp4,
        quality: Quality::P720,
        status: JobStatus::InProgress,
        progress: 10,
        error: None,
        created_at: None,
    }
}

fn unreachable() -> FetchError {
    FetchError {
        kind: FailureKind::Network,
        message: "connection refused".into(),
        detail: None,
    }
}

#[derive(Default)]
struct FakeFetcher {
    calls: AtomicUsize,
    gated: bool,
    gate: Notify,
    failing: bool,
}

impl FakeFetcher {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Fetcher for FakeFetcher {
    async fn analyze_subject(&self, _url: &str, _kind: SubjectKind) -> Result<Subject, FetchError> {
        Err(unreachable())
    }

    async fn start_job(&self, _url: &str, _selection: OutputSelection) -> Result<(), FetchError> {
        Err(unreachable())
    }

    async fn list_jobs(&self) -> Result<Vec<Job>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.gated {
            self.gate.notified().await;
        }
        if self.failing {
            return Err(unreachable());
        }
        Ok(vec![job("a"), job("b")])
    }

    async fn delete_job(&self, _id: &JobId) -> Result<(), FetchError> {
        Err(unreachable())
    }

    async fn fetch_result(&self, _id: &JobId) -> Result<Bytes, FetchError> {
        Err(unreachable())
    }
}

#[derive(Default)]
struct RecordingSink {
    events: Mutex<Vec<EngineEvent>>,
}

impl RecordingSink {
    fn events(&self) -> Vec<EngineEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: EngineEvent) {
        self.events.lock().unwrap().push(event);
    }
}

async fn wait_until(mut condition: impl FnMut() -> bool) {
    for _ in 0..200 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not reached in time");
}

#[tokio::test]
async fn tick_publishes_full_list() {
    let fetcher = Arc::new(FakeFetcher::default());
    let sink = Arc::new(RecordingSink::default());
    let poller = Poller::new(fetcher.clone(), sink.clone(), &PollSettings::default());

    assert_eq!(poller.tick().await, TickOutcome::Published { jobs: 2 });
    assert_eq!(
        sink.events(),
        vec![EngineEvent::JobsListed {
            jobs: vec![job("a"), job("b")],
            seq: 1,
        }]
    );
    assert!(!poller.is_in_flight());
}

#[tokio::test]
async fn overlapping_tick_is_skipped_while_busy() {
    let fetcher = Arc::new(FakeFetcher {
        gated: true,
        ..FakeFetcher::default()
    });
    let sink = Arc::new(RecordingSink::default());
    let poller = Arc::new(Poller::new(
        fetcher.clone(),
        sink.clone(),
        &PollSettings::default(),
    ));

    let first = tokio::spawn({
        let poller = poller.clone();
        async move { poller.tick().await }
    });
    wait_until(|| poller.is_in_flight()).await;

    assert_eq!(poller.tick().await, TickOutcome::Busy);
    assert_eq!(fetcher.calls(), 1);
    assert_eq!(poller.sequence().issued(), 1);

    fetcher.gate.notify_one();
    assert_eq!(first.await.unwrap(), TickOutcome::Published { jobs: 2 });
    assert!(!poller.is_in_flight());
    assert_eq!(sink.events().len(), 1);
}

#[tokio::test]
async fn offline_ticks_send_nothing() {
    let fetcher = Arc::new(FakeFetcher::default());
    let sink = Arc::new(RecordingSink::default());
    let poller = Poller::new(fetcher.clone(), sink.clone(), &PollSettings::default());

    poller.set_connectivity(false);
    assert!(!poller.is_active());
    assert_eq!(poller.tick().await, TickOutcome::Suspended);
    assert_eq!(poller.tick().await, TickOutcome::Suspended);
    assert_eq!(fetcher.calls(), 0);
    assert_eq!(poller.sequence().issued(), 0);
    assert!(sink.events().is_empty());
}

#[tokio::test]
async fn failures_are_reported_and_polling_continues() {
    let fetcher = Arc::new(FakeFetcher {
        failing: true,
        ..FakeFetcher::default()
    });
    let sink = Arc::new(RecordingSink::default());
    let poller = Poller::new(fetcher.clone(), sink.clone(), &PollSettings::default());

    for _ in 0..3 {
        assert_eq!(poller.tick().await, TickOutcome::Failed);
    }
    assert_eq!(fetcher.calls(), 3);
    assert_eq!(poller.sequence().issued(), 3);
    let events = sink.events();
    assert_eq!(events.len(), 3);
    assert!(events
        .iter()
        .all(|event| matches!(event, EngineEvent::PollFailed(_))));
    assert!(!poller.is_in_flight());
}

#[tokio::test]
async fn reconnect_fires_an_immediate_tick() {
    let fetcher = Arc::new(FakeFetcher::default());
    let sink = Arc::new(RecordingSink::default());
    let poller = Poller::spawn(
        fetcher.clone(),
        sink.clone(),
        PollSettings {
            interval: Duration::from_secs(3600),
            start_active: false,
        },
    );

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(fetcher.calls(), 0);

    poller.set_connectivity(true);
    wait_until(|| fetcher.calls() == 1).await;
    wait_until(|| sink.events().len() == 1).await;
}

#[tokio::test]
async fn manual_refresh_goes_through_the_loop() {
    let fetcher = Arc::new(FakeFetcher::default());
    let sink = Arc::new(RecordingSink::default());
    let mut poller = Poller::spawn(
        fetcher.clone(),
        sink.clone(),
        PollSettings {
            interval: Duration::from_secs(3600),
            start_active: true,
        },
    );

    // The interval's first tick fires right away.
    wait_until(|| fetcher.calls() == 1).await;
    poller.poll_now();
    wait_until(|| fetcher.calls() == 2).await;

    poller.stop();
    poller.poll_now();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(fetcher.calls(), 2);
}
