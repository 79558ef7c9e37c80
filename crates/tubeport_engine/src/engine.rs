use std::path::PathBuf;
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;

use engine_logging::{engine_debug, engine_warn};
use reqwest::Url;
use thiserror::Error;
use tubeport_core::{JobId, OutputSelection, SubjectKind};

use crate::connectivity::{probe_target, ConnectivityProbe, ProbeSettings};
use crate::fetch::{ApiSettings, Fetcher, ReqwestFetcher};
use crate::filename::result_filename;
use crate::persist::AtomicFileWriter;
use crate::poll::{PollSequence, PollSettings, Poller};
use crate::sink::{ChannelEventSink, EventSink};
use crate::{EngineEvent, FailureKind, FetchError};

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub api: ApiSettings,
    pub poll: PollSettings,
    /// `None` disables the background reachability probe.
    pub probe: Option<ProbeSettings>,
    pub output_dir: PathBuf,
}

impl EngineConfig {
    pub fn default_with_output(output_dir: PathBuf) -> Self {
        Self {
            api: ApiSettings::default(),
            poll: PollSettings::default(),
            probe: Some(ProbeSettings::default()),
            output_dir,
        }
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid api settings: {0}")]
    Api(#[from] FetchError),
    #[error("failed to start runtime: {0}")]
    Runtime(#[from] std::io::Error),
}

enum EngineCommand {
    Analyze {
        url: String,
        kind: SubjectKind,
    },
    StartJob {
        url: String,
        selection: OutputSelection,
    },
    Refresh,
    Delete {
        id: JobId,
    },
    FetchResult {
        id: JobId,
        title: String,
        extension: String,
    },
    SetConnectivity(bool),
}

/// Owns the IO runtime: requests go in as commands, results come back as events.
#[derive(Clone)]
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: Arc<Mutex<mpsc::Receiver<EngineEvent>>>,
}

impl EngineHandle {
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        let fetcher = ReqwestFetcher::new(config.api.clone())?;
        Self::with_fetcher(Arc::new(fetcher), config)
    }

    /// Same as [`EngineHandle::new`] but with a caller-supplied fetcher.
    pub fn with_fetcher(fetcher: Arc<dyn Fetcher>, config: EngineConfig) -> Result<Self, EngineError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?;
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let sink: Arc<dyn EventSink> = Arc::new(ChannelEventSink::new(event_tx));

        let probe = config.probe.clone().and_then(|settings| {
            let target = Url::parse(config.api.base_url.trim())
                .ok()
                .as_ref()
                .and_then(probe_target)?;
            Some((target, settings))
        });
        let writer = AtomicFileWriter::new(config.output_dir.clone());
        let poll_settings = config.poll.clone();

        thread::spawn(move || {
            let _enter = runtime.enter();
            let poller = Poller::spawn(fetcher.clone(), sink.clone(), poll_settings);
            let sequence = poller.sequence();
            let probe = probe
                .map(|(target, settings)| ConnectivityProbe::spawn(target, settings, sink.clone()));

            while let Ok(command) = cmd_rx.recv() {
                match command {
                    EngineCommand::Refresh => poller.poll_now(),
                    EngineCommand::SetConnectivity(online) => poller.set_connectivity(online),
                    command => {
                        let fetcher = fetcher.clone();
                        let sink = sink.clone();
                        let writer = writer.clone();
                        let sequence = sequence.clone();
                        runtime.spawn(async move {
                            handle_command(
                                fetcher.as_ref(),
                                &writer,
                                &sequence,
                                command,
                                sink.as_ref(),
                            )
                            .await;
                        });
                    }
                }
            }
            engine_debug!("Engine command channel closed; shutting down");
            drop(probe);
            drop(poller);
        });

        Ok(Self {
            cmd_tx,
            event_rx: Arc::new(Mutex::new(event_rx)),
        })
    }

    pub fn analyze(&self, url: impl Into<String>, kind: SubjectKind) {
        self.send(EngineCommand::Analyze {
            url: url.into(),
            kind,
        });
    }

    pub fn start_job(&self, url: impl Into<String>, selection: OutputSelection) {
        self.send(EngineCommand::StartJob {
            url: url.into(),
            selection,
        });
    }

    /// Out-of-cycle job list refresh through the poller's busy guard.
    pub fn refresh(&self) {
        self.send(EngineCommand::Refresh);
    }

    pub fn delete(&self, id: JobId) {
        self.send(EngineCommand::Delete { id });
    }

    pub fn fetch_result(&self, id: JobId, title: impl Into<String>, extension: impl Into<String>) {
        self.send(EngineCommand::FetchResult {
            id,
            title: title.into(),
            extension: extension.into(),
        });
    }

    pub fn set_connectivity(&self, online: bool) {
        self.send(EngineCommand::SetConnectivity(online));
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.lock().ok()?.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.lock().ok()?.recv_timeout(timeout).ok()
    }

    fn send(&self, command: EngineCommand) {
        if self.cmd_tx.send(command).is_err() {
            engine_warn!("Engine thread is gone; command dropped");
        }
    }
}

async fn handle_command(
    fetcher: &dyn Fetcher,
    writer: &AtomicFileWriter,
    sequence: &PollSequence,
    command: EngineCommand,
    sink: &dyn EventSink,
) {
    match command {
        EngineCommand::Analyze { url, kind } => {
            let result = fetcher.analyze_subject(&url, kind).await;
            sink.emit(EngineEvent::Analyzed { url, result });
        }
        EngineCommand::StartJob { url, selection } => {
            let result = fetcher.start_job(&url, selection).await;
            // Read after the response: later polls are guaranteed to see the new job.
            let polls_issued = sequence.issued();
            sink.emit(EngineEvent::JobStarted {
                result,
                polls_issued,
            });
        }
        EngineCommand::Delete { id } => {
            let result = fetcher.delete_job(&id).await;
            sink.emit(EngineEvent::JobDeleted { id, result });
        }
        EngineCommand::FetchResult {
            id,
            title,
            extension,
        } => {
            let result = fetch_and_save(fetcher, writer, &id, &title, &extension).await;
            sink.emit(EngineEvent::ResultSaved { id, result });
        }
        EngineCommand::Refresh | EngineCommand::SetConnectivity(_) => {}
    }
}

async fn fetch_and_save(
    fetcher: &dyn Fetcher,
    writer: &AtomicFileWriter,
    id: &JobId,
    title: &str,
    extension: &str,
) -> Result<PathBuf, FetchError> {
    let payload = fetcher.fetch_result(id).await?;
    let filename = result_filename(Some(title), id.as_str(), extension);
    let writer = writer.clone();
    tokio::task::spawn_blocking(move || writer.write(&filename, &payload))
        .await
        .map_err(|err| FetchError::new(FailureKind::Io, err.to_string()))?
        .map_err(|err| FetchError::new(FailureKind::Io, err.to_string()))
}
