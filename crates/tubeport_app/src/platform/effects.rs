use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use engine_logging::{engine_debug, engine_info, engine_warn};
use tubeport_core::{ActionFailure, Effect, Msg, PollPolicy};
use tubeport_engine::{EngineEvent, EngineHandle};

pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle, msg_tx: mpsc::Sender<Msg>) -> Self {
        let runner = Self { engine };
        runner.spawn_event_loop(msg_tx);
        runner
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Analyze { url, kind } => {
                    engine_info!("Analyze kind={:?} url={}", kind, url);
                    self.engine.analyze(url, kind);
                }
                Effect::StartJob { url, selection } => {
                    engine_info!(
                        "StartJob format={} quality={} url={}",
                        selection.format.as_str(),
                        selection.quality.as_str(),
                        url
                    );
                    self.engine.start_job(url, selection);
                }
                Effect::RefreshJobs => self.engine.refresh(),
                Effect::DeleteJob { id } => {
                    engine_info!("DeleteJob id={}", id);
                    self.engine.delete(id);
                }
                Effect::FetchResult {
                    id,
                    file_stem,
                    extension,
                } => {
                    engine_info!("FetchResult id={} ext={}", id, extension);
                    self.engine.fetch_result(id, file_stem, extension);
                }
                Effect::Polling { policy } => {
                    self.engine
                        .set_connectivity(matches!(policy, PollPolicy::Resume));
                }
            }
        }
    }

    fn spawn_event_loop(&self, msg_tx: mpsc::Sender<Msg>) {
        let engine = self.engine.clone();
        thread::spawn(move || loop {
            let Some(event) = engine.recv_timeout(Duration::from_millis(100)) else {
                continue;
            };
            if msg_tx.send(event_to_msg(event)).is_err() {
                engine_debug!("App inbox closed; engine event loop exiting");
                break;
            }
        });
    }
}

pub(crate) fn event_to_msg(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::Analyzed { url, result } => Msg::AnalysisCompleted {
            url,
            result: result.map_err(|err| {
                engine_warn!("Analyze failed: {}", err);
                ActionFailure::AnalysisFailed {
                    reason: err.reason(),
                }
            }),
        },
        EngineEvent::JobStarted {
            result,
            polls_issued,
        } => Msg::JobStartCompleted {
            result: result.map_err(|err| {
                engine_warn!("Start failed: {}", err);
                ActionFailure::StartFailed {
                    reason: err.reason(),
                }
            }),
            polls_issued,
        },
        EngineEvent::JobsListed { jobs, seq } => Msg::JobListReceived {
            jobs,
            poll_seq: seq,
        },
        EngineEvent::PollFailed(err) => Msg::PollFailed {
            reason: err.reason(),
        },
        EngineEvent::JobDeleted { id, result } => Msg::DeleteCompleted {
            result: result.map_err(|err| {
                engine_warn!("Delete {} failed: {}", id, err);
                ActionFailure::DeleteFailed {
                    reason: err.reason(),
                }
            }),
            id,
        },
        EngineEvent::ResultSaved { id, result } => Msg::FetchResultCompleted {
            result: result
                .map(|path| path.display().to_string())
                .map_err(|err| {
                    engine_warn!("Fetch {} failed: {}", id, err);
                    ActionFailure::FetchFailed {
                        reason: err.reason(),
                    }
                }),
            id,
        },
        EngineEvent::Connectivity { online } => Msg::ConnectivityChanged { online },
    }
}
