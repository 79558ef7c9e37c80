//! Tubeport engine: HTTP client for the conversion service, job-list poller
//! and effect execution.
mod connectivity;
mod engine;
mod fetch;
mod filename;
mod persist;
mod poll;
mod sink;
mod types;
mod wire;

pub use connectivity::{probe_once, probe_target, ConnectivityProbe, ProbeSettings};
pub use engine::{EngineConfig, EngineError, EngineHandle};
pub use fetch::{ApiSettings, Fetcher, ReqwestFetcher};
pub use filename::result_filename;
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use poll::{PollSequence, PollSettings, Poller, TickOutcome};
pub use sink::{ChannelEventSink, EventSink};
pub use types::{EngineEvent, FailureKind, FetchError};
