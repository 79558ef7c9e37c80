use std::fmt;
use std::path::PathBuf;

use tubeport_core::{Job, JobId, Subject};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    Analyzed {
        url: String,
        result: Result<Subject, FetchError>,
    },
    JobStarted {
        result: Result<(), FetchError>,
        /// Job-list requests already sent when the acknowledgement arrived.
        polls_issued: u64,
    },
    /// Full job list from a poll tick or a manual refresh. `seq` numbers the
    /// request, starting at 1.
    JobsListed {
        jobs: Vec<Job>,
        seq: u64,
    },
    PollFailed(FetchError),
    JobDeleted {
        id: JobId,
        result: Result<(), FetchError>,
    },
    ResultSaved {
        id: JobId,
        result: Result<PathBuf, FetchError>,
    },
    Connectivity {
        online: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
    /// Human-readable `detail` from the server's error body, if any.
    pub detail: Option<String>,
}

impl FetchError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            detail: None,
        }
    }

    pub(crate) fn with_detail(mut self, detail: Option<String>) -> Self {
        self.detail = detail;
        self
    }

    /// The text worth showing a user: server detail first, else nothing.
    pub fn reason(&self) -> Option<String> {
        self.detail.clone()
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.detail {
            Some(detail) => write!(f, "{}: {} ({detail})", self.kind, self.message),
            None => write!(f, "{}: {}", self.kind, self.message),
        }
    }
}

impl std::error::Error for FetchError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    Network,
    /// Body did not match the expected shape.
    Decode,
    /// Server answered 2xx with `success: false`.
    Rejected,
    Io,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Decode => write!(f, "unexpected response body"),
            FailureKind::Rejected => write!(f, "rejected by server"),
            FailureKind::Io => write!(f, "io error"),
        }
    }
}
