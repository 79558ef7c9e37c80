use crate::{ActionFailure, Job, JobId, OutputFormat, Quality, Subject};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User submitted a URL for analysis.
    UrlSubmitted(String),
    /// Analyze response for `url`, which may be stale by the time it arrives.
    AnalysisCompleted {
        url: String,
        result: Result<Subject, ActionFailure>,
    },
    FormatSelected(OutputFormat),
    QualitySelected(Quality),
    /// User asked to start a job for the current subject.
    StartClicked,
    /// `polls_issued` counts job-list requests sent before the acknowledgement.
    JobStartCompleted {
        result: Result<(), ActionFailure>,
        polls_issued: u64,
    },
    /// User asked for an immediate job list refresh.
    RefreshClicked,
    /// Full job list from a poll or manual refresh; `poll_seq` numbers the request.
    JobListReceived { jobs: Vec<Job>, poll_seq: u64 },
    /// A poll tick failed; recovered locally.
    PollFailed { reason: Option<String> },
    DeleteClicked(JobId),
    DeleteCompleted {
        id: JobId,
        result: Result<(), ActionFailure>,
    },
    FetchResultClicked(JobId),
    /// Result payload was saved; carries the written location on success.
    FetchResultCompleted {
        id: JobId,
        result: Result<String, ActionFailure>,
    },
    ConnectivityChanged { online: bool },
}
