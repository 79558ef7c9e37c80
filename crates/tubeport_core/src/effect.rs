use crate::{JobId, OutputSelection, SubjectKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Analyze { url: String, kind: SubjectKind },
    StartJob { url: String, selection: OutputSelection },
    RefreshJobs,
    DeleteJob { id: JobId },
    FetchResult { id: JobId, file_stem: String, extension: String },
    Polling { policy: PollPolicy },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollPolicy {
    /// Resume ticking and poll once immediately.
    Resume,
    Suspend,
}
