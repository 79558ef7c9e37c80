use std::fmt;

/// Server-assigned job identifier. Opaque to the client.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct JobId(String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for JobId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Mp4,
    Webm,
    /// Audio only; the quality tier is ignored by the server.
    Mp3,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 3] = [OutputFormat::Mp4, OutputFormat::Webm, OutputFormat::Mp3];

    pub fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Mp4 => "mp4",
            OutputFormat::Webm => "webm",
            OutputFormat::Mp3 => "mp3",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|format| format.as_str().eq_ignore_ascii_case(value.trim()))
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Quality tiers, ordered lowest to highest resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Quality {
    P360,
    P480,
    #[default]
    P720,
    P1080,
}

impl Quality {
    pub const ALL: [Quality; 4] = [Quality::P360, Quality::P480, Quality::P720, Quality::P1080];

    pub fn as_str(self) -> &'static str {
        match self {
            Quality::P360 => "360p",
            Quality::P480 => "480p",
            Quality::P720 => "720p",
            Quality::P1080 => "1080p",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|quality| quality.as_str().eq_ignore_ascii_case(value.trim()))
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OutputSelection {
    pub format: OutputFormat,
    pub quality: Quality,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubjectKind {
    Single,
    Collection,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionEntry {
    pub id: String,
    pub title: String,
    pub url: Option<String>,
    pub duration_secs: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SubjectMetadata {
    pub title: String,
    pub duration_secs: Option<u64>,
    pub view_count: Option<u64>,
    pub uploader: String,
    pub description: String,
    pub thumbnail: Option<String>,
    /// Members of a collection, in server order. Empty for single items.
    pub entries: Vec<CollectionEntry>,
}

/// The analyzed video or playlist the user is currently looking at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subject {
    pub kind: SubjectKind,
    pub url: String,
    pub metadata: SubjectMetadata,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
}

impl JobStatus {
    /// Position on the forward-only path `pending -> in-progress -> completed|failed`.
    pub fn rank(self) -> u8 {
        match self {
            JobStatus::Pending => 0,
            JobStatus::InProgress => 1,
            JobStatus::Completed | JobStatus::Failed => 2,
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            JobStatus::Pending => "pending",
            JobStatus::InProgress => "in-progress",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// Local mirror of one server-side job, exactly as last reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub id: JobId,
    pub title: String,
    pub url: String,
    pub format: OutputFormat,
    pub quality: Quality,
    pub status: JobStatus,
    /// Percentage 0..=100; only meaningful while in progress.
    pub progress: u8,
    pub error: Option<String>,
    pub created_at: Option<String>,
}

/// Classified failure of a user action or background operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionFailure {
    AnalysisFailed { reason: Option<String> },
    StartFailed { reason: Option<String> },
    DeleteFailed { reason: Option<String> },
    FetchFailed { reason: Option<String> },
    PollFailed { reason: Option<String> },
    ConnectivityLost,
}

impl ActionFailure {
    /// Text shown to the user: the server-provided reason, else a generic message.
    pub fn user_message(&self) -> String {
        let (reason, fallback) = match self {
            ActionFailure::AnalysisFailed { reason } => (reason.as_deref(), "Failed to load video info"),
            ActionFailure::StartFailed { reason } => (reason.as_deref(), "Failed to start download"),
            ActionFailure::DeleteFailed { reason } => (reason.as_deref(), "Failed to delete download"),
            ActionFailure::FetchFailed { reason } => (reason.as_deref(), "Failed to download file"),
            ActionFailure::PollFailed { reason } => {
                (reason.as_deref(), "Failed to refresh downloads")
            }
            ActionFailure::ConnectivityLost => (None, "Connection lost, waiting for network"),
        };
        reason
            .filter(|text| !text.trim().is_empty())
            .unwrap_or(fallback)
            .to_string()
    }
}

impl fmt::Display for ActionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ActionFailure::AnalysisFailed { .. } => "analysis failed",
            ActionFailure::StartFailed { .. } => "start failed",
            ActionFailure::DeleteFailed { .. } => "delete failed",
            ActionFailure::FetchFailed { .. } => "fetch failed",
            ActionFailure::PollFailed { .. } => "poll failed",
            ActionFailure::ConnectivityLost => "connectivity lost",
        };
        write!(f, "{name}: {}", self.user_message())
    }
}
