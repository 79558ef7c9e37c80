//! Tubeport core: pure job-synchronization state machine and view-model helpers.
mod effect;
mod msg;
mod snapshot;
mod state;
mod types;
mod update;
mod source_url;
mod view_model;

pub use effect::{Effect, PollPolicy};
pub use msg::Msg;
pub use snapshot::{JobSnapshot, PendingEdit};
pub use state::{AppState, Connectivity, Notification, NotificationLevel};
pub use types::{
    ActionFailure, CollectionEntry, Job, JobId, JobStatus, OutputFormat, OutputSelection, Quality,
    Subject, SubjectKind, SubjectMetadata,
};
pub use update::update;
pub use source_url::{is_collection_url, normalize_subject_url, subject_kind_for};
pub use view_model::{format_count, format_duration, AppViewModel, JobRowView, SubjectView};
