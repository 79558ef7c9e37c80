use engine_logging::{engine_debug, engine_info, engine_trace};

use crate::view_model::{AppViewModel, JobRowView, SubjectView};
use crate::{
    ActionFailure, Job, JobId, JobSnapshot, OutputFormat, OutputSelection, PollPolicy, Quality,
    Subject,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Connectivity {
    #[default]
    Online,
    Offline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Info,
    Error,
}

/// Transient message for the user, drained by the consumer after each update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub text: String,
}

/// Single owner of the subject, output selection and job snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    subject: Option<Subject>,
    analyzing: Option<String>,
    selection: OutputSelection,
    jobs: JobSnapshot,
    /// Set on a job start: only a list requested after poll number `n` clears it.
    pending_refresh: Option<u64>,
    connectivity: Connectivity,
    consecutive_poll_failures: u32,
    notifications: Vec<Notification>,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> AppViewModel {
        let jobs: Vec<JobRowView> = self.jobs.visible().map(JobRowView::from_job).collect();
        AppViewModel {
            subject: self.subject.as_ref().map(SubjectView::from_subject),
            analyzing: self.analyzing.clone(),
            selection: self.selection,
            job_count: jobs.len(),
            jobs,
            pending_refresh: self.pending_refresh.is_some(),
            online: self.connectivity == Connectivity::Online,
            banner: self.banner(),
            dirty: self.dirty,
        }
    }

    pub fn subject(&self) -> Option<&Subject> {
        self.subject.as_ref()
    }

    pub fn analyzing(&self) -> Option<&str> {
        self.analyzing.as_deref()
    }

    pub fn selection(&self) -> OutputSelection {
        self.selection
    }

    pub fn jobs(&self) -> &JobSnapshot {
        &self.jobs
    }

    pub fn pending_refresh(&self) -> bool {
        self.pending_refresh.is_some()
    }

    pub fn connectivity(&self) -> Connectivity {
        self.connectivity
    }

    pub fn consecutive_poll_failures(&self) -> u32 {
        self.consecutive_poll_failures
    }

    /// Persistent banner text while connectivity is lost.
    pub fn banner(&self) -> Option<String> {
        match self.connectivity {
            Connectivity::Online => None,
            Connectivity::Offline => Some(ActionFailure::ConnectivityLost.user_message()),
        }
    }

    /// Returns whether the state changed since the last call, and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    /// Replaces the subject wholesale. The job snapshot is untouched.
    pub fn set_subject_from_analysis(&mut self, subject: Subject) {
        engine_info!("Subject set to {} ({:?})", subject.url, subject.kind);
        self.subject = Some(subject);
        self.dirty = true;
    }

    /// Full replace of the job snapshot with the server's list.
    pub fn merge_job_list(&mut self, server_list: Vec<Job>) {
        engine_trace!("Merging {} jobs from server", server_list.len());
        let before = self.jobs.clone();
        self.jobs.replace_all(server_list);
        self.consecutive_poll_failures = 0;
        if self.jobs != before {
            self.dirty = true;
        }
    }

    /// The server owns the new job's id; wait for a list requested after the
    /// acknowledgement to surface it.
    pub fn record_job_started(&mut self, polls_issued: u64) {
        self.pending_refresh = Some(polls_issued);
        self.dirty = true;
    }

    /// Clears the pending refresh once a list requested after the start arrives.
    /// Lists that were already in flight when the start was acknowledged don't count.
    pub fn settle_pending_refresh(&mut self, poll_seq: u64) {
        match self.pending_refresh {
            Some(issued) if poll_seq > issued => {
                self.pending_refresh = None;
                self.dirty = true;
            }
            Some(issued) => {
                engine_debug!(
                    "List #{} predates start acknowledgement (#{}); still refreshing",
                    poll_seq,
                    issued
                );
            }
            None => {}
        }
    }

    /// Optimistically hides `id`. Returns false if no such job is visible.
    pub fn record_job_deleted(&mut self, id: &JobId) -> bool {
        let hidden = self.jobs.begin_delete(id);
        if hidden {
            self.dirty = true;
        }
        hidden
    }

    pub fn confirm_job_deleted(&mut self, id: &JobId) {
        self.jobs.commit_delete(id);
        self.dirty = true;
    }

    pub fn rollback_job_deleted(&mut self, id: &JobId) {
        self.jobs.rollback_delete(id);
        self.dirty = true;
    }

    pub fn set_format(&mut self, format: OutputFormat) {
        if self.selection.format != format {
            self.selection.format = format;
            self.dirty = true;
        }
    }

    pub fn set_quality(&mut self, quality: Quality) {
        if self.selection.quality != quality {
            self.selection.quality = quality;
            self.dirty = true;
        }
    }

    /// Applies a connectivity report; returns the polling change it implies, if any.
    pub fn set_connectivity(&mut self, online: bool) -> Option<PollPolicy> {
        let next = if online {
            Connectivity::Online
        } else {
            Connectivity::Offline
        };
        if next == self.connectivity {
            return None;
        }
        self.connectivity = next;
        self.dirty = true;
        match next {
            Connectivity::Offline => {
                engine_info!("Connectivity lost; polling suspended");
                Some(PollPolicy::Suspend)
            }
            Connectivity::Online => {
                engine_info!("Connectivity restored; polling resumed");
                self.notify(NotificationLevel::Info, "Connection restored");
                Some(PollPolicy::Resume)
            }
        }
    }

    pub(crate) fn begin_analysis(&mut self, url: String) {
        if self.subject.as_ref().is_some_and(|subject| subject.url != url) {
            self.subject = None;
        }
        self.analyzing = Some(url);
        self.dirty = true;
    }

    /// Clears the in-flight marker if `url` is still the one being analyzed.
    /// Returns false for stale responses.
    pub(crate) fn finish_analysis(&mut self, url: &str) -> bool {
        if self.analyzing.as_deref() != Some(url) {
            engine_debug!(
                "Discarding stale analysis for {} (current {:?})",
                url,
                self.analyzing
            );
            return false;
        }
        self.analyzing = None;
        self.dirty = true;
        true
    }

    pub(crate) fn record_poll_failure(&mut self) {
        self.consecutive_poll_failures = self.consecutive_poll_failures.saturating_add(1);
    }

    pub(crate) fn notify(&mut self, level: NotificationLevel, text: impl Into<String>) {
        self.notifications.push(Notification {
            level,
            text: text.into(),
        });
        self.dirty = true;
    }

    pub(crate) fn notify_failure(&mut self, failure: &ActionFailure) {
        self.notify(NotificationLevel::Error, failure.user_message());
    }
}
