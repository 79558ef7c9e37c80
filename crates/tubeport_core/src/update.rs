use engine_logging::{engine_debug, engine_info, engine_warn};

use crate::state::NotificationLevel;
use crate::source_url::{normalize_subject_url, subject_kind_for};
use crate::{ActionFailure, AppState, Effect, JobStatus, Msg};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::UrlSubmitted(raw) => {
            let url = normalize_subject_url(&raw);
            if url.is_empty() {
                state.notify(NotificationLevel::Error, "Please enter a URL");
                return (state, Vec::new());
            }
            if state.analyzing() == Some(url.as_str()) {
                engine_debug!("Analysis for {} already in flight", url);
                return (state, Vec::new());
            }
            let kind = subject_kind_for(&url);
            state.begin_analysis(url.clone());
            vec![Effect::Analyze { url, kind }]
        }
        Msg::AnalysisCompleted { url, result } => {
            if state.finish_analysis(&url) {
                match result {
                    Ok(subject) => {
                        state.set_subject_from_analysis(subject);
                        state.notify(NotificationLevel::Success, "Info loaded successfully!");
                    }
                    Err(failure) => {
                        engine_warn!("Analysis of {} failed: {}", url, failure);
                        state.notify_failure(&failure);
                    }
                }
            }
            Vec::new()
        }
        Msg::FormatSelected(format) => {
            state.set_format(format);
            Vec::new()
        }
        Msg::QualitySelected(quality) => {
            state.set_quality(quality);
            Vec::new()
        }
        Msg::StartClicked => match state.subject() {
            Some(subject) => {
                let url = subject.url.clone();
                vec![Effect::StartJob {
                    url,
                    selection: state.selection(),
                }]
            }
            None => {
                state.notify(NotificationLevel::Error, "Please load video info first");
                Vec::new()
            }
        },
        Msg::JobStartCompleted {
            result,
            polls_issued,
        } => match result {
            Ok(()) => {
                state.record_job_started(polls_issued);
                state.notify(NotificationLevel::Success, "Download started successfully!");
                vec![Effect::RefreshJobs]
            }
            Err(failure) => {
                engine_warn!("Start failed: {}", failure);
                state.notify_failure(&failure);
                Vec::new()
            }
        },
        Msg::RefreshClicked => vec![Effect::RefreshJobs],
        Msg::JobListReceived { jobs, poll_seq } => {
            state.merge_job_list(jobs);
            state.settle_pending_refresh(poll_seq);
            Vec::new()
        }
        Msg::PollFailed { reason } => {
            state.record_poll_failure();
            engine_debug!(
                "Poll failure #{} kept silent: {:?}",
                state.consecutive_poll_failures(),
                reason
            );
            Vec::new()
        }
        Msg::DeleteClicked(id) => {
            if state.record_job_deleted(&id) {
                vec![Effect::DeleteJob { id }]
            } else {
                engine_debug!("Delete requested for unknown or pending job {}", id);
                Vec::new()
            }
        }
        Msg::DeleteCompleted { id, result } => match result {
            Ok(()) => {
                state.confirm_job_deleted(&id);
                state.notify(NotificationLevel::Success, "Download deleted successfully");
                vec![Effect::RefreshJobs]
            }
            Err(failure) => {
                engine_warn!("Delete of {} failed, restoring: {}", id, failure);
                state.rollback_job_deleted(&id);
                state.notify_failure(&failure);
                Vec::new()
            }
        },
        Msg::FetchResultClicked(id) => match state.jobs().get(&id) {
            Some(job) if job.status == JobStatus::Completed => vec![Effect::FetchResult {
                id: id.clone(),
                file_stem: job.title.clone(),
                extension: job.format.as_str().to_string(),
            }],
            Some(_) => {
                state.notify_failure(&ActionFailure::FetchFailed {
                    reason: Some("Download not completed".to_string()),
                });
                Vec::new()
            }
            None => {
                state.notify_failure(&ActionFailure::FetchFailed {
                    reason: Some("Download not found".to_string()),
                });
                Vec::new()
            }
        },
        Msg::FetchResultCompleted { id, result } => {
            match result {
                Ok(location) => {
                    engine_info!("Result for {} saved to {}", id, location);
                    state.notify(NotificationLevel::Success, format!("Saved {location}"));
                }
                Err(failure) => {
                    engine_warn!("Fetching result for {} failed: {}", id, failure);
                    state.notify_failure(&failure);
                }
            }
            Vec::new()
        }
        Msg::ConnectivityChanged { online } => match state.set_connectivity(online) {
            Some(policy) => vec![Effect::Polling { policy }],
            None => Vec::new(),
        },
    };

    (state, effects)
}

