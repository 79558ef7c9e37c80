use crate::{Job, JobId, JobStatus, OutputFormat, OutputSelection, Quality, Subject, SubjectKind};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub subject: Option<SubjectView>,
    /// URL whose analysis is in flight.
    pub analyzing: Option<String>,
    pub selection: OutputSelection,
    pub job_count: usize,
    pub jobs: Vec<JobRowView>,
    pub pending_refresh: bool,
    pub online: bool,
    pub banner: Option<String>,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectView {
    pub kind: SubjectKind,
    pub url: String,
    pub title: String,
    pub uploader: String,
    pub description: String,
    pub duration: String,
    pub views: String,
    pub thumbnail: Option<String>,
    pub entry_count: usize,
}

impl SubjectView {
    pub(crate) fn from_subject(subject: &Subject) -> Self {
        let meta = &subject.metadata;
        Self {
            kind: subject.kind,
            url: subject.url.clone(),
            title: meta.title.clone(),
            uploader: meta.uploader.clone(),
            description: meta.description.clone(),
            duration: format_duration(meta.duration_secs),
            views: format_count(meta.view_count),
            thumbnail: meta.thumbnail.clone(),
            entry_count: meta.entries.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRowView {
    pub job_id: JobId,
    pub title: String,
    pub format: OutputFormat,
    pub quality: Quality,
    pub status: JobStatus,
    /// Only set while the job is in progress.
    pub progress: Option<u8>,
    pub error: Option<String>,
    pub can_fetch: bool,
}

impl JobRowView {
    pub(crate) fn from_job(job: &Job) -> Self {
        Self {
            job_id: job.id.clone(),
            title: job.title.clone(),
            format: job.format,
            quality: job.quality,
            status: job.status,
            progress: (job.status == JobStatus::InProgress).then_some(job.progress),
            error: job.error.clone(),
            can_fetch: job.status == JobStatus::Completed,
        }
    }
}

/// `m:ss` below an hour, `h:mm:ss` above, `Unknown` when absent or zero.
pub fn format_duration(seconds: Option<u64>) -> String {
    match seconds {
        None | Some(0) => "Unknown".to_string(),
        Some(total) => {
            let hrs = total / 3600;
            let mins = (total % 3600) / 60;
            let secs = total % 60;
            if hrs > 0 {
                format!("{hrs}:{mins:02}:{secs:02}")
            } else {
                format!("{mins}:{secs:02}")
            }
        }
    }
}

/// Thousands-separated count, `Unknown` when absent or zero.
pub fn format_count(count: Option<u64>) -> String {
    match count {
        None | Some(0) => "Unknown".to_string(),
        Some(value) => {
            let digits = value.to_string();
            let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
            for (index, ch) in digits.chars().enumerate() {
                if index > 0 && (digits.len() - index) % 3 == 0 {
                    grouped.push(',');
                }
                grouped.push(ch);
            }
            grouped
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn durations_switch_to_hours() {
        assert_eq!(format_duration(Some(212)), "3:32");
        assert_eq!(format_duration(Some(3725)), "1:02:05");
        assert_eq!(format_duration(None), "Unknown");
    }

    #[test]
    fn counts_are_grouped() {
        assert_eq!(format_count(Some(999)), "999");
        assert_eq!(format_count(Some(1_234_567)), "1,234,567");
        assert_eq!(format_count(Some(0)), "Unknown");
    }
}
