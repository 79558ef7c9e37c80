use chrono::Local;
use tubeport_core::{
    AppViewModel, JobRowView, JobStatus, Notification, NotificationLevel, SubjectKind, SubjectView,
};

const TITLE_WIDTH: usize = 40;

/// Full status block: connectivity banner, loaded subject, selection and jobs.
pub fn render(view: &AppViewModel) -> String {
    let mut lines = Vec::new();

    if let Some(banner) = &view.banner {
        lines.push(format!("!! {banner}"));
    }
    if let Some(url) = &view.analyzing {
        lines.push(format!("Loading info for {url} ..."));
    }
    match &view.subject {
        Some(subject) => lines.extend(render_subject(subject)),
        None => lines.push("No video loaded. Use 'analyze <url>'.".to_string()),
    }
    lines.push(format!(
        "Output: {} @ {}",
        view.selection.format.as_str(),
        view.selection.quality.as_str()
    ));
    lines.push(render_jobs(view));
    lines.join("\n")
}

pub fn render_jobs(view: &AppViewModel) -> String {
    let mut lines = vec![format!(
        "Downloads ({}){}",
        view.job_count,
        if view.pending_refresh { " - refreshing" } else { "" }
    )];
    if view.jobs.is_empty() {
        lines.push("  (none)".to_string());
    }
    for (index, row) in view.jobs.iter().enumerate() {
        lines.push(render_row(index + 1, row));
    }
    lines.join("\n")
}

fn render_subject(subject: &SubjectView) -> Vec<String> {
    let mut lines = vec![format!("{} by {}", subject.title, subject.uploader)];
    match subject.kind {
        SubjectKind::Single => lines.push(format!(
            "  Duration: {} | Views: {}",
            subject.duration, subject.views
        )),
        SubjectKind::Collection => {
            lines.push(format!("  Playlist with {} videos", subject.entry_count))
        }
    }
    lines
}

fn render_row(row: usize, job: &JobRowView) -> String {
    let status = match (job.status, job.progress) {
        (JobStatus::InProgress, Some(progress)) => format!("{} {progress:>3}%", job.status),
        (status, _) => status.to_string(),
    };
    let mut line = format!(
        "  {row:>2}. {:<width$} {:>4} {:>5}  {status}  #{}",
        truncate(&job.title, TITLE_WIDTH),
        job.format.as_str(),
        job.quality.as_str(),
        job.job_id,
        width = TITLE_WIDTH
    );
    if job.can_fetch {
        line.push_str("  [fetch]");
    }
    if let Some(error) = &job.error {
        line.push_str(&format!("  ({error})"));
    }
    line
}

pub fn render_notification(notification: &Notification) -> String {
    let tag = match notification.level {
        NotificationLevel::Success => "ok",
        NotificationLevel::Info => "info",
        NotificationLevel::Error => "error",
    };
    format!(
        "[{}] {tag}: {}",
        Local::now().format("%H:%M:%S"),
        notification.text
    )
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    cut.push_str("...");
    cut
}

#[cfg(test)]
mod tests {
    use super::*;
    use tubeport_core::{JobId, OutputFormat, Quality};

    fn row(status: JobStatus, progress: Option<u8>) -> JobRowView {
        JobRowView {
            job_id: JobId::new("a"),
            title: "A fairly ordinary title".into(),
            format: OutputFormat::Mp3,
            quality: Quality::P720,
            status,
            progress,
            error: None,
            can_fetch: status == JobStatus::Completed,
        }
    }

    #[test]
    fn in_progress_rows_show_percentage() {
        let line = render_row(1, &row(JobStatus::InProgress, Some(42)));
        assert!(line.contains("in-progress  42%"), "{line}");
        assert!(!line.contains("[fetch]"));
        assert!(line.contains("#a"), "{line}");
    }

    #[test]
    fn completed_rows_offer_fetch() {
        let line = render_row(3, &row(JobStatus::Completed, None));
        assert!(line.trim_start().starts_with("3."));
        assert!(line.ends_with("[fetch]"));
    }

    #[test]
    fn long_titles_are_shortened() {
        let long = "x".repeat(100);
        let shortened = truncate(&long, TITLE_WIDTH);
        assert_eq!(shortened.chars().count(), TITLE_WIDTH);
        assert!(shortened.ends_with("..."));
    }

    #[test]
    fn empty_view_prompts_for_a_url() {
        let text = render(&AppViewModel::default());
        assert!(text.contains("No video loaded"));
        assert!(text.contains("Downloads (0)"));
    }
}
