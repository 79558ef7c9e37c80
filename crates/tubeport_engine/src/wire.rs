//! JSON shapes exchanged with the conversion service and their mapping onto
//! core types.

use engine_logging::engine_warn;
use serde::{Deserialize, Serialize};
use tubeport_core::{
    CollectionEntry, Job, JobId, JobStatus, OutputFormat, Quality, Subject, SubjectKind,
    SubjectMetadata,
};

use crate::{FailureKind, FetchError};

#[derive(Debug, Serialize)]
pub(crate) struct UrlRequest<'a> {
    pub url: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct StartRequest<'a> {
    pub url: &'a str,
    pub format: &'a str,
    pub quality: &'a str,
}

/// `{success, data?, message?, download_id?}`
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub download_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub detail: serde_json::Value,
}

impl ErrorBody {
    /// `detail` is usually a string; validation errors send a structured value.
    pub fn into_text(self) -> String {
        match self.detail {
            serde_json::Value::String(text) => text,
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct VideoInfoDto {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub uploader: Option<String>,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub view_count: Option<u64>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PlaylistEntryDto {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub duration: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PlaylistInfoDto {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub uploader: Option<String>,
    #[serde(default)]
    pub entries: Vec<PlaylistEntryDto>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum StatusDto {
    Pending,
    #[serde(alias = "in-progress", alias = "in_progress", alias = "downloading")]
    InProgress,
    Completed,
    #[serde(alias = "error")]
    Failed,
}

impl From<StatusDto> for JobStatus {
    fn from(value: StatusDto) -> Self {
        match value {
            StatusDto::Pending => JobStatus::Pending,
            StatusDto::InProgress => JobStatus::InProgress,
            StatusDto::Completed => JobStatus::Completed,
            StatusDto::Failed => JobStatus::Failed,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct JobDto {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    pub format: String,
    pub quality: String,
    pub status: StatusDto,
    #[serde(default)]
    pub progress: Option<f64>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl JobDto {
    pub fn into_job(self) -> Result<Job, FetchError> {
        let format = OutputFormat::parse(&self.format).ok_or_else(|| {
            FetchError::new(
                FailureKind::Decode,
                format!("job {} has unknown format {:?}", self.id, self.format),
            )
        })?;
        let quality = Quality::parse(&self.quality).ok_or_else(|| {
            FetchError::new(
                FailureKind::Decode,
                format!("job {} has unknown quality {:?}", self.id, self.quality),
            )
        })?;
        Ok(Job {
            id: JobId::new(self.id),
            title: self.title.unwrap_or_else(|| "Unknown".to_string()),
            url: self.url.unwrap_or_default(),
            format,
            quality,
            status: self.status.into(),
            progress: clamp_progress(self.progress),
            error: self.error,
            created_at: self.created_at,
        })
    }
}

/// Decodes each row on its own. Rows this client cannot represent (another
/// client's `quality: "best"`, an unknown status) are skipped with a warning.
pub(crate) fn decode_job_rows(rows: Vec<serde_json::Value>) -> Vec<Job> {
    rows.into_iter()
        .filter_map(|row| {
            let decoded = serde_json::from_value::<JobDto>(row)
                .map_err(|err| FetchError::new(FailureKind::Decode, err.to_string()))
                .and_then(JobDto::into_job);
            match decoded {
                Ok(job) => Some(job),
                Err(err) => {
                    engine_warn!("Skipping job row: {}", err);
                    None
                }
            }
        })
        .collect()
}

/// Server progress may be fractional; round and clamp to a whole percentage.
pub(crate) fn clamp_progress(progress: Option<f64>) -> u8 {
    match progress {
        Some(value) if value.is_finite() => value.round().clamp(0.0, 100.0) as u8,
        _ => 0,
    }
}

fn whole_seconds(duration: Option<f64>) -> Option<u64> {
    duration
        .filter(|secs| secs.is_finite() && *secs >= 0.0)
        .map(|secs| secs.round() as u64)
}

impl VideoInfoDto {
    pub fn into_subject(self, url: &str) -> Subject {
        Subject {
            kind: SubjectKind::Single,
            url: url.to_string(),
            metadata: SubjectMetadata {
                title: self.title.unwrap_or_default(),
                duration_secs: whole_seconds(self.duration),
                view_count: self.view_count,
                uploader: self.uploader.unwrap_or_default(),
                description: self.description.unwrap_or_default(),
                thumbnail: self.thumbnail,
                entries: Vec::new(),
            },
        }
    }
}

impl PlaylistInfoDto {
    pub fn into_subject(self, url: &str) -> Subject {
        let entries = self
            .entries
            .into_iter()
            .map(|entry| CollectionEntry {
                id: entry.id.unwrap_or_default(),
                title: entry.title.unwrap_or_default(),
                url: entry.url,
                duration_secs: whole_seconds(entry.duration),
            })
            .collect();
        Subject {
            kind: SubjectKind::Collection,
            url: url.to_string(),
            metadata: SubjectMetadata {
                title: self.title.unwrap_or_default(),
                uploader: self.uploader.unwrap_or_default(),
                entries,
                ..SubjectMetadata::default()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_is_rounded_and_clamped() {
        assert_eq!(clamp_progress(Some(42.6)), 43);
        assert_eq!(clamp_progress(Some(-3.0)), 0);
        assert_eq!(clamp_progress(Some(140.0)), 100);
        assert_eq!(clamp_progress(Some(f64::NAN)), 0);
        assert_eq!(clamp_progress(None), 0);
    }

    #[test]
    fn status_aliases_map_onto_core_states() {
        let parsed: Vec<StatusDto> =
            serde_json::from_str(r#"["pending","downloading","in-progress","completed","error"]"#)
                .unwrap();
        let statuses: Vec<JobStatus> = parsed.into_iter().map(JobStatus::from).collect();
        assert_eq!(
            statuses,
            vec![
                JobStatus::Pending,
                JobStatus::InProgress,
                JobStatus::InProgress,
                JobStatus::Completed,
                JobStatus::Failed,
            ]
        );
    }

    #[test]
    fn undecodable_rows_are_skipped() {
        let rows: Vec<serde_json::Value> = serde_json::from_str(
            r#"[
                {"id":"a","format":"mp4","quality":"720p","status":"pending"},
                {"id":"b","format":"mp4","quality":"720p","status":"paused"},
                {"id":"c","format":"mp3","quality":"360p","status":"completed"},
                {"title":"no id"}
            ]"#,
        )
        .unwrap();
        let ids: Vec<String> = decode_job_rows(rows)
            .into_iter()
            .map(|job| job.id.to_string())
            .collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[test]
    fn job_with_unknown_format_is_a_decode_error() {
        let dto: JobDto = serde_json::from_str(
            r#"{"id":"1","format":"flac","quality":"720p","status":"pending"}"#,
        )
        .unwrap();
        assert_eq!(dto.into_job().unwrap_err().kind, FailureKind::Decode);
    }
}
