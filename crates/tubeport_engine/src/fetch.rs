use std::time::Duration;

use bytes::Bytes;
use engine_logging::{engine_debug, engine_trace};
use reqwest::Url;
use serde::de::DeserializeOwned;
use tubeport_core::{Job, JobId, OutputSelection, Subject, SubjectKind};

use crate::wire::{
    decode_job_rows, Envelope, ErrorBody, PlaylistInfoDto, StartRequest, UrlRequest, VideoInfoDto,
};
use crate::{FailureKind, FetchError};

#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8001".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Client side of the conversion service. Every call reports failure once;
/// nothing is retried here.
#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    /// `kind` picks the endpoint; the caller classifies the URL.
    async fn analyze_subject(&self, url: &str, kind: SubjectKind) -> Result<Subject, FetchError>;
    async fn start_job(&self, url: &str, selection: OutputSelection) -> Result<(), FetchError>;
    async fn list_jobs(&self) -> Result<Vec<Job>, FetchError>;
    async fn delete_job(&self, id: &JobId) -> Result<(), FetchError>;
    async fn fetch_result(&self, id: &JobId) -> Result<Bytes, FetchError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    client: reqwest::Client,
    base_url: Url,
}

impl ReqwestFetcher {
    pub fn new(settings: ApiSettings) -> Result<Self, FetchError> {
        let base_url = Url::parse(settings.base_url.trim())
            .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(FetchError::new(
                FailureKind::InvalidUrl,
                format!("{base_url} cannot be used as an API base"),
            ));
        }
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| FetchError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self { client, base_url })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, FetchError> {
        let response = request.send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let detail = response
            .json::<ErrorBody>()
            .await
            .ok()
            .map(ErrorBody::into_text);
        Err(
            FetchError::new(FailureKind::HttpStatus(status.as_u16()), status.to_string())
                .with_detail(detail),
        )
    }

    async fn envelope<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<Envelope<T>, FetchError> {
        let response = self.send(request).await?;
        let envelope: Envelope<T> = response.json().await.map_err(map_body_error)?;
        if !envelope.success {
            return Err(
                FetchError::new(FailureKind::Rejected, "server reported success=false")
                    .with_detail(envelope.message),
            );
        }
        Ok(envelope)
    }

    async fn data<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, FetchError> {
        self.envelope(request)
            .await?
            .data
            .ok_or_else(|| FetchError::new(FailureKind::Decode, "response is missing data"))
    }
}

#[async_trait::async_trait]
impl Fetcher for ReqwestFetcher {
    async fn analyze_subject(&self, url: &str, kind: SubjectKind) -> Result<Subject, FetchError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(FetchError::new(FailureKind::InvalidUrl, "url is empty"));
        }
        let body = UrlRequest { url };
        match kind {
            SubjectKind::Collection => {
                let endpoint = self.endpoint(&["api", "playlist-info"]);
                engine_debug!("Analyzing collection {}", url);
                let dto: PlaylistInfoDto =
                    self.data(self.client.post(endpoint).json(&body)).await?;
                Ok(dto.into_subject(url))
            }
            SubjectKind::Single => {
                let endpoint = self.endpoint(&["api", "video-info"]);
                engine_debug!("Analyzing single item {}", url);
                let dto: VideoInfoDto = self.data(self.client.post(endpoint).json(&body)).await?;
                Ok(dto.into_subject(url))
            }
        }
    }

    async fn start_job(&self, url: &str, selection: OutputSelection) -> Result<(), FetchError> {
        let body = StartRequest {
            url,
            format: selection.format.as_str(),
            quality: selection.quality.as_str(),
        };
        let endpoint = self.endpoint(&["api", "download"]);
        let envelope: Envelope<serde_json::Value> =
            self.envelope(self.client.post(endpoint).json(&body)).await?;
        engine_debug!(
            "Start acknowledged for {} (server id {:?})",
            url,
            envelope.download_id
        );
        Ok(())
    }

    async fn list_jobs(&self) -> Result<Vec<Job>, FetchError> {
        let endpoint = self.endpoint(&["api", "downloads"]);
        let rows: Vec<serde_json::Value> = self.data(self.client.get(endpoint)).await?;
        engine_trace!("Listed {} jobs", rows.len());
        Ok(decode_job_rows(rows))
    }

    async fn delete_job(&self, id: &JobId) -> Result<(), FetchError> {
        let endpoint = self.endpoint(&["api", "download", id.as_str()]);
        let _: Envelope<serde_json::Value> = self.envelope(self.client.delete(endpoint)).await?;
        Ok(())
    }

    async fn fetch_result(&self, id: &JobId) -> Result<Bytes, FetchError> {
        let endpoint = self.endpoint(&["api", "download", id.as_str(), "file"]);
        let response = self.send(self.client.get(endpoint)).await?;
        response.bytes().await.map_err(map_reqwest_error)
    }
}

fn map_reqwest_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        return FetchError::new(FailureKind::Timeout, err.to_string());
    }
    FetchError::new(FailureKind::Network, err.to_string())
}

fn map_body_error(err: reqwest::Error) -> FetchError {
    if err.is_decode() {
        return FetchError::new(FailureKind::Decode, err.to_string());
    }
    map_reqwest_error(err)
}
