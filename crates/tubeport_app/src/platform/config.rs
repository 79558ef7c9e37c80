use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use engine_logging::engine_info;
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use tubeport_engine::{ApiSettings, EngineConfig, PollSettings, ProbeSettings};

use super::logging::LogDestination;

pub const DEFAULT_CONFIG_FILE: &str = "tubeport.ron";
pub const BACKEND_URL_ENV: &str = "TUBEPORT_BACKEND_URL";

/// User-facing settings, read from an optional RON file. Missing fields fall
/// back to the defaults below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub backend_url: String,
    pub poll_interval_ms: u64,
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
    pub output_dir: PathBuf,
    /// Zero disables the reachability probe.
    pub probe_interval_ms: u64,
    pub probe_timeout_ms: u64,
    pub log_destination: LogDestination,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:8001".to_string(),
            poll_interval_ms: 2000,
            connect_timeout_ms: 10_000,
            request_timeout_ms: 30_000,
            output_dir: PathBuf::from("./downloads"),
            probe_interval_ms: 5000,
            probe_timeout_ms: 2000,
            log_destination: LogDestination::File,
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Reads `path` if it exists, then applies the environment override.
    pub fn load(path: &Path) -> Result<Self> {
        let config = Self::from_file(path)?;
        Ok(config.with_backend_override(std::env::var(BACKEND_URL_ENV).ok()))
    }

    fn from_file(path: &Path) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(err) => {
                return Err(err).with_context(|| format!("reading config {}", path.display()))
            }
        };
        let config = ron::from_str(&content)
            .with_context(|| format!("parsing config {}", path.display()))?;
        engine_info!("Loaded config from {:?}", path);
        Ok(config)
    }

    pub fn with_backend_override(mut self, backend_url: Option<String>) -> Self {
        if let Some(url) = backend_url.map(|url| url.trim().to_string()) {
            if !url.is_empty() {
                self.backend_url = url;
            }
        }
        self
    }

    pub fn level_filter(&self) -> LevelFilter {
        self.log_level.parse().unwrap_or(LevelFilter::Info)
    }

    pub fn engine_config(&self) -> EngineConfig {
        let probe = (self.probe_interval_ms > 0).then(|| ProbeSettings {
            interval: Duration::from_millis(self.probe_interval_ms),
            timeout: Duration::from_millis(self.probe_timeout_ms.max(1)),
        });
        EngineConfig {
            api: ApiSettings {
                base_url: self.backend_url.clone(),
                // reqwest fails every request on a zero timeout.
                connect_timeout: Duration::from_millis(self.connect_timeout_ms.max(1)),
                request_timeout: Duration::from_millis(self.request_timeout_ms.max(1)),
            },
            poll: PollSettings {
                interval: Duration::from_millis(self.poll_interval_ms.max(1)),
                start_active: true,
            },
            probe,
            output_dir: self.output_dir.clone(),
        }
    }
}
