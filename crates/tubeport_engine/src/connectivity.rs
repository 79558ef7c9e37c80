use std::sync::Arc;
use std::time::Duration;

use engine_logging::{engine_debug, engine_info};
use reqwest::Url;
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::sink::EventSink;
use crate::EngineEvent;

#[derive(Debug, Clone)]
pub struct ProbeSettings {
    pub interval: Duration,
    pub timeout: Duration,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            timeout: Duration::from_secs(2),
        }
    }
}

/// Host and port a TCP probe should dial for the given API base.
pub fn probe_target(base_url: &Url) -> Option<(String, u16)> {
    let host = base_url.host_str()?.to_string();
    let port = base_url.port_or_known_default()?;
    Some((host, port))
}

pub async fn probe_once(host: &str, port: u16, timeout: Duration) -> bool {
    matches!(
        tokio::time::timeout(timeout, TcpStream::connect((host, port))).await,
        Ok(Ok(_))
    )
}

/// Background reachability check that reports transitions only. Starts from
/// the assumption that the network is up.
pub struct ConnectivityProbe {
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl ConnectivityProbe {
    pub fn spawn(
        target: (String, u16),
        settings: ProbeSettings,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let (host, port) = target;
        let task = tokio::spawn(async move {
            let mut online = true;
            let mut ticker = tokio::time::interval(settings.interval);
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {}
                }
                let reachable = probe_once(&host, port, settings.timeout).await;
                if reachable != online {
                    engine_info!(
                        "Backend {}:{} is {}",
                        host,
                        port,
                        if reachable { "reachable" } else { "unreachable" }
                    );
                    online = reachable;
                    sink.emit(EngineEvent::Connectivity { online });
                } else {
                    engine_debug!("Probe {}:{} unchanged ({})", host, port, reachable);
                }
            }
        });
        Self {
            cancel,
            task: Some(task),
        }
    }

    pub fn stop(&mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for ConnectivityProbe {
    fn drop(&mut self) {
        self.stop();
    }
}
