//! Remote scan endpoint client
//!
//! `GET {base}/radio_player/scan?folder=<folder>` answers with
//! `{"tracks": [...]}` on success and `{"error": "..."}` otherwise.

use super::{DiscoveryError, DiscoverySource, TrackDescriptor};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct ScanResponse {
    #[serde(default)]
    tracks: Vec<TrackDescriptor>,
    error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ScanClient {
    client: reqwest::Client,
    base_url: String,
}

impl ScanClient {
    const USER_AGENT: &'static str = concat!("lrc-radio/", env!("CARGO_PKG_VERSION"));

    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(Self::USER_AGENT)
            .timeout(std::time::Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn scan_url(&self, folder: &str) -> String {
        format!(
            "{}/radio_player/scan?folder={}",
            self.base_url,
            urlencoding::encode(folder.trim())
        )
    }

    /// Turn endpoint-relative media URLs into absolute ones the transport can open.
    fn absolutize(&self, mut t: TrackDescriptor) -> TrackDescriptor {
        if t.url.starts_with('/') {
            t.url = format!("{}{}", self.base_url, t.url);
        }
        if let Some(lrc) = t.lrc_url.as_mut()
            && lrc.starts_with('/')
        {
            *lrc = format!("{}{}", self.base_url, lrc);
        }
        t
    }

    fn decode(&self, body: &str) -> Result<Vec<TrackDescriptor>, DiscoveryError> {
        let parsed: ScanResponse = serde_json::from_str(body)
            .map_err(|e| DiscoveryError::Transport(format!("decode scan response: {e}")))?;
        if let Some(err) = parsed.error {
            return Err(DiscoveryError::Server(err));
        }
        Ok(parsed.tracks.into_iter().map(|t| self.absolutize(t)).collect())
    }
}

impl DiscoverySource for ScanClient {
    async fn scan(&self, folder: &str) -> Result<Vec<TrackDescriptor>, DiscoveryError> {
        if folder.trim().is_empty() {
            return Err(DiscoveryError::NoFolder);
        }
        let response = self
            .client
            .get(self.scan_url(folder))
            .send()
            .await
            .map_err(|e| DiscoveryError::Transport(e.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| DiscoveryError::Transport(e.to_string()))?;

        // Error responses still carry a JSON body with a message.
        match self.decode(&body) {
            Err(DiscoveryError::Transport(_)) if !status.is_success() => {
                Err(DiscoveryError::Transport(format!("scan endpoint returned {status}")))
            }
            other => other,
        }
    }
}
