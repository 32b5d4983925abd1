//! Track discovery: where new tracks come from.
//!
//! A source is scanned repeatedly by the [`poller::Poller`]; every scan returns
//! the full current listing and the queue dedups it.

pub mod folder;
pub mod http;
pub mod poller;

pub use folder::FolderScanner;
pub use http::ScanClient;

use crate::config::SourceConfig;
use serde::{Deserialize, Serialize};
use std::future::Future;

/// Track as reported by a scan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackDescriptor {
    /// Stable identity (full path of the audio file)
    pub path: String,
    /// Playable media URL or path
    pub url: String,
    /// Lyric document URL or path, if a sibling `.lrc` exists
    #[serde(default)]
    pub lrc_url: Option<String>,
    pub filename: String,
    /// Last-modified time, seconds since the epoch
    pub mtime: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DiscoveryError {
    #[error("No folder specified")]
    NoFolder,
    #[error("Folder not found: {0}")]
    FolderNotFound(String),
    #[error("{0}")]
    Server(String),
    #[error("Scan error: {0}")]
    Transport(String),
}

pub trait DiscoverySource: Send + Sync + 'static {
    /// Scan `folder` and return every track currently in it.
    fn scan(
        &self,
        folder: &str,
    ) -> impl Future<Output = Result<Vec<TrackDescriptor>, DiscoveryError>> + Send;
}

/// The configured discovery backend
#[derive(Debug, Clone)]
pub enum Source {
    Folder(FolderScanner),
    Endpoint(ScanClient),
}

impl Source {
    /// Scan endpoint if one is configured, otherwise the local library.
    pub fn from_config(cfg: &SourceConfig) -> anyhow::Result<Self> {
        match cfg.endpoint.as_deref().map(str::trim) {
            Some(base) if !base.is_empty() => Ok(Source::Endpoint(ScanClient::new(base)?)),
            _ => Ok(Source::Folder(FolderScanner::new(cfg.library_root.clone()))),
        }
    }
}

impl DiscoverySource for Source {
    async fn scan(&self, folder: &str) -> Result<Vec<TrackDescriptor>, DiscoveryError> {
        match self {
            Source::Folder(s) => s.scan(folder).await,
            Source::Endpoint(s) => s.scan(folder).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_follows_config() {
        let mut cfg = SourceConfig::default();
        assert!(matches!(Source::from_config(&cfg).unwrap(), Source::Folder(_)));

        cfg.endpoint = Some("  ".to_string());
        assert!(matches!(Source::from_config(&cfg).unwrap(), Source::Folder(_)));

        cfg.endpoint = Some("http://127.0.0.1:8188".to_string());
        match Source::from_config(&cfg).unwrap() {
            Source::Endpoint(c) => assert_eq!(c.base_url(), "http://127.0.0.1:8188"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_descriptor_matches_scan_json() {
        let raw = r#"{"filename":"a.mp3","path":"/out/a.mp3","mtime":12.5,
            "url":"/radio_player/audio?path=/out/a.mp3","lrc_url":null}"#;
        let d: TrackDescriptor = serde_json::from_str(raw).unwrap();
        assert_eq!(d.path, "/out/a.mp3");
        assert_eq!(d.lrc_url, None);
        assert_eq!(d.mtime, 12.5);
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(DiscoveryError::NoFolder.to_string(), "No folder specified");
        assert_eq!(
            DiscoveryError::FolderNotFound("x".into()).to_string(),
            "Folder not found: x"
        );
    }
}
