//! Lyric document fetcher
//!
//! A track's lyric URL is either an http(s) URL (possibly relative to the
//! scan endpoint) or a local `.lrc` path found by the folder scanner.

use std::path::Path;

/// Result of fetching one lyric document
#[derive(Debug, Clone, PartialEq)]
pub enum LyricsFetch {
    Document(String),
    /// 404 or missing file: "lyrics not found"
    NotFound,
    /// Network, I/O or server failure: "error loading lyrics"
    Failed(String),
}

#[derive(Debug, thiserror::Error)]
pub enum LyricsError {
    #[error("lyrics request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("lyrics server returned {0}")]
    Status(reqwest::StatusCode),
    #[error("read lyrics file: {0}")]
    Io(#[from] std::io::Error),
}

/// Lyric document client
#[derive(Debug, Clone)]
pub struct LyricsClient {
    client: reqwest::Client,
    base_url: Option<String>,
}

impl LyricsClient {
    const USER_AGENT: &'static str = concat!("lrc-radio/", env!("CARGO_PKG_VERSION"));

    /// `base_url` resolves relative URLs such as `/radio_player/lrc?path=...`.
    pub fn new(base_url: Option<String>) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(Self::USER_AGENT)
            .timeout(std::time::Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.map(|b| b.trim_end_matches('/').to_string()),
        })
    }

    pub async fn fetch(&self, url: &str) -> LyricsFetch {
        let result = if is_remote(url) || (url.starts_with('/') && self.base_url.is_some()) {
            self.fetch_http(&self.resolve(url)).await
        } else {
            read_local(Path::new(url)).await
        };

        match result {
            Ok(Some(text)) => LyricsFetch::Document(text),
            Ok(None) => LyricsFetch::NotFound,
            Err(e) => {
                tracing::warn!(url, error = %e, "lyrics fetch failed");
                LyricsFetch::Failed(e.to_string())
            }
        }
    }

    fn resolve(&self, url: &str) -> String {
        match &self.base_url {
            Some(base) if url.starts_with('/') => format!("{base}{url}"),
            _ => url.to_string(),
        }
    }

    async fn fetch_http(&self, url: &str) -> Result<Option<String>, LyricsError> {
        let response = self.client.get(url).send().await?;

        if response.status().is_success() {
            Ok(Some(response.text().await?))
        } else if response.status() == reqwest::StatusCode::NOT_FOUND {
            Ok(None)
        } else {
            Err(LyricsError::Status(response.status()))
        }
    }
}

fn is_remote(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

async fn read_local(path: &Path) -> Result<Option<String>, LyricsError> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_local_document_and_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let lrc = dir.path().join("song.lrc");
        std::fs::write(&lrc, "[00:01.00]hi\n").unwrap();

        let client = LyricsClient::new(None).unwrap();
        let got = client.fetch(lrc.to_str().unwrap()).await;
        assert_eq!(got, LyricsFetch::Document("[00:01.00]hi\n".to_string()));

        let missing = dir.path().join("nope.lrc");
        assert_eq!(client.fetch(missing.to_str().unwrap()).await, LyricsFetch::NotFound);
    }

    #[tokio::test]
    async fn test_directory_is_a_failure_not_missing() {
        let dir = tempfile::tempdir().unwrap();
        let client = LyricsClient::new(None).unwrap();
        let got = client.fetch(dir.path().to_str().unwrap()).await;
        assert!(matches!(got, LyricsFetch::Failed(_)));
    }

    #[test]
    fn test_relative_urls_resolve_against_base() {
        let client = LyricsClient::new(Some("http://host:8188/".to_string())).unwrap();
        assert_eq!(
            client.resolve("/radio_player/lrc?path=a.lrc"),
            "http://host:8188/radio_player/lrc?path=a.lrc"
        );
        assert_eq!(client.resolve("https://x/y.lrc"), "https://x/y.lrc");
    }
}
