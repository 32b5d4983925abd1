//! Media transport boundary.
//!
//! The session only talks to a [`MediaTransport`]; transport events come back
//! as [`crate::app::events::PlayerEvent`]s, either pushed by the backend or
//! produced by polling a [`snapshot::SnapshotSource`].

pub mod mpv;
pub mod snapshot;

pub trait MediaTransport {
    async fn load(&self, url: &str) -> anyhow::Result<()>;
    async fn play(&self) -> anyhow::Result<()>;
    async fn pause(&self) -> anyhow::Result<()>;
    /// Absolute seek in seconds
    async fn seek(&self, seconds: f64) -> anyhow::Result<()>;
}

/// How position updates reach the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionFeed {
    /// Backend pushes every time update
    #[default]
    Push,
    /// Session samples a shared snapshot on a fixed interval
    Poll,
}
