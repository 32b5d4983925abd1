use crate::player::PositionFeed;
use anyhow::Context;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub source: SourceConfig,
    pub lyrics: LyricsConfig,
    pub player: PlayerConfig,
    pub input: InputConfig,
    pub paths: PathsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Folder to watch, relative to `library_root` (or the scan endpoint's root)
    pub folder: String,
    /// Local directory that `folder` is resolved against.
    pub library_root: PathBuf,
    /// Scan over HTTP instead of reading the filesystem, e.g. "http://127.0.0.1:8188"
    pub endpoint: Option<String>,
    pub poll_interval_secs: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LyricsConfig {
    /// Blank lines framing the lyric timeline
    pub padding: usize,
    /// Lines shown above and below the current one
    pub context_lines: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// mpv audio device name (see `mpv --audio-device=help`)
    pub audio_device: Option<String>,
    /// Volume level (0-100)
    pub volume: u8,
    /// Delay before skipping a track that failed to play
    pub error_skip_delay_ms: u64,
    pub position_feed: PositionFeed,
    /// Sampling interval for `position_feed = "poll"`
    pub position_poll_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub mouse: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub data_dir: PathBuf,
}

impl Config {
    /// Command-line overrides. They last for this run and are never written back.
    pub fn apply_overrides(&mut self, folder: Option<String>, endpoint: Option<String>) {
        if let Some(folder) = folder {
            self.source.folder = folder;
        }
        if let Some(endpoint) = endpoint {
            self.source.endpoint = Some(endpoint);
        }
    }
}

/// Bounds for the scan interval, in seconds
pub const POLL_INTERVAL_SECS: (f64, f64) = (0.5, 3600.0);

impl SourceConfig {
    pub fn poll_interval(&self) -> Duration {
        let (min, max) = POLL_INTERVAL_SECS;
        Duration::from_secs_f64(self.poll_interval_secs.clamp(min, max))
    }
}

impl PlayerConfig {
    pub fn error_skip_delay(&self) -> Duration {
        Duration::from_millis(self.error_skip_delay_ms)
    }

    pub fn position_poll(&self) -> Duration {
        Duration::from_millis(self.position_poll_ms.max(10))
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            folder: "audio".to_string(),
            library_root: PathBuf::from("output"),
            endpoint: None,
            poll_interval_secs: 5.0,
        }
    }
}

impl Default for LyricsConfig {
    fn default() -> Self {
        Self {
            padding: 8,
            context_lines: 2,
        }
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            audio_device: None,
            volume: 80,
            error_skip_delay_ms: 500,
            position_feed: PositionFeed::Push,
            position_poll_ms: 300,
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self { mouse: true }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        let proj = ProjectDirs::from("dev", "lrc-radio", "lrc-radio");
        let data_dir = proj
            .as_ref()
            .map(|p| p.data_dir().to_path_buf())
            .unwrap_or_else(|| std::env::temp_dir().join("lrc-radio"));
        Self { data_dir }
    }
}

fn save(cfg: &Config, override_path: Option<&Path>) -> anyhow::Result<()> {
    let path = match override_path {
        Some(p) => p.to_path_buf(),
        None => default_config_path()?,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("create dir {}", parent.display()))?;
    }
    let raw = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&path, raw).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

fn default_config_path() -> anyhow::Result<PathBuf> {
    let proj = ProjectDirs::from("dev", "lrc-radio", "lrc-radio")
        .context("ProjectDirs unavailable")?;
    Ok(proj.config_dir().join("config.toml"))
}

/// Load the config, writing the defaults on first run.
pub fn load(override_path: Option<&Path>) -> anyhow::Result<Config> {
    let path = match override_path {
        Some(p) => p.to_path_buf(),
        None => default_config_path()?,
    };

    if !path.exists() {
        let cfg = Config::default();
        save(&cfg, Some(&path))?;
        tracing::debug!(path = %path.display(), "wrote default config");
        return Ok(cfg);
    }

    let raw = fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
    let cfg = toml::from_str::<Config>(&raw).with_context(|| format!("parse {}", path.display()))?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_load_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let cfg = load(Some(&path)).unwrap();
        assert!(path.exists());
        assert_eq!(cfg.lyrics.padding, 8);
        assert_eq!(cfg.source.poll_interval(), Duration::from_secs(5));

        let again = load(Some(&path)).unwrap();
        assert_eq!(again.source.folder, "audio");
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "[source]\nfolder = \"radio\"\npoll_interval_secs = 30.0\n\n[player]\nposition_feed = \"poll\"\n",
        )
        .unwrap();
        let cfg = load(Some(&path)).unwrap();
        assert_eq!(cfg.source.folder, "radio");
        assert_eq!(cfg.source.poll_interval(), Duration::from_secs(30));
        assert_eq!(cfg.player.position_feed, PositionFeed::Poll);
        assert_eq!(cfg.player.error_skip_delay(), Duration::from_millis(500));
        assert_eq!(cfg.lyrics.context_lines, 2);
    }

    #[test]
    fn test_garbage_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "source = 3").unwrap();
        assert!(load(Some(&path)).is_err());
    }

    #[test]
    fn test_overrides_are_not_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[source]\nfolder = \"radio\"\n").unwrap();
        let before = fs::read_to_string(&path).unwrap();

        let mut cfg = load(Some(&path)).unwrap();
        cfg.apply_overrides(Some("elsewhere".into()), Some("http://127.0.0.1:8188".into()));
        assert_eq!(cfg.source.folder, "elsewhere");
        assert_eq!(cfg.source.endpoint.as_deref(), Some("http://127.0.0.1:8188"));

        assert_eq!(fs::read_to_string(&path).unwrap(), before);
        let reloaded = load(Some(&path)).unwrap();
        assert_eq!(reloaded.source.folder, "radio");
        assert_eq!(reloaded.source.endpoint, None);
    }
}
