//! Local folder scanner
//!
//! Lists audio files directly inside `<root>/<folder>`, oldest first, and
//! pairs each with a sibling `.lrc` file when one exists.

use super::{DiscoveryError, DiscoverySource, TrackDescriptor};
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

pub const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "ogg", "flac", "m4a", "aac", "opus", "webm"];

#[derive(Debug, Clone)]
pub struct FolderScanner {
    root: PathBuf,
}

impl FolderScanner {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn scan_blocking(root: &Path, folder: &str) -> Result<Vec<TrackDescriptor>, DiscoveryError> {
        let folder = folder.trim();
        if folder.is_empty() {
            return Err(DiscoveryError::NoFolder);
        }
        let dir = root.join(folder);
        if !dir.is_dir() {
            return Err(DiscoveryError::FolderNotFound(folder.to_string()));
        }

        let entries = std::fs::read_dir(&dir)
            .map_err(|e| DiscoveryError::Transport(format!("read {}: {e}", dir.display())))?;

        let mut tracks = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if !is_audio(&path) {
                continue;
            }
            // Files can vanish between listing and stat; skip those.
            let Ok(meta) = entry.metadata() else { continue };
            if !meta.is_file() {
                continue;
            }
            let mtime = meta
                .modified()
                .ok()
                .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
                .map(|d| d.as_secs_f64())
                .unwrap_or(0.0);

            let lrc = path.with_extension("lrc");
            let path_str = path.to_string_lossy().into_owned();
            tracks.push(TrackDescriptor {
                filename: entry.file_name().to_string_lossy().into_owned(),
                url: path_str.clone(),
                lrc_url: lrc.is_file().then(|| lrc.to_string_lossy().into_owned()),
                path: path_str,
                mtime,
            });
        }

        tracks.sort_by(|a, b| a.mtime.total_cmp(&b.mtime));
        Ok(tracks)
    }
}

impl DiscoverySource for FolderScanner {
    async fn scan(&self, folder: &str) -> Result<Vec<TrackDescriptor>, DiscoveryError> {
        let root = self.root.clone();
        let folder = folder.to_string();
        tokio::task::spawn_blocking(move || Self::scan_blocking(&root, &folder))
            .await
            .map_err(|e| DiscoveryError::Transport(e.to_string()))?
    }
}

fn is_audio(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| AUDIO_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use std::time::{Duration, SystemTime};

    fn touch(path: &Path, secs_after_epoch: u64) {
        let f = File::create(path).unwrap();
        f.set_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(secs_after_epoch))
            .unwrap();
    }

    #[tokio::test]
    async fn test_scan_orders_by_mtime_and_pairs_lrc() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("audio");
        fs::create_dir(&dir).unwrap();
        touch(&dir.join("b.mp3"), 2_000);
        touch(&dir.join("a.FLAC"), 1_000);
        touch(&dir.join("a.lrc"), 1_000);
        touch(&dir.join("notes.txt"), 500);
        fs::create_dir(dir.join("nested.mp3")).unwrap();

        let scanner = FolderScanner::new(root.path());
        let tracks = scanner.scan("audio").await.unwrap();

        let names: Vec<_> = tracks.iter().map(|t| t.filename.as_str()).collect();
        assert_eq!(names, vec!["a.FLAC", "b.mp3"]);
        assert_eq!(tracks[0].mtime, 1_000.0);
        assert!(tracks[0].lrc_url.as_deref().unwrap().ends_with("a.lrc"));
        assert_eq!(tracks[1].lrc_url, None);
        assert_eq!(tracks[1].url, tracks[1].path);
    }

    #[tokio::test]
    async fn test_scan_errors() {
        let root = tempfile::tempdir().unwrap();
        let scanner = FolderScanner::new(root.path());
        assert_eq!(scanner.scan("  ").await, Err(DiscoveryError::NoFolder));
        assert_eq!(
            scanner.scan("missing").await,
            Err(DiscoveryError::FolderNotFound("missing".into()))
        );
    }
}
