use super::snapshot::SharedSnapshot;
use super::{MediaTransport, PositionFeed};
use crate::app::events::{Event, PlayerEvent};
use anyhow::Context;
use serde_json::json;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
    net::UnixStream,
    process::{Child, Command},
    sync::mpsc,
    task::JoinHandle,
};

#[derive(Debug)]
pub struct MpvHandle {
    child: Child,
    socket_path: PathBuf,
    writer: tokio::sync::Mutex<tokio::io::WriteHalf<UnixStream>>,
    request_id: AtomicU64,
    snapshot: SharedSnapshot,
    reader: JoinHandle<()>,
}

impl MpvHandle {
    pub async fn spawn(
        event_tx: mpsc::Sender<Event>,
        audio_device: Option<&str>,
        log_file: Option<&std::path::Path>,
        feed: PositionFeed,
    ) -> anyhow::Result<Self> {
        let socket_path =
            std::env::temp_dir().join(format!("lrc-radio-mpv-{}.sock", std::process::id()));
        let _ = std::fs::remove_file(&socket_path);

        let mut cmd = Command::new("mpv");
        cmd.args([
            "--no-video",
            "--idle=yes",
            "--input-terminal=no",
            // mpv's own log goes to --log-file; errors arrive as end-file events
            "--really-quiet",
        ]);
        if let Some(dev) = audio_device {
            cmd.arg(format!("--audio-device={dev}"));
        }
        if let Some(p) = log_file {
            cmd.arg(format!("--log-file={}", p.display()));
        }
        let child = cmd
            .arg(format!("--input-ipc-server={}", socket_path.display()))
            .stdin(std::process::Stdio::null())
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .context("spawn mpv")?;

        // Connect (mpv creates the socket shortly after starting).
        let stream = connect_with_retry(&socket_path).await?;
        let (reader, writer) = tokio::io::split(stream);

        let snapshot = SharedSnapshot::default();
        // Pump mpv JSON events -> app events.
        let reader = tokio::spawn(read_events_loop(reader, event_tx, snapshot.clone(), feed));

        let this = Self {
            child,
            socket_path,
            writer: tokio::sync::Mutex::new(writer),
            request_id: AtomicU64::new(1),
            snapshot,
            reader,
        };

        for command in startup_commands() {
            this.command(command).await?;
        }

        tracing::info!(socket = %this.socket_path.display(), ?feed, "mpv ready");
        Ok(this)
    }

    /// State mirror for [`PositionFeed::Poll`].
    pub fn snapshot(&self) -> SharedSnapshot {
        self.snapshot.clone()
    }

    pub async fn set_volume(&self, volume_0_100: u8) -> anyhow::Result<()> {
        self.command(json!({"command":["set_property", "volume", volume_0_100]}))
            .await
    }

    async fn command(&self, mut v: serde_json::Value) -> anyhow::Result<()> {
        // Tag requests so we can get structured errors back on the IPC stream.
        if v.get("request_id").is_none() {
            let id = self.request_id.fetch_add(1, Ordering::Relaxed);
            if let serde_json::Value::Object(ref mut o) = v {
                o.insert("request_id".to_string(), serde_json::Value::from(id));
            }
        }
        let mut w = self.writer.lock().await;
        let mut line = serde_json::to_vec(&v).context("encode mpv json")?;
        line.push(b'\n');
        w.write_all(&line).await.context("write mpv ipc")?;
        w.flush().await.context("flush mpv ipc")?;
        Ok(())
    }
}

impl MediaTransport for MpvHandle {
    async fn load(&self, url: &str) -> anyhow::Result<()> {
        self.snapshot.update(|s| {
            s.ended = false;
            s.position = 0.0;
        });
        self.command(json!({"command":["loadfile", url, "replace"]})).await
    }

    async fn play(&self) -> anyhow::Result<()> {
        self.command(json!({"command":["set_property", "pause", false]}))
            .await
    }

    async fn pause(&self) -> anyhow::Result<()> {
        self.command(json!({"command":["set_property", "pause", true]}))
            .await
    }

    async fn seek(&self, seconds: f64) -> anyhow::Result<()> {
        self.command(json!({"command":["seek", seconds.max(0.0), "absolute"]}))
            .await
    }
}

impl Drop for MpvHandle {
    fn drop(&mut self) {
        self.reader.abort();
        let _ = self.child.start_kill();
        let _ = std::fs::remove_file(&self.socket_path);
    }
}

async fn connect_with_retry(path: &PathBuf) -> anyhow::Result<UnixStream> {
    let deadline = tokio::time::Instant::now() + std::time::Duration::from_secs(5);
    loop {
        match UnixStream::connect(path).await {
            Ok(s) => return Ok(s),
            Err(e) => {
                if tokio::time::Instant::now() > deadline {
                    return Err(e).with_context(|| format!("connect to mpv ipc {}", path.display()));
                }
                tokio::time::sleep(std::time::Duration::from_millis(50)).await;
            }
        }
    }
}

async fn read_events_loop(
    reader: tokio::io::ReadHalf<UnixStream>,
    event_tx: mpsc::Sender<Event>,
    snapshot: SharedSnapshot,
    feed: PositionFeed,
) {
    let mut lines = BufReader::new(reader).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        let Ok(v) = serde_json::from_str::<serde_json::Value>(&line) else {
            continue;
        };
        // mpv command replies: {"request_id":..., "error":"..."}
        if let (Some(_rid), Some(err)) = (v.get("request_id"), v.get("error"))
            && let Some(err_s) = err.as_str()
            && err_s != "success"
        {
            tracing::warn!(error = err_s, "mpv ipc error");
        }
        let Some(pe) = map_mpv_event(&v) else {
            continue;
        };
        mirror(&snapshot, &pe);
        if feed == PositionFeed::Poll && is_state_event(&pe) {
            // The snapshot feed reports these.
            continue;
        }
        if event_tx.send(Event::Player(pe)).await.is_err() {
            break;
        }
    }
}

fn mirror(snapshot: &SharedSnapshot, pe: &PlayerEvent) {
    snapshot.update(|s| match pe {
        PlayerEvent::Position { seconds } => s.position = *seconds,
        PlayerEvent::Duration { seconds } => s.duration = *seconds,
        PlayerEvent::Started => s.paused = false,
        PlayerEvent::Paused => s.paused = true,
        PlayerEvent::Ended => s.ended = true,
        PlayerEvent::Error(_) => {}
    });
}

fn is_state_event(pe: &PlayerEvent) -> bool {
    !matches!(pe, PlayerEvent::Error(_))
}

/// Property observers registered once the socket is up.
fn startup_commands() -> Vec<serde_json::Value> {
    ["time-pos", "duration", "pause"]
        .iter()
        .enumerate()
        .map(|(i, name)| json!({"command":["observe_property", i + 1, name]}))
        .collect()
}

fn map_mpv_event(v: &serde_json::Value) -> Option<PlayerEvent> {
    match v.get("event")?.as_str()? {
        "property-change" => {
            let name = v.get("name")?.as_str()?;
            // `data` is absent or null while nothing is loaded.
            let data = v.get("data");
            match name {
                "time-pos" => Some(PlayerEvent::Position {
                    seconds: data.and_then(|d| d.as_f64()).unwrap_or(0.0),
                }),
                "duration" => Some(PlayerEvent::Duration {
                    seconds: data.and_then(|d| d.as_f64()).unwrap_or(0.0),
                }),
                "pause" => {
                    let paused = data.and_then(|d| d.as_bool()).unwrap_or(false);
                    Some(if paused { PlayerEvent::Paused } else { PlayerEvent::Started })
                }
                _ => None,
            }
        }
        "end-file" => {
            // Only a natural end advances the queue; `stop` comes from loadfile replace.
            match v.get("reason").and_then(|x| x.as_str()).unwrap_or("") {
                "eof" => Some(PlayerEvent::Ended),
                "error" => {
                    let err = v.get("file_error").or_else(|| v.get("error"));
                    let err = err.and_then(|x| x.as_str()).unwrap_or("unknown");
                    Some(PlayerEvent::Error(format!("mpv end-file error: {err}")))
                }
                _ => None,
            }
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_property_changes() {
        let ev = map_mpv_event(&json!({"event":"property-change","name":"time-pos","data":12.5}));
        assert!(matches!(ev, Some(PlayerEvent::Position { seconds }) if seconds == 12.5));

        let ev = map_mpv_event(&json!({"event":"property-change","name":"time-pos"}));
        assert!(matches!(ev, Some(PlayerEvent::Position { seconds }) if seconds == 0.0));

        let ev = map_mpv_event(&json!({"event":"property-change","name":"pause","data":true}));
        assert!(matches!(ev, Some(PlayerEvent::Paused)));
    }

    #[test]
    fn test_startup_only_observes_mapped_properties() {
        let commands = startup_commands();
        assert_eq!(commands.len(), 3);
        assert_eq!(commands[0], json!({"command":["observe_property", 1, "time-pos"]}));
        assert_eq!(commands[2], json!({"command":["observe_property", 3, "pause"]}));
        assert!(commands.iter().all(|c| c["command"][0] == "observe_property"));
        // Nothing subscribes to log messages, and none would be mapped.
        assert!(map_mpv_event(&json!({"event":"log-message","level":"error","text":"boom"})).is_none());
    }

    #[test]
    fn test_only_natural_end_finishes_track() {
        let eof = map_mpv_event(&json!({"event":"end-file","reason":"eof"}));
        assert!(matches!(eof, Some(PlayerEvent::Ended)));

        let replaced = map_mpv_event(&json!({"event":"end-file","reason":"stop"}));
        assert!(replaced.is_none());

        let failed = map_mpv_event(
            &json!({"event":"end-file","reason":"error","file_error":"unrecognized file format"}),
        );
        assert!(
            matches!(failed, Some(PlayerEvent::Error(ref m)) if m.contains("unrecognized"))
        );
    }

    #[test]
    fn test_mirror_tracks_state() {
        let shared = SharedSnapshot::default();
        mirror(&shared, &PlayerEvent::Position { seconds: 3.0 });
        mirror(&shared, &PlayerEvent::Paused);
        mirror(&shared, &PlayerEvent::Ended);
        let s = crate::player::snapshot::SnapshotSource::snapshot(&shared).unwrap();
        assert_eq!(s.position, 3.0);
        assert!(s.paused);
        assert!(s.ended);
    }
}
