//! One playback session: queue, lyrics, transport and polling for a source.
//!
//! Every mutation goes through the owning event loop, so discovery merges,
//! autoplay decisions and user navigation never interleave.

use super::events::{Event, PlayerEvent};
use crate::discovery::DiscoverySource;
use crate::discovery::poller::{Poller, ScanReport};
use crate::lyrics::{LyricsClient, LyricsPanel};
use crate::player::MediaTransport;
use crate::queue::{Command, QueueController};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

pub struct SessionOptions {
    pub poll_interval: Duration,
    pub skip_delay: Duration,
    pub lyric_padding: usize,
}

pub struct Session<T, S> {
    controller: QueueController,
    lyrics: LyricsPanel,
    lyrics_client: LyricsClient,
    transport: Option<T>,
    source: Arc<S>,
    poller: Poller,
    feed: Option<JoinHandle<()>>,
    folder: String,
    poll_interval: Duration,
    tx: mpsc::Sender<Event>,
    position: f64,
    duration: f64,
    status: String,
    alive: bool,
}

impl<T: MediaTransport, S: DiscoverySource> Session<T, S> {
    pub fn new(
        source: Arc<S>,
        lyrics_client: LyricsClient,
        opts: SessionOptions,
        tx: mpsc::Sender<Event>,
    ) -> Self {
        Self {
            controller: QueueController::new(opts.skip_delay),
            lyrics: LyricsPanel::new(opts.lyric_padding),
            lyrics_client,
            transport: None,
            source,
            poller: Poller::new(),
            feed: None,
            folder: String::new(),
            poll_interval: opts.poll_interval,
            tx,
            position: 0.0,
            duration: 0.0,
            status: "Idle - set a folder to watch".to_string(),
            alive: true,
        }
    }

    pub fn attach_transport(&mut self, transport: T) {
        self.transport = Some(transport);
    }

    /// Position feed task to cancel on shutdown (polling feeds only).
    pub fn attach_feed(&mut self, feed: JoinHandle<()>) {
        if let Some(old) = self.feed.replace(feed) {
            old.abort();
        }
    }

    /// Watch `folder`. A different folder than the current one starts over.
    pub async fn watch(&mut self, folder: &str) {
        let folder = folder.trim().to_string();
        if !self.folder.is_empty() && folder != self.folder {
            tracing::info!(from = %self.folder, to = %folder, "source changed, resetting queue");
            let commands = self.controller.reset();
            self.lyrics.clear();
            self.execute(commands).await;
        }
        self.folder = folder;
        self.restart_polling();
    }

    /// Change how often the source is scanned. The queue is kept.
    pub fn set_poll_interval(&mut self, every: Duration) {
        if every == self.poll_interval {
            return;
        }
        tracing::info!(interval_ms = every.as_millis() as u64, "poll interval changed");
        self.poll_interval = every;
        self.restart_polling();
    }

    fn restart_polling(&mut self) {
        self.poller.stop();
        if !self.alive {
            return;
        }
        if self.folder.is_empty() {
            self.status = "Idle - set a folder to watch".to_string();
            return;
        }
        self.poller.start(
            Arc::clone(&self.source),
            self.folder.clone(),
            self.poll_interval,
            self.tx.clone(),
            Event::Discovery,
        );
    }

    /// Apply a non-input event.
    pub async fn handle(&mut self, event: Event) {
        if !self.alive {
            return;
        }
        match event {
            Event::Input(_) => {}
            Event::Player(pe) => self.handle_player(pe).await,
            Event::Discovery(report) => self.handle_discovery(report).await,
            Event::Lyrics { key, fetch } => {
                self.lyrics.finish(&key, fetch, self.position);
            }
            Event::SkipDue { token } => {
                let commands = self.controller.skip_due(token);
                self.execute(commands).await;
            }
        }
    }

    async fn handle_player(&mut self, pe: PlayerEvent) {
        match pe {
            PlayerEvent::Position { seconds } => {
                self.position = seconds;
                self.lyrics.timeline.move_to(seconds);
            }
            PlayerEvent::Duration { seconds } => self.duration = seconds,
            PlayerEvent::Started => self.controller.transport_started(),
            PlayerEvent::Paused => self.controller.transport_paused(),
            PlayerEvent::Ended => {
                let commands = self.controller.track_finished();
                self.execute(commands).await;
            }
            PlayerEvent::Error(message) => {
                if self.controller.current_track().is_none() {
                    tracing::warn!(error = %message, "transport error with nothing loaded");
                    return;
                }
                let commands = self.controller.track_failed(&message);
                self.execute(commands).await;
            }
        }
    }

    async fn handle_discovery(&mut self, report: ScanReport) {
        if report.generation != self.poller.generation() {
            tracing::debug!(folder = %report.folder, "dropping stale scan");
            return;
        }
        match report.result {
            Ok(items) => {
                let commands = self.controller.apply_discovery(items);
                self.execute(commands).await;
            }
            // The queue stays as it is; polling continues.
            Err(e) => self.status = e.to_string(),
        }
    }

    pub async fn play_index(&mut self, index: usize) {
        let commands = self.controller.play_index(index);
        self.execute(commands).await;
    }

    pub async fn next(&mut self) {
        let commands = self.controller.next();
        self.execute(commands).await;
    }

    pub async fn previous(&mut self) {
        let commands = self.controller.previous();
        self.execute(commands).await;
    }

    pub async fn stop(&mut self) {
        let commands = self.controller.stop();
        self.execute(commands).await;
    }

    pub async fn toggle_play_pause(&mut self) {
        let commands = self.controller.toggle_play_pause();
        self.execute(commands).await;
    }

    /// Seek to the start of lyric line `index`. Padding lines do nothing.
    pub async fn activate_line(&mut self, index: usize) {
        if self.controller.current_track().is_none() {
            return;
        }
        if let Some(req) = self.lyrics.timeline.activate(index) {
            self.execute(vec![Command::Seek(req.target)]).await;
        }
    }

    /// Seek relative to the last reported position, within the track.
    pub async fn seek_by(&mut self, delta: f64) {
        if self.controller.current_track().is_none() {
            return;
        }
        let mut target = (self.position + delta).max(0.0);
        if self.duration > 0.0 {
            target = target.min(self.duration);
        }
        self.execute(vec![Command::Seek(target)]).await;
    }

    async fn execute(&mut self, commands: Vec<Command>) {
        let mut pending: VecDeque<Command> = commands.into();
        while let Some(command) = pending.pop_front() {
            match command {
                Command::Load { key, media_url } => {
                    self.position = 0.0;
                    self.duration = 0.0;
                    tracing::info!(track = %key, "loading");
                    if let Some(t) = &self.transport
                        && let Err(e) = t.load(&media_url).await
                    {
                        pending.extend(self.controller.track_failed(&format!("{e:#}")));
                    }
                }
                Command::LoadLyrics { key, url } => {
                    if self.lyrics.begin(&key, url.as_deref())
                        && let Some(url) = url
                    {
                        self.spawn_lyrics_fetch(key, url);
                    }
                }
                Command::Play => self.transport_call(|t| t.play()).await,
                Command::Pause => self.transport_call(|t| t.pause()).await,
                Command::Seek(seconds) => {
                    self.position = seconds;
                    self.lyrics.timeline.move_to(seconds);
                    if let Some(t) = &self.transport
                        && let Err(e) = t.seek(seconds).await
                    {
                        tracing::warn!(error = %e, "seek failed");
                    }
                }
                Command::ScheduleSkip { token, after } => {
                    let tx = self.tx.clone();
                    tokio::spawn(async move {
                        tokio::time::sleep(after).await;
                        let _ = tx.send(Event::SkipDue { token }).await;
                    });
                }
                Command::Status(message) => {
                    tracing::debug!(status = %message);
                    self.status = message;
                }
            }
        }
    }

    async fn transport_call<'a, F, Fut>(&'a self, f: F)
    where
        F: FnOnce(&'a T) -> Fut,
        Fut: std::future::Future<Output = anyhow::Result<()>>,
    {
        if let Some(t) = &self.transport
            && let Err(e) = f(t).await
        {
            tracing::warn!(error = %e, "transport command failed");
        }
    }

    fn spawn_lyrics_fetch(&self, key: String, url: String) {
        let client = self.lyrics_client.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let fetch = client.fetch(&url).await;
            let _ = tx.send(Event::Lyrics { key, fetch }).await;
        });
    }

    /// Tear down: polling first, then the position feed, then the transport.
    pub fn shutdown(&mut self) {
        if !self.alive {
            return;
        }
        self.alive = false;
        self.poller.stop();
        if let Some(feed) = self.feed.take() {
            feed.abort();
        }
        self.transport = None;
        tracing::info!("session closed");
    }

    pub fn controller(&self) -> &QueueController {
        &self.controller
    }

    pub fn lyrics(&self) -> &LyricsPanel {
        &self.lyrics
    }

    pub fn transport(&self) -> Option<&T> {
        self.transport.as_ref()
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn folder(&self) -> &str {
        &self.folder
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn is_polling(&self) -> bool {
        self.poller.is_running()
    }
}

impl<T, S> Drop for Session<T, S> {
    fn drop(&mut self) {
        if let Some(feed) = self.feed.take() {
            feed.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::{DiscoveryError, TrackDescriptor};
    use crate::lyrics::LyricsStatus;
    use crate::queue::PlaybackState;
    use std::sync::Mutex;

    #[derive(Clone, Default)]
    struct FakeTransport {
        calls: Arc<Mutex<Vec<String>>>,
    }

    impl FakeTransport {
        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: String) -> anyhow::Result<()> {
            self.calls.lock().unwrap().push(call);
            Ok(())
        }
    }

    impl MediaTransport for FakeTransport {
        async fn load(&self, url: &str) -> anyhow::Result<()> {
            if url.ends_with("broken.mp3") {
                anyhow::bail!("cannot open {url}");
            }
            self.record(format!("load {url}"))
        }

        async fn play(&self) -> anyhow::Result<()> {
            self.record("play".into())
        }

        async fn pause(&self) -> anyhow::Result<()> {
            self.record("pause".into())
        }

        async fn seek(&self, seconds: f64) -> anyhow::Result<()> {
            self.record(format!("seek {seconds}"))
        }
    }

    /// Serves whatever the test put in `tracks` for folder "radio",
    /// or `failure` while one is set.
    #[derive(Default)]
    struct FakeSource {
        tracks: Mutex<Vec<TrackDescriptor>>,
        failure: Mutex<Option<DiscoveryError>>,
    }

    impl DiscoverySource for FakeSource {
        async fn scan(&self, folder: &str) -> Result<Vec<TrackDescriptor>, DiscoveryError> {
            if let Some(e) = self.failure.lock().unwrap().clone() {
                return Err(e);
            }
            if folder != "radio" {
                return Err(DiscoveryError::FolderNotFound(folder.to_string()));
            }
            Ok(self.tracks.lock().unwrap().clone())
        }
    }

    fn track(dir: &std::path::Path, name: &str, mtime: f64, lrc: Option<&str>) -> TrackDescriptor {
        let audio = dir.join(format!("{name}.mp3"));
        let lrc_url = lrc.map(|body| {
            let p = dir.join(format!("{name}.lrc"));
            std::fs::write(&p, body).unwrap();
            p.to_string_lossy().into_owned()
        });
        TrackDescriptor {
            path: audio.to_string_lossy().into_owned(),
            url: audio.to_string_lossy().into_owned(),
            lrc_url,
            filename: format!("{name}.mp3"),
            mtime,
        }
    }

    fn session(
        source: Arc<FakeSource>,
    ) -> (Session<FakeTransport, FakeSource>, FakeTransport, mpsc::Receiver<Event>) {
        let (tx, rx) = mpsc::channel(64);
        let opts = SessionOptions {
            poll_interval: Duration::from_millis(20),
            skip_delay: Duration::from_millis(10),
            lyric_padding: 2,
        };
        let mut s = Session::new(source, LyricsClient::new(None).unwrap(), opts, tx);
        let transport = FakeTransport::default();
        s.attach_transport(transport.clone());
        (s, transport, rx)
    }

    /// Feed events back into the session until `done` holds.
    async fn pump_until<F>(
        s: &mut Session<FakeTransport, FakeSource>,
        rx: &mut mpsc::Receiver<Event>,
        done: F,
    ) where
        F: Fn(&Session<FakeTransport, FakeSource>) -> bool,
    {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
        while !done(&*s) {
            let ev = tokio::time::timeout_at(deadline, rx.recv())
                .await
                .expect("condition not reached in time")
                .expect("channel closed");
            s.handle(ev).await;
        }
    }

    #[tokio::test]
    async fn test_discovery_autoplays_and_loads_lyrics() {
        let dir = tempfile::tempdir().unwrap();
        let source = Arc::new(FakeSource::default());
        source
            .tracks
            .lock()
            .unwrap()
            .push(track(dir.path(), "one", 1.0, Some("[00:01.00]hello\n[00:03.00]world")));
        let (mut s, transport, mut rx) = session(source);

        s.watch("radio").await;
        pump_until(&mut s, &mut rx, |s| s.lyrics().status == LyricsStatus::Ready).await;

        assert_eq!(s.controller().state(), PlaybackState::Playing);
        assert!(transport.calls()[0].starts_with("load "));
        assert_eq!(transport.calls()[1], "play");

        s.handle(Event::Player(PlayerEvent::Position { seconds: 3.5 })).await;
        let line = s.lyrics().timeline.active_range().map(|r| r.text.clone());
        assert_eq!(line.as_deref(), Some("world"));

        // Clicking "hello" (padding 2 + pre-roll) seeks to its cue.
        s.activate_line(3).await;
        assert_eq!(transport.calls().last().map(String::as_str), Some("seek 1"));
        s.activate_line(0).await;
        assert_eq!(transport.calls().last().map(String::as_str), Some("seek 1"));

        s.handle(Event::Player(PlayerEvent::Duration { seconds: 10.0 })).await;
        s.seek_by(-5.0).await;
        assert_eq!(transport.calls().last().map(String::as_str), Some("seek 0"));
        s.seek_by(30.0).await;
        assert_eq!(transport.calls().last().map(String::as_str), Some("seek 10"));
        s.shutdown();
    }

    #[tokio::test]
    async fn test_end_of_queue_waits_then_continues() {
        let dir = tempfile::tempdir().unwrap();
        let source = Arc::new(FakeSource::default());
        source.tracks.lock().unwrap().push(track(dir.path(), "one", 1.0, None));
        let (mut s, transport, mut rx) = session(Arc::clone(&source));

        s.watch("radio").await;
        pump_until(&mut s, &mut rx, |s| s.controller().current_index() == Some(0)).await;
        assert_eq!(s.lyrics().status, LyricsStatus::Unavailable);

        s.handle(Event::Player(PlayerEvent::Ended)).await;
        assert_eq!(s.controller().state(), PlaybackState::Waiting);

        source.tracks.lock().unwrap().push(track(dir.path(), "two", 2.0, None));
        pump_until(&mut s, &mut rx, |s| s.controller().current_index() == Some(1)).await;
        let loads = transport.calls().iter().filter(|c| c.starts_with("load")).count();
        assert_eq!(loads, 2);
        s.shutdown();
    }

    #[tokio::test]
    async fn test_stop_and_resume_do_not_reload() {
        let dir = tempfile::tempdir().unwrap();
        let source = Arc::new(FakeSource::default());
        source.tracks.lock().unwrap().push(track(dir.path(), "one", 1.0, None));
        let (mut s, transport, mut rx) = session(source);

        s.watch("radio").await;
        pump_until(&mut s, &mut rx, |s| s.controller().current_index() == Some(0)).await;
        s.stop().await;
        s.toggle_play_pause().await;

        let calls = transport.calls();
        assert_eq!(calls.iter().filter(|c| c.starts_with("load")).count(), 1);
        assert_eq!(&calls[calls.len() - 3..], ["pause", "seek 0", "play"]);
        assert_eq!(s.controller().current_index(), Some(0));
        s.shutdown();
    }

    #[tokio::test]
    async fn test_load_failure_skips_after_delay() {
        let dir = tempfile::tempdir().unwrap();
        let source = Arc::new(FakeSource::default());
        {
            let mut tracks = source.tracks.lock().unwrap();
            tracks.push(track(dir.path(), "broken", 1.0, None));
            tracks.push(track(dir.path(), "good", 2.0, None));
        }
        let (mut s, transport, mut rx) = session(source);

        s.watch("radio").await;
        pump_until(&mut s, &mut rx, |s| s.controller().current_index() == Some(1)).await;
        let calls = transport.calls();
        assert!(calls.iter().any(|c| c.ends_with("good.mp3")));
        assert!(!calls.iter().any(|c| c.ends_with("broken.mp3")));
        s.shutdown();
    }

    #[tokio::test]
    async fn test_scan_error_keeps_queue_and_polling() {
        let dir = tempfile::tempdir().unwrap();
        let source = Arc::new(FakeSource::default());
        {
            let mut tracks = source.tracks.lock().unwrap();
            tracks.push(track(dir.path(), "one", 1.0, None));
            tracks.push(track(dir.path(), "two", 2.0, None));
        }
        let (mut s, _transport, mut rx) = session(Arc::clone(&source));

        s.watch("radio").await;
        pump_until(&mut s, &mut rx, |s| s.controller().len() == 2).await;
        s.next().await;
        assert_eq!(s.controller().current_index(), Some(1));

        *source.failure.lock().unwrap() = Some(DiscoveryError::Server("disk offline".into()));
        pump_until(&mut s, &mut rx, |s| s.status() == "disk offline").await;

        let names: Vec<_> = s
            .controller()
            .tracks()
            .iter()
            .map(|t| t.display_name.clone())
            .collect();
        assert_eq!(names, ["one", "two"]);
        assert_eq!(s.controller().current_index(), Some(1));
        assert_eq!(s.controller().state(), PlaybackState::Playing);
        assert!(s.is_polling());

        // The next good scan is merged into the same queue.
        source.failure.lock().unwrap().take();
        source.tracks.lock().unwrap().push(track(dir.path(), "three", 3.0, None));
        pump_until(&mut s, &mut rx, |s| s.controller().len() == 3).await;
        assert_eq!(s.controller().current_index(), Some(1));
        s.shutdown();
    }

    #[tokio::test]
    async fn test_poll_interval_change_restarts_polling_and_keeps_queue() {
        let dir = tempfile::tempdir().unwrap();
        let source = Arc::new(FakeSource::default());
        source.tracks.lock().unwrap().push(track(dir.path(), "one", 1.0, None));
        let (mut s, _transport, mut rx) = session(Arc::clone(&source));

        s.watch("radio").await;
        pump_until(&mut s, &mut rx, |s| s.controller().current_index() == Some(0)).await;
        let before = s.poller.generation();

        s.set_poll_interval(Duration::from_millis(30));
        assert_eq!(s.poll_interval(), Duration::from_millis(30));
        assert!(s.poller.generation() > before);
        assert!(s.is_polling());
        assert_eq!(s.controller().len(), 1);
        assert_eq!(s.controller().current_index(), Some(0));

        let same = s.poller.generation();
        s.set_poll_interval(Duration::from_millis(30));
        assert_eq!(s.poller.generation(), same);

        source.tracks.lock().unwrap().push(track(dir.path(), "two", 2.0, None));
        pump_until(&mut s, &mut rx, |s| s.controller().len() == 2).await;
        s.shutdown();
        s.set_poll_interval(Duration::from_millis(50));
        assert!(!s.is_polling());
    }

    #[tokio::test]
    async fn test_changing_folder_resets_queue() {
        let dir = tempfile::tempdir().unwrap();
        let source = Arc::new(FakeSource::default());
        source.tracks.lock().unwrap().push(track(dir.path(), "one", 1.0, None));
        let (mut s, _transport, mut rx) = session(source);

        s.watch("radio").await;
        pump_until(&mut s, &mut rx, |s| s.controller().len() == 1).await;

        s.watch("elsewhere").await;
        assert!(s.controller().is_empty());
        assert_eq!(s.controller().state(), PlaybackState::Idle);
        pump_until(&mut s, &mut rx, |s| s.status().starts_with("Folder not found")).await;
        assert!(s.controller().is_empty());

        s.watch("radio").await;
        pump_until(&mut s, &mut rx, |s| s.controller().len() == 1).await;
        s.shutdown();
        assert!(!s.is_polling());
        assert!(s.transport().is_none());
    }
}
