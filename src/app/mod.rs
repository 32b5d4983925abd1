pub mod actions;
pub mod events;
pub mod session;
pub mod state;

use crate::config::{self, Config};
use crate::discovery::Source;
use crate::input;
use crate::lyrics::LyricsClient;
use crate::player::mpv::MpvHandle;
use crate::player::{PositionFeed, snapshot};
use crate::tui::{self, TuiTerminal, View};
use actions::Action;
use events::Event;
use session::{Session, SessionOptions};
use state::{AppState, Focus, ListCursor, Toast};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

const VOLUME_STEP: u8 = 5;
/// Seconds added to or taken from the scan interval per key press
const POLL_STEP: f64 = 1.0;

pub struct App {
    cfg: Config,
    state: AppState,
    session: Session<MpvHandle, Source>,
    tx: mpsc::Sender<Event>,
    rx: mpsc::Receiver<Event>,
}

impl App {
    pub fn new(cfg: Config) -> anyhow::Result<Self> {
        let (tx, rx) = mpsc::channel::<Event>(256);
        let source = Arc::new(Source::from_config(&cfg.source)?);
        let lyrics_client = LyricsClient::new(cfg.source.endpoint.clone())?;
        let opts = SessionOptions {
            poll_interval: cfg.source.poll_interval(),
            skip_delay: cfg.player.error_skip_delay(),
            lyric_padding: cfg.lyrics.padding,
        };
        let session = Session::new(source, lyrics_client, opts, tx.clone());
        let state = AppState::new(cfg.player.volume.min(100));

        Ok(Self {
            cfg,
            state,
            session,
            tx,
            rx,
        })
    }

    pub async fn run(&mut self, terminal: &mut TuiTerminal) -> anyhow::Result<()> {
        input::spawn_input_task(self.tx.clone());
        // No ticker: re-render on input, discovery and player events.

        self.start_transport().await;
        let folder = self.cfg.source.folder.clone();
        self.watch(&folder).await;

        self.draw(terminal)?;

        while let Some(ev) = self.rx.recv().await {
            match ev {
                Event::Input(input_ev) => {
                    if let Some(action) = input::map_input_to_action(&self.state, input_ev) {
                        self.handle_action(action).await;
                    }
                }
                other => self.session.handle(other).await,
            }

            if self.state.should_quit {
                break;
            }

            self.draw(terminal)?;
        }

        self.session.shutdown();
        Ok(())
    }

    /// Start mpv (best-effort: the queue still works without audio).
    async fn start_transport(&mut self) {
        let feed = self.cfg.player.position_feed;
        let mpv_log = self.cfg.paths.data_dir.join("mpv.log");
        let handle = match MpvHandle::spawn(
            self.tx.clone(),
            self.cfg.player.audio_device.as_deref(),
            Some(&mpv_log),
            feed,
        )
        .await
        {
            Ok(h) => h,
            Err(e) => {
                tracing::warn!(error = %format!("{e:#}"), "mpv unavailable");
                self.state.toast = Some(Toast::error(format!("mpv disabled: {e:#}")));
                return;
            }
        };

        if let Err(e) = handle.set_volume(self.state.volume).await {
            tracing::warn!(error = %e, "set initial volume");
        }
        if feed == PositionFeed::Poll {
            let every = self.cfg.player.position_poll();
            let task = snapshot::spawn_feed(Arc::new(handle.snapshot()), every, self.tx.clone());
            self.session.attach_feed(task);
        }
        self.session.attach_transport(handle);
    }

    fn draw(&mut self, terminal: &mut TuiTerminal) -> anyhow::Result<()> {
        let view = View {
            queue: self.session.controller(),
            lyrics: self.session.lyrics(),
            position: self.session.position(),
            duration: self.session.duration(),
            status: self.session.status(),
            folder: self.session.folder(),
            polling: self.session.is_polling(),
            context_lines: self.cfg.lyrics.context_lines,
        };
        tui::draw(terminal, &view, &mut self.state)
    }

    async fn handle_action(&mut self, action: Action) {
        match action {
            Action::Quit => self.state.should_quit = true,
            Action::Resize => {}

            Action::TogglePause => self.session.toggle_play_pause().await,
            Action::Stop => self.session.stop().await,
            Action::PlayNext => self.session.next().await,
            Action::PlayPrev => self.session.previous().await,
            Action::SeekRelative(delta) => self.session.seek_by(delta).await,
            Action::VolumeUp => {
                self.set_volume(self.state.volume.saturating_add(VOLUME_STEP).min(100))
                    .await
            }
            Action::VolumeDown => {
                self.set_volume(self.state.volume.saturating_sub(VOLUME_STEP))
                    .await
            }
            Action::PollFaster => self.step_poll_interval(-POLL_STEP),
            Action::PollSlower => self.step_poll_interval(POLL_STEP),

            Action::EditFolder => {
                self.state.folder_input = Some(self.session.folder().to_string());
            }
            Action::InputChar(c) => {
                if let Some(input) = &mut self.state.folder_input {
                    input.push(c);
                }
            }
            Action::Backspace => {
                if let Some(input) = &mut self.state.folder_input {
                    input.pop();
                }
            }
            Action::ClearInput => {
                if let Some(input) = &mut self.state.folder_input {
                    input.clear();
                }
            }
            Action::CancelInput => self.state.folder_input = None,
            Action::SubmitFolder => {
                if let Some(folder) = self.state.folder_input.take() {
                    self.watch(&folder).await;
                }
            }

            Action::SwitchFocus => {
                self.state.focus = self.state.focus.toggle();
                self.state.lyric_cursor = None;
            }
            Action::ListUp => match self.state.focus {
                Focus::Queue => self.state.queue.select_prev(),
                Focus::Lyrics => self.move_lyric_cursor(-1),
            },
            Action::ListDown => match self.state.focus {
                Focus::Queue => self
                    .state
                    .queue
                    .select_next(self.session.controller().len()),
                Focus::Lyrics => self.move_lyric_cursor(1),
            },
            Action::Activate => match self.state.focus {
                Focus::Queue => {
                    let index = self.state.queue.selected;
                    self.session.play_index(index).await;
                }
                Focus::Lyrics => {
                    if let Some(index) = self.state.lyric_cursor.take() {
                        self.session.activate_line(index).await;
                    }
                }
            },

            Action::PlayIndex(index) => {
                self.state.queue.selected = index;
                self.session.play_index(index).await;
            }
            Action::SeekLine(index) => {
                self.state.lyric_cursor = None;
                self.session.activate_line(index).await;
            }
        }
    }

    /// Move the keyboard lyric cursor, starting from the current line.
    fn move_lyric_cursor(&mut self, step: isize) {
        let timeline = &self.session.lyrics().timeline;
        let last = timeline.ranges().len().saturating_sub(1);
        let from = self.state.lyric_cursor.unwrap_or(timeline.active());
        self.state.lyric_cursor = Some(from.saturating_add_signed(step).min(last));
    }

    /// Point the session at `folder`. A new folder starts a fresh queue.
    async fn watch(&mut self, folder: &str) {
        let changed = folder.trim() != self.session.folder();
        self.session.watch(folder).await;
        if changed {
            self.state.queue = ListCursor::default();
            self.state.lyric_cursor = None;
        }
        if self.session.is_polling() {
            self.state.toast = Some(Toast::success(format!("Watching {}", self.session.folder())));
        }
    }

    fn step_poll_interval(&mut self, delta: f64) {
        let every = stepped_poll_interval(self.session.poll_interval(), delta);
        self.session.set_poll_interval(every);
        self.state.toast = Some(Toast::success(format!(
            "Scanning every {:.1}s",
            every.as_secs_f64()
        )));
    }

    async fn set_volume(&mut self, volume: u8) {
        self.state.volume = volume;
        let Some(mpv) = self.session.transport() else {
            return;
        };
        self.state.toast = Some(match mpv.set_volume(volume).await {
            Ok(()) => Toast::success(format!("Volume {volume}%")),
            Err(e) => Toast::error(format!("Volume: {e:#}")),
        });
    }
}

fn stepped_poll_interval(current: Duration, delta: f64) -> Duration {
    let (min, max) = config::POLL_INTERVAL_SECS;
    Duration::from_secs_f64((current.as_secs_f64() + delta).clamp(min, max))
}
