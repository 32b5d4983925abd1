use crate::discovery::poller::ScanReport;
use crate::lyrics::LyricsFetch;

#[derive(Debug, Clone)]
pub enum Event {
    Input(InputEvent),
    Player(PlayerEvent),
    Discovery(ScanReport),
    Lyrics { key: String, fetch: LyricsFetch },
    /// A debounced error skip is due
    SkipDue { token: u64 },
}

#[derive(Debug, Clone)]
pub enum InputEvent {
    Key(crossterm::event::KeyEvent),
    Mouse(crossterm::event::MouseEvent),
    Resize,
}

#[derive(Debug, Clone)]
pub enum PlayerEvent {
    Started,
    Paused,
    Position { seconds: f64 },
    Duration { seconds: f64 },
    Ended,
    Error(String),
}
