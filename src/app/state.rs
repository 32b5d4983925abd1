use ratatui::layout::{Position, Rect};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Queue,
    Lyrics,
}

impl Focus {
    pub fn toggle(self) -> Self {
        match self {
            Focus::Queue => Focus::Lyrics,
            Focus::Lyrics => Focus::Queue,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub kind: ToastKind,
    pub created_at: std::time::Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

impl Toast {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: ToastKind::Success,
            created_at: std::time::Instant::now(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: ToastKind::Error,
            created_at: std::time::Instant::now(),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.created_at.elapsed() > std::time::Duration::from_secs(3)
    }
}

/// Selection in a scrolling list
#[derive(Debug, Clone, Default)]
pub struct ListCursor {
    pub selected: usize,
    pub scroll_offset: usize,
}

impl ListCursor {
    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn select_next(&mut self, len: usize) {
        if len > 0 {
            self.selected = (self.selected + 1).min(len - 1);
        }
    }

    pub fn clamp(&mut self, len: usize) {
        self.selected = self.selected.min(len.saturating_sub(1));
    }

    pub fn update_scroll(&mut self, visible_height: usize) {
        if visible_height == 0 {
            return;
        }
        if self.selected < self.scroll_offset {
            self.scroll_offset = self.selected;
        } else if self.selected >= self.scroll_offset + visible_height {
            self.scroll_offset = self.selected - visible_height + 1;
        }
    }
}

/// Screen rows that map back to lyric or queue indices, recorded on draw.
#[derive(Debug, Clone, Default)]
pub struct HitMap {
    rows: Vec<(Rect, Hit)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    LyricLine(usize),
    QueueRow(usize),
}

impl HitMap {
    pub fn clear(&mut self) {
        self.rows.clear();
    }

    pub fn push(&mut self, area: Rect, hit: Hit) {
        self.rows.push((area, hit));
    }

    pub fn at(&self, column: u16, row: u16) -> Option<Hit> {
        let pos = Position::new(column, row);
        self.rows
            .iter()
            .find(|(area, _)| area.contains(pos))
            .map(|(_, hit)| *hit)
    }
}

/// Presentation-only state. Playback state lives in the session.
#[derive(Debug, Default)]
pub struct AppState {
    pub should_quit: bool,
    pub focus: Focus,
    pub queue: ListCursor,
    /// Lyric line picked with the keyboard, `None` follows playback
    pub lyric_cursor: Option<usize>,
    pub volume: u8,
    pub hits: HitMap,
    pub toast: Option<Toast>,
    /// Folder being typed; keys edit it while set
    pub folder_input: Option<String>,
}

impl AppState {
    pub fn new(volume: u8) -> Self {
        Self {
            volume,
            ..Self::default()
        }
    }
}
