//! Lyrics module for fetching and displaying synchronized lyrics
//!
//! This module provides:
//! - LRC format parser
//! - Timeline of time ranges with the position -> line lookup
//! - Lyric document client (http or local file)

pub mod parser;
pub mod source;
pub mod timeline;

pub use source::{LyricsClient, LyricsFetch};
pub use timeline::Timeline;

/// What the lyric panel currently shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LyricsStatus {
    /// No track loaded yet
    Idle,
    /// Track has no lyric URL
    Unavailable,
    Loading,
    NotFound,
    Error,
    Ready,
}

impl LyricsStatus {
    pub fn message(self) -> Option<&'static str> {
        match self {
            LyricsStatus::Idle | LyricsStatus::Ready => None,
            LyricsStatus::Unavailable => Some("No lyrics available"),
            LyricsStatus::Loading => Some("Loading lyrics..."),
            LyricsStatus::NotFound => Some("Lyrics not found"),
            LyricsStatus::Error => Some("Error loading lyrics"),
        }
    }
}

/// Lyric state for the current track: a status plus the timeline it drives.
#[derive(Debug, Clone)]
pub struct LyricsPanel {
    pub status: LyricsStatus,
    pub timeline: Timeline,
    padding: usize,
    /// Track key the panel belongs to
    track: Option<String>,
}

impl LyricsPanel {
    pub fn new(padding: usize) -> Self {
        Self {
            status: LyricsStatus::Idle,
            timeline: Timeline::empty(padding),
            padding,
            track: None,
        }
    }

    /// Switch to a new track. Returns false if `url` is absent.
    pub fn begin(&mut self, track: &str, url: Option<&str>) -> bool {
        self.track = Some(track.to_string());
        self.timeline = Timeline::empty(self.padding);
        self.status = if url.is_some() {
            LyricsStatus::Loading
        } else {
            LyricsStatus::Unavailable
        };
        url.is_some()
    }

    /// Apply a fetch result. Results for a track no longer shown are dropped.
    pub fn finish(&mut self, track: &str, fetch: LyricsFetch, position: f64) -> bool {
        if self.track.as_deref() != Some(track) {
            return false;
        }
        match fetch {
            LyricsFetch::Document(text) => {
                self.timeline = Timeline::parse(&text, self.padding);
                self.timeline.move_to(position);
                self.status = LyricsStatus::Ready;
            }
            LyricsFetch::NotFound => self.status = LyricsStatus::NotFound,
            LyricsFetch::Failed(_) => self.status = LyricsStatus::Error,
        }
        true
    }

    pub fn clear(&mut self) {
        *self = Self::new(self.padding);
    }
}
