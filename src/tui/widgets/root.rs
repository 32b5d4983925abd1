//! Root layout widget - orchestrates main layout structure

use crate::app::state::AppState;
use crate::tui::View;
use ratatui::{
    layout::{Constraint, Direction, Layout},
    Frame,
};

use super::{lyrics, now_playing, queue};

/// Main layout structure:
/// ┌─────────────────────────────┬──────────────────┐
/// │           Lyrics            │      Queue       │
/// │                             │                  │
/// ├─────────────────────────────┴──────────────────┤
/// │                    Player                      │
/// └────────────────────────────────────────────────┘
pub fn render(frame: &mut Frame, view: &View<'_>, state: &mut AppState) {
    let root = frame.area();
    state.hits.clear();

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(6),    // Lyrics + queue
            Constraint::Length(6), // Player bar
        ])
        .split(root);

    let top_cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(rows[0]);

    lyrics::render(frame, view, state, top_cols[0]);
    queue::render(frame, view, state, top_cols[1]);
    now_playing::render(frame, view, state, rows[1]);
}
