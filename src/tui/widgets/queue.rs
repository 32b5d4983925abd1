//! Queue pane - discovered tracks in play order

use super::truncate_str;
use crate::app::state::{AppState, Focus, Hit};
use crate::tui::theme::get_theme;
use crate::tui::View;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub fn render(frame: &mut Frame, view: &View<'_>, state: &mut AppState, area: Rect) {
    let theme = get_theme();
    let icons = &theme.icons;
    let queue = view.queue;

    let focused = state.focus == Focus::Queue;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_set(theme.border_set())
        .border_style(Style::default().fg(if focused {
            theme.palette.border_focused
        } else {
            theme.palette.border
        }))
        .title(format!(" {} Queue ({}) ", icons.queue, queue.len()))
        .title_style(Style::default().fg(theme.palette.accent));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let padded = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(inner)[1];

    if queue.is_empty() {
        let empty_msg = Line::from(Span::styled(
            "Waiting for tracks...",
            Style::default().fg(theme.palette.fg_secondary),
        ));
        frame.render_widget(Paragraph::new(empty_msg), padded);
        return;
    }

    let visible_height = padded.height as usize;
    state.queue.clamp(queue.len());
    state.queue.update_scroll(visible_height);

    let current_idx = queue.current_index();
    let selected_idx = state.queue.selected;
    let max_width = padded.width.saturating_sub(5) as usize; // marker column

    let rows = queue
        .tracks()
        .iter()
        .enumerate()
        .skip(state.queue.scroll_offset)
        .take(visible_height);
    for (row, (i, track)) in rows.enumerate() {
        let is_current = current_idx == Some(i);
        let is_played = current_idx.is_some_and(|c| i < c);

        let marker = if is_current {
            format!("{:>3} ", icons.play)
        } else if is_played {
            format!("{:>3} ", icons.played)
        } else {
            format!("{:>3} ", i + 1)
        };

        let style = if focused && i == selected_idx {
            Style::default()
                .fg(theme.palette.fg_primary)
                .bg(theme.palette.bg_highlight)
                .add_modifier(Modifier::BOLD)
        } else if is_current {
            Style::default()
                .fg(theme.palette.accent)
                .add_modifier(Modifier::BOLD)
        } else if is_played {
            Style::default().fg(theme.palette.fg_secondary)
        } else {
            Style::default().fg(theme.palette.fg_primary)
        };

        let rect = Rect {
            y: padded.y + row as u16,
            height: 1,
            ..padded
        };
        let line = Line::from(vec![
            Span::styled(marker, Style::default().fg(theme.palette.fg_secondary)),
            Span::styled(truncate_str(&track.display_name, max_width), style),
        ]);
        frame.render_widget(Paragraph::new(line), rect);
        state.hits.push(rect, Hit::QueueRow(i));
    }
}
