//! Lyrics pane - scrolling window around the current line

use super::truncate_str;
use crate::app::state::{AppState, Focus, Hit};
use crate::tui::theme::get_theme;
use crate::tui::View;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use std::ops::RangeInclusive;

pub fn render(frame: &mut Frame, view: &View<'_>, state: &mut AppState, area: Rect) {
    let theme = get_theme();
    let icons = &theme.icons;

    let border = if state.focus == Focus::Lyrics {
        theme.palette.border_focused
    } else {
        theme.palette.border
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_set(theme.border_set())
        .border_style(Style::default().fg(border))
        .title(format!(" {} Lyrics ", icons.lyrics))
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
    if padded.height == 0 {
        return;
    }

    if let Some(message) = view.lyrics.status.message() {
        let middle = Rect {
            y: padded.y + padded.height / 2,
            height: 1,
            ..padded
        };
        let content = Line::from(Span::styled(
            message,
            Style::default().fg(theme.palette.fg_secondary),
        ));
        frame.render_widget(Paragraph::new(content).alignment(Alignment::Center), middle);
        return;
    }

    let timeline = &view.lyrics.timeline;
    let active = timeline.active();
    let context = view.context_lines.min((padded.height as usize).saturating_sub(1) / 2);
    let cursor = state
        .lyric_cursor
        .filter(|&c| c < timeline.ranges().len());
    let (center, window) = match cursor {
        Some(c) => (c, window_around(c, context, timeline.ranges().len())),
        None => (active, timeline.visible(context)),
    };

    let middle_row = padded.height / 2;
    let max_width = padded.width.saturating_sub(2) as usize;

    for index in window {
        let Some(range) = timeline.ranges().get(index) else {
            continue;
        };
        let offset = index as i64 - center as i64;
        let row = middle_row as i64 + offset;
        if row < 0 || row >= padded.height as i64 {
            continue;
        }
        let rect = Rect {
            y: padded.y + row as u16,
            height: 1,
            ..padded
        };

        let mut style = if index == active {
            Style::default()
                .fg(theme.palette.accent)
                .add_modifier(Modifier::BOLD)
        } else if timeline.is_visible(index, 1) {
            Style::default().fg(theme.palette.fg_secondary)
        } else {
            Style::default().fg(theme.palette.fg_dim)
        };
        if cursor == Some(index) {
            style = style.bg(theme.palette.bg_highlight);
        }

        let text = truncate_str(&range.text, max_width);
        let paragraph = Paragraph::new(Line::from(Span::styled(text, style))).alignment(Alignment::Center);
        frame.render_widget(paragraph, rect);

        if !range.is_padding() {
            state.hits.push(rect, Hit::LyricLine(index));
        }
    }
}

fn window_around(center: usize, context: usize, len: usize) -> RangeInclusive<usize> {
    let last = len.saturating_sub(1);
    center.saturating_sub(context)..=(center + context).min(last)
}
