//! Now Playing widget - compact text-only player for bottom bar

use super::{clock, truncate_str};
use crate::app::state::{AppState, ToastKind};
use crate::queue::PlaybackState;
use crate::tui::theme::get_theme;
use crate::tui::View;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub fn render(frame: &mut Frame, view: &View<'_>, state: &AppState, area: Rect) {
    let theme = get_theme();
    let icons = &theme.icons;

    let block = Block::default()
        .borders(Borders::ALL)
        .border_set(theme.border_set())
        .border_style(Style::default().fg(theme.palette.border))
        .title(if view.polling {
            format!(" {} {} {} ", icons.radio, icons.folder, view.folder)
        } else {
            format!(" {} not watching ", icons.radio)
        })
        .title_style(Style::default().fg(theme.palette.accent));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    // Add horizontal padding
    let padded = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(1), // Left padding
            Constraint::Min(1),    // Content
            Constraint::Length(1), // Right padding
        ])
        .split(inner)[1];

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Track title
            Constraint::Length(1), // Progress bar
            Constraint::Length(1), // Time + controls + volume
            Constraint::Min(0),    // Status or toast
        ])
        .split(padded);

    let content_width = padded.width.saturating_sub(1) as usize;

    let title = view
        .queue
        .current_track()
        .map(|t| t.display_name.as_str())
        .unwrap_or("Not playing");
    let title_line = Line::from(Span::styled(
        truncate_str(title, content_width),
        Style::default()
            .fg(theme.palette.fg_primary)
            .add_modifier(Modifier::BOLD),
    ));
    frame.render_widget(Paragraph::new(title_line), rows[0]);

    let ratio = if view.duration > 0.0 {
        (view.position / view.duration).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let progress_line = Line::from(Span::styled(
        render_progress_bar(rows[1].width as usize, ratio, icons),
        Style::default().fg(theme.palette.accent),
    ));
    frame.render_widget(Paragraph::new(progress_line), rows[1]);

    let state_icon = match view.queue.state() {
        PlaybackState::Playing => icons.play,
        PlaybackState::Paused if view.queue.is_stopped() => icons.stop,
        PlaybackState::Paused => icons.pause,
        PlaybackState::Waiting => icons.waiting,
        PlaybackState::Idle => icons.stop,
    };

    let vol_icon = if state.volume == 0 {
        icons.volume_mute
    } else if state.volume < 50 {
        icons.volume_low
    } else {
        icons.volume_high
    };

    let controls = Line::from(vec![
        Span::styled(
            format!("{}/{}", clock(view.position), clock(view.duration)),
            Style::default().fg(theme.palette.fg_secondary),
        ),
        Span::raw(" "),
        Span::styled(icons.prev, Style::default().fg(theme.palette.fg_secondary)),
        Span::raw(" "),
        Span::styled(state_icon, Style::default().fg(theme.palette.playing)),
        Span::raw(" "),
        Span::styled(icons.next, Style::default().fg(theme.palette.fg_secondary)),
        Span::raw("  "),
        Span::styled(vol_icon, Style::default().fg(theme.palette.fg_secondary)),
        Span::raw(" "),
        Span::styled(
            format!("{}%", state.volume),
            Style::default().fg(theme.palette.fg_secondary),
        ),
    ]);
    frame.render_widget(Paragraph::new(controls), rows[2]);

    // The folder prompt wins over a toast, which wins over the status line.
    let status_line = match (&state.folder_input, &state.toast) {
        (Some(input), _) => Line::from(vec![
            Span::styled(
                format!("{} Folder: ", icons.folder),
                Style::default().fg(theme.palette.accent),
            ),
            Span::styled(
                format!("{}_", tail_str(input, content_width.saturating_sub(12))),
                Style::default().fg(theme.palette.fg_primary),
            ),
        ]),
        (None, Some(toast)) if !toast.is_expired() => {
            let (prefix, color) = match toast.kind {
                ToastKind::Success => (icons.success, theme.palette.playing),
                ToastKind::Error => (icons.error, theme.palette.error),
            };
            Line::from(vec![
                Span::styled(format!("{} ", prefix), Style::default().fg(color)),
                Span::styled(
                    truncate_str(&toast.message, content_width.saturating_sub(3)),
                    Style::default().fg(color),
                ),
            ])
        }
        (None, _) => Line::from(Span::styled(
            truncate_str(view.status, content_width),
            Style::default().fg(theme.palette.fg_secondary),
        )),
    };
    frame.render_widget(Paragraph::new(status_line), rows[3]);
}

/// Last `max` characters of `s`, so the end of a long path stays in view.
fn tail_str(s: &str, max: usize) -> &str {
    let count = s.chars().count();
    if count <= max {
        return s;
    }
    let skip = count - max;
    s.char_indices().nth(skip).map_or("", |(i, _)| &s[i..])
}

/// Renders a modern progress bar
fn render_progress_bar(width: usize, ratio: f64, icons: &crate::tui::theme::Icons) -> String {
    if width < 3 {
        return String::new();
    }

    let filled = ((width - 1) as f64 * ratio).round() as usize;
    let empty = width.saturating_sub(filled + 1);

    let mut bar = String::with_capacity(width * 3);

    for _ in 0..filled {
        bar.push_str(icons.progress_full);
    }

    bar.push_str(icons.progress_head);

    for _ in 0..empty {
        bar.push_str(icons.progress_empty);
    }

    bar
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::theme::Icons;

    #[test]
    fn test_progress_bar_head_position() {
        let icons = Icons::nerd();
        assert_eq!(render_progress_bar(5, 0.0, &icons), "●────");
        assert_eq!(render_progress_bar(5, 1.0, &icons), "━━━━●");
        assert_eq!(render_progress_bar(2, 0.5, &icons), "");
    }

    #[test]
    fn test_tail_str_keeps_the_end() {
        assert_eq!(tail_str("music/radio", 20), "music/radio");
        assert_eq!(tail_str("music/radio", 5), "radio");
        assert_eq!(tail_str("ünïcode", 3), "ode");
        assert_eq!(tail_str("abc", 0), "");
    }
}
