use crate::app::actions::Action;
use crate::app::events::{Event, InputEvent};
use crate::app::state::{AppState, Hit};
use crossterm::event::{
    self, Event as CtEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton,
    MouseEventKind,
};
use tokio::sync::mpsc;

/// Seconds moved by Left/Right
const SEEK_STEP: f64 = 5.0;

pub fn spawn_input_task(tx: mpsc::Sender<Event>) {
    tokio::task::spawn_blocking(move || {
        loop {
            if event::poll(std::time::Duration::from_millis(250)).unwrap_or(false) {
                let ev = match event::read() {
                    Ok(CtEvent::Key(k)) if k.kind == KeyEventKind::Press => InputEvent::Key(k),
                    Ok(CtEvent::Mouse(m)) => InputEvent::Mouse(m),
                    Ok(CtEvent::Resize(_, _)) => InputEvent::Resize,
                    Ok(_) | Err(_) => continue,
                };
                if tx.blocking_send(Event::Input(ev)).is_err() {
                    break;
                }
            } else if tx.is_closed() {
                break;
            }
        }
    });
}

pub fn map_input_to_action(state: &AppState, ev: InputEvent) -> Option<Action> {
    match ev {
        InputEvent::Resize => Some(Action::Resize),
        InputEvent::Key(k) if state.folder_input.is_some() => map_prompt_key(k),
        InputEvent::Mouse(_) if state.folder_input.is_some() => None,
        InputEvent::Mouse(m) => match m.kind {
            MouseEventKind::Down(MouseButton::Left) => match state.hits.at(m.column, m.row)? {
                Hit::LyricLine(i) => Some(Action::SeekLine(i)),
                Hit::QueueRow(i) => Some(Action::PlayIndex(i)),
            },
            MouseEventKind::ScrollUp => Some(Action::ListUp),
            MouseEventKind::ScrollDown => Some(Action::ListDown),
            _ => None,
        },
        InputEvent::Key(k) => map_key(k),
    }
}

fn map_key(k: KeyEvent) -> Option<Action> {
    match k.code {
        KeyCode::Char('q') | KeyCode::Esc => Some(Action::Quit),

        // Playback
        KeyCode::Char(' ') => Some(Action::TogglePause),
        KeyCode::Char('s') => Some(Action::Stop),
        KeyCode::Char('n') => Some(Action::PlayNext),
        KeyCode::Char('p') => Some(Action::PlayPrev),
        KeyCode::Right | KeyCode::Char(']') => Some(Action::SeekRelative(SEEK_STEP)),
        KeyCode::Left | KeyCode::Char('[') => Some(Action::SeekRelative(-SEEK_STEP)),
        KeyCode::Char('=') | KeyCode::Char('+') => Some(Action::VolumeUp),
        KeyCode::Char('-') | KeyCode::Char('_') => Some(Action::VolumeDown),

        // Source
        KeyCode::Char('f') => Some(Action::EditFolder),
        KeyCode::Char('<') | KeyCode::Char(',') => Some(Action::PollFaster),
        KeyCode::Char('>') | KeyCode::Char('.') => Some(Action::PollSlower),

        // Navigation - vim style
        KeyCode::Tab | KeyCode::BackTab => Some(Action::SwitchFocus),
        KeyCode::Up | KeyCode::Char('k') => Some(Action::ListUp),
        KeyCode::Down | KeyCode::Char('j') => Some(Action::ListDown),
        KeyCode::Enter => Some(Action::Activate),

        _ => None,
    }
}

fn map_prompt_key(k: KeyEvent) -> Option<Action> {
    match k.code {
        KeyCode::Enter => Some(Action::SubmitFolder),
        KeyCode::Esc => Some(Action::CancelInput),
        KeyCode::Backspace => Some(Action::Backspace),
        KeyCode::Char('u') if k.modifiers.contains(KeyModifiers::CONTROL) => Some(Action::ClearInput),
        KeyCode::Char(c) => Some(Action::InputChar(c)),
        _ => None,
    }
}
