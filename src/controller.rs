use std::time::Duration;
use tracing::trace;

use crate::domain::{AppConfig, AppError, InputMode, Message};
use crate::model::Model;
use crate::router::Route;
use ratatui::crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};

pub struct Controller {
    event_poll_time: u64,
}

impl Controller {
    pub fn new(cfg: &AppConfig) -> Self {
        Self {
            event_poll_time: cfg.event_poll_time,
        }
    }

    pub fn handle_event(&self, model: &Model) -> Result<Option<Message>, AppError> {
        if event::poll(Duration::from_millis(self.event_poll_time))?
            && let Event::Key(key) = event::read()?
            && key.kind == event::KeyEventKind::Press
        {
            return Ok(handle_key(model.input_mode(), key));
        }
        Ok(None)
    }
}

/// Maps a key press to a message for the given input mode.
pub fn handle_key(mode: InputMode, key: KeyEvent) -> Option<Message> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(Message::Quit);
    }

    let message = match mode {
        InputMode::Text => Some(Message::RawKey(key)),
        InputMode::Help => match key.code {
            KeyCode::Char('q') => Some(Message::Quit),
            KeyCode::Esc | KeyCode::Backspace | KeyCode::Enter | KeyCode::Char('?') => {
                Some(Message::Exit)
            }
            _ => None,
        },
        InputMode::ConfirmDelete => match key.code {
            KeyCode::Char('y') | KeyCode::Enter => Some(Message::Confirm),
            KeyCode::Char('n') | KeyCode::Esc => Some(Message::Decline),
            _ => None,
        },
        InputMode::Normal => match key.code {
            KeyCode::Char('q') => Some(Message::Quit),
            KeyCode::Char('?') => Some(Message::Help),
            KeyCode::Esc | KeyCode::Backspace => Some(Message::Exit),
            KeyCode::Char('1') => Some(Message::Navigate(Route::Home)),
            KeyCode::Char('2') => Some(Message::Navigate(Route::Departments)),
            KeyCode::Char('3') => Some(Message::Navigate(Route::Employees)),

            KeyCode::Up | KeyCode::Char('k') => Some(Message::MoveUp),
            KeyCode::Down | KeyCode::Char('j') => Some(Message::MoveDown),
            KeyCode::Left | KeyCode::Char('h') => Some(Message::MoveLeft),
            KeyCode::Right | KeyCode::Char('l') => Some(Message::MoveRight),
            KeyCode::Char('s') => Some(Message::Sort),
            KeyCode::PageDown | KeyCode::Char(']') => Some(Message::NextPage),
            KeyCode::PageUp | KeyCode::Char('[') => Some(Message::PrevPage),
            KeyCode::Home | KeyCode::Char('g') => Some(Message::FirstPage),
            KeyCode::End | KeyCode::Char('G') => Some(Message::LastPage),
            KeyCode::Char('p') => Some(Message::GoToPage),
            KeyCode::Enter | KeyCode::Char('e') => Some(Message::Edit),
            KeyCode::Delete | KeyCode::Char('d') => Some(Message::Delete),
            KeyCode::Char('a') => Some(Message::Add),
            KeyCode::Char('r') => Some(Message::Retry),
            KeyCode::Char('y') => Some(Message::CopyRow),
            _ => None,
        },
    };
    trace!("Mapped: {key:?} in {mode:?} => {message:?}");
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn normal_mode_keys() {
        assert!(matches!(handle_key(InputMode::Normal, key(KeyCode::Char('q'))), Some(Message::Quit)));
        assert!(matches!(
            handle_key(InputMode::Normal, key(KeyCode::Char('3'))),
            Some(Message::Navigate(Route::Employees))
        ));
        assert!(matches!(handle_key(InputMode::Normal, key(KeyCode::Char(']'))), Some(Message::NextPage)));
        assert!(matches!(handle_key(InputMode::Normal, key(KeyCode::PageUp)), Some(Message::PrevPage)));
        assert!(matches!(handle_key(InputMode::Normal, key(KeyCode::Char('G'))), Some(Message::LastPage)));
        assert!(matches!(handle_key(InputMode::Normal, key(KeyCode::Delete)), Some(Message::Delete)));
        assert!(matches!(handle_key(InputMode::Normal, key(KeyCode::Char('p'))), Some(Message::GoToPage)));
        assert!(handle_key(InputMode::Normal, key(KeyCode::Char('x'))).is_none());
    }

    #[test]
    fn confirm_popup_keys() {
        assert!(matches!(handle_key(InputMode::ConfirmDelete, key(KeyCode::Char('y'))), Some(Message::Confirm)));
        assert!(matches!(handle_key(InputMode::ConfirmDelete, key(KeyCode::Esc)), Some(Message::Decline)));
        assert!(handle_key(InputMode::ConfirmDelete, key(KeyCode::Char('q'))).is_none());
    }

    #[test]
    fn text_mode_passes_keys_through() {
        assert!(matches!(
            handle_key(InputMode::Text, key(KeyCode::Char('q'))),
            Some(Message::RawKey(KeyEvent { code: KeyCode::Char('q'), .. }))
        ));
        assert!(matches!(
            handle_key(InputMode::Text, KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(Message::Quit)
        ));
    }

    #[test]
    fn help_closes() {
        assert!(matches!(handle_key(InputMode::Help, key(KeyCode::Char('?'))), Some(Message::Exit)));
        assert!(handle_key(InputMode::Help, key(KeyCode::Char('s'))).is_none());
    }
}
