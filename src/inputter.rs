use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::trace;

/// What a key press did to the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Edited,
    Submitted,
    Cancelled,
    NextField,
    PrevField,
    Ignored,
}

/// Single line text input with a character based cursor.
#[derive(Debug, Default)]
pub struct Inputter {
    current_input: String,
    curser_pos: usize,
}

impl Inputter {
    pub fn read(&mut self, key: KeyEvent) -> InputEvent {
        let event = match (key.code, key.modifiers) {
            (KeyCode::Enter, _) => InputEvent::Submitted,
            (KeyCode::Esc, _) => InputEvent::Cancelled,
            (KeyCode::Tab, _) => InputEvent::NextField,
            (KeyCode::BackTab, _) => InputEvent::PrevField,
            (KeyCode::Backspace, _) => self.backspace(),
            (KeyCode::Delete, _) => self.delete(),
            (KeyCode::Left, _) => self.left(),
            (KeyCode::Right, _) => self.right(),
            (KeyCode::Home, _) => self.home(),
            (KeyCode::End, _) => self.end(),
            (KeyCode::Char(chr), km) if !km.contains(KeyModifiers::CONTROL) => self.insert(chr),
            _ => InputEvent::Ignored,
        };
        trace!("Input {key:?} => {event:?}");
        event
    }

    /// Replaces the content, cursor at the end.
    pub fn set(&mut self, s: &str) {
        self.current_input = s.to_string();
        self.curser_pos = s.chars().count();
    }

    pub fn value(&self) -> &str {
        &self.current_input
    }

    pub fn cursor(&self) -> usize {
        self.curser_pos
    }

    fn insert(&mut self, chr: char) -> InputEvent {
        self.current_input.insert(self.getbytepos(), chr);
        self.curser_pos += 1;
        InputEvent::Edited
    }

    fn backspace(&mut self) -> InputEvent {
        if self.curser_pos == 0 {
            return InputEvent::Ignored;
        }
        self.curser_pos -= 1;
        self.current_input.remove(self.getbytepos());
        InputEvent::Edited
    }

    fn delete(&mut self) -> InputEvent {
        if self.curser_pos >= self.current_input.chars().count() {
            return InputEvent::Ignored;
        }
        self.current_input.remove(self.getbytepos());
        InputEvent::Edited
    }

    fn left(&mut self) -> InputEvent {
        self.curser_pos = self.curser_pos.saturating_sub(1);
        InputEvent::Edited
    }

    fn right(&mut self) -> InputEvent {
        if self.curser_pos < self.current_input.chars().count() {
            self.curser_pos += 1;
        }
        InputEvent::Edited
    }

    fn home(&mut self) -> InputEvent {
        self.curser_pos = 0;
        InputEvent::Edited
    }

    fn end(&mut self) -> InputEvent {
        self.curser_pos = self.current_input.chars().count();
        InputEvent::Edited
    }

    fn getbytepos(&self) -> usize {
        self.current_input
            .char_indices()
            .nth(self.curser_pos)
            .map(|(byte_idx, _)| byte_idx)
            .unwrap_or(self.current_input.len())
    }
}
