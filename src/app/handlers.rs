//! Key press handling for the quickfiler picker.
//!
//! An open prompt takes every key. Otherwise bound keys run their [PickerAction] and everything
//! else edits the query line.

use crate::app::keymap::{Keymap, PickerAction};
use crate::app::session::Session;

use crossterm::event::{KeyCode::*, KeyEvent, KeyModifiers};

/// How a key press was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeypressResult {
    Continue,
    Consumed,
    Quit,
    /// The editor had the terminal, the screen must be cleared.
    OpenedEditor,
}

impl Session {
    /// Handles a key press. `page` is the number of rows a page key moves by.
    pub fn handle_keypress(&mut self, key: KeyEvent, keymap: &Keymap, page: usize) -> KeypressResult {
        let result = match self.handle_prompt(key) {
            KeypressResult::Continue => self.handle_picker(key, keymap, page),
            other => other,
        };

        if self.take_handed_over() {
            return KeypressResult::OpenedEditor;
        }
        if self.is_closed() {
            return KeypressResult::Quit;
        }
        result
    }

    /// Handles key events while a prompt is open.
    ///
    /// Returns [KeypressResult::Continue] if no prompt is open.
    fn handle_prompt(&mut self, key: KeyEvent) -> KeypressResult {
        let Some(prompt) = self.prompt_mut() else {
            return KeypressResult::Continue;
        };

        match key.code {
            Enter => self.submit_prompt(),
            Esc => self.cancel_prompt(),
            Left => prompt.move_cursor_left(),
            Right => prompt.move_cursor_right(),
            Home => prompt.cursor_home(),
            End => prompt.cursor_end(),
            Backspace => prompt.backspace_at_cursor(),
            Delete => prompt.delete_at_cursor(),
            Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => self.cancel_prompt(),
            Char(ch) => {
                let answer = prompt.is_confirmation();
                prompt.insert_at_cursor(ch);
                // yes/no prompts are answered by the first key
                if answer {
                    self.submit_prompt();
                }
            }
            _ => {}
        }
        KeypressResult::Consumed
    }

    fn handle_picker(&mut self, key: KeyEvent, keymap: &Keymap, page: usize) -> KeypressResult {
        if let Some(action) = keymap.lookup(key) {
            match action {
                PickerAction::Accept => self.accept(),
                PickerAction::Descend => self.descend(),
                PickerAction::Up => self.select_prev(),
                PickerAction::Down => self.select_next(),
                PickerAction::PageUp => self.select_page_up(page),
                PickerAction::PageDown => self.select_page_down(page),
                PickerAction::ToggleCase => self.toggle_case_sensitive(),
                PickerAction::Quit => {
                    self.close();
                    return KeypressResult::Quit;
                }
            }
            return KeypressResult::Consumed;
        }

        match key.code {
            Backspace => self.backspace(),
            Delete => self.delete(),
            Left => self.query_cursor_left(),
            Right => self.query_cursor_right(),
            Home => self.query_cursor_home(),
            End => self.query_cursor_end(),
            Char(ch)
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                self.insert_char(ch)
            }
            _ => return KeypressResult::Continue,
        }
        KeypressResult::Consumed
    }
}
