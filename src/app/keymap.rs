//! Key mapping for the quickfiler picker
//!
//! Parses the `[keys]` config into a lookup table from key presses to [PickerAction]s. Keys that
//! are not bound edit the query line.

use crate::config::Keys;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::HashMap;

/// Every action a bound key can trigger.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PickerAction {
    Accept,
    Descend,
    Up,
    Down,
    PageUp,
    PageDown,
    ToggleCase,
    Quit,
}

/// Key + modifiers as used in keybind/keymap
#[derive(Hash, Eq, PartialEq, Copy, Clone, Debug)]
pub struct Key {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

/// Stores the mapping from Key to action, which is built from the config
pub struct Keymap {
    map: HashMap<Key, PickerAction>,
}

impl Keymap {
    #[rustfmt::skip]
    pub fn from_keys(keys: &Keys) -> Self {
        let mut map = HashMap::new();

        macro_rules! bind {
            ($keys:expr, $action:expr) => {
                bind($keys, $action, &mut map);
            };
        }

        use PickerAction as P;

        bind!(keys.accept(),        P::Accept);
        bind!(keys.descend(),       P::Descend);
        bind!(keys.up(),            P::Up);
        bind!(keys.down(),          P::Down);
        bind!(keys.page_up(),       P::PageUp);
        bind!(keys.page_down(),     P::PageDown);
        bind!(keys.toggle_case(),   P::ToggleCase);
        bind!(keys.quit(),          P::Quit);

        Keymap { map }
    }

    /// Looks up the action for a given key event
    pub fn lookup(&self, key: KeyEvent) -> Option<PickerAction> {
        let k = Key {
            code: key.code,
            modifiers: key.modifiers,
        };

        if let Some(action) = self.map.get(&k).copied() {
            return Some(action);
        }

        if matches!(key.code, KeyCode::Char(_)) && key.modifiers.contains(KeyModifiers::SHIFT) {
            let k2 = Key {
                code: key.code,
                modifiers: key.modifiers - KeyModifiers::SHIFT,
            };
            return self.map.get(&k2).copied();
        }
        None
    }
}

pub fn parse_key(s: &str) -> Option<Key> {
    let mut modifiers = KeyModifiers::NONE;
    let mut code: Option<KeyCode> = None;

    let is_bracketed = s.starts_with('<') && s.ends_with('>');
    let mut input = s.trim_start_matches('<').trim_end_matches('>').to_string();

    if is_bracketed && input.contains('-') {
        let parts: Vec<&str> = input.split('-').collect();

        for &prefix in parts.iter().take(parts.len().saturating_sub(1)) {
            match prefix.to_lowercase().as_str() {
                "c" | "ctrl" => modifiers |= KeyModifiers::CONTROL,
                "a" | "m" | "alt" => modifiers |= KeyModifiers::ALT,
                "s" | "shift" => modifiers |= KeyModifiers::SHIFT,
                _ => return None,
            }
        }
        input = parts.last()?.to_string();
    }

    let normalized = input.replace('-', "+");
    for part in normalized.split('+') {
        let p_low = part.to_lowercase();
        match p_low.as_str() {
            "ctrl" | "control" => modifiers |= KeyModifiers::CONTROL,
            "alt" | "meta" => modifiers |= KeyModifiers::ALT,
            "shift" => modifiers |= KeyModifiers::SHIFT,

            "up" => code = Some(KeyCode::Up),
            "down" => code = Some(KeyCode::Down),
            "left" => code = Some(KeyCode::Left),
            "right" => code = Some(KeyCode::Right),
            "pageup" | "pgup" => code = Some(KeyCode::PageUp),
            "pagedown" | "pgdn" => code = Some(KeyCode::PageDown),
            "home" => code = Some(KeyCode::Home),
            "end" => code = Some(KeyCode::End),
            "enter" => code = Some(KeyCode::Enter),
            "esc" => code = Some(KeyCode::Esc),
            "backspace" | "back" => code = Some(KeyCode::Backspace),
            "tab" => code = Some(KeyCode::Tab),
            "space" | "spc" => code = Some(KeyCode::Char(' ')),

            _ => {
                if part.len() == 1 {
                    let mut c = part.chars().next()?;
                    if modifiers.contains(KeyModifiers::SHIFT) {
                        c = c.to_ascii_uppercase();
                    }
                    code = Some(KeyCode::Char(c));
                } else if p_low.starts_with('f')
                    && p_low.len() > 1
                    && p_low[1..].chars().all(|c| c.is_ascii_digit())
                {
                    let n = p_low[1..].parse().ok()?;
                    code = Some(KeyCode::F(n));
                } else if part.is_empty() {
                    continue;
                } else {
                    return None;
                }
            }
        }
    }

    Some(Key {
        code: code?,
        modifiers,
    })
}

fn bind(key_list: &[String], action: PickerAction, map: &mut HashMap<Key, PickerAction>) {
    for k in key_list {
        if let Some(key) = parse_key(k) {
            map.insert(key, action);
        } else {
            log::warn!("Ignoring unknown key binding {:?}", k);
        }
    }
}
