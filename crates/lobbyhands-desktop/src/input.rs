//! Mouse and keyboard input.

use std::thread;
use std::time::Duration;

use enigo::{Button, Coordinate, Direction, Enigo, Key, Keyboard, Mouse, Settings};

use crate::error::DesktopError;

/// Pause between the move and the first click.
const SETTLE: Duration = Duration::from_millis(100);
/// Pause between consecutive clicks.
const CLICK_GAP: Duration = Duration::from_millis(50);

pub struct InputController {
    enigo: Enigo,
}

impl InputController {
    pub fn new() -> Result<Self, DesktopError> {
        let enigo =
            Enigo::new(&Settings::default()).map_err(|e| DesktopError::Input(e.to_string()))?;
        Ok(Self { enigo })
    }

    pub fn mouse_move(&mut self, x: i32, y: i32) -> Result<(), DesktopError> {
        self.enigo
            .move_mouse(x, y, Coordinate::Abs)
            .map_err(|e| DesktopError::Input(e.to_string()))
    }

    pub fn left_click(&mut self) -> Result<(), DesktopError> {
        self.enigo
            .button(Button::Left, Direction::Click)
            .map_err(|e| DesktopError::Input(e.to_string()))
    }

    /// Move to `(x, y)` and left-click `count` times.
    pub fn move_and_click(&mut self, x: i32, y: i32, count: u32) -> Result<(), DesktopError> {
        self.mouse_move(x, y)?;
        thread::sleep(SETTLE);
        for i in 0..count {
            if i > 0 {
                thread::sleep(CLICK_GAP);
            }
            self.left_click()?;
        }
        Ok(())
    }

    pub fn type_text(&mut self, text: &str) -> Result<(), DesktopError> {
        self.enigo
            .text(text)
            .map_err(|e| DesktopError::Input(e.to_string()))
    }

    /// Press and release a single key.
    pub fn key_press(&mut self, key: &str) -> Result<(), DesktopError> {
        let k = parse_key(key)?;
        self.enigo
            .key(k, Direction::Click)
            .map_err(|e| DesktopError::Input(e.to_string()))
    }
}

/// Parse a key name to an enigo [`Key`].
pub(crate) fn parse_key(key: &str) -> Result<Key, DesktopError> {
    let lower = key.to_lowercase();
    let k = match lower.as_str() {
        "enter" | "return" => Key::Return,
        "tab" => Key::Tab,
        "space" => Key::Space,
        "backspace" => Key::Backspace,
        "delete" | "del" => Key::Delete,
        "escape" | "esc" => Key::Escape,
        "home" => Key::Home,
        "end" => Key::End,
        "pageup" => Key::PageUp,
        "pagedown" => Key::PageDown,
        "up" => Key::UpArrow,
        "down" => Key::DownArrow,
        "left" => Key::LeftArrow,
        "right" => Key::RightArrow,

        "ctrl" | "control" => Key::Control,
        "alt" => Key::Alt,
        "shift" => Key::Shift,

        "f1" => Key::F1,
        "f2" => Key::F2,
        "f3" => Key::F3,
        "f4" => Key::F4,
        "f5" => Key::F5,
        "f6" => Key::F6,
        "f7" => Key::F7,
        "f8" => Key::F8,
        "f9" => Key::F9,
        "f10" => Key::F10,
        "f11" => Key::F11,
        "f12" => Key::F12,

        s => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Key::Unicode(c),
                _ => return Err(DesktopError::InvalidKey(key.to_string())),
            }
        }
    };

    Ok(k)
}

#[cfg(test)]
#[path = "input_tests.rs"]
mod tests;
