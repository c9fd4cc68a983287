//! Platform-neutral input events
//!
//! Entry points translate DOM (or scripted) events into `InputEvent`s; each
//! game maps them to its own intent type. Coordinates are world pixels.

use glam::Vec2;

/// Keys the games care about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Space,
    Enter,
    Escape,
    /// Lowercase letter
    Letter(char),
}

impl Key {
    /// Map a DOM `KeyboardEvent.key` value
    ///
    /// WASD doubles as arrows only through `Key::as_direction`; letters stay
    /// letters so word games can read them.
    pub fn from_dom(key: &str) -> Option<Self> {
        match key {
            "ArrowUp" => Some(Key::Up),
            "ArrowDown" => Some(Key::Down),
            "ArrowLeft" => Some(Key::Left),
            "ArrowRight" => Some(Key::Right),
            " " | "Spacebar" => Some(Key::Space),
            "Enter" => Some(Key::Enter),
            "Escape" | "Esc" => Some(Key::Escape),
            _ => {
                let mut chars = key.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) if c.is_ascii_alphabetic() => {
                        Some(Key::Letter(c.to_ascii_lowercase()))
                    }
                    _ => None,
                }
            }
        }
    }

    /// Direction for arrow keys and WASD
    pub fn as_direction(self) -> Option<crate::sim::grid::Dir> {
        use crate::sim::grid::Dir;
        match self {
            Key::Up | Key::Letter('w') => Some(Dir::Up),
            Key::Down | Key::Letter('s') => Some(Dir::Down),
            Key::Left | Key::Letter('a') => Some(Dir::Left),
            Key::Right | Key::Letter('d') => Some(Dir::Right),
            _ => None,
        }
    }
}

/// One raw input event
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    KeyDown(Key),
    PointerMove(Vec2),
    PointerDown(Vec2),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::grid::Dir;

    #[test]
    fn test_from_dom_keys() {
        assert_eq!(Key::from_dom("ArrowLeft"), Some(Key::Left));
        assert_eq!(Key::from_dom(" "), Some(Key::Space));
        assert_eq!(Key::from_dom("Q"), Some(Key::Letter('q')));
        assert_eq!(Key::from_dom("Shift"), None);
        assert_eq!(Key::from_dom("7"), None);
    }

    #[test]
    fn test_wasd_directions() {
        assert_eq!(Key::Letter('w').as_direction(), Some(Dir::Up));
        assert_eq!(Key::Right.as_direction(), Some(Dir::Right));
        assert_eq!(Key::Letter('x').as_direction(), None);
    }
}
