//! Keyboard commands shared by every front end.
//!
//! Hosts translate their native key events into a [`Key`] plus
//! [`Modifiers`], look the command up with [`key_action`] and hand it to
//! [`View::apply`](crate::View::apply). Quitting is the host's business and
//! has no command here.

use crate::view::Direction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// A printable character, as typed (so `Z` with shift held arrives as
    /// `Char('Z')`).
    Char(char),
    Enter,
    Delete,
    Left,
    Right,
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
    };
    pub const SHIFT: Modifiers = Modifiers {
        shift: true,
        ctrl: false,
    };
    pub const CTRL: Modifiers = Modifiers {
        shift: false,
        ctrl: true,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Heading {
    North,
    East,
    South,
    West,
}

impl Heading {
    pub fn bearing(&self) -> f64 {
        match self {
            Heading::North => 0.0,
            Heading::East => 90.0,
            Heading::South => 180.0,
            Heading::West => 270.0,
        }
    }
}

/// One viewer command. `accel` is the accelerator (shift, or an upper case
/// letter) that multiplies the step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    StartRotation,
    StopRotation,
    SpeedUp { accel: bool },
    SlowDown { accel: bool },
    ReverseRotation,
    Step { clockwise: bool, accel: bool },
    ZoomIn { accel: bool },
    ZoomOut { accel: bool },
    LookHigher { accel: bool },
    LookLower { accel: bool },
    Shift { direction: Direction, accel: bool },
    Face(Heading),
    Plan,
    Elevation,
    LookFromAbove,
    LookFromBelow,
    Defaults,
    ToggleLabels,
    ToggleAllNames,
    ToggleCrosses,
    ToggleLegs,
    ToggleSurface,
    ToggleScaleBar,
    ToggleCompass,
    ToggleClino,
    ToggleColourByDepth,
    ToggleUnits,
    ToggleAngles,
    ToggleReverseControls,
}

/// The command bound to a key, if any.
pub fn key_action(key: Key, modifiers: Modifiers) -> Option<KeyAction> {
    let accel = modifiers.shift;
    let action = match key {
        Key::Enter => KeyAction::StartRotation,
        Key::Delete => KeyAction::Defaults,
        Key::Left if modifiers.ctrl => KeyAction::Step {
            clockwise: false,
            accel,
        },
        Key::Right if modifiers.ctrl => KeyAction::Step {
            clockwise: true,
            accel,
        },
        Key::Up if modifiers.ctrl => KeyAction::LookHigher { accel },
        Key::Down if modifiers.ctrl => KeyAction::LookLower { accel },
        Key::Left => shift(Direction::Left, accel),
        Key::Right => shift(Direction::Right, accel),
        Key::Up => shift(Direction::Up, accel),
        Key::Down => shift(Direction::Down, accel),
        Key::Char(c) if modifiers.ctrl => return ctrl_action(c),
        Key::Char(c) => return char_action(c, accel || c.is_ascii_uppercase()),
    };
    Some(action)
}

fn shift(direction: Direction, accel: bool) -> KeyAction {
    KeyAction::Shift { direction, accel }
}

fn ctrl_action(c: char) -> Option<KeyAction> {
    let action = match c.to_ascii_lowercase() {
        'n' => KeyAction::ToggleLabels,
        'x' => KeyAction::ToggleCrosses,
        'l' => KeyAction::ToggleLegs,
        'f' | 's' => KeyAction::ToggleSurface,
        'd' => KeyAction::ToggleColourByDepth,
        'r' => KeyAction::ToggleReverseControls,
        _ => return None,
    };
    Some(action)
}

fn char_action(c: char, accel: bool) -> Option<KeyAction> {
    let action = match c.to_ascii_lowercase() {
        ' ' => KeyAction::StopRotation,
        'z' => KeyAction::SpeedUp { accel },
        'x' => KeyAction::SlowDown { accel },
        'r' => KeyAction::ReverseRotation,
        'c' => KeyAction::Step {
            clockwise: false,
            accel,
        },
        'v' => KeyAction::Step {
            clockwise: true,
            accel,
        },
        ']' => KeyAction::ZoomIn { accel },
        '}' => KeyAction::ZoomIn { accel: true },
        '[' => KeyAction::ZoomOut { accel },
        '{' => KeyAction::ZoomOut { accel: true },
        '\'' => KeyAction::LookHigher { accel },
        // both shifted forms, US and UK keyboards
        '@' | '"' => KeyAction::LookHigher { accel: true },
        '/' => KeyAction::LookLower { accel },
        '?' => KeyAction::LookLower { accel: true },
        'n' => KeyAction::Face(Heading::North),
        'e' => KeyAction::Face(Heading::East),
        's' => KeyAction::Face(Heading::South),
        'w' => KeyAction::Face(Heading::West),
        'p' => KeyAction::Plan,
        'l' => KeyAction::Elevation,
        'u' => KeyAction::LookFromAbove,
        'd' => KeyAction::LookFromBelow,
        'o' => KeyAction::ToggleAllNames,
        'b' => KeyAction::ToggleScaleBar,
        'k' => KeyAction::ToggleCompass,
        'i' => KeyAction::ToggleClino,
        'm' => KeyAction::ToggleUnits,
        'g' => KeyAction::ToggleAngles,
        _ => return None,
    };
    Some(action)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upper_case_accelerates() {
        assert_eq!(
            key_action(Key::Char('z'), Modifiers::NONE),
            Some(KeyAction::SpeedUp { accel: false })
        );
        assert_eq!(
            key_action(Key::Char('Z'), Modifiers::NONE),
            Some(KeyAction::SpeedUp { accel: true })
        );
        assert_eq!(
            key_action(Key::Char('c'), Modifiers::SHIFT),
            Some(KeyAction::Step {
                clockwise: false,
                accel: true
            })
        );
    }

    #[test]
    fn test_ctrl_changes_meaning() {
        assert_eq!(
            key_action(Key::Char('n'), Modifiers::NONE),
            Some(KeyAction::Face(Heading::North))
        );
        assert_eq!(
            key_action(Key::Char('n'), Modifiers::CTRL),
            Some(KeyAction::ToggleLabels)
        );
        assert_eq!(
            key_action(Key::Char('d'), Modifiers::CTRL),
            Some(KeyAction::ToggleColourByDepth)
        );
        assert_eq!(
            key_action(Key::Char('r'), Modifiers::CTRL),
            Some(KeyAction::ToggleReverseControls)
        );
        assert_eq!(
            key_action(Key::Up, Modifiers::CTRL),
            Some(KeyAction::LookHigher { accel: false })
        );
        assert_eq!(
            key_action(Key::Up, Modifiers::NONE),
            Some(KeyAction::Shift {
                direction: Direction::Up,
                accel: false
            })
        );
    }

    #[test]
    fn test_display_keys() {
        let bound = |c| key_action(Key::Char(c), Modifiers::NONE);
        assert_eq!(bound('b'), Some(KeyAction::ToggleScaleBar));
        assert_eq!(bound('k'), Some(KeyAction::ToggleCompass));
        assert_eq!(bound('i'), Some(KeyAction::ToggleClino));
        assert_eq!(bound('m'), Some(KeyAction::ToggleUnits));
        assert_eq!(bound('g'), Some(KeyAction::ToggleAngles));
    }

    #[test]
    fn test_unbound_keys() {
        assert_eq!(key_action(Key::Char('q'), Modifiers::NONE), None);
        assert_eq!(key_action(Key::Char('j'), Modifiers::NONE), None);
        assert_eq!(key_action(Key::Char('q'), Modifiers::CTRL), None);
    }

    #[test]
    fn test_headings() {
        assert_eq!(Heading::West.bearing(), 270.0);
        assert_eq!(
            key_action(Key::Char('E'), Modifiers::NONE),
            Some(KeyAction::Face(Heading::East))
        );
    }
}
