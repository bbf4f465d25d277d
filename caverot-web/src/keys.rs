//! DOM key names onto view operations.

use std::time::Duration;

use caverot_core::{key_action, Key, Modifiers, View};

/// Apply one `keydown`. Returns false for keys the viewer does not use, so
/// the page can let the browser handle them.
pub fn handle_key(view: &mut View, key: &str, shift: bool, ctrl: bool, now: Duration) -> bool {
    let Some(key) = dom_key(key) else {
        return false;
    };
    match key_action(key, Modifiers { shift, ctrl }) {
        Some(action) => {
            view.apply(action, now);
            true
        }
        None => false,
    }
}

/// `KeyboardEvent.key` is either a named key or the typed character.
fn dom_key(key: &str) -> Option<Key> {
    let named = match key {
        "Enter" => Key::Enter,
        "Delete" => Key::Delete,
        "ArrowLeft" => Key::Left,
        "ArrowRight" => Key::Right,
        "ArrowUp" => Key::Up,
        "ArrowDown" => Key::Down,
        _ => {
            let mut chars = key.chars();
            return match (chars.next(), chars.next()) {
                (Some(c), None) => Some(Key::Char(c)),
                _ => None,
            };
        }
    };
    Some(named)
}

#[cfg(test)]
mod tests {
    use super::*;
    use caverot_core::{EngineConfig, Units};

    #[test]
    fn test_unknown_keys_pass_through() {
        let mut view = View::new(EngineConfig::default(), (640, 480));
        assert!(!handle_key(&mut view, "F5", false, false, Duration::ZERO));
        assert!(!handle_key(&mut view, "j", false, false, Duration::ZERO));
        assert!(!handle_key(&mut view, "q", false, false, Duration::ZERO));
        assert!(handle_key(&mut view, "Enter", false, false, Duration::ZERO));
        assert!(view.is_rotating());
        assert!(handle_key(&mut view, " ", false, false, Duration::ZERO));
        assert!(!view.is_rotating());
    }

    #[test]
    fn test_shifted_letters_accelerate() {
        let mut view = View::new(EngineConfig::default(), (640, 480));
        handle_key(&mut view, "Z", true, false, Duration::ZERO);
        assert!((view.state().rotation_speed() - 15.0 * 1.44).abs() < 1e-9);
        handle_key(&mut view, "e", false, false, Duration::ZERO);
        assert_eq!(view.state().bearing(), 90.0);
    }

    #[test]
    fn test_display_keys() {
        let mut view = View::new(EngineConfig::default(), (640, 480));
        assert!(handle_key(&mut view, "m", false, false, Duration::ZERO));
        assert!(handle_key(&mut view, "d", false, true, Duration::ZERO));
        assert!(handle_key(&mut view, "r", false, true, Duration::ZERO));
        assert_eq!(view.toggles().units, Units::Imperial);
        assert!(!view.toggles().colour_by_depth);
        assert!(view.reverse_controls());
    }
}
