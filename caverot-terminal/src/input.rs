//! Keyboard and mouse bindings.

use std::time::Duration;

use caverot_core::{key_action, Drag, Key, Modifiers, View};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

/// Approximate pixel size of a character cell, used to scale mouse drags so
/// they feel like drags in a graphical window.
const CELL_WIDTH_PX: f64 = 8.0;
const CELL_HEIGHT_PX: f64 = 16.0;
/// Degrees per wheel notch.
const WHEEL_TILT: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

/// Maps terminal events onto view operations.
#[derive(Debug, Clone, Default)]
pub struct Bindings {
    drag_from: Option<(u16, u16)>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle_key(&mut self, view: &mut View, key: KeyEvent, now: Duration) -> Control {
        let modifiers = Modifiers {
            shift: key.modifiers.contains(KeyModifiers::SHIFT),
            ctrl: key.modifiers.contains(KeyModifiers::CONTROL),
        };

        let key = match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return Control::Quit,
            KeyCode::Char('c') if modifiers.ctrl => return Control::Quit,
            KeyCode::Char(c) => Key::Char(c),
            KeyCode::Enter => Key::Enter,
            KeyCode::Delete => Key::Delete,
            KeyCode::Left => Key::Left,
            KeyCode::Right => Key::Right,
            KeyCode::Up => Key::Up,
            KeyCode::Down => Key::Down,
            _ => return Control::Continue,
        };
        if let Some(action) = key_action(key, modifiers) {
            view.apply(action, now);
        }
        Control::Continue
    }

    /// Left drag turns and tilts, right drag pans, middle drag zooms and the
    /// wheel tilts.
    pub fn handle_mouse(&mut self, view: &mut View, mouse: MouseEvent) {
        let here = (mouse.column, mouse.row);

        match mouse.kind {
            MouseEventKind::Down(_) => self.drag_from = Some(here),
            MouseEventKind::Up(_) => self.drag_from = None,
            MouseEventKind::Drag(button) => {
                let Some(from) = self.drag_from.replace(here) else {
                    return;
                };
                let dx = f64::from(here.0) - f64::from(from.0);
                let dy = f64::from(here.1) - f64::from(from.1);
                match button {
                    MouseButton::Left => {
                        view.drag(Drag::TiltRotate, dx * CELL_WIDTH_PX, dy * CELL_HEIGHT_PX)
                    }
                    // one row is two screen units
                    MouseButton::Right => view.drag(Drag::Translate, dx, dy * 2.0),
                    MouseButton::Middle => view.drag(Drag::Scale, 0.0, dy * CELL_HEIGHT_PX),
                }
            }
            MouseEventKind::ScrollUp => view.tilt(WHEEL_TILT),
            MouseEventKind::ScrollDown => view.tilt(-WHEEL_TILT),
            _ => {}
        }
    }
}
