/// Wall-clock driven auto-rotation
use std::time::Duration;

use tracing::debug;

use crate::config::EngineConfig;
use crate::error::accepted;
use crate::state::ViewState;

/// Rotation state machine. Timestamps are offsets from a host-chosen epoch
/// (`Instant` on native hosts, `performance.now()` in a browser).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RotationState {
    #[default]
    Idle,
    Rotating {
        last_tick: Duration,
    },
}

/// Advances the bearing by `speed * elapsed` while rotating, so the apparent
/// speed is the same whatever the redraw rate.
#[derive(Debug, Clone, PartialEq)]
pub struct RotationController {
    state: RotationState,
    speed_factor: f64,
    min_speed: f64,
    max_speed: f64,
}

impl RotationController {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            state: RotationState::Idle,
            speed_factor: config.speed_factor,
            min_speed: config.min_speed,
            max_speed: config.max_speed,
        }
    }

    pub fn state(&self) -> RotationState {
        self.state
    }

    pub fn is_rotating(&self) -> bool {
        matches!(self.state, RotationState::Rotating { .. })
    }

    /// Start rotating, anchoring integration at `now`. Restarting while
    /// already rotating just moves the anchor.
    pub fn start(&mut self, now: Duration) {
        self.state = RotationState::Rotating { last_tick: now };
    }

    pub fn stop(&mut self) {
        self.state = RotationState::Idle;
    }

    pub fn toggle(&mut self, now: Duration) {
        if self.is_rotating() {
            self.stop();
        } else {
            self.start(now);
        }
    }

    /// Integrate rotation up to `now`. Returns true when the bearing moved.
    pub fn tick(&mut self, view: &mut ViewState, now: Duration) -> bool {
        let RotationState::Rotating { last_tick } = self.state else {
            return false;
        };
        self.state = RotationState::Rotating { last_tick: now };

        // a host clock that steps backwards just yields no movement
        let elapsed = now.saturating_sub(last_tick).as_secs_f64();
        if elapsed == 0.0 || view.rotation_speed() == 0.0 {
            return false;
        }

        let before = view.bearing();
        let delta = view.rotation_speed() * elapsed;
        accepted(view.turn(delta), "rotation tick") && view.bearing() != before
    }

    pub fn speed_up(&self, view: &mut ViewState, accel: bool) {
        let factor = self.step_factor(accel);
        self.set_speed(view, view.rotation_speed() * factor);
    }

    pub fn slow_down(&self, view: &mut ViewState, accel: bool) {
        let factor = self.step_factor(accel);
        self.set_speed(view, view.rotation_speed() / factor);
    }

    pub fn reverse(&self, view: &mut ViewState) {
        self.set_speed(view, -view.rotation_speed());
    }

    /// Set the speed, clamping its magnitude into the configured bounds and
    /// keeping its sign. Non-finite speeds are ignored.
    pub fn set_speed(&self, view: &mut ViewState, speed: f64) {
        if !speed.is_finite() {
            debug!(speed, "ignoring non-finite rotation speed");
            return;
        }
        let sign = if speed < 0.0 { -1.0 } else { 1.0 };
        let clamped = sign * speed.abs().clamp(self.min_speed, self.max_speed);
        accepted(view.set_rotation_speed(clamped), "rotation speed");
    }

    /// Turn by one step (a fifth of a second at the current speed); five
    /// steps when accelerated. Clockwise turns decrease the bearing.
    pub fn step(&self, view: &mut ViewState, clockwise: bool, accel: bool) {
        let mut delta = view.rotation_speed().abs() / 5.0;
        if accel {
            delta *= 5.0;
        }
        if clockwise {
            delta = -delta;
        }
        accepted(view.turn(delta), "rotation step");
    }

    fn step_factor(&self, accel: bool) -> f64 {
        if accel {
            self.speed_factor * self.speed_factor
        } else {
            self.speed_factor
        }
    }
}

impl Default for RotationController {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(s: f64) -> Duration {
        Duration::from_secs_f64(s)
    }

    #[test]
    fn test_idle_tick_does_nothing() {
        let mut rotation = RotationController::default();
        let mut view = ViewState::default();
        assert!(!rotation.tick(&mut view, secs(5.0)));
        assert_eq!(view.bearing(), 0.0);
    }

    #[test]
    fn test_integrates_elapsed_time() {
        let mut rotation = RotationController::default();
        let mut view = ViewState::default();
        view.set_rotation_speed(90.0).unwrap();

        rotation.start(secs(10.0));
        assert!(rotation.tick(&mut view, secs(12.0)));
        assert!((view.bearing() - 180.0).abs() < 1e-9);

        assert!(rotation.tick(&mut view, secs(14.0)));
        assert!(view.bearing().abs() < 1e-9 || (view.bearing() - 360.0).abs() < 1e-9);
    }

    #[test]
    fn test_stop_freezes_bearing() {
        let mut rotation = RotationController::default();
        let mut view = ViewState::default();
        view.set_rotation_speed(30.0).unwrap();
        rotation.start(secs(0.0));
        rotation.tick(&mut view, secs(1.0));
        rotation.stop();
        assert!(!rotation.tick(&mut view, secs(100.0)));
        assert!((view.bearing() - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_speed_clamps_keep_sign() {
        let rotation = RotationController::default();
        let mut view = ViewState::default();

        rotation.set_speed(&mut view, 700.0);
        rotation.speed_up(&mut view, false);
        assert_eq!(view.rotation_speed(), 720.0);

        rotation.reverse(&mut view);
        assert_eq!(view.rotation_speed(), -720.0);

        rotation.set_speed(&mut view, -0.11);
        rotation.slow_down(&mut view, true);
        assert_eq!(view.rotation_speed(), -0.1);

        rotation.set_speed(&mut view, f64::NAN);
        assert_eq!(view.rotation_speed(), -0.1);
    }

    #[test]
    fn test_step_uses_fifth_of_speed() {
        let rotation = RotationController::default();
        let mut view = ViewState::default();
        view.set_rotation_speed(-15.0).unwrap();

        rotation.step(&mut view, false, false);
        assert!((view.bearing() - 3.0).abs() < 1e-9);

        rotation.step(&mut view, true, true);
        assert!((view.bearing() - 348.0).abs() < 1e-9);
    }

    #[test]
    fn test_overflowing_tick_leaves_bearing() {
        let mut rotation = RotationController::default();
        let mut view = ViewState::default();
        view.set_rotation_speed(f64::MAX).unwrap();

        rotation.start(secs(0.0));
        assert!(!rotation.tick(&mut view, secs(2.0)));
        assert_eq!(view.bearing(), 0.0);
        assert!(rotation.is_rotating());
    }

    #[test]
    fn test_toggle() {
        let mut rotation = RotationController::default();
        rotation.toggle(secs(1.0));
        assert_eq!(
            rotation.state(),
            RotationState::Rotating {
                last_tick: secs(1.0)
            }
        );
        rotation.toggle(secs(2.0));
        assert_eq!(rotation.state(), RotationState::Idle);
    }
}
