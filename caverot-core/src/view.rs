//! The interactive viewer: one owner for the dataset, the view state, the
//! rotation controller, the display toggles and the renderer.
//!
//! Every operation is synchronous and side-effect only. Rejected input (a
//! NaN from a host, a zero-sized window) is logged and otherwise ignored, so
//! a host can forward events without checking them first.

use std::time::Duration;

use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::controls::KeyAction;
use crate::error::{accepted, ViewError};
use crate::geometry::{Dataset, Point3D, Survey};
use crate::indicators::{Angles, Units};
use crate::render::{DisplayToggles, Frame, FrameOutcome, Renderer, Surface};
use crate::rotation::RotationController;
use crate::state::ViewState;

/// Multiplier applied to keyboard steps when the accelerator is held.
const ACCEL_STEPS: f64 = 5.0;
/// Degrees of turn per pixel of horizontal drag.
const TURN_PER_PX: f64 = -0.36;
/// Degrees of tilt per pixel of vertical drag, half the turn rate.
const TILT_PER_PX: f64 = 0.18;
/// Zoom steps per pixel of vertical scale drag.
const ZOOM_STEPS_PER_PX: f64 = 0.08;

/// Direction the picture moves in for [`View::shift_view`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

/// What a pointer drag does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Drag {
    /// Horizontal movement turns, vertical movement tilts.
    TiltRotate,
    Translate,
    /// Vertical movement zooms; dragging down zooms in.
    Scale,
}

#[derive(Debug, Clone)]
pub struct View {
    config: EngineConfig,
    state: ViewState,
    rotation: RotationController,
    toggles: DisplayToggles,
    dataset: Dataset,
    generation: u64,
    renderer: Renderer,
    viewport: (u32, u32),
    reverse_controls: bool,
}

impl View {
    pub fn new(config: EngineConfig, viewport: (u32, u32)) -> Self {
        Self::with_dataset(config, Dataset::new(), viewport)
    }

    pub fn with_dataset(config: EngineConfig, dataset: Dataset, viewport: (u32, u32)) -> Self {
        let mut view = Self {
            state: ViewState::default(),
            rotation: RotationController::new(&config),
            toggles: DisplayToggles::default(),
            dataset,
            generation: 0,
            renderer: Renderer::new(&config),
            viewport,
            reverse_controls: false,
            config,
        };
        view.defaults();
        view
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn toggles(&self) -> DisplayToggles {
        self.toggles
    }

    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    pub fn is_rotating(&self) -> bool {
        self.rotation.is_rotating()
    }

    pub fn set_units(&mut self, units: Units) {
        self.toggles.units = units;
    }

    pub fn set_angles(&mut self, angles: Angles) {
        self.toggles.angles = angles;
    }

    pub fn reverse_controls(&self) -> bool {
        self.reverse_controls
    }

    /// Swap the direction of pans and drags.
    pub fn set_reverse_controls(&mut self, reverse: bool) {
        self.reverse_controls = reverse;
    }

    /// Scale at which the whole dataset fits the current viewport.
    pub fn default_scale(&self) -> f64 {
        self.dataset.extents().fit_scale(
            self.viewport.0,
            self.viewport.1,
            self.config.fit_margin,
        )
    }

    // -- dataset --------------------------------------------------------------

    /// Replace the dataset and reset the view onto it.
    pub fn set_dataset(&mut self, dataset: Dataset) {
        self.dataset = dataset;
        self.dataset_changed();
    }

    /// Append a survey; extents and the default view are recomputed.
    pub fn add_survey(&mut self, survey: Survey) {
        self.dataset.add_survey(survey);
        self.dataset_changed();
    }

    fn dataset_changed(&mut self) {
        self.generation += 1;
        self.renderer.invalidate();
        self.defaults();
        info!(
            surveys = self.dataset.surveys().len(),
            scale = self.state.scale(),
            "dataset changed"
        );
    }

    // -- absolute setters -----------------------------------------------------

    pub fn set_bearing(&mut self, bearing: f64) {
        let result = self.state.set_bearing(bearing);
        self.check(result);
    }

    pub fn set_inclination(&mut self, inclination: f64) {
        let result = self.state.set_inclination(inclination);
        self.check(result);
    }

    pub fn set_scale(&mut self, scale: f64) {
        let result = self.state.set_scale(scale);
        self.check(result);
    }

    pub fn set_pan_center(&mut self, pan_center: Point3D) {
        let result = self.state.set_pan_center(pan_center);
        self.check(result);
    }

    // -- rotation -------------------------------------------------------------

    pub fn start_rotation(&mut self, now: Duration) {
        self.rotation.start(now);
    }

    pub fn stop_rotation(&mut self) {
        self.rotation.stop();
    }

    pub fn toggle_rotation(&mut self, now: Duration) {
        self.rotation.toggle(now);
    }

    pub fn reverse_rotation(&mut self) {
        self.rotation.reverse(&mut self.state);
    }

    pub fn set_rotation_speed(&mut self, speed: f64) {
        self.rotation.set_speed(&mut self.state, speed);
    }

    pub fn speed_up(&mut self, accel: bool) {
        self.rotation.speed_up(&mut self.state, accel);
    }

    pub fn slow_down(&mut self, accel: bool) {
        self.rotation.slow_down(&mut self.state, accel);
    }

    /// Single step turn; only has an effect while not auto-rotating.
    pub fn step_rotation(&mut self, clockwise: bool, accel: bool) {
        if !self.rotation.is_rotating() {
            self.rotation.step(&mut self.state, clockwise, accel);
        }
    }

    // -- toggles --------------------------------------------------------------

    pub fn toggle_labels(&mut self) {
        self.toggles.labels = !self.toggles.labels;
    }

    pub fn toggle_crosses(&mut self) {
        self.toggles.crosses = !self.toggles.crosses;
    }

    pub fn toggle_surface_legs(&mut self) {
        self.toggles.surface = !self.toggles.surface;
    }

    pub fn toggle_legs(&mut self) {
        self.toggles.legs = !self.toggles.legs;
    }

    pub fn toggle_show_all_names(&mut self) {
        self.toggles.all_names = !self.toggles.all_names;
    }

    pub fn toggle_scale_bar(&mut self) {
        self.toggles.scale_bar = !self.toggles.scale_bar;
    }

    pub fn toggle_compass(&mut self) {
        self.toggles.compass = !self.toggles.compass;
    }

    pub fn toggle_clino(&mut self) {
        self.toggles.clino = !self.toggles.clino;
    }

    /// Switch between depth-band colours and a single leg colour.
    pub fn toggle_colour_by_depth(&mut self) {
        self.toggles.colour_by_depth = !self.toggles.colour_by_depth;
    }

    /// Metric or imperial scale bar.
    pub fn toggle_units(&mut self) {
        self.toggles.units = self.toggles.units.toggled();
    }

    /// Degrees or grads on the dials and status line.
    pub fn toggle_angles(&mut self) {
        self.toggles.angles = self.toggles.angles.toggled();
    }

    pub fn toggle_reverse_controls(&mut self) {
        self.reverse_controls = !self.reverse_controls;
    }

    // -- relative movement ----------------------------------------------------

    pub fn zoom_in(&mut self, accel: bool) {
        let factor = self.zoom_step(accel);
        let result = self.state.zoom(factor);
        self.check(result);
    }

    pub fn zoom_out(&mut self, accel: bool) {
        let factor = self.zoom_step(accel);
        let result = self.state.zoom(1.0 / factor);
        self.check(result);
    }

    /// Change the inclination by `delta` degrees, clamped to straight
    /// up or down.
    pub fn tilt(&mut self, delta: f64) {
        let result = self.state.tilt(delta);
        self.check(result);
    }

    pub fn turn(&mut self, delta: f64) {
        let result = self.state.turn(delta);
        self.check(result);
    }

    /// Raise the viewpoint by one tilt step.
    pub fn look_higher(&mut self, accel: bool) {
        self.tilt(self.tilt_step(accel));
    }

    pub fn look_lower(&mut self, accel: bool) {
        self.tilt(-self.tilt_step(accel));
    }

    /// Move the picture by a screen-space offset.
    pub fn translate(&mut self, dx: f64, dy: f64) {
        let result = self.state.translate(dx, dy);
        self.check(result);
    }

    pub fn shift_view(&mut self, direction: Direction, accel: bool) {
        let mut step = if accel {
            self.config.pan_step_px * ACCEL_STEPS
        } else {
            self.config.pan_step_px
        };
        if self.reverse_controls {
            step = -step;
        }
        let (dx, dy) = match direction {
            Direction::Left => (-step, 0.0),
            Direction::Right => (step, 0.0),
            Direction::Up => (0.0, -step),
            Direction::Down => (0.0, step),
        };
        self.translate(dx, dy);
    }

    /// Apply a pointer drag of `(dx, dy)` pixels.
    pub fn drag(&mut self, drag: Drag, dx: f64, dy: f64) {
        let (dx, dy) = if self.reverse_controls {
            (-dx, -dy)
        } else {
            (dx, dy)
        };
        match drag {
            Drag::TiltRotate => {
                self.turn(dx * TURN_PER_PX);
                self.tilt(-dy * TILT_PER_PX);
            }
            Drag::Translate => self.translate(dx, dy),
            Drag::Scale => {
                let factor = self.config.zoom_factor.powf(ZOOM_STEPS_PER_PX * dy);
                let result = self.state.zoom(factor);
                self.check(result);
            }
        }
    }

    // -- presets --------------------------------------------------------------

    pub fn switch_to_plan(&mut self) {
        self.set_inclination(90.0);
    }

    pub fn switch_to_elevation(&mut self) {
        self.set_inclination(0.0);
    }

    pub fn look_from_above(&mut self) {
        self.set_inclination(90.0);
    }

    pub fn look_from_below(&mut self) {
        self.set_inclination(-90.0);
    }

    /// Look towards `bearing` (0 north, 90 east and so on).
    pub fn face(&mut self, bearing: f64) {
        self.set_bearing(bearing);
    }

    /// Plan view from the north, fitted to the dataset, rotation stopped at
    /// the default speed.
    pub fn defaults(&mut self) {
        self.rotation.stop();
        self.state = ViewState::new(
            self.default_scale(),
            self.dataset.extents().origin,
            self.config.default_speed,
        );
    }

    /// Carry out a keyboard command.
    pub fn apply(&mut self, action: KeyAction, now: Duration) {
        match action {
            KeyAction::StartRotation => {
                if !self.is_rotating() {
                    self.start_rotation(now);
                }
            }
            KeyAction::StopRotation => self.stop_rotation(),
            KeyAction::SpeedUp { accel } => self.speed_up(accel),
            KeyAction::SlowDown { accel } => self.slow_down(accel),
            KeyAction::ReverseRotation => self.reverse_rotation(),
            KeyAction::Step { clockwise, accel } => self.step_rotation(clockwise, accel),
            KeyAction::ZoomIn { accel } => self.zoom_in(accel),
            KeyAction::ZoomOut { accel } => self.zoom_out(accel),
            KeyAction::LookHigher { accel } => self.look_higher(accel),
            KeyAction::LookLower { accel } => self.look_lower(accel),
            KeyAction::Shift { direction, accel } => self.shift_view(direction, accel),
            KeyAction::Face(heading) => self.face(heading.bearing()),
            KeyAction::Plan => self.switch_to_plan(),
            KeyAction::Elevation => self.switch_to_elevation(),
            KeyAction::LookFromAbove => self.look_from_above(),
            KeyAction::LookFromBelow => self.look_from_below(),
            KeyAction::Defaults => self.defaults(),
            KeyAction::ToggleLabels => self.toggle_labels(),
            KeyAction::ToggleAllNames => self.toggle_show_all_names(),
            KeyAction::ToggleCrosses => self.toggle_crosses(),
            KeyAction::ToggleLegs => self.toggle_legs(),
            KeyAction::ToggleSurface => self.toggle_surface_legs(),
            KeyAction::ToggleScaleBar => self.toggle_scale_bar(),
            KeyAction::ToggleCompass => self.toggle_compass(),
            KeyAction::ToggleClino => self.toggle_clino(),
            KeyAction::ToggleColourByDepth => self.toggle_colour_by_depth(),
            KeyAction::ToggleUnits => self.toggle_units(),
            KeyAction::ToggleAngles => self.toggle_angles(),
            KeyAction::ToggleReverseControls => self.toggle_reverse_controls(),
        }
    }

    // -- host events ----------------------------------------------------------

    /// Track a viewport resize, keeping the picture proportionate to the
    /// window. The pan centre stays in the middle of the new viewport.
    pub fn on_resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            debug!(width, height, "ignoring empty viewport");
            return;
        }
        let (old_w, old_h) = self.viewport;
        self.viewport = (width, height);
        if old_w == 0 || old_h == 0 {
            return;
        }

        let fit = |w: u32, h: u32| (3.0 * w as f64).min(4.0 * h as f64);
        let factor = fit(width, height) / fit(old_w, old_h);
        let result = self.state.zoom(factor);
        self.check(result);
    }

    /// Advance rotation to `now` and draw if anything changed.
    pub fn request_frame<S>(&mut self, surface: &mut S, now: Duration) -> FrameOutcome
    where
        S: Surface + ?Sized,
    {
        let (width, height) = surface.size();
        if (width, height) != self.viewport {
            self.on_resize(width, height);
        }

        self.rotation.tick(&mut self.state, now);

        let frame = Frame {
            dataset: &self.dataset,
            view: &self.state,
            toggles: self.toggles,
            rotating: self.rotation.is_rotating(),
            generation: self.generation,
        };
        self.renderer.render(surface, &frame)
    }

    fn zoom_step(&self, accel: bool) -> f64 {
        if accel {
            self.config.zoom_factor * self.config.zoom_factor
        } else {
            self.config.zoom_factor
        }
    }

    fn tilt_step(&self, accel: bool) -> f64 {
        if accel {
            self.config.tilt_step * ACCEL_STEPS
        } else {
            self.config.tilt_step
        }
    }

    fn check(&self, result: Result<(), ViewError>) {
        accepted(result, "view");
    }
}
