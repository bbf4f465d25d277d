//! Orientation, scale and pan of a single view.
//!
//! All mutation goes through the setters below. They reject non-finite input
//! and a non-positive scale, wrap the bearing into `[0, 360)`, clamp the
//! inclination into `[-90, 90]` and keep [`ViewMode`] and the cached trig terms
//! in step with the angles, so the projection never sees an inconsistent state.

use nalgebra::Point3;

use crate::error::ViewError;
use crate::geometry::Point3D;
use crate::projection::Projection;

/// Vertical projection family, derived from the inclination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    /// Looking straight down (inclination 90).
    Plan,
    /// Looking horizontally (inclination 0).
    Elevation,
    /// Anything in between, including looking from below.
    Tilt,
}

impl ViewMode {
    pub fn from_inclination(inclination: f64) -> Self {
        if inclination == 0.0 {
            ViewMode::Elevation
        } else if inclination == 90.0 {
            ViewMode::Plan
        } else {
            ViewMode::Tilt
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ViewMode::Plan => "Plan",
            ViewMode::Elevation => "Elevation",
            ViewMode::Tilt => "Tilt",
        }
    }
}

/// `sin`/`cos` of the view angles, recomputed only when an angle changes.
///
/// `cv` is the negated cosine of the bearing, the sign convention every
/// projection formula is written against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orientation {
    pub sv: f64,
    pub cv: f64,
    pub se: f64,
    pub ce: f64,
}

impl Orientation {
    fn new(bearing: f64, inclination: f64) -> Self {
        let (sv, cos_v) = bearing.to_radians().sin_cos();
        let (se, ce) = inclination.to_radians().sin_cos();
        Self {
            sv,
            cv: -cos_v,
            se,
            ce,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    bearing: f64,
    inclination: f64,
    scale: f64,
    pan_center: Point3D,
    mode: ViewMode,
    rotation_speed: f64,
    orientation: Orientation,
}

impl ViewState {
    /// Plan view from the north at the given scale, centred on `pan_center`.
    pub fn new(scale: f64, pan_center: Point3D, rotation_speed: f64) -> Self {
        let scale = if scale.is_finite() && scale > 0.0 { scale } else { 1.0 };
        Self {
            bearing: 0.0,
            inclination: 90.0,
            scale,
            pan_center,
            mode: ViewMode::Plan,
            rotation_speed,
            orientation: Orientation::new(0.0, 90.0),
        }
    }

    pub fn bearing(&self) -> f64 {
        self.bearing
    }

    pub fn inclination(&self) -> f64 {
        self.inclination
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn pan_center(&self) -> &Point3D {
        &self.pan_center
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn rotation_speed(&self) -> f64 {
        self.rotation_speed
    }

    pub fn orientation(&self) -> &Orientation {
        &self.orientation
    }

    pub fn set_bearing(&mut self, bearing: f64) -> Result<(), ViewError> {
        finite("bearing", bearing)?;
        self.bearing = wrap_degrees(bearing);
        self.orientation = Orientation::new(self.bearing, self.inclination);
        Ok(())
    }

    /// Out-of-range values clamp to straight up/down; the mode follows.
    pub fn set_inclination(&mut self, inclination: f64) -> Result<(), ViewError> {
        finite("inclination", inclination)?;
        self.inclination = inclination.clamp(-90.0, 90.0);
        self.mode = ViewMode::from_inclination(self.inclination);
        self.orientation = Orientation::new(self.bearing, self.inclination);
        Ok(())
    }

    pub fn set_scale(&mut self, scale: f64) -> Result<(), ViewError> {
        finite("scale", scale)?;
        if scale <= 0.0 {
            return Err(ViewError::NonPositiveScale(scale));
        }
        self.scale = scale;
        Ok(())
    }

    pub fn set_pan_center(&mut self, pan_center: Point3D) -> Result<(), ViewError> {
        finite("pan_center.x", pan_center.x)?;
        finite("pan_center.y", pan_center.y)?;
        finite("pan_center.z", pan_center.z)?;
        self.pan_center = pan_center;
        Ok(())
    }

    /// Speed bounds are the rotation controller's business; this only
    /// guards against NaN and infinities.
    pub fn set_rotation_speed(&mut self, speed: f64) -> Result<(), ViewError> {
        finite("rotation_speed", speed)?;
        self.rotation_speed = speed;
        Ok(())
    }

    pub fn turn(&mut self, delta: f64) -> Result<(), ViewError> {
        self.set_bearing(self.bearing + delta)
    }

    pub fn tilt(&mut self, delta: f64) -> Result<(), ViewError> {
        self.set_inclination(self.inclination + delta)
    }

    pub fn zoom(&mut self, factor: f64) -> Result<(), ViewError> {
        self.set_scale(self.scale * factor)
    }

    /// Shift the pan centre so the picture moves by `(dx, dy)` screen units.
    pub fn translate(&mut self, dx: f64, dy: f64) -> Result<(), ViewError> {
        finite("dx", dx)?;
        finite("dy", dy)?;
        let offset = Projection::new(self, (0, 0)).unproject_delta(dx, dy);
        self.set_pan_center(self.pan_center + offset)
    }
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new(1.0, Point3::origin(), 15.0)
    }
}

/// Wrap an angle in degrees into `[0, 360)`.
pub fn wrap_degrees(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

fn finite(field: &'static str, value: f64) -> Result<(), ViewError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ViewError::NonFinite { field, value })
    }
}
