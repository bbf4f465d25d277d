/// Orthographic survey projection: bearing and inclination to screen space
use nalgebra::Vector3;

use crate::geometry::Point3D;
use crate::state::{Orientation, ViewMode, ViewState};

/// A point after projection: integer screen position plus depth.
///
/// Depth is measured downwards (`-z`), so deeper passages have larger depth.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projected {
    pub x: i32,
    pub y: i32,
    pub depth: f64,
}

/// Snapshot of everything the projection needs from a [`ViewState`].
///
/// Building one is cheap; the trig terms come from the view's cache, so a
/// full rebuild never recomputes `sin`/`cos` per point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    orientation: Orientation,
    mode: ViewMode,
    scale: f64,
    center: Point3D,
    origin: (i32, i32),
}

impl Projection {
    /// `origin` is the screen position the pan centre lands on.
    pub fn new(view: &ViewState, origin: (i32, i32)) -> Self {
        Self {
            orientation: *view.orientation(),
            mode: view.mode(),
            scale: view.scale(),
            center: *view.pan_center(),
            origin,
        }
    }

    pub fn origin(&self) -> (i32, i32) {
        self.origin
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    /// Project a 3D point to screen space
    pub fn project(&self, p: &Point3D) -> Projected {
        let Orientation { sv, cv, se, ce } = self.orientation;
        let dx = p.x - self.center.x;
        let dy = p.y - self.center.y;
        let dz = p.z - self.center.z;

        let across = dx * cv + dy * sv;
        let y_world = match self.mode {
            ViewMode::Plan => dx * sv - dy * cv,
            ViewMode::Elevation => dz,
            ViewMode::Tilt => (dx * sv - dy * cv) * se + dz * ce,
        };

        Projected {
            x: to_screen(self.origin.0 as f64 - across * self.scale),
            y: to_screen(self.origin.1 as f64 - y_world * self.scale),
            depth: -p.z,
        }
    }

    /// World-space shift of the pan centre that moves the picture by
    /// `(dx, dy)` screen units.
    ///
    /// In plan the offset lies in the horizontal plane; otherwise horizontal
    /// drags slide along the screen axis and vertical drags move up or down.
    pub fn unproject_delta(&self, dx: f64, dy: f64) -> Vector3<f64> {
        let x = dx / self.scale;
        let y = dy / self.scale;
        let Orientation { sv, cv, .. } = self.orientation;
        match self.mode {
            ViewMode::Plan => Vector3::new(x * cv + y * sv, x * sv - y * cv, 0.0),
            ViewMode::Elevation | ViewMode::Tilt => Vector3::new(x * cv, x * sv, y),
        }
    }
}

/// One-shot form of [`Projection::project`].
pub fn project(p: &Point3D, view: &ViewState, origin: (i32, i32)) -> Projected {
    Projection::new(view, origin).project(p)
}

fn to_screen(v: f64) -> i32 {
    // `as` saturates, so points absurdly far off screen stay off screen
    v.round() as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    fn view(bearing: f64, inclination: f64) -> ViewState {
        let mut view = ViewState::default();
        view.set_bearing(bearing).unwrap();
        view.set_inclination(inclination).unwrap();
        view
    }

    #[test]
    fn test_centre_maps_to_origin() {
        let p = project(&Point3::origin(), &view(37.0, 12.0), (400, 300));
        assert_eq!((p.x, p.y), (400, 300));
    }

    #[test]
    fn test_plan_north_up() {
        let v = view(0.0, 90.0);
        let east = project(&Point3::new(10.0, 0.0, 0.0), &v, (0, 0));
        let north = project(&Point3::new(0.0, 10.0, 0.0), &v, (0, 0));
        assert_eq!((east.x, east.y), (10, 0));
        assert_eq!((north.x, north.y), (0, -10));
    }

    #[test]
    fn test_plan_ignores_height() {
        let v = view(30.0, 90.0);
        let low = project(&Point3::new(3.0, 4.0, -50.0), &v, (0, 0));
        let high = project(&Point3::new(3.0, 4.0, 50.0), &v, (0, 0));
        assert_eq!((low.x, low.y), (high.x, high.y));
        assert_eq!(low.depth, 50.0);
        assert_eq!(high.depth, -50.0);
    }

    #[test]
    fn test_elevation_uses_height() {
        let v = view(0.0, 0.0);
        let p = project(&Point3::new(0.0, 100.0, 7.0), &v, (0, 0));
        assert_eq!(p.y, -7);
        assert_eq!(p.x, 0);
    }

    #[test]
    fn test_tilt_blends_plan_and_elevation() {
        let v = view(0.0, 30.0);
        let p = project(&Point3::new(0.0, 10.0, 10.0), &v, (0, 0));
        // y_world = 10 * sin(30) + 10 * cos(30)
        let expected = -(5.0 + 10.0 * 30f64.to_radians().cos());
        assert_eq!(p.y, expected.round() as i32);
    }

    #[test]
    fn test_unproject_delta_follows_drag() {
        let mut v = view(0.0, 90.0);
        v.set_scale(2.0).unwrap();
        let projection = Projection::new(&v, (100, 100));
        let before = projection.project(&Point3::new(5.0, 5.0, 0.0));

        // moving the centre by the offset moves the picture by the drag
        let offset = projection.unproject_delta(8.0, -4.0);
        let mut moved = v.clone();
        moved.set_pan_center(v.pan_center() + offset).unwrap();
        let after = Projection::new(&moved, (100, 100)).project(&Point3::new(5.0, 5.0, 0.0));
        assert_eq!((after.x - before.x, after.y - before.y), (8, -4));
    }

    #[test]
    fn test_scale_applies() {
        let mut v = view(0.0, 90.0);
        v.set_scale(2.5).unwrap();
        let p = project(&Point3::new(4.0, 0.0, 0.0), &v, (0, 0));
        assert_eq!(p.x, 10);
    }
}
