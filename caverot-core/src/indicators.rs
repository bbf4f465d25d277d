//! Compass and clinometer dials, the scale bar and their display units.
//!
//! Dials are returned as line lists in dial-local coordinates (origin at the
//! dial centre, y down) so each surface can rasterize them at its own size.

use serde::{Deserialize, Serialize};

const COMPASS_ARROW_ANGLE: f64 = 25.0;
const CLINO_ARROW_ANGLE: f64 = 11.0;
const CLINO_ARROW_LEN: f64 = 0.8;
const CLINO_HORIZON: f64 = 0.6;
const CLINO_POINTER: f64 = 0.38;
const FEET_PER_METRE: f64 = 1.0 / 0.3048;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line2 {
    pub from: (f64, f64),
    pub to: (f64, f64),
}

impl Line2 {
    fn new(from: (f64, f64), to: (f64, f64)) -> Self {
        Self { from, to }
    }
}

/// A drawn orientation indicator.
#[derive(Debug, Clone, PartialEq)]
pub struct Dial {
    pub lines: Vec<Line2>,
    /// Radius of the dial rim, if the dial has one.
    pub rim: Option<f64>,
    pub caption: String,
}

/// Unit for angles shown on the dials and the status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Angles {
    #[default]
    Degrees,
    Grads,
}

impl Angles {
    /// Convert an angle in degrees into this unit.
    pub fn from_degrees(&self, degrees: f64) -> f64 {
        match self {
            Angles::Degrees => degrees,
            Angles::Grads => degrees * 400.0 / 360.0,
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            Angles::Degrees => Angles::Grads,
            Angles::Grads => Angles::Degrees,
        }
    }
}

/// Compass rose showing the bearing: a rim, a fixed north tick and an arrow
/// that turns with the view.
pub fn compass(bearing: f64, radius: f64, angles: Angles) -> Dial {
    let (rs, rc) = {
        let (s, c) = COMPASS_ARROW_ANGLE.to_radians().sin_cos();
        (radius * s, radius * c)
    };
    let (s, c) = bearing.to_radians().sin_cos();
    let (sa, ca) = (-s, c);
    let (rsa, rca) = (radius * sa, radius * ca);

    let tip = (rsa, -rca);
    let left = (-rs * ca - rc * sa, -rs * sa + rc * ca);
    let right = (rs * ca - rc * sa, rs * sa + rc * ca);
    let notch = (-rsa / 2.0, rca / 2.0);

    Dial {
        lines: vec![
            Line2::new(tip, left),
            Line2::new(tip, right),
            Line2::new(left, notch),
            Line2::new(right, notch),
            Line2::new((0.0, -radius / 2.0), (0.0, -radius)),
        ],
        rim: Some(radius),
        caption: format!("{:03}", angles.from_degrees(bearing).floor() as i32),
    }
}

/// Clinometer showing the inclination: a horizon line and a pointer raised
/// by the viewing angle. `width` is the full dial width.
pub fn clino(inclination: f64, width: f64, angles: Angles) -> Dial {
    let r = width * CLINO_HORIZON / 2.0;
    let q = width * CLINO_POINTER / 2.0;
    let (sa, ca) = inclination.to_radians().sin_cos();
    let pivot = (-q, 0.0);
    let barb = |angle: f64| {
        let (s, c) = (inclination + angle).to_radians().sin_cos();
        (-q + CLINO_ARROW_LEN * q * c, -CLINO_ARROW_LEN * q * s)
    };

    Dial {
        lines: vec![
            Line2::new((-r, 0.0), (r, 0.0)),
            Line2::new(pivot, (-q + 2.0 * q * ca, -2.0 * q * sa)),
            Line2::new(pivot, barb(CLINO_ARROW_ANGLE)),
            Line2::new(pivot, barb(-CLINO_ARROW_ANGLE)),
        ],
        rim: None,
        caption: format!("{}", -(angles.from_degrees(inclination).trunc() as i32)),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Metric,
    Imperial,
}

impl Units {
    pub fn toggled(&self) -> Self {
        match self {
            Units::Metric => Units::Imperial,
            Units::Imperial => Units::Metric,
        }
    }
}

/// A round-numbered length marker.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaleBar {
    /// On-screen length.
    pub length_px: i32,
    /// Length in the display unit (metres or feet).
    pub length: f64,
    pub caption: String,
}

impl ScaleBar {
    /// The longest bar of one or five times a power of ten that fits in
    /// `max_px` at `scale` screen units per metre.
    pub fn new(max_px: i32, scale: f64, units: Units) -> Option<Self> {
        if max_px <= 0 || !scale.is_finite() || scale <= 0.0 {
            return None;
        }
        let per_unit = match units {
            Units::Metric => 1.0,
            Units::Imperial => FEET_PER_METRE,
        };

        let max_len = max_px as f64 / scale * per_unit;
        let length = nice_length(max_len);
        let length_px = (length / per_unit * scale).round() as i32;

        let caption = match units {
            Units::Metric if length >= 1000.0 => format!("{} km", length / 1000.0),
            Units::Metric => format!("{} m", length),
            Units::Imperial => format!("{} ft", length),
        };

        Some(Self {
            length_px,
            length,
            caption,
        })
    }
}

/// `10^floor(log10(l))`, or five times that when the mantissa allows.
pub fn nice_length(l: f64) -> f64 {
    let m = l.log10();
    let exponent = m.floor();
    let n = 10f64.powi(exponent as i32);
    if m - exponent < 5f64.log10() {
        n
    } else {
        5.0 * n
    }
}
