//! Tunable engine constants.

use serde::{Deserialize, Serialize};

/// Knobs for the engine. Every field has a default matching the classic
/// viewer, so a partial JSON block only needs the values it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum segments retained per depth band in one rebuild.
    pub band_capacity: usize,
    /// Multiplier applied per zoom step.
    pub zoom_factor: f64,
    /// Multiplier applied per rotation speed step.
    pub speed_factor: f64,
    /// Lower bound on |rotation speed| in degrees per second.
    pub min_speed: f64,
    /// Upper bound on |rotation speed| in degrees per second.
    pub max_speed: f64,
    pub default_speed: f64,
    /// Degrees per tilt step.
    pub tilt_step: f64,
    /// Screen units per pan step.
    pub pan_step_px: f64,
    /// Half-length of a station cross in screen units.
    pub cross_size: i32,
    /// Longest scale bar, in screen units.
    pub scale_bar_px: i32,
    /// Fraction of the viewport the dataset fills at the default scale.
    pub fit_margin: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            band_capacity: 40_000,
            zoom_factor: 1.06,
            speed_factor: 1.2,
            min_speed: 0.1,
            max_speed: 720.0,
            default_speed: 15.0,
            tilt_step: 3.0,
            pan_step_px: 20.0,
            cross_size: 3,
            scale_bar_px: 200,
            fit_margin: 0.9,
        }
    }
}
