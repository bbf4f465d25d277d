//! Caverot Core Library - survey projection and frame assembly
//!
//! This library holds everything a cave survey viewer needs apart from the
//! actual pixels: the survey data model and loader, the orthographic
//! projection, the depth-banded segment cache, label placement, rotation, the
//! shared key bindings and the renderer that drives an abstract drawing
//! surface.

pub mod cache;
pub mod config;
pub mod controls;
pub mod error;
pub mod geometry;
pub mod indicators;
pub mod labels;
pub mod loader;
pub mod projection;
pub mod render;
pub mod rotation;
pub mod state;
pub mod view;

// Re-export commonly used types
pub use cache::{
    DepthBands, Layers, Overflow, RebuildReport, Segment2D, SegmentCache, BAND_COUNT,
    NUM_DEPTH_BANDS, SURFACE_BAND,
};
pub use config::EngineConfig;
pub use controls::{key_action, Heading, Key, KeyAction, Modifiers};
pub use error::{LoadError, ViewError};
pub use geometry::{Dataset, Extents, PathElement, Point3D, StationLabel, Survey};
pub use indicators::{Angles, ScaleBar, Units};
pub use labels::{LabelPlacer, LabelRegion, PlacedLabel, Rect, TextMetrics};
pub use loader::{load_survey, parse_survey};
pub use projection::{project, Projected, Projection};
pub use render::{
    band_colour, leg_colour, DisplayToggles, Frame, FrameOutcome, Ink, Renderer, Rgb, Surface,
    UNIFORM_LEG_COLOUR,
};
pub use rotation::{RotationController, RotationState};
pub use state::{ViewMode, ViewState};
pub use view::{Direction, Drag, View};
