//! Frame assembly against an abstract drawing surface.
//!
//! The renderer keeps the segment cache and decides, frame by frame, whether
//! anything needs doing: a change to the projection inputs rebuilds the cache
//! and redraws, a change to display toggles only redraws, and an unchanged
//! frame costs nothing.

use std::f64::consts::TAU;

use tracing::debug;

use crate::cache::{Layers, Segment2D, SegmentCache, BAND_COUNT, SURFACE_BAND};
use crate::config::EngineConfig;
use crate::geometry::Dataset;
use crate::indicators::{self, Angles, Dial, ScaleBar, Units};
use crate::labels::LabelPlacer;
pub use crate::labels::TextMetrics;
use crate::projection::Projection;
use crate::state::ViewState;

/// What a line or text item is, so each surface can pick its own style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ink {
    Cross,
    Label,
    Indicator,
    Status,
}

/// Presentation layer. Double buffering, if any, is the surface's business:
/// nothing drawn needs to be visible before `present`.
pub trait Surface: TextMetrics {
    /// Drawable area in screen units.
    fn size(&self) -> (u32, u32);

    fn clear(&mut self);

    /// Draw a batch of segments in one colour.
    fn draw_segments(&mut self, colour: Rgb, segments: &[Segment2D]);

    fn draw_line(&mut self, from: (i32, i32), to: (i32, i32), ink: Ink);

    /// `(x, y)` is the top-left corner of the text.
    fn draw_text(&mut self, x: i32, y: i32, text: &str, ink: Ink);

    fn present(&mut self);
}

pub type Rgb = (u8, u8, u8);

/// Underground legs when not colouring by depth.
pub const UNIFORM_LEG_COLOUR: Rgb = (255, 255, 255);

/// Display colour of a depth band, from shallow (violet) to deep (red), with
/// surface legs last.
pub fn band_colour(band: usize) -> Rgb {
    const COLOURS: [Rgb; BAND_COUNT] = [
        (238, 130, 238), // violet
        (160, 32, 240),  // purple
        (0, 0, 255),     // blue
        (0, 255, 255),   // cyan
        (0, 255, 0),     // green
        (154, 205, 50),  // yellow green
        (255, 255, 0),   // yellow
        (255, 165, 0),   // orange
        (255, 69, 0),    // orange red
        (255, 0, 0),     // red
        (233, 150, 122), // dark salmon, surface
    ];
    COLOURS[band.min(BAND_COUNT - 1)]
}

/// Colour a band is drawn in. Surface legs keep their own colour either way.
pub fn leg_colour(band: usize, by_depth: bool) -> Rgb {
    if by_depth || band >= SURFACE_BAND {
        band_colour(band)
    } else {
        UNIFORM_LEG_COLOUR
    }
}

/// User-switchable layers, overlays and display units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayToggles {
    pub legs: bool,
    pub surface: bool,
    pub crosses: bool,
    pub labels: bool,
    pub all_names: bool,
    pub scale_bar: bool,
    pub compass: bool,
    pub clino: bool,
    pub colour_by_depth: bool,
    pub units: Units,
    pub angles: Angles,
}

impl DisplayToggles {
    pub fn layers(&self) -> Layers {
        Layers {
            legs: self.legs,
            surface: self.surface,
        }
    }
}

impl Default for DisplayToggles {
    fn default() -> Self {
        Self {
            legs: true,
            surface: false,
            crosses: false,
            labels: false,
            all_names: false,
            scale_bar: true,
            compass: true,
            clino: true,
            colour_by_depth: true,
            units: Units::Metric,
            angles: Angles::Degrees,
        }
    }
}

/// Everything that feeds the projected segments.
#[derive(Debug, Clone, Copy, PartialEq)]
struct ProjectionKey {
    bearing: f64,
    inclination: f64,
    scale: f64,
    pan_center: [f64; 3],
    layers: Layers,
    viewport: (u32, u32),
    generation: u64,
}

/// Everything that only changes how the cached segments are drawn, or what
/// is drawn over them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DisplayKey {
    toggles: DisplayToggles,
    rotating: bool,
}

/// Snapshot of the inputs of the last drawn frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameKey {
    projection: ProjectionKey,
    display: DisplayKey,
}

impl FrameKey {
    fn new(frame: &Frame<'_>, viewport: (u32, u32)) -> Self {
        let view = frame.view;
        let c = view.pan_center();
        Self {
            projection: ProjectionKey {
                bearing: view.bearing(),
                inclination: view.inclination(),
                scale: view.scale(),
                pan_center: [c.x, c.y, c.z],
                layers: frame.toggles.layers(),
                viewport,
                generation: frame.generation,
            },
            display: DisplayKey {
                toggles: frame.toggles,
                rotating: frame.rotating,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Nothing changed; the surface was not touched.
    Idle,
    /// Overlays changed; the cached segments were redrawn as they were.
    Redrawn,
    /// The projection changed; the cache was rebuilt and everything redrawn.
    Rebuilt,
}

impl FrameOutcome {
    pub fn drew(&self) -> bool {
        !matches!(self, FrameOutcome::Idle)
    }
}

/// Inputs for one frame.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pub dataset: &'a Dataset,
    pub view: &'a ViewState,
    pub toggles: DisplayToggles,
    pub rotating: bool,
    /// Bumped by the owner whenever the dataset changes.
    pub generation: u64,
}

#[derive(Debug, Clone)]
struct CachedScaleBar {
    scale: f64,
    max_px: i32,
    units: Units,
    bar: Option<ScaleBar>,
}

#[derive(Debug, Clone)]
pub struct Renderer {
    cache: SegmentCache,
    placer: LabelPlacer,
    last_key: Option<FrameKey>,
    scale_bar: Option<CachedScaleBar>,
    cross_size: i32,
    scale_bar_px: i32,
}

impl Renderer {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            cache: SegmentCache::new(config.band_capacity),
            placer: LabelPlacer::new(),
            last_key: None,
            scale_bar: None,
            cross_size: config.cross_size,
            scale_bar_px: config.scale_bar_px,
        }
    }

    pub fn cache(&self) -> &SegmentCache {
        &self.cache
    }

    /// Force the next frame to rebuild and redraw.
    pub fn invalidate(&mut self) {
        self.last_key = None;
    }

    pub fn render<S>(&mut self, surface: &mut S, frame: &Frame<'_>) -> FrameOutcome
    where
        S: Surface + ?Sized,
    {
        let viewport = surface.size();
        let key = FrameKey::new(frame, viewport);

        let outcome = match self.last_key {
            Some(last) if last == key => return FrameOutcome::Idle,
            Some(last) if last.projection == key.projection => FrameOutcome::Redrawn,
            _ => FrameOutcome::Rebuilt,
        };

        let projection = Projection::new(frame.view, origin_for(viewport));
        if outcome == FrameOutcome::Rebuilt {
            self.cache
                .rebuild(frame.dataset, &projection, frame.toggles.layers());
        }

        self.draw(surface, frame, &projection, viewport);
        self.last_key = Some(key);
        debug!(?outcome, "frame drawn");
        outcome
    }

    fn draw<S>(
        &mut self,
        surface: &mut S,
        frame: &Frame<'_>,
        projection: &Projection,
        viewport: (u32, u32),
    ) where
        S: Surface + ?Sized,
    {
        let toggles = frame.toggles;
        surface.clear();

        for group in self.cache.groups() {
            if !group.is_empty() {
                let colour = leg_colour(group.band(), toggles.colour_by_depth);
                surface.draw_segments(colour, group.segments());
            }
        }

        if toggles.crosses {
            self.draw_crosses(surface, frame.dataset, projection, viewport);
        }

        if frame.toggles.labels {
            let labels = self.placer.place(
                frame.dataset.stations(),
                projection,
                viewport,
                &*surface,
                frame.toggles.all_names,
            );
            for label in &labels {
                surface.draw_text(label.x, label.y, &label.text, Ink::Label);
            }
        }

        self.draw_indicators(surface, frame.view, &toggles, viewport);
        if toggles.scale_bar {
            self.draw_scale_bar(surface, frame.view.scale(), toggles.units, viewport);
        }

        let status = status_line(frame);
        surface.draw_text(0, 0, &status, Ink::Status);

        surface.present();
    }

    /// Station crosses whose box misses the viewport are skipped; a far-off
    /// station at high zoom projects to the edge of the `i32` range.
    fn draw_crosses<S>(
        &self,
        surface: &mut S,
        dataset: &Dataset,
        projection: &Projection,
        viewport: (u32, u32),
    ) where
        S: Surface + ?Sized,
    {
        let c = self.cross_size;
        let (width, height) = (viewport.0 as i32, viewport.1 as i32);
        for station in dataset.stations() {
            let p = projection.project(&station.position);
            if p.x.saturating_add(c) < 0
                || p.y.saturating_add(c) < 0
                || p.x.saturating_sub(c) > width
                || p.y.saturating_sub(c) > height
            {
                continue;
            }
            let (left, right) = (p.x.saturating_sub(c), p.x.saturating_add(c));
            let (top, bottom) = (p.y.saturating_sub(c), p.y.saturating_add(c));
            surface.draw_line((left, top), (right, bottom), Ink::Cross);
            surface.draw_line((left, bottom), (right, top), Ink::Cross);
        }
    }

    fn draw_indicators<S>(
        &self,
        surface: &mut S,
        view: &ViewState,
        toggles: &DisplayToggles,
        viewport: (u32, u32),
    ) where
        S: Surface + ?Sized,
    {
        let (width, height) = (viewport.0 as f64, viewport.1 as f64);
        let radius = (width.min(height) / 10.0).max(4.0);
        let text_height = surface.text_height() as f64;

        // the clino keeps its place below the compass whether or not the
        // compass is shown
        let compass_centre = (width - radius * 1.5, radius * 1.5 + text_height);
        if toggles.compass {
            draw_dial(
                surface,
                &indicators::compass(view.bearing(), radius, toggles.angles),
                compass_centre,
                radius,
            );
        }

        if toggles.clino {
            let clino_width = radius * 2.5;
            let clino_centre = (
                compass_centre.0,
                compass_centre.1 + radius * 2.5 + text_height * 2.0,
            );
            draw_dial(
                surface,
                &indicators::clino(view.inclination(), clino_width, toggles.angles),
                clino_centre,
                text_height,
            );
        }
    }

    fn draw_scale_bar<S>(&mut self, surface: &mut S, scale: f64, units: Units, viewport: (u32, u32))
    where
        S: Surface + ?Sized,
    {
        let max_px = self.scale_bar_px.min(viewport.0 as i32 / 2);
        let stale = self.scale_bar.as_ref().map_or(true, |cached| {
            cached.scale != scale || cached.max_px != max_px || cached.units != units
        });
        if stale {
            self.scale_bar = Some(CachedScaleBar {
                scale,
                max_px,
                units,
                bar: ScaleBar::new(max_px, scale, units),
            });
        }
        let Some(bar) = self.scale_bar.as_ref().and_then(|c| c.bar.as_ref()) else {
            return;
        };

        let text_height = surface.text_height();
        // leave the bottom line free for host overlays
        let x0 = text_height;
        let y = viewport.1 as i32 - 2 * text_height;
        let x1 = x0 + bar.length_px;
        let tick = (text_height / 2).max(1);

        surface.draw_line((x0, y), (x1, y), Ink::Indicator);
        surface.draw_line((x0, y - tick), (x0, y), Ink::Indicator);
        surface.draw_line((x1, y - tick), (x1, y), Ink::Indicator);
        surface.draw_text(x0, y - tick - text_height, &bar.caption, Ink::Indicator);
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

/// The pan centre lands in the middle of the viewport.
pub fn origin_for(viewport: (u32, u32)) -> (i32, i32) {
    ((viewport.0 / 2) as i32, (viewport.1 / 2) as i32)
}

fn draw_dial<S>(surface: &mut S, dial: &Dial, centre: (f64, f64), caption_gap: f64)
where
    S: Surface + ?Sized,
{
    let at = |(x, y): (f64, f64)| {
        (
            (centre.0 + x).round() as i32,
            (centre.1 + y).round() as i32,
        )
    };

    if let Some(rim) = dial.rim {
        const SIDES: usize = 24;
        let vertex = |i: usize| {
            let (s, c) = (TAU * i as f64 / SIDES as f64).sin_cos();
            at((rim * c, rim * s))
        };
        for i in 0..SIDES {
            surface.draw_line(vertex(i), vertex(i + 1), Ink::Indicator);
        }
    }
    for line in &dial.lines {
        surface.draw_line(at(line.from), at(line.to), Ink::Indicator);
    }

    let below = dial.rim.unwrap_or(0.0) + caption_gap;
    let caption_width = surface.text_width(&dial.caption);
    let (x, y) = at((0.0, below));
    surface.draw_text(x - caption_width / 2, y, &dial.caption, Ink::Indicator);
}

fn status_line(frame: &Frame<'_>) -> String {
    let view = frame.view;
    let title = frame.dataset.title().unwrap_or("no survey");
    let rotation = if frame.rotating {
        format!("rotating {:.1} deg/s", view.rotation_speed())
    } else {
        "stopped".to_string()
    };
    let angles = frame.toggles.angles;
    format!(
        "{} | {} | bearing {:03} | inclination {} | {}",
        title,
        view.mode().label(),
        angles.from_degrees(view.bearing()).floor() as i32,
        angles.from_degrees(view.inclination()).trunc() as i32,
        rotation
    )
}
