//! Whole-pipeline checks: survey text in, draw calls out.

use std::path::Path;
use std::time::Duration;

use caverot_core::{
    parse_survey, Dataset, EngineConfig, FrameOutcome, Ink, Rgb, Segment2D, Surface,
    TextMetrics, View, SURFACE_BAND, UNIFORM_LEG_COLOUR,
};
use nalgebra::Point3;

/// Records draw calls instead of drawing.
struct RecordingSurface {
    size: (u32, u32),
    segments: Vec<(usize, Segment2D)>,
    colours: Vec<Rgb>,
    crosses: usize,
    texts: Vec<(i32, i32, String, Ink)>,
    presents: usize,
}

impl RecordingSurface {
    fn new(width: u32, height: u32) -> Self {
        Self {
            size: (width, height),
            segments: Vec::new(),
            colours: Vec::new(),
            crosses: 0,
            texts: Vec::new(),
            presents: 0,
        }
    }

    fn labels(&self) -> Vec<&str> {
        self.texts
            .iter()
            .filter(|(_, _, _, ink)| *ink == Ink::Label)
            .map(|(_, _, text, _)| text.as_str())
            .collect()
    }
}

impl TextMetrics for RecordingSurface {
    fn text_width(&self, text: &str) -> i32 {
        6 * text.chars().count() as i32
    }

    fn text_height(&self) -> i32 {
        10
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> (u32, u32) {
        self.size
    }

    fn clear(&mut self) {
        self.segments.clear();
        self.colours.clear();
        self.crosses = 0;
        self.texts.clear();
    }

    fn draw_segments(&mut self, colour: Rgb, segments: &[Segment2D]) {
        self.colours.push(colour);
        self.segments
            .extend(segments.iter().map(|segment| (segment.depth_band, *segment)));
    }

    fn draw_line(&mut self, _from: (i32, i32), _to: (i32, i32), ink: Ink) {
        if ink == Ink::Cross {
            self.crosses += 1;
        }
    }

    fn draw_text(&mut self, x: i32, y: i32, text: &str, ink: Ink) {
        self.texts.push((x, y, text.to_string(), ink));
    }

    fn present(&mut self) {
        self.presents += 1;
    }
}

fn single_leg_view() -> View {
    let survey = parse_survey(
        Path::new("leg.txt"),
        "move 0 0 0\ndraw 10 0 0\nstop\nstation a 0 0 0\nstation b 10 0 0\n",
    )
    .unwrap();
    let mut view = View::new(EngineConfig::default(), (400, 300));
    view.add_survey(survey);
    view.set_scale(1.0);
    view.set_pan_center(Point3::origin());
    view
}

#[test]
fn test_single_leg_projects_east_of_origin() {
    let mut view = single_leg_view();
    let mut surface = RecordingSurface::new(400, 300);

    let outcome = view.request_frame(&mut surface, Duration::ZERO);
    assert_eq!(outcome, FrameOutcome::Rebuilt);
    assert_eq!(surface.segments.len(), 1);

    let (_, segment) = surface.segments[0];
    assert_eq!((segment.x1, segment.y1), (200, 150));
    assert_eq!((segment.x2, segment.y2), (210, 150));
}

#[test]
fn test_unchanged_state_is_idle() {
    let mut view = single_leg_view();
    let mut surface = RecordingSurface::new(400, 300);

    view.request_frame(&mut surface, Duration::ZERO);
    let outcome = view.request_frame(&mut surface, Duration::from_millis(33));
    assert_eq!(outcome, FrameOutcome::Idle);
    assert_eq!(surface.presents, 1);
}

#[test]
fn test_label_toggle_redraws_only() {
    let mut view = single_leg_view();
    let mut surface = RecordingSurface::new(400, 300);
    view.request_frame(&mut surface, Duration::ZERO);

    view.toggle_labels();
    let outcome = view.request_frame(&mut surface, Duration::ZERO);
    assert_eq!(outcome, FrameOutcome::Redrawn);
    // "a" at x 200 spans 6 units; "b" sits at x 210 so both fit
    assert_eq!(surface.labels(), vec!["a", "b"]);

    // zoomed out the two labels collide and the first one wins
    view.set_scale(0.1);
    assert_eq!(
        view.request_frame(&mut surface, Duration::ZERO),
        FrameOutcome::Rebuilt
    );
    assert_eq!(surface.labels(), vec!["a"]);

    view.toggle_show_all_names();
    view.request_frame(&mut surface, Duration::ZERO);
    assert_eq!(surface.labels(), vec!["a", "b"]);
}

#[test]
fn test_rotation_rebuilds_each_tick() {
    let mut view = single_leg_view();
    let mut surface = RecordingSurface::new(400, 300);
    view.set_rotation_speed(90.0);

    view.start_rotation(Duration::from_secs(1));
    assert!(view.is_rotating());
    view.request_frame(&mut surface, Duration::from_secs(1));
    let outcome = view.request_frame(&mut surface, Duration::from_secs(3));
    assert_eq!(outcome, FrameOutcome::Rebuilt);
    assert!((view.state().bearing() - 180.0).abs() < 1e-9);

    // bearing 180 puts the leg west of the origin
    let (_, segment) = surface.segments[0];
    assert_eq!(segment.x2, 190);

    view.stop_rotation();
    view.request_frame(&mut surface, Duration::from_secs(4));
    assert_eq!(
        view.request_frame(&mut surface, Duration::from_secs(5)),
        FrameOutcome::Idle
    );
}

#[test]
fn test_surface_resize_rescales() {
    let mut view = single_leg_view();
    let mut surface = RecordingSurface::new(400, 300);
    view.request_frame(&mut surface, Duration::ZERO);

    let mut wider = RecordingSurface::new(800, 600);
    assert_eq!(
        view.request_frame(&mut wider, Duration::ZERO),
        FrameOutcome::Rebuilt
    );
    assert_eq!(view.viewport(), (800, 600));
    assert!((view.state().scale() - 2.0).abs() < 1e-9);
    let (_, segment) = wider.segments[0];
    assert_eq!((segment.x1, segment.x2), (400, 420));
}

#[test]
fn test_surface_legs_follow_toggle() {
    let survey = parse_survey(
        Path::new("hill.txt"),
        "move 0 0 -5\ndraw 5 0 -5\nsurface\nmove 0 0 10\ndraw 0 5 12\n",
    )
    .unwrap();
    let mut view = View::with_dataset(
        EngineConfig::default(),
        Dataset::from_surveys(vec![survey]),
        (400, 300),
    );
    let mut surface = RecordingSurface::new(400, 300);

    view.request_frame(&mut surface, Duration::ZERO);
    assert!(surface.segments.iter().all(|(band, _)| *band != SURFACE_BAND));

    view.toggle_surface_legs();
    assert_eq!(
        view.request_frame(&mut surface, Duration::ZERO),
        FrameOutcome::Rebuilt
    );
    let surface_segments: Vec<_> = surface
        .segments
        .iter()
        .filter(|(band, segment)| *band == SURFACE_BAND && segment.depth_band == SURFACE_BAND)
        .collect();
    assert_eq!(surface_segments.len(), 1);
}

#[test]
fn test_adding_a_survey_invalidates() {
    let mut view = single_leg_view();
    let mut surface = RecordingSurface::new(400, 300);
    view.request_frame(&mut surface, Duration::ZERO);

    let more = parse_survey(Path::new("more.txt"), "move 0 0 0\ndraw 0 10 0\n").unwrap();
    view.add_survey(more);
    assert_eq!(
        view.request_frame(&mut surface, Duration::ZERO),
        FrameOutcome::Rebuilt
    );
    assert_eq!(surface.segments.len(), 2);
}

#[test]
fn test_crosses_survive_extreme_zoom() {
    let mut view = single_leg_view();
    let mut surface = RecordingSurface::new(400, 300);
    view.set_scale(1e12);
    view.toggle_crosses();

    assert_eq!(
        view.request_frame(&mut surface, Duration::ZERO),
        FrameOutcome::Rebuilt
    );
    // station b is ten metres away, far beyond the edge at this zoom
    assert_eq!(surface.crosses, 2);
}

#[test]
fn test_display_keys_redraw_without_rebuild() {
    use caverot_core::{key_action, Key, Modifiers};

    let mut view = single_leg_view();
    let mut surface = RecordingSurface::new(400, 300);
    view.request_frame(&mut surface, Duration::ZERO);
    assert_ne!(surface.colours, vec![UNIFORM_LEG_COLOUR]);

    for (key, modifiers) in [
        (Key::Char('d'), Modifiers::CTRL),
        (Key::Char('b'), Modifiers::NONE),
        (Key::Char('k'), Modifiers::NONE),
        (Key::Char('i'), Modifiers::NONE),
        (Key::Char('m'), Modifiers::NONE),
        (Key::Char('g'), Modifiers::NONE),
        (Key::Char('r'), Modifiers::CTRL),
    ] {
        if let Some(action) = key_action(key, modifiers) {
            view.apply(action, Duration::ZERO);
        }
        assert_ne!(
            view.request_frame(&mut surface, Duration::ZERO),
            FrameOutcome::Rebuilt
        );
    }
    assert_eq!(surface.colours, vec![UNIFORM_LEG_COLOUR]);
    assert!(view.reverse_controls());
    let status = &surface.texts.last().unwrap().2;
    assert!(status.contains("inclination 100"));
}
