//! Station name placement without overlaps.

use crate::geometry::StationLabel;
use crate::projection::Projection;

/// Text measurement supplied by whatever surface the labels end up on.
pub trait TextMetrics {
    /// Rendered width of `text` in screen units.
    fn text_width(&self, text: &str) -> i32;

    /// Height of a line of text in screen units.
    fn text_height(&self) -> i32;

    /// Vertical offset from a station to its label origin, so the text
    /// hangs just below the marker.
    fn baseline_offset(&self) -> i32 {
        self.text_height()
    }
}

/// Screen rectangle; `x`/`y` is the top-left corner, edges are half-open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// True when the two rectangles share a region of positive area.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.x.saturating_add(other.width)
            && other.x < self.x.saturating_add(self.width)
            && self.y < other.y.saturating_add(other.height)
            && other.y < self.y.saturating_add(self.height)
    }
}

/// Screen area already claimed by labels drawn this frame.
#[derive(Debug, Clone, Default)]
pub struct LabelRegion {
    claimed: Vec<Rect>,
}

impl LabelRegion {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.claimed.clear();
    }

    pub fn overlaps(&self, rect: &Rect) -> bool {
        self.claimed.iter().any(|r| r.intersects(rect))
    }

    pub fn claim(&mut self, rect: Rect) {
        self.claimed.push(rect);
    }

    pub fn len(&self) -> usize {
        self.claimed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.claimed.is_empty()
    }
}

/// A label that survived placement; `x`/`y` is the text origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedLabel {
    pub x: i32,
    pub y: i32,
    pub text: String,
}

/// Decides which station names to draw. Owns its region so the rectangle
/// list is reused between frames; it is emptied at the start of every pass.
#[derive(Debug, Clone, Default)]
pub struct LabelPlacer {
    region: LabelRegion,
}

impl LabelPlacer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn region(&self) -> &LabelRegion {
        &self.region
    }

    /// Place labels for `stations` in order. The first label to claim an
    /// area wins; later overlapping ones are suppressed unless `show_all`.
    pub fn place<'a, M>(
        &mut self,
        stations: impl IntoIterator<Item = &'a StationLabel>,
        projection: &Projection,
        viewport: (u32, u32),
        metrics: &M,
        show_all: bool,
    ) -> Vec<PlacedLabel>
    where
        M: TextMetrics + ?Sized,
    {
        self.region.clear();
        let (width, height) = (viewport.0 as i32, viewport.1 as i32);
        let text_height = metrics.text_height();
        let offset = metrics.baseline_offset();
        let mut placed = Vec::new();

        for station in stations {
            let p = projection.project(&station.position);
            let x = p.x;
            let y = p.y.saturating_add(offset);

            // cheap reject before measuring the text
            if x >= width || y >= height || y.saturating_add(text_height) <= 0 {
                continue;
            }
            let text_width = metrics.text_width(&station.name);
            if x.saturating_add(text_width) <= 0 {
                continue;
            }

            if !show_all {
                let rect = Rect::new(x, y, text_width, text_height);
                if self.region.overlaps(&rect) {
                    continue;
                }
                self.region.claim(rect);
            }

            placed.push(PlacedLabel {
                x,
                y,
                text: station.name.clone(),
            });
        }

        placed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::ViewState;

    /// One unit per character, two units tall.
    struct Monospace;

    impl TextMetrics for Monospace {
        fn text_width(&self, text: &str) -> i32 {
            text.chars().count() as i32
        }

        fn text_height(&self) -> i32 {
            2
        }

        fn baseline_offset(&self) -> i32 {
            0
        }
    }

    fn place(stations: &[StationLabel], show_all: bool) -> Vec<PlacedLabel> {
        let projection = Projection::new(&ViewState::default(), (50, 50));
        LabelPlacer::new().place(stations, &projection, (100, 100), &Monospace, show_all)
    }

    #[test]
    fn test_overlapping_labels_first_wins() {
        let stations = vec![
            StationLabel::new("first", 0.0, 0.0, 0.0),
            StationLabel::new("second", 2.0, 0.0, 0.0),
        ];
        let placed = place(&stations, false);
        assert_eq!(placed.len(), 1);
        assert_eq!(placed[0].text, "first");
    }

    #[test]
    fn test_disjoint_labels_both_kept() {
        let stations = vec![
            StationLabel::new("a", 0.0, 0.0, 0.0),
            StationLabel::new("b", 20.0, 0.0, 0.0),
        ];
        assert_eq!(place(&stations, false).len(), 2);
    }

    #[test]
    fn test_touching_labels_do_not_overlap() {
        let stations = vec![
            StationLabel::new("abc", 0.0, 0.0, 0.0),
            StationLabel::new("def", 3.0, 0.0, 0.0),
        ];
        assert_eq!(place(&stations, false).len(), 2);
    }

    #[test]
    fn test_show_all_bypasses_overlap() {
        let stations = vec![
            StationLabel::new("first", 0.0, 0.0, 0.0),
            StationLabel::new("second", 2.0, 0.0, 0.0),
        ];
        assert_eq!(place(&stations, true).len(), 2);
    }

    #[test]
    fn test_offscreen_labels_skipped() {
        let stations = vec![
            StationLabel::new("right", 60.0, 0.0, 0.0),
            StationLabel::new("left", -60.0, 0.0, 0.0),
            StationLabel::new("above", 0.0, 60.0, 0.0),
            StationLabel::new("partly", -52.0, 0.0, 0.0),
        ];
        let placed = place(&stations, true);
        assert_eq!(placed.len(), 1);
        assert_eq!(placed[0].text, "partly");
        assert_eq!(placed[0].x, -2);
    }

    #[test]
    fn test_region_reset_between_passes() {
        let stations = vec![StationLabel::new("same", 0.0, 0.0, 0.0)];
        let projection = Projection::new(&ViewState::default(), (50, 50));
        let mut placer = LabelPlacer::new();
        for _ in 0..3 {
            let placed = placer.place(&stations, &projection, (100, 100), &Monospace, false);
            assert_eq!(placed.len(), 1);
        }
        assert_eq!(placer.region().len(), 1);
    }
}
