//! Depth-banded cache of projected leg segments.
//!
//! A rebuild reprojects every visible leg and sorts the resulting 2D segments
//! into one group per depth band, ready for batch drawing. Each group has a
//! fixed capacity; segments past it are dropped for that rebuild and the
//! overflow is reported once per band rather than once per segment.

use tracing::{debug, warn};

use crate::geometry::{Dataset, Extents, PathElement};
use crate::projection::{Projected, Projection};

/// Interior depth bands.
pub const NUM_DEPTH_BANDS: usize = 10;
/// Band index shared by every surface leg.
pub const SURFACE_BAND: usize = NUM_DEPTH_BANDS;
/// Interior bands plus the surface band.
pub const BAND_COUNT: usize = NUM_DEPTH_BANDS + 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment2D {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
    pub depth_band: usize,
}

/// Linear map from depth onto `[0, NUM_DEPTH_BANDS - 1]` over
/// `centre ± half_range`, clamped at both ends.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthBands {
    centre: f64,
    half_range: f64,
    band_scale: f64,
}

impl DepthBands {
    pub fn new(centre: f64, half_range: f64) -> Self {
        let band_scale = if half_range > 0.0 {
            (NUM_DEPTH_BANDS - 1) as f64 / (2.0 * half_range)
        } else {
            0.0
        };
        Self {
            centre,
            half_range,
            band_scale,
        }
    }

    /// Bands for a dataset: depth is `-z`, so the centre is `-Zorg` and the
    /// highest passages land in band 0.
    pub fn for_extents(extents: &Extents) -> Self {
        Self::new(-extents.origin.z, extents.radius.z)
    }

    pub fn band(&self, depth: f64) -> usize {
        let scaled = (depth - (self.centre - self.half_range)) * self.band_scale;
        if scaled.is_nan() || scaled < 0.0 {
            0
        } else {
            (scaled as usize).min(NUM_DEPTH_BANDS - 1)
        }
    }
}

/// Which leg streams take part in a rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layers {
    pub legs: bool,
    pub surface: bool,
}

impl Default for Layers {
    fn default() -> Self {
        Self {
            legs: true,
            surface: false,
        }
    }
}

/// Segments one band could not hold during a rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Overflow {
    pub band: usize,
    pub dropped: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RebuildReport {
    pub retained: usize,
    pub overflows: Vec<Overflow>,
}

impl RebuildReport {
    pub fn dropped(&self) -> usize {
        self.overflows.iter().map(|o| o.dropped).sum()
    }
}

/// Bounded buffer of segments drawn in one style.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentGroup {
    band: usize,
    capacity: usize,
    segments: Vec<Segment2D>,
    dropped: usize,
}

impl SegmentGroup {
    fn new(band: usize, capacity: usize) -> Self {
        Self {
            band,
            capacity,
            segments: Vec::new(),
            dropped: 0,
        }
    }

    pub fn band(&self) -> usize {
        self.band
    }

    pub fn segments(&self) -> &[Segment2D] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns false once the group is full; the segment is not stored.
    fn push(&mut self, segment: Segment2D) -> bool {
        if self.segments.len() < self.capacity {
            self.segments.push(segment);
            true
        } else {
            self.dropped += 1;
            false
        }
    }
}

#[derive(Debug, Clone)]
pub struct SegmentCache {
    capacity: usize,
    groups: Vec<SegmentGroup>,
    last_report: RebuildReport,
    overflow_logged: bool,
}

impl SegmentCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            groups: empty_groups(capacity),
            last_report: RebuildReport::default(),
            overflow_logged: false,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Groups in band order: interior bands first, surface last.
    pub fn groups(&self) -> &[SegmentGroup] {
        &self.groups
    }

    pub fn segment_count(&self) -> usize {
        self.groups.iter().map(SegmentGroup::len).sum()
    }

    pub fn last_report(&self) -> &RebuildReport {
        &self.last_report
    }

    pub fn clear(&mut self) {
        self.groups = empty_groups(self.capacity);
        self.last_report = RebuildReport::default();
    }

    /// Reproject the dataset and replace the cached groups.
    ///
    /// The replacement is built aside, so the previous groups stay intact
    /// until the new set is complete.
    pub fn rebuild(
        &mut self,
        dataset: &Dataset,
        projection: &Projection,
        layers: Layers,
    ) -> &RebuildReport {
        let bands = DepthBands::for_extents(dataset.extents());
        let mut groups = empty_groups(self.capacity);

        for survey in dataset.surveys() {
            if layers.legs {
                add_path(&mut groups, &survey.legs, projection, |p| bands.band(p.depth));
            }
            if layers.surface {
                add_path(&mut groups, &survey.surface, projection, |_| SURFACE_BAND);
            }
        }

        let report = RebuildReport {
            retained: groups.iter().map(SegmentGroup::len).sum(),
            overflows: groups
                .iter()
                .filter(|g| g.dropped > 0)
                .map(|g| Overflow {
                    band: g.band,
                    dropped: g.dropped,
                })
                .collect(),
        };

        if !report.overflows.is_empty() {
            if self.overflow_logged {
                debug!(dropped = report.dropped(), "segment buffers still overflowing");
            } else {
                let bands: Vec<usize> = report.overflows.iter().map(|o| o.band).collect();
                warn!(
                    capacity = self.capacity,
                    dropped = report.dropped(),
                    ?bands,
                    "ignoring some legs rather than overflowing the segment buffer"
                );
                self.overflow_logged = true;
            }
        }
        debug!(retained = report.retained, "segment cache rebuilt");

        self.groups = groups;
        self.last_report = report;
        &self.last_report
    }
}

impl Default for SegmentCache {
    fn default() -> Self {
        Self::new(crate::config::EngineConfig::default().band_capacity)
    }
}

fn empty_groups(capacity: usize) -> Vec<SegmentGroup> {
    (0..BAND_COUNT)
        .map(|band| SegmentGroup::new(band, capacity))
        .collect()
}

fn add_path(
    groups: &mut [SegmentGroup],
    path: &[PathElement],
    projection: &Projection,
    band_of: impl Fn(&Projected) -> usize,
) {
    let mut pen: Option<Projected> = None;
    for element in path {
        match element {
            PathElement::Move(p) => pen = Some(projection.project(p)),
            PathElement::Draw(p) => {
                let to = projection.project(p);
                if let Some(from) = pen {
                    let band = band_of(&to);
                    groups[band].push(Segment2D {
                        x1: from.x,
                        y1: from.y,
                        x2: to.x,
                        y2: to.y,
                        depth_band: band,
                    });
                }
                pen = Some(to);
            }
            PathElement::Stop => pen = None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Survey;
    use crate::state::ViewState;
    use nalgebra::Point3;

    fn plan_projection() -> Projection {
        Projection::new(&ViewState::default(), (0, 0))
    }

    fn leg(from: (f64, f64, f64), to: (f64, f64, f64)) -> [PathElement; 3] {
        [
            PathElement::Move(Point3::new(from.0, from.1, from.2)),
            PathElement::Draw(Point3::new(to.0, to.1, to.2)),
            PathElement::Stop,
        ]
    }

    #[test]
    fn test_band_clamps_and_orders() {
        let bands = DepthBands::new(0.0, 10.0);
        assert_eq!(bands.band(-10.0), 0);
        assert_eq!(bands.band(-50.0), 0);
        assert_eq!(bands.band(10.0), NUM_DEPTH_BANDS - 1);
        assert_eq!(bands.band(50.0), NUM_DEPTH_BANDS - 1);
        assert!(bands.band(-2.0) <= bands.band(2.0));
        assert_eq!(bands.band(f64::NAN), 0);
    }

    #[test]
    fn test_flat_dataset_uses_first_band() {
        let bands = DepthBands::new(5.0, 0.0);
        assert_eq!(bands.band(5.0), 0);
        assert_eq!(bands.band(100.0), 0);
    }

    #[test]
    fn test_pen_moves_and_stops() {
        let mut survey = Survey::new("pen");
        survey.legs = vec![
            PathElement::Move(Point3::new(0.0, 0.0, 0.0)),
            PathElement::Draw(Point3::new(1.0, 0.0, 0.0)),
            PathElement::Draw(Point3::new(2.0, 0.0, 0.0)),
            PathElement::Stop,
            // pen-less draw is ignored
            PathElement::Draw(Point3::new(9.0, 9.0, 0.0)),
            PathElement::Move(Point3::new(5.0, 0.0, 0.0)),
            PathElement::Draw(Point3::new(6.0, 0.0, 0.0)),
            PathElement::Stop,
        ];
        let dataset = Dataset::from_surveys(vec![survey]);
        let mut cache = SegmentCache::new(100);
        let report = cache.rebuild(&dataset, &plan_projection(), Layers::default());
        assert_eq!(report.retained, 3);

        let all: Vec<_> = cache
            .groups()
            .iter()
            .flat_map(|g| g.segments().iter().copied())
            .collect();
        assert!(all.iter().any(|s| (s.x1, s.x2) == (1, 2)));
        assert!(all.iter().any(|s| (s.x1, s.x2) == (5, 6)));
        assert!(!all.iter().any(|s| s.x2 == 9));
    }

    #[test]
    fn test_surface_legs_use_surface_band() {
        let mut survey = Survey::new("surface");
        survey.legs = leg((0.0, 0.0, -100.0), (1.0, 0.0, -100.0)).to_vec();
        survey.surface = leg((0.0, 0.0, 100.0), (1.0, 0.0, -100.0)).to_vec();
        let dataset = Dataset::from_surveys(vec![survey]);

        let mut cache = SegmentCache::new(100);
        cache.rebuild(
            &dataset,
            &plan_projection(),
            Layers {
                legs: true,
                surface: true,
            },
        );
        let surface = &cache.groups()[SURFACE_BAND];
        assert_eq!(surface.len(), 1);
        assert_eq!(surface.segments()[0].depth_band, SURFACE_BAND);
        assert_eq!(cache.groups()[NUM_DEPTH_BANDS - 1].len(), 1);
    }

    #[test]
    fn test_hidden_layers_are_skipped() {
        let mut survey = Survey::new("layers");
        survey.legs = leg((0.0, 0.0, 0.0), (1.0, 0.0, 0.0)).to_vec();
        survey.surface = leg((0.0, 0.0, 0.0), (1.0, 0.0, 0.0)).to_vec();
        let dataset = Dataset::from_surveys(vec![survey]);

        let mut cache = SegmentCache::new(100);
        let layers = Layers {
            legs: false,
            surface: false,
        };
        assert_eq!(cache.rebuild(&dataset, &plan_projection(), layers).retained, 0);
    }

    #[test]
    fn test_overflow_keeps_capacity_and_reports_once() {
        let mut survey = Survey::new("big");
        for i in 0..25 {
            survey
                .legs
                .extend(leg((i as f64, 0.0, 0.0), (i as f64, 1.0, 0.0)));
        }
        let dataset = Dataset::from_surveys(vec![survey]);

        let mut cache = SegmentCache::new(10);
        let report = cache
            .rebuild(&dataset, &plan_projection(), Layers::default())
            .clone();
        assert_eq!(report.retained, 10);
        assert_eq!(report.overflows, vec![Overflow { band: 0, dropped: 15 }]);
        assert_eq!(cache.segment_count(), 10);

        // a second rebuild reports afresh rather than accumulating
        let again = cache.rebuild(&dataset, &plan_projection(), Layers::default());
        assert_eq!(again.overflows.len(), 1);
        assert_eq!(again.dropped(), 15);
    }
}
