/// Survey data model: pen-plotter style paths, stations and dataset extents
use nalgebra::{Point3, Vector3};

/// A survey coordinate in metres (x east, y north, z up).
pub type Point3D = Point3<f64>;

/// One pen command in a leg stream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathElement {
    /// Lift the pen and put it down at a new position.
    Move(Point3D),
    /// Draw a segment from the pen position to this point.
    Draw(Point3D),
    /// End of the current polyline; the pen is lifted.
    Stop,
}

impl PathElement {
    pub fn point(&self) -> Option<&Point3D> {
        match self {
            PathElement::Move(p) | PathElement::Draw(p) => Some(p),
            PathElement::Stop => None,
        }
    }
}

/// A named, positioned survey point.
#[derive(Debug, Clone, PartialEq)]
pub struct StationLabel {
    pub position: Point3D,
    pub name: String,
}

impl StationLabel {
    pub fn new(name: impl Into<String>, x: f64, y: f64, z: f64) -> Self {
        Self {
            position: Point3::new(x, y, z),
            name: name.into(),
        }
    }
}

/// Everything loaded from one survey file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Survey {
    pub name: String,
    pub title: Option<String>,
    pub date: Option<String>,
    /// Underground legs.
    pub legs: Vec<PathElement>,
    /// Surface legs, drawn in a single uniform style.
    pub surface: Vec<PathElement>,
    pub stations: Vec<StationLabel>,
}

impl Survey {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Number of `Draw` elements across legs and surface legs.
    pub fn leg_count(&self) -> usize {
        self.legs
            .iter()
            .chain(&self.surface)
            .filter(|e| matches!(e, PathElement::Draw(_)))
            .count()
    }

    fn points(&self) -> impl Iterator<Item = &Point3D> {
        self.legs
            .iter()
            .chain(&self.surface)
            .filter_map(PathElement::point)
            .chain(self.stations.iter().map(|s| &s.position))
    }
}

/// Centre and half-size of the dataset bounding box
/// (`Xorg, Yorg, Zorg` and `Xrad, Yrad, Zrad`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extents {
    pub origin: Point3D,
    pub radius: Vector3<f64>,
}

impl Extents {
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point3D>) -> Self {
        let mut iter = points.into_iter();
        let Some(first) = iter.next() else {
            return Self::default();
        };

        let mut lower = *first;
        let mut upper = *first;
        for p in iter {
            lower = lower.inf(p);
            upper = upper.sup(p);
        }

        Self {
            origin: nalgebra::center(&lower, &upper),
            radius: (upper - lower) / 2.0,
        }
    }

    /// Scale (screen units per metre) at which the dataset fits a viewport
    /// from any bearing.
    pub fn fit_scale(&self, width: u32, height: u32, margin: f64) -> f64 {
        let plan_radius = self.radius.x.hypot(self.radius.y);
        let radius = plan_radius.max(self.radius.z);
        let span = width.min(height) as f64;
        if radius <= 0.0 || span <= 0.0 {
            return 1.0;
        }
        margin * span / (2.0 * radius)
    }
}

impl Default for Extents {
    fn default() -> Self {
        Self {
            origin: Point3::origin(),
            radius: Vector3::zeros(),
        }
    }
}

/// All loaded surveys plus their combined extents.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    surveys: Vec<Survey>,
    extents: Extents,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_surveys(surveys: Vec<Survey>) -> Self {
        let mut dataset = Self {
            surveys,
            extents: Extents::default(),
        };
        dataset.update_extents();
        dataset
    }

    pub fn add_survey(&mut self, survey: Survey) {
        self.surveys.push(survey);
        self.update_extents();
    }

    pub fn surveys(&self) -> &[Survey] {
        &self.surveys
    }

    pub fn extents(&self) -> &Extents {
        &self.extents
    }

    pub fn is_empty(&self) -> bool {
        self.surveys.is_empty()
    }

    pub fn stations(&self) -> impl Iterator<Item = &StationLabel> {
        self.surveys.iter().flat_map(|s| s.stations.iter())
    }

    /// Title of the first survey that has one, else the first survey's name.
    pub fn title(&self) -> Option<&str> {
        self.surveys
            .iter()
            .find_map(|s| s.title.as_deref())
            .or_else(|| self.surveys.first().map(|s| s.name.as_str()))
    }

    fn update_extents(&mut self) {
        self.extents = Extents::from_points(self.surveys.iter().flat_map(Survey::points));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_survey() -> Survey {
        let mut survey = Survey::new("sample");
        survey.legs = vec![
            PathElement::Move(Point3::new(0.0, 0.0, 0.0)),
            PathElement::Draw(Point3::new(10.0, 0.0, -4.0)),
            PathElement::Draw(Point3::new(10.0, 6.0, -4.0)),
            PathElement::Stop,
        ];
        survey.stations = vec![StationLabel::new("1", 0.0, 0.0, 0.0)];
        survey
    }

    #[test]
    fn test_extents_centre_and_radius() {
        let dataset = Dataset::from_surveys(vec![sample_survey()]);
        let extents = dataset.extents();
        assert_eq!(extents.origin, Point3::new(5.0, 3.0, -2.0));
        assert_eq!(extents.radius, Vector3::new(5.0, 3.0, 2.0));
    }

    #[test]
    fn test_add_survey_grows_extents() {
        let mut dataset = Dataset::from_surveys(vec![sample_survey()]);
        let mut other = Survey::new("other");
        other.stations.push(StationLabel::new("far", 20.0, 0.0, 0.0));
        dataset.add_survey(other);
        assert_eq!(dataset.extents().origin.x, 10.0);
        assert_eq!(dataset.extents().radius.x, 10.0);
        assert_eq!(dataset.stations().count(), 2);
    }

    #[test]
    fn test_empty_dataset_fits_at_unit_scale() {
        let dataset = Dataset::new();
        assert_eq!(dataset.extents().fit_scale(800, 600, 0.9), 1.0);
    }

    #[test]
    fn test_leg_count() {
        assert_eq!(sample_survey().leg_count(), 2);
    }
}
