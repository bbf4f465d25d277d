//! Line-oriented survey text format.
//!
//! ```text
//! # comment
//! title Ogof Example
//! date 1998.07.12
//! legs
//! move 0 0 0
//! draw 10 0 -2.5
//! stop
//! surface
//! move 0 0 0
//! draw 0 20 4
//! station entrance 0 0 0
//! ```
//!
//! `legs` and `surface` choose the stream that receives `move`/`draw`/`stop`;
//! `legs` is current at the start. An open polyline is ended implicitly at a
//! section switch and at the end of the file.

use std::fs;
use std::path::Path;

use nalgebra::Point3;
use nom::{
    bytes::complete::take_till1,
    character::complete::{alpha1, space0, space1},
    combinator::all_consuming,
    number::complete::double,
    sequence::{preceded, terminated, tuple},
    IResult,
};
use tracing::info;

use crate::error::{LoadError, Result};
use crate::geometry::{PathElement, Point3D, StationLabel, Survey};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Legs,
    Surface,
}

#[derive(Debug, Clone, PartialEq)]
enum Directive<'a> {
    Title(&'a str),
    Date(&'a str),
    Section(Section),
    Move(Point3D),
    Draw(Point3D),
    Stop,
    Station(&'a str, Point3D),
}

/// Read and parse a survey file. The survey is named after the file stem.
pub fn load_survey(path: impl AsRef<Path>) -> Result<Survey> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let survey = parse_survey(path, &text)?;
    info!(
        path = %path.display(),
        legs = survey.leg_count(),
        stations = survey.stations.len(),
        "survey loaded"
    );
    Ok(survey)
}

/// Parse survey text; `path` names the survey and is quoted in errors.
pub fn parse_survey(path: &Path, text: &str) -> Result<Survey> {
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut builder = Builder::new(Survey::new(name));

    for (index, line) in text.lines().enumerate() {
        let line_no = index + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let directive = parse_line(trimmed).map_err(|message| LoadError::Parse {
            path: path.to_path_buf(),
            line: line_no,
            message,
        })?;
        builder
            .apply(directive)
            .map_err(|message| LoadError::InvalidPath {
                path: path.to_path_buf(),
                line: line_no,
                message,
            })?;
    }

    Ok(builder.finish())
}

/// Accumulates directives into a survey, tracking the pen of each stream.
struct Builder {
    survey: Survey,
    section: Section,
    pen_down: bool,
}

impl Builder {
    fn new(survey: Survey) -> Self {
        Self {
            survey,
            section: Section::Legs,
            pen_down: false,
        }
    }

    fn stream(&mut self) -> &mut Vec<PathElement> {
        match self.section {
            Section::Legs => &mut self.survey.legs,
            Section::Surface => &mut self.survey.surface,
        }
    }

    fn lift_pen(&mut self) {
        if self.pen_down {
            self.stream().push(PathElement::Stop);
            self.pen_down = false;
        }
    }

    fn apply(&mut self, directive: Directive<'_>) -> std::result::Result<(), String> {
        match directive {
            Directive::Title(text) => self.survey.title = Some(text.to_string()),
            Directive::Date(text) => self.survey.date = Some(text.to_string()),
            Directive::Section(section) => {
                self.lift_pen();
                self.section = section;
            }
            Directive::Move(p) => {
                self.stream().push(PathElement::Move(p));
                self.pen_down = true;
            }
            Directive::Draw(p) => {
                if !self.pen_down {
                    return Err("draw without a preceding move".to_string());
                }
                self.stream().push(PathElement::Draw(p));
            }
            Directive::Stop => self.lift_pen(),
            Directive::Station(name, p) => self.survey.stations.push(StationLabel {
                position: p,
                name: name.to_string(),
            }),
        }
        Ok(())
    }

    fn finish(mut self) -> Survey {
        self.lift_pen();
        self.survey
    }
}

fn parse_line(line: &str) -> std::result::Result<Directive<'_>, String> {
    let (rest, keyword) =
        alpha1::<_, nom::error::Error<&str>>(line).map_err(|_| format!("unexpected `{line}`"))?;

    match keyword {
        "title" | "date" => {
            let text = rest.trim();
            if text.is_empty() || !rest.starts_with(char::is_whitespace) {
                return Err(format!("{keyword} needs some text"));
            }
            Ok(if keyword == "title" {
                Directive::Title(text)
            } else {
                Directive::Date(text)
            })
        }
        "legs" | "surface" | "stop" => {
            if !rest.trim().is_empty() {
                return Err(format!("unexpected text after {keyword}"));
            }
            Ok(match keyword {
                "legs" => Directive::Section(Section::Legs),
                "surface" => Directive::Section(Section::Surface),
                _ => Directive::Stop,
            })
        }
        "move" | "draw" => {
            let (_, p) = all_consuming(terminated(coords, space0))(rest)
                .map_err(|_| format!("{keyword} needs three coordinates"))?;
            let p = finite(p)?;
            Ok(if keyword == "move" {
                Directive::Move(p)
            } else {
                Directive::Draw(p)
            })
        }
        "station" => {
            let (_, (name, p)) = all_consuming(terminated(station, space0))(rest)
                .map_err(|_| "station needs a name and three coordinates".to_string())?;
            Ok(Directive::Station(name, finite(p)?))
        }
        other => Err(format!("unknown directive `{other}`")),
    }
}

fn coords(input: &str) -> IResult<&str, Point3D> {
    let (input, (x, y, z)) = tuple((
        preceded(space1, double),
        preceded(space1, double),
        preceded(space1, double),
    ))(input)?;
    Ok((input, Point3::new(x, y, z)))
}

fn station(input: &str) -> IResult<&str, (&str, Point3D)> {
    tuple((
        preceded(space1, take_till1(|c: char| c.is_whitespace())),
        coords,
    ))(input)
}

fn finite(p: Point3D) -> std::result::Result<Point3D, String> {
    if p.iter().all(|v| v.is_finite()) {
        Ok(p)
    } else {
        Err("coordinates must be finite".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
# a small cave
title Ogof Fach
date 2001.05.04

move 0 0 0
draw 10 0 -2.5
draw 10 5 -3
move 20 0 0
draw 21 0 0
surface
move 0 0 0
draw 0 20 4
station entrance 0 0 0
station sump.1 10 5 -3
";

    fn parse(text: &str) -> Result<Survey> {
        parse_survey(Path::new("caves/fach.txt"), text)
    }

    #[test]
    fn test_parse_sample() {
        let survey = parse(SAMPLE).unwrap();
        assert_eq!(survey.name, "fach");
        assert_eq!(survey.title.as_deref(), Some("Ogof Fach"));
        assert_eq!(survey.date.as_deref(), Some("2001.05.04"));
        assert_eq!(
            survey.legs,
            vec![
                PathElement::Move(Point3::new(0.0, 0.0, 0.0)),
                PathElement::Draw(Point3::new(10.0, 0.0, -2.5)),
                PathElement::Draw(Point3::new(10.0, 5.0, -3.0)),
                PathElement::Move(Point3::new(20.0, 0.0, 0.0)),
                PathElement::Draw(Point3::new(21.0, 0.0, 0.0)),
                PathElement::Stop,
            ]
        );
        assert_eq!(survey.surface.len(), 3);
        assert_eq!(survey.surface.last(), Some(&PathElement::Stop));
        assert_eq!(survey.stations[1].name, "sump.1");
    }

    #[test]
    fn test_malformed_line_reports_file_and_line() {
        let err = parse("move 0 0 0\ndraw 1 two 3\n").unwrap_err();
        match &err {
            LoadError::Parse { line, message, .. } => {
                assert_eq!(*line, 2);
                assert!(message.contains("draw"));
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert_eq!(err.to_string(), "caves/fach.txt:2: draw needs three coordinates");
    }

    #[test]
    fn test_draw_without_move_rejected() {
        let err = parse("move 0 0 0\nstop\ndraw 1 1 1\n").unwrap_err();
        assert!(matches!(err, LoadError::InvalidPath { line: 3, .. }));
    }

    #[test]
    fn test_section_switch_lifts_pen() {
        let err = parse("move 0 0 0\nsurface\ndraw 1 1 1\n").unwrap_err();
        assert!(matches!(err, LoadError::InvalidPath { line: 3, .. }));
    }

    #[test]
    fn test_rejects_unknown_and_non_finite() {
        assert!(matches!(
            parse("fly 1 2 3").unwrap_err(),
            LoadError::Parse { line: 1, .. }
        ));
        assert!(parse("move nan 0 0").is_err());
        assert!(parse("station 1 2 3").is_err());
        assert!(parse("stop now").is_err());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_survey("/definitely/not/here.txt").unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
        assert_eq!(err.path(), Path::new("/definitely/not/here.txt"));
    }
}
