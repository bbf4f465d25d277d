/// Caverot Terminal Viewer
///
/// Loads one or more survey files and rotates them in the terminal.
/// Controls:
///   - Enter / Space: Start / stop rotation
///   - z / x: Faster / slower, r: reverse, c / v: single step
///   - [ ]: Zoom, ' /: Higher / lower viewpoint, p / l: Plan / elevation
///   - Arrows: Pan (Ctrl+arrows rotate and tilt)
///   - Ctrl+N / Ctrl+X / Ctrl+L / Ctrl+F: Names, crosses, legs, surface
///   - b / k / i: Scale bar, compass, clinometer; Ctrl+D: Colour by depth
///   - m / g: Metric or imperial, degrees or grads; Ctrl+R: Reverse controls
///   - Delete: Defaults, Q/ESC: Quit
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Mutex;
use std::time::Duration;

use caverot_core::{load_survey, Dataset, Surface, View};
use caverot_terminal::{AsciiSurface, ConfigError, Preferences, TerminalApp};
use clap::Parser;
use thiserror::Error;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "caverot-terminal", version, about = "Rotate cave surveys in a terminal")]
struct Args {
    /// Survey files to load
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Preferences file (defaults to ./caverot.json when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write logs here; the terminal itself is busy drawing
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Render one frame as plain text to stdout and exit
    #[arg(long)]
    snapshot: bool,

    /// Snapshot width in columns
    #[arg(long, default_value_t = 80)]
    width: u16,

    /// Snapshot height in rows
    #[arg(long, default_value_t = 24)]
    height: u16,

    /// Initial bearing in degrees
    #[arg(long, allow_negative_numbers = true)]
    bearing: Option<f64>,

    /// Initial inclination in degrees (90 is plan, 0 is elevation)
    #[arg(long, allow_negative_numbers = true)]
    inclination: Option<f64>,

    /// Show station names
    #[arg(long)]
    labels: bool,

    /// Show station crosses
    #[arg(long)]
    crosses: bool,

    /// Show surface legs
    #[arg(long)]
    surface: bool,
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("{}: {source}", path.display())]
    LogFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("no survey could be loaded")]
    NoSurveys,

    #[error(transparent)]
    Terminal(#[from] io::Error),
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), CliError> {
    if let Some(path) = &args.log_file {
        init_logging(path)?;
    }

    let preferences = Preferences::resolve(args.config.as_deref())?;
    let dataset = load_dataset(&args.files)?;

    let (columns, rows) = if args.snapshot {
        (args.width, args.height)
    } else {
        crossterm::terminal::size()?
    };
    let surface = AsciiSurface::new(columns as usize, rows as usize);

    let mut view = View::with_dataset(preferences.engine.clone(), dataset, surface.size());
    view.set_units(preferences.units);
    view.set_angles(preferences.angles);
    view.set_reverse_controls(preferences.reverse_controls);
    apply_args(&mut view, &args);

    if args.snapshot {
        snapshot(view, surface);
        return Ok(());
    }

    let mut app = TerminalApp::new(view)?;
    app.run()?;
    Ok(())
}

fn init_logging(path: &Path) -> Result<(), CliError> {
    let file = File::create(path).map_err(|source| CliError::LogFile {
        path: path.to_path_buf(),
        source,
    })?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "caverot_core=info,caverot_terminal=info".into()),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

/// Load every file that can be loaded, reporting the ones that cannot.
fn load_dataset(files: &[PathBuf]) -> Result<Dataset, CliError> {
    let mut dataset = Dataset::new();
    for path in files {
        match load_survey(path) {
            Ok(survey) => dataset.add_survey(survey),
            Err(err) => {
                warn!(%err, "survey not loaded");
                eprintln!("error: {err}");
            }
        }
    }
    if dataset.is_empty() {
        return Err(CliError::NoSurveys);
    }
    info!(surveys = dataset.surveys().len(), "dataset ready");
    Ok(dataset)
}

fn apply_args(view: &mut View, args: &Args) {
    if let Some(bearing) = args.bearing {
        view.set_bearing(bearing);
    }
    if let Some(inclination) = args.inclination {
        view.set_inclination(inclination);
    }
    if args.labels {
        view.toggle_labels();
    }
    if args.crosses {
        view.toggle_crosses();
    }
    if args.surface {
        view.toggle_surface_legs();
    }
}

fn snapshot(mut view: View, mut surface: AsciiSurface) {
    view.request_frame(&mut surface, Duration::ZERO);
    print!("{}", surface.to_plain_text());
}
