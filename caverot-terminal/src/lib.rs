/// Terminal front end for the caverot survey viewer
use crossterm::{
    cursor,
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal,
};
use std::io::{self, stdout, Write};
use std::time::{Duration, Instant};
use caverot_core::View;
use tracing::{debug, info};

pub mod config;
pub mod input;
pub mod renderer;

pub use config::{ConfigError, Preferences};
pub use input::{Bindings, Control};
pub use renderer::AsciiSurface;

const HELP: &str =
    "Enter/Space=Rotate z/x=Speed []=Zoom '/=Tilt arrows=Pan ^N=Names b/k/i=Overlays ^D=Depth q=Quit";

/// Interactive viewer running in the alternate screen
pub struct TerminalApp {
    view: View,
    surface: AsciiSurface,
    bindings: Bindings,
    running: bool,
    epoch: Instant,
    last_frame: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    pub fn new(view: View) -> io::Result<Self> {
        let (columns, rows) = terminal::size()?;
        let now = Instant::now();

        Ok(Self {
            view,
            surface: AsciiSurface::new(columns as usize, rows as usize),
            bindings: Bindings::new(),
            running: true,
            epoch: now,
            last_frame: now,
            frame_count: 0,
            fps: 0.0,
        })
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            stdout(),
            terminal::EnterAlternateScreen,
            cursor::Hide,
            EnableMouseCapture
        )?;

        let result = self.main_loop();

        // Cleanup
        terminal::disable_raw_mode()?;
        execute!(
            stdout(),
            DisableMouseCapture,
            terminal::LeaveAlternateScreen,
            cursor::Show
        )?;

        result
    }

    fn main_loop(&mut self) -> io::Result<()> {
        let target_frame_time = Duration::from_millis(1000 / 30); // 30 FPS target
        info!("terminal viewer started");

        while self.running {
            let frame_start = Instant::now();

            // Handle every pending event before drawing
            while event::poll(Duration::from_millis(0))? {
                self.handle_event(event::read()?);
            }

            // Render
            self.render()?;

            // Frame timing
            let elapsed = frame_start.elapsed();
            if elapsed < target_frame_time {
                std::thread::sleep(target_frame_time - elapsed);
            }

            // Update FPS counter
            let now = Instant::now();
            if (now - self.last_frame).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_frame).as_secs_f32();
                self.frame_count = 0;
                self.last_frame = now;
            }
        }

        info!("terminal viewer stopped");
        Ok(())
    }

    fn handle_event(&mut self, event: Event) {
        let now = self.epoch.elapsed();
        match event {
            Event::Key(key) if key.kind != KeyEventKind::Release => {
                if self.bindings.handle_key(&mut self.view, key, now) == Control::Quit {
                    self.running = false;
                }
            }
            Event::Mouse(mouse) => self.bindings.handle_mouse(&mut self.view, mouse),
            Event::Resize(columns, rows) => {
                debug!(columns, rows, "terminal resized");
                self.surface.resize(columns as usize, rows as usize);
            }
            _ => {}
        }
    }

    fn render(&mut self) -> io::Result<()> {
        let outcome = self.view.request_frame(&mut self.surface, self.epoch.elapsed());
        if !outcome.drew() {
            return Ok(());
        }
        self.frame_count += 1;

        // Output to terminal
        let mut stdout = stdout();
        self.surface.draw(&mut stdout)?;

        // Draw UI overlay on the bottom row
        let rows = self.surface.rows() as u16;
        if rows > 1 {
            queue!(
                stdout,
                cursor::MoveTo(0, rows - 1),
                SetForegroundColor(Color::Yellow),
                Print(
                    format!("FPS: {:.1} | {}", self.fps, HELP)
                        .chars()
                        .take(self.surface.columns())
                        .collect::<String>()
                ),
                ResetColor
            )?;
        }

        stdout.flush()?;
        Ok(())
    }
}
