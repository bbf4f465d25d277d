/// ASCII drawing surface for terminal rendering
use caverot_core::{Ink, Rgb, Segment2D, Surface, TextMetrics};
use crossterm::{
    cursor,
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use std::io::Write;

/// Vertical screen units per character cell. Cells are roughly twice as
/// tall as they are wide, so each row holds two units and the picture keeps
/// its aspect ratio.
const UNITS_PER_ROW: i32 = 2;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Cell {
    ch: char,
    color: Option<Color>,
}

const BLANK: Cell = Cell {
    ch: ' ',
    color: None,
};

/// Surface that rasterizes lines into a character grid. Drawing goes to a
/// back buffer; `present` copies it to the front buffer that `draw` writes.
pub struct AsciiSurface {
    width: usize,
    height: usize,
    back: Vec<Cell>,
    front: Vec<Cell>,
}

impl AsciiSurface {
    /// A surface covering `columns` x `rows` character cells.
    pub fn new(columns: usize, rows: usize) -> Self {
        let size = columns * rows;
        Self {
            width: columns,
            height: rows,
            back: vec![BLANK; size],
            front: vec![BLANK; size],
        }
    }

    pub fn columns(&self) -> usize {
        self.width
    }

    pub fn rows(&self) -> usize {
        self.height
    }

    pub fn resize(&mut self, columns: usize, rows: usize) {
        *self = Self::new(columns, rows);
    }

    fn put(&mut self, x: i64, y: i64, ch: char, color: Option<Color>) {
        let row = y.div_euclid(UNITS_PER_ROW as i64);
        if x < 0 || row < 0 || x as usize >= self.width || row as usize >= self.height {
            return;
        }
        self.back[row as usize * self.width + x as usize] = Cell { ch, color };
    }

    fn line(&mut self, from: (i32, i32), to: (i32, i32), color: Option<Color>) {
        let from = (from.0 as i64, from.1 as i64);
        let to = (to.0 as i64, to.1 as i64);
        let ch = slope_char(to.0 - from.0, to.1 - from.1);

        let bottom = (self.height as i64 * UNITS_PER_ROW as i64) - 1;
        let Some(((x0, y0), (x1, y1))) = clip_line(from, to, (self.width as i64 - 1, bottom))
        else {
            return;
        };

        // Bresenham's line algorithm
        let (mut x, mut y) = (x0, y0);
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;

        for _ in 0..=(dx - dy) {
            self.put(x, y, ch, color);
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// Write the presented frame to a terminal.
    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        let mut current = None;
        for (row, cells) in self.front.chunks(self.width.max(1)).enumerate() {
            writer.queue(cursor::MoveTo(0, row as u16))?;
            for cell in cells {
                if cell.color != current {
                    match cell.color {
                        Some(color) => writer.queue(SetForegroundColor(color))?,
                        None => writer.queue(ResetColor)?,
                    };
                    current = cell.color;
                }
                writer.queue(Print(cell.ch))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }

    /// The presented frame as plain text, trailing blanks trimmed.
    pub fn to_plain_text(&self) -> String {
        let mut text = String::with_capacity(self.front.len() + self.height);
        for cells in self.front.chunks(self.width.max(1)) {
            let line: String = cells.iter().map(|c| c.ch).collect();
            text.push_str(line.trim_end());
            text.push('\n');
        }
        text
    }
}

impl TextMetrics for AsciiSurface {
    fn text_width(&self, text: &str) -> i32 {
        text.chars().count() as i32
    }

    fn text_height(&self) -> i32 {
        UNITS_PER_ROW
    }
}

impl Surface for AsciiSurface {
    fn size(&self) -> (u32, u32) {
        (self.width as u32, (self.height as i32 * UNITS_PER_ROW) as u32)
    }

    fn clear(&mut self) {
        self.back.fill(BLANK);
    }

    fn draw_segments(&mut self, (r, g, b): Rgb, segments: &[Segment2D]) {
        let color = Some(Color::Rgb { r, g, b });
        for s in segments {
            self.line((s.x1, s.y1), (s.x2, s.y2), color);
        }
    }

    fn draw_line(&mut self, from: (i32, i32), to: (i32, i32), ink: Ink) {
        self.line(from, to, Some(ink_color(ink)));
    }

    fn draw_text(&mut self, x: i32, y: i32, text: &str, ink: Ink) {
        let color = Some(ink_color(ink));
        for (i, ch) in text.chars().enumerate() {
            self.put(x as i64 + i as i64, y as i64, ch, color);
        }
    }

    fn present(&mut self) {
        self.front.copy_from_slice(&self.back);
    }
}

fn ink_color(ink: Ink) -> Color {
    match ink {
        Ink::Cross => Color::White,
        Ink::Label => Color::Grey,
        Ink::Indicator => Color::DarkCyan,
        Ink::Status => Color::Yellow,
    }
}

/// Clip a line to the rectangle from the origin to `max` inclusive
/// (Liang-Barsky), so only the visible part is rasterized however far off
/// screen its ends are.
fn clip_line(
    from: (i64, i64),
    to: (i64, i64),
    max: (i64, i64),
) -> Option<((i64, i64), (i64, i64))> {
    if max.0 < 0 || max.1 < 0 {
        return None;
    }
    let (x0, y0) = (from.0 as f64, from.1 as f64);
    let (dx, dy) = (to.0 as f64 - x0, to.1 as f64 - y0);
    let (mut t0, mut t1) = (0.0_f64, 1.0_f64);

    let edges = [
        (-dx, x0),
        (dx, max.0 as f64 - x0),
        (-dy, y0),
        (dy, max.1 as f64 - y0),
    ];
    for (p, q) in edges {
        if p == 0.0 {
            // parallel to this edge and outside it
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }

    let at = |t: f64| ((x0 + t * dx).round() as i64, (y0 + t * dy).round() as i64);
    Some((at(t0), at(t1)))
}

/// Pick the character that best follows a line, with y pointing down and
/// rows twice as tall as columns are wide.
fn slope_char(dx: i64, dy: i64) -> char {
    let across = dx.abs() * UNITS_PER_ROW as i64;
    let down = dy.abs();
    if down * 2 < across {
        '-'
    } else if across * 2 < down {
        '|'
    } else if (dx > 0) == (dy > 0) {
        '\\'
    } else {
        '/'
    }
}
