//! Braille rasterizer implementing the widget drawing surface.
//!
//! Curves are plotted onto a dot grid at 2x4 dots per terminal cell and
//! blitted into the ratatui buffer as braille characters; text renders
//! into whole cells. All geometry the widget core emits is in dot units
//! with the origin at the surface's top-left cell.

use ratatui::{buffer::Buffer, layout::Rect, style::Color, style::Modifier};

use crate::surface::{RectF, Surface, TextStyle};

/// Braille dot bit for a `(x, y)` dot within one cell, per the Unicode
/// braille block layout.
const DOT_BITS: [[u8; 2]; 4] = [
    [0x01, 0x08],
    [0x02, 0x10],
    [0x04, 0x20],
    [0x40, 0x80],
];

const BRAILLE_BASE: u32 = 0x2800;

/// Alpha below which text is not drawn at all; between the two it dims.
const TEXT_ALPHA_SKIP: u8 = 32;
const TEXT_ALPHA_DIM: u8 = 160;

/// 2D affine transform, row-major `[[a, b, tx], [c, d, ty]]`.
#[derive(Debug, Clone, Copy)]
struct Transform {
    m: [[f32; 3]; 2],
}

impl Transform {
    fn identity() -> Self {
        Self {
            m: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
        }
    }

    fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        (
            self.m[0][0] * x + self.m[0][1] * y + self.m[0][2],
            self.m[1][0] * x + self.m[1][1] * y + self.m[1][2],
        )
    }

    /// `self` applied after `other` (other runs first).
    fn compose(&self, other: &Transform) -> Self {
        let a = &self.m;
        let b = &other.m;
        Self {
            m: [
                [
                    a[0][0] * b[0][0] + a[0][1] * b[1][0],
                    a[0][0] * b[0][1] + a[0][1] * b[1][1],
                    a[0][0] * b[0][2] + a[0][1] * b[1][2] + a[0][2],
                ],
                [
                    a[1][0] * b[0][0] + a[1][1] * b[1][0],
                    a[1][0] * b[0][1] + a[1][1] * b[1][1],
                    a[1][0] * b[0][2] + a[1][1] * b[1][2] + a[1][2],
                ],
            ],
        }
    }

    /// Clockwise rotation (y axis points down) around `(cx, cy)`.
    fn rotation_about(degrees: f32, cx: f32, cy: f32) -> Self {
        let rad = degrees.to_radians();
        let (sin, cos) = rad.sin_cos();
        Self {
            m: [
                [cos, -sin, cx - cx * cos + cy * sin],
                [sin, cos, cy - cx * sin - cy * cos],
            ],
        }
    }

    fn translation(dx: f32, dy: f32) -> Self {
        Self {
            m: [[1.0, 0.0, dx], [0.0, 1.0, dy]],
        }
    }
}

struct TextRun {
    text: String,
    cx: f32,
    cy: f32,
    color: Color,
    alpha: u8,
}

/// One frame's drawing surface over a rectangular buffer region.
pub struct BrailleSurface {
    area: Rect,
    grid: Vec<u8>,
    colors: Vec<Option<Color>>,
    texts: Vec<TextRun>,
    stack: Vec<Transform>,
}

impl BrailleSurface {
    pub fn new(area: Rect) -> Self {
        let cells = area.width as usize * area.height as usize;
        Self {
            area,
            grid: vec![0; cells],
            colors: vec![None; cells],
            texts: Vec::new(),
            stack: vec![Transform::identity()],
        }
    }

    fn transform(&self) -> &Transform {
        self.stack.last().expect("transform stack never empties")
    }

    fn transform_mut(&mut self) -> &mut Transform {
        self.stack.last_mut().expect("transform stack never empties")
    }

    /// Set one dot in device space.
    fn plot(&mut self, x: f32, y: f32, color: Color) {
        if x < 0.0 || y < 0.0 {
            return;
        }
        let (dx, dy) = (x.floor() as usize, y.floor() as usize);
        let (col, row) = (dx / 2, dy / 4);
        if col >= self.area.width as usize || row >= self.area.height as usize {
            return;
        }
        let index = row * self.area.width as usize + col;
        self.grid[index] |= DOT_BITS[dy % 4][dx % 2];
        self.colors[index] = Some(color);
    }

    /// Stamp a filled disk at a logical-space center. The transforms used
    /// here are rigid (translate/rotate), so the disk stays a disk.
    fn stamp_disk(&mut self, cx: f32, cy: f32, radius: f32, color: Color) {
        let (cx, cy) = self.transform().apply(cx, cy);
        if radius <= 0.5 {
            self.plot(cx, cy, color);
            return;
        }
        let r2 = radius * radius;
        let mut y = (cy - radius).floor();
        while y <= cy + radius {
            let mut x = (cx - radius).floor();
            while x <= cx + radius {
                let (ox, oy) = (x + 0.5 - cx, y + 0.5 - cy);
                if ox * ox + oy * oy <= r2 {
                    self.plot(x, y, color);
                }
                x += 1.0;
            }
            y += 1.0;
        }
    }

    /// Blit the accumulated dots and text into the buffer.
    pub fn flush(&self, buf: &mut Buffer) {
        for row in 0..self.area.height {
            for col in 0..self.area.width {
                let index = row as usize * self.area.width as usize + col as usize;
                let mask = self.grid[index];
                if mask == 0 {
                    continue;
                }
                let x = self.area.x + col;
                let y = self.area.y + row;
                if x >= buf.area().width || y >= buf.area().height {
                    continue;
                }
                let glyph = char::from_u32(BRAILLE_BASE + u32::from(mask)).unwrap_or(' ');
                buf[(x, y)].set_char(glyph);
                if let Some(color) = self.colors[index] {
                    buf[(x, y)].set_fg(color);
                }
            }
        }

        for run in &self.texts {
            if run.alpha < TEXT_ALPHA_SKIP {
                continue;
            }
            let chars = run.text.chars().count() as f32;
            let col_start = (run.cx / 2.0 - chars / 2.0).round() as i32;
            let row = (run.cy / 4.0 - 0.5).round() as i32;
            if row < 0 || row >= i32::from(self.area.height) {
                continue;
            }
            let y = self.area.y + row as u16;
            for (i, c) in run.text.chars().enumerate() {
                let col = col_start + i as i32;
                if col < 0 || col >= i32::from(self.area.width) {
                    continue;
                }
                let x = self.area.x + col as u16;
                if x >= buf.area().width || y >= buf.area().height {
                    continue;
                }
                buf[(x, y)].set_char(c);
                buf[(x, y)].set_fg(run.color);
                if run.alpha < TEXT_ALPHA_DIM {
                    buf[(x, y)].set_style(
                        ratatui::style::Style::default()
                            .fg(run.color)
                            .add_modifier(Modifier::DIM),
                    );
                }
            }
        }
    }
}

impl Surface for BrailleSurface {
    fn save(&mut self) {
        let top = *self.transform();
        self.stack.push(top);
    }

    fn restore(&mut self) {
        if self.stack.len() > 1 {
            self.stack.pop();
        }
    }

    fn translate(&mut self, dx: f32, dy: f32) {
        let composed = self.transform().compose(&Transform::translation(dx, dy));
        *self.transform_mut() = composed;
    }

    fn rotate(&mut self, degrees: f32, cx: f32, cy: f32) {
        let composed = self
            .transform()
            .compose(&Transform::rotation_about(degrees, cx, cy));
        *self.transform_mut() = composed;
    }

    fn stroke_arc(
        &mut self,
        rect: RectF,
        start_angle: f32,
        sweep_angle: f32,
        stroke_width: f32,
        color: Color,
    ) {
        let rx = rect.width() / 2.0;
        let ry = rect.height() / 2.0;
        if rx <= 0.0 || ry <= 0.0 || sweep_angle <= 0.0 {
            return;
        }
        let (cx, cy) = (rect.center_x(), rect.center_y());

        // Two samples per dot of arc length keeps the stroke solid.
        let arc_length = sweep_angle.to_radians() * rx.max(ry);
        let steps = ((arc_length * 2.0).ceil() as usize).clamp(2, 720);
        for i in 0..=steps {
            let angle =
                (start_angle + sweep_angle * i as f32 / steps as f32).to_radians();
            let x = cx + rx * angle.cos();
            let y = cy + ry * angle.sin();
            // Round caps come out of stamping disks along the path.
            self.stamp_disk(x, y, stroke_width / 2.0, color);
        }
    }

    fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, color: Color) {
        if radius <= 0.0 {
            return;
        }
        self.stamp_disk(cx, cy, radius, color);
    }

    fn draw_text(&mut self, text: &str, cx: f32, cy: f32, style: &TextStyle) {
        // Terminal cells cannot scale glyphs; the fade rides on alpha.
        let (cx, cy) = self.transform().apply(cx, cy);
        self.texts.push(TextRun {
            text: text.to_string(),
            cx,
            cy,
            color: style.color,
            alpha: style.alpha,
        });
    }

    fn measure_text(&self, text: &str, _size: f32) -> (f32, f32) {
        (text.chars().count() as f32 * 2.0, 4.0)
    }
}
