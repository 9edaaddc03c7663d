// Drawing-surface capability used by the map renderer.

use serde::Serialize;

/// Width and height of one glyph cell at scale 1.
pub const GLYPH_SIZE: f64 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CircleStyle {
    Filled,
    /// Outline with the given stroke width in pixels.
    Stroked(u32),
}

/// Primitive drawing operations in canvas pixels, origin top-left.
pub trait Surface {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: Color);
    fn line(&mut self, from: (f64, f64), to: (f64, f64), color: Color);
    fn circle(&mut self, center: (f64, f64), radius: f64, style: CircleStyle, color: Color);
    /// Draw text with its top-left corner at `at`.
    fn text(&mut self, at: (f64, f64), text: &str, color: Color);
    fn text_scale(&self) -> u32;

    fn text_width(&self, text: &str) -> f64 {
        text.chars().count() as f64 * GLYPH_SIZE * self.text_scale() as f64
    }

    fn text_height(&self) -> f64 {
        GLYPH_SIZE * self.text_scale() as f64
    }

    fn fill(&mut self, color: Color) {
        let (w, h) = (self.width() as f64, self.height() as f64);
        self.fill_rect(0.0, 0.0, w, h, color);
    }
}

/// A recorded draw operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DrawCall {
    Rect {
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        color: Color,
    },
    Line {
        from: (f64, f64),
        to: (f64, f64),
        color: Color,
    },
    Circle {
        center: (f64, f64),
        radius: f64,
        style: CircleStyle,
        color: Color,
    },
    Text {
        at: (f64, f64),
        text: String,
        color: Color,
    },
}

/// Surface that records calls instead of rasterising, for layout assertions.
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    width: u32,
    height: u32,
    pub calls: Vec<DrawCall>,
}

impl RecordingSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            calls: Vec::new(),
        }
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.calls.iter().filter_map(|c| match c {
            DrawCall::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn circles_with(&self, wanted: CircleStyle, color: Color) -> usize {
        self.calls
            .iter()
            .filter(|c| {
                matches!(c, DrawCall::Circle { style, color: c_color, .. }
                    if *style == wanted && *c_color == color)
            })
            .count()
    }
}

impl Surface for RecordingSurface {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: Color) {
        self.calls.push(DrawCall::Rect { x, y, w, h, color });
    }

    fn line(&mut self, from: (f64, f64), to: (f64, f64), color: Color) {
        self.calls.push(DrawCall::Line { from, to, color });
    }

    fn circle(&mut self, center: (f64, f64), radius: f64, style: CircleStyle, color: Color) {
        self.calls.push(DrawCall::Circle {
            center,
            radius,
            style,
            color,
        });
    }

    fn text(&mut self, at: (f64, f64), text: &str, color: Color) {
        self.calls.push(DrawCall::Text {
            at,
            text: text.to_string(),
            color,
        });
    }

    fn text_scale(&self) -> u32 {
        1
    }
}
