// Pixel backend: rasterises draw calls onto an RGBA image and encodes PNG.

use std::io::Cursor;

use font8x8::{UnicodeFonts, BASIC_FONTS};
use image::{ImageFormat, Pixel, Rgba, RgbaImage};

use super::surface::{CircleStyle, Color, Surface, GLYPH_SIZE};
use crate::error::MapError;

pub struct PixelSurface {
    image: RgbaImage,
    text_scale: u32,
}

impl PixelSurface {
    pub fn new(width: u32, height: u32, text_scale: u32) -> Self {
        Self {
            image: RgbaImage::new(width, height),
            text_scale: text_scale.max(1),
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        self.image.get_pixel_checked(x, y).map(|p| {
            let [r, g, b, a] = p.0;
            Color::rgba(r, g, b, a)
        })
    }

    pub fn encode_png(&self) -> Result<Vec<u8>, MapError> {
        let mut buffer = Vec::new();
        self.image
            .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
            .map_err(|e| MapError::Render(e.to_string()))?;
        Ok(buffer)
    }

    fn plot(&mut self, x: i64, y: i64, color: Color) {
        if x < 0 || y < 0 || x >= self.image.width() as i64 || y >= self.image.height() as i64 {
            return;
        }
        let src = Rgba([color.r, color.g, color.b, color.a]);
        let dst = self.image.get_pixel_mut(x as u32, y as u32);
        if color.a == 255 {
            *dst = src;
        } else {
            dst.blend(&src);
        }
    }
}

impl Surface for PixelSurface {
    fn width(&self) -> u32 {
        self.image.width()
    }

    fn height(&self) -> u32 {
        self.image.height()
    }

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: Color) {
        let x0 = x.round() as i64;
        let y0 = y.round() as i64;
        let x1 = (x + w).round() as i64;
        let y1 = (y + h).round() as i64;
        for py in y0.max(0)..y1.min(self.image.height() as i64) {
            for px in x0.max(0)..x1.min(self.image.width() as i64) {
                self.plot(px, py, color);
            }
        }
    }

    fn line(&mut self, from: (f64, f64), to: (f64, f64), color: Color) {
        let (dx, dy) = (to.0 - from.0, to.1 - from.1);
        let steps = dx.abs().max(dy.abs()).ceil().max(1.0) as i64;
        for i in 0..=steps {
            let t = i as f64 / steps as f64;
            let x = (from.0 + dx * t).round() as i64;
            let y = (from.1 + dy * t).round() as i64;
            self.plot(x, y, color);
        }
    }

    fn circle(&mut self, center: (f64, f64), radius: f64, style: CircleStyle, color: Color) {
        let reach = radius.ceil() as i64 + 2;
        let (cx, cy) = (center.0.round() as i64, center.1.round() as i64);
        for py in (cy - reach)..=(cy + reach) {
            for px in (cx - reach)..=(cx + reach) {
                let d = ((px as f64 - center.0).powi(2) + (py as f64 - center.1).powi(2)).sqrt();
                let inside = match style {
                    CircleStyle::Filled => d <= radius,
                    CircleStyle::Stroked(width) => (d - radius).abs() <= width.max(1) as f64 / 2.0,
                };
                if inside {
                    self.plot(px, py, color);
                }
            }
        }
    }

    fn text(&mut self, at: (f64, f64), text: &str, color: Color) {
        let scale = self.text_scale as i64;
        let advance = GLYPH_SIZE as i64 * scale;
        let (x0, y0) = (at.0.round() as i64, at.1.round() as i64);
        for (i, ch) in text.chars().enumerate() {
            let glyph = BASIC_FONTS
                .get(ch)
                .or_else(|| BASIC_FONTS.get('?'))
                .unwrap_or([0; 8]);
            let gx = x0 + i as i64 * advance;
            for (row, bits) in glyph.iter().enumerate() {
                for col in 0..8 {
                    if bits & (1 << col) == 0 {
                        continue;
                    }
                    for sy in 0..scale {
                        for sx in 0..scale {
                            self.plot(
                                gx + col as i64 * scale + sx,
                                y0 + row as i64 * scale + sy,
                                color,
                            );
                        }
                    }
                }
            }
        }
    }

    fn text_scale(&self) -> u32 {
        self.text_scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Color = Color::rgb(255, 0, 0);
    const WHITE: Color = Color::rgb(255, 255, 255);

    #[test]
    fn test_fill_and_rect() {
        let mut surface = PixelSurface::new(10, 10, 1);
        surface.fill(WHITE);
        surface.fill_rect(2.0, 2.0, 3.0, 3.0, RED);
        assert_eq!(surface.pixel(0, 0), Some(WHITE));
        assert_eq!(surface.pixel(3, 3), Some(RED));
        assert_eq!(surface.pixel(5, 5), Some(WHITE));
        assert_eq!(surface.pixel(10, 10), None);
    }

    #[test]
    fn test_line_endpoints_and_clipping() {
        let mut surface = PixelSurface::new(10, 10, 1);
        surface.line((-5.0, 0.0), (9.0, 0.0), RED);
        assert_eq!(surface.pixel(0, 0), Some(RED));
        assert_eq!(surface.pixel(9, 0), Some(RED));
        assert_ne!(surface.pixel(0, 1), Some(RED));
    }

    #[test]
    fn test_filled_circle_vs_ring() {
        let mut surface = PixelSurface::new(21, 21, 1);
        surface.circle((10.0, 10.0), 5.0, CircleStyle::Filled, RED);
        assert_eq!(surface.pixel(10, 10), Some(RED));

        let mut ring = PixelSurface::new(21, 21, 1);
        ring.circle((10.0, 10.0), 5.0, CircleStyle::Stroked(1), RED);
        assert_ne!(ring.pixel(10, 10), Some(RED));
        assert_eq!(ring.pixel(15, 10), Some(RED));
    }

    #[test]
    fn test_text_sets_pixels() {
        let mut surface = PixelSurface::new(32, 8, 1);
        surface.text((0.0, 0.0), "H", RED);
        let lit = (0..8)
            .flat_map(|y| (0..8).map(move |x| (x, y)))
            .filter(|&(x, y)| surface.pixel(x, y) == Some(RED))
            .count();
        assert!(lit > 0);
        assert_eq!(surface.text_width("Sol"), 24.0);
    }

    #[test]
    fn test_encode_png_signature() {
        let mut surface = PixelSurface::new(4, 4, 1);
        surface.fill(WHITE);
        let png = surface.encode_png().unwrap();
        assert_eq!(&png[..8], &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]);
    }
}
