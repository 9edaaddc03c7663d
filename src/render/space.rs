// Projection from galactic x/z (light years) to canvas pixels.

use crate::error::MapError;

/// Half-span used when every point shares the same coordinate on an axis.
const MIN_HALF_SPAN_LY: f64 = 10.0;

/// Uniform-scale, centred projection fitted to a padded bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderSpace {
    pub min_x: f64,
    pub max_x: f64,
    pub min_z: f64,
    pub max_z: f64,
    /// Pixels per light year on both axes.
    pub scale: f64,
    pub offset_x: f64,
    pub offset_z: f64,
    pub width: f64,
    pub height: f64,
}

impl RenderSpace {
    /// Fit `(x, z)` points onto a `width` x `height` canvas.
    pub fn fit<I>(points: I, width: u32, height: u32, padding_ratio: f64) -> Result<Self, MapError>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let mut bounds: Option<(f64, f64, f64, f64)> = None;
        for (x, z) in points {
            bounds = Some(match bounds {
                None => (x, x, z, z),
                Some((min_x, max_x, min_z, max_z)) => {
                    (min_x.min(x), max_x.max(x), min_z.min(z), max_z.max(z))
                }
            });
        }
        let (min_x, max_x, min_z, max_z) = bounds.ok_or(MapError::NoDataToRender)?;

        let (min_x, max_x) = pad_axis(min_x, max_x, padding_ratio);
        let (min_z, max_z) = pad_axis(min_z, max_z, padding_ratio);

        let (width, height) = (width as f64, height as f64);
        let span_x = max_x - min_x;
        let span_z = max_z - min_z;
        let scale = (width / span_x).min(height / span_z);
        if !(scale.is_finite() && scale > 0.0) {
            return Err(MapError::Render(format!(
                "coordinate span {span_x} x {span_z} ly cannot be projected"
            )));
        }

        Ok(Self {
            min_x,
            max_x,
            min_z,
            max_z,
            scale,
            offset_x: (width - span_x * scale) / 2.0,
            offset_z: (height - span_z * scale) / 2.0,
            width,
            height,
        })
    }

    /// Canvas position of a galactic `(x, z)`; z grows upward on the canvas.
    pub fn project(&self, x: f64, z: f64) -> (f64, f64) {
        let px = self.offset_x + (x - self.min_x) * self.scale;
        let py = self.height - (self.offset_z + (z - self.min_z) * self.scale);
        (px, py)
    }

    /// Galactic x range covered by the full canvas width.
    pub fn visible_x(&self) -> (f64, f64) {
        let left = self.min_x - self.offset_x / self.scale;
        (left, left + self.width / self.scale)
    }

    /// Galactic z range covered by the full canvas height (bottom, top).
    pub fn visible_z(&self) -> (f64, f64) {
        let bottom = self.min_z - self.offset_z / self.scale;
        (bottom, bottom + self.height / self.scale)
    }
}

fn pad_axis(min: f64, max: f64, ratio: f64) -> (f64, f64) {
    let pad = (max - min) * ratio;
    if pad > 0.0 {
        (min - pad, max + pad)
    } else {
        (min - MIN_HALF_SPAN_LY, max + MIN_HALF_SPAN_LY)
    }
}
