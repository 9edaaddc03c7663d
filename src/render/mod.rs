// Map rendering: projection, drawing surfaces, and the faction map layout.

pub mod map;
pub mod raster;
pub mod space;
pub mod surface;

use std::time::Instant;

use crate::analysis::ProximityAnalysis;
use crate::config::RenderConfig;
use crate::error::MapError;
use crate::metrics;
use crate::model::FactionSystemSet;

pub use map::render_map;
pub use raster::PixelSurface;
pub use space::RenderSpace;
pub use surface::{CircleStyle, Color, DrawCall, RecordingSurface, Surface};

/// Rasterise the faction map and encode it as PNG.
pub fn render_png(
    primary: &FactionSystemSet,
    rival: &FactionSystemSet,
    analysis: &ProximityAnalysis,
    config: &RenderConfig,
) -> Result<Vec<u8>, MapError> {
    let started = Instant::now();
    let mut surface = PixelSurface::new(config.width, config.height, config.text_scale);
    render_map(&mut surface, primary, rival, analysis, config)?;
    let png = surface.encode_png()?;
    metrics::RENDER_DURATION_SECONDS.observe(started.elapsed().as_secs_f64());
    tracing::debug!(
        width = config.width,
        height = config.height,
        bytes = png.len(),
        "Rendered faction map"
    );
    Ok(png)
}
