// Faction map layout: what to draw, where, and in which order.

use std::collections::HashSet;

use super::space::RenderSpace;
use super::surface::{CircleStyle, Color, Surface};
use crate::analysis::{is_near_enemy, ProximityAnalysis};
use crate::config::{RenderConfig, RingPredicate};
use crate::error::MapError;
use crate::model::{FactionSystemSet, StarSystem};

pub const BACKGROUND: Color = Color::rgb(12, 14, 24);
pub const GRID: Color = Color::rgb(38, 44, 64);
pub const GRID_LABEL: Color = Color::rgb(110, 118, 140);
pub const AXIS: Color = Color::rgb(90, 100, 130);
pub const ORIGIN: Color = Color::rgb(255, 221, 87);
pub const PRIMARY_CONTROLLED: Color = Color::rgb(64, 160, 255);
pub const PRIMARY_PRESENT: Color = Color::rgb(34, 80, 130);
pub const RIVAL_CONTROLLED: Color = Color::rgb(255, 80, 80);
pub const RIVAL_PRESENT: Color = Color::rgb(130, 40, 40);
pub const NEAR_ENEMY_RING: Color = Color::rgb(255, 170, 0);
pub const LABEL: Color = Color::rgb(225, 228, 235);
pub const LEGEND_BACKGROUND: Color = Color::rgba(20, 24, 38, 220);

const MARKER_RADIUS: f64 = 4.0;
const RING_RADIUS: f64 = 9.0;
const ORIGIN_RADIUS: f64 = 5.0;
/// Grid lines closer than this are thinned by doubling the step.
const MIN_GRID_SPACING_PX: f64 = 24.0;
const EDGE_MARGIN: f64 = 4.0;
const LEGEND_MARGIN: f64 = 12.0;
const LEGEND_PADDING: f64 = 8.0;
const SWATCH: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Primary,
    Rival,
}

impl Side {
    fn colors(self) -> (Color, Color) {
        match self {
            Side::Primary => (PRIMARY_CONTROLLED, PRIMARY_PRESENT),
            Side::Rival => (RIVAL_CONTROLLED, RIVAL_PRESENT),
        }
    }
}

/// Draw the complete map onto `surface` and return the projection used.
pub fn render_map<S: Surface>(
    surface: &mut S,
    primary: &FactionSystemSet,
    rival: &FactionSystemSet,
    analysis: &ProximityAnalysis,
    config: &RenderConfig,
) -> Result<RenderSpace, MapError> {
    let points = primary
        .systems()
        .iter()
        .chain(rival.systems())
        .map(|s| (s.coords.x, s.coords.z));
    let space = RenderSpace::fit(points, surface.width(), surface.height(), config.padding_ratio)?;

    surface.fill(BACKGROUND);
    draw_grid(surface, &space, config.grid_step_ly);
    draw_origin(surface, &space, &config.origin_label);

    let threshold = analysis.threshold_ly;
    let ringed = |system: &StarSystem, side: Side| match (side, config.ring_predicate) {
        (Side::Primary, _) => is_near_enemy(system, rival, threshold),
        (Side::Rival, RingPredicate::Symmetric) => is_near_enemy(system, primary, threshold),
        (Side::Rival, RingPredicate::PrimaryOnly) => false,
    };

    let all: Vec<&StarSystem> = primary.systems().iter().chain(rival.systems()).collect();
    let mut labelled: HashSet<&str> = HashSet::new();
    let mut rings: Vec<(f64, f64)> = Vec::new();

    for (set, side) in [(primary, Side::Primary), (rival, Side::Rival)] {
        let (controlled_color, present_color) = side.colors();
        for system in set.systems() {
            let pos = space.project(system.coords.x, system.coords.z);
            let color = if set.is_controlled(system) {
                controlled_color
            } else {
                present_color
            };
            surface.circle(pos, MARKER_RADIUS, CircleStyle::Filled, color);

            let near_enemy = ringed(system, side);
            if near_enemy {
                rings.push(pos);
            }

            let overlap = analysis.is_overlap(&system.name);
            let wants_label = (overlap && config.label_overlap)
                || (near_enemy && config.always_label_near_enemy)
                || has_label_clearance(system, &all, config.label_clearance_ly);
            if wants_label && labelled.insert(system.name.as_str()) {
                let text = if overlap && config.label_overlap {
                    format!("{} (shared)", system.name)
                } else {
                    system.name.clone()
                };
                let y = pos.1 - surface.text_height() / 2.0;
                surface.text((pos.0 + MARKER_RADIUS + 3.0, y), &text, LABEL);
            }
        }
    }

    for pos in rings {
        surface.circle(pos, RING_RADIUS, CircleStyle::Stroked(2), NEAR_ENEMY_RING);
    }

    draw_legend(surface, primary.faction(), rival.faction(), threshold);
    Ok(space)
}

/// True when no other plotted system lies within `clearance` on the x/z plane.
/// Entries sharing the system's name are the same system seen by both factions.
fn has_label_clearance(system: &StarSystem, all: &[&StarSystem], clearance: f64) -> bool {
    all.iter()
        .filter(|other| other.name != system.name)
        .all(|other| system.coords.planar_distance_to(&other.coords) >= clearance)
}

/// Grid step widened until adjacent lines are at least `MIN_GRID_SPACING_PX` apart.
fn effective_grid_step(space: &RenderSpace, nominal: f64) -> f64 {
    let mut step = nominal;
    while step > 0.0 && step.is_finite() && step * space.scale < MIN_GRID_SPACING_PX {
        step *= 2.0;
    }
    step
}

fn draw_grid<S: Surface>(surface: &mut S, space: &RenderSpace, nominal_step: f64) {
    let step = effective_grid_step(space, nominal_step);
    let (w, h) = (space.width, space.height);
    let text_h = surface.text_height();

    let (left, right) = space.visible_x();
    for i in (left / step).ceil() as i64..=(right / step).floor() as i64 {
        let gx = i as f64 * step;
        let (px, _) = space.project(gx, 0.0);
        surface.line((px, 0.0), (px, h), GRID);
        surface.text((px + 2.0, h - text_h - EDGE_MARGIN), &format!("{gx:.0}"), GRID_LABEL);
    }

    let (bottom, top) = space.visible_z();
    for i in (bottom / step).ceil() as i64..=(top / step).floor() as i64 {
        let gz = i as f64 * step;
        let (_, py) = space.project(0.0, gz);
        surface.line((0.0, py), (w, py), GRID);
        surface.text((EDGE_MARGIN, py - text_h - 2.0), &format!("{gz:.0}"), GRID_LABEL);
    }
}

/// Crosshair through the galactic origin and the reference-system marker,
/// each drawn only when visible.
fn draw_origin<S: Surface>(surface: &mut S, space: &RenderSpace, label: &str) {
    let (left, right) = space.visible_x();
    let (bottom, top) = space.visible_z();
    let x_visible = left <= 0.0 && 0.0 <= right;
    let z_visible = bottom <= 0.0 && 0.0 <= top;
    let (ox, oy) = space.project(0.0, 0.0);

    if x_visible {
        surface.line((ox, 0.0), (ox, space.height), AXIS);
    }
    if z_visible {
        surface.line((0.0, oy), (space.width, oy), AXIS);
    }
    if x_visible && z_visible {
        surface.circle((ox, oy), ORIGIN_RADIUS, CircleStyle::Filled, ORIGIN);
        surface.text((ox + ORIGIN_RADIUS + 3.0, oy + 3.0), label, ORIGIN);
    }
}

/// Legend in the top-right corner, clear of the bottom and left grid labels.
fn draw_legend<S: Surface>(surface: &mut S, primary: &str, rival: &str, threshold: f64) {
    let entries = [
        (PRIMARY_CONTROLLED, format!("{primary} (controlled)")),
        (PRIMARY_PRESENT, format!("{primary} (present)")),
        (RIVAL_CONTROLLED, format!("{rival} (controlled)")),
        (RIVAL_PRESENT, format!("{rival} (present)")),
    ];
    let ring_label = format!("Within {threshold:.0} ly of enemy control");

    let text_h = surface.text_height();
    let row_h = SWATCH.max(text_h) + 6.0;
    let text_w = entries
        .iter()
        .map(|(_, label)| surface.text_width(label))
        .chain(std::iter::once(surface.text_width(&ring_label)))
        .fold(0.0, f64::max);
    let box_w = LEGEND_PADDING * 3.0 + SWATCH + text_w;
    let box_h = LEGEND_PADDING * 2.0 + row_h * (entries.len() + 1) as f64;
    let x0 = surface.width() as f64 - box_w - LEGEND_MARGIN;
    let y0 = LEGEND_MARGIN;

    surface.fill_rect(x0, y0, box_w, box_h, LEGEND_BACKGROUND);

    let swatch_x = x0 + LEGEND_PADDING;
    let text_x = swatch_x + SWATCH + LEGEND_PADDING;
    for (row, (color, label)) in entries.iter().enumerate() {
        let y = y0 + LEGEND_PADDING + row as f64 * row_h;
        surface.fill_rect(swatch_x, y, SWATCH, SWATCH, *color);
        surface.text((text_x, y + (SWATCH - text_h) / 2.0), label, LABEL);
    }

    let y = y0 + LEGEND_PADDING + entries.len() as f64 * row_h;
    let center = (swatch_x + SWATCH / 2.0, y + SWATCH / 2.0);
    surface.circle(center, SWATCH / 2.0, CircleStyle::Stroked(2), NEAR_ENEMY_RING);
    surface.text((text_x, y + (SWATCH - text_h) / 2.0), &ring_label, LABEL);
}
