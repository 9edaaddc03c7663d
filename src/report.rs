// Text report assembly: bounded sections to accompany the map image.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::analysis::ProximityAnalysis;
use crate::command::FactionPair;
use crate::model::FactionSystemSet;

/// Shown instead of an empty block; the delivery layer rejects empty fields.
pub const EMPTY_PLACEHOLDER: &str = "no systems";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSection {
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FactionReport {
    pub title: String,
    pub description: String,
    pub sections: Vec<ReportSection>,
    pub generated_at: DateTime<Utc>,
}

/// Join lines until the next one would exceed `budget` characters, then note
/// how many were left out.
pub fn assemble_block<I>(lines: I, budget: usize) -> String
where
    I: IntoIterator<Item = String>,
{
    let lines: Vec<String> = lines.into_iter().collect();
    if lines.is_empty() {
        return EMPTY_PLACEHOLDER.to_string();
    }

    let mut body = String::new();
    let mut used = 0usize;
    let mut printed = 0usize;
    for line in &lines {
        let separator = usize::from(printed > 0);
        let cost = separator + line.chars().count();
        if used + cost > budget {
            break;
        }
        if printed > 0 {
            body.push('\n');
        }
        body.push_str(line);
        used += cost;
        printed += 1;
    }

    let omitted = lines.len() - printed;
    if omitted > 0 {
        if printed > 0 {
            body.push('\n');
        }
        body.push_str(&format!("... {omitted} more"));
    }
    body
}

fn control_label(faction: Option<&str>) -> &str {
    faction.unwrap_or("uncontrolled")
}

pub fn overlap_lines(analysis: &ProximityAnalysis) -> Vec<String> {
    analysis
        .overlap_systems
        .iter()
        .map(|s| {
            format!(
                "• **{}** (controlled by {})",
                s.name,
                control_label(s.controlling_faction.as_deref())
            )
        })
        .collect()
}

pub fn nearby_lines(analysis: &ProximityAnalysis) -> Vec<String> {
    analysis
        .nearby_map
        .iter()
        .map(|m| {
            let nearby = m
                .nearby
                .iter()
                .map(|n| format!("{} ({:.2} ly)", n.system.name, n.distance))
                .collect::<Vec<_>>()
                .join(", ");
            format!("• **{}** → {}", m.rival_system.name, nearby)
        })
        .collect()
}

fn summary(set: &FactionSystemSet) -> String {
    format!(
        "**{}**: {} systems, {} controlled",
        set.faction(),
        set.len(),
        set.controlled().count()
    )
}

/// Build the report sections selected by the caller.
pub fn assemble_report(
    pair: &FactionPair,
    primary: &FactionSystemSet,
    rival: &FactionSystemSet,
    analysis: &ProximityAnalysis,
    budget: usize,
    include_overlap: bool,
    include_proximity: bool,
) -> FactionReport {
    let mut sections = vec![ReportSection {
        title: "Overview".to_string(),
        body: format!(
            "{}\n{}\nProximity threshold: {:.0} ly",
            summary(primary),
            summary(rival),
            analysis.threshold_ly
        ),
    }];

    if include_overlap {
        sections.push(ReportSection {
            title: format!("Systems shared with {}", pair.rival),
            body: assemble_block(overlap_lines(analysis), budget),
        });
    }
    if include_proximity {
        sections.push(ReportSection {
            title: format!(
                "{} systems within {:.0} ly of {}",
                pair.rival, analysis.threshold_ly, pair.primary
            ),
            body: assemble_block(nearby_lines(analysis), budget),
        });
    }

    FactionReport {
        title: format!("{} vs {}", pair.primary, pair.rival),
        description: format!(
            "Presence of **{}** compared with **{}**.",
            pair.primary, pair.rival
        ),
        sections,
        generated_at: Utc::now(),
    }
}
