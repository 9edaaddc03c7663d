// One parameterized pipeline: resolve -> fetch -> analyze -> render/assemble.

use std::sync::Arc;
use std::time::Instant;

use prometheus::IntGauge;
use serde::Serialize;
use uuid::Uuid;

use crate::analysis::analyze;
use crate::command::{Command, CommandKind, FactionPair};
use crate::config::Config;
use crate::error::MapError;
use crate::fetcher::build_faction_set;
use crate::metrics;
use crate::render::render_png;
use crate::report::{assemble_report, FactionReport};
use crate::upstream::GalaxyApi;

pub const MAP_FILENAME: &str = "faction_map.png";

/// What a command produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineProfile {
    pub include_overlap: bool,
    pub include_proximity: bool,
    pub render_map: bool,
}

impl PipelineProfile {
    pub fn for_command(kind: CommandKind) -> Self {
        match kind {
            CommandKind::FactionMap => Self {
                include_overlap: true,
                include_proximity: true,
                render_map: true,
            },
            CommandKind::FactionReport => Self {
                include_overlap: true,
                include_proximity: true,
                render_map: false,
            },
        }
    }
}

/// Image attachment handed to the messaging layer.
#[derive(Debug, Clone, Serialize)]
pub struct Attachment {
    pub filename: String,
    pub content_type: String,
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommandReply {
    pub report: FactionReport,
    pub attachment: Option<Attachment>,
}

/// Holds a gauge raised until dropped, so cancelled runs are released too.
struct InFlight<'a>(&'a IntGauge);

impl<'a> InFlight<'a> {
    fn enter(gauge: &'a IntGauge) -> Self {
        gauge.inc();
        Self(gauge)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.dec();
    }
}

/// Stateless runner; every call is an independent invocation.
pub struct Pipeline<A> {
    api: A,
    config: Arc<Config>,
}

impl<A: GalaxyApi> Pipeline<A> {
    pub fn new(api: A, config: Arc<Config>) -> Self {
        Self { api, config }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run a parsed command, recording metrics and logging the outcome.
    pub async fn execute(&self, command: &Command) -> Result<CommandReply, MapError> {
        let invocation = Uuid::new_v4();
        let label = command.kind.label();
        let started = Instant::now();
        let in_flight = InFlight::enter(&metrics::COMMANDS_IN_FLIGHT);

        tracing::info!(
            %invocation,
            command = label,
            primary = %command.pair.primary,
            rival = %command.pair.rival,
            "Running command"
        );
        let result = self
            .run(&command.pair, PipelineProfile::for_command(command.kind))
            .await;

        drop(in_flight);
        metrics::PIPELINE_DURATION_SECONDS
            .with_label_values(&[label])
            .observe(started.elapsed().as_secs_f64());

        match &result {
            Ok(_) => {
                metrics::COMMANDS_TOTAL.with_label_values(&[label, "ok"]).inc();
                tracing::info!(
                    %invocation,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Command finished"
                );
            }
            Err(e) => {
                metrics::COMMANDS_TOTAL
                    .with_label_values(&[label, e.kind()])
                    .inc();
                tracing::error!(
                    %invocation,
                    primary = %command.pair.primary,
                    rival = %command.pair.rival,
                    kind = e.kind(),
                    "Command failed: {e}"
                );
            }
        }
        result
    }

    /// The pipeline proper. Both factions are resolved concurrently.
    pub async fn run(
        &self,
        pair: &FactionPair,
        profile: PipelineProfile,
    ) -> Result<CommandReply, MapError> {
        let limits = &self.config.upstream;
        let (primary, rival) = futures::try_join!(
            build_faction_set(&self.api, &pair.primary, limits),
            build_faction_set(&self.api, &pair.rival, limits),
        )?;

        let analysis = analyze(&primary, &rival, &self.config.analysis);
        tracing::debug!(
            primary_systems = primary.len(),
            rival_systems = rival.len(),
            overlap = analysis.overlap_systems.len(),
            nearby = analysis.nearby_map.len(),
            "Analysis complete"
        );

        let report = assemble_report(
            pair,
            &primary,
            &rival,
            &analysis,
            self.config.report.char_budget,
            profile.include_overlap,
            profile.include_proximity,
        );

        let attachment = if profile.render_map {
            let render_config = self.config.render.clone();
            let bytes = tokio::task::spawn_blocking(move || {
                render_png(&primary, &rival, &analysis, &render_config)
            })
            .await
            .map_err(|e| MapError::Render(e.to_string()))??;
            Some(Attachment {
                filename: MAP_FILENAME.to_string(),
                content_type: "image/png".to_string(),
                bytes,
            })
        } else {
            None
        };

        Ok(CommandReply { report, attachment })
    }
}
