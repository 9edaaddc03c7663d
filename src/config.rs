// Service configuration, loaded from environment variables and CLI flags.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Default EliteBGS-style endpoint for faction presence and system lookups.
pub const DEFAULT_GALAXY_API_URL: &str = "https://elitebgs.app/api/ebgs/v5";

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// Upstream galaxy API settings.
    pub upstream: UpstreamConfig,
    /// When set, serve galaxy data from this JSON fixture instead of the network.
    pub fixture_path: Option<PathBuf>,
    pub analysis: AnalysisConfig,
    pub render: RenderConfig,
    pub report: ReportConfig,
    /// Commands a single requester may issue per minute.
    pub commands_per_minute: usize,
}

#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    pub base_url: String,
    /// Results per page the upstream returns; a shorter page ends pagination.
    pub page_size: usize,
    /// Maximum system names per lookup request.
    pub batch_size: usize,
    /// Hard stop for runaway pagination.
    pub max_pages: u32,
    pub timeout: Duration,
    /// Upper bound on concurrent upstream requests.
    pub max_in_flight: usize,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_GALAXY_API_URL.to_string(),
            page_size: 50,
            batch_size: 50,
            max_pages: 100,
            timeout: Duration::from_secs(15),
            max_in_flight: 4,
        }
    }
}

/// Which rival systems are checked for nearby primary systems.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RivalScope {
    /// Every system the rival has presence in.
    AllPresence,
    /// Only systems the rival controls.
    Controlled,
}

impl FromStr for RivalScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" | "presence" | "all-presence" => Ok(RivalScope::AllPresence),
            "controlled" => Ok(RivalScope::Controlled),
            other => Err(format!("unknown rival scope '{other}'")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Proximity threshold in light years (inclusive).
    pub threshold_ly: f64,
    pub rival_scope: RivalScope,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            threshold_ly: 50.0,
            rival_scope: RivalScope::AllPresence,
        }
    }
}

/// Which systems get a near-enemy ring on the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RingPredicate {
    /// Systems of either faction near a system the other faction controls.
    Symmetric,
    /// Only primary systems near a rival-controlled system.
    PrimaryOnly,
}

impl FromStr for RingPredicate {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "symmetric" | "both" => Ok(RingPredicate::Symmetric),
            "primary" | "primary-only" | "asymmetric" => Ok(RingPredicate::PrimaryOnly),
            other => Err(format!("unknown ring predicate '{other}'")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub width: u32,
    pub height: u32,
    /// Fraction of the raw bounding box added on each side.
    pub padding_ratio: f64,
    /// Nominal grid spacing in light years.
    pub grid_step_ly: f64,
    /// A label is skipped when another system is closer than this on the x/z plane.
    pub label_clearance_ly: f64,
    pub always_label_near_enemy: bool,
    pub label_overlap: bool,
    pub ring_predicate: RingPredicate,
    /// Name shown next to the galactic origin.
    pub origin_label: String,
    /// Integer glyph scale for the 8x8 bitmap font.
    pub text_scale: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 900,
            padding_ratio: 0.1,
            grid_step_ly: 50.0,
            label_clearance_ly: 8.0,
            always_label_near_enemy: true,
            label_overlap: true,
            ring_predicate: RingPredicate::Symmetric,
            origin_label: "Sol".to_string(),
            text_scale: 1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReportConfig {
    /// Character budget for each text block.
    pub char_budget: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self { char_budget: 1000 }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            upstream: UpstreamConfig::default(),
            fixture_path: None,
            analysis: AnalysisConfig::default(),
            render: RenderConfig::default(),
            report: ReportConfig::default(),
            commands_per_minute: 6,
        }
    }
}

impl Config {
    /// Load configuration from environment variables and CLI arguments.
    ///
    /// Environment variables:
    /// - `PORT` - HTTP server port (default: 3000)
    /// - `GALAXY_API_URL` - upstream base URL
    /// - `GALAXY_FIXTURE` - JSON fixture to serve instead of the network
    /// - `PROXIMITY_THRESHOLD_LY`, `RIVAL_SCOPE` (`all` | `controlled`)
    /// - `RING_PREDICATE` (`symmetric` | `primary`)
    /// - `MAP_WIDTH`, `MAP_HEIGHT`, `GRID_STEP_LY`, `LABEL_CLEARANCE_LY`,
    ///   `ALWAYS_LABEL_NEAR_ENEMY`
    /// - `REPORT_CHAR_BUDGET`
    /// - `UPSTREAM_TIMEOUT_SECS`, `UPSTREAM_MAX_IN_FLIGHT`, `UPSTREAM_PAGE_SIZE`,
    ///   `UPSTREAM_BATCH_SIZE`
    /// - `COMMANDS_PER_MINUTE`
    ///
    /// CLI flags:
    /// - `--port <PORT>` - Override the port
    /// - `--fixture <PATH>` - Same as `GALAXY_FIXTURE`
    pub fn load() -> Self {
        let args: Vec<String> = std::env::args().collect();
        let defaults = Config::default();

        // Port: CLI flag --port takes precedence, then env var, then default
        let port = Self::parse_cli_value(&args, "--port")
            .and_then(|v| v.parse().ok())
            .or_else(|| env_parse("PORT"))
            .unwrap_or(defaults.port);

        let fixture_path = Self::parse_cli_value(&args, "--fixture")
            .or_else(|| std::env::var("GALAXY_FIXTURE").ok())
            .map(PathBuf::from);

        let upstream = UpstreamConfig {
            base_url: std::env::var("GALAXY_API_URL")
                .unwrap_or(defaults.upstream.base_url),
            page_size: env_parse("UPSTREAM_PAGE_SIZE")
                .filter(|n: &usize| *n > 0)
                .unwrap_or(defaults.upstream.page_size),
            batch_size: env_parse("UPSTREAM_BATCH_SIZE")
                .filter(|n: &usize| *n > 0)
                .unwrap_or(defaults.upstream.batch_size),
            max_pages: defaults.upstream.max_pages,
            timeout: env_parse("UPSTREAM_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.upstream.timeout),
            max_in_flight: env_parse("UPSTREAM_MAX_IN_FLIGHT")
                .filter(|n: &usize| *n > 0)
                .unwrap_or(defaults.upstream.max_in_flight),
        };

        let analysis = AnalysisConfig {
            threshold_ly: env_parse("PROXIMITY_THRESHOLD_LY")
                .filter(|t: &f64| t.is_finite() && *t > 0.0)
                .unwrap_or(defaults.analysis.threshold_ly),
            rival_scope: env_parse("RIVAL_SCOPE").unwrap_or(defaults.analysis.rival_scope),
        };

        let render = RenderConfig {
            width: env_parse("MAP_WIDTH")
                .filter(|w: &u32| *w >= 200)
                .unwrap_or(defaults.render.width),
            height: env_parse("MAP_HEIGHT")
                .filter(|h: &u32| *h >= 200)
                .unwrap_or(defaults.render.height),
            grid_step_ly: env_parse("GRID_STEP_LY")
                .filter(|s: &f64| s.is_finite() && *s > 0.0)
                .unwrap_or(defaults.render.grid_step_ly),
            label_clearance_ly: env_parse("LABEL_CLEARANCE_LY")
                .filter(|c: &f64| c.is_finite() && *c >= 0.0)
                .unwrap_or(defaults.render.label_clearance_ly),
            always_label_near_enemy: std::env::var("ALWAYS_LABEL_NEAR_ENEMY")
                .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
                .unwrap_or(defaults.render.always_label_near_enemy),
            ring_predicate: env_parse("RING_PREDICATE")
                .unwrap_or(defaults.render.ring_predicate),
            ..defaults.render
        };

        let report = ReportConfig {
            char_budget: env_parse("REPORT_CHAR_BUDGET")
                .filter(|b: &usize| *b > 0)
                .unwrap_or(defaults.report.char_budget),
        };

        let commands_per_minute =
            env_parse("COMMANDS_PER_MINUTE").unwrap_or(defaults.commands_per_minute);

        Config {
            port,
            upstream,
            fixture_path,
            analysis,
            render,
            report,
            commands_per_minute,
        }
    }

    /// Parse a CLI flag value like `--port 8080`.
    fn parse_cli_value(args: &[String], flag: &str) -> Option<String> {
        args.windows(2).find_map(|pair| {
            if pair[0] == flag {
                Some(pair[1].clone())
            } else {
                None
            }
        })
    }
}

/// Read and parse an environment variable, ignoring unset or malformed values.
fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key, value = %raw, "Ignoring malformed configuration value");
            None
        }
    }
}
