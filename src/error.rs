// Error taxonomy for a command invocation.

use std::fmt;

use thiserror::Error;

/// Pipeline stage an upstream failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStage {
    Presence,
    Systems,
}

impl fmt::Display for FetchStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchStage::Presence => write!(f, "presence lookup"),
            FetchStage::Systems => write!(f, "system lookup"),
        }
    }
}

/// Failure talking to an upstream galaxy service.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("request timed out")]
    Timeout,
    #[error("upstream returned HTTP {0}")]
    Status(u16),
    #[error("could not decode upstream response: {0}")]
    Decode(String),
    #[error("transport error: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for UpstreamError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            UpstreamError::Timeout
        } else if e.is_decode() {
            UpstreamError::Decode(e.to_string())
        } else if let Some(status) = e.status() {
            UpstreamError::Status(status.as_u16())
        } else {
            UpstreamError::Transport(e.to_string())
        }
    }
}

/// Every way a command invocation can fail. All variants are terminal.
#[derive(Debug, Error)]
pub enum MapError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("faction '{name}' has no known presence")]
    FactionNotFound { name: String },
    #[error("{stage} for '{faction}' failed: {source}")]
    UpstreamFetch {
        stage: FetchStage,
        faction: String,
        #[source]
        source: UpstreamError,
    },
    #[error("no systems with coordinates to render")]
    NoDataToRender,
    #[error("map rendering failed: {0}")]
    Render(String),
}

impl MapError {
    /// Stable label used in metrics and JSON error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            MapError::InvalidInput(_) => "invalid_input",
            MapError::FactionNotFound { .. } => "faction_not_found",
            MapError::UpstreamFetch { .. } => "upstream_fetch",
            MapError::NoDataToRender => "no_data_to_render",
            MapError::Render(_) => "render",
        }
    }

    /// The single plain-text reply shown to the requester.
    ///
    /// Upstream diagnostics stay in the logs; only the failing faction name is echoed.
    pub fn user_message(&self) -> String {
        match self {
            MapError::InvalidInput(hint) => hint.clone(),
            MapError::FactionNotFound { name } => format!(
                "No systems found for faction **{name}**. Faction names are case-sensitive; check the exact spelling."
            ),
            MapError::UpstreamFetch { faction, .. } => format!(
                "Could not fetch galaxy data for **{faction}** right now. Please try again later."
            ),
            MapError::NoDataToRender => {
                "None of the systems had known coordinates, so there is nothing to map.".to_string()
            }
            MapError::Render(_) => "The map could not be drawn. Please try again later.".to_string(),
        }
    }
}
