// Command text parsing. Runs before any network activity.

use serde::{Deserialize, Serialize};

use crate::error::MapError;

/// Commands served by the faction pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    /// Map image plus the full report.
    FactionMap,
    /// Report only, no image.
    FactionReport,
}

impl CommandKind {
    pub const ALL: [CommandKind; 2] = [CommandKind::FactionMap, CommandKind::FactionReport];

    pub fn prefix(self) -> &'static str {
        match self {
            CommandKind::FactionMap => "/factionmap",
            CommandKind::FactionReport => "/factionreport",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CommandKind::FactionMap => "faction_map",
            CommandKind::FactionReport => "faction_report",
        }
    }

    fn usage(self) -> String {
        format!(
            "Usage: `{} <your faction>, <rival faction>` (two names separated by a comma; names are case-sensitive).",
            self.prefix()
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactionPair {
    pub primary: String,
    pub rival: String,
}

/// A parsed command invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub kind: CommandKind,
    pub pair: FactionPair,
}

/// Parse a full message such as `/factionmap Mother Gaia, Sirius Corporation`.
///
/// Returns `Ok(None)` for messages that are not faction commands.
pub fn parse_message(content: &str) -> Result<Option<Command>, MapError> {
    let content = content.trim();
    let Some((head, rest)) = split_head(content) else {
        return Ok(None);
    };
    let Some(kind) = CommandKind::ALL
        .into_iter()
        .find(|k| head.eq_ignore_ascii_case(k.prefix()))
    else {
        return Ok(None);
    };
    let pair = parse_faction_pair(rest).map_err(|_| MapError::InvalidInput(kind.usage()))?;
    Ok(Some(Command { kind, pair }))
}

/// Parse `<primary>, <rival>`. Names keep their case; surrounding whitespace is trimmed.
pub fn parse_faction_pair(args: &str) -> Result<FactionPair, MapError> {
    let usage = || MapError::InvalidInput(CommandKind::FactionMap.usage());
    let (primary, rival) = args.split_once(',').ok_or_else(usage)?;
    let (primary, rival) = (primary.trim(), rival.trim());
    if primary.is_empty() || rival.is_empty() || rival.contains(',') {
        return Err(usage());
    }
    Ok(FactionPair {
        primary: primary.to_string(),
        rival: rival.to_string(),
    })
}

fn split_head(content: &str) -> Option<(&str, &str)> {
    if content.is_empty() {
        return None;
    }
    match content.find(char::is_whitespace) {
        Some(idx) => Some((&content[..idx], &content[idx..])),
        None => Some((content, "")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pair_trims_and_keeps_case() {
        let pair = parse_faction_pair("  Mother Gaia ,Sirius Corporation ").unwrap();
        assert_eq!(pair.primary, "Mother Gaia");
        assert_eq!(pair.rival, "Sirius Corporation");
    }

    #[test]
    fn test_parse_pair_rejects_missing_names() {
        for input in ["", "Mother Gaia", "Mother Gaia,", ", Sirius", " , "] {
            let err = parse_faction_pair(input).unwrap_err();
            assert!(matches!(err, MapError::InvalidInput(_)), "input {input:?}");
        }
    }

    #[test]
    fn test_parse_pair_rejects_extra_names() {
        assert!(parse_faction_pair("A, B, C").is_err());
    }

    #[test]
    fn test_parse_message_recognises_commands() {
        let cmd = parse_message("/factionmap Mother Gaia, Sirius Corporation")
            .unwrap()
            .unwrap();
        assert_eq!(cmd.kind, CommandKind::FactionMap);
        assert_eq!(cmd.pair.rival, "Sirius Corporation");

        let cmd = parse_message("/FactionReport A, B").unwrap().unwrap();
        assert_eq!(cmd.kind, CommandKind::FactionReport);
    }

    #[test]
    fn test_parse_message_ignores_other_text() {
        assert_eq!(parse_message("hello there").unwrap(), None);
        assert_eq!(parse_message("/traffic Sol").unwrap(), None);
        assert_eq!(parse_message("   ").unwrap(), None);
        // Prefix must be the whole first word.
        assert_eq!(parse_message("/factionmapper A, B").unwrap(), None);
    }

    #[test]
    fn test_parse_message_usage_hint_names_command() {
        let err = parse_message("/factionreport OnlyOne").unwrap_err();
        assert!(err.user_message().contains("/factionreport"));
    }
}
