//! Parse raw collector output into a [`QuotaSnapshot`].

use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use super::types::QuotaSnapshot;

/// Why a snapshot could not be produced.
///
/// None of these are fatal: callers show the "loading" state instead.
#[derive(Debug, Error)]
pub enum ParseFailure {
    /// Input was empty or whitespace
    #[error("snapshot is empty")]
    Empty,

    /// Input is not valid JSON
    #[error("snapshot is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Valid JSON, but not an object
    #[error("snapshot is not a JSON object")]
    NotAnObject,

    /// The snapshot file could not be read
    #[error("failed to read snapshot {path:?}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Parse a snapshot from raw text.
///
/// Only JSON well-formedness is checked. Missing keys become absent fields and
/// wrong-typed fields degrade to absent (see `lenient`).
pub fn parse(raw: &str) -> Result<QuotaSnapshot, ParseFailure> {
    if raw.trim().is_empty() {
        return Err(ParseFailure::Empty);
    }

    let value: Value = serde_json::from_str(raw)?;
    if !value.is_object() {
        return Err(ParseFailure::NotAnObject);
    }

    let mut snapshot = QuotaSnapshot::deserialize(value)?;
    snapshot.excerpt = excerpt(raw);
    Ok(snapshot)
}

/// Characters of raw input kept in [`QuotaSnapshot::excerpt`]
const EXCERPT_CHARS: usize = 50;

fn excerpt(raw: &str) -> String {
    let raw = raw.trim();
    match raw.char_indices().nth(EXCERPT_CHARS) {
        Some((end, _)) => format!("{}...", &raw[..end]),
        None => raw.to_string(),
    }
}

/// Read and parse a snapshot file
pub fn read_snapshot(path: &Path) -> Result<QuotaSnapshot, ParseFailure> {
    let raw = std::fs::read_to_string(path).map_err(|source| ParseFailure::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    use crate::snapshot::types::{ClaudeUsage, UsageWindow};

    #[test]
    fn test_parse_empty_and_garbage() {
        assert!(matches!(parse(""), Err(ParseFailure::Empty)));
        assert!(matches!(parse("  \n"), Err(ParseFailure::Empty)));
        assert!(matches!(parse("not json"), Err(ParseFailure::Malformed(_))));
        assert!(matches!(parse("{\"claude\":"), Err(ParseFailure::Malformed(_))));
    }

    #[test]
    fn test_parse_non_object() {
        assert!(matches!(parse("42"), Err(ParseFailure::NotAnObject)));
        assert!(matches!(parse("[]"), Err(ParseFailure::NotAnObject)));
        assert!(matches!(parse("null"), Err(ParseFailure::NotAnObject)));
    }

    #[test]
    fn test_parse_empty_object() {
        let snapshot = parse("{}").unwrap();
        assert!(snapshot.is_empty());
        assert_eq!(
            snapshot,
            QuotaSnapshot {
                excerpt: "{}".to_string(),
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_excerpt_is_truncated() {
        let raw = format!(r#"{{"gemini": "{}"}}"#, "é".repeat(80));
        let snapshot = parse(&raw).unwrap();
        assert_eq!(snapshot.excerpt.chars().count(), 53);
        assert!(snapshot.excerpt.starts_with(r#"{"gemini": "éé"#));
        assert!(snapshot.excerpt.ends_with("é..."));
    }

    #[test]
    fn test_parse_collector_output() {
        let raw = r#"{
          "timestamp": "2026-03-01T09:00:00.000000+00:00",
          "claude": {
            "source": "oauth_api",
            "session": {"pct_used": 72.0, "resets_at": "2026-03-01T11:00:00+00:00"},
            "weekly": {"pct_used": 23, "resets_at": null},
            "seven_day_opus": {"pct_used": 5},
            "extra_usage": {"is_enabled": true, "used_cents": 2222, "limit_cents": 5000, "pct_used": 44.4}
          },
          "antigravity": {
            "plan": "Pro",
            "email": "dev@example.com",
            "prompt_credits": 480,
            "models": [
              {"label": "Claude Opus 4.5 (Thinking)", "pct_used": 20.0, "reset_time": "2026-03-01T14:00:00Z"},
              {"label": "GPT-OSS 120B (Medium)", "pct_used": 0}
            ]
          },
          "gemini": null
        }"#;

        let snapshot = parse(raw).unwrap();
        assert!(snapshot.timestamp.is_some());

        let claude = snapshot.claude.unwrap();
        assert_eq!(claude.session.as_ref().unwrap().pct_used, Some(72.0));
        assert!(claude.session.as_ref().unwrap().resets_at.is_some());
        assert_eq!(claude.weekly.as_ref().unwrap().resets_at, None);
        assert_eq!(claude.seven_day_opus.unwrap().pct_used, Some(5.0));
        assert!(claude.seven_day_sonnet.is_none());
        let extra = claude.extra_usage.unwrap();
        assert_eq!(extra.used_cents, Some(2222));
        assert_eq!(extra.limit_cents, Some(5000));

        let antigravity = snapshot.antigravity.unwrap();
        assert_eq!(antigravity.email.as_deref(), Some("dev@example.com"));
        assert_eq!(antigravity.prompt_credits, Some(480));
        assert_eq!(antigravity.prompt_credits_monthly, None);
        assert_eq!(antigravity.models.len(), 2);
        assert_eq!(antigravity.models[0].label, "Claude Opus 4.5 (Thinking)");
        assert_eq!(antigravity.models[1].pct_used, Some(0.0));
        assert!(antigravity.models[1].reset_time.is_none());
    }

    #[test]
    fn test_parse_is_permissive() {
        // Numbers as strings, wrong types and junk model entries
        let raw = r#"{
          "claude": {"session": {"pct_used": "95"}, "weekly": "oops", "error": ""},
          "antigravity": {"models": [42, {"pct_used": "x"}], "prompt_credits_monthly": "500"}
        }"#;

        let snapshot = parse(raw).unwrap();
        let claude = snapshot.claude.unwrap();
        assert_eq!(
            claude,
            ClaudeUsage {
                session: Some(UsageWindow {
                    pct_used: Some(95.0),
                    resets_at: None,
                }),
                weekly: Some(UsageWindow::default()),
                ..Default::default()
            }
        );

        let antigravity = snapshot.antigravity.unwrap();
        assert_eq!(antigravity.prompt_credits_monthly, Some(500.0));
        assert_eq!(antigravity.models.len(), 2);
        assert_eq!(antigravity.models[0].label, "Unknown");
        assert_eq!(antigravity.models[1].pct_used, None);
    }

    #[test]
    fn test_parse_null_provider_is_absent() {
        let snapshot = parse(r#"{"claude": null, "antigravity": false}"#).unwrap();
        assert!(snapshot.is_empty());
    }

    #[test]
    fn test_read_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quota_data.json");

        assert!(matches!(
            read_snapshot(&path),
            Err(ParseFailure::Unreadable { .. })
        ));

        std::fs::write(&path, r#"{"claude": {"session": {"pct_used": 10}}}"#).unwrap();
        let snapshot = read_snapshot(&path).unwrap();
        assert!(snapshot.claude.is_some());
    }
}
