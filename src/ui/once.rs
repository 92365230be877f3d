//! One-shot rendering for `quotacard once`.

use anyhow::{Context, Result};
use chrono::Utc;
use quotacard_core::{build, read_snapshot};

use crate::config::Settings;

use super::components::{CardLayout, QuotaCard};

/// Read the snapshot once and render it as plain text, or as the render
/// plan in JSON when `json` is set.
pub fn render_once(settings: &Settings, json: bool) -> Result<String> {
    let snapshot = read_snapshot(&settings.data_path);
    if let Err(e) = &snapshot {
        tracing::debug!("Snapshot unavailable: {}", e);
    }

    let plan = build(&snapshot, Utc::now(), &settings.thresholds);
    if json {
        return serde_json::to_string_pretty(&plan).context("Failed to serialize render plan");
    }

    let collected_at = snapshot
        .as_ref()
        .ok()
        .map(|s| s.timestamp.unwrap_or_else(Utc::now));
    Ok(QuotaCard::render_text(
        &plan,
        &CardLayout::from(&settings.ui),
        &settings.data_path,
        collected_at,
    ))
}
