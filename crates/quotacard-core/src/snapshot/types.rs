//! Snapshot data types as written by the quota collector.
//!
//! Every attribute is optional: the collector emits partial data while it is
//! still bootstrapping, and defaults are applied by the plan builder, not here.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::lenient;

/// Root of a quota snapshot (`quota_data.json`)
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct QuotaSnapshot {
    /// Claude Code usage (OAuth usage API)
    #[serde(default, deserialize_with = "lenient::object")]
    pub claude: Option<ClaudeUsage>,
    /// Antigravity usage (local language server)
    #[serde(default, deserialize_with = "lenient::object")]
    pub antigravity: Option<AntigravityUsage>,
    /// When the collector wrote this snapshot
    #[serde(default, deserialize_with = "lenient::timestamp")]
    pub timestamp: Option<DateTime<Utc>>,
    /// Start of the raw text, kept for diagnosing an empty-looking snapshot
    #[serde(skip)]
    pub excerpt: String,
}

impl QuotaSnapshot {
    /// True when neither provider is present
    pub fn is_empty(&self) -> bool {
        self.claude.is_none() && self.antigravity.is_none()
    }
}

/// Claude Code usage block
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ClaudeUsage {
    /// Short error reported by the collector; other fields are advisory when set
    #[serde(default, deserialize_with = "lenient::message")]
    pub error: Option<String>,
    /// Human-readable explanation for `error`
    #[serde(default, deserialize_with = "lenient::message")]
    pub detail: Option<String>,
    /// 5-hour session window
    #[serde(default, deserialize_with = "lenient::object")]
    pub session: Option<UsageWindow>,
    /// 7-day window (all models)
    #[serde(default, deserialize_with = "lenient::object")]
    pub weekly: Option<UsageWindow>,
    /// 7-day window for Sonnet only
    #[serde(default, deserialize_with = "lenient::object")]
    pub seven_day_sonnet: Option<UsageWindow>,
    /// 7-day window for Opus only
    #[serde(default, deserialize_with = "lenient::object")]
    pub seven_day_opus: Option<UsageWindow>,
    /// Paid overage usage
    #[serde(default, deserialize_with = "lenient::object")]
    pub extra_usage: Option<ExtraUsage>,
}

/// A rate-limit window
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UsageWindow {
    /// Percentage used (may exceed 100)
    #[serde(default, deserialize_with = "lenient::number")]
    pub pct_used: Option<f64>,
    /// When the window resets
    #[serde(default, deserialize_with = "lenient::timestamp")]
    pub resets_at: Option<DateTime<Utc>>,
}

/// Extra (paid) usage in cents
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ExtraUsage {
    #[serde(default, deserialize_with = "lenient::integer")]
    pub used_cents: Option<i64>,
    #[serde(default, deserialize_with = "lenient::integer")]
    pub limit_cents: Option<i64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub pct_used: Option<f64>,
}

/// Antigravity usage block
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AntigravityUsage {
    #[serde(default, deserialize_with = "lenient::message")]
    pub error: Option<String>,
    #[serde(default, deserialize_with = "lenient::message")]
    pub detail: Option<String>,
    /// Account email
    #[serde(default, deserialize_with = "lenient::string")]
    pub email: Option<String>,
    /// Plan name (e.g. "Pro")
    #[serde(default, deserialize_with = "lenient::string")]
    pub plan: Option<String>,
    /// Prompt credits still available
    #[serde(default, deserialize_with = "lenient::integer")]
    pub prompt_credits: Option<i64>,
    /// Monthly prompt credit allowance (fractions kept for the `> 0` check)
    #[serde(default, deserialize_with = "lenient::number")]
    pub prompt_credits_monthly: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub prompt_credits_used_pct: Option<f64>,
    /// Per-model quotas in display order
    #[serde(default, deserialize_with = "lenient::sequence")]
    pub models: Vec<ModelUsage>,
}

/// Quota for a single model
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ModelUsage {
    #[serde(default = "default_model_label", deserialize_with = "lenient::label")]
    pub label: String,
    #[serde(default, deserialize_with = "lenient::number")]
    pub pct_used: Option<f64>,
    #[serde(default, deserialize_with = "lenient::timestamp")]
    pub reset_time: Option<DateTime<Utc>>,
}

fn default_model_label() -> String {
    "Unknown".to_string()
}

impl Default for ModelUsage {
    fn default() -> Self {
        Self {
            label: default_model_label(),
            pct_used: None,
            reset_time: None,
        }
    }
}
