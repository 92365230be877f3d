//! Pure display derivations: tones, countdowns and label shortening.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Semantic color of a piece of card text or a bar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    /// Inherit the card's foreground
    #[default]
    Plain,
    /// Secondary text
    Muted,
    Green,
    Orange,
    Red,
    Purple,
    Blue,
}

/// Usage percentage bands
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Lower bound (inclusive) of the orange band
    #[serde(default = "default_warning")]
    pub warning: f64,
    /// Lower bound (inclusive) of the red band
    #[serde(default = "default_critical")]
    pub critical: f64,
}

fn default_warning() -> f64 {
    70.0
}

fn default_critical() -> f64 {
    90.0
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            warning: default_warning(),
            critical: default_critical(),
        }
    }
}

impl Thresholds {
    /// Map a usage percentage to green / orange / red
    pub fn tone(&self, pct: f64) -> Tone {
        if pct >= self.critical {
            Tone::Red
        } else if pct >= self.warning {
            Tone::Orange
        } else {
            Tone::Green
        }
    }
}

/// Usage tone with the default 70/90 bands
pub fn usage_tone(pct: f64) -> Tone {
    Thresholds::default().tone(pct)
}

/// Tone for a model label: Claude models purple, GPT models orange, others blue
pub fn model_tone(label: &str) -> Tone {
    let label = label.to_lowercase();
    if label.contains("claude") {
        Tone::Purple
    } else if label.contains("gpt") {
        Tone::Orange
    } else {
        Tone::Blue
    }
}

/// Time until `reset`, relative to the current wall clock
pub fn countdown(reset: Option<DateTime<Utc>>) -> String {
    countdown_at(reset, Utc::now())
}

/// Time until `reset`, relative to `now`: `"2h5m"`, `"42m"`, `"resetting"` or `""`
pub fn countdown_at(reset: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(reset) = reset else {
        return String::new();
    };

    let delta_ms = (reset - now).num_milliseconds();
    if delta_ms <= 0 {
        return "resetting".to_string();
    }

    let hours = delta_ms / 3_600_000;
    let minutes = (delta_ms % 3_600_000) / 60_000;
    if hours > 0 {
        format!("{}h{}m", hours, minutes)
    } else {
        format!("{}m", minutes)
    }
}

/// Compact model label: "Opus (Thinking) (High)" -> "Opus ⚡ H"
pub fn shorten_label(label: &str) -> String {
    label
        .replacen(" (Thinking)", " ⚡", 1)
        .replacen("(High)", "H", 1)
        .replacen("(Low)", "L", 1)
        .replacen("(Medium)", "M", 1)
}

/// `"$X.XX/$Y"` from cent amounts
pub fn currency(used_cents: i64, limit_cents: i64) -> String {
    let used = used_cents as f64 / 100.0;
    let limit = round_half_up(limit_cents as f64 / 100.0);
    format!("${:.2}/${}", used, limit as i64)
}

/// Whole percentage, rounding halves up: 72.5 -> "73%"
pub fn format_percent(pct: f64) -> String {
    if pct.is_nan() {
        return "0%".to_string();
    }
    format!("{:.0}%", round_half_up(pct))
}

/// Number as written, without a trailing ".0" for whole values
pub fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{}", value)
    }
}

fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}
