//! Build a [`RenderPlan`] from a parsed snapshot.
//!
//! All defaulting of optional snapshot fields happens here.

use chrono::{DateTime, Utc};

use super::types::{Badge, Meter, PlanBlock, Provider, ProviderSection, RenderPlan, SectionBody};
use crate::derive::{
    countdown_at, currency, format_number, format_percent, model_tone, shorten_label, Thresholds,
    Tone,
};
use crate::snapshot::{AntigravityUsage, ClaudeUsage, ParseFailure, QuotaSnapshot, UsageWindow};

/// Detail shown when Claude reports an error without one
const CLAUDE_ERROR_DETAIL: &str = "Authentication failed";
/// Detail shown when Antigravity reports an error without one
const ANTIGRAVITY_ERROR_DETAIL: &str = "Client error";

/// Build the plan for one render.
///
/// `now` drives the reset countdowns; pass the current time on every render.
/// The result depends only on the arguments.
pub fn build(
    input: &Result<QuotaSnapshot, ParseFailure>,
    now: DateTime<Utc>,
    thresholds: &Thresholds,
) -> RenderPlan {
    let snapshot = match input {
        Ok(snapshot) => snapshot,
        Err(e) => {
            tracing::trace!("No snapshot, showing loading state: {}", e);
            return RenderPlan::Loading;
        }
    };

    if snapshot.is_empty() {
        return RenderPlan::NoData {
            excerpt: snapshot.excerpt.clone(),
        };
    }

    let mut blocks = Vec::with_capacity(3);
    if let Some(claude) = &snapshot.claude {
        blocks.push(PlanBlock::Provider(claude_section(claude, now, thresholds)));
    }
    if let Some(antigravity) = &snapshot.antigravity {
        if !blocks.is_empty() {
            blocks.push(PlanBlock::Divider);
        }
        blocks.push(PlanBlock::Provider(antigravity_section(
            antigravity,
            now,
            thresholds,
        )));
    }

    RenderPlan::Ready { blocks }
}

fn claude_section(
    usage: &ClaudeUsage,
    now: DateTime<Utc>,
    thresholds: &Thresholds,
) -> ProviderSection {
    if let Some(error) = &usage.error {
        return error_section(
            Provider::Claude,
            error,
            usage.detail.as_deref().unwrap_or(CLAUDE_ERROR_DETAIL),
        );
    }

    let session = window_pct(usage.session.as_ref());
    let weekly = window_pct(usage.weekly.as_ref());

    let mut meters = vec![
        usage_meter("Session", format_percent(session), session, thresholds),
        window_meter("Weekly", usage.weekly.as_ref(), now, thresholds),
    ];

    for (label, window) in [
        ("Sonnet", usage.seven_day_sonnet.as_ref()),
        ("Opus", usage.seven_day_opus.as_ref()),
    ] {
        if window.is_some() {
            meters.push(window_meter(label, window, now, thresholds));
        }
    }

    if let Some(extra) = &usage.extra_usage {
        meters.push(Meter {
            label: "Extra".to_string(),
            label_tone: Tone::Plain,
            value: currency(
                extra.used_cents.unwrap_or(0),
                extra.limit_cents.unwrap_or(0),
            ),
            value_tone: Tone::Blue,
            pct: extra.pct_used.unwrap_or(0.0),
            bar_tone: Tone::Blue,
        });
    }

    ProviderSection {
        provider: Provider::Claude,
        badge: Some(Badge {
            text: format!("Weekly {}", format_percent(weekly)),
            tone: Tone::Purple,
        }),
        body: SectionBody::Meters { meters },
    }
}

fn antigravity_section(
    usage: &AntigravityUsage,
    now: DateTime<Utc>,
    thresholds: &Thresholds,
) -> ProviderSection {
    if let Some(error) = &usage.error {
        return error_section(
            Provider::Antigravity,
            error,
            usage.detail.as_deref().unwrap_or(ANTIGRAVITY_ERROR_DETAIL),
        );
    }

    let mut meters = Vec::with_capacity(usage.models.len() + 1);

    let monthly = usage.prompt_credits_monthly.unwrap_or(0.0);
    if monthly > 0.0 {
        let used_pct = usage.prompt_credits_used_pct.unwrap_or(0.0);
        meters.push(Meter {
            label: "Prompt Credits".to_string(),
            label_tone: Tone::Plain,
            value: format!(
                "{} / {}",
                usage.prompt_credits.unwrap_or(0),
                format_number(monthly)
            ),
            value_tone: thresholds.tone(used_pct),
            pct: used_pct,
            bar_tone: Tone::Blue,
        });
    }

    // Provider order is display order; no sorting or dedup
    for model in &usage.models {
        let pct = model.pct_used.unwrap_or(0.0);
        let tone = model_tone(&model.label);
        meters.push(Meter {
            label: shorten_label(&model.label),
            label_tone: tone,
            value: with_countdown(
                format!("{}%", format_number(pct)),
                countdown_at(model.reset_time, now),
            ),
            value_tone: thresholds.tone(pct),
            pct,
            bar_tone: tone,
        });
    }

    let account: Vec<&str> = [usage.email.as_deref(), usage.plan.as_deref()]
        .into_iter()
        .flatten()
        .collect();
    let badge = (!account.is_empty()).then(|| Badge {
        text: account.join(" · "),
        tone: Tone::Muted,
    });

    ProviderSection {
        provider: Provider::Antigravity,
        badge,
        body: SectionBody::Meters { meters },
    }
}

fn error_section(provider: Provider, error: &str, detail: &str) -> ProviderSection {
    ProviderSection {
        provider,
        badge: Some(Badge {
            text: format!("⚠️ {}", error),
            tone: Tone::Red,
        }),
        body: SectionBody::Error {
            detail: detail.to_string(),
        },
    }
}

fn window_pct(window: Option<&UsageWindow>) -> f64 {
    window.and_then(|w| w.pct_used).unwrap_or(0.0)
}

/// "40% · 2h0m" row for a reset window
fn window_meter(
    label: &str,
    window: Option<&UsageWindow>,
    now: DateTime<Utc>,
    thresholds: &Thresholds,
) -> Meter {
    let pct = window_pct(window);
    let reset = window.and_then(|w| w.resets_at);
    usage_meter(
        label,
        with_countdown(format_percent(pct), countdown_at(reset, now)),
        pct,
        thresholds,
    )
}

fn usage_meter(label: &str, value: String, pct: f64, thresholds: &Thresholds) -> Meter {
    let tone = thresholds.tone(pct);
    Meter {
        label: label.to_string(),
        label_tone: Tone::Plain,
        value,
        value_tone: tone,
        pct,
        bar_tone: tone,
    }
}

fn with_countdown(value: String, countdown: String) -> String {
    if countdown.is_empty() {
        value
    } else {
        format!("{} · {}", value, countdown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use pretty_assertions::assert_eq;

    use crate::snapshot::parse;

    fn build_now(raw: &str, now: DateTime<Utc>) -> RenderPlan {
        build(&parse(raw), now, &Thresholds::default())
    }

    fn meters(section: &ProviderSection) -> &[Meter] {
        match &section.body {
            SectionBody::Meters { meters } => meters,
            SectionBody::Error { .. } => panic!("expected meters, got error body"),
        }
    }

    #[test]
    fn test_loading_plan() {
        let now = Utc::now();
        assert_eq!(build_now("", now), RenderPlan::Loading);
        assert_eq!(build_now("not json", now), RenderPlan::Loading);
        assert_eq!(build_now("[1, 2]", now), RenderPlan::Loading);
        assert!(RenderPlan::Loading.blocks().is_empty());
    }

    #[test]
    fn test_no_data_plan() {
        let now = Utc::now();
        assert_eq!(
            build_now("{}", now),
            RenderPlan::NoData {
                excerpt: "{}".to_string()
            }
        );
        assert_eq!(
            build_now(r#"{"claude": null, "gemini": null}"#, now),
            RenderPlan::NoData {
                excerpt: r#"{"claude": null, "gemini": null}"#.to_string()
            }
        );
    }

    #[test]
    fn test_claude_session_and_weekly() {
        let now = Utc::now();
        let resets_at = (now + Duration::hours(2)).to_rfc3339();
        let raw = format!(
            r#"{{"claude": {{"session": {{"pct_used": 95}}, "weekly": {{"pct_used": 40, "resets_at": "{}"}}}}}}"#,
            resets_at
        );

        let plan = build_now(&raw, now);
        let section = plan.section(Provider::Claude).unwrap();
        assert_eq!(
            section.badge,
            Some(Badge {
                text: "Weekly 40%".to_string(),
                tone: Tone::Purple,
            })
        );

        let meters = meters(section);
        assert_eq!(meters.len(), 2);
        assert_eq!(meters[0].label, "Session");
        assert_eq!(meters[0].value, "95%");
        assert_eq!(meters[0].value_tone, Tone::Red);
        assert_eq!(meters[0].bar_tone, Tone::Red);
        assert_eq!(meters[1].label, "Weekly");
        assert_eq!(meters[1].value, "40% · 2h0m");
        assert_eq!(meters[1].value_tone, Tone::Green);
        assert!(!plan.has_divider());
    }

    #[test]
    fn test_claude_defaults_missing_windows_to_zero() {
        let plan = build_now(r#"{"claude": {}}"#, Utc::now());
        let meters = meters(plan.section(Provider::Claude).unwrap());
        assert_eq!(meters.len(), 2);
        assert_eq!(meters[0].value, "0%");
        assert_eq!(meters[1].value, "0%");
        assert_eq!(meters[1].pct, 0.0);
    }

    #[test]
    fn test_claude_extra_and_model_windows() {
        let raw = r#"{"claude": {
            "session": {"pct_used": 10},
            "weekly": {"pct_used": 72.5},
            "seven_day_opus": {"pct_used": 140},
            "extra_usage": {"used_cents": 2222, "limit_cents": 5000, "pct_used": 44.4}
        }}"#;
        let plan = build_now(raw, Utc::now());
        let meters = meters(plan.section(Provider::Claude).unwrap());

        let labels: Vec<&str> = meters.iter().map(|m| m.label.as_str()).collect();
        assert_eq!(labels, vec!["Session", "Weekly", "Opus", "Extra"]);
        assert_eq!(meters[1].value, "73%");
        assert_eq!(meters[1].value_tone, Tone::Orange);
        assert_eq!(meters[2].value, "140%");
        assert_eq!(meters[2].fill_ratio(), 1.0);
        assert_eq!(meters[3].value, "$22.22/$50");
        assert_eq!(meters[3].value_tone, Tone::Blue);
        assert_eq!(meters[3].pct, 44.4);
    }

    #[test]
    fn test_claude_error_section() {
        let plan = build_now(r#"{"claude": {"error": "Token expired"}}"#, Utc::now());
        let section = plan.section(Provider::Claude).unwrap();
        assert_eq!(section.badge.as_ref().unwrap().text, "⚠️ Token expired");
        assert_eq!(section.badge.as_ref().unwrap().tone, Tone::Red);
        assert_eq!(
            section.body,
            SectionBody::Error {
                detail: "Authentication failed".to_string()
            }
        );

        let plan = build_now(
            r#"{"claude": {"error": "HTTP 401", "detail": "Run claude login", "session": {"pct_used": 50}}}"#,
            Utc::now(),
        );
        assert_eq!(
            plan.section(Provider::Claude).unwrap().body,
            SectionBody::Error {
                detail: "Run claude login".to_string()
            }
        );
    }

    #[test]
    fn test_antigravity_error_does_not_affect_claude() {
        let raw = r#"{
            "claude": {"session": {"pct_used": 20}},
            "antigravity": {"error": "Not running"}
        }"#;
        let plan = build_now(raw, Utc::now());

        assert_eq!(meters(plan.section(Provider::Claude).unwrap()).len(), 2);
        assert_eq!(
            plan.section(Provider::Antigravity).unwrap().body,
            SectionBody::Error {
                detail: "Client error".to_string()
            }
        );
        assert!(plan.has_divider());
    }

    #[test]
    fn test_divider_between_providers() {
        let raw = r#"{"claude": {}, "antigravity": {}}"#;
        let plan = build_now(raw, Utc::now());
        let kinds: Vec<bool> = plan
            .blocks()
            .iter()
            .map(|b| matches!(b, PlanBlock::Divider))
            .collect();
        assert_eq!(kinds, vec![false, true, false]);

        let plan = build_now(r#"{"antigravity": {}}"#, Utc::now());
        assert_eq!(plan.blocks().len(), 1);
        assert!(!plan.has_divider());
    }

    #[test]
    fn test_antigravity_models_keep_order() {
        let now = Utc::now();
        let reset = (now + Duration::minutes(42)).to_rfc3339();
        let raw = format!(
            r#"{{"antigravity": {{
                "email": "dev@example.com",
                "plan": "Pro",
                "models": [
                    {{"label": "Gemini 3 Pro (High)", "pct_used": 33.3, "reset_time": "{reset}"}},
                    {{"label": "Claude Opus 4.5 (Thinking)", "pct_used": 95}},
                    {{"label": "Gemini 3 Pro (High)", "pct_used": 33.3, "reset_time": "{reset}"}},
                    {{"label": "GPT-OSS 120B (Medium)", "pct_used": 75}}
                ]
            }}}}"#
        );

        let plan = build_now(&raw, now);
        let section = plan.section(Provider::Antigravity).unwrap();
        assert_eq!(section.badge.as_ref().unwrap().text, "dev@example.com · Pro");
        assert_eq!(section.badge.as_ref().unwrap().tone, Tone::Muted);

        let meters = meters(section);
        assert_eq!(meters.len(), 4);
        assert_eq!(meters[0].label, "Gemini 3 Pro H");
        assert_eq!(meters[0].label_tone, Tone::Blue);
        assert_eq!(meters[0].value, "33.3% · 42m");
        assert_eq!(meters[0].value_tone, Tone::Green);
        assert_eq!(meters[1].label, "Claude Opus 4.5 ⚡");
        assert_eq!(meters[1].label_tone, Tone::Purple);
        assert_eq!(meters[1].bar_tone, Tone::Purple);
        assert_eq!(meters[1].value, "95%");
        assert_eq!(meters[1].value_tone, Tone::Red);
        assert_eq!(meters[2], meters[0]);
        assert_eq!(meters[3].label, "GPT-OSS 120B M");
        assert_eq!(meters[3].label_tone, Tone::Orange);
        assert_eq!(meters[3].value_tone, Tone::Orange);
    }

    #[test]
    fn test_prompt_credits_row() {
        let raw = r#"{"antigravity": {
            "prompt_credits": 120,
            "prompt_credits_monthly": 500,
            "prompt_credits_used_pct": 76,
            "models": []
        }}"#;
        let plan = build_now(raw, Utc::now());
        let section = plan.section(Provider::Antigravity).unwrap();
        assert!(section.badge.is_none());

        let rows = meters(section);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].label, "Prompt Credits");
        assert_eq!(rows[0].value, "120 / 500");
        assert_eq!(rows[0].value_tone, Tone::Orange);
        assert_eq!(rows[0].bar_tone, Tone::Blue);

        let plan = build_now(
            r#"{"antigravity": {"prompt_credits": 120, "prompt_credits_monthly": 0}}"#,
            Utc::now(),
        );
        assert!(meters(plan.section(Provider::Antigravity).unwrap()).is_empty());
    }

    #[test]
    fn test_fractional_monthly_allowance_shows_credits() {
        let plan = build_now(
            r#"{"antigravity": {"prompt_credits": 0, "prompt_credits_monthly": 0.4}}"#,
            Utc::now(),
        );
        let rows = meters(plan.section(Provider::Antigravity).unwrap());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].value, "0 / 0.4");
    }

    #[test]
    fn test_falsy_error_keeps_meters() {
        let plan = build_now(
            r#"{"claude": {"error": 0, "session": {"pct_used": 50}}}"#,
            Utc::now(),
        );
        let section = plan.section(Provider::Claude).unwrap();
        assert_eq!(meters(section)[0].value, "50%");
        assert_eq!(section.badge.as_ref().unwrap().text, "Weekly 0%");
    }

    #[test]
    fn test_non_string_error_shows_error_panel() {
        let plan = build_now(
            r#"{"claude": {"error": true, "session": {"pct_used": 50}}}"#,
            Utc::now(),
        );
        let section = plan.section(Provider::Claude).unwrap();
        assert_eq!(section.badge.as_ref().unwrap().text, "⚠️ true");
        assert_eq!(
            section.body,
            SectionBody::Error {
                detail: "Authentication failed".to_string()
            }
        );
    }

    #[test]
    fn test_build_is_deterministic() {
        let now = Utc::now();
        let raw = r#"{"claude": {"weekly": {"pct_used": 12, "resets_at": "2030-01-01T00:00:00Z"}},
                      "antigravity": {"models": [{"label": "A", "pct_used": 1}]}}"#;
        assert_eq!(build_now(raw, now), build_now(raw, now));
    }

    #[test]
    fn test_plan_serializes() {
        let plan = build_now(r#"{"claude": {}, "antigravity": {}}"#, Utc::now());
        let value = serde_json::to_value(&plan).unwrap();
        assert_eq!(value["state"], "ready");
        assert_eq!(value["blocks"][0]["kind"], "provider");
        assert_eq!(value["blocks"][0]["provider"], "claude");
        assert_eq!(value["blocks"][1]["kind"], "divider");

        let value = serde_json::to_value(RenderPlan::Loading).unwrap();
        assert_eq!(value["state"], "loading");

        let value = serde_json::to_value(build_now("{}", Utc::now())).unwrap();
        assert_eq!(value["state"], "no_data");
        assert_eq!(value["excerpt"], "{}");
    }
}
