//! Render plan types: what the card shows, independent of how it is drawn.

use serde::Serialize;

use crate::derive::Tone;

/// Complete description of one card render
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RenderPlan {
    /// No usable snapshot yet (missing, empty or malformed input)
    Loading,
    /// Snapshot parsed but neither provider is present
    NoData {
        /// Start of the raw snapshot text
        excerpt: String,
    },
    /// Provider sections in display order
    Ready { blocks: Vec<PlanBlock> },
}

impl RenderPlan {
    /// Blocks to draw (empty for the loading / no-data states)
    pub fn blocks(&self) -> &[PlanBlock] {
        match self {
            RenderPlan::Ready { blocks } => blocks,
            RenderPlan::Loading | RenderPlan::NoData { .. } => &[],
        }
    }

    /// Find the section for a provider
    pub fn section(&self, provider: Provider) -> Option<&ProviderSection> {
        self.blocks().iter().find_map(|block| match block {
            PlanBlock::Provider(section) if section.provider == provider => Some(section),
            _ => None,
        })
    }

    /// Whether a divider separates the provider sections
    pub fn has_divider(&self) -> bool {
        self.blocks()
            .iter()
            .any(|block| matches!(block, PlanBlock::Divider))
    }
}

/// One entry of a ready plan
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlanBlock {
    Provider(ProviderSection),
    Divider,
}

/// Quota provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Provider {
    Claude,
    Antigravity,
}

impl Provider {
    /// Section heading
    pub fn title(&self) -> &'static str {
        match self {
            Provider::Claude => "💜 Claude Code",
            Provider::Antigravity => "🔮 Antigravity",
        }
    }
}

/// Section for a single provider
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderSection {
    pub provider: Provider,
    /// Right-aligned text next to the heading
    pub badge: Option<Badge>,
    pub body: SectionBody,
}

/// Short text shown beside a section heading
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Badge {
    pub text: String,
    pub tone: Tone,
}

/// Section contents
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SectionBody {
    /// Provider reported an error; no meters are shown
    Error { detail: String },
    /// Label/value rows, each with a bar
    Meters { meters: Vec<Meter> },
}

/// A label/value row followed by a percentage bar
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Meter {
    pub label: String,
    pub label_tone: Tone,
    pub value: String,
    pub value_tone: Tone,
    /// True percentage (may exceed 100)
    pub pct: f64,
    pub bar_tone: Tone,
}

impl Meter {
    /// Bar fill in `0.0..=1.0`; values above 100% fill the bar completely
    pub fn fill_ratio(&self) -> f64 {
        if self.pct.is_nan() {
            return 0.0;
        }
        self.pct.clamp(0.0, 100.0) / 100.0
    }
}
