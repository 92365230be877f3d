//! The floating quota card.

use std::path::Path;

use chrono::{DateTime, Utc};
use quotacard_core::plan::Badge;
use quotacard_core::{Meter, PlanBlock, PositionState, ProviderSection, RenderPlan, SectionBody, Tone};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Padding, Paragraph},
    Frame,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::config::UiSettings;
use crate::ui::layout;

/// Card geometry and chrome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardLayout {
    /// Total width in columns, borders included
    pub width: u16,
    /// Horizontal padding inside the border
    pub padding: u16,
    /// Whether the card can be dragged
    pub draggable: bool,
    /// Render with colors
    pub color: bool,
}

impl Default for CardLayout {
    fn default() -> Self {
        Self {
            width: 42,
            padding: 1,
            draggable: true,
            color: true,
        }
    }
}

impl From<&UiSettings> for CardLayout {
    fn from(ui: &UiSettings) -> Self {
        Self {
            width: ui.width,
            padding: ui.padding,
            draggable: ui.draggable,
            color: ui.color,
        }
    }
}

impl CardLayout {
    /// Columns available for content
    pub fn inner_width(&self) -> usize {
        usize::from(
            self.width
                .saturating_sub(2)
                .saturating_sub(self.padding.saturating_mul(2)),
        )
    }
}

/// Per-frame inputs besides the plan
#[derive(Debug, Clone, Copy)]
pub struct CardContext<'a> {
    pub layout: CardLayout,
    /// Shown in the "no data" hint
    pub data_path: &'a Path,
    /// When the snapshot was collected (title clock)
    pub collected_at: Option<DateTime<Utc>>,
    /// Draw grabbing chrome
    pub dragging: bool,
}

/// Quota card widget
pub struct QuotaCard;

impl QuotaCard {
    /// Build the content lines for a plan
    pub fn lines(plan: &RenderPlan, layout: &CardLayout, data_path: &Path) -> Vec<Line<'static>> {
        let width = layout.inner_width().max(1);
        let palette = Palette { color: layout.color };

        match plan {
            RenderPlan::Loading => vec![
                Line::from(Span::styled("⏳ Loading quota...", palette.muted())),
                Line::from(Span::styled("Waiting for data", palette.muted())),
            ],
            RenderPlan::NoData { excerpt } => {
                let mut lines = vec![Line::from(Span::styled(
                    "No data available",
                    palette.muted(),
                ))];
                let excerpt = if excerpt.is_empty() {
                    "Empty output"
                } else {
                    excerpt.as_str()
                };
                for hint in [
                    format!("Check: {}", data_path.display()),
                    format!("Debug: {}", excerpt),
                ] {
                    lines.extend(
                        wrap_chars(&hint, width)
                            .into_iter()
                            .map(|row| Line::from(Span::styled(row, palette.muted()))),
                    );
                }
                lines
            }
            RenderPlan::Ready { blocks } => {
                let mut lines = Vec::new();
                for block in blocks {
                    match block {
                        PlanBlock::Provider(section) => {
                            Self::section_lines(&mut lines, section, width, palette)
                        }
                        PlanBlock::Divider => lines.push(Line::from(Span::styled(
                            "─".repeat(width),
                            palette.muted(),
                        ))),
                    }
                }
                lines
            }
        }
    }

    /// Draw the card at `position`, clamped into `area`. Returns the drawn
    /// rectangle for hit testing.
    pub fn render(
        frame: &mut Frame,
        area: Rect,
        plan: &RenderPlan,
        position: PositionState,
        ctx: &CardContext,
    ) -> Rect {
        let lines = Self::lines(plan, &ctx.layout, ctx.data_path);
        let height = u16::try_from(lines.len())
            .unwrap_or(u16::MAX)
            .saturating_add(2);
        let rect = layout::card_area(area, position, ctx.layout.width, height);

        if rect.height < 3 || rect.width < 10 {
            return rect;
        }

        let border_style = match (ctx.dragging, ctx.layout.color) {
            (true, true) => Style::default().fg(Color::Cyan),
            (false, true) => Style::default().fg(Color::Gray),
            (_, false) => Style::default(),
        };
        let block = Block::default()
            .title(Self::build_title(ctx.collected_at))
            .borders(Borders::ALL)
            .border_type(if ctx.dragging {
                BorderType::Thick
            } else {
                BorderType::Rounded
            })
            .border_style(border_style)
            .padding(Padding::horizontal(ctx.layout.padding));

        frame.render_widget(Clear, rect);
        frame.render_widget(Paragraph::new(lines).block(block), rect);
        rect
    }

    /// Plain-text rendition (no colors, no border) for one-shot output
    pub fn render_text(
        plan: &RenderPlan,
        layout: &CardLayout,
        data_path: &Path,
        collected_at: Option<DateTime<Utc>>,
    ) -> String {
        let layout = CardLayout {
            color: false,
            ..*layout
        };
        let mut out = Self::build_title(collected_at).trim().to_string();
        out.push('\n');
        for line in Self::lines(plan, &layout, data_path) {
            let text: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
            out.push_str(text.trim_end());
            out.push('\n');
        }
        out
    }

    /// Block title with the collection time, when known
    fn build_title(collected_at: Option<DateTime<Utc>>) -> String {
        match collected_at {
            Some(at) => {
                let local = at.with_timezone(&chrono::Local);
                format!(" AI Usage ({}) ", local.format("%H:%M"))
            }
            None => " AI Usage ".to_string(),
        }
    }

    fn section_lines(
        lines: &mut Vec<Line<'static>>,
        section: &ProviderSection,
        width: usize,
        palette: Palette,
    ) {
        let title = Span::styled(
            section.provider.title().to_string(),
            palette.heading(),
        );
        let badge = section
            .badge
            .as_ref()
            .map(|Badge { text, tone }| Span::styled(text.clone(), palette.tone(*tone)));
        lines.push(justify(title, badge, width));

        match &section.body {
            SectionBody::Error { detail } => {
                lines.extend(
                    wrap_chars(detail, width)
                        .into_iter()
                        .map(|row| Line::from(Span::styled(row, palette.muted()))),
                );
            }
            SectionBody::Meters { meters } => {
                for meter in meters {
                    Self::meter_lines(lines, meter, width, palette);
                }
            }
        }
    }

    /// "Session                 12%" followed by the bar
    fn meter_lines(lines: &mut Vec<Line<'static>>, meter: &Meter, width: usize, palette: Palette) {
        let label = Span::styled(meter.label.clone(), palette.tone(meter.label_tone));
        let value = Span::styled(meter.value.clone(), palette.tone(meter.value_tone));
        lines.push(justify(label, Some(value), width));
        lines.push(bar_line(meter.fill_ratio(), width, palette.tone(meter.bar_tone), palette));
    }
}

/// Tone to style mapping; everything is unstyled when color is off
#[derive(Debug, Clone, Copy)]
struct Palette {
    color: bool,
}

impl Palette {
    fn tone(&self, tone: Tone) -> Style {
        if !self.color {
            return Style::default();
        }
        match tone {
            Tone::Plain => Style::default().fg(Color::White),
            Tone::Muted => Style::default().fg(Color::DarkGray),
            Tone::Green => Style::default().fg(Color::Rgb(48, 209, 88)),
            Tone::Orange => Style::default().fg(Color::Rgb(255, 159, 10)),
            Tone::Red => Style::default().fg(Color::Rgb(255, 69, 58)),
            Tone::Purple => Style::default().fg(Color::Rgb(167, 139, 250)),
            Tone::Blue => Style::default().fg(Color::Rgb(100, 210, 255)),
        }
    }

    fn muted(&self) -> Style {
        self.tone(Tone::Muted)
    }

    fn heading(&self) -> Style {
        if self.color {
            self.tone(Tone::Plain).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        }
    }

    fn track(&self) -> Style {
        if self.color {
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::DIM)
        } else {
            Style::default()
        }
    }
}

/// Left span, right-aligned span, at least one space between
fn justify(left: Span<'static>, right: Option<Span<'static>>, width: usize) -> Line<'static> {
    let Some(right) = right else {
        return Line::from(left);
    };
    let used = left.content.width() + right.content.width();
    let gap = width.saturating_sub(used).max(1);
    Line::from(vec![left, Span::raw(" ".repeat(gap)), right])
}

/// Bar spanning `width` cells with `floor(width * ratio)` filled
fn bar_line(ratio: f64, width: usize, fill: Style, palette: Palette) -> Line<'static> {
    let filled = ((width as f64 * ratio).floor() as usize).min(width);
    Line::from(vec![
        Span::styled("█".repeat(filled), fill),
        Span::styled("░".repeat(width - filled), palette.track()),
    ])
}

/// Break text into rows of at most `width` columns, at any character
fn wrap_chars(text: &str, width: usize) -> Vec<String> {
    let mut rows = Vec::new();
    let mut row = String::new();
    let mut row_width = 0;

    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if row_width + w > width && !row.is_empty() {
            rows.push(std::mem::take(&mut row));
            row_width = 0;
        }
        row.push(c);
        row_width += w;
    }
    if !row.is_empty() || rows.is_empty() {
        rows.push(row);
    }
    rows
}
