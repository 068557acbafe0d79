use egui::{Color32, FontId, Rounding, Stroke, Visuals};
use gantt_timeline::config::ChartColors;

// ── Fixed palette ────────────────────────────────────────────────────────────

pub const BG_HEADER: Color32 = Color32::from_rgb(249, 250, 251);
pub const BG_ROW_ODD: Color32 = Color32::from_rgb(252, 252, 253);
pub const BG_SELECTED: Color32 = Color32::from_rgba_premultiplied(59, 130, 246, 28);
pub const BORDER_SUBTLE: Color32 = Color32::from_rgb(229, 231, 235);
pub const TEXT_SECONDARY: Color32 = Color32::from_rgb(107, 114, 128);
pub const TEXT_ON_BAR: Color32 = Color32::from_rgb(255, 255, 255);
pub const ACCENT: Color32 = Color32::from_rgb(59, 130, 246);

// ── Sizes ────────────────────────────────────────────────────────────────────

pub const ROW_HEIGHT: f32 = 40.0;
pub const TIMELINE_HEIGHT: f32 = 32.0;
pub const NAME_COLUMN_WIDTH: f32 = 256.0;
pub const INDENT_PER_LEVEL: f32 = 20.0;
pub const INDENT_BASE: f32 = 8.0;
pub const BAR_ROUNDING: f32 = 4.0;
pub const BAR_INSET: f32 = 8.0;
/// Minimum pixel width of a unit column in the time strip.
pub const MIN_UNIT_WIDTH: f32 = 90.0;
/// Bars narrower than this (in percent of the range) get no progress label.
pub const PROGRESS_LABEL_MIN_PERCENT: f64 = 10.0;
pub const BAR_OPACITY: f32 = 0.8;

// ── Fonts ────────────────────────────────────────────────────────────────────

pub fn font_header() -> FontId {
    FontId::proportional(12.0)
}

pub fn font_row() -> FontId {
    FontId::proportional(13.0)
}

pub fn font_bar() -> FontId {
    FontId::proportional(11.0)
}

pub fn font_menu() -> FontId {
    FontId::proportional(13.5)
}

// ── Configurable chart colors ────────────────────────────────────────────────

/// Parse `#RRGGBB` or `#RRGGBBAA`.
pub fn parse_hex_color(s: &str) -> Result<Color32, String> {
    let hex = s.trim().trim_start_matches('#');
    if !hex.is_ascii() {
        return Err(format!("Invalid hex color '{}'", s));
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|e| e.to_string());
    match hex.len() {
        6 => Ok(Color32::from_rgb(channel(0)?, channel(2)?, channel(4)?)),
        8 => Ok(Color32::from_rgba_unmultiplied(
            channel(0)?,
            channel(2)?,
            channel(4)?,
            channel(6)?,
        )),
        _ => Err(format!("Invalid hex color '{}': expected 6 or 8 hex digits", s)),
    }
}

pub fn to_hex(color: Color32) -> String {
    format!("#{:02x}{:02x}{:02x}", color.r(), color.g(), color.b())
}

/// Colors used to paint the chart, resolved from the config.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartTheme {
    pub primary: Color32,
    pub secondary: Color32,
    pub background: Color32,
    pub text: Color32,
    pub grid: Color32,
    pub progress: Color32,
    pub milestone: Color32,
    pub current_date_line: Color32,
}

impl Default for ChartTheme {
    fn default() -> Self {
        Self::from_colors(&ChartColors::default())
    }
}

impl ChartTheme {
    /// Unparseable entries fall back to the built-in color for that slot.
    pub fn from_colors(colors: &ChartColors) -> Self {
        let defaults = ChartColors::default();
        let pick = |value: &str, fallback: &str, slot: &str| {
            parse_hex_color(value).unwrap_or_else(|e| {
                tracing::warn!(slot, error = %e, "bad color in config, using default");
                parse_hex_color(fallback).unwrap_or(Color32::GRAY)
            })
        };
        Self {
            primary: pick(&colors.primary, &defaults.primary, "primary"),
            secondary: pick(&colors.secondary, &defaults.secondary, "secondary"),
            background: pick(&colors.background, &defaults.background, "background"),
            text: pick(&colors.text, &defaults.text, "text"),
            grid: pick(&colors.grid, &defaults.grid, "grid"),
            progress: pick(&colors.progress, &defaults.progress, "progress"),
            milestone: pick(&colors.milestone, &defaults.milestone, "milestone"),
            current_date_line: pick(
                &colors.current_date_line,
                &defaults.current_date_line,
                "current_date_line",
            ),
        }
    }

    /// Bar color for a task: its own hex color if valid, else `primary`.
    pub fn bar_color(&self, task_color: Option<&str>) -> Color32 {
        task_color
            .and_then(|hex| parse_hex_color(hex).ok())
            .unwrap_or(self.primary)
            .gamma_multiply(BAR_OPACITY)
    }
}

// ── Apply custom visuals ─────────────────────────────────────────────────────

pub fn apply_theme(ctx: &egui::Context, chart: &ChartTheme) {
    let mut visuals = Visuals::light();

    visuals.override_text_color = Some(chart.text);
    visuals.panel_fill = chart.background;
    visuals.window_fill = chart.background;
    visuals.faint_bg_color = BG_ROW_ODD;

    visuals.widgets.noninteractive.bg_stroke = Stroke::new(1.0, chart.grid);
    visuals.widgets.noninteractive.fg_stroke = Stroke::new(1.0, chart.text);
    visuals.widgets.noninteractive.rounding = Rounding::same(4.0);

    visuals.widgets.inactive.bg_fill = BG_HEADER;
    visuals.widgets.inactive.weak_bg_fill = BG_HEADER;
    visuals.widgets.inactive.bg_stroke = Stroke::new(1.0, BORDER_SUBTLE);
    visuals.widgets.inactive.rounding = Rounding::same(4.0);

    visuals.widgets.hovered.bg_stroke = Stroke::new(1.0, chart.primary);
    visuals.widgets.hovered.rounding = Rounding::same(4.0);
    visuals.widgets.active.bg_stroke = Stroke::new(1.0, chart.primary);
    visuals.widgets.active.rounding = Rounding::same(4.0);

    visuals.selection.bg_fill = chart.secondary;
    visuals.selection.stroke = Stroke::new(1.0, chart.progress);

    visuals.window_rounding = Rounding::same(8.0);
    visuals.window_stroke = Stroke::new(1.0, chart.grid);

    ctx.set_visuals(visuals);

    let mut style = (*ctx.style()).clone();
    style.spacing.item_spacing = egui::vec2(8.0, 4.0);
    style.spacing.button_padding = egui::vec2(8.0, 4.0);
    ctx.set_style(style);
}
