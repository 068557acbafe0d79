//! Maps dates onto percentages of the visible range.

use chrono::NaiveDate;
use serde::Serialize;

use super::task::Task;
use super::timeline::DateRange;

/// Horizontal placement of a bar, as percentages of the visible range width.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct BarLayout {
    pub left_percent: f64,
    pub width_percent: f64,
}

impl BarLayout {
    pub fn right_percent(&self) -> f64 {
        self.left_percent + self.width_percent
    }

    /// Width of the progress fill, measured against the (clipped) bar itself.
    pub fn progress_width_percent(&self, progress: u8) -> f64 {
        self.width_percent * f64::from(progress.min(100)) / 100.0
    }

    /// Whether any part of the bar falls inside the visible range.
    pub fn is_visible(&self) -> bool {
        self.width_percent > 0.0 && self.left_percent < 100.0 && self.right_percent() > 0.0
    }
}

/// Unclipped position of `date` within `range`, in percent.
pub fn date_position(date: NaiveDate, range: DateRange) -> f64 {
    let span = range.span_days();
    if span <= 0 {
        return 0.0;
    }
    (date - range.from).num_days() as f64 / span as f64 * 100.0
}

/// Place the span `[start, end]` inside `range`, clipping it to the range first.
///
/// A span lying completely outside the range is not rejected: the result can
/// then have a negative width or sit beyond 100%, and it is up to the renderer
/// whether to draw it.
pub fn bar_layout(start: NaiveDate, end: NaiveDate, range: DateRange) -> BarLayout {
    let span = range.span_days();
    if span <= 0 {
        tracing::warn!(%range, "degenerate visible range, bar layout collapsed to zero");
        return BarLayout::default();
    }

    let clipped_start = start.max(range.from);
    let clipped_end = end.min(range.to);
    let span = span as f64;

    BarLayout {
        left_percent: (clipped_start - range.from).num_days() as f64 / span * 100.0,
        width_percent: (clipped_end - clipped_start).num_days() as f64 / span * 100.0,
    }
}

pub fn task_layout(task: &Task, range: DateRange) -> BarLayout {
    bar_layout(task.start, task.end, range)
}

/// Position of a marker date, or `None` when it falls outside `range`.
pub fn marker_position(date: NaiveDate, range: DateRange) -> Option<f64> {
    range.contains(date).then(|| date_position(date, range))
}
