//! View state of one chart and the pure transitions over it.
//!
//! [`reduce`] never touches anything but its arguments. Whoever owns the
//! state (see [`crate::chart::GanttChart`]) stores the result and notifies
//! observers.

use chrono::{Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use super::layout::{self, BarLayout};
use super::task::Task;
use super::timeline::{partition, DateRange, Granularity, TimeUnit};
use super::tree;

/// Days past "today" used as the range end when there are no tasks.
pub const EMPTY_RANGE_DAYS: u64 = 30;

/// Where the time-unit strip is drawn relative to the task rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimelinePlacement {
    Top,
    #[default]
    Bottom,
}

impl TimelinePlacement {
    pub fn toggled(self) -> Self {
        match self {
            TimelinePlacement::Top => TimelinePlacement::Bottom,
            TimelinePlacement::Bottom => TimelinePlacement::Top,
        }
    }
}

/// The vertical "today" indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentMarker {
    pub enabled: bool,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    pub granularity: Granularity,
    pub visible_range: DateRange,
    pub timeline_placement: TimelinePlacement,
    pub current_marker: CurrentMarker,
}

impl ViewState {
    /// Quarter view spanning the current and the next quarter.
    pub fn new(today: NaiveDate) -> Self {
        let granularity = Granularity::Quarter;
        let later = today.checked_add_months(Months::new(3)).unwrap_or(today);
        Self {
            granularity,
            visible_range: granularity.align(DateRange::new(today, later)),
            timeline_placement: TimelinePlacement::default(),
            current_marker: CurrentMarker {
                enabled: true,
                date: today,
            },
        }
    }

    pub fn time_units(&self) -> Vec<TimeUnit> {
        partition(self.visible_range, self.granularity)
    }

    pub fn bar_layout(&self, task: &Task) -> BarLayout {
        layout::task_layout(task, self.visible_range)
    }

    /// Position of the current-date marker, if enabled and inside the range.
    pub fn marker_position(&self) -> Option<f64> {
        if !self.current_marker.enabled {
            return None;
        }
        layout::marker_position(self.current_marker.date, self.visible_range)
    }
}

#[derive(Debug, Clone, Copy)]
pub enum ViewAction<'a> {
    /// Fit the range to a (re)loaded tree, or take `range_override` verbatim.
    Load {
        tasks: &'a [Task],
        range_override: Option<DateRange>,
    },
    SetGranularity(Granularity),
    /// Replace the range verbatim, without alignment.
    SetRange(DateRange),
    RecalculateFullRange(&'a [Task]),
    ZoomIn,
    ZoomOut,
    SetTimelinePlacement(TimelinePlacement),
    SetCurrentMarker {
        enabled: bool,
        date: Option<NaiveDate>,
    },
}

/// Range covering every task in the tree (collapsed ones included), aligned
/// to `granularity`. An empty tree yields `[today, today + 30 days]`.
pub fn fit_range(tasks: &[Task], granularity: Granularity, today: NaiveDate) -> DateRange {
    let empty_end = today
        .checked_add_days(Days::new(EMPTY_RANGE_DAYS))
        .unwrap_or(today);
    let earliest = tree::earliest_start(tasks, today);
    let latest = tree::latest_end(tasks, empty_end);
    granularity.align(DateRange::new(earliest, latest))
}

fn regranulate(state: &ViewState, granularity: Granularity) -> ViewState {
    ViewState {
        granularity,
        visible_range: granularity.align(state.visible_range),
        ..state.clone()
    }
}

/// Apply `action` to `state`. `today` backs every "now" default.
pub fn reduce(state: &ViewState, action: ViewAction<'_>, today: NaiveDate) -> ViewState {
    match action {
        ViewAction::Load {
            tasks,
            range_override,
        } => ViewState {
            visible_range: range_override
                .unwrap_or_else(|| fit_range(tasks, state.granularity, today)),
            ..state.clone()
        },
        ViewAction::SetGranularity(granularity) => regranulate(state, granularity),
        ViewAction::SetRange(range) => ViewState {
            visible_range: range,
            ..state.clone()
        },
        ViewAction::RecalculateFullRange(tasks) => ViewState {
            visible_range: fit_range(tasks, state.granularity, today),
            ..state.clone()
        },
        ViewAction::ZoomIn => match state.granularity.finer() {
            Some(granularity) => regranulate(state, granularity),
            None => state.clone(),
        },
        ViewAction::ZoomOut => match state.granularity.coarser() {
            Some(granularity) => regranulate(state, granularity),
            None => state.clone(),
        },
        ViewAction::SetTimelinePlacement(placement) => ViewState {
            timeline_placement: placement,
            ..state.clone()
        },
        ViewAction::SetCurrentMarker { enabled, date } => {
            let date = match (enabled, date) {
                (_, Some(date)) => date,
                (true, None) => today,
                (false, None) => state.current_marker.date,
            };
            ViewState {
                current_marker: CurrentMarker { enabled, date },
                ..state.clone()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn today() -> NaiveDate {
        date(2025, 5, 14)
    }

    fn state(granularity: Granularity, from: NaiveDate, to: NaiveDate) -> ViewState {
        ViewState {
            granularity,
            visible_range: DateRange::new(from, to),
            ..ViewState::new(today())
        }
    }

    fn tasks() -> Vec<Task> {
        vec![
            Task::new("Alpha", date(2025, 2, 10), date(2025, 4, 2)).with_children(vec![
                Task::new("Hidden", date(2025, 1, 20), date(2025, 8, 3)),
            ]).collapsed(true),
            Task::new("Beta", date(2025, 3, 1), date(2025, 3, 9)),
        ]
    }

    #[test]
    fn test_default_state() {
        let s = ViewState::new(today());
        assert_eq!(s.granularity, Granularity::Quarter);
        assert_eq!(s.visible_range, DateRange::new(date(2025, 4, 1), date(2025, 9, 30)));
        assert_eq!(s.timeline_placement, TimelinePlacement::Bottom);
        assert_eq!(
            s.current_marker,
            CurrentMarker {
                enabled: true,
                date: today()
            }
        );
    }

    #[test]
    fn test_load_fits_whole_tree_to_granularity() {
        let tree = tasks();
        let s = state(Granularity::Month, date(2000, 1, 1), date(2000, 1, 31));
        let next = reduce(
            &s,
            ViewAction::Load {
                tasks: &tree,
                range_override: None,
            },
            today(),
        );
        assert_eq!(next.visible_range, DateRange::new(date(2025, 1, 1), date(2025, 8, 31)));
        assert_eq!(next.granularity, Granularity::Month);
    }

    #[test]
    fn test_load_override_is_taken_verbatim() {
        let tree = tasks();
        let custom = DateRange::new(date(2025, 2, 17), date(2025, 3, 3));
        let next = reduce(
            &ViewState::new(today()),
            ViewAction::Load {
                tasks: &tree,
                range_override: Some(custom),
            },
            today(),
        );
        assert_eq!(next.visible_range, custom);
    }

    #[test]
    fn test_load_empty_tree_uses_fallbacks() {
        let s = state(Granularity::Month, date(2000, 1, 1), date(2000, 1, 31));
        let next = reduce(
            &s,
            ViewAction::Load {
                tasks: &[],
                range_override: None,
            },
            today(),
        );
        // 2025-05-14 .. 2025-06-13, widened to whole months.
        assert_eq!(next.visible_range, DateRange::new(date(2025, 5, 1), date(2025, 6, 30)));
    }

    #[test]
    fn test_set_granularity_realigns_existing_range() {
        let tree = tasks();
        let s = state(Granularity::Month, date(2025, 2, 1), date(2025, 5, 31));
        let next = reduce(&s, ViewAction::SetGranularity(Granularity::Year), today());
        assert_eq!(next.granularity, Granularity::Year);
        assert_eq!(next.visible_range, DateRange::new(date(2025, 1, 1), date(2025, 12, 31)));

        // The tree is not consulted: a recalculation would give a different answer.
        let fitted = fit_range(&tree, Granularity::Month, today());
        assert_ne!(fitted, s.visible_range);
    }

    #[test]
    fn test_recalculate_keeps_granularity() {
        let tree = tasks();
        let s = state(Granularity::Quarter, date(2030, 1, 1), date(2030, 3, 31));
        let next = reduce(&s, ViewAction::RecalculateFullRange(&tree), today());
        assert_eq!(next.granularity, Granularity::Quarter);
        assert_eq!(next.visible_range, DateRange::new(date(2025, 1, 1), date(2025, 9, 30)));
    }

    #[test]
    fn test_zoom_in_from_year() {
        let s = state(Granularity::Year, date(2024, 1, 1), date(2025, 12, 31));
        let next = reduce(&s, ViewAction::ZoomIn, today());
        assert_eq!(next.granularity, Granularity::Quarter);
        assert_eq!(next.visible_range, DateRange::new(date(2024, 1, 1), date(2025, 12, 31)));
        assert_eq!(next.time_units().len(), 8);
    }

    #[test]
    fn test_zoom_in_stops_at_month() {
        let s = state(Granularity::Month, date(2025, 1, 1), date(2025, 1, 31));
        assert_eq!(reduce(&s, ViewAction::ZoomIn, today()), s);
    }

    #[test]
    fn test_zoom_out_chain() {
        let s = state(Granularity::Month, date(2025, 2, 1), date(2025, 2, 28));
        let quarter = reduce(&s, ViewAction::ZoomOut, today());
        assert_eq!(quarter.granularity, Granularity::Quarter);
        assert_eq!(quarter.visible_range, DateRange::new(date(2025, 1, 1), date(2025, 3, 31)));

        let year = reduce(&quarter, ViewAction::ZoomOut, today());
        assert_eq!(year.granularity, Granularity::Year);
        assert_eq!(year.visible_range, DateRange::new(date(2025, 1, 1), date(2025, 12, 31)));

        assert_eq!(reduce(&year, ViewAction::ZoomOut, today()), year);
    }

    #[test]
    fn test_set_range_is_verbatim() {
        let s = ViewState::new(today());
        let range = DateRange::new(date(2025, 1, 9), date(2025, 1, 19));
        let next = reduce(&s, ViewAction::SetRange(range), today());
        assert_eq!(next.visible_range, range);
        assert_eq!(next.granularity, s.granularity);
    }

    #[test]
    fn test_current_marker_defaults() {
        let s = ViewState::new(date(2020, 1, 1));
        let enabled = reduce(
            &s,
            ViewAction::SetCurrentMarker {
                enabled: true,
                date: None,
            },
            today(),
        );
        assert_eq!(enabled.current_marker.date, today());

        let disabled = reduce(
            &enabled,
            ViewAction::SetCurrentMarker {
                enabled: false,
                date: None,
            },
            date(2031, 1, 1),
        );
        assert!(!disabled.current_marker.enabled);
        assert_eq!(disabled.current_marker.date, today());
        assert_eq!(disabled.marker_position(), None);

        let explicit = reduce(
            &disabled,
            ViewAction::SetCurrentMarker {
                enabled: true,
                date: Some(date(2025, 6, 1)),
            },
            today(),
        );
        assert_eq!(explicit.current_marker.date, date(2025, 6, 1));
    }

    #[test]
    fn test_timeline_placement() {
        let s = ViewState::new(today());
        let next = reduce(
            &s,
            ViewAction::SetTimelinePlacement(TimelinePlacement::Top),
            today(),
        );
        assert_eq!(next.timeline_placement, TimelinePlacement::Top);
        assert_eq!(next.timeline_placement.toggled(), TimelinePlacement::Bottom);
    }

    #[test]
    fn test_marker_position_inside_range() {
        let s = state(Granularity::Month, date(2025, 5, 1), date(2025, 5, 31));
        let pos = s.marker_position().unwrap();
        assert!((pos - 13.0 / 30.0 * 100.0).abs() < 1e-9);
    }
}
