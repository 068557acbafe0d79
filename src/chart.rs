//! One chart instance: the task tree, its view state and the observers that
//! hear about changes to either.

use chrono::NaiveDate;
use tracing::debug;

use crate::error::Result;
use crate::io::csv_export;
use crate::model::timeline::{DateRange, Granularity, TimeUnit};
use crate::model::tree::{self, Rows};
use crate::model::view::{self, TimelinePlacement, ViewAction, ViewState};
use crate::model::{BarLayout, Task, TaskId, TaskPatch};

pub type ViewObserver = Box<dyn FnMut(&ViewState)>;
pub type TaskObserver = Box<dyn FnMut(&Task)>;

/// Initial view settings supplied together with a task set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewOptions {
    pub granularity: Option<Granularity>,
    /// Used verbatim instead of the range fitted to the tasks.
    pub range: Option<DateRange>,
    pub timeline_placement: Option<TimelinePlacement>,
    pub show_current_marker: Option<bool>,
    pub current_date: Option<NaiveDate>,
}

fn local_today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

pub struct GanttChart {
    tasks: Vec<Task>,
    view: ViewState,
    clock: fn() -> NaiveDate,
    on_view_change: Option<ViewObserver>,
    on_task_update: Option<TaskObserver>,
}

impl Default for GanttChart {
    fn default() -> Self {
        Self::new()
    }
}

impl GanttChart {
    pub fn new() -> Self {
        Self::with_clock(local_today)
    }

    /// A chart whose notion of "today" comes from `clock`.
    pub fn with_clock(clock: fn() -> NaiveDate) -> Self {
        Self {
            tasks: Vec::new(),
            view: ViewState::new(clock()),
            clock,
            on_view_change: None,
            on_task_update: None,
        }
    }

    /// Register the observer called with every new view state.
    pub fn on_view_change(&mut self, observer: impl FnMut(&ViewState) + 'static) {
        self.on_view_change = Some(Box::new(observer));
    }

    /// Register the observer called with each task changed by [`Self::update_task`].
    pub fn on_task_update(&mut self, observer: impl FnMut(&Task) + 'static) {
        self.on_task_update = Some(Box::new(observer));
    }

    // --- Reads ---

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn today(&self) -> NaiveDate {
        (self.clock)()
    }

    pub fn find_task(&self, id: &TaskId) -> Option<&Task> {
        tree::find_by_id(&self.tasks, id)
    }

    /// Displayed rows, collapsed subtrees excluded.
    pub fn rows(&self) -> Rows<'_> {
        tree::visible_rows(&self.tasks)
    }

    pub fn visible_task_count(&self) -> usize {
        self.rows().count()
    }

    pub fn total_task_count(&self) -> usize {
        tree::node_count(&self.tasks)
    }

    pub fn time_units(&self) -> Vec<TimeUnit> {
        self.view.time_units()
    }

    pub fn bar_layout(&self, task: &Task) -> BarLayout {
        self.view.bar_layout(task)
    }

    pub fn export_csv(&self) -> Result<String> {
        csv_export::export_csv_string(&self.tasks)
    }

    // --- Task set ---

    /// Replace the task set and derive a fresh view from it.
    ///
    /// Granularity is applied first so the fitted range aligns to it; an
    /// explicit `options.range` then wins over the fitted one.
    pub fn load(&mut self, tasks: Vec<Task>, options: &ViewOptions) {
        let today = self.today();
        self.tasks = tasks;

        let mut next = self.view.clone();
        if let Some(granularity) = options.granularity {
            next = view::reduce(&next, ViewAction::SetGranularity(granularity), today);
        }
        next = view::reduce(
            &next,
            ViewAction::Load {
                tasks: &self.tasks,
                range_override: options.range,
            },
            today,
        );
        if let Some(placement) = options.timeline_placement {
            next = view::reduce(&next, ViewAction::SetTimelinePlacement(placement), today);
        }
        if options.show_current_marker.is_some() || options.current_date.is_some() {
            let enabled = options
                .show_current_marker
                .unwrap_or(next.current_marker.enabled);
            next = view::reduce(
                &next,
                ViewAction::SetCurrentMarker {
                    enabled,
                    date: options.current_date,
                },
                today,
            );
        }

        debug!(
            tasks = self.tasks.len(),
            total = tree::node_count(&self.tasks),
            "task set loaded"
        );
        self.commit(next);
    }

    /// Append `task` as a new root and refit the range to include it.
    pub fn add_task(&mut self, task: Task) {
        debug!(task_id = %task.id, name = %task.name, "task added");
        self.tasks.push(task);
        self.recalculate_full_range();
    }

    /// Merge `patch` over the task with `id`. Returns `false` for an unknown id.
    pub fn update_task(&mut self, id: &TaskId, patch: &TaskPatch) -> bool {
        if tree::find_by_id(&self.tasks, id).is_none() {
            debug!(task_id = %id, "update ignored, unknown task");
            return false;
        }
        self.tasks = tree::update_by_id(&self.tasks, id, patch);

        let Some(task) = tree::find_by_id(&self.tasks, id) else {
            return false;
        };
        debug!(task_id = %id, name = %task.name, "task updated");
        if let Some(observer) = self.on_task_update.as_mut() {
            observer(task);
        }
        true
    }

    /// Flip the collapse flag of the task with `id`. Returns `false` for an unknown id.
    pub fn toggle_collapse(&mut self, id: &TaskId) -> bool {
        if tree::find_by_id(&self.tasks, id).is_none() {
            debug!(task_id = %id, "collapse toggle ignored, unknown task");
            return false;
        }
        self.tasks = tree::toggle_collapse(&self.tasks, id);
        true
    }

    // --- View transitions ---

    pub fn set_granularity(&mut self, granularity: Granularity) -> bool {
        self.dispatch(ViewAction::SetGranularity(granularity))
    }

    pub fn set_range(&mut self, range: DateRange) -> bool {
        self.dispatch(ViewAction::SetRange(range))
    }

    /// Fit the range to every task again, keeping the granularity.
    pub fn recalculate_full_range(&mut self) -> bool {
        let next = view::reduce(
            &self.view,
            ViewAction::RecalculateFullRange(&self.tasks),
            self.today(),
        );
        self.commit(next)
    }

    pub fn zoom_in(&mut self) -> bool {
        self.dispatch(ViewAction::ZoomIn)
    }

    pub fn zoom_out(&mut self) -> bool {
        self.dispatch(ViewAction::ZoomOut)
    }

    pub fn set_timeline_placement(&mut self, placement: TimelinePlacement) -> bool {
        self.dispatch(ViewAction::SetTimelinePlacement(placement))
    }

    pub fn toggle_timeline_placement(&mut self) -> bool {
        let placement = self.view.timeline_placement.toggled();
        self.set_timeline_placement(placement)
    }

    pub fn set_current_marker(&mut self, enabled: bool, date: Option<NaiveDate>) -> bool {
        self.dispatch(ViewAction::SetCurrentMarker { enabled, date })
    }

    pub fn toggle_current_marker(&mut self) -> bool {
        let marker = self.view.current_marker;
        self.set_current_marker(!marker.enabled, Some(marker.date))
    }

    fn dispatch(&mut self, action: ViewAction<'_>) -> bool {
        let next = view::reduce(&self.view, action, self.today());
        self.commit(next)
    }

    /// Store `next` and notify the observer if anything changed.
    fn commit(&mut self, next: ViewState) -> bool {
        if next == self.view {
            return false;
        }
        debug!(
            granularity = %next.granularity,
            range = %next.visible_range,
            placement = ?next.timeline_placement,
            marker = next.current_marker.enabled,
            "view state changed"
        );
        self.view = next;
        if let Some(observer) = self.on_view_change.as_mut() {
            observer(&self.view);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn fixed_today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, 14).unwrap()
    }

    fn tasks() -> Vec<Task> {
        vec![
            Task::new("Project", date(2025, 1, 6), date(2025, 6, 20))
                .with_id("p")
                .with_children(vec![
                    Task::new("Design", date(2025, 1, 6), date(2025, 2, 14)).with_id("d"),
                    Task::new("Build", date(2025, 2, 17), date(2025, 6, 20))
                        .with_id("b")
                        .collapsed(true)
                        .with_children(vec![Task::new(
                            "Backend",
                            date(2025, 2, 17),
                            date(2025, 7, 4),
                        )
                        .with_id("be")]),
                ]),
        ]
    }

    fn chart_with_log() -> (GanttChart, Rc<RefCell<Vec<ViewState>>>) {
        let mut chart = GanttChart::with_clock(fixed_today);
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        chart.on_view_change(move |state| sink.borrow_mut().push(state.clone()));
        (chart, log)
    }

    #[test]
    fn test_load_fits_range_and_notifies() {
        let (mut chart, log) = chart_with_log();
        chart.load(
            tasks(),
            &ViewOptions {
                granularity: Some(Granularity::Month),
                ..Default::default()
            },
        );

        let view = chart.view();
        assert_eq!(view.granularity, Granularity::Month);
        assert_eq!(view.visible_range, DateRange::new(date(2025, 1, 1), date(2025, 7, 31)));
        assert_eq!(log.borrow().len(), 1);
        assert_eq!(log.borrow()[0], *view);
    }

    #[test]
    fn test_load_with_explicit_range() {
        let (mut chart, _) = chart_with_log();
        let range = DateRange::new(date(2025, 3, 3), date(2025, 3, 28));
        chart.load(
            tasks(),
            &ViewOptions {
                range: Some(range),
                timeline_placement: Some(TimelinePlacement::Top),
                show_current_marker: Some(false),
                ..Default::default()
            },
        );
        assert_eq!(chart.view().visible_range, range);
        assert_eq!(chart.view().timeline_placement, TimelinePlacement::Top);
        assert!(!chart.view().current_marker.enabled);
    }

    #[test]
    fn test_noop_transitions_do_not_notify() {
        let (mut chart, log) = chart_with_log();
        chart.load(tasks(), &ViewOptions::default());
        chart.set_granularity(Granularity::Month);
        let before = log.borrow().len();

        assert!(!chart.zoom_in());
        assert!(!chart.set_granularity(Granularity::Month));
        assert_eq!(log.borrow().len(), before);

        assert!(chart.zoom_out());
        assert_eq!(log.borrow().len(), before + 1);
        assert_eq!(log.borrow().last().unwrap().granularity, Granularity::Quarter);
    }

    #[test]
    fn test_toggles_notify_with_full_snapshot() {
        let (mut chart, log) = chart_with_log();
        assert!(chart.toggle_timeline_placement());
        assert!(chart.toggle_current_marker());

        let last = log.borrow().last().cloned().unwrap();
        assert_eq!(last.timeline_placement, TimelinePlacement::Top);
        assert!(!last.current_marker.enabled);
        assert_eq!(last.current_marker.date, fixed_today());
        assert_eq!(last.granularity, chart.view().granularity);
    }

    #[test]
    fn test_update_task_notifies_with_full_task() {
        let mut chart = GanttChart::with_clock(fixed_today);
        let updates = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&updates);
        chart.on_task_update(move |task| sink.borrow_mut().push(task.clone()));
        chart.load(tasks(), &ViewOptions::default());

        let id = TaskId::from("be");
        assert!(chart.update_task(&id, &TaskPatch::new().progress(30)));

        let updates = updates.borrow();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].name, "Backend");
        assert_eq!(updates[0].progress, 30);
        assert_eq!(chart.find_task(&id).unwrap().progress, 30);
    }

    #[test]
    fn test_unknown_ids_are_ignored() {
        let mut chart = GanttChart::with_clock(fixed_today);
        let updates = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&updates);
        chart.on_task_update(move |_| *sink.borrow_mut() += 1);
        chart.load(tasks(), &ViewOptions::default());
        let before = chart.tasks().to_vec();

        assert!(!chart.update_task(&TaskId::from("ghost"), &TaskPatch::new().name("x")));
        assert!(!chart.toggle_collapse(&TaskId::from("ghost")));
        assert_eq!(chart.tasks(), before.as_slice());
        assert_eq!(*updates.borrow(), 0);
    }

    #[test]
    fn test_toggle_collapse_changes_rows_not_range() {
        let (mut chart, _) = chart_with_log();
        chart.load(tasks(), &ViewOptions::default());
        let range = chart.view().visible_range;
        assert_eq!(chart.visible_task_count(), 3);
        assert_eq!(chart.total_task_count(), 4);

        assert!(chart.toggle_collapse(&TaskId::from("b")));
        assert_eq!(chart.visible_task_count(), 4);
        assert_eq!(chart.view().visible_range, range);
    }

    #[test]
    fn test_recalculate_after_edit() {
        let (mut chart, _) = chart_with_log();
        chart.load(tasks(), &ViewOptions::default());
        chart.update_task(&TaskId::from("be"), &TaskPatch::new().end(date(2025, 11, 2)));
        assert!(chart.recalculate_full_range());
        assert_eq!(
            chart.view().visible_range,
            DateRange::new(date(2025, 1, 1), date(2025, 12, 31))
        );
    }

    #[test]
    fn test_add_task_extends_range() {
        let (mut chart, log) = chart_with_log();
        chart.load(tasks(), &ViewOptions::default());
        let before = log.borrow().len();

        chart.add_task(Task::new("Support", date(2026, 1, 5), date(2026, 2, 6)).with_id("s"));

        assert_eq!(chart.tasks().len(), 2);
        assert_eq!(chart.tasks()[1].parent_id, None);
        assert_eq!(chart.view().visible_range.to, date(2026, 3, 31));
        assert_eq!(log.borrow().len(), before + 1);
    }

    #[test]
    fn test_empty_chart_defaults() {
        let mut chart = GanttChart::with_clock(fixed_today);
        chart.load(Vec::new(), &ViewOptions::default());
        assert_eq!(
            chart.view().visible_range,
            DateRange::new(date(2025, 4, 1), date(2025, 6, 30))
        );
        assert_eq!(chart.visible_task_count(), 0);
        assert_eq!(chart.export_csv().unwrap(), "Task Name,Start Date,End Date,Progress\n");
    }

    #[test]
    fn test_toggle_current_marker_keeps_custom_date() {
        let mut chart = GanttChart::with_clock(fixed_today);
        chart.load(tasks(), &ViewOptions::default());
        let pinned = date(2025, 3, 3);
        assert!(chart.set_current_marker(true, Some(pinned)));

        assert!(chart.toggle_current_marker());
        assert!(!chart.view().current_marker.enabled);
        assert_eq!(chart.view().current_marker.date, pinned);

        assert!(chart.toggle_current_marker());
        assert!(chart.view().current_marker.enabled);
        assert_eq!(chart.view().current_marker.date, pinned);
    }

    #[test]
    fn test_set_range_keeps_bounds_verbatim() {
        let mut chart = GanttChart::with_clock(fixed_today);
        chart.load(tasks(), &ViewOptions::default());

        let range = DateRange::new(date(2025, 3, 10), date(2025, 4, 20));
        assert!(chart.set_range(range));
        assert_eq!(chart.view().visible_range, range);
        assert!(!chart.set_range(range));
    }
}
