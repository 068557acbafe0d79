use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque, stable identifier of a task.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// A fresh random id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TaskId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for TaskId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A single task or milestone. Nesting is structural: a task owns its children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub name: String,
    /// First day of the task (inclusive).
    pub start: NaiveDate,
    /// Last day of the task (inclusive). Equal to `start` for a milestone.
    pub end: NaiveDate,
    /// Percent complete, 0 to 100.
    pub progress: u8,
    /// Bar color as `#RRGGBB`; the renderer picks a default when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Back-reference for external consumers. Never used to rebuild the tree.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<TaskId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Task>,
    #[serde(default)]
    pub collapsed: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<TaskId>,
}

impl Task {
    /// Create a new task with a generated id.
    pub fn new(name: impl Into<String>, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            id: TaskId::generate(),
            name: name.into(),
            start,
            end,
            progress: 0,
            color: None,
            parent_id: None,
            children: Vec::new(),
            collapsed: false,
            dependencies: Vec::new(),
        }
    }

    /// Create a new milestone (zero-length span).
    pub fn new_milestone(name: impl Into<String>, date: NaiveDate) -> Self {
        Self::new(name, date, date)
    }

    pub fn with_id(mut self, id: impl Into<TaskId>) -> Self {
        self.id = id.into();
        for child in &mut self.children {
            child.parent_id = Some(self.id.clone());
        }
        self
    }

    pub fn with_progress(mut self, progress: u8) -> Self {
        self.progress = progress.min(100);
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn with_dependencies(mut self, dependencies: Vec<TaskId>) -> Self {
        self.dependencies = dependencies;
        self
    }

    /// Attach children, filling in their `parent_id`.
    pub fn with_children(mut self, children: Vec<Task>) -> Self {
        self.children = children
            .into_iter()
            .map(|mut child| {
                child.parent_id = Some(self.id.clone());
                child
            })
            .collect();
        self
    }

    pub fn collapsed(mut self, collapsed: bool) -> Self {
        self.collapsed = collapsed;
        self
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn is_milestone(&self) -> bool {
        self.start == self.end
    }

    /// Inclusive length in days; a milestone lasts one day.
    pub fn duration_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

/// A partial update merged over a task by id.
///
/// Every `Some` field overwrites the task's value; `None` leaves it alone.
/// `color` and `parent_id` are doubly optional so a patch can clear them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskPatch {
    pub name: Option<String>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub progress: Option<u8>,
    pub color: Option<Option<String>>,
    pub parent_id: Option<Option<TaskId>>,
    pub collapsed: Option<bool>,
    pub dependencies: Option<Vec<TaskId>>,
}

impl TaskPatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// A patch carrying every scalar field of `task` (children are untouched).
    pub fn from_task(task: &Task) -> Self {
        Self {
            name: Some(task.name.clone()),
            start: Some(task.start),
            end: Some(task.end),
            progress: Some(task.progress.min(100)),
            color: Some(task.color.clone()),
            parent_id: Some(task.parent_id.clone()),
            collapsed: Some(task.collapsed),
            dependencies: Some(task.dependencies.clone()),
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn start(mut self, start: NaiveDate) -> Self {
        self.start = Some(start);
        self
    }

    pub fn end(mut self, end: NaiveDate) -> Self {
        self.end = Some(end);
        self
    }

    pub fn progress(mut self, progress: u8) -> Self {
        self.progress = Some(progress.min(100));
        self
    }

    pub fn color(mut self, color: Option<String>) -> Self {
        self.color = Some(color);
        self
    }

    pub fn parent_id(mut self, parent_id: Option<TaskId>) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    pub fn collapsed(mut self, collapsed: bool) -> Self {
        self.collapsed = Some(collapsed);
        self
    }

    pub fn dependencies(mut self, dependencies: Vec<TaskId>) -> Self {
        self.dependencies = Some(dependencies);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Merge this patch over `task` in place.
    pub fn apply_to(&self, task: &mut Task) {
        if let Some(name) = &self.name {
            task.name = name.clone();
        }
        if let Some(start) = self.start {
            task.start = start;
        }
        if let Some(end) = self.end {
            task.end = end;
        }
        if let Some(progress) = self.progress {
            task.progress = progress.min(100);
        }
        if let Some(color) = &self.color {
            task.color = color.clone();
        }
        if let Some(parent_id) = &self.parent_id {
            task.parent_id = parent_id.clone();
        }
        if let Some(collapsed) = self.collapsed {
            task.collapsed = collapsed;
        }
        if let Some(dependencies) = &self.dependencies {
            task.dependencies = dependencies.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_with_children_sets_parent_ids() {
        let parent = Task::new("Parent", date(2025, 1, 1), date(2025, 2, 1))
            .with_id("p")
            .with_children(vec![
                Task::new("A", date(2025, 1, 1), date(2025, 1, 10)),
                Task::new("B", date(2025, 1, 11), date(2025, 2, 1)),
            ]);

        assert!(parent
            .children
            .iter()
            .all(|c| c.parent_id == Some(TaskId::from("p"))));
        assert!(!parent.is_leaf());
    }

    #[test]
    fn test_with_id_after_children_keeps_back_references() {
        let parent = Task::new("Parent", date(2025, 1, 1), date(2025, 2, 1))
            .with_children(vec![Task::new("A", date(2025, 1, 1), date(2025, 1, 10))])
            .with_id("root");

        assert_eq!(parent.children[0].parent_id, Some(TaskId::from("root")));
    }

    #[test]
    fn test_milestone_and_duration() {
        let milestone = Task::new_milestone("Launch", date(2025, 3, 1));
        assert!(milestone.is_milestone());
        assert_eq!(milestone.duration_days(), 1);

        let task = Task::new("Build", date(2025, 3, 1), date(2025, 3, 10));
        assert!(!task.is_milestone());
        assert_eq!(task.duration_days(), 10);
    }

    #[test]
    fn test_progress_is_clamped() {
        let task = Task::new("T", date(2025, 1, 1), date(2025, 1, 2)).with_progress(250);
        assert_eq!(task.progress, 100);

        let patch = TaskPatch::new().progress(120);
        assert_eq!(patch.progress, Some(100));

        let mut task = task;
        let raw = TaskPatch {
            progress: Some(200),
            ..Default::default()
        };
        raw.apply_to(&mut task);
        assert_eq!(task.progress, 100);
    }

    #[test]
    fn test_patch_only_touches_given_fields() {
        let mut task = Task::new("Design", date(2025, 1, 1), date(2025, 1, 31))
            .with_id("t1")
            .with_color("#3b82f6")
            .with_progress(10);
        let before = task.clone();

        TaskPatch::new().name("Design v2").progress(40).apply_to(&mut task);

        assert_eq!(task.name, "Design v2");
        assert_eq!(task.progress, 40);
        assert_eq!(task.start, before.start);
        assert_eq!(task.end, before.end);
        assert_eq!(task.color, before.color);
        assert_eq!(task.id, before.id);
    }

    #[test]
    fn test_patch_can_clear_color() {
        let mut task = Task::new("T", date(2025, 1, 1), date(2025, 1, 2)).with_color("#ff0000");
        TaskPatch::new().color(None).apply_to(&mut task);
        assert_eq!(task.color, None);
    }

    #[test]
    fn test_patch_from_task_copies_scalars() {
        let source = Task::new("Source", date(2025, 4, 1), date(2025, 4, 9))
            .with_progress(75)
            .with_color("#10b981")
            .collapsed(true);
        let mut target = Task::new("Target", date(2024, 1, 1), date(2024, 1, 2));

        TaskPatch::from_task(&source).apply_to(&mut target);

        assert_eq!(target.name, "Source");
        assert_eq!(target.start, source.start);
        assert_eq!(target.end, source.end);
        assert_eq!(target.progress, 75);
        assert_eq!(target.color.as_deref(), Some("#10b981"));
        assert!(target.collapsed);
        assert_ne!(target.id, source.id);
    }

    #[test]
    fn test_empty_patch() {
        assert!(TaskPatch::new().is_empty());
        assert!(!TaskPatch::new().collapsed(false).is_empty());
    }

    #[test]
    fn test_generated_ids_are_unique() {
        assert_ne!(TaskId::generate(), TaskId::generate());
    }
}
