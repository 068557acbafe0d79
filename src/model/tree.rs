//! Traversal, lookup and copy-on-write updates over a task tree.
//!
//! Two traversal modes exist and are kept separate on purpose:
//! [`flatten`] / [`visible_rows`] skip the children of collapsed tasks, while
//! every other function here ([`all_tasks`], [`earliest_start`],
//! [`latest_end`], [`find_by_id`], [`update_by_id`], [`toggle_collapse`])
//! sees the entire tree. Range fitting and editing must reach hidden tasks;
//! display must not.

use std::slice;

use chrono::NaiveDate;

use super::task::{Task, TaskId, TaskPatch};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Traversal {
    /// Descend only into tasks that are not collapsed.
    Visible,
    /// Descend into every task.
    All,
}

/// One displayed row: a task and its nesting depth (roots are depth 0).
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    pub task: &'a Task,
    pub depth: usize,
}

/// Lazy depth-first, pre-order walk over a task forest.
#[derive(Debug, Clone)]
pub struct Rows<'a> {
    stack: Vec<(slice::Iter<'a, Task>, usize)>,
    mode: Traversal,
}

impl<'a> Rows<'a> {
    fn new(tasks: &'a [Task], mode: Traversal) -> Self {
        Self {
            stack: vec![(tasks.iter(), 0)],
            mode,
        }
    }
}

impl<'a> Iterator for Rows<'a> {
    type Item = Row<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (iter, depth) = self.stack.last_mut()?;
            let depth = *depth;
            match iter.next() {
                Some(task) => {
                    let descend = match self.mode {
                        Traversal::Visible => !task.collapsed,
                        Traversal::All => true,
                    };
                    if descend && !task.children.is_empty() {
                        self.stack.push((task.children.iter(), depth + 1));
                    }
                    return Some(Row { task, depth });
                }
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

/// Displayed tasks in pre-order; children of collapsed tasks are skipped.
pub fn flatten(tasks: &[Task]) -> impl Iterator<Item = &Task> + Clone {
    visible_rows(tasks).map(|row| row.task)
}

/// Like [`flatten`] but yields the nesting depth with each task.
pub fn visible_rows(tasks: &[Task]) -> Rows<'_> {
    Rows::new(tasks, Traversal::Visible)
}

/// Every task in pre-order, regardless of collapse state.
pub fn all_tasks(tasks: &[Task]) -> impl Iterator<Item = &Task> + Clone {
    Rows::new(tasks, Traversal::All).map(|row| row.task)
}

/// Total number of tasks in the tree.
pub fn node_count(tasks: &[Task]) -> usize {
    all_tasks(tasks).count()
}

/// Earliest start date over the whole tree, or `fallback` when it is empty.
pub fn earliest_start(tasks: &[Task], fallback: NaiveDate) -> NaiveDate {
    all_tasks(tasks).map(|t| t.start).min().unwrap_or(fallback)
}

/// Latest end date over the whole tree, or `fallback` when it is empty.
pub fn latest_end(tasks: &[Task], fallback: NaiveDate) -> NaiveDate {
    all_tasks(tasks).map(|t| t.end).max().unwrap_or(fallback)
}

pub fn find_by_id<'a>(tasks: &'a [Task], id: &TaskId) -> Option<&'a Task> {
    all_tasks(tasks).find(|t| t.id == *id)
}

fn find_by_id_mut<'a>(tasks: &'a mut [Task], id: &TaskId) -> Option<&'a mut Task> {
    for task in tasks.iter_mut() {
        if task.id == *id {
            return Some(task);
        }
        if let Some(found) = find_by_id_mut(&mut task.children, id) {
            return Some(found);
        }
    }
    None
}

/// Copy the tree and run `edit` on the task matching `id`, if any.
fn edit_copy(tasks: &[Task], id: &TaskId, edit: impl FnOnce(&mut Task)) -> Vec<Task> {
    let mut copy = tasks.to_vec();
    match find_by_id_mut(&mut copy, id) {
        Some(task) => edit(task),
        None => tracing::debug!(task_id = %id, "task not found, tree left unchanged"),
    }
    copy
}

/// A new tree where the task matching `id` has `patch` merged over it.
///
/// The input is never modified. An unknown id yields an equal copy.
pub fn update_by_id(tasks: &[Task], id: &TaskId, patch: &TaskPatch) -> Vec<Task> {
    edit_copy(tasks, id, |task| patch.apply_to(task))
}

/// A new tree where the task matching `id` has its `collapsed` flag flipped.
pub fn toggle_collapse(tasks: &[Task], id: &TaskId) -> Vec<Task> {
    edit_copy(tasks, id, |task| task.collapsed = !task.collapsed)
}
