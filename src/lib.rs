//! Layout and view-state engine for a zoomable, collapsible Gantt timeline.
//!
//! The [`model`] module holds the pure parts: the task tree and its
//! traversals, the month/quarter/year partitioner, the percentage layout of
//! bars and the view-state reducer. [`chart::GanttChart`] owns one task set
//! plus its view and notifies observers; the `gantt-timeline` binary renders
//! it with egui.

pub mod chart;
pub mod config;
pub mod error;
pub mod io;
pub mod logging;
pub mod model;

pub use chart::{GanttChart, ViewOptions};
pub use error::{GanttError, Result};
pub use model::{
    BarLayout, CurrentMarker, DateRange, Granularity, Task, TaskId, TaskPatch, TimeUnit,
    TimelinePlacement, ViewAction, ViewState,
};
