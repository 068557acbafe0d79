pub mod dialogs;
pub mod gantt_chart;
pub mod theme;
pub mod toolbar;
