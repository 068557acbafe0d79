//! Application configuration.
//!
//! Lives as `config.json` in the OS config directory. Every section is
//! `#[serde(default)]`, so a partial file only overrides what it names. A
//! default file is written on first run so users have something to edit.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::chart::ViewOptions;
use crate::error::Result;
use crate::model::timeline::Granularity;
use crate::model::view::TimelinePlacement;

pub const APP_NAME: &str = "GanttTimeline";
pub const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub view: ViewDefaults,
    pub colors: ChartColors,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Compact,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset, e.g. `info` or
    /// `gantt_timeline=debug`.
    pub level: String,
    pub format: LogFormat,
    /// Include source file and line in each event.
    pub file_line: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: LogFormat::default(),
            file_line: false,
        }
    }
}

/// Initial view applied whenever a task set is loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewDefaults {
    pub granularity: Granularity,
    pub timeline_placement: TimelinePlacement,
    pub show_current_marker: bool,
}

impl Default for ViewDefaults {
    fn default() -> Self {
        Self {
            granularity: Granularity::Quarter,
            timeline_placement: TimelinePlacement::Bottom,
            show_current_marker: true,
        }
    }
}

/// Chart palette as `#RRGGBB` strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartColors {
    pub primary: String,
    pub secondary: String,
    pub background: String,
    pub text: String,
    pub grid: String,
    pub progress: String,
    pub milestone: String,
    pub current_date_line: String,
}

impl Default for ChartColors {
    fn default() -> Self {
        Self {
            primary: "#3b82f6".into(),
            secondary: "#93c5fd".into(),
            background: "#ffffff".into(),
            text: "#374151".into(),
            grid: "#e5e7eb".into(),
            progress: "#2563eb".into(),
            milestone: "#ef4444".into(),
            current_date_line: "#ef4444".into(),
        }
    }
}

impl AppConfig {
    /// `<config dir>/GanttTimeline/config.json`, or `./config.json` when the
    /// platform has no config directory.
    pub fn default_path() -> PathBuf {
        match directories::ProjectDirs::from("", "", APP_NAME) {
            Some(dirs) => dirs.config_dir().join(CONFIG_FILE),
            None => PathBuf::from(".").join(CONFIG_FILE),
        }
    }

    /// Read the config at `path`, writing the defaults there first if the
    /// file does not exist yet.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            let config = Self::default();
            config.save_to(path)?;
            return Ok(config);
        }
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn view_options(&self) -> ViewOptions {
        ViewOptions {
            granularity: Some(self.view.granularity),
            timeline_placement: Some(self.view.timeline_placement),
            show_current_marker: Some(self.view.show_current_marker),
            ..Default::default()
        }
    }
}
