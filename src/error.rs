//! Error types shared by the engine's I/O, export, configuration and logging layers.
//!
//! The timeline core itself is infallible: unknown ids and empty trees are
//! valid inputs, so only the edges of the crate return [`GanttError`].

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GanttError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("CSV output is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("CSV is missing required columns. Found headers: {found:?}. Need columns for: task name, start date, end date.")]
    MissingColumns { found: Vec<String> },

    #[error("No valid tasks found in CSV ({skipped} rows skipped)")]
    EmptyImport { skipped: usize },

    #[error("Image export failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("Cannot export a {width}x{height} image from {len} bytes of pixel data")]
    ImageSize { width: u32, height: u32, len: usize },

    #[error("Logging setup failed: {0}")]
    Logging(String),
}

pub type Result<T> = std::result::Result<T, GanttError>;
