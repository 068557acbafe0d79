//! Configures tracing-subscriber for structured logging.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::{LogFormat, LoggingConfig};
use crate::error::{GanttError, Result};

/// Filter built from the configured directives, e.g. `warn,gantt_timeline=debug`.
fn config_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::new(&config.level)
}

/// Install the global subscriber. `RUST_LOG` wins over `config.level`.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| config_filter(config));
    let max_level = env_filter.max_level_hint();

    let fmt_layer = match config.format {
        LogFormat::Pretty => fmt::layer()
            .with_target(true)
            .with_file(config.file_line)
            .with_line_number(config.file_line)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_target(true)
            .with_file(config.file_line)
            .with_line_number(config.file_line)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| GanttError::Logging(e.to_string()))?;

    tracing::info!(
        target: "gantt_timeline::init",
        level = %config.level,
        max = ?max_level,
        format = ?config.format,
        "Logging initialized"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::level_filters::LevelFilter;

    fn filter_for(level: &str) -> EnvFilter {
        config_filter(&LoggingConfig {
            level: level.to_string(),
            ..Default::default()
        })
    }

    #[test]
    fn test_config_filter_max_level() {
        assert_eq!(filter_for("trace").max_level_hint(), Some(LevelFilter::TRACE));
        assert_eq!(filter_for("WARN").max_level_hint(), Some(LevelFilter::WARN));
        assert_eq!(filter_for("error").max_level_hint(), Some(LevelFilter::ERROR));
    }

    #[test]
    fn test_config_filter_honours_target_directives() {
        assert_eq!(
            filter_for("gantt_timeline=debug").max_level_hint(),
            Some(LevelFilter::DEBUG)
        );
        assert_eq!(
            filter_for("warn,gantt_timeline=debug").max_level_hint(),
            Some(LevelFilter::DEBUG)
        );
    }
}
