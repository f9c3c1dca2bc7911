//! Structured logging for the reef survey pipeline.
//!
//! Every event carries the pipeline stage and, where one applies, the reef
//! id it concerns. Output goes to the console and optionally to a log file
//! for batch runs scheduled without a terminal.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt as tracing_fmt, prelude::*};

use crate::model::{PipelineError, Stage};

// ---------------------------------------------------------------------------
// Log Levels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl LogLevel {
    fn directive(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warning => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warning),
            "error" => Ok(LogLevel::Error),
            other => Err(format!("unknown log level '{}'", other)),
        }
    }
}

// ---------------------------------------------------------------------------
// Logger Configuration
// ---------------------------------------------------------------------------

/// Install the global subscriber.
///
/// `RUST_LOG` takes precedence over `min_level` when set. When `log_file` is
/// given, events are also appended to that file; the returned guard must be
/// held until the run ends so buffered lines are flushed. Calling this twice
/// (as tests do) leaves the first subscriber in place.
pub fn init_logger(
    min_level: LogLevel,
    log_file: Option<&Path>,
    console_timestamps: bool,
) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("reefcheck_pipeline={}", min_level.directive()))
    });

    let (timed_console, plain_console) = if console_timestamps {
        (Some(tracing_fmt::layer().with_target(false)), None)
    } else {
        (
            None,
            Some(tracing_fmt::layer().with_target(false).without_time()),
        )
    };

    let (file_layer, guard) = match log_file.and_then(split_log_path) {
        Some((dir, name)) => {
            let appender = tracing_appender::rolling::never(dir, name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_fmt::layer().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(timed_console)
        .with(plain_console)
        .with(file_layer)
        .try_init();

    guard
}

fn split_log_path(path: &Path) -> Option<(&Path, &std::ffi::OsStr)> {
    let name = path.file_name()?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    Some((dir, name))
}

// ---------------------------------------------------------------------------
// Public Logging Functions
// ---------------------------------------------------------------------------

pub fn info(stage: Stage, reef_id: Option<&str>, message: &str) {
    tracing::info!(stage = %stage, reef_id = reef_id.unwrap_or("-"), "{}", message);
}

pub fn warn(stage: Stage, reef_id: Option<&str>, message: &str) {
    tracing::warn!(stage = %stage, reef_id = reef_id.unwrap_or("-"), "{}", message);
}

pub fn error(stage: Stage, reef_id: Option<&str>, message: &str) {
    tracing::error!(stage = %stage, reef_id = reef_id.unwrap_or("-"), "{}", message);
}

pub fn debug(stage: Stage, reef_id: Option<&str>, message: &str) {
    tracing::debug!(stage = %stage, reef_id = reef_id.unwrap_or("-"), "{}", message);
}

// ---------------------------------------------------------------------------
// Failure and Summary Logging
// ---------------------------------------------------------------------------

/// Short machine-friendly name of an error kind, used as a log field.
pub fn error_kind(err: &PipelineError) -> &'static str {
    match err {
        PipelineError::Schema { .. } => "schema",
        PipelineError::Aggregation { .. } => "aggregation",
        PipelineError::InvariantViolation { .. } => "invariant_violation",
        PipelineError::UnitConversion { .. } => "unit_conversion",
        PipelineError::TypeCoercion { .. } => "type_coercion",
    }
}

/// Log a fatal pipeline error before the run is abandoned.
pub fn log_pipeline_failure(err: &PipelineError) {
    error(
        err.stage(),
        None,
        &format!("run aborted ({}): {}", error_kind(err), err),
    );
}

/// Log the row counts going into and out of a stage.
///
/// A stage that produced nothing from a non-empty input is a warning: the
/// run is still valid but the output table will be empty.
pub fn log_stage_summary(stage: Stage, rows_in: usize, rows_out: usize) {
    let message = format!("{} rows in, {} rows out", rows_in, rows_out);

    if rows_out == 0 && rows_in > 0 {
        warn(stage, None, &message);
    } else {
        info(stage, None, &message);
    }
}
