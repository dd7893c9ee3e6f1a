use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use std::fs;
use tracing_appender::rolling;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

/// Where and how log output goes.
#[derive(Debug, Clone)]
pub struct LogOptions {
    /// Directory for log files (e.g., "logs")
    pub log_dir: String,
    /// Prefix for log files (e.g., "modhearth")
    pub log_prefix: String,
    /// Debug level instead of info, unless `RUST_LOG` says otherwise
    pub debug_mode: bool,
    /// Also log to stderr with colors
    pub console_output: bool,
    /// Write the log file as JSON lines
    pub json: bool,
}

impl LogOptions {
    pub fn new(log_dir: impl Into<String>, log_prefix: impl Into<String>) -> Self {
        Self {
            log_dir: log_dir.into(),
            log_prefix: log_prefix.into(),
            debug_mode: false,
            console_output: false,
            json: false,
        }
    }

    fn env_filter(&self) -> EnvFilter {
        let default_level = if self.debug_mode { "debug" } else { "info" };
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
    }
}

/// Create the log directory if it doesn't exist.
pub fn ensure_log_dir(log_dir: &str) -> Result<Utf8PathBuf> {
    let log_path = Utf8PathBuf::from(log_dir);
    if !log_path.exists() {
        fs::create_dir_all(&log_path)
            .with_context(|| format!("Failed to create log directory: {}", log_dir))?;
    }
    Ok(log_path)
}

/// Setup logging with a daily rotating file appender.
///
/// # Returns
/// A guard that must be held for the duration of the program to keep logging active
pub fn setup_logging(
    log_dir: &str,
    log_prefix: &str,
    debug_mode: bool,
) -> Result<tracing_appender::non_blocking::WorkerGuard> {
    let options = LogOptions {
        debug_mode,
        ..LogOptions::new(log_dir, log_prefix)
    };
    setup_logging_with_options(&options)
}

/// Setup logging with optional console output and JSON file format.
///
/// Fails if a global subscriber is already installed.
///
/// # Returns
/// A guard that must be held for the duration of the program to keep logging active
pub fn setup_logging_with_options(
    options: &LogOptions,
) -> Result<tracing_appender::non_blocking::WorkerGuard> {
    ensure_log_dir(&options.log_dir)?;

    // Create daily rotating file appender
    let file_appender = rolling::daily(&options.log_dir, &options.log_prefix);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false) // No ANSI codes in log files
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    let file_layer = if options.json {
        file_layer.json().boxed()
    } else {
        file_layer.boxed()
    };

    // Console goes to stderr so command output on stdout stays clean
    let console_layer = options.console_output.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(true)
            .with_target(false)
    });

    tracing_subscriber::registry()
        .with(file_layer)
        .with(options.env_filter())
        .with(console_layer)
        .try_init()
        .context("Failed to install the global tracing subscriber")?;

    tracing::info!(
        "Logging initialized: dir={}, prefix={}, debug={}, console={}, json={}",
        options.log_dir,
        options.log_prefix,
        options.debug_mode,
        options.console_output,
        options.json
    );

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_setup_logging_creates_directory() {
        let temp_dir = TempDir::new().unwrap();
        let log_dir = temp_dir.path().join("logs");
        let log_dir = log_dir.to_str().unwrap();

        // May fail if another test already installed a subscriber,
        // but the directory is created first either way
        let _ = setup_logging(log_dir, "test", false);

        assert!(Utf8PathBuf::from(log_dir).exists());
    }

    #[test]
    fn test_ensure_log_dir_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let log_dir = temp_dir.path().join("nested").join("logs");
        let log_dir = log_dir.to_str().unwrap();

        ensure_log_dir(log_dir).unwrap();
        ensure_log_dir(log_dir).unwrap();

        assert!(Utf8PathBuf::from(log_dir).is_dir());
    }

    #[test]
    fn test_options_defaults() {
        let options = LogOptions::new("logs", "modhearth");
        assert!(!options.debug_mode);
        assert!(!options.console_output);
        assert!(!options.json);
    }
}
