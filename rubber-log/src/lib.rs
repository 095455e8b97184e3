//! Logging for the rubber client.
//!
//! Library crates in this workspace only emit events through the `tracing`
//! macros. Applications (the `rubber` CLI, or a host service) call
//! [`LogConfig::init`] once to install a subscriber.
//!
//! # Environment Variables
//!
//! - `RUBBER_DEBUG=1` - Enable debug logging
//! - `RUBBER_LOG_LEVEL=trace|debug|info|warn|error` - Set log level
//! - `RUBBER_LOG_FORMAT=json|plain|pretty|compact` - Set output format
//! - `RUST_LOG` - Overrides the level with a full filter directive
//!
//! # Example
//!
//! ```no_run
//! use rubber_log::{LogConfig, LogFormat, LogLevel};
//!
//! let _guard = LogConfig::from_env()
//!     .format(LogFormat::Compact)
//!     .init();
//!
//! rubber_log::info!("client ready");
//! ```

mod capture;

use std::io;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub use capture::{CapturedEvent, LogCapture};

// Re-export the macros so binaries only need this crate.
pub use tracing::{debug, error, info, trace, warn};

/// Log level for filtering messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    /// Most verbose
    Trace,
    /// Debug information
    Debug,
    /// Normal operation
    Info,
    /// Potential problems
    Warn,
    /// Failures
    Error,
}

impl LogLevel {
    /// Parse a level name, case-insensitive.
    pub fn from_name(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "trace" => Some(LogLevel::Trace),
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" | "warning" => Some(LogLevel::Warn),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }

    /// Convert to a tracing level.
    pub fn to_tracing_level(&self) -> Level {
        match self {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }

    /// Directive string for `EnvFilter`.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Output format for log messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per line
    Json,
    /// Plain single-line text
    Plain,
    /// Multi-line, human oriented
    Pretty,
    /// Minimal single-line text
    Compact,
}

impl LogFormat {
    /// Parse a format name, case-insensitive.
    pub fn from_name(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "json" => Some(LogFormat::Json),
            "plain" | "text" => Some(LogFormat::Plain),
            "pretty" => Some(LogFormat::Pretty),
            "compact" => Some(LogFormat::Compact),
            _ => None,
        }
    }
}

/// Output destination for logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogOutput {
    /// Write to STDOUT
    Stdout,
    /// Write to STDERR (default, keeps STDOUT for command output)
    Stderr,
    /// Append to a file
    File(String),
}

/// Logging configuration.
///
/// ```
/// use rubber_log::{LogConfig, LogFormat, LogLevel, LogOutput};
///
/// let config = LogConfig::new()
///     .level(LogLevel::Debug)
///     .format(LogFormat::Pretty)
///     .output(LogOutput::Stderr);
/// assert_eq!(config.level, LogLevel::Debug);
/// ```
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Level filter, used when no `env_filter` or `RUST_LOG` is present
    pub level: LogLevel,
    /// Output format
    pub format: LogFormat,
    /// Output destination
    pub output: LogOutput,
    /// Include the event target
    pub targets: bool,
    /// ANSI colors for text formats
    pub colors: bool,
    /// Explicit filter directive, e.g. `"rubber_core=debug,reqwest=warn"`
    pub env_filter: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Compact,
            output: LogOutput::Stderr,
            targets: true,
            colors: false,
            env_filter: None,
        }
    }
}

impl LogConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a configuration from the `RUBBER_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let debug = lookup("RUBBER_DEBUG")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        let level = lookup("RUBBER_LOG_LEVEL")
            .and_then(|s| LogLevel::from_name(&s))
            .unwrap_or(if debug { LogLevel::Debug } else { LogLevel::Info });

        let format = lookup("RUBBER_LOG_FORMAT")
            .and_then(|s| LogFormat::from_name(&s))
            .unwrap_or(LogFormat::Compact);

        Self {
            level,
            format,
            ..Self::default()
        }
    }

    /// Set log level.
    pub fn level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    /// Set output format.
    pub fn format(mut self, format: LogFormat) -> Self {
        self.format = format;
        if format == LogFormat::Json {
            self.colors = false;
        }
        self
    }

    /// Set output destination.
    pub fn output(mut self, output: LogOutput) -> Self {
        self.output = output;
        self
    }

    /// Enable or disable event targets.
    pub fn with_targets(mut self, enable: bool) -> Self {
        self.targets = enable;
        self
    }

    /// Enable or disable ANSI colors.
    pub fn with_colors(mut self, enable: bool) -> Self {
        self.colors = enable;
        self
    }

    /// Set an explicit filter directive.
    pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    fn build_filter(&self) -> EnvFilter {
        match &self.env_filter {
            Some(directive) => {
                EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new(self.level.as_str()))
            }
            None => EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(self.level.as_str())),
        }
    }

    /// Install the global subscriber.
    ///
    /// Returns the writer guard, which must be kept alive for the program's
    /// lifetime. Returns `None` when the output file cannot be opened or a
    /// global subscriber is already installed.
    pub fn init(self) -> Option<WorkerGuard> {
        let filter = self.build_filter();

        let (writer, guard) = match &self.output {
            LogOutput::Stdout => tracing_appender::non_blocking(io::stdout()),
            LogOutput::Stderr => tracing_appender::non_blocking(io::stderr()),
            LogOutput::File(path) => {
                let file = std::fs::OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .ok()?;
                tracing_appender::non_blocking(file)
            }
        };

        let registry = tracing_subscriber::registry().with(filter);
        let installed = match self.format {
            LogFormat::Json => registry
                .with(
                    fmt::layer()
                        .json()
                        .with_writer(writer)
                        .with_target(self.targets),
                )
                .try_init(),
            LogFormat::Plain => registry
                .with(
                    fmt::layer()
                        .with_writer(writer)
                        .with_target(self.targets)
                        .with_ansi(self.colors),
                )
                .try_init(),
            LogFormat::Pretty => registry
                .with(
                    fmt::layer()
                        .pretty()
                        .with_writer(writer)
                        .with_target(self.targets)
                        .with_ansi(self.colors),
                )
                .try_init(),
            LogFormat::Compact => registry
                .with(
                    fmt::layer()
                        .compact()
                        .with_writer(writer)
                        .with_target(self.targets)
                        .with_ansi(self.colors),
                )
                .try_init(),
        };

        installed.ok().map(|_| guard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_level_from_name() {
        assert_eq!(LogLevel::from_name("debug"), Some(LogLevel::Debug));
        assert_eq!(LogLevel::from_name("WARNING"), Some(LogLevel::Warn));
        assert_eq!(LogLevel::from_name("verbose"), None);
    }

    #[test]
    fn test_level_conversion() {
        assert_eq!(LogLevel::Trace.to_tracing_level(), Level::TRACE);
        assert_eq!(LogLevel::Error.to_tracing_level(), Level::ERROR);
        assert_eq!(LogLevel::Warn.as_str(), "warn");
    }

    #[test]
    fn test_format_from_name() {
        assert_eq!(LogFormat::from_name("json"), Some(LogFormat::Json));
        assert_eq!(LogFormat::from_name("text"), Some(LogFormat::Plain));
        assert_eq!(LogFormat::from_name("xml"), None);
    }

    #[test]
    fn test_from_lookup_defaults() {
        let config = LogConfig::from_lookup(lookup(&[]));
        assert_eq!(config.level, LogLevel::Info);
        assert_eq!(config.format, LogFormat::Compact);
        assert_eq!(config.output, LogOutput::Stderr);
    }

    #[test]
    fn test_debug_flag_lowers_level() {
        let config = LogConfig::from_lookup(lookup(&[("RUBBER_DEBUG", "true")]));
        assert_eq!(config.level, LogLevel::Debug);

        let config = LogConfig::from_lookup(lookup(&[
            ("RUBBER_DEBUG", "1"),
            ("RUBBER_LOG_LEVEL", "error"),
        ]));
        assert_eq!(config.level, LogLevel::Error);
    }

    #[test]
    fn test_builder_json_disables_colors() {
        let config = LogConfig::new().with_colors(true).format(LogFormat::Json);
        assert!(!config.colors);
        assert_eq!(config.format, LogFormat::Json);
    }
}
