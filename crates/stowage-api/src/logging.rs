//! Logging configuration for Stowage
//!
//! Engines and the migrator emit `tracing` events (`debug` per primitive
//! operation, `info` for migration progress). This module installs a
//! subscriber for applications that do not bring their own.

use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{fmt, prelude::*, EnvFilter, Layer, Registry};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Where log lines go
#[derive(Debug, Clone)]
pub enum LogOutput {
    /// Output to stdout
    Stdout,
    /// Output to a file with daily rotation
    File(PathBuf),
    /// Output to both stdout and file
    Both(PathBuf),
}

/// Log format style
#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    /// Human-readable multi-line format (default)
    Pretty,
    /// Compact single-line format
    Compact,
}

impl LogFormat {
    fn layer<W>(self, writer: W, ansi: bool) -> BoxedLayer
    where
        W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
    {
        let layer = fmt::layer().with_writer(writer).with_ansi(ansi);
        match self {
            LogFormat::Pretty => layer.pretty().boxed(),
            LogFormat::Compact => layer.compact().boxed(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// `EnvFilter` directives, e.g. `info` or `stowage_fs=debug`
    pub level: String,
    /// Output destination
    pub output: LogOutput,
    /// Format style
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            output: LogOutput::Stdout,
            format: LogFormat::Pretty,
        }
    }
}

impl LogConfig {
    /// Info level, stdout
    pub fn info() -> Self {
        Self::default()
    }

    /// Debug level, stdout
    pub fn debug() -> Self {
        Self::default().with_level("debug")
    }

    /// Warn level, stdout
    pub fn warn() -> Self {
        Self::default().with_level("warn")
    }

    /// Debug output for the stowage crates, info for everything else
    pub fn stowage_debug() -> Self {
        Self::default().with_level(
            "info,stowage=debug,stowage_core=debug,stowage_fs=debug,stowage_migrate=debug",
        )
    }

    /// Log to a daily-rotated file instead of stdout
    pub fn with_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.output = LogOutput::File(path.into());
        self
    }

    /// Log to stdout and a daily-rotated file
    pub fn with_both<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.output = LogOutput::Both(path.into());
        self
    }

    /// Set log format
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Set filter directives
    pub fn with_level<S: Into<String>>(mut self, level: S) -> Self {
        self.level = level.into();
        self
    }

    /// Install the global subscriber.
    ///
    /// `RUST_LOG` takes precedence over the configured level; an unparsable
    /// level falls back to `info`. When a global subscriber is already set
    /// this is a no-op. Returns a guard that must be kept alive while
    /// logging to a file.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use stowage::logging::LogConfig;
    ///
    /// // Keep the guard alive for the lifetime of your application
    /// let _guard = LogConfig::info().with_file("logs/stowage.log").init();
    /// ```
    pub fn init(self) -> Option<WorkerGuard> {
        let env_filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&self.level))
            .unwrap_or_else(|_| EnvFilter::new("info"));

        let mut layers: Vec<BoxedLayer> = Vec::new();
        let mut guard = None;

        if matches!(self.output, LogOutput::Stdout | LogOutput::Both(_)) {
            layers.push(self.format.layer(std::io::stdout, true));
        }
        if let LogOutput::File(path) | LogOutput::Both(path) = &self.output {
            let (writer, worker) = tracing_appender::non_blocking(daily_appender(path));
            layers.push(self.format.layer(writer, false));
            guard = Some(worker);
        }

        if tracing_subscriber::registry()
            .with(layers)
            .with(env_filter)
            .try_init()
            .is_err()
        {
            tracing::warn!("global tracing subscriber already installed");
        }
        guard
    }
}

fn daily_appender(path: &Path) -> RollingFileAppender {
    tracing_appender::rolling::daily(
        path.parent().unwrap_or_else(|| Path::new(".")),
        path.file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("stowage.log"),
    )
}
