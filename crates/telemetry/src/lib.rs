//! Logging and metrics for the tablemate crates
//!
//! - [`init`] / [`init_with_config`] install a `tracing` subscriber
//! - [`metrics`] returns the process-wide [`MetricsRegistry`]
//! - [`Timer`] and [`timed_span!`] record operation durations

mod metrics;

pub use crate::metrics::{HistogramStats, MetricsRegistry, Timer};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use uuid::Uuid;

static METRICS: Lazy<MetricsRegistry> = Lazy::new(MetricsRegistry::new);

/// Correlates every log line of one process.
static SESSION_ID: Lazy<String> = Lazy::new(|| Uuid::new_v4().to_string());

/// Logging and metrics settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub log_level: String,
    /// Include the event target in each line
    pub show_target: bool,
    /// Append logs to this file instead of stderr
    pub log_file: Option<PathBuf>,
    /// Record into the metrics registry
    pub metrics_enabled: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            show_target: false,
            log_file: None,
            metrics_enabled: true,
        }
    }
}

/// Keeps the background log writer alive; drop it at exit to flush.
#[must_use = "dropping the guard stops file logging"]
pub struct TelemetryGuard {
    _writer: Option<WorkerGuard>,
}

/// Initialize with default settings.
pub fn init() -> anyhow::Result<TelemetryGuard> {
    init_with_config(TelemetryConfig::default())
}

/// Install the global subscriber.
///
/// Fails if a global subscriber is already set.
pub fn init_with_config(config: TelemetryConfig) -> anyhow::Result<TelemetryGuard> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&config.log_level))?;
    metrics().set_enabled(config.metrics_enabled);

    let (layer, writer) = match &config.log_file {
        Some(path) => {
            let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(std::path::Path::new("."));
            let file_name = path
                .file_name()
                .ok_or_else(|| anyhow::anyhow!("Log file path has no file name: {}", path.display()))?;
            let (non_blocking, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name));
            let layer = fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(config.show_target)
                .compact()
                .boxed();
            (layer, Some(guard))
        }
        None => {
            let layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(config.show_target)
                .compact()
                .boxed();
            (layer, None)
        }
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to set tracing subscriber: {}", e))?;

    tracing::info!(
        session_id = %session_id(),
        version = env!("CARGO_PKG_VERSION"),
        "Telemetry initialized"
    );

    Ok(TelemetryGuard { _writer: writer })
}

/// Identifier of this process's session.
pub fn session_id() -> &'static str {
    &SESSION_ID
}

/// The global metrics registry.
pub fn metrics() -> &'static MetricsRegistry {
    &METRICS
}

/// Time the rest of the enclosing block and open a debug span for it.
#[macro_export]
macro_rules! timed_span {
    ($name:literal) => {
        let _timer = $crate::Timer::start($name);
        let _span = tracing::debug_span!($name).entered();
    };
    ($name:literal, $($field:tt)*) => {
        let _timer = $crate::Timer::start($name);
        let _span = tracing::debug_span!($name, $($field)*).entered();
    };
}
