//! Process-wide logger initialization.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

use commons_core::config::LoggingConfig;
use commons_core::error::{AppError, ErrorKind};
use commons_core::result::AppResult;

use crate::format::{LogFormat, PlainFormat};

/// Name of the file written inside the log directory.
pub const LOG_FILE_NAME: &str = "application.log";

static LOGGER: OnceLock<Logger> = OnceLock::new();

/// Serializes first-time initialization so only one sink is ever built.
static INIT: Mutex<()> = Mutex::new(());

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Handle to the installed logger.
///
/// Cloning is cheap. The file sink stays alive as long as one clone (or
/// the process-wide copy) exists.
#[derive(Debug, Clone)]
pub struct Logger {
    level: String,
    format: LogFormat,
    file: Option<PathBuf>,
    _guard: Option<Arc<WorkerGuard>>,
}

impl Logger {
    /// Configured level directive.
    pub fn level(&self) -> &str {
        &self.level
    }

    /// Configured output format.
    pub fn format(&self) -> LogFormat {
        self.format
    }

    /// Path of the file sink, when enabled.
    pub fn file(&self) -> Option<&PathBuf> {
        self.file.as_ref()
    }

    /// Log an error.
    pub fn error(&self, message: impl std::fmt::Display) {
        tracing::error!("{message}");
    }

    /// Log a warning.
    pub fn warn(&self, message: impl std::fmt::Display) {
        tracing::warn!("{message}");
    }

    /// Log info.
    pub fn info(&self, message: impl std::fmt::Display) {
        tracing::info!("{message}");
    }

    /// Log debug.
    pub fn debug(&self, message: impl std::fmt::Display) {
        tracing::debug!("{message}");
    }
}

/// Initialize the process-wide logger.
///
/// The first call installs the global subscriber; later calls return the
/// logger installed by the first one and ignore their arguments. When a
/// log directory is configured it is created if missing and
/// `application.log` is written inside it. `RUST_LOG` overrides the level.
pub fn initialize(config: &LoggingConfig) -> AppResult<Logger> {
    if let Some(logger) = LOGGER.get() {
        return Ok(logger.clone());
    }

    let init = INIT.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(logger) = LOGGER.get() {
        return Ok(logger.clone());
    }

    let format: LogFormat = config.format.parse()?;
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.as_str()));

    let mut layers: Vec<BoxedLayer> = vec![console_layer(format)];
    let mut file = None;
    let mut guard = None;

    if let Some(dir) = config.directory.as_deref().filter(|d| !d.is_empty()) {
        std::fs::create_dir_all(dir).map_err(|e| {
            AppError::with_source(
                ErrorKind::Configuration,
                format!("Failed to create log directory: {dir}"),
                e,
            )
        })?;

        let appender = tracing_appender::rolling::never(dir, LOG_FILE_NAME);
        let (writer, worker_guard) = tracing_appender::non_blocking(appender);
        layers.push(file_layer(format, writer));
        file = Some(PathBuf::from(dir).join(LOG_FILE_NAME));
        guard = Some(Arc::new(worker_guard));
    }

    let logger = Logger {
        level: config.level.clone(),
        format,
        file,
        _guard: guard,
    };

    // Another subscriber (e.g. a test harness) may already be installed;
    // the handle is still usable because the macros route to whichever
    // subscriber is global.
    if tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init()
        .is_err()
    {
        tracing::debug!("Global subscriber already installed, reusing it");
    }

    let logger = LOGGER.get_or_init(|| logger).clone();
    drop(init);
    tracing::debug!(level = %logger.level, format = ?logger.format, "Logger initialized");
    Ok(logger)
}

fn console_layer(format: LogFormat) -> BoxedLayer {
    match format {
        LogFormat::Json => fmt::layer().json().with_target(true).boxed(),
        LogFormat::Pretty => fmt::layer().pretty().with_target(true).boxed(),
        LogFormat::Plain => fmt::layer().event_format(PlainFormat).boxed(),
    }
}

fn file_layer(format: LogFormat, writer: tracing_appender::non_blocking::NonBlocking) -> BoxedLayer {
    match format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_writer(writer)
            .with_ansi(false)
            .boxed(),
        LogFormat::Pretty => fmt::layer()
            .pretty()
            .with_writer(writer)
            .with_ansi(false)
            .boxed(),
        LogFormat::Plain => fmt::layer()
            .event_format(PlainFormat)
            .with_writer(writer)
            .with_ansi(false)
            .boxed(),
    }
}
