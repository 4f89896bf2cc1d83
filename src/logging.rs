use std::fs;
use tracing::{debug, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{
    fmt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
    Layer,
    Registry,
};

use crate::config::LoggingSection;
use crate::error::{LabError, LabResult};

/// Where console output may go while logging is active
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleMode {
    /// Plain CLI commands log to stderr
    Stderr,
    /// The TUI owns the terminal; console logging is silenced
    Silent,
}

/// Initialize the logging system.
///
/// The returned guard must be held for as long as file logging should keep
/// flushing; dropping it stops the background writer.
pub fn init_logging(config: &LoggingSection, console: ConsoleMode) -> LabResult<Option<WorkerGuard>> {
    if config.enable_file_logging {
        fs::create_dir_all(&config.log_dir)
            .map_err(|e| LabError::file_io(config.log_dir.to_string_lossy().to_string(), e))?;
    }

    // Keep reqwest/hyper chatter out of the log unless asked for explicitly
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "labdesk_tui={},labdesk={},reqwest=warn,hyper=warn,warn",
            config.level, config.level
        ))
    });

    let (file_layer, guard) = if config.enable_file_logging {
        let file_appender = rolling::daily(&config.log_dir, "labdesk.log");
        let (file_writer, guard) = non_blocking(file_appender);

        let layer = if config.enable_json_format {
            fmt::layer().json().with_writer(file_writer).boxed()
        } else {
            fmt::layer().with_writer(file_writer).with_ansi(false).boxed()
        };
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    let console_layer = match console {
        ConsoleMode::Stderr => fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .without_time()
            .compact()
            .boxed(),
        ConsoleMode::Silent => fmt::layer()
            .with_writer(std::io::sink)
            .with_target(false)
            .without_time()
            .compact()
            .boxed(),
    };

    Registry::default()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .map_err(|e| LabError::configuration(format!("logging already initialized: {}", e)))?;

    info!("labdesk logging initialized");
    debug!("Log level: {}", config.level);

    if config.enable_file_logging {
        debug!("File logging enabled: {}", config.log_dir.display());
    }

    Ok(guard)
}

/// Log system information for debugging
pub fn log_system_info(base_url: &str) {
    info!("labdesk v{}", env!("CARGO_PKG_VERSION"));
    info!("System: {} {}", std::env::consts::OS, std::env::consts::ARCH);
    info!("Computation service: {}", base_url);
}

/// Logs how long a request took once it goes out of scope
pub struct PerformanceTimer {
    start: std::time::Instant,
    operation: String,
}

impl PerformanceTimer {
    pub fn start(operation: impl Into<String>) -> Self {
        let operation = operation.into();
        debug!("Starting: {}", operation);
        Self {
            start: std::time::Instant::now(),
            operation,
        }
    }

    pub fn elapsed_ms(&self) -> u128 {
        self.start.elapsed().as_millis()
    }
}

impl Drop for PerformanceTimer {
    fn drop(&mut self) {
        info!("Completed {}: {}ms", self.operation, self.elapsed_ms());
    }
}

/// Clean up old log files, newest first, keeping `max_log_files`
pub fn cleanup_old_logs(config: &LoggingSection) -> LabResult<usize> {
    if !config.enable_file_logging || !config.log_dir.exists() {
        return Ok(0);
    }

    let mut log_files = Vec::new();

    let entries = fs::read_dir(&config.log_dir)
        .map_err(|e| LabError::file_io(config.log_dir.to_string_lossy().to_string(), e))?;

    for entry in entries {
        let entry = entry
            .map_err(|e| LabError::file_io(config.log_dir.to_string_lossy().to_string(), e))?;

        let path = entry.path();
        let is_log = path
            .file_name()
            .and_then(|s| s.to_str())
            .map(|name| name.starts_with("labdesk.log"))
            .unwrap_or(false);
        if is_log {
            if let Ok(metadata) = fs::metadata(&path) {
                log_files.push((
                    path,
                    metadata.modified().unwrap_or(std::time::SystemTime::UNIX_EPOCH),
                ));
            }
        }
    }

    log_files.sort_by(|a, b| b.1.cmp(&a.1));

    let mut removed = 0;
    if log_files.len() > config.max_log_files {
        for (path, _) in &log_files[config.max_log_files..] {
            if let Err(e) = fs::remove_file(path) {
                warn!("Failed to remove old log file {}: {}", path.display(), e);
            } else {
                debug!("Removed old log file: {}", path.display());
                removed += 1;
            }
        }
    }

    Ok(removed)
}

/// Macro for logging with context
#[macro_export]
macro_rules! log_error {
    ($error:expr, $context:expr) => {
        tracing::warn!(
            error = %$error,
            context = $context,
            local = $error.is_local(),
            recoverable = $error.is_recoverable(),
            "labdesk action failed"
        );
    };
}
