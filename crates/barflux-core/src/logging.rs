//! Logging configuration and subscriber setup.
//!
//! Console output goes to stderr so stdout stays usable; file output runs
//! through a non-blocking appender whose worker is kept alive by the
//! returned guard. `RUST_LOG` always takes precedence over the configured
//! level.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    filter::{EnvFilter, LevelFilter},
    fmt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
    Layer,
};

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Minimum level: "trace", "debug", "info", "warn" or "error"
    pub level: String,
    /// Emit to stderr
    pub console_output: bool,
    /// Emit to a file under `directory`
    pub file_output: bool,
    /// Directory for log files
    pub directory: PathBuf,
    /// Log files kept before the oldest are removed
    pub max_files: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            console_output: true,
            file_output: false,
            directory: PathBuf::from("logs"),
            max_files: 5,
        }
    }
}

impl LogConfig {
    /// Parse the configured level, falling back to INFO on junk input.
    pub fn parse_level(&self) -> LevelFilter {
        self.level.parse().unwrap_or(LevelFilter::INFO)
    }

    /// Path the current process logs to.
    pub fn current_log_path(&self) -> PathBuf {
        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        self.directory.join(format!("barflux-{stamp}.log"))
    }

    /// Create the log directory if missing.
    pub fn ensure_log_directory(&self) -> io::Result<()> {
        fs::create_dir_all(&self.directory)
    }

    /// Remove the oldest log files beyond `max_files`.
    pub fn cleanup_old_logs(&self) -> io::Result<()> {
        let mut logs: Vec<PathBuf> = fs::read_dir(&self.directory)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| is_log_file(path))
            .collect();
        logs.sort();

        while logs.len() >= self.max_files.max(1) {
            let oldest = logs.remove(0);
            fs::remove_file(oldest)?;
        }
        Ok(())
    }
}

fn is_log_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "log")
        && path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.starts_with("barflux-"))
}

/// Keeps the file-appender worker thread alive; drop to flush and stop.
pub struct LogGuard {
    _guard: WorkerGuard,
}

/// Install the global subscriber according to `config`.
///
/// Call once at startup. Returns a guard when file output is enabled;
/// hold it for the lifetime of the process.
pub fn init(config: &LogConfig) -> io::Result<Option<LogGuard>> {
    let filter = || {
        EnvFilter::builder()
            .with_default_directive(config.parse_level().into())
            .from_env_lossy()
    };

    let console_layer = config.console_output.then(|| {
        fmt::layer()
            .with_writer(io::stderr)
            .with_ansi(true)
            .with_target(false)
            .with_filter(filter())
    });

    let (file_layer, guard) = if config.file_output {
        config.ensure_log_directory()?;
        if let Err(e) = config.cleanup_old_logs() {
            eprintln!("warning: failed to clean up old log files: {e}");
        }

        let file = File::create(config.current_log_path())?;
        let (writer, worker_guard) = tracing_appender::non_blocking(file);
        let layer = fmt::layer()
            .with_writer(writer)
            .with_ansi(false)
            .with_filter(filter());
        (
            Some(layer),
            Some(LogGuard {
                _guard: worker_guard,
            }),
        )
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();

    tracing::info!(level = %config.level, "logging initialized");
    Ok(guard)
}
