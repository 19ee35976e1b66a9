//! Process-wide logging bootstrap.
//!
//! # Responsibility
//! - Start the `flexi_logger` backend once per process, writing either
//!   rotating files or stderr.
//! - Capture panics as single-line log events.
//!
//! # Invariants
//! - Repeating initialization with the active configuration is a no-op.
//! - Any other configuration after the first is rejected, never applied.
//! - Initialization reports failures as values and never panics.

use flexi_logger::{
    Cleanup, Criterion, Duplicate, FileSpec, Logger, LoggerHandle, Naming, WriteMode,
};
use log::{error, info};
use once_cell::sync::OnceCell;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::sync::Once;

const FILE_BASENAME: &str = "grimoire";
const ROTATE_AT_BYTES: u64 = 10 * 1024 * 1024;
const KEEP_FILES: usize = 5;
const PANIC_PAYLOAD_LIMIT: usize = 160;

static ACTIVE: OnceCell<ActiveLogger> = OnceCell::new();
static PANIC_HOOK: Once = Once::new();

/// Where log records go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogDestination {
    Stderr,
    /// Rotating files in an absolute directory; warnings also reach stderr.
    Directory(PathBuf),
}

impl Display for LogDestination {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stderr => f.write_str("stderr"),
            Self::Directory(dir) => write!(f, "{}", dir.display()),
        }
    }
}

/// Active logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingStatus {
    pub level: &'static str,
    pub destination: LogDestination,
}

#[derive(Debug)]
pub enum LoggingError {
    UnsupportedLevel(String),
    InvalidDirectory { path: String, reason: String },
    /// Logging already runs with a different configuration.
    Conflict {
        active: LoggingStatus,
        requested: LoggingStatus,
    },
    Start(String),
}

impl Display for LoggingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedLevel(level) => write!(
                f,
                "unsupported log level `{level}`; expected trace|debug|info|warn|error"
            ),
            Self::InvalidDirectory { path, reason } => {
                write!(f, "invalid log directory `{path}`: {reason}")
            }
            Self::Conflict { active, requested } => write!(
                f,
                "logging already active ({} to {}); refusing {} to {}",
                active.level, active.destination, requested.level, requested.destination
            ),
            Self::Start(reason) => write!(f, "failed to start logger: {reason}"),
        }
    }
}

impl Error for LoggingError {}

struct ActiveLogger {
    status: LoggingStatus,
    _handle: LoggerHandle,
}

/// Starts rotating file logging in `log_dir`, which must be absolute.
pub fn init_logging(level: &str, log_dir: &str) -> Result<(), LoggingError> {
    let requested = LoggingStatus {
        level: parse_level(level)?,
        destination: LogDestination::Directory(parse_log_dir(log_dir)?),
    };
    activate(requested)
}

/// Starts stderr-only logging.
pub fn init_stderr_logging(level: &str) -> Result<(), LoggingError> {
    let requested = LoggingStatus {
        level: parse_level(level)?,
        destination: LogDestination::Stderr,
    };
    activate(requested)
}

/// Active configuration, `None` before initialization.
pub fn logging_status() -> Option<LoggingStatus> {
    ACTIVE.get().map(|active| active.status.clone())
}

/// `debug` for debug builds, `info` otherwise.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

fn activate(requested: LoggingStatus) -> Result<(), LoggingError> {
    let active = ACTIVE.get_or_try_init(|| start(&requested))?;
    if active.status == requested {
        Ok(())
    } else {
        Err(LoggingError::Conflict {
            active: active.status.clone(),
            requested,
        })
    }
}

fn start(status: &LoggingStatus) -> Result<ActiveLogger, LoggingError> {
    let logger = Logger::try_with_str(status.level)
        .map_err(|err| LoggingError::Start(err.to_string()))?;

    let handle = match &status.destination {
        LogDestination::Stderr => logger
            .log_to_stderr()
            .format(flexi_logger::detailed_format)
            .start(),
        LogDestination::Directory(dir) => {
            std::fs::create_dir_all(dir).map_err(|err| LoggingError::InvalidDirectory {
                path: dir.display().to_string(),
                reason: err.to_string(),
            })?;
            logger
                .log_to_file(FileSpec::default().directory(dir).basename(FILE_BASENAME))
                .rotate(
                    Criterion::Size(ROTATE_AT_BYTES),
                    Naming::Numbers,
                    Cleanup::KeepLogFiles(KEEP_FILES),
                )
                .write_mode(WriteMode::BufferAndFlush)
                .append()
                .format_for_files(flexi_logger::detailed_format)
                .duplicate_to_stderr(Duplicate::Warn)
                .start()
        }
    }
    .map_err(|err| LoggingError::Start(err.to_string()))?;

    PANIC_HOOK.call_once(install_panic_hook);
    info!(
        "event=logging_init module=core status=ok level={} destination={} os={} version={}",
        status.level,
        status.destination,
        std::env::consts::OS,
        env!("CARGO_PKG_VERSION")
    );

    Ok(ActiveLogger {
        status: status.clone(),
        _handle: handle,
    })
}

fn parse_level(raw: &str) -> Result<&'static str, LoggingError> {
    let level = match raw.trim().to_ascii_lowercase().as_str() {
        "trace" => "trace",
        "debug" => "debug",
        "info" => "info",
        "warn" | "warning" => "warn",
        "error" => "error",
        _ => return Err(LoggingError::UnsupportedLevel(raw.trim().to_string())),
    };
    Ok(level)
}

fn parse_log_dir(raw: &str) -> Result<PathBuf, LoggingError> {
    let trimmed = raw.trim();
    let invalid = |reason: &str| LoggingError::InvalidDirectory {
        path: trimmed.to_string(),
        reason: reason.to_string(),
    };
    if trimmed.is_empty() {
        return Err(invalid("empty path"));
    }
    let path = Path::new(trimmed);
    if !path.is_absolute() {
        return Err(invalid("path must be absolute"));
    }
    Ok(path.to_path_buf())
}

fn install_panic_hook() {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let location = info
            .location()
            .map_or_else(|| "unknown".to_string(), |loc| format!("{}:{}", loc.file(), loc.line()));
        let payload = info
            .payload()
            .downcast_ref::<&str>()
            .map(|text| (*text).to_string())
            .or_else(|| info.payload().downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        error!(
            "event=panic module=core status=error location={location} payload={}",
            one_line(&payload, PANIC_PAYLOAD_LIMIT)
        );
        previous(info);
    }));
}

// Payloads may echo record names; keep them on one capped line.
fn one_line(text: &str, limit: usize) -> String {
    let flat = text.replace(['\n', '\r'], " ");
    if flat.chars().count() <= limit {
        return flat;
    }
    let mut capped: String = flat.chars().take(limit).collect();
    capped.push_str("...");
    capped
}

#[cfg(test)]
mod tests {
    use super::{
        init_logging, init_stderr_logging, logging_status, one_line, parse_level,
        parse_log_dir, LogDestination, LoggingError,
    };

    #[test]
    fn level_names_are_case_insensitive() {
        assert_eq!(parse_level(" WARNING ").unwrap(), "warn");
        assert_eq!(parse_level("Trace").unwrap(), "trace");
        assert!(matches!(
            parse_level("verbose"),
            Err(LoggingError::UnsupportedLevel(level)) if level == "verbose"
        ));
    }

    #[test]
    fn relative_or_empty_directories_are_rejected() {
        assert!(parse_log_dir("logs/dev").is_err());
        assert!(parse_log_dir("   ").is_err());
    }

    #[test]
    fn one_line_flattens_and_caps() {
        assert_eq!(one_line("a\nb", 10), "a b");
        assert_eq!(one_line("abcdefghij", 4), "abcd...");
    }

    // Only test in this binary that starts the global logger.
    #[test]
    fn first_configuration_wins() {
        let dir = tempfile::tempdir().unwrap();
        let dir_str = dir.path().to_str().unwrap().to_string();

        init_logging("info", &dir_str).unwrap();
        init_logging("INFO", &dir_str).unwrap();

        let err = init_logging("debug", &dir_str).unwrap_err();
        assert!(matches!(err, LoggingError::Conflict { .. }));
        let err = init_stderr_logging("info").unwrap_err();
        assert!(err.to_string().contains("stderr"));

        let status = logging_status().unwrap();
        assert_eq!(status.level, "info");
        assert_eq!(
            status.destination,
            LogDestination::Directory(dir.path().to_path_buf())
        );
    }
}
