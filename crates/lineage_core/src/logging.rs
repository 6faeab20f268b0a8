//! File logging for the lineage core.
//!
//! Logging is opt-in: a host builds a [`LoggingConfig`] (the CLI fills it from
//! [`LOG_DIR_ENV`] / [`LOG_LEVEL_ENV`]) and calls [`init_logging_with`] once.
//! Until then every `log` macro in the crate is a no-op.
//!
//! # Events
//! Every line is `event=<name> module=<module> status=<ok|error|skipped|start>`
//! followed by ids, counts and durations only. Person names, addresses and
//! biographies are never written.
//!
//! | event | module | emitted by |
//! |---|---|---|
//! | `layout_pass` | layout | every [`crate::layout::layout`] call |
//! | `auto_fit` | viewport | [`crate::viewport::Viewport::auto_fit`] |
//! | `node_select` / `node_drag_commit` | interaction | pointer release |
//! | `ancestry_cycle` | kinship | an ancestry walk meeting a repeated id |
//! | `db_open` / `db_migrate` | db | connection bootstrap |
//! | `member_soft_delete` / `member_restore` | service | subtree delete, restore |
//! | `snapshot_import` | store | snapshot replacement |
//! | `panic_captured` | logging | the panic hook |

use flexi_logger::{
    Cleanup, Criterion, FileSpec, LogSpecBuilder, Logger, LoggerHandle, Naming, WriteMode,
};
use log::{error, info, LevelFilter};
use once_cell::sync::OnceCell;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Environment variable naming the absolute log directory.
pub const LOG_DIR_ENV: &str = "LINEAGE_LOG_DIR";
/// Environment variable overriding the level (`error`..`trace`).
pub const LOG_LEVEL_ENV: &str = "LINEAGE_LOG_LEVEL";

const LOG_FILE_BASENAME: &str = "lineage";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;
const MAX_LOG_FILES: usize = 5;
const MAX_PANIC_PAYLOAD_CHARS: usize = 160;

static ACTIVE: OnceCell<ActiveLogger> = OnceCell::new();
static PANIC_HOOK: OnceCell<()> = OnceCell::new();

struct ActiveLogger {
    config: LoggingConfig,
    handle: LoggerHandle,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoggingError {
    InvalidLevel(String),
    /// Log directory is blank or relative.
    InvalidDirectory(String),
    /// Logging already runs with a different configuration.
    AlreadyInitialized {
        active: LoggingConfig,
        requested: LoggingConfig,
    },
    Backend(String),
}

impl Display for LoggingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidLevel(level) => write!(
                f,
                "unsupported log level `{level}`; expected error|warn|info|debug|trace"
            ),
            Self::InvalidDirectory(dir) => {
                write!(f, "log directory must be a non-empty absolute path, got `{dir}`")
            }
            Self::AlreadyInitialized { active, requested } => write!(
                f,
                "logging already runs as {active}; refusing to switch to {requested}"
            ),
            Self::Backend(message) => write!(f, "failed to start logger: {message}"),
        }
    }
}

impl Error for LoggingError {}

/// Level and directory of the rolling log files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    pub level: LevelFilter,
    pub log_dir: PathBuf,
}

impl Display for LoggingConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "level={} dir={}",
            self.level.as_str().to_ascii_lowercase(),
            self.log_dir.display()
        )
    }
}

impl LoggingConfig {
    /// Validates a level name and an absolute directory.
    pub fn new(level: &str, log_dir: impl AsRef<Path>) -> Result<Self, LoggingError> {
        Ok(Self {
            level: parse_level(level)?,
            log_dir: validate_dir(log_dir.as_ref())?,
        })
    }
}

/// Starts rolling file logs for `config`.
///
/// Repeating the active configuration is a no-op; any other configuration is
/// rejected once logging runs. Never panics.
pub fn init_logging_with(config: &LoggingConfig) -> Result<(), LoggingError> {
    let active = ACTIVE.get_or_try_init(|| start_logger(config.clone()))?;
    if &active.config != config {
        return Err(LoggingError::AlreadyInitialized {
            active: active.config.clone(),
            requested: config.clone(),
        });
    }
    Ok(())
}

/// Shorthand for [`LoggingConfig::new`] followed by [`init_logging_with`].
pub fn init_logging(level: &str, log_dir: &str) -> Result<(), LoggingError> {
    init_logging_with(&LoggingConfig::new(level, log_dir)?)
}

/// Active configuration, `None` before initialization.
pub fn logging_status() -> Option<LoggingConfig> {
    ACTIVE.get().map(|active| active.config.clone())
}

/// Writes buffered lines to disk. No-op when logging is off.
pub fn flush_logging() {
    if let Some(active) = ACTIVE.get() {
        active.handle.flush();
    }
}

/// `Debug` for debug builds, `Info` for release builds.
pub fn default_log_level() -> LevelFilter {
    if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

fn start_logger(config: LoggingConfig) -> Result<ActiveLogger, LoggingError> {
    std::fs::create_dir_all(&config.log_dir).map_err(|err| {
        LoggingError::Backend(format!(
            "cannot create `{}`: {err}",
            config.log_dir.display()
        ))
    })?;

    let spec = LogSpecBuilder::new().default(config.level).build();
    let handle = Logger::with(spec)
        .log_to_file(
            FileSpec::default()
                .directory(config.log_dir.as_path())
                .basename(LOG_FILE_BASENAME),
        )
        .rotate(
            Criterion::Size(MAX_LOG_FILE_SIZE_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(MAX_LOG_FILES),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        .format_for_files(flexi_logger::detailed_format)
        .start()
        .map_err(|err| LoggingError::Backend(err.to_string()))?;

    install_panic_hook();
    info!(
        "event=logging_init module=logging status=ok level={} version={}",
        config.level.as_str().to_ascii_lowercase(),
        env!("CARGO_PKG_VERSION")
    );
    Ok(ActiveLogger { config, handle })
}

fn parse_level(level: &str) -> Result<LevelFilter, LoggingError> {
    match level.trim().parse::<LevelFilter>() {
        Ok(LevelFilter::Off) | Err(_) => Err(LoggingError::InvalidLevel(level.trim().to_string())),
        Ok(parsed) => Ok(parsed),
    }
}

fn validate_dir(dir: &Path) -> Result<PathBuf, LoggingError> {
    if dir.as_os_str().is_empty() || !dir.is_absolute() {
        return Err(LoggingError::InvalidDirectory(dir.display().to_string()));
    }
    Ok(dir.to_path_buf())
}

fn install_panic_hook() {
    if PANIC_HOOK.set(()).is_err() {
        return;
    }
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let location = info
            .location()
            .map_or_else(|| "unknown".to_string(), |loc| format!("{}:{}", loc.file(), loc.line()));
        let payload = info
            .payload()
            .downcast_ref::<&str>()
            .map(|message| (*message).to_string())
            .or_else(|| info.payload().downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        error!(
            "event=panic_captured module=logging status=error location={location} payload={}",
            single_line(&payload, MAX_PANIC_PAYLOAD_CHARS)
        );
        previous(info);
    }));
}

/// Payloads may quote person data: one line, capped length.
fn single_line(value: &str, max_chars: usize) -> String {
    let flattened = value.replace(['\n', '\r'], " ");
    if flattened.chars().count() <= max_chars {
        return flattened;
    }
    let mut capped: String = flattened.chars().take(max_chars).collect();
    capped.push_str("...");
    capped
}

#[cfg(test)]
mod tests {
    use super::{
        init_logging, init_logging_with, logging_status, parse_level, single_line, LoggingConfig,
        LoggingError,
    };
    use log::LevelFilter;

    #[test]
    fn levels_parse_case_insensitively() {
        assert_eq!(parse_level(" INFO ").unwrap(), LevelFilter::Info);
        assert_eq!(parse_level("trace").unwrap(), LevelFilter::Trace);
        assert!(matches!(parse_level("off"), Err(LoggingError::InvalidLevel(_))));
        assert!(matches!(parse_level("verbose"), Err(LoggingError::InvalidLevel(_))));
    }

    #[test]
    fn relative_directory_is_rejected() {
        let err = LoggingConfig::new("info", "logs/dev").unwrap_err();
        assert!(matches!(err, LoggingError::InvalidDirectory(_)));
    }

    #[test]
    fn panic_payload_is_flattened_and_capped() {
        assert_eq!(single_line("a\nb", 10), "a b");
        assert_eq!(single_line("abcdefghij", 4), "abcd...");
    }

    #[test]
    fn repeated_init_accepts_same_config_only() {
        let dir = tempfile::tempdir().unwrap();
        let other = tempfile::tempdir().unwrap();
        let config = LoggingConfig::new("info", dir.path()).unwrap();

        init_logging_with(&config).unwrap();
        init_logging_with(&config).unwrap();

        let dir_str = dir.path().to_str().unwrap();
        assert!(matches!(
            init_logging("debug", dir_str),
            Err(LoggingError::AlreadyInitialized { .. })
        ));
        assert!(matches!(
            init_logging("info", other.path().to_str().unwrap()),
            Err(LoggingError::AlreadyInitialized { .. })
        ));
        assert_eq!(logging_status(), Some(config));
    }
}
