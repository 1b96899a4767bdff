//! Named loggers shared by every StudyMate subsystem.
//!
//! Each module owns a `static LOGGER: LazyLock<Logger>` named `@studymate/<module>`. Messages below
//! the process-wide level are dropped; a user handler installed with [`set_user_log_handler`]
//! receives every record that passes the filter, in addition to the default stderr/stdout sink.

use chrono::{SecondsFormat, Utc};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, LazyLock, Mutex, PoisonError, RwLock, Weak};

static GLOBAL_LOG_LEVEL: AtomicU8 = AtomicU8::new(LogLevel::Info as u8);
static INSTANCES: LazyLock<Mutex<Vec<Weak<LoggerInner>>>> =
    LazyLock::new(|| Mutex::new(Vec::new()));

type SharedLogHandler = Arc<dyn Fn(&Logger, LogLevel, &LogRecord) + Send + Sync + 'static>;

/// A single log line: the human readable message plus an optional structured payload.
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    pub message: String,
    pub context: Option<Value>,
}

impl LogRecord {
    fn render(&self) -> String {
        match &self.context {
            Some(Value::String(text)) => format!("{} {}", self.message, text),
            Some(value) => format!("{} {}", self.message, value),
            None => self.message.clone(),
        }
    }
}

#[derive(Clone)]
pub struct Logger {
    inner: Arc<LoggerInner>,
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.inner.name)
            .field("level", &self.log_level())
            .finish()
    }
}

impl Logger {
    pub fn new(name: impl Into<String>) -> Self {
        let inner = Arc::new(LoggerInner::new(name.into()));
        track_instance(&inner);
        Self { inner }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn log_level(&self) -> LogLevel {
        LogLevel::from_u8(self.inner.log_level.load(Ordering::SeqCst))
    }

    pub fn set_log_level(&self, level: LogLevel) {
        self.inner.log_level.store(level as u8, Ordering::SeqCst);
    }

    pub fn set_log_handler<F>(&self, handler: F)
    where
        F: Fn(&Logger, LogLevel, &LogRecord) + Send + Sync + 'static,
    {
        *write_lock(&self.inner.log_handler) = Arc::new(handler);
    }

    pub fn reset_log_handler(&self) {
        *write_lock(&self.inner.log_handler) = Arc::new(default_log_handler);
    }

    fn user_log_handler(&self) -> Option<SharedLogHandler> {
        read_lock(&self.inner.user_log_handler).clone()
    }

    fn set_user_handler(&self, handler: Option<SharedLogHandler>) {
        *write_lock(&self.inner.user_log_handler) = handler;
    }

    pub fn debug(&self, message: impl Into<String>) {
        self.dispatch(LogLevel::Debug, message.into(), None);
    }

    pub fn info(&self, message: impl Into<String>) {
        self.dispatch(LogLevel::Info, message.into(), None);
    }

    pub fn warn(&self, message: impl Into<String>) {
        self.dispatch(LogLevel::Warn, message.into(), None);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.dispatch(LogLevel::Error, message.into(), None);
    }

    /// Logs `message` at `level` with a structured JSON payload appended.
    pub fn log_with(&self, level: LogLevel, message: impl Into<String>, context: Value) {
        self.dispatch(level, message.into(), Some(context));
    }

    fn dispatch(&self, level: LogLevel, message: String, context: Option<Value>) {
        let record = LogRecord { message, context };
        if let Some(handler) = self.user_log_handler() {
            handler(self, level, &record);
        }
        let handler = read_lock(&self.inner.log_handler).clone();
        handler(self, level, &record);
    }
}

struct LoggerInner {
    name: String,
    log_level: AtomicU8,
    log_handler: RwLock<SharedLogHandler>,
    user_log_handler: RwLock<Option<SharedLogHandler>>,
}

impl LoggerInner {
    fn new(name: String) -> Self {
        let level = GLOBAL_LOG_LEVEL.load(Ordering::SeqCst);
        Self {
            name,
            log_level: AtomicU8::new(level),
            log_handler: RwLock::new(Arc::new(default_log_handler)),
            user_log_handler: RwLock::new(None),
        }
    }
}

fn read_lock<T: Clone>(lock: &RwLock<T>) -> T {
    lock.read().unwrap_or_else(PoisonError::into_inner).clone()
}

fn write_lock<T>(lock: &RwLock<T>) -> std::sync::RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

fn track_instance(inner: &Arc<LoggerInner>) {
    INSTANCES
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push(Arc::downgrade(inner));
}

fn default_log_handler(logger: &Logger, level: LogLevel, record: &LogRecord) {
    if level < logger.log_level() || level == LogLevel::Silent {
        return;
    }

    let now = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    let line = format!("[{}]  {} {}: {}", now, level, logger.name(), record.render());
    match level {
        LogLevel::Warn | LogLevel::Error => eprintln!("{line}"),
        _ => println!("{line}"),
    }
}

fn with_instances<F>(mut f: F)
where
    F: FnMut(Logger),
{
    let mut instances = INSTANCES.lock().unwrap_or_else(PoisonError::into_inner);
    instances.retain(|weak| match weak.upgrade() {
        Some(inner) => {
            f(Logger { inner });
            true
        }
        None => false,
    });
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum LogLevel {
    Debug = 0,
    Verbose = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
    Silent = 5,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Verbose => "verbose",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Silent => "silent",
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            0 => LogLevel::Debug,
            1 => LogLevel::Verbose,
            2 => LogLevel::Info,
            3 => LogLevel::Warn,
            4 => LogLevel::Error,
            _ => LogLevel::Silent,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str().to_ascii_uppercase())
    }
}

impl FromStr for LogLevel {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "debug" => Ok(LogLevel::Debug),
            "verbose" => Ok(LogLevel::Verbose),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            "silent" => Ok(LogLevel::Silent),
            other => Err(LogError::InvalidLogLevel(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogError {
    InvalidLogLevel(String),
}

impl fmt::Display for LogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogError::InvalidLogLevel(level) => write!(f, "Invalid log level \"{level}\""),
        }
    }
}

impl std::error::Error for LogError {}

/// Parameters handed to a user log callback.
#[derive(Debug, Clone)]
pub struct LogCallbackParams {
    pub level: LogLevel,
    pub message: String,
    pub context: Option<Value>,
    pub logger_name: String,
}

pub type LogCallback = Arc<dyn Fn(LogCallbackParams) + Send + Sync + 'static>;

/// Sets the level on every live logger and on loggers created afterwards.
pub fn set_log_level(level: LogLevel) {
    GLOBAL_LOG_LEVEL.store(level as u8, Ordering::SeqCst);
    with_instances(|logger| logger.set_log_level(level));
}

/// Parses `level` (`"debug"`, `"warn"`, ...) and applies it with [`set_log_level`].
pub fn set_log_level_str(level: &str) -> Result<(), LogError> {
    set_log_level(level.parse()?);
    Ok(())
}

/// Installs (or with `None`, removes) a callback receiving records from every live logger.
///
/// `min_level` overrides each logger's own threshold for the callback only.
pub fn set_user_log_handler(callback: Option<LogCallback>, min_level: Option<LogLevel>) {
    match callback {
        Some(cb) => with_instances(|logger| {
            let cb = Arc::clone(&cb);
            let handler: SharedLogHandler = Arc::new(move |instance, level, record| {
                let threshold = min_level.unwrap_or_else(|| instance.log_level());
                if level < threshold {
                    return;
                }
                cb(LogCallbackParams {
                    level,
                    message: record.render(),
                    context: record.context.clone(),
                    logger_name: instance.name().to_owned(),
                });
            });
            logger.set_user_handler(Some(handler));
        }),
        None => with_instances(|logger| logger.set_user_handler(None)),
    }
}
