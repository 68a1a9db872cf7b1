//! Structured logging for the latency monitor
//!
//! Every line goes to stderr; stdout is reserved for the readout. Loggers
//! handed out by one [`LoggerFactory`] stamp the same session id, and a
//! probing session tags its records with a correlation id so the start,
//! failures and stop of one session can be grouped.

use crate::error::AppError;
use crate::models::Config;
use chrono::{DateTime, Utc};
use colored::{Color, Colorize};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::{self, Write};
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn label(self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }

    fn color(self) -> Color {
        match self {
            LogLevel::Debug => Color::Cyan,
            LogLevel::Info => Color::Green,
            LogLevel::Warn => Color::Yellow,
            LogLevel::Error => Color::Red,
        }
    }
}

/// How records are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// One human-readable line per record
    Console,
    /// One JSON object per line
    Json,
}

/// A single log record as written in JSON mode
#[derive(Debug, Clone, Serialize)]
pub struct LogRecord {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub component: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<String, serde_json::Value>,
    /// `file:line` of the logging call, set by the `log_*!` macros
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
}

/// A named logger.
///
/// Clones share the session id, so a copy handed to the probing task stays
/// in step with the caller's.
#[derive(Clone)]
pub struct Logger {
    component: String,
    threshold: LogLevel,
    format: LogFormat,
    use_color: bool,
    show_origin: bool,
    session_id: Arc<RwLock<Option<String>>>,
}

impl Logger {
    /// Console logger at Info, colored
    pub fn new(component: &str) -> Self {
        Self {
            component: component.to_string(),
            threshold: LogLevel::Info,
            format: LogFormat::Console,
            use_color: true,
            show_origin: false,
            session_id: Arc::new(RwLock::new(None)),
        }
    }

    /// Debug mode logs everything as JSON with call sites; verbose mode logs
    /// from Info; otherwise only warnings and errors are shown
    pub fn with_config(component: &str, config: &Config) -> Self {
        let threshold = match (config.debug, config.verbose) {
            (true, _) => LogLevel::Debug,
            (false, true) => LogLevel::Info,
            (false, false) => LogLevel::Warn,
        };
        Self {
            threshold,
            format: if config.debug { LogFormat::Json } else { LogFormat::Console },
            use_color: config.enable_color,
            show_origin: config.debug,
            ..Self::new(component)
        }
    }

    pub fn with_threshold(mut self, threshold: LogLevel) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn component(&self) -> &str {
        &self.component
    }

    pub async fn set_session_id(&self, session_id: String) {
        *self.session_id.write().await = Some(session_id);
    }

    pub fn enabled(&self, level: LogLevel) -> bool {
        level >= self.threshold
    }

    pub fn record(&self, level: LogLevel, message: &str) -> RecordBuilder<'_> {
        RecordBuilder {
            logger: self,
            record: LogRecord {
                timestamp: Utc::now(),
                level,
                component: self.component.clone(),
                message: message.to_string(),
                session_id: None,
                correlation_id: None,
                fields: BTreeMap::new(),
                origin: None,
            },
        }
    }

    pub fn debug(&self, message: &str) -> RecordBuilder<'_> {
        self.record(LogLevel::Debug, message)
    }

    pub fn info(&self, message: &str) -> RecordBuilder<'_> {
        self.record(LogLevel::Info, message)
    }

    pub fn warn(&self, message: &str) -> RecordBuilder<'_> {
        self.record(LogLevel::Warn, message)
    }

    pub fn error(&self, message: &str) -> RecordBuilder<'_> {
        self.record(LogLevel::Error, message)
    }

    async fn write(&self, mut record: LogRecord) {
        if !self.enabled(record.level) {
            return;
        }
        record.session_id = self.session_id.read().await.clone();

        let line = match self.format {
            LogFormat::Console => self.render_console(&record),
            LogFormat::Json => render_json(&record),
        };
        let _ = writeln!(io::stderr(), "{}", line);
    }

    fn render_console(&self, record: &LogRecord) -> String {
        let level = format!("{:>5}", record.level.label());
        let level = if self.use_color {
            level.color(record.level.color()).to_string()
        } else {
            level
        };

        let mut line = format!(
            "{} {} [{}] {}",
            record.timestamp.format("%H:%M:%S%.3f"),
            level,
            record.component,
            record.message
        );
        if let Some(id) = &record.correlation_id {
            line.push_str(&format!(" [{}]", id.get(..8).unwrap_or(id)));
        }
        if !record.fields.is_empty() {
            let fields: Vec<String> = record.fields.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
            line.push_str(&format!(" {{{}}}", fields.join(", ")));
        }
        if self.show_origin {
            if let Some(origin) = &record.origin {
                line.push_str(&format!(" @ {}", origin));
            }
        }
        line
    }
}

fn render_json(record: &LogRecord) -> String {
    serde_json::to_string(record).unwrap_or_else(|e| {
        serde_json::json!({ "level": record.level, "message": record.message, "serialize_error": e.to_string() })
            .to_string()
    })
}

/// Adds fields to a record before it is written
pub struct RecordBuilder<'a> {
    logger: &'a Logger,
    record: LogRecord,
}

impl RecordBuilder<'_> {
    pub fn correlation_id(mut self, id: &str) -> Self {
        self.record.correlation_id = Some(id.to_string());
        self
    }

    /// Attach a field; values that do not serialize are skipped
    pub fn field<T: Serialize>(mut self, key: &str, value: T) -> Self {
        if let Ok(value) = serde_json::to_value(value) {
            self.record.fields.insert(key.to_string(), value);
        }
        self
    }

    pub fn origin(mut self, file: &str, line: u32) -> Self {
        self.record.origin = Some(format!("{}:{}", file, line));
        self
    }

    /// Attach a duration as fractional milliseconds
    pub fn millis(self, key: &str, duration: Duration) -> Self {
        self.field(key, duration.as_secs_f64() * 1000.0)
    }

    pub fn error_info(self, error: &AppError) -> Self {
        self.field("error_category", error.category())
            .field("error_recoverable", error.is_recoverable())
            .field("error_exit_code", error.exit_code())
    }

    pub async fn emit(self) {
        self.logger.write(self.record).await;
    }
}

/// Records what a probing session does
#[derive(Clone)]
pub struct ProbeLogger {
    logger: Logger,
}

impl ProbeLogger {
    pub fn new(config: &Config) -> Self {
        Self::from_logger(Logger::with_config("PROBE", config))
    }

    pub fn from_logger(logger: Logger) -> Self {
        Self { logger }
    }

    /// Only warnings and errors get through
    pub fn quiet() -> Self {
        Self::from_logger(Logger::new("PROBE").with_threshold(LogLevel::Warn))
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    pub async fn log_resolution(&self, host: &str, result: std::result::Result<IpAddr, &AppError>, elapsed: Duration) {
        match result {
            Ok(addr) => {
                self.logger.debug(&format!("Resolved {} to {}", host, addr))
                    .field("host", host)
                    .field("address", addr.to_string())
                    .millis("duration_ms", elapsed)
                    .emit()
                    .await;
            }
            Err(error) => {
                self.logger.warn(&format!("Failed to resolve {}: {}", host, error))
                    .field("host", host)
                    .millis("duration_ms", elapsed)
                    .error_info(error)
                    .emit()
                    .await;
            }
        }
    }

    /// Log a new session and return the correlation id for its records
    pub async fn log_session_start(&self, host: &str, target: IpAddr, interval: Duration, timeout: Duration) -> String {
        let correlation_id = Uuid::new_v4().to_string();
        self.logger.info(&format!("Probing {} ({})", host, target))
            .correlation_id(&correlation_id)
            .field("host", host)
            .field("target", target.to_string())
            .millis("interval_ms", interval)
            .millis("timeout_ms", timeout)
            .emit()
            .await;
        correlation_id
    }

    pub async fn log_session_stop(&self, correlation_id: &str, total_probes: u64) {
        self.logger.info(&format!("Probe session finished after {} probes", total_probes))
            .correlation_id(correlation_id)
            .field("total_probes", total_probes)
            .emit()
            .await;
    }

    pub async fn log_rate_update(&self, rate: f64, capacity: usize) {
        self.logger.debug(&format!("Rate {:.1}/s, history capacity {}", rate, capacity))
            .field("rate", rate)
            .field("capacity", capacity)
            .emit()
            .await;
    }

    /// A probe with no reply; it is still recorded as a timeout sample
    pub async fn log_probe_failure(&self, sequence: u64, reason: &str) {
        // hot path when a host is down
        if !self.logger.enabled(LogLevel::Debug) {
            return;
        }
        self.logger.debug(&format!("Probe {} failed: {}", sequence, reason))
            .field("sequence", sequence)
            .field("reason", reason)
            .emit()
            .await;
    }
}

/// Writes `AppError`s with their category fields
pub struct ErrorEventLogger {
    logger: Logger,
}

impl ErrorEventLogger {
    pub fn new(config: &Config) -> Self {
        Self { logger: Logger::with_config("ERR", config) }
    }

    pub async fn log_error(&self, error: &AppError, context: Option<&str>, correlation_id: Option<&str>) {
        let message = match context {
            Some(ctx) => format!("{}: {}", ctx, error),
            None => error.to_string(),
        };

        let mut record = self.logger.error(&message).error_info(error);
        if let Some(id) = correlation_id {
            record = record.correlation_id(id);
        }
        if let Some(ctx) = context {
            record = record.field("context", ctx);
        }
        record.emit().await;
    }
}

/// Hands out named loggers that share one session ID
pub struct LoggerFactory {
    config: Config,
    session_id: String,
}

impl LoggerFactory {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            session_id: Uuid::new_v4().to_string(),
        }
    }

    pub async fn create_logger(&self, component: &str) -> Logger {
        let logger = Logger::with_config(component, &self.config);
        logger.set_session_id(self.session_id.clone()).await;
        logger
    }

    pub async fn create_probe_logger(&self) -> ProbeLogger {
        ProbeLogger::from_logger(self.create_logger("PROBE").await)
    }

    pub async fn create_error_logger(&self) -> ErrorEventLogger {
        ErrorEventLogger {
            logger: self.create_logger("ERR").await,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }
}

/// Log a formatted message tagged with the call site
#[macro_export]
macro_rules! log_debug {
    ($logger:expr, $($arg:tt)*) => {
        $logger.debug(&format!($($arg)*)).origin(file!(), line!()).emit().await
    };
}

#[macro_export]
macro_rules! log_info {
    ($logger:expr, $($arg:tt)*) => {
        $logger.info(&format!($($arg)*)).origin(file!(), line!()).emit().await
    };
}

#[macro_export]
macro_rules! log_warn {
    ($logger:expr, $($arg:tt)*) => {
        $logger.warn(&format!($($arg)*)).origin(file!(), line!()).emit().await
    };
}
