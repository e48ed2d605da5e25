//! Leveled, environment-aware structured logging.

use std::error::Error;
use std::fmt;

use chrono::Utc;
use serde_json::{json, Value};

use pride_core::{Config, Environment, LogLevel};

/// Leveled logger bound to a short component tag.
///
/// A logger is constructed from the active [`Config`] and passed
/// explicitly to whatever needs one; there is no process-global logging
/// state. In production every record is emitted as one JSON object per
/// line; elsewhere as a human-readable prefixed line. Logging never
/// fails and never panics.
#[derive(Debug, Clone)]
pub struct Logger {
    min_level: LogLevel,
    tag: String,
    environment: Environment,
}

/// Structured metadata attached to a log record.
#[derive(Debug, Clone)]
pub enum MetaItem {
    /// An arbitrary structured value.
    Value(Value),
    /// An error with its cause chain, outermost first.
    Cause { message: String, chain: Vec<String> },
}

impl MetaItem {
    /// Capture an error and its source chain.
    pub fn from_error(err: &(dyn Error + 'static)) -> Self {
        let mut chain = Vec::new();
        let mut source = err.source();
        while let Some(cause) = source {
            chain.push(cause.to_string());
            source = cause.source();
        }
        Self::Cause {
            message: err.to_string(),
            chain,
        }
    }

    fn to_json(&self) -> Value {
        match self {
            Self::Value(value) => value.clone(),
            Self::Cause { message, chain } => json!({
                "message": message,
                "chain": chain,
            }),
        }
    }
}

/// One emitted log record.
#[derive(Debug, Clone)]
pub struct LogRecord {
    /// Severity of the record.
    pub level: LogLevel,
    /// Component tag of the emitting logger.
    pub tag: String,
    /// Log message.
    pub message: String,
    /// Attached metadata.
    pub meta: Vec<MetaItem>,
    /// RFC 3339 timestamp.
    pub timestamp: String,
}

impl LogRecord {
    /// Format as a single JSON line (production output).
    pub fn to_json(&self) -> String {
        let mut record = json!({
            "t": self.timestamp,
            "lvl": self.level.to_string(),
            "pre": self.tag,
            "msg": self.message,
        });
        if !self.meta.is_empty() {
            let meta: Vec<Value> = self.meta.iter().map(MetaItem::to_json).collect();
            record["meta"] = Value::Array(meta);
        }
        record.to_string()
    }

    /// Format as a human-readable line (development/staging output).
    ///
    /// Objects are flattened to `k=v` pairs; error cause chains are
    /// expanded onto their own lines only at `error` level.
    pub fn to_human(&self) -> String {
        let mut line = format!("[{}:{}] {}", self.tag, self.level, self.message);
        for item in &self.meta {
            match item {
                MetaItem::Value(value) => {
                    line.push(' ');
                    line.push_str(&human_value(value));
                }
                MetaItem::Cause { message, chain } => {
                    line.push(' ');
                    line.push_str(message);
                    if self.level == LogLevel::Error {
                        for cause in chain {
                            line.push_str("\n  caused by: ");
                            line.push_str(cause);
                        }
                    }
                }
            }
        }
        line
    }
}

fn human_value(value: &Value) -> String {
    match value {
        // Turn {"total": 526, "cache": 10} into "total=526, cache=10".
        Value::Object(map) => map
            .iter()
            .map(|(k, v)| format!("{}={}", k, human_scalar(v)))
            .collect::<Vec<_>>()
            .join(", "),
        other => human_scalar(other),
    }
}

fn human_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl Logger {
    /// Create a logger for a component.
    pub fn new(config: &Config, tag: impl Into<String>) -> Self {
        Self {
            min_level: config.log_level,
            tag: tag.into(),
            environment: config.environment,
        }
    }

    /// Log at debug level.
    pub fn debug(&self, message: impl fmt::Display) {
        self.log(LogLevel::Debug, message, Vec::new());
    }

    /// Log at info level.
    pub fn info(&self, message: impl fmt::Display) {
        self.log(LogLevel::Info, message, Vec::new());
    }

    /// Log at info level with a structured value.
    pub fn info_meta(&self, message: impl fmt::Display, meta: Value) {
        self.log(LogLevel::Info, message, vec![MetaItem::Value(meta)]);
    }

    /// Log at warn level.
    pub fn warn(&self, message: impl fmt::Display) {
        self.log(LogLevel::Warn, message, Vec::new());
    }

    /// Log at error level with the failure's cause chain.
    pub fn error(&self, message: impl fmt::Display, cause: &(dyn Error + 'static)) {
        self.log(
            LogLevel::Error,
            message,
            vec![MetaItem::from_error(cause)],
        );
    }

    /// Build a record for `level`, or `None` when below the threshold.
    pub fn record(
        &self,
        level: LogLevel,
        message: impl fmt::Display,
        meta: Vec<MetaItem>,
    ) -> Option<LogRecord> {
        if level < self.min_level {
            return None;
        }
        Some(LogRecord {
            level,
            tag: self.tag.clone(),
            message: message.to_string(),
            meta,
            timestamp: Utc::now().to_rfc3339(),
        })
    }

    fn log(&self, level: LogLevel, message: impl fmt::Display, meta: Vec<MetaItem>) {
        let Some(record) = self.record(level, message, meta) else {
            return;
        };
        if self.environment.is_production() {
            eprintln!("{}", record.to_json());
        } else {
            eprintln!("{}", record.to_human());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pride_core::VersionMetadata;

    fn config(level: LogLevel, environment: Environment) -> Config {
        Config {
            s_maxage: 300,
            swr_ttl: 600,
            environment,
            admin_key: "k".into(),
            sheets_api_key: "a".into(),
            sheet_id: "s".into(),
            log_level: level,
            version: VersionMetadata {
                id: "v1".into(),
                tag: "".into(),
                timestamp: "t".into(),
            },
        }
    }

    #[derive(Debug, thiserror::Error)]
    #[error("outer failed")]
    struct Outer(#[source] Inner);

    #[derive(Debug, thiserror::Error)]
    #[error("inner detail")]
    struct Inner;

    #[test]
    fn test_below_threshold_produces_no_record() {
        let logger = Logger::new(&config(LogLevel::Warn, Environment::Development), "cache");
        assert!(logger.record(LogLevel::Info, "quiet", Vec::new()).is_none());
        assert!(logger.record(LogLevel::Warn, "loud", Vec::new()).is_some());
    }

    #[test]
    fn test_none_level_disables_everything() {
        let logger = Logger::new(&config(LogLevel::None, Environment::Production), "cache");
        assert!(logger.record(LogLevel::Error, "fatal", Vec::new()).is_none());
    }

    #[test]
    fn test_json_record_shape() {
        let logger = Logger::new(&config(LogLevel::Debug, Environment::Production), "timing");
        let record = logger
            .record(
                LogLevel::Info,
                "server-timing",
                vec![MetaItem::Value(json!({"total": 52.1}))],
            )
            .unwrap();
        let parsed: Value = serde_json::from_str(&record.to_json()).unwrap();
        assert_eq!(parsed["lvl"], "info");
        assert_eq!(parsed["pre"], "timing");
        assert_eq!(parsed["msg"], "server-timing");
        assert_eq!(parsed["meta"][0]["total"], 52.1);
    }

    #[test]
    fn test_human_record_flattens_objects() {
        let logger = Logger::new(&config(LogLevel::Debug, Environment::Development), "cache");
        let record = logger
            .record(
                LogLevel::Info,
                "server-timing",
                vec![MetaItem::Value(json!({"cache": 10, "total": 526}))],
            )
            .unwrap();
        assert_eq!(record.to_human(), "[cache:info] server-timing cache=10, total=526");
    }

    #[test]
    fn test_error_chain_expanded_at_error_level_only() {
        let err = Outer(Inner);
        let logger = Logger::new(&config(LogLevel::Debug, Environment::Development), "cache");

        let record = logger
            .record(LogLevel::Error, "refresh failed", vec![MetaItem::from_error(&err)])
            .unwrap();
        let rendered = record.to_human();
        assert!(rendered.contains("outer failed"));
        assert!(rendered.contains("caused by: inner detail"));

        let record = logger
            .record(LogLevel::Warn, "refresh failed", vec![MetaItem::from_error(&err)])
            .unwrap();
        assert!(!record.to_human().contains("caused by"));
    }
}
