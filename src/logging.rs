use chrono::{SecondsFormat, Utc};
use once_cell::sync::OnceCell;
use serde::Serialize;
use serde_json::{Map, Value};
use std::env;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Level {
    Error,
    Warn,
    Info,
    Debug,
}

impl Level {
    fn name(self) -> &'static str {
        match self {
            Level::Error => "error",
            Level::Warn => "warn",
            Level::Info => "info",
            Level::Debug => "debug",
        }
    }

    fn parse(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "error" => Level::Error,
            "warn" | "warning" => Level::Warn,
            "debug" => Level::Debug,
            _ => Level::Info,
        }
    }
}

pub struct Logger {
    service: &'static str,
    host: String,
    min_level: Level,
}

static LOGGER: OnceCell<Logger> = OnceCell::new();

pub fn init_logger(service: &'static str) -> &'static Logger {
    LOGGER.get_or_init(|| Logger::new(service))
}

pub fn logger() -> &'static Logger {
    LOGGER.get_or_init(|| Logger::new(env!("CARGO_PKG_NAME")))
}

impl Logger {
    fn new(service: &'static str) -> Self {
        let host = hostname::get()
            .ok()
            .and_then(|value| value.into_string().ok())
            .or_else(|| env::var("HOSTNAME").ok())
            .unwrap_or_else(|| "unknown".to_string());
        let min_level = env::var("LOG_LEVEL")
            .map(|value| Level::parse(&value))
            .unwrap_or(Level::Info);

        Self {
            service,
            host,
            min_level,
        }
    }

    fn emit<T: Serialize>(&self, level: Level, event: &str, context: T) {
        if level > self.min_level {
            return;
        }

        let mut record = Map::new();
        record.insert(
            "timestamp".into(),
            Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
        );
        record.insert("service".into(), Value::String(self.service.to_string()));
        record.insert("host".into(), Value::String(self.host.clone()));
        record.insert("level".into(), Value::String(level.name().to_string()));
        record.insert("event".into(), Value::String(event.to_string()));

        match serde_json::to_value(context).unwrap_or(Value::Null) {
            Value::Object(fields) => record.extend(fields),
            Value::Null => {}
            other => {
                record.insert("context".into(), other);
            }
        }

        let line = Value::Object(record).to_string();
        if level <= Level::Warn {
            eprintln!("{line}");
        } else {
            println!("{line}");
        }
    }

    #[allow(dead_code)]
    pub fn debug<T: Serialize>(&self, event: &str, context: T) {
        self.emit(Level::Debug, event, context);
    }

    pub fn info<T: Serialize>(&self, event: &str, context: T) {
        self.emit(Level::Info, event, context);
    }

    pub fn warn<T: Serialize>(&self, event: &str, context: T) {
        self.emit(Level::Warn, event, context);
    }

    pub fn error<T: Serialize>(&self, event: &str, context: T) {
        self.emit(Level::Error, event, context);
    }
}
