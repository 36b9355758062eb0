use std::fmt;
use std::io::Write;

use chrono::Local;
use log::{LevelFilter, Record, SetLoggerError};

#[derive(Debug, Clone)]
pub struct LogMessage {
    level: String,
    target: String,
    message: String,
    timestamp: String,
}

impl LogMessage {
    pub fn from_record(record: &Record) -> Self {
        Self {
            level: record.level().to_string(),
            target: record.target().to_string(),
            message: record.args().to_string(),
            timestamp: Local::now().to_rfc3339(),
        }
    }
}

impl fmt::Display for LogMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{:<5}] {}: {}", self.timestamp, self.level, self.target, self.message)
    }
}

/// Installs env_logger with timestamped lines. `RUST_LOG` wins over `level`.
pub fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
    let env = env_logger::Env::default().default_filter_or(level.as_str());
    let result = env_logger::Builder::from_env(env)
        .format(|buf, record| writeln!(buf, "{}", LogMessage::from_record(record)))
        .try_init();

    if result.is_ok() {
        log::debug!("Logging initialized");
    }
    result
}
