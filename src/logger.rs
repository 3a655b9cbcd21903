use std::path::PathBuf;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::settings::config_dir;

pub const MAX_ENTRIES: usize = 1000;
pub const RETENTION_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Info,
    Warn,
    Error,
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Level::Info => write!(f, "info"),
            Level::Warn => write!(f, "warn"),
            Level::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: Level,
    pub message: String,
    #[serde(default)]
    pub context: Option<String>,
}

/// Capped log buffer persisted to a JSON file in the config dir. Entries
/// older than the retention window are dropped on load and on append; the
/// buffer never exceeds MAX_ENTRIES (oldest evicted first).
pub struct Logger {
    path: PathBuf,
    entries: Vec<LogEntry>,
}

impl Logger {
    pub fn open() -> Self {
        Self::open_at(config_dir().join("log.json"))
    }

    pub fn open_at(path: PathBuf) -> Self {
        let entries = std::fs::read_to_string(&path)
            .ok()
            .and_then(|content| serde_json::from_str(&content).ok())
            .unwrap_or_default();
        let mut logger = Self { path, entries };
        logger.prune(Utc::now());
        logger
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.append(Level::Info, message.into(), None);
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.append(Level::Warn, message.into(), None);
    }

    pub fn error(&mut self, message: impl Into<String>, context: Option<String>) {
        self.append(Level::Error, message.into(), context);
    }

    fn append(&mut self, level: Level, message: String, context: Option<String>) {
        let now = Utc::now();
        self.entries.push(LogEntry {
            timestamp: now,
            level,
            message,
            context,
        });
        self.prune(now);
        // log persistence must never take the app down
        let _ = self.persist();
    }

    fn prune(&mut self, now: DateTime<Utc>) {
        let cutoff = now - Duration::days(RETENTION_DAYS);
        self.entries.retain(|e| e.timestamp >= cutoff);
        if self.entries.len() > MAX_ENTRIES {
            let excess = self.entries.len() - MAX_ENTRIES;
            self.entries.drain(..excess);
        }
    }

    pub fn clear(&mut self) -> Result<()> {
        self.entries.clear();
        self.persist()
    }

    fn persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string(&self.entries)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}
