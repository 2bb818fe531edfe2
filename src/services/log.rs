use crate::error::MarketError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    Info,
    Error,
}

impl LogLevel {
    fn marker(&self) -> &'static str {
        match self {
            LogLevel::Info => "🟢",
            LogLevel::Error => "🔴",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub marketplace: Option<String>,
    pub event: String,
    pub details: Option<String>,
}

impl LogEntry {
    fn line(&self) -> String {
        format!(
            "{} {} {} {} {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
            self.level.marker(),
            self.event,
            self.marketplace.as_deref().unwrap_or("*"),
            self.details.as_deref().unwrap_or("")
        )
    }
}

/// Append-only record of public API calls, one line per call.
#[derive(Debug, Clone)]
pub struct ActivityLogger {
    log_path: PathBuf,
}

impl ActivityLogger {
    /// Logger writing to `~/.marketcrawl/activity.log`.
    pub fn new() -> crate::Result<Self> {
        let user_dirs = directories::UserDirs::new().ok_or_else(|| {
            MarketError::storage("initialization", "could not determine home directory")
        })?;
        Self::at(user_dirs.home_dir().join(".marketcrawl").join("activity.log"))
    }

    pub fn at(log_path: impl Into<PathBuf>) -> crate::Result<Self> {
        let log_path = log_path.into();
        if let Some(dir) = log_path.parent() {
            fs::create_dir_all(dir)?;
        }
        Ok(Self { log_path })
    }

    pub fn path(&self) -> &Path {
        &self.log_path
    }

    pub fn log(
        &self,
        level: LogLevel,
        marketplace: Option<&str>,
        event: &str,
        details: Option<&str>,
    ) -> crate::Result<()> {
        let entry = LogEntry {
            timestamp: Utc::now(),
            level,
            marketplace: marketplace.map(|m| m.to_string()),
            event: event.to_string(),
            details: details.map(|d| d.to_string()),
        };

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)?;
        writeln!(file, "{}", entry.line())?;
        Ok(())
    }

    /// Matching lines, most recent first.
    pub fn read_logs(
        &self,
        marketplace_filter: Option<&str>,
        errors_only: bool,
    ) -> crate::Result<Vec<String>> {
        if !self.log_path.exists() {
            return Ok(vec![]);
        }

        let reader = BufReader::new(fs::File::open(&self.log_path)?);
        let mut matching_lines = Vec::new();

        for line in reader.lines() {
            let line = line?;
            if errors_only && !line.contains(LogLevel::Error.marker()) {
                continue;
            }
            if let Some(marketplace) = marketplace_filter {
                let token = format!(" {} ", marketplace.to_ascii_uppercase());
                if !line.contains(&token) {
                    continue;
                }
            }
            matching_lines.push(line);
        }

        matching_lines.reverse();
        Ok(matching_lines)
    }

    pub fn info(
        &self,
        marketplace: Option<&str>,
        event: &str,
        details: Option<&str>,
    ) -> crate::Result<()> {
        self.log(LogLevel::Info, marketplace, event, details)
    }

    pub fn error(
        &self,
        marketplace: Option<&str>,
        event: &str,
        details: Option<&str>,
    ) -> crate::Result<()> {
        self.log(LogLevel::Error, marketplace, event, details)
    }
}
