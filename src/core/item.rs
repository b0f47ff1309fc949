use chrono::{DateTime, Datelike, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One dated artifact considered for retention.
///
/// Calendar fields are never stored; they are always derived from
/// `timestamp` in UTC so they cannot drift out of sync with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    path: PathBuf,
    timestamp: DateTime<Utc>,
    is_directory: bool,
}

impl Item {
    pub fn new(path: impl Into<PathBuf>, timestamp: DateTime<Utc>, is_directory: bool) -> Self {
        Self {
            path: path.into(),
            timestamp,
            is_directory,
        }
    }

    pub fn file(path: impl Into<PathBuf>, timestamp: DateTime<Utc>) -> Self {
        Self::new(path, timestamp, false)
    }

    pub fn directory(path: impl Into<PathBuf>, timestamp: DateTime<Utc>) -> Self {
        Self::new(path, timestamp, true)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn is_directory(&self) -> bool {
        self.is_directory
    }

    pub fn year(&self) -> i32 {
        self.timestamp.year()
    }

    /// Month of year, 1–12.
    pub fn month(&self) -> u32 {
        self.timestamp.month()
    }

    /// ISO 8601 week number, 1–53.
    pub fn iso_week(&self) -> u32 {
        self.timestamp.iso_week().week()
    }

    /// Year the ISO week belongs to; differs from `year()` around new year.
    pub fn iso_week_year(&self) -> i32 {
        self.timestamp.iso_week().year()
    }

    pub fn day_of_month(&self) -> u32 {
        self.timestamp.day()
    }

    pub fn hour_of_day(&self) -> u32 {
        self.timestamp.hour()
    }
}
