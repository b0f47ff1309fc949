use super::traits::TimeResolver;
use crate::core::Item;
use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

/// Timestamp from filesystem metadata: modification time, falling back
/// to creation time where the platform lacks it.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModifiedTimeResolver;

impl TimeResolver for ModifiedTimeResolver {
    fn name(&self) -> &str {
        "modified"
    }

    fn resolve(&self, path: &Path, is_directory: bool) -> Option<Item> {
        let metadata = match fs::metadata(path) {
            Ok(metadata) => metadata,
            Err(error) => {
                tracing::warn!(path = %path.display(), %error, "cannot read metadata");
                return None;
            }
        };
        let time = metadata.modified().or_else(|_| metadata.created()).ok()?;
        Some(Item::new(path, DateTime::<Utc>::from(time), is_directory))
    }
}

static FILENAME_TIMESTAMP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?x)
        (?P<year>\d{4}) -? (?P<month>\d{2}) -? (?P<day>\d{2})
        (?:
            [T_\x20-]?
            (?P<hour>\d{2}) :? (?P<minute>\d{2}) (?: :? (?P<second>\d{2}) )?
        )?",
    )
    .expect("filename timestamp pattern is valid")
});

/// Timestamp parsed from the entry name, e.g. `db-2023-05-03T14:00.sql`
/// or `20230503_1400.tar`. Interpreted as UTC; a time part that is out of
/// range (`T25:00`) falls back to midnight of the date.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilenameTimeResolver;

impl FilenameTimeResolver {
    pub fn parse(name: &str) -> Option<DateTime<Utc>> {
        FILENAME_TIMESTAMP.captures_iter(name).find_map(|caps| {
            let field = |key: &str| caps.name(key).and_then(|m| m.as_str().parse::<u32>().ok());
            let year = caps.name("year")?.as_str().parse::<i32>().ok()?;
            let date = NaiveDate::from_ymd_opt(year, field("month")?, field("day")?)?;
            // An impossible time of day still leaves a usable date.
            let time = NaiveTime::from_hms_opt(
                field("hour").unwrap_or(0),
                field("minute").unwrap_or(0),
                field("second").unwrap_or(0),
            )
            .unwrap_or(NaiveTime::MIN);
            Some(Utc.from_utc_datetime(&date.and_time(time)))
        })
    }
}

impl TimeResolver for FilenameTimeResolver {
    fn name(&self) -> &str {
        "filename"
    }

    fn resolve(&self, path: &Path, is_directory: bool) -> Option<Item> {
        let name = path.file_name()?.to_str()?;
        let Some(timestamp) = Self::parse(name) else {
            tracing::debug!(path = %path.display(), "no timestamp in name");
            return None;
        };
        Some(Item::new(path, timestamp, is_directory))
    }
}
