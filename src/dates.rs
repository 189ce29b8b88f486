//! Calendar helpers shared by the import and report layers.

use std::path::Path;
use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate};
use regex::Regex;

use crate::error::{Error, Result};

/// First date from which year-end snapshots are reported.
pub fn default_snapshot_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2014, 12, 1).unwrap_or_default()
}

static FILE_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{4})_(\d{2})_(\d{2})").unwrap());

/// Whether a file stem carries the `YYYY_MM_DD` pattern at all.
pub fn has_date_pattern(stem: &str) -> bool {
    FILE_DATE.is_match(stem)
}

/// The calendar date encoded in a stem, if the first `YYYY_MM_DD` match is a
/// real date.
pub fn date_in_stem(stem: &str) -> Option<NaiveDate> {
    let caps = FILE_DATE.captures(stem)?;
    let year = caps[1].parse().ok()?;
    let month = caps[2].parse().ok()?;
    let day = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// The export date encoded in a file name such as `2021_03_01.txt`.
pub fn date_from_filename(path: &Path) -> Result<NaiveDate> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .and_then(date_in_stem)
        .ok_or_else(|| Error::MissingFileDate(path.to_path_buf()))
}

/// Marker for the running month: the first of the month, or December 31st
/// while December is running.
pub fn current_month_marker(today: NaiveDate) -> NaiveDate {
    let day = if today.month() == 12 { 31 } else { 1 };
    today.with_day(day).unwrap_or(today)
}

/// December 1st of every year from `start` up to the current-month marker,
/// followed by the marker itself when it is not already in the list.
pub fn snapshot_dates(start: NaiveDate, today: NaiveDate) -> Vec<NaiveDate> {
    let end = current_month_marker(today);
    let mut dates: Vec<NaiveDate> = (start.year()..=end.year())
        .filter_map(|year| NaiveDate::from_ymd_opt(year, 12, 1))
        .filter(|d| *d >= start && *d <= end)
        .collect();
    if !dates.contains(&end) {
        dates.push(end);
    }
    dates
}

/// Last day of the month containing `date`.
pub fn month_end(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|d| d.pred_opt())
        .unwrap_or(date)
}
