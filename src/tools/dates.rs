//! Date normalization shared by the flight tools
//!
//! Models pass dates the way users phrase them: "明天", "tomorrow",
//! "2024/6/2". Everything is normalized to `yyyy-MM-dd` relative to the
//! injected clock's current local date.

use chrono::{DateTime, Duration, Local, NaiveDate};
use thiserror::Error;

/// Canonical output format
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Additional calendar formats accepted besides `DATE_FORMAT`
const ALTERNATE_FORMATS: &[&str] = &["%Y/%m/%d", "%Y.%m.%d", "%Y年%m月%d日"];

/// Relative day tokens and their offset from today
const RELATIVE_TOKENS: &[(&str, i64)] = &[
    ("today", 0),
    ("今天", 0),
    ("tomorrow", 1),
    ("明天", 1),
    ("day after tomorrow", 2),
    ("the day after tomorrow", 2),
    ("后天", 2),
    ("in three days", 3),
    ("three days later", 3),
    ("three days hence", 3),
    ("大后天", 3),
];

/// Source of the current local date
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Reads the system's local date at call time
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Always reports the same date
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "Invalid date '{input}'. Expected yyyy-MM-dd (e.g. 2024-06-02) or one of: \
     today/今天, tomorrow/明天, day after tomorrow/后天, three days hence/大后天"
)]
pub struct InvalidDate {
    pub input: String,
}

/// Resolves `input` to a calendar date relative to `today`
pub fn normalize_date(input: &str, today: NaiveDate) -> Result<NaiveDate, InvalidDate> {
    let trimmed = input.trim();
    let token = trimmed.to_lowercase().replace(['-', '_'], " ");

    if let Some((_, offset)) = RELATIVE_TOKENS.iter().find(|(name, _)| *name == token) {
        return Ok(today + Duration::days(*offset));
    }

    std::iter::once(DATE_FORMAT)
        .chain(ALTERNATE_FORMATS.iter().copied())
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
        .or_else(|| {
            DateTime::parse_from_rfc3339(trimmed)
                .ok()
                .map(|timestamp| timestamp.date_naive())
        })
        .ok_or_else(|| InvalidDate {
            input: input.to_string(),
        })
}

/// Normalizes and renders as `yyyy-MM-dd`
pub fn normalize_date_string(input: &str, today: NaiveDate) -> Result<String, InvalidDate> {
    normalize_date(input, today).map(|date| date.format(DATE_FORMAT).to_string())
}
