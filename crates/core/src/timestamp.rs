//! Point in time associated with an input document.
//!
//! Release files are named after their publication date, e.g.
//! `RxNorm-2024-01-02.owl`. The timestamp decides whether each coded item is still active.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use regex::Regex;
use rxnorm_types::DocumentMonth;
use serde::Serialize;
use std::sync::LazyLock;

static FILE_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{4}-\d{2}-\d{2})").expect("date pattern must compile"));

/// Where a [`DocumentTimestamp`] came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimestampSource {
    /// A `YYYY-MM-DD` date in the document's file name.
    FileName,
    /// The file name carried no usable date; the caller's fallback was used.
    Fallback,
    /// Given directly by the caller.
    Supplied,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct DocumentTimestamp {
    instant: DateTime<Utc>,
    source: TimestampSource,
}

impl DocumentTimestamp {
    pub fn at(instant: DateTime<Utc>) -> Self {
        Self {
            instant,
            source: TimestampSource::Supplied,
        }
    }

    /// Reads the first `YYYY-MM-DD` substring of `file_name` as midnight UTC.
    ///
    /// A missing or impossible date (e.g. `2024-02-30`) is not fatal: `fallback` is used and
    /// a warning is logged.
    pub fn from_file_name(file_name: &str, fallback: DateTime<Utc>) -> Self {
        let parsed = FILE_DATE_RE
            .captures(file_name)
            .and_then(|caps| caps.get(1))
            .and_then(|m| NaiveDate::parse_from_str(m.as_str(), "%Y-%m-%d").ok())
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc());

        match parsed {
            Some(instant) => Self {
                instant,
                source: TimestampSource::FileName,
            },
            None => {
                tracing::warn!(
                    file_name,
                    fallback = %fallback,
                    "no valid YYYY-MM-DD date in file name, using fallback time"
                );
                Self {
                    instant: fallback,
                    source: TimestampSource::Fallback,
                }
            }
        }
    }

    pub fn from_file_name_or_now(file_name: &str) -> Self {
        Self::from_file_name(file_name, Utc::now())
    }

    pub fn instant(&self) -> DateTime<Utc> {
        self.instant
    }

    pub fn source(&self) -> TimestampSource {
        self.source
    }

    /// The `YYYYMM` month coded items are compared against.
    pub fn month(&self) -> DocumentMonth {
        let year = u32::try_from(self.instant.year()).unwrap_or(0);
        DocumentMonth::from_year_month(year, self.instant.month())
            .expect("chrono months are always 1..=12")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fallback() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 6, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn date_in_file_name_is_midnight_utc() {
        let ts = DocumentTimestamp::from_file_name("Thing-2024-01-02.owl", fallback());

        assert_eq!(ts.source(), TimestampSource::FileName);
        assert_eq!(
            ts.instant(),
            Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap()
        );
        assert_eq!(ts.month().as_u32(), 202401);
    }

    #[test]
    fn first_date_wins() {
        let ts = DocumentTimestamp::from_file_name("2023-05-01_to_2024-01-01.owl", fallback());
        assert_eq!(ts.month().as_u32(), 202305);
    }

    #[test]
    fn missing_date_uses_fallback() {
        let ts = DocumentTimestamp::from_file_name("rxnorm.owl", fallback());

        assert_eq!(ts.source(), TimestampSource::Fallback);
        assert_eq!(ts.instant(), fallback());
        assert_eq!(ts.month().as_u32(), 203006);
    }

    #[test]
    fn impossible_date_uses_fallback() {
        let ts = DocumentTimestamp::from_file_name("RxNorm-2024-02-30.owl", fallback());
        assert_eq!(ts.source(), TimestampSource::Fallback);
    }

    #[test]
    fn supplied_instant_is_kept() {
        let ts = DocumentTimestamp::at(fallback());
        assert_eq!(ts.source(), TimestampSource::Supplied);
        assert_eq!(ts.instant(), fallback());
    }
}
