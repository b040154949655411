//! Data models for per-user study artifacts

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Days, Months, NaiveDate, TimeZone, Utc};
use rusqlite::Row;
use serde::{Deserialize, Serialize};

use crate::error::StudyError;

/// A verse saved by a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bookmark {
    pub id: i64,
    pub user_id: i64,
    pub ayah_id: i64,
    pub surah_id: u16,
    pub ayah_number: u16,
    pub created_at: DateTime<Utc>,
}

impl Bookmark {
    pub(crate) const COLUMNS: &'static str =
        "b.id, b.user_id, b.ayah_id, a.surah_id, a.ayah_number, b.created_at";

    pub(crate) fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            user_id: row.get(1)?,
            ayah_id: row.get(2)?,
            surah_id: row.get(3)?,
            ayah_number: row.get(4)?,
            created_at: row.get(5)?,
        })
    }
}

/// A note only its author can see
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivateNote {
    pub id: i64,
    pub user_id: i64,
    pub ayah_id: i64,
    pub surah_id: u16,
    pub ayah_number: u16,
    pub note: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PrivateNote {
    pub(crate) const COLUMNS: &'static str =
        "n.id, n.user_id, n.ayah_id, a.surah_id, a.ayah_number, n.note, n.created_at, n.updated_at";

    pub(crate) fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            user_id: row.get(1)?,
            ayah_id: row.get(2)?,
            surah_id: row.get(3)?,
            ayah_number: row.get(4)?,
            note: row.get(5)?,
            created_at: row.get(6)?,
            updated_at: row.get(7)?,
        })
    }
}

/// Bucket size of a reading report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportPeriod {
    /// Per day over the last 7 days
    Daily,
    /// Per month over the last year
    Monthly,
    /// Per year over the last 5 years
    Yearly,
}

impl ReportPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportPeriod::Daily => "daily",
            ReportPeriod::Monthly => "monthly",
            ReportPeriod::Yearly => "yearly",
        }
    }

    /// Start of the reporting window ending at `now`, aligned to midnight
    /// UTC at the start of its first bucket
    pub fn window_start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let today = now.date_naive();
        let first_day = match self {
            ReportPeriod::Daily => today.checked_sub_days(Days::new(7)),
            ReportPeriod::Monthly => today
                .checked_sub_months(Months::new(12))
                .and_then(|d| d.with_day(1)),
            ReportPeriod::Yearly => today
                .checked_sub_months(Months::new(60))
                .and_then(|d| NaiveDate::from_ymd_opt(d.year(), 1, 1)),
        };
        first_day
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|midnight| Utc.from_utc_datetime(&midnight))
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Bucket label of a timestamp
    pub fn bucket(&self, at: DateTime<Utc>) -> String {
        let format = match self {
            ReportPeriod::Daily => "%Y-%m-%d",
            ReportPeriod::Monthly => "%Y-%m",
            ReportPeriod::Yearly => "%Y",
        };
        at.format(format).to_string()
    }
}

impl fmt::Display for ReportPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportPeriod {
    type Err = StudyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => Ok(ReportPeriod::Daily),
            "monthly" => Ok(ReportPeriod::Monthly),
            "yearly" => Ok(ReportPeriod::Yearly),
            other => Err(StudyError::invalid(format!("unknown report period '{}'", other))),
        }
    }
}

/// Distinct verses read within one bucket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingReportRow {
    pub period: String,
    pub ayahs_read: usize,
}

/// Where a search query matched a verse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchSource {
    ArabicText,
    /// The approved default translation
    Translation,
    /// The approved default verse tafsir
    Tafsir,
    /// An approved default word meaning
    WordMeaning,
    /// The searching user's own note
    Note,
}

/// A verse matching a search query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    pub ayah_id: i64,
    pub surah_id: u16,
    pub ayah_number: u16,
    pub arabic_text: String,
    pub matched_in: Vec<MatchSource>,
}

impl SearchHit {
    pub(crate) fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let sources = [
            MatchSource::ArabicText,
            MatchSource::Translation,
            MatchSource::Tafsir,
            MatchSource::WordMeaning,
            MatchSource::Note,
        ];
        let mut matched_in = Vec::new();
        for (offset, source) in sources.into_iter().enumerate() {
            if row.get::<_, bool>(4 + offset)? {
                matched_in.push(source);
            }
        }

        Ok(Self {
            ayah_id: row.get(0)?,
            surah_id: row.get(1)?,
            ayah_number: row.get(2)?,
            arabic_text: row.get(3)?,
            matched_in,
        })
    }
}

/// Escape `%`, `_` and the escape character itself for a `LIKE .. ESCAPE '\'` substring pattern
pub(crate) fn like_pattern(query: &str) -> String {
    let mut pattern = String::with_capacity(query.len() + 2);
    pattern.push('%');
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buckets() {
        let at = Utc.with_ymd_and_hms(2026, 4, 9, 23, 59, 0).unwrap();
        assert_eq!(ReportPeriod::Daily.bucket(at), "2026-04-09");
        assert_eq!(ReportPeriod::Monthly.bucket(at), "2026-04");
        assert_eq!(ReportPeriod::Yearly.bucket(at), "2026");
    }

    #[test]
    fn test_windows() {
        let now = Utc.with_ymd_and_hms(2026, 4, 9, 12, 0, 0).unwrap();
        assert_eq!(
            ReportPeriod::Daily.window_start(now),
            Utc.with_ymd_and_hms(2026, 4, 2, 0, 0, 0).unwrap()
        );
        assert_eq!(
            ReportPeriod::Monthly.window_start(now),
            Utc.with_ymd_and_hms(2025, 4, 1, 0, 0, 0).unwrap()
        );
        assert_eq!(
            ReportPeriod::Yearly.window_start(now),
            Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap()
        );
        assert!("weekly".parse::<ReportPeriod>().is_err());
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("رحمن"), "%رحمن%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    }
}
