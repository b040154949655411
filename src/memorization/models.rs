//! Memorization progress records

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::Row;
use serde::{Deserialize, Serialize};

use crate::error::StudyError;

/// Memorization state of a verse for one user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemorizationStatus {
    #[default]
    NotStarted,
    Learning,
    Memorized,
    Review,
}

impl MemorizationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemorizationStatus::NotStarted => "not_started",
            MemorizationStatus::Learning => "learning",
            MemorizationStatus::Memorized => "memorized",
            MemorizationStatus::Review => "review",
        }
    }
}

impl fmt::Display for MemorizationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MemorizationStatus {
    type Err = StudyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "not_started" => Ok(MemorizationStatus::NotStarted),
            "learning" => Ok(MemorizationStatus::Learning),
            "memorized" => Ok(MemorizationStatus::Memorized),
            "review" => Ok(MemorizationStatus::Review),
            other => Err(StudyError::invalid(format!(
                "unknown memorization status '{}'",
                other
            ))),
        }
    }
}

impl ToSql for MemorizationStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for MemorizationStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e: StudyError| FromSqlError::Other(Box::new(e)))
    }
}

/// Progress of one user on one verse
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemorizationRecord {
    pub id: i64,
    pub user_id: i64,
    pub surah_id: u16,
    pub ayah_number: u16,
    pub status: MemorizationStatus,
    pub srs_level: u32,
    pub last_reviewed: Option<DateTime<Utc>>,
    pub next_review: Option<DateTime<Utc>>,
}

impl MemorizationRecord {
    pub(crate) const COLUMNS: &'static str =
        "id, user_id, surah_id, ayah_number, status, srs_level, last_reviewed, next_review";

    pub(crate) fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            user_id: row.get(1)?,
            surah_id: row.get(2)?,
            ayah_number: row.get(3)?,
            status: row.get(4)?,
            srs_level: row.get(5)?,
            last_reviewed: row.get(6)?,
            next_review: row.get(7)?,
        })
    }

    /// Whether the verse should be reviewed at `now`
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.next_review.map(|due| due <= now).unwrap_or(false)
    }
}

/// Per-status counts for a user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSummary {
    pub not_started: usize,
    pub learning: usize,
    pub memorized: usize,
    pub review: usize,
    pub due: usize,
}

impl ProgressSummary {
    pub fn total(&self) -> usize {
        self.not_started + self.learning + self.memorized + self.review
    }

    pub(crate) fn add(&mut self, status: MemorizationStatus, count: usize) {
        match status {
            MemorizationStatus::NotStarted => self.not_started += count,
            MemorizationStatus::Learning => self.learning += count,
            MemorizationStatus::Memorized => self.memorized += count,
            MemorizationStatus::Review => self.review += count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_labels() {
        for status in [
            MemorizationStatus::NotStarted,
            MemorizationStatus::Learning,
            MemorizationStatus::Memorized,
            MemorizationStatus::Review,
        ] {
            assert_eq!(status.as_str().parse::<MemorizationStatus>().unwrap(), status);
        }
        assert!(matches!(
            "forgotten".parse::<MemorizationStatus>(),
            Err(StudyError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_summary_total() {
        let mut summary = ProgressSummary::default();
        summary.add(MemorizationStatus::Learning, 3);
        summary.add(MemorizationStatus::Memorized, 2);
        assert_eq!(summary.total(), 5);
    }
}
