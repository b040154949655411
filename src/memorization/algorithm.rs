//! Fixed-table spaced repetition for verse memorization
//!
//! A verse carries an SRS level. Each review schedules the next one after
//! the interval stored at that level:
//!
//! | level | 0 | 1 | 2 | 3 | 4  | 5  | 6  | 7   | 8+  |
//! |-------|---|---|---|---|----|----|----|-----|-----|
//! | days  | 0 | 1 | 3 | 7 | 15 | 30 | 90 | 180 | 365 |

use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StudyError;

/// Review intervals in days, indexed by SRS level
pub const INTERVAL_DAYS: [i64; 9] = [0, 1, 3, 7, 15, 30, 90, 180, 365];

/// Interval for a level; levels past the table use the last entry
pub fn interval_days(level: u32) -> i64 {
    let index = (level as usize).min(INTERVAL_DAYS.len() - 1);
    INTERVAL_DAYS[index]
}

/// When a verse reviewed at `now` with `level` is due again
pub fn next_review_after(now: DateTime<Utc>, level: u32) -> DateTime<Utc> {
    now + Duration::days(interval_days(level))
}

/// How well a verse was recalled during a review session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recall {
    /// Struggled; step back one level
    Hard,
    /// Recalled; stay at the current level
    Good,
    /// Effortless; advance one level
    Easy,
}

impl Recall {
    /// Level to record after a review at `current`
    pub fn next_level(&self, current: u32) -> u32 {
        match self {
            Recall::Hard => current.saturating_sub(1),
            Recall::Good => current,
            Recall::Easy => current.saturating_add(1),
        }
    }
}

impl FromStr for Recall {
    type Err = StudyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hard" => Ok(Recall::Hard),
            "good" => Ok(Recall::Good),
            "easy" => Ok(Recall::Easy),
            other => Err(StudyError::invalid(format!("unknown recall rating '{}'", other))),
        }
    }
}

/// Format an interval in days to a human-readable string
pub fn format_interval(days: i64) -> String {
    if days == 0 {
        "now".to_string()
    } else if days < 7 {
        format!("{}d", days)
    } else if days < 30 {
        format!("{}w", days / 7)
    } else if days < 365 {
        format!("{}mo", days / 30)
    } else {
        format!("{}y", days / 365)
    }
}
