//! Memorization scheduler
//!
//! Records reviews per (user, surah, verse) and answers "what is due".

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use super::algorithm::{next_review_after, Recall};
use super::models::{MemorizationRecord, MemorizationStatus, ProgressSummary};
use crate::error::{Result, StudyError};
use crate::store::{validate_surah, verse_by_ref_in, Store};

fn load_record(
    conn: &Connection,
    user_id: i64,
    surah_id: u16,
    ayah_number: u16,
) -> Result<Option<MemorizationRecord>> {
    let sql = format!(
        "SELECT {} FROM hifz_progress WHERE user_id = ?1 AND surah_id = ?2 AND ayah_number = ?3",
        MemorizationRecord::COLUMNS
    );
    Ok(conn
        .query_row(&sql, params![user_id, surah_id, ayah_number], MemorizationRecord::from_row)
        .optional()?)
}

/// How a review changes the stored SRS level
#[derive(Debug, Clone, Copy)]
enum LevelUpdate {
    Keep,
    Set(u32),
    Adjust(Recall),
}

/// Memorization operations over a content store
pub struct MemorizationScheduler<'a> {
    store: &'a Store,
}

impl<'a> MemorizationScheduler<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Record a review of a verse now. See [`Self::record_review_at`].
    pub fn record_review(
        &self,
        user_id: i64,
        surah_id: u16,
        ayah_number: u16,
        status: MemorizationStatus,
        srs_level: Option<i32>,
    ) -> Result<MemorizationRecord> {
        self.record_review_at(user_id, surah_id, ayah_number, status, srs_level, Utc::now())
    }

    /// Record a review of a verse at `now`.
    ///
    /// With a level, the record moves to that level and is due again after
    /// its interval. Without one, the previous level and due date are kept.
    pub fn record_review_at(
        &self,
        user_id: i64,
        surah_id: u16,
        ayah_number: u16,
        status: MemorizationStatus,
        srs_level: Option<i32>,
        now: DateTime<Utc>,
    ) -> Result<MemorizationRecord> {
        let update = match srs_level {
            Some(level) => LevelUpdate::Set(u32::try_from(level).map_err(|_| {
                StudyError::invalid(format!("SRS level must not be negative, got {}", level))
            })?),
            None => LevelUpdate::Keep,
        };
        self.apply_review(user_id, surah_id, ayah_number, status, update, now)
    }

    /// Record a review rated by recall now. See [`Self::record_recall_at`].
    pub fn record_recall(
        &self,
        user_id: i64,
        surah_id: u16,
        ayah_number: u16,
        status: MemorizationStatus,
        recall: Recall,
    ) -> Result<MemorizationRecord> {
        self.record_recall_at(user_id, surah_id, ayah_number, status, recall, Utc::now())
    }

    /// Record a review at `now`, moving the stored level by `recall`.
    ///
    /// The current level is read and replaced in the same transaction, so
    /// concurrent ratings of one verse each take effect. A verse without a
    /// record starts from level 0.
    pub fn record_recall_at(
        &self,
        user_id: i64,
        surah_id: u16,
        ayah_number: u16,
        status: MemorizationStatus,
        recall: Recall,
        now: DateTime<Utc>,
    ) -> Result<MemorizationRecord> {
        self.apply_review(user_id, surah_id, ayah_number, status, LevelUpdate::Adjust(recall), now)
    }

    fn apply_review(
        &self,
        user_id: i64,
        surah_id: u16,
        ayah_number: u16,
        status: MemorizationStatus,
        update: LevelUpdate,
        now: DateTime<Utc>,
    ) -> Result<MemorizationRecord> {
        let record = self.store.transaction(|tx| {
            if verse_by_ref_in(tx, surah_id, ayah_number)?.is_none() {
                return Err(StudyError::not_found(format!(
                    "verse {}:{}",
                    surah_id, ayah_number
                )));
            }

            let existing = load_record(tx, user_id, surah_id, ayah_number)?;
            let (level, next_review) = match (update, &existing) {
                (LevelUpdate::Set(level), _) => (level, Some(next_review_after(now, level))),
                (LevelUpdate::Adjust(recall), prior) => {
                    let level = recall.next_level(prior.as_ref().map_or(0, |r| r.srs_level));
                    (level, Some(next_review_after(now, level)))
                }
                (LevelUpdate::Keep, Some(prior)) => (prior.srs_level, prior.next_review),
                (LevelUpdate::Keep, None) => (0, None),
            };

            tx.execute(
                "INSERT INTO hifz_progress
                     (user_id, surah_id, ayah_number, status, last_reviewed, next_review, srs_level)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 ON CONFLICT(user_id, surah_id, ayah_number) DO UPDATE SET
                     status = excluded.status,
                     last_reviewed = excluded.last_reviewed,
                     next_review = excluded.next_review,
                     srs_level = excluded.srs_level",
                params![user_id, surah_id, ayah_number, status, now, next_review, level],
            )?;

            load_record(tx, user_id, surah_id, ayah_number)?.ok_or_else(|| {
                StudyError::StoreUnavailable("memorization record vanished after write".to_string())
            })
        })?;

        log::debug!(
            "User {} reviewed {}:{} -> {} (level {})",
            user_id,
            surah_id,
            ayah_number,
            record.status,
            record.srs_level
        );
        Ok(record)
    }

    /// Records of a user, optionally limited to one surah, in mushaf order
    pub fn progress(&self, user_id: i64, surah_id: Option<u16>) -> Result<Vec<MemorizationRecord>> {
        if let Some(surah_id) = surah_id {
            validate_surah(surah_id)?;
        }
        let sql = format!(
            "SELECT {} FROM hifz_progress
             WHERE user_id = ?1 AND (?2 IS NULL OR surah_id = ?2)
             ORDER BY surah_id ASC, ayah_number ASC",
            MemorizationRecord::COLUMNS
        );
        self.store.read(|conn| {
            let mut stmt = conn.prepare(&sql)?;
            let records = stmt
                .query_map(params![user_id, surah_id], MemorizationRecord::from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(records)
        })
    }

    /// Records due for review at `now`, most overdue first
    pub fn due_reviews(&self, user_id: i64, now: DateTime<Utc>) -> Result<Vec<MemorizationRecord>> {
        let sql = format!(
            "SELECT {} FROM hifz_progress
             WHERE user_id = ?1 AND next_review IS NOT NULL AND next_review <= ?2
             ORDER BY next_review ASC, surah_id ASC, ayah_number ASC",
            MemorizationRecord::COLUMNS
        );
        self.store.read(|conn| {
            let mut stmt = conn.prepare(&sql)?;
            let records = stmt
                .query_map(params![user_id, now], MemorizationRecord::from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(records)
        })
    }

    /// Per-status counts for a user, plus how many are due at `now`
    pub fn progress_summary(&self, user_id: i64, now: DateTime<Utc>) -> Result<ProgressSummary> {
        self.store.read(|conn| {
            let mut summary = ProgressSummary::default();

            let mut stmt = conn.prepare(
                "SELECT status, COUNT(*) FROM hifz_progress WHERE user_id = ?1 GROUP BY status",
            )?;
            let counts = stmt
                .query_map(params![user_id], |row| {
                    Ok((row.get::<_, MemorizationStatus>(0)?, row.get::<_, i64>(1)?))
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            for (status, count) in counts {
                summary.add(status, count as usize);
            }

            let due: i64 = conn.query_row(
                "SELECT COUNT(*) FROM hifz_progress
                 WHERE user_id = ?1 AND next_review IS NOT NULL AND next_review <= ?2",
                params![user_id, now],
                |row| row.get(0),
            )?;
            summary.due = due as usize;

            Ok(summary)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn setup() -> Store {
        let store = Store::open_in_memory().unwrap();
        store.insert_verse(2, 255, "ٱللَّهُ لَآ إِلَٰهَ إِلَّا هُوَ").unwrap();
        store.insert_verse(2, 256, "لَآ إِكْرَاهَ فِى ٱلدِّينِ").unwrap();
        store.insert_verse(1, 1, "بِسْمِ ٱللَّهِ ٱلرَّحْمَٰنِ ٱلرَّحِيمِ").unwrap();
        store
    }

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, day, 6, 0, 0).unwrap()
    }

    #[test]
    fn test_first_review_creates_record() {
        let store = setup();
        let scheduler = MemorizationScheduler::new(&store);
        let now = at(10);

        let record = scheduler
            .record_review_at(1, 2, 255, MemorizationStatus::Review, Some(3), now)
            .unwrap();

        assert_eq!(record.user_id, 1);
        assert_eq!(record.status, MemorizationStatus::Review);
        assert_eq!(record.srs_level, 3);
        assert_eq!(record.last_reviewed, Some(now));
        assert_eq!(record.next_review, Some(now + Duration::days(7)));
    }

    #[test]
    fn test_level_past_table_uses_last_interval() {
        let store = setup();
        let scheduler = MemorizationScheduler::new(&store);

        scheduler
            .record_review_at(1, 2, 255, MemorizationStatus::Review, Some(3), at(10))
            .unwrap();
        let record = scheduler
            .record_review_at(1, 2, 255, MemorizationStatus::Memorized, Some(9), at(17))
            .unwrap();

        assert_eq!(record.srs_level, 9);
        assert_eq!(record.status, MemorizationStatus::Memorized);
        assert_eq!(record.next_review, Some(at(17) + Duration::days(365)));
        assert_eq!(scheduler.progress(1, None).unwrap().len(), 1);
    }

    #[test]
    fn test_next_review_for_every_level() {
        let store = setup();
        let scheduler = MemorizationScheduler::new(&store);
        let now = at(1);

        for level in 0..12 {
            let record = scheduler
                .record_review_at(4, 1, 1, MemorizationStatus::Learning, Some(level), now)
                .unwrap();
            let days = [0, 1, 3, 7, 15, 30, 90, 180, 365][(level as usize).min(8)];
            assert_eq!(record.next_review, Some(now + Duration::days(days)));
        }
    }

    #[test]
    fn test_review_without_level_keeps_schedule() {
        let store = setup();
        let scheduler = MemorizationScheduler::new(&store);

        let first = scheduler
            .record_review_at(1, 2, 256, MemorizationStatus::Learning, Some(2), at(1))
            .unwrap();
        let second = scheduler
            .record_review_at(1, 2, 256, MemorizationStatus::Memorized, None, at(2))
            .unwrap();

        assert_eq!(second.srs_level, 2);
        assert_eq!(second.next_review, first.next_review);
        assert_eq!(second.last_reviewed, Some(at(2)));
        assert_eq!(second.status, MemorizationStatus::Memorized);

        let fresh = scheduler
            .record_review_at(2, 1, 1, MemorizationStatus::Learning, None, at(3))
            .unwrap();
        assert_eq!(fresh.srs_level, 0);
        assert!(fresh.next_review.is_none());
    }

    #[test]
    fn test_review_validation() {
        let store = setup();
        let scheduler = MemorizationScheduler::new(&store);

        assert!(matches!(
            scheduler.record_review(1, 2, 300, MemorizationStatus::Learning, Some(1)),
            Err(StudyError::NotFound(_))
        ));
        assert!(matches!(
            scheduler.record_review(1, 2, 255, MemorizationStatus::Learning, Some(-1)),
            Err(StudyError::InvalidArgument(_))
        ));
        assert!(scheduler.progress(1, None).unwrap().is_empty());
    }

    #[test]
    fn test_due_reviews_and_summary() {
        let store = setup();
        let scheduler = MemorizationScheduler::new(&store);

        scheduler
            .record_review_at(1, 2, 255, MemorizationStatus::Learning, Some(1), at(1))
            .unwrap();
        scheduler
            .record_review_at(1, 2, 256, MemorizationStatus::Memorized, Some(5), at(1))
            .unwrap();
        scheduler
            .record_review_at(1, 1, 1, MemorizationStatus::Learning, Some(0), at(3))
            .unwrap();
        scheduler
            .record_review_at(2, 1, 1, MemorizationStatus::Learning, Some(0), at(1))
            .unwrap();

        let due: Vec<(u16, u16)> = scheduler
            .due_reviews(1, at(5))
            .unwrap()
            .iter()
            .map(|r| (r.surah_id, r.ayah_number))
            .collect();
        assert_eq!(due, vec![(2, 255), (1, 1)]);

        let summary = scheduler.progress_summary(1, at(5)).unwrap();
        assert_eq!(summary.learning, 2);
        assert_eq!(summary.memorized, 1);
        assert_eq!(summary.due, 2);
        assert_eq!(summary.total(), 3);

        let surah_two = scheduler.progress(1, Some(2)).unwrap();
        assert_eq!(surah_two.len(), 2);
        assert!(surah_two[0].ayah_number < surah_two[1].ayah_number);
        assert!(surah_two[0].is_due(at(5)));
        assert!(!surah_two[1].is_due(at(5)));
    }

    #[test]
    fn test_recall_moves_stored_level() {
        let store = setup();
        let scheduler = MemorizationScheduler::new(&store);
        let now = at(10);

        // No record yet: Hard stays at 0, Easy reaches 1
        let record = scheduler
            .record_recall_at(1, 2, 255, MemorizationStatus::Learning, Recall::Hard, now)
            .unwrap();
        assert_eq!(record.srs_level, 0);
        assert_eq!(record.next_review, Some(now));

        let record = scheduler
            .record_recall_at(1, 2, 256, MemorizationStatus::Learning, Recall::Easy, now)
            .unwrap();
        assert_eq!(record.srs_level, 1);
        assert_eq!(record.next_review, Some(now + Duration::days(1)));

        scheduler
            .record_review_at(1, 1, 1, MemorizationStatus::Review, Some(4), now)
            .unwrap();
        let record = scheduler
            .record_recall_at(1, 1, 1, MemorizationStatus::Review, Recall::Hard, at(20))
            .unwrap();
        assert_eq!(record.srs_level, 3);
        assert_eq!(record.next_review, Some(at(20) + Duration::days(7)));

        let record = scheduler
            .record_recall_at(1, 1, 1, MemorizationStatus::Memorized, Recall::Good, at(21))
            .unwrap();
        assert_eq!(record.srs_level, 3);
        assert_eq!(record.status, MemorizationStatus::Memorized);
    }

    #[test]
    fn test_recall_at_large_level() {
        let store = setup();
        let scheduler = MemorizationScheduler::new(&store);

        scheduler
            .record_review_at(1, 2, 255, MemorizationStatus::Memorized, Some(i32::MAX), at(1))
            .unwrap();
        let record = scheduler
            .record_recall_at(1, 2, 255, MemorizationStatus::Memorized, Recall::Easy, at(2))
            .unwrap();
        assert_eq!(record.srs_level, i32::MAX as u32 + 1);
        assert_eq!(record.next_review, Some(at(2) + Duration::days(365)));
    }

    #[test]
    fn test_recall_requires_verse() {
        let store = setup();
        let scheduler = MemorizationScheduler::new(&store);
        assert!(matches!(
            scheduler.record_recall_at(1, 3, 1, MemorizationStatus::Learning, Recall::Easy, at(1)),
            Err(StudyError::NotFound(_))
        ));
    }
}
