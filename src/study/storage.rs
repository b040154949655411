//! Bookmark, note and reading log storage

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Duration, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use super::models::*;
use crate::error::{Result, StudyError};
use crate::store::{require_verse, validate_surah, Store, Verse};

/// Readings of the same verse closer together than this count once
const READING_DEDUP_WINDOW_SECS: i64 = 60;

/// Verses whose text, default content or the user's note contains ?1.
/// Column order matches `SearchHit::from_row`.
const SEARCH_SQL: &str = "
    SELECT id, surah_id, ayah_number, arabic_text,
           in_text, in_translation, in_tafsir, in_word, in_note
    FROM (
        SELECT a.id, a.surah_id, a.ayah_number, a.arabic_text,
            a.arabic_text LIKE ?1 ESCAPE '\\' AS in_text,
            EXISTS (SELECT 1 FROM content_items c
                    WHERE c.ayah_id = a.id AND c.kind = 'translation'
                      AND c.status = 'approved' AND c.is_default = 1
                      AND c.body LIKE ?1 ESCAPE '\\') AS in_translation,
            EXISTS (SELECT 1 FROM content_items c
                    WHERE c.ayah_id = a.id AND c.kind = 'tafsir'
                      AND c.status = 'approved' AND c.is_default = 1
                      AND c.body LIKE ?1 ESCAPE '\\') AS in_tafsir,
            EXISTS (SELECT 1 FROM content_items c
                    WHERE c.ayah_id = a.id AND c.kind = 'word_meaning'
                      AND c.status = 'approved' AND c.is_default = 1
                      AND c.body LIKE ?1 ESCAPE '\\') AS in_word,
            (?2 IS NOT NULL AND EXISTS (SELECT 1 FROM private_notes n
                    WHERE n.ayah_id = a.id AND n.user_id = ?2
                      AND n.note LIKE ?1 ESCAPE '\\')) AS in_note
        FROM ayahs a
        WHERE ?3 IS NULL OR a.surah_id = ?3
    )
    WHERE in_text OR in_translation OR in_tafsir OR in_word OR in_note
    ORDER BY surah_id ASC, ayah_number ASC";

fn load_bookmark(conn: &Connection, user_id: i64, ayah_id: i64) -> Result<Option<Bookmark>> {
    let sql = format!(
        "SELECT {} FROM bookmarks b JOIN ayahs a ON a.id = b.ayah_id
         WHERE b.user_id = ?1 AND b.ayah_id = ?2",
        Bookmark::COLUMNS
    );
    Ok(conn
        .query_row(&sql, params![user_id, ayah_id], Bookmark::from_row)
        .optional()?)
}

fn set_last_read_in(conn: &Connection, user_id: i64, ayah_id: i64, now: DateTime<Utc>) -> Result<()> {
    conn.execute(
        "INSERT INTO user_settings (user_id, last_read_ayah_id, updated_at) VALUES (?1, ?2, ?3)
         ON CONFLICT(user_id) DO UPDATE SET
             last_read_ayah_id = excluded.last_read_ayah_id,
             updated_at = excluded.updated_at",
        params![user_id, ayah_id, now],
    )?;
    Ok(())
}

fn load_note(conn: &Connection, user_id: i64, ayah_id: i64) -> Result<Option<PrivateNote>> {
    let sql = format!(
        "SELECT {} FROM private_notes n JOIN ayahs a ON a.id = n.ayah_id
         WHERE n.user_id = ?1 AND n.ayah_id = ?2",
        PrivateNote::COLUMNS
    );
    Ok(conn
        .query_row(&sql, params![user_id, ayah_id], PrivateNote::from_row)
        .optional()?)
}

/// Per-user study artifacts over a content store
pub struct StudyStorage<'a> {
    store: &'a Store,
}

impl<'a> StudyStorage<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    // ===== Bookmarks =====

    /// Bookmark a verse. Returns `false` if it was already bookmarked.
    pub fn add_bookmark(&self, user_id: i64, ayah_id: i64) -> Result<bool> {
        self.store.transaction(|tx| {
            require_verse(tx, ayah_id)?;
            let inserted = tx.execute(
                "INSERT OR IGNORE INTO bookmarks (user_id, ayah_id, created_at) VALUES (?1, ?2, ?3)",
                params![user_id, ayah_id, Utc::now()],
            )?;
            Ok(inserted > 0)
        })
    }

    /// Remove a bookmark. Returns `false` if there was none.
    pub fn remove_bookmark(&self, user_id: i64, ayah_id: i64) -> Result<bool> {
        self.store.transaction(|tx| {
            require_verse(tx, ayah_id)?;
            let deleted = tx.execute(
                "DELETE FROM bookmarks WHERE user_id = ?1 AND ayah_id = ?2",
                params![user_id, ayah_id],
            )?;
            Ok(deleted > 0)
        })
    }

    pub fn is_bookmarked(&self, user_id: i64, ayah_id: i64) -> Result<bool> {
        self.store.read(|conn| {
            require_verse(conn, ayah_id)?;
            Ok(load_bookmark(conn, user_id, ayah_id)?.is_some())
        })
    }

    /// List all bookmarks of a user, newest first
    pub fn bookmarks(&self, user_id: i64) -> Result<Vec<Bookmark>> {
        let sql = format!(
            "SELECT {} FROM bookmarks b JOIN ayahs a ON a.id = b.ayah_id
             WHERE b.user_id = ?1 ORDER BY b.created_at DESC, b.id DESC",
            Bookmark::COLUMNS
        );
        self.store.read(|conn| {
            let mut stmt = conn.prepare(&sql)?;
            let bookmarks = stmt
                .query_map(params![user_id], Bookmark::from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(bookmarks)
        })
    }

    // ===== Private Notes =====

    /// Create or replace the user's note on a verse
    pub fn save_note(&self, user_id: i64, ayah_id: i64, text: &str) -> Result<PrivateNote> {
        let text = text.trim();
        if text.is_empty() {
            return Err(StudyError::invalid("note is empty"));
        }

        self.store.transaction(|tx| {
            require_verse(tx, ayah_id)?;
            let now = Utc::now();
            tx.execute(
                "INSERT INTO private_notes (user_id, ayah_id, note, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?4)
                 ON CONFLICT(user_id, ayah_id) DO UPDATE SET
                     note = excluded.note,
                     updated_at = excluded.updated_at",
                params![user_id, ayah_id, text, now],
            )?;
            load_note(tx, user_id, ayah_id)?.ok_or_else(|| {
                StudyError::StoreUnavailable("note vanished after write".to_string())
            })
        })
    }

    pub fn note(&self, user_id: i64, ayah_id: i64) -> Result<Option<PrivateNote>> {
        self.store.read(|conn| {
            require_verse(conn, ayah_id)?;
            load_note(conn, user_id, ayah_id)
        })
    }

    /// Delete the user's note on a verse. Returns `false` if there was none.
    pub fn delete_note(&self, user_id: i64, ayah_id: i64) -> Result<bool> {
        self.store.transaction(|tx| {
            require_verse(tx, ayah_id)?;
            let deleted = tx.execute(
                "DELETE FROM private_notes WHERE user_id = ?1 AND ayah_id = ?2",
                params![user_id, ayah_id],
            )?;
            Ok(deleted > 0)
        })
    }

    /// List all notes of a user, most recently edited first
    pub fn notes(&self, user_id: i64) -> Result<Vec<PrivateNote>> {
        let sql = format!(
            "SELECT {} FROM private_notes n JOIN ayahs a ON a.id = n.ayah_id
             WHERE n.user_id = ?1 ORDER BY n.updated_at DESC, n.id DESC",
            PrivateNote::COLUMNS
        );
        self.store.read(|conn| {
            let mut stmt = conn.prepare(&sql)?;
            let notes = stmt
                .query_map(params![user_id], PrivateNote::from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(notes)
        })
    }

    // ===== Reading Log =====

    /// Log that a user read a verse at `now`.
    ///
    /// The verse also becomes the user's last-read position. Returns
    /// `false` without adding a log entry when the same verse was already
    /// logged for the user within the last minute.
    pub fn log_reading(&self, user_id: i64, ayah_id: i64, now: DateTime<Utc>) -> Result<bool> {
        let since = now - Duration::seconds(READING_DEDUP_WINDOW_SECS);
        self.store.transaction(|tx| {
            require_verse(tx, ayah_id)?;
            set_last_read_in(tx, user_id, ayah_id, now)?;

            let recent: i64 = tx.query_row(
                "SELECT COUNT(*) FROM user_reading_log
                 WHERE user_id = ?1 AND ayah_id = ?2 AND read_at > ?3 AND read_at <= ?4",
                params![user_id, ayah_id, since, now],
                |row| row.get(0),
            )?;
            if recent > 0 {
                return Ok(false);
            }

            tx.execute(
                "INSERT INTO user_reading_log (user_id, ayah_id, read_at) VALUES (?1, ?2, ?3)",
                params![user_id, ayah_id, now],
            )?;
            Ok(true)
        })
    }

    /// Move the user's reading position without logging a read
    pub fn set_last_read(&self, user_id: i64, ayah_id: i64) -> Result<()> {
        self.store.transaction(|tx| {
            require_verse(tx, ayah_id)?;
            set_last_read_in(tx, user_id, ayah_id, Utc::now())
        })
    }

    /// The verse the user last read, if any
    pub fn last_read(&self, user_id: i64) -> Result<Option<Verse>> {
        let sql = format!(
            "SELECT {} FROM user_settings s JOIN ayahs ON ayahs.id = s.last_read_ayah_id
             WHERE s.user_id = ?1",
            Verse::COLUMNS
        );
        self.store.read(|conn| {
            Ok(conn
                .query_row(&sql, params![user_id], Verse::from_row)
                .optional()?)
        })
    }

    // ===== Search =====

    /// Find verses whose Arabic text, approved default translation, verse
    /// tafsir or word meaning contains `query`. With a user, their private
    /// notes are searched as well. Results are in mushaf order.
    pub fn search(&self, user_id: Option<i64>, query: &str, surah_id: Option<u16>) -> Result<Vec<SearchHit>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(StudyError::invalid("search query is empty"));
        }
        if let Some(surah_id) = surah_id {
            validate_surah(surah_id)?;
        }

        let pattern = like_pattern(query);
        self.store.read(|conn| {
            let mut stmt = conn.prepare(SEARCH_SQL)?;
            let hits = stmt
                .query_map(params![pattern, user_id, surah_id], SearchHit::from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(hits)
        })
    }

    // ===== Analytics =====

    /// Distinct verses read per bucket within the period's window, oldest bucket first
    pub fn reading_report(
        &self,
        user_id: i64,
        period: ReportPeriod,
        now: DateTime<Utc>,
    ) -> Result<Vec<ReadingReportRow>> {
        let start = period.window_start(now);
        let entries = self.store.read(|conn| {
            let mut stmt = conn.prepare(
                "SELECT ayah_id, read_at FROM user_reading_log
                 WHERE user_id = ?1 AND read_at >= ?2 AND read_at <= ?3",
            )?;
            let entries = stmt
                .query_map(params![user_id, start, now], |row| {
                    Ok((row.get::<_, i64>(0)?, row.get::<_, DateTime<Utc>>(1)?))
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(entries)
        })?;

        // Group distinct verses by bucket
        let mut buckets: BTreeMap<String, HashSet<i64>> = BTreeMap::new();
        for (ayah_id, read_at) in entries {
            buckets
                .entry(period.bucket(read_at))
                .or_default()
                .insert(ayah_id);
        }

        Ok(buckets
            .into_iter()
            .map(|(period, ayahs)| ReadingReportRow {
                period,
                ayahs_read: ayahs.len(),
            })
            .collect())
    }
}
