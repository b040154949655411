//! Verse lookup and maintenance

use rusqlite::{params, Connection, OptionalExtension};

use super::models::{Verse, MAX_SURAH};
use super::Store;
use crate::error::{Result, StudyError};

pub(crate) fn validate_surah(surah_id: u16) -> Result<()> {
    if surah_id == 0 || surah_id > MAX_SURAH {
        return Err(StudyError::invalid(format!(
            "surah must be between 1 and {}, got {}",
            MAX_SURAH, surah_id
        )));
    }
    Ok(())
}

fn validate_ref(surah_id: u16, ayah_number: u16) -> Result<()> {
    validate_surah(surah_id)?;
    if ayah_number == 0 {
        return Err(StudyError::invalid("verse numbers start at 1"));
    }
    Ok(())
}

/// Fail with `NotFound` unless a verse with this id exists
pub(crate) fn require_verse(conn: &Connection, ayah_id: i64) -> Result<Verse> {
    get_by_id(conn, ayah_id)?.ok_or_else(|| StudyError::not_found(format!("verse {}", ayah_id)))
}

/// Fail with `NotFound` unless at least one verse of the surah is stored
pub(crate) fn require_surah(conn: &Connection, surah_id: u16) -> Result<()> {
    validate_surah(surah_id)?;
    if count_in_surah(conn, surah_id)? == 0 {
        return Err(StudyError::not_found(format!("surah {}", surah_id)));
    }
    Ok(())
}

pub(crate) fn get_by_id(conn: &Connection, ayah_id: i64) -> Result<Option<Verse>> {
    let sql = format!("SELECT {} FROM ayahs WHERE id = ?1", Verse::COLUMNS);
    Ok(conn
        .query_row(&sql, params![ayah_id], Verse::from_row)
        .optional()?)
}

pub(crate) fn get_by_ref(conn: &Connection, surah_id: u16, ayah_number: u16) -> Result<Option<Verse>> {
    let sql = format!(
        "SELECT {} FROM ayahs WHERE surah_id = ?1 AND ayah_number = ?2",
        Verse::COLUMNS
    );
    Ok(conn
        .query_row(&sql, params![surah_id, ayah_number], Verse::from_row)
        .optional()?)
}

fn count_in_surah(conn: &Connection, surah_id: u16) -> Result<usize> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM ayahs WHERE surah_id = ?1",
        params![surah_id],
        |row| row.get(0),
    )?;
    Ok(count as usize)
}

/// Insert a verse unless (surah, ayah) is already present
pub(crate) fn insert(
    conn: &Connection,
    surah_id: u16,
    ayah_number: u16,
    arabic_text: &str,
) -> Result<Option<Verse>> {
    validate_ref(surah_id, ayah_number)?;

    let inserted = conn.execute(
        "INSERT OR IGNORE INTO ayahs (surah_id, ayah_number, arabic_text) VALUES (?1, ?2, ?3)",
        params![surah_id, ayah_number, arabic_text],
    )?;
    if inserted == 0 {
        return Ok(None);
    }

    Ok(Some(Verse {
        id: conn.last_insert_rowid(),
        surah_id,
        ayah_number,
        arabic_text: arabic_text.to_string(),
    }))
}

impl Store {
    /// Insert a verse. Returns `None` if the reference already exists;
    /// the stored text is left untouched in that case.
    pub fn insert_verse(
        &self,
        surah_id: u16,
        ayah_number: u16,
        arabic_text: &str,
    ) -> Result<Option<Verse>> {
        self.transaction(|tx| insert(tx, surah_id, ayah_number, arabic_text))
    }

    pub fn verse_by_id(&self, ayah_id: i64) -> Result<Option<Verse>> {
        self.read(|conn| get_by_id(conn, ayah_id))
    }

    /// Look up a verse by (surah, verse number)
    pub fn verse_by_ref(&self, surah_id: u16, ayah_number: u16) -> Result<Option<Verse>> {
        self.read(|conn| get_by_ref(conn, surah_id, ayah_number))
    }

    /// All verses of a surah in verse order
    pub fn verses_in_surah(&self, surah_id: u16) -> Result<Vec<Verse>> {
        validate_surah(surah_id)?;
        self.read(|conn| {
            let sql = format!(
                "SELECT {} FROM ayahs WHERE surah_id = ?1 ORDER BY ayah_number ASC",
                Verse::COLUMNS
            );
            let mut stmt = conn.prepare(&sql)?;
            let verses = stmt
                .query_map(params![surah_id], Verse::from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(verses)
        })
    }

    pub fn surah_verse_count(&self, surah_id: u16) -> Result<usize> {
        validate_surah(surah_id)?;
        self.read(|conn| count_in_surah(conn, surah_id))
    }

    /// Delete a verse together with its content items and study artifacts
    pub fn delete_verse(&self, ayah_id: i64) -> Result<()> {
        self.transaction(|tx| {
            let deleted = tx.execute("DELETE FROM ayahs WHERE id = ?1", params![ayah_id])?;
            if deleted == 0 {
                return Err(StudyError::not_found(format!("verse {}", ayah_id)));
            }
            log::debug!("Deleted verse {}", ayah_id);
            Ok(())
        })
    }
}
