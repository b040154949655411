//! Moderation engine: submissions, admin decisions and default versions
//!
//! All writes go through an immediate transaction on the [`Store`], so the
//! clear-then-set of [`ModerationEngine::set_default`] cannot interleave with
//! another writer on the same group.

use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::models::*;
use super::selection::select_presented;
use crate::error::{Result, StudyError};
use crate::store::{require_surah, require_verse, validate_surah, Store};

const ITEM_COLUMNS: &str = "id, kind, ayah_id, surah_id, language, word_index, arabic_word, \
     grammar_notes, body, version_name, status, is_default, author_kind, author_id, created_at";

fn required<T>(value: Option<T>, column: usize, name: &str) -> rusqlite::Result<T> {
    value.ok_or_else(|| rusqlite::Error::InvalidColumnType(column, name.to_string(), Type::Null))
}

fn item_from_row(row: &Row) -> rusqlite::Result<ContentItem> {
    let kind: ContentKind = row.get(1)?;
    let ayah_id: Option<i64> = row.get(2)?;

    let detail = match kind {
        ContentKind::Translation => ContentDetail::Translation {
            ayah_id: required(ayah_id, 2, "ayah_id")?,
            language: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
        },
        ContentKind::Tafsir => {
            let target = match ayah_id {
                Some(ayah_id) => TafsirTarget::Ayah { ayah_id },
                None => TafsirTarget::Surah {
                    surah_id: required(row.get(3)?, 3, "surah_id")?,
                },
            };
            ContentDetail::Tafsir { target }
        }
        ContentKind::WordMeaning => ContentDetail::WordMeaning {
            ayah_id: required(ayah_id, 2, "ayah_id")?,
            word_index: required(row.get(5)?, 5, "word_index")?,
            arabic_word: row.get::<_, Option<String>>(6)?.unwrap_or_default(),
            grammar_notes: row.get(7)?,
        },
    };

    let author_kind: String = row.get(12)?;
    let author = AuthorKind::from_parts(&author_kind, row.get(13)?)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(12, Type::Text, Box::new(e)))?;

    Ok(ContentItem {
        id: row.get(0)?,
        detail,
        body: row.get(8)?,
        version_label: row.get(9)?,
        status: row.get(10)?,
        is_default: row.get(11)?,
        author,
        created_at: row.get(14)?,
    })
}

fn load_item(conn: &Connection, item_id: i64) -> Result<ContentItem> {
    let sql = format!("SELECT {} FROM content_items WHERE id = ?1", ITEM_COLUMNS);
    conn.query_row(&sql, params![item_id], item_from_row)
        .optional()?
        .ok_or_else(|| StudyError::not_found(format!("content item {}", item_id)))
}

fn query_items(conn: &Connection, sql: &str, args: &[&dyn rusqlite::ToSql]) -> Result<Vec<ContentItem>> {
    let mut stmt = conn.prepare(sql)?;
    let items = stmt
        .query_map(args, item_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(items)
}

/// Clear the default flag on every approved item of `key` except `keep`
fn clear_group_default(conn: &Connection, key: GroupKey, keep: Option<i64>) -> Result<usize> {
    let cleared = match key {
        GroupKey::Verse { ayah_id, kind } => conn.execute(
            "UPDATE content_items SET is_default = 0
             WHERE kind = ?1 AND ayah_id = ?2 AND status = 'approved' AND is_default = 1
               AND (?3 IS NULL OR id != ?3)",
            params![kind, ayah_id, keep],
        )?,
        GroupKey::Surah { surah_id, kind } => conn.execute(
            "UPDATE content_items SET is_default = 0
             WHERE kind = ?1 AND ayah_id IS NULL AND surah_id = ?2
               AND status = 'approved' AND is_default = 1
               AND (?3 IS NULL OR id != ?3)",
            params![kind, surah_id, keep],
        )?,
    };
    Ok(cleared)
}

fn validate_draft(draft: &ContentDraft) -> Result<()> {
    if draft.body.trim().is_empty() {
        return Err(StudyError::invalid("content body is empty"));
    }
    if draft.version_label.trim().is_empty() {
        return Err(StudyError::invalid("version label is empty"));
    }
    if let ContentDetail::WordMeaning { arabic_word, .. } = &draft.detail {
        if arabic_word.trim().is_empty() {
            return Err(StudyError::invalid("word meaning without the word it annotates"));
        }
    }
    Ok(())
}

/// Store a new content item inside an open transaction
pub(crate) fn submit_in(
    conn: &Connection,
    author: AuthorKind,
    draft: &ContentDraft,
    now: DateTime<Utc>,
) -> Result<ContentItem> {
    validate_draft(draft)?;

    let status = author.initial_status();
    if draft.make_default && status != ContentStatus::Approved {
        return Err(StudyError::PreconditionFailed(
            "contributed content cannot be submitted as default".to_string(),
        ));
    }

    match &draft.detail {
        ContentDetail::Tafsir {
            target: TafsirTarget::Surah { surah_id },
        } => {
            require_surah(conn, *surah_id)?;
        }
        detail => {
            if let Some(ayah_id) = detail.ayah_id() {
                require_verse(conn, ayah_id)?;
            }
        }
    }

    let (ayah_id, surah_id, language, word_index, arabic_word, grammar_notes) = match &draft.detail {
        ContentDetail::Translation { ayah_id, language } => {
            (Some(*ayah_id), None, Some(language.as_str()), None, None, None)
        }
        ContentDetail::Tafsir {
            target: TafsirTarget::Ayah { ayah_id },
        } => (Some(*ayah_id), None, None, None, None, None),
        ContentDetail::Tafsir {
            target: TafsirTarget::Surah { surah_id },
        } => (None, Some(*surah_id), None, None, None, None),
        ContentDetail::WordMeaning {
            ayah_id,
            word_index,
            arabic_word,
            grammar_notes,
        } => (
            Some(*ayah_id),
            None,
            None,
            Some(*word_index),
            Some(arabic_word.as_str()),
            grammar_notes.as_deref(),
        ),
    };

    let is_default = draft.make_default;
    if is_default {
        clear_group_default(conn, group_key_of(&draft.detail), None)?;
    }

    let (author_kind, author_id) = author.as_parts();
    conn.execute(
        "INSERT INTO content_items (kind, ayah_id, surah_id, language, word_index, arabic_word,
             grammar_notes, body, version_name, status, is_default, author_kind, author_id, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
        params![
            draft.detail.kind(),
            ayah_id,
            surah_id,
            language,
            word_index,
            arabic_word,
            grammar_notes,
            draft.body,
            draft.version_label,
            status,
            is_default,
            author_kind,
            author_id,
            now,
        ],
    )?;

    Ok(ContentItem {
        id: conn.last_insert_rowid(),
        detail: draft.detail.clone(),
        body: draft.body.clone(),
        version_label: draft.version_label.clone(),
        status,
        is_default,
        author,
        created_at: now,
    })
}

/// Moderation operations over a content store
pub struct ModerationEngine<'a> {
    store: &'a Store,
}

impl<'a> ModerationEngine<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    // ==================== Write Operations ====================

    /// Submit a translation, tafsir or word meaning.
    ///
    /// Contributor submissions start pending. Administrator and import
    /// submissions start approved and may be made default directly, which
    /// clears the previous default of the group in the same transaction.
    pub fn submit(&self, author: AuthorKind, draft: ContentDraft) -> Result<ContentItem> {
        let item = self
            .store
            .transaction(|tx| submit_in(tx, author, &draft, Utc::now()))?;
        log::debug!(
            "Submitted {} {} as {} (default={})",
            item.kind(),
            item.id,
            item.status,
            item.is_default
        );
        Ok(item)
    }

    /// Approve or reject a pending item. Decisions are one-shot.
    pub fn decide(&self, item_id: i64, decision: Decision) -> Result<ContentItem> {
        let to = decision.target_status();
        let item = self.store.transaction(|tx| {
            let mut item = load_item(tx, item_id)?;
            if item.status != ContentStatus::Pending {
                return Err(StudyError::InvalidTransition {
                    id: item_id,
                    from: item.status,
                    to,
                });
            }

            tx.execute(
                "UPDATE content_items SET status = ?1 WHERE id = ?2",
                params![to, item_id],
            )?;
            item.status = to;
            Ok(item)
        })?;
        log::debug!("Content item {} is now {}", item_id, to);
        Ok(item)
    }

    /// Set or clear the default flag of an item.
    ///
    /// Making an item default requires it to be approved and clears the
    /// flag on every other approved item of its group atomically. Clearing
    /// only touches this item.
    pub fn set_default(&self, item_id: i64, make_default: bool) -> Result<ContentItem> {
        self.store.transaction(|tx| {
            let mut item = load_item(tx, item_id)?;

            if make_default {
                if item.status != ContentStatus::Approved {
                    return Err(StudyError::PreconditionFailed(format!(
                        "content item {} is {}, only approved items can be default",
                        item_id, item.status
                    )));
                }
                let cleared = clear_group_default(tx, item.group_key(), Some(item_id))?;
                if cleared > 0 {
                    log::debug!("Cleared {} previous default(s) for item {}", cleared, item_id);
                }
            }

            tx.execute(
                "UPDATE content_items SET is_default = ?1 WHERE id = ?2",
                params![make_default, item_id],
            )?;
            item.is_default = make_default;
            Ok(item)
        })
    }

    // ==================== Queries ====================

    /// Get a content item by id
    pub fn item(&self, item_id: i64) -> Result<ContentItem> {
        self.store.read(|conn| load_item(conn, item_id))
    }

    /// Items of one kind attached to a verse, default first then by label.
    /// Word meanings are ordered by word position first.
    pub fn items_for_verse(
        &self,
        ayah_id: i64,
        kind: ContentKind,
        status: Option<ContentStatus>,
    ) -> Result<Vec<ContentItem>> {
        let sql = format!(
            "SELECT {} FROM content_items
             WHERE kind = ?1 AND ayah_id = ?2 AND (?3 IS NULL OR status = ?3)
             ORDER BY COALESCE(word_index, 0) ASC, is_default DESC, version_name ASC, id ASC",
            ITEM_COLUMNS
        );
        self.store
            .read(|conn| query_items(conn, &sql, &[&kind, &ayah_id, &status]))
    }

    /// Surah-level tafsir items
    pub fn surah_tafsir(&self, surah_id: u16, status: Option<ContentStatus>) -> Result<Vec<ContentItem>> {
        validate_surah(surah_id)?;
        let sql = format!(
            "SELECT {} FROM content_items
             WHERE kind = 'tafsir' AND ayah_id IS NULL AND surah_id = ?1
               AND (?2 IS NULL OR status = ?2)
             ORDER BY is_default DESC, version_name ASC, id ASC",
            ITEM_COLUMNS
        );
        self.store
            .read(|conn| query_items(conn, &sql, &[&surah_id, &status]))
    }

    /// Contributed items with the given status, oldest first
    pub fn suggestions(&self, status: ContentStatus) -> Result<Vec<ContentItem>> {
        let sql = format!(
            "SELECT {} FROM content_items
             WHERE author_kind = 'contributor' AND status = ?1
             ORDER BY created_at ASC, id ASC",
            ITEM_COLUMNS
        );
        self.store.read(|conn| query_items(conn, &sql, &[&status]))
    }

    /// The item shown for a verse and kind, if any is approved
    pub fn presented(&self, ayah_id: i64, kind: ContentKind) -> Result<Option<ContentItem>> {
        let items = self.items_for_verse(ayah_id, kind, Some(ContentStatus::Approved))?;
        Ok(select_presented(&items).cloned())
    }

    /// The surah-level tafsir shown for a surah, if any is approved
    pub fn presented_surah_tafsir(&self, surah_id: u16) -> Result<Option<ContentItem>> {
        let items = self.surah_tafsir(surah_id, Some(ContentStatus::Approved))?;
        Ok(select_presented(&items).cloned())
    }
}
