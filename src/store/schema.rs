//! Table definitions, applied idempotently on open

use rusqlite::Connection;

use crate::error::Result;

pub(super) fn apply(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- Canonical verse text, created at import time
        CREATE TABLE IF NOT EXISTS ayahs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            surah_id INTEGER NOT NULL,
            ayah_number INTEGER NOT NULL,
            arabic_text TEXT NOT NULL,
            UNIQUE(surah_id, ayah_number)
        );

        -- Translations, tafsir and word meanings.
        -- ayah_id is NULL only for surah-level tafsir, which uses surah_id.
        CREATE TABLE IF NOT EXISTS content_items (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            kind TEXT NOT NULL,
            ayah_id INTEGER,
            surah_id INTEGER,
            language TEXT,
            word_index INTEGER,
            arabic_word TEXT,
            grammar_notes TEXT,
            body TEXT NOT NULL,
            version_name TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'pending',
            is_default INTEGER NOT NULL DEFAULT 0,
            author_kind TEXT NOT NULL,
            author_id INTEGER,
            created_at TEXT NOT NULL,
            FOREIGN KEY (ayah_id) REFERENCES ayahs(id) ON DELETE CASCADE
        );

        CREATE TABLE IF NOT EXISTS hifz_progress (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            surah_id INTEGER NOT NULL,
            ayah_number INTEGER NOT NULL,
            status TEXT NOT NULL DEFAULT 'not_started',
            last_reviewed TEXT,
            next_review TEXT,
            srs_level INTEGER NOT NULL DEFAULT 0,
            UNIQUE(user_id, surah_id, ayah_number)
        );

        CREATE TABLE IF NOT EXISTS bookmarks (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            ayah_id INTEGER NOT NULL,
            created_at TEXT NOT NULL,
            UNIQUE(user_id, ayah_id),
            FOREIGN KEY (ayah_id) REFERENCES ayahs(id) ON DELETE CASCADE
        );

        CREATE TABLE IF NOT EXISTS private_notes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            ayah_id INTEGER NOT NULL,
            note TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            UNIQUE(user_id, ayah_id),
            FOREIGN KEY (ayah_id) REFERENCES ayahs(id) ON DELETE CASCADE
        );

        CREATE TABLE IF NOT EXISTS user_reading_log (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            ayah_id INTEGER NOT NULL,
            read_at TEXT NOT NULL,
            FOREIGN KEY (ayah_id) REFERENCES ayahs(id) ON DELETE CASCADE
        );

        -- One row per user; the reading position survives verse deletion as NULL
        CREATE TABLE IF NOT EXISTS user_settings (
            user_id INTEGER PRIMARY KEY,
            last_read_ayah_id INTEGER,
            updated_at TEXT NOT NULL,
            FOREIGN KEY (last_read_ayah_id) REFERENCES ayahs(id) ON DELETE SET NULL
        );

        CREATE INDEX IF NOT EXISTS idx_content_verse ON content_items(kind, ayah_id);
        CREATE INDEX IF NOT EXISTS idx_content_surah ON content_items(kind, surah_id);
        CREATE INDEX IF NOT EXISTS idx_content_status ON content_items(status);
        CREATE INDEX IF NOT EXISTS idx_hifz_user ON hifz_progress(user_id, next_review);
        CREATE INDEX IF NOT EXISTS idx_reading_user ON user_reading_log(user_id, read_at);
        "#,
    )?;

    log::debug!("Schema applied");
    Ok(())
}
