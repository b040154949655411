//! Bulk import of verses and their default translation from a data file

mod parser;

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ImportConfig;
use crate::error::StudyError;
use crate::moderation::{submit_in, AuthorKind, ContentDraft};
use crate::store::{insert_verse_in, Store};

pub use parser::{parse_line, VerseLine};

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Import stopped at line {line}: {source}")]
    Store {
        line: usize,
        #[source]
        source: StudyError,
    },
}

impl From<ImportError> for String {
    fn from(err: ImportError) -> Self {
        err.to_string()
    }
}

/// Outcome of an import run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    /// Verses created, each with its default translation
    pub imported: usize,
    /// Verses already present; left untouched
    pub skipped_existing: usize,
    /// Non-blank lines that did not follow the format
    pub unparsed: usize,
}

/// Import every line of `reader`.
///
/// Each verse and its translation are committed together; a store error
/// stops the import and earlier lines stay committed.
pub fn import_reader<R: BufRead>(
    store: &Store,
    reader: R,
    config: &ImportConfig,
) -> Result<ImportSummary, ImportError> {
    let mut summary = ImportSummary::default();

    for (index, line) in reader.lines().enumerate() {
        let line_no = index + 1;
        let line = line?;
        let line = line.trim_start_matches('\u{feff}');
        if line.trim().is_empty() {
            continue;
        }

        let Some(parsed) = parse_line(line) else {
            log::warn!("Skipping unparsable line {}: {}", line_no, line);
            summary.unparsed += 1;
            continue;
        };

        let created = store
            .transaction(|tx| {
                let Some(verse) =
                    insert_verse_in(tx, parsed.surah_id, parsed.ayah_number, &parsed.arabic_text)?
                else {
                    return Ok(false);
                };

                if !parsed.translation.is_empty() {
                    let draft = ContentDraft::translation(
                        verse.id,
                        config.language.as_str(),
                        parsed.translation.as_str(),
                        config.version_label.as_str(),
                    )
                    .as_default();
                    submit_in(tx, AuthorKind::SystemImport, &draft, Utc::now())?;
                }
                Ok(true)
            })
            .map_err(|source| ImportError::Store {
                line: line_no,
                source,
            })?;

        if created {
            summary.imported += 1;
        } else {
            log::debug!(
                "Verse {}:{} already exists, skipping",
                parsed.surah_id,
                parsed.ayah_number
            );
            summary.skipped_existing += 1;
        }
    }

    log::info!(
        "Imported {} verses ({} existing, {} unparsed)",
        summary.imported,
        summary.skipped_existing,
        summary.unparsed
    );
    Ok(summary)
}

/// Import a data file from disk
pub fn import_file(
    store: &Store,
    path: &Path,
    config: &ImportConfig,
) -> Result<ImportSummary, ImportError> {
    let file = File::open(path)?;
    log::info!("Importing verses from {:?}", path);
    import_reader(store, BufReader::new(file), config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moderation::{ContentKind, ContentStatus, ModerationEngine};
    use std::io::Cursor;
    use tempfile::TempDir;

    const SAMPLE: &str = "\
بِسْمِ ٱللَّهِ ٱلرَّحْمَٰنِ ٱلرَّحِيمِ ترجمہ: شروع اللہ کے نام سے<br/>س 001 آ 001
ٱلْحَمْدُ لِلَّهِ رَبِّ ٱلْعَٰلَمِينَ ترجمہ: سب تعریف اللہ کے لیے ہے<br/>س 001 آ 002

this line is broken
الم ترجمہ: <br/>س 002 آ 001
";

    #[test]
    fn test_import_creates_verses_and_default_translations() {
        let store = Store::open_in_memory().unwrap();
        let summary = import_reader(&store, Cursor::new(SAMPLE), &ImportConfig::default()).unwrap();

        assert_eq!(
            summary,
            ImportSummary {
                imported: 3,
                skipped_existing: 0,
                unparsed: 1,
            }
        );

        let engine = ModerationEngine::new(&store);
        let verse = store.verse_by_ref(1, 2).unwrap().unwrap();
        let presented = engine
            .presented(verse.id, ContentKind::Translation)
            .unwrap()
            .unwrap();
        assert_eq!(presented.body, "سب تعریف اللہ کے لیے ہے");
        assert_eq!(presented.version_label, "Imported Urdu");
        assert_eq!(presented.status, ContentStatus::Approved);
        assert!(presented.is_default);
        assert_eq!(presented.author, AuthorKind::SystemImport);

        // Verse with an empty translation has no content
        let muqattaat = store.verse_by_ref(2, 1).unwrap().unwrap();
        assert!(engine
            .items_for_verse(muqattaat.id, ContentKind::Translation, None)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_reimport_skips_existing_verses() {
        let store = Store::open_in_memory().unwrap();
        let config = ImportConfig {
            version_label: "Jalandhari".to_string(),
            language: "ur".to_string(),
        };
        import_reader(&store, Cursor::new(SAMPLE), &config).unwrap();
        let again = import_reader(&store, Cursor::new(SAMPLE), &config).unwrap();

        assert_eq!(again.imported, 0);
        assert_eq!(again.skipped_existing, 3);

        let verse = store.verse_by_ref(1, 1).unwrap().unwrap();
        let items = ModerationEngine::new(&store)
            .items_for_verse(verse.id, ContentKind::Translation, None)
            .unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].version_label, "Jalandhari");
    }

    #[test]
    fn test_import_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("quran.txt");
        std::fs::write(&path, SAMPLE).unwrap();

        let store = Store::open_in_memory().unwrap();
        let summary = import_file(&store, &path, &ImportConfig::default()).unwrap();
        assert_eq!(summary.imported, 3);
        assert_eq!(store.surah_verse_count(1).unwrap(), 2);

        assert!(matches!(
            import_file(&store, &temp.path().join("missing.txt"), &ImportConfig::default()),
            Err(ImportError::Io(_))
        ));
    }
}
