//! Data models for contributed content and its moderation lifecycle

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

use crate::error::StudyError;

/// Kind of annotation attached to a verse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Translation,
    Tafsir,
    WordMeaning,
}

impl ContentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Translation => "translation",
            ContentKind::Tafsir => "tafsir",
            ContentKind::WordMeaning => "word_meaning",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentKind {
    type Err = StudyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "translation" => Ok(ContentKind::Translation),
            "tafsir" => Ok(ContentKind::Tafsir),
            "word_meaning" => Ok(ContentKind::WordMeaning),
            other => Err(StudyError::invalid(format!("unknown content kind '{}'", other))),
        }
    }
}

/// Moderation status of a content item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentStatus {
    /// Submitted by a contributor, awaiting review
    Pending,
    /// Visible to readers, eligible to be the default version
    Approved,
    /// Kept for audit, never shown
    Rejected,
}

impl ContentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentStatus::Pending => "pending",
            ContentStatus::Approved => "approved",
            ContentStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ContentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentStatus {
    type Err = StudyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ContentStatus::Pending),
            "approved" => Ok(ContentStatus::Approved),
            "rejected" => Ok(ContentStatus::Rejected),
            other => Err(StudyError::invalid(format!("unknown content status '{}'", other))),
        }
    }
}

impl ToSql for ContentKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for ContentKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e: StudyError| FromSqlError::Other(Box::new(e)))
    }
}

impl ToSql for ContentStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for ContentStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e: StudyError| FromSqlError::Other(Box::new(e)))
    }
}

/// What a tafsir comments on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum TafsirTarget {
    /// A single verse
    Ayah { ayah_id: i64 },
    /// A whole surah
    Surah { surah_id: u16 },
}

/// Kind-specific part of a content item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContentDetail {
    Translation {
        ayah_id: i64,
        language: String,
    },
    Tafsir {
        target: TafsirTarget,
    },
    WordMeaning {
        ayah_id: i64,
        /// Zero-based position of the word in the verse text
        word_index: u32,
        arabic_word: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        grammar_notes: Option<String>,
    },
}

impl ContentDetail {
    pub fn kind(&self) -> ContentKind {
        match self {
            ContentDetail::Translation { .. } => ContentKind::Translation,
            ContentDetail::Tafsir { .. } => ContentKind::Tafsir,
            ContentDetail::WordMeaning { .. } => ContentKind::WordMeaning,
        }
    }

    /// Verse this item annotates, `None` for surah-level tafsir
    pub fn ayah_id(&self) -> Option<i64> {
        match self {
            ContentDetail::Translation { ayah_id, .. } => Some(*ayah_id),
            ContentDetail::WordMeaning { ayah_id, .. } => Some(*ayah_id),
            ContentDetail::Tafsir {
                target: TafsirTarget::Ayah { ayah_id },
            } => Some(*ayah_id),
            ContentDetail::Tafsir {
                target: TafsirTarget::Surah { .. },
            } => None,
        }
    }
}

/// Scope within which at most one approved item may be the default
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "scope", rename_all = "camelCase")]
pub enum GroupKey {
    Verse { ayah_id: i64, kind: ContentKind },
    Surah { surah_id: u16, kind: ContentKind },
}

/// Derive the default-selection group of a content item
pub fn group_key_of(detail: &ContentDetail) -> GroupKey {
    let kind = detail.kind();
    match detail {
        ContentDetail::Tafsir {
            target: TafsirTarget::Surah { surah_id },
        } => GroupKey::Surah {
            surah_id: *surah_id,
            kind,
        },
        ContentDetail::Translation { ayah_id, .. }
        | ContentDetail::WordMeaning { ayah_id, .. }
        | ContentDetail::Tafsir {
            target: TafsirTarget::Ayah { ayah_id },
        } => GroupKey::Verse {
            ayah_id: *ayah_id,
            kind,
        },
    }
}

/// Who authored a submission; decides its initial status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum AuthorKind {
    /// A registered user suggesting content; goes through review
    Contributor(i64),
    /// Bulk data import
    SystemImport,
    /// An administrator authoring content directly
    Administrator(i64),
}

impl AuthorKind {
    pub fn initial_status(&self) -> ContentStatus {
        match self {
            AuthorKind::Contributor(_) => ContentStatus::Pending,
            AuthorKind::SystemImport | AuthorKind::Administrator(_) => ContentStatus::Approved,
        }
    }

    /// Contributor identity, absent for administrator and import authorship
    pub fn contributor_id(&self) -> Option<i64> {
        match self {
            AuthorKind::Contributor(id) => Some(*id),
            AuthorKind::SystemImport | AuthorKind::Administrator(_) => None,
        }
    }

    pub(crate) fn as_parts(&self) -> (&'static str, Option<i64>) {
        match self {
            AuthorKind::Contributor(id) => ("contributor", Some(*id)),
            AuthorKind::SystemImport => ("import", None),
            AuthorKind::Administrator(id) => ("administrator", Some(*id)),
        }
    }

    pub(crate) fn from_parts(kind: &str, id: Option<i64>) -> Result<Self, StudyError> {
        match (kind, id) {
            ("contributor", Some(id)) => Ok(AuthorKind::Contributor(id)),
            ("import", _) => Ok(AuthorKind::SystemImport),
            ("administrator", Some(id)) => Ok(AuthorKind::Administrator(id)),
            (other, _) => Err(StudyError::invalid(format!("unknown author '{}'", other))),
        }
    }
}

/// Admin verdict on a pending submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Approve,
    Reject,
}

impl Decision {
    pub fn target_status(&self) -> ContentStatus {
        match self {
            Decision::Approve => ContentStatus::Approved,
            Decision::Reject => ContentStatus::Rejected,
        }
    }
}

/// A submission before it is stored
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentDraft {
    pub detail: ContentDetail,
    pub body: String,
    pub version_label: String,
    /// Only honoured for administrator and import authorship
    #[serde(default)]
    pub make_default: bool,
}

impl ContentDraft {
    pub fn new(detail: ContentDetail, body: impl Into<String>, version_label: impl Into<String>) -> Self {
        Self {
            detail,
            body: body.into(),
            version_label: version_label.into(),
            make_default: false,
        }
    }

    pub fn translation(
        ayah_id: i64,
        language: impl Into<String>,
        body: impl Into<String>,
        version_label: impl Into<String>,
    ) -> Self {
        Self::new(
            ContentDetail::Translation {
                ayah_id,
                language: language.into(),
            },
            body,
            version_label,
        )
    }

    pub fn tafsir(target: TafsirTarget, body: impl Into<String>, version_label: impl Into<String>) -> Self {
        Self::new(ContentDetail::Tafsir { target }, body, version_label)
    }

    pub fn word_meaning(
        ayah_id: i64,
        word_index: u32,
        arabic_word: impl Into<String>,
        meaning: impl Into<String>,
        version_label: impl Into<String>,
    ) -> Self {
        Self::new(
            ContentDetail::WordMeaning {
                ayah_id,
                word_index,
                arabic_word: arabic_word.into(),
                grammar_notes: None,
            },
            meaning,
            version_label,
        )
    }

    /// Request that the new item becomes the default of its group
    pub fn as_default(mut self) -> Self {
        self.make_default = true;
        self
    }
}

/// A stored translation, tafsir or word meaning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    pub id: i64,
    pub detail: ContentDetail,
    pub body: String,
    pub version_label: String,
    pub status: ContentStatus,
    pub is_default: bool,
    pub author: AuthorKind,
    pub created_at: DateTime<Utc>,
}

impl ContentItem {
    pub fn kind(&self) -> ContentKind {
        self.detail.kind()
    }

    pub fn group_key(&self) -> GroupKey {
        group_key_of(&self.detail)
    }

    pub fn is_approved(&self) -> bool {
        self.status == ContentStatus::Approved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_key_for_verse_level_items() {
        let translation = ContentDetail::Translation {
            ayah_id: 9,
            language: "en".to_string(),
        };
        assert_eq!(
            group_key_of(&translation),
            GroupKey::Verse {
                ayah_id: 9,
                kind: ContentKind::Translation
            }
        );

        let word = ContentDetail::WordMeaning {
            ayah_id: 9,
            word_index: 3,
            arabic_word: "رَبِّ".to_string(),
            grammar_notes: None,
        };
        // Word index does not split the group
        assert_eq!(
            group_key_of(&word),
            GroupKey::Verse {
                ayah_id: 9,
                kind: ContentKind::WordMeaning
            }
        );

        let tafsir = ContentDetail::Tafsir {
            target: TafsirTarget::Ayah { ayah_id: 9 },
        };
        assert_eq!(
            group_key_of(&tafsir),
            GroupKey::Verse {
                ayah_id: 9,
                kind: ContentKind::Tafsir
            }
        );
    }

    #[test]
    fn test_group_key_for_surah_tafsir() {
        let tafsir = ContentDetail::Tafsir {
            target: TafsirTarget::Surah { surah_id: 36 },
        };
        assert_eq!(
            group_key_of(&tafsir),
            GroupKey::Surah {
                surah_id: 36,
                kind: ContentKind::Tafsir
            }
        );
        assert_eq!(tafsir.ayah_id(), None);
    }

    #[test]
    fn test_author_initial_status() {
        assert_eq!(AuthorKind::Contributor(7).initial_status(), ContentStatus::Pending);
        assert_eq!(AuthorKind::SystemImport.initial_status(), ContentStatus::Approved);
        assert_eq!(AuthorKind::Administrator(1).initial_status(), ContentStatus::Approved);
        assert_eq!(AuthorKind::Administrator(1).contributor_id(), None);
    }

    #[test]
    fn test_author_parts_roundtrip() {
        for author in [
            AuthorKind::Contributor(7),
            AuthorKind::SystemImport,
            AuthorKind::Administrator(2),
        ] {
            let (kind, id) = author.as_parts();
            assert_eq!(AuthorKind::from_parts(kind, id).unwrap(), author);
        }
    }

    #[test]
    fn test_unknown_labels_are_invalid_arguments() {
        assert!(matches!(
            "commentary".parse::<ContentKind>(),
            Err(StudyError::InvalidArgument(_))
        ));
        assert!(matches!(
            "archived".parse::<ContentStatus>(),
            Err(StudyError::InvalidArgument(_))
        ));
    }
}
