//! Canonical verse model

use rusqlite::Row;
use serde::{Deserialize, Serialize};

/// Highest surah number
pub const MAX_SURAH: u16 = 114;

/// A single verse (ayah) of canonical text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Verse {
    pub id: i64,
    pub surah_id: u16,
    pub ayah_number: u16,
    pub arabic_text: String,
}

impl Verse {
    pub(crate) const COLUMNS: &'static str = "id, surah_id, ayah_number, arabic_text";

    pub(crate) fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            surah_id: row.get(1)?,
            ayah_number: row.get(2)?,
            arabic_text: row.get(3)?,
        })
    }

    /// Arabic text split into whitespace-separated words, indexed from zero
    pub fn words(&self) -> Vec<&str> {
        self.arabic_text.split_whitespace().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_words_are_zero_indexed() {
        let verse = Verse {
            id: 1,
            surah_id: 1,
            ayah_number: 2,
            arabic_text: "ٱلْحَمْدُ لِلَّهِ رَبِّ ٱلْعَٰلَمِينَ".to_string(),
        };
        let words = verse.words();
        assert_eq!(words.len(), 4);
        assert_eq!(words[0], "ٱلْحَمْدُ");
    }
}
