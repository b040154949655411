//! Parser for the line-oriented verse data file
//!
//! Each line carries one verse and its Urdu translation:
//!
//! ```text
//! <arabic text> ترجمہ: <translation><br/>س <surah:3 digits> آ <verse:3 digits>
//! ```

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::store::MAX_SURAH;

static LINE_RE: OnceLock<Option<Regex>> = OnceLock::new();

fn line_regex() -> Option<&'static Regex> {
    LINE_RE
        .get_or_init(|| Regex::new(r"^(.*?) ترجمہ: (.*?)<br/>س (\d{3}) آ (\d{3})$").ok())
        .as_ref()
}

/// One parsed line of the data file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerseLine {
    pub arabic_text: String,
    pub translation: String,
    pub surah_id: u16,
    pub ayah_number: u16,
}

/// Parse a single data line.
///
/// Returns `None` for lines that do not follow the format, carry no Arabic
/// text, or reference a surah or verse number out of range.
pub fn parse_line(line: &str) -> Option<VerseLine> {
    let line = line.trim_end_matches(['\r', '\n']);
    let caps = line_regex()?.captures(line)?;

    let arabic_text = caps[1].trim().to_string();
    let translation = caps[2].trim().to_string();
    let surah_id: u16 = caps[3].parse().ok()?;
    let ayah_number: u16 = caps[4].parse().ok()?;

    if arabic_text.is_empty() || surah_id == 0 || surah_id > MAX_SURAH || ayah_number == 0 {
        return None;
    }

    Some(VerseLine {
        arabic_text,
        translation,
        surah_id,
        ayah_number,
    })
}
