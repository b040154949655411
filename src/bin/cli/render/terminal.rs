use quran_study_lib::memorization::MemorizationStatus;
use quran_study_lib::moderation::{ContentItem, ContentStatus};

/// ANSI color codes
#[allow(dead_code)]
pub struct Color;

#[allow(dead_code)]
impl Color {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const DIM: &str = "\x1b[2m";
    pub const RED: &str = "\x1b[31m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const BLUE: &str = "\x1b[34m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GRAY: &str = "\x1b[90m";
}

/// Wrap `text` in `color` when colors are enabled
pub fn paint(text: &str, color: &str, use_color: bool) -> String {
    if use_color {
        format!("{}{}{}", color, text, Color::RESET)
    } else {
        text.to_string()
    }
}

pub fn content_status(status: ContentStatus, use_color: bool) -> String {
    let color = match status {
        ContentStatus::Pending => Color::YELLOW,
        ContentStatus::Approved => Color::GREEN,
        ContentStatus::Rejected => Color::RED,
    };
    paint(status.as_str(), color, use_color)
}

pub fn memorization_status(status: MemorizationStatus, use_color: bool) -> String {
    let color = match status {
        MemorizationStatus::NotStarted => Color::GRAY,
        MemorizationStatus::Learning => Color::YELLOW,
        MemorizationStatus::Memorized => Color::GREEN,
        MemorizationStatus::Review => Color::BLUE,
    };
    paint(status.as_str(), color, use_color)
}

/// One-line summary of a content item: id, kind, label, status and default marker
pub fn item_summary(item: &ContentItem, use_color: bool) -> String {
    let default = if item.is_default {
        paint(" [default]", Color::CYAN, use_color)
    } else {
        String::new()
    };
    format!(
        "#{} {} \"{}\" {}{}",
        item.id,
        item.kind(),
        item.version_label,
        content_status(item.status, use_color),
        default
    )
}

/// Simple word wrap with a line prefix
pub fn wrap_lines(text: &str, prefix: &str, max_width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let effective_width = max_width.saturating_sub(prefix.chars().count());

    for line in text.lines() {
        if line.chars().count() <= effective_width {
            lines.push(format!("{}{}", prefix, line));
            continue;
        }

        let mut current_line = String::new();
        for word in line.split_whitespace() {
            if current_line.is_empty() {
                current_line = word.to_string();
            } else if current_line.chars().count() + 1 + word.chars().count() <= effective_width {
                current_line.push(' ');
                current_line.push_str(word);
            } else {
                lines.push(format!("{}{}", prefix, current_line));
                current_line = word.to_string();
            }
        }
        if !current_line.is_empty() {
            lines.push(format!("{}{}", prefix, current_line));
        }
    }

    if lines.is_empty() && !text.is_empty() {
        lines.push(format!("{}{}", prefix, text));
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_counts_characters_not_bytes() {
        // Each Arabic word is several bytes but few characters
        let text = "لَآ إِكْرَاهَ فِى ٱلدِّينِ";
        let lines = wrap_lines(text, "  ", 80);
        assert_eq!(lines, vec![format!("  {}", text)]);
    }

    #[test]
    fn test_wrap_splits_long_lines() {
        let lines = wrap_lines("one two three four", "", 9);
        assert_eq!(lines, vec!["one two", "three", "four"]);
    }

    #[test]
    fn test_paint_without_color() {
        assert_eq!(paint("x", Color::RED, false), "x");
        assert_eq!(paint("x", Color::RED, true), "\x1b[31mx\x1b[0m");
    }
}
