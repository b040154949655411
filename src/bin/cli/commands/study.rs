use anyhow::{Context, Result};
use chrono::Utc;

use quran_study_lib::study::{MatchSource, ReportPeriod};

use crate::app::App;
use crate::render::terminal::{self, Color};
use crate::OutputFormat;

fn print_flag(format: &OutputFormat, key: &str, value: bool, message: &str) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&serde_json::json!({ key: value }))?)
        }
        OutputFormat::Plain => println!("{}", message),
    }
    Ok(())
}

// ===== Bookmarks =====

pub fn run_bookmark_add(app: &App, user: i64, surah: u16, ayah: u16, format: &OutputFormat) -> Result<()> {
    let verse = app.find_verse(surah, ayah)?;
    let added = app.study().add_bookmark(user, verse.id)?;
    let message = if added {
        format!("Bookmarked {}:{}", surah, ayah)
    } else {
        format!("{}:{} was already bookmarked", surah, ayah)
    };
    print_flag(format, "added", added, &message)
}

pub fn run_bookmark_remove(app: &App, user: i64, surah: u16, ayah: u16, format: &OutputFormat) -> Result<()> {
    let verse = app.find_verse(surah, ayah)?;
    let removed = app.study().remove_bookmark(user, verse.id)?;
    let message = if removed {
        format!("Removed bookmark on {}:{}", surah, ayah)
    } else {
        format!("{}:{} was not bookmarked", surah, ayah)
    };
    print_flag(format, "removed", removed, &message)
}

pub fn run_bookmark_list(app: &App, user: i64, format: &OutputFormat) -> Result<()> {
    let bookmarks = app.study().bookmarks(user).context("Failed to list bookmarks")?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&bookmarks)?),
        OutputFormat::Plain => {
            if bookmarks.is_empty() {
                println!("No bookmarks.");
                return Ok(());
            }
            for bookmark in &bookmarks {
                println!(
                    "{:<8} {}",
                    format!("{}:{}", bookmark.surah_id, bookmark.ayah_number),
                    bookmark.created_at.format("%Y-%m-%d")
                );
            }
        }
    }
    Ok(())
}

// ===== Notes =====

pub fn run_note_save(
    app: &App,
    user: i64,
    surah: u16,
    ayah: u16,
    text: &str,
    format: &OutputFormat,
) -> Result<()> {
    let verse = app.find_verse(surah, ayah)?;
    let note = app
        .study()
        .save_note(user, verse.id, text)
        .context("Failed to save note")?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&note)?),
        OutputFormat::Plain => println!("Saved note on {}:{}", surah, ayah),
    }
    Ok(())
}

pub fn run_note_show(app: &App, user: i64, surah: u16, ayah: u16, format: &OutputFormat) -> Result<()> {
    let verse = app.find_verse(surah, ayah)?;
    let note = app.study().note(user, verse.id)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&note)?),
        OutputFormat::Plain => match note {
            Some(note) => println!("{}", note.note),
            None => println!("No note on {}:{}", surah, ayah),
        },
    }
    Ok(())
}

pub fn run_note_delete(app: &App, user: i64, surah: u16, ayah: u16, format: &OutputFormat) -> Result<()> {
    let verse = app.find_verse(surah, ayah)?;
    let deleted = app.study().delete_note(user, verse.id)?;
    let message = if deleted {
        format!("Deleted note on {}:{}", surah, ayah)
    } else {
        format!("No note on {}:{}", surah, ayah)
    };
    print_flag(format, "deleted", deleted, &message)
}

pub fn run_note_list(app: &App, user: i64, format: &OutputFormat, use_color: bool) -> Result<()> {
    let notes = app.study().notes(user).context("Failed to list notes")?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&notes)?),
        OutputFormat::Plain => {
            if notes.is_empty() {
                println!("No notes.");
                return Ok(());
            }
            for note in &notes {
                let heading = format!("{}:{}", note.surah_id, note.ayah_number);
                println!(
                    "{} {}",
                    terminal::paint(&heading, Color::BOLD, use_color),
                    terminal::paint(
                        &note.updated_at.format("%Y-%m-%d %H:%M").to_string(),
                        Color::GRAY,
                        use_color
                    )
                );
                for line in terminal::wrap_lines(&note.note, "  ", 80) {
                    println!("{}", line);
                }
            }
        }
    }
    Ok(())
}

// ===== Reading =====

pub fn run_read(app: &App, user: i64, surah: u16, ayah: u16, format: &OutputFormat) -> Result<()> {
    let verse = app.find_verse(surah, ayah)?;
    let logged = app.study().log_reading(user, verse.id, Utc::now())?;
    let message = if logged {
        format!("Logged reading of {}:{}", surah, ayah)
    } else {
        format!("{}:{} was logged less than a minute ago", surah, ayah)
    };
    print_flag(format, "logged", logged, &message)
}

pub fn run_last_read(app: &App, user: i64, set: Option<(u16, u16)>, format: &OutputFormat) -> Result<()> {
    let study = app.study();
    if let Some((surah, ayah)) = set {
        let verse = app.find_verse(surah, ayah)?;
        study
            .set_last_read(user, verse.id)
            .context("Failed to move reading position")?;
    }
    let verse = study.last_read(user)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&verse)?),
        OutputFormat::Plain => match verse {
            Some(verse) => println!("{}:{} {}", verse.surah_id, verse.ayah_number, verse.arabic_text),
            None => println!("Nothing read yet."),
        },
    }
    Ok(())
}

// ===== Search =====

fn match_label(source: MatchSource) -> &'static str {
    match source {
        MatchSource::ArabicText => "text",
        MatchSource::Translation => "translation",
        MatchSource::Tafsir => "tafsir",
        MatchSource::WordMeaning => "word meaning",
        MatchSource::Note => "note",
    }
}

pub fn run_search(
    app: &App,
    query: &str,
    user: Option<i64>,
    surah: Option<u16>,
    format: &OutputFormat,
    use_color: bool,
) -> Result<()> {
    let hits = app
        .study()
        .search(user, query, surah)
        .with_context(|| format!("Search for '{}' failed", query))?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&hits)?),
        OutputFormat::Plain => {
            if hits.is_empty() {
                println!("No matches for '{}'.", query);
                return Ok(());
            }
            for hit in &hits {
                let reference = format!("{}:{}", hit.surah_id, hit.ayah_number);
                let sources: Vec<&str> = hit.matched_in.iter().map(|s| match_label(*s)).collect();
                println!(
                    "{} {}",
                    terminal::paint(&reference, Color::BOLD, use_color),
                    terminal::paint(&format!("[{}]", sources.join(", ")), Color::GRAY, use_color)
                );
                for line in terminal::wrap_lines(&hit.arabic_text, "  ", 80) {
                    println!("{}", line);
                }
            }
            println!("\n{} verse(s)", hits.len());
        }
    }
    Ok(())
}

// ===== Reports =====

pub fn run_report(app: &App, user: i64, period: ReportPeriod, format: &OutputFormat) -> Result<()> {
    let rows = app
        .study()
        .reading_report(user, period, Utc::now())
        .context("Failed to build reading report")?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
        OutputFormat::Plain => {
            if rows.is_empty() {
                println!("Nothing read in this {} window.", period);
                return Ok(());
            }
            let width = rows.iter().map(|r| r.period.len()).max().unwrap_or(6).max(6);
            println!("{:<width$} Verses", "Period", width = width);
            println!("{} {}", "\u{2500}".repeat(width), "\u{2500}".repeat(6));
            for row in &rows {
                println!("{:<width$} {}", row.period, row.ayahs_read, width = width);
            }
        }
    }
    Ok(())
}
