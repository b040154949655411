mod app;
mod commands;
mod render;

use std::io::Read;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use quran_study_lib::memorization::{MemorizationStatus, Recall};
use quran_study_lib::moderation::ContentKind;
use quran_study_lib::study::ReportPeriod;

#[derive(Parser)]
#[command(name = "quran-study-cli", about = "Quran study hub: moderation and memorization", version)]
struct Cli {
    /// Configuration file (default: <data dir>/quran-study/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Database file, overrides the configuration
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, default_value = "plain")]
    format: OutputFormat,

    /// Disable ANSI colors
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Plain,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Import verses and their translation from a data file
    Import {
        /// Path to the data file
        file: PathBuf,
    },

    /// Show a verse with its presented translation, tafsir and word meanings
    Verse {
        surah: u16,
        ayah: u16,
        /// Also list every version with its status
        #[arg(long)]
        all: bool,
    },

    /// Submit a translation, tafsir or word meaning
    Suggest {
        /// Submitting user id
        user: i64,
        surah: u16,
        /// Verse number; omit for a surah-level tafsir
        ayah: Option<u16>,
        /// translation, tafsir or word_meaning
        #[arg(long, default_value = "translation")]
        kind: ContentKind,
        /// Content text (use "-" to read from stdin)
        #[arg(long)]
        text: String,
        /// Version label
        #[arg(long, default_value = "User Suggestion")]
        label: String,
        /// Language of a translation
        #[arg(long, default_value = "ur")]
        language: String,
        /// Zero-based word position for a word meaning
        #[arg(long)]
        word: Option<u32>,
        /// Grammar notes for a word meaning
        #[arg(long)]
        notes: Option<String>,
        /// Author as administrator (approved immediately)
        #[arg(long)]
        admin: bool,
        /// Make the new item the default (administrators only)
        #[arg(long, requires = "admin")]
        default: bool,
    },

    /// List submissions awaiting review
    Pending,

    /// Approve a pending submission
    Approve { id: i64 },

    /// Reject a pending submission
    Reject { id: i64 },

    /// Make an approved item the default version of its group
    SetDefault {
        id: i64,
        /// Clear the default flag instead
        #[arg(long)]
        unset: bool,
    },

    /// Record a memorization review
    Review {
        user: i64,
        surah: u16,
        ayah: u16,
        /// not_started, learning, memorized or review
        status: MemorizationStatus,
        /// Explicit SRS level
        #[arg(long, conflicts_with = "recall")]
        level: Option<i32>,
        /// Adjust the current level: hard, good or easy
        #[arg(long)]
        recall: Option<Recall>,
    },

    /// Show memorization progress
    Progress {
        user: i64,
        #[arg(long)]
        surah: Option<u16>,
    },

    /// List verses due for review
    Due { user: i64 },

    /// Manage bookmarks
    #[command(subcommand)]
    Bookmark(BookmarkCommand),

    /// Manage private notes
    #[command(subcommand)]
    Note(NoteCommand),

    /// Log that a verse was read
    Read { user: i64, surah: u16, ayah: u16 },

    /// Show or move the last-read position
    LastRead {
        user: i64,
        /// Move the position to this verse (surah:ayah) without logging a read
        #[arg(long, value_parser = parse_verse_ref)]
        set: Option<(u16, u16)>,
    },

    /// Search verse text, default translations, tafsir and word meanings
    Search {
        query: String,
        /// Also search this user's private notes
        #[arg(long)]
        user: Option<i64>,
        /// Limit results to one surah
        #[arg(long)]
        surah: Option<u16>,
    },

    /// Distinct verses read per period
    Report {
        user: i64,
        /// daily, monthly or yearly
        #[arg(long, default_value = "daily")]
        period: ReportPeriod,
    },
}

#[derive(Subcommand)]
enum BookmarkCommand {
    /// Bookmark a verse
    Add { user: i64, surah: u16, ayah: u16 },
    /// Remove a bookmark
    Remove { user: i64, surah: u16, ayah: u16 },
    /// List bookmarks
    List { user: i64 },
}

#[derive(Subcommand)]
enum NoteCommand {
    /// Save (or replace) a note on a verse
    Save {
        user: i64,
        surah: u16,
        ayah: u16,
        /// Note text (use "-" to read from stdin)
        text: String,
    },
    /// Show the note on a verse
    Show { user: i64, surah: u16, ayah: u16 },
    /// Delete the note on a verse
    Delete { user: i64, surah: u16, ayah: u16 },
    /// List all notes
    List { user: i64 },
}

/// Parse a "surah:ayah" reference
fn parse_verse_ref(s: &str) -> Result<(u16, u16), String> {
    let (surah, ayah) = s
        .split_once(':')
        .ok_or_else(|| format!("expected surah:ayah, got '{}'", s))?;
    let surah = surah.trim().parse().map_err(|_| format!("invalid surah '{}'", surah))?;
    let ayah = ayah.trim().parse().map_err(|_| format!("invalid ayah '{}'", ayah))?;
    Ok((surah, ayah))
}

/// Resolve "-" as stdin
fn resolve_text(text: String) -> anyhow::Result<String> {
    if text != "-" {
        return Ok(text);
    }
    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .context("Failed to read text from stdin")?;
    Ok(buf)
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let use_color = !cli.no_color && atty_check();
    let app = app::App::new(cli.config.as_deref(), cli.db.as_deref())?;
    let format = &cli.format;

    match cli.command {
        Command::Import { file } => {
            commands::import::run(&app, &file, format)?;
        }
        Command::Verse { surah, ayah, all } => {
            commands::content::run_verse(&app, surah, ayah, all, format, use_color)?;
        }
        Command::Suggest {
            user,
            surah,
            ayah,
            kind,
            text,
            label,
            language,
            word,
            notes,
            admin,
            default,
        } => {
            let request = commands::content::SuggestRequest {
                user,
                surah,
                ayah,
                kind,
                text: resolve_text(text)?,
                label,
                language,
                word,
                notes,
                admin,
                make_default: default,
            };
            commands::content::run_suggest(&app, request, format, use_color)?;
        }
        Command::Pending => {
            commands::moderation::run_pending(&app, format, use_color)?;
        }
        Command::Approve { id } => {
            commands::moderation::run_decide(&app, id, true, format, use_color)?;
        }
        Command::Reject { id } => {
            commands::moderation::run_decide(&app, id, false, format, use_color)?;
        }
        Command::SetDefault { id, unset } => {
            commands::moderation::run_set_default(&app, id, !unset, format, use_color)?;
        }
        Command::Review {
            user,
            surah,
            ayah,
            status,
            level,
            recall,
        } => {
            commands::memorization::run_review(
                &app, user, surah, ayah, status, level, recall, format,
            )?;
        }
        Command::Progress { user, surah } => {
            commands::memorization::run_progress(&app, user, surah, format, use_color)?;
        }
        Command::Due { user } => {
            commands::memorization::run_due(&app, user, format, use_color)?;
        }
        Command::Bookmark(subcmd) => match subcmd {
            BookmarkCommand::Add { user, surah, ayah } => {
                commands::study::run_bookmark_add(&app, user, surah, ayah, format)?;
            }
            BookmarkCommand::Remove { user, surah, ayah } => {
                commands::study::run_bookmark_remove(&app, user, surah, ayah, format)?;
            }
            BookmarkCommand::List { user } => {
                commands::study::run_bookmark_list(&app, user, format)?;
            }
        },
        Command::Note(subcmd) => match subcmd {
            NoteCommand::Save {
                user,
                surah,
                ayah,
                text,
            } => {
                commands::study::run_note_save(&app, user, surah, ayah, &resolve_text(text)?, format)?;
            }
            NoteCommand::Show { user, surah, ayah } => {
                commands::study::run_note_show(&app, user, surah, ayah, format)?;
            }
            NoteCommand::Delete { user, surah, ayah } => {
                commands::study::run_note_delete(&app, user, surah, ayah, format)?;
            }
            NoteCommand::List { user } => {
                commands::study::run_note_list(&app, user, format, use_color)?;
            }
        },
        Command::Read { user, surah, ayah } => {
            commands::study::run_read(&app, user, surah, ayah, format)?;
        }
        Command::LastRead { user, set } => {
            commands::study::run_last_read(&app, user, set, format)?;
        }
        Command::Search { query, user, surah } => {
            commands::study::run_search(&app, &query, user, surah, format, use_color)?;
        }
        Command::Report { user, period } => {
            commands::study::run_report(&app, user, period, format)?;
        }
    }

    Ok(())
}

/// Check if stdout is a terminal (for color support)
fn atty_check() -> bool {
    unsafe { libc_isatty(1) != 0 }
}

extern "C" {
    #[link_name = "isatty"]
    fn libc_isatty(fd: i32) -> i32;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_text_keeps_literal_text() {
        assert_eq!(resolve_text("a note".to_string()).unwrap(), "a note");
    }

    #[test]
    fn test_parse_verse_ref() {
        assert_eq!(parse_verse_ref("2:255"), Ok((2, 255)));
        assert_eq!(parse_verse_ref(" 1 : 7 "), Ok((1, 7)));
        assert!(parse_verse_ref("2-255").is_err());
        assert!(parse_verse_ref("x:1").is_err());
    }
}
