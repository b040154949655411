use anyhow::{Context, Result};

use quran_study_lib::moderation::{ContentDetail, ContentStatus, Decision, TafsirTarget};

use crate::app::App;
use crate::render::terminal::{self, Color};
use crate::OutputFormat;

pub fn run_pending(app: &App, format: &OutputFormat, use_color: bool) -> Result<()> {
    let items = app
        .moderation()
        .suggestions(ContentStatus::Pending)
        .context("Failed to list pending submissions")?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&items)?);
        }
        OutputFormat::Plain => {
            if items.is_empty() {
                println!("No pending submissions.");
                return Ok(());
            }

            for item in &items {
                let target = match &item.detail {
                    ContentDetail::Tafsir {
                        target: TafsirTarget::Surah { surah_id },
                    } => format!("surah {}", surah_id),
                    detail => match detail.ayah_id().map(|id| app.store.verse_by_id(id)) {
                        Some(Ok(Some(verse))) => format!("{}:{}", verse.surah_id, verse.ayah_number),
                        _ => "unknown verse".to_string(),
                    },
                };
                let contributor = item
                    .author
                    .contributor_id()
                    .map(|id| format!("user {}", id))
                    .unwrap_or_default();

                println!(
                    "{} {} {}",
                    terminal::item_summary(item, use_color),
                    target,
                    terminal::paint(&contributor, Color::GRAY, use_color)
                );
                for line in terminal::wrap_lines(&item.body, "    ", 80) {
                    println!("{}", line);
                }
            }

            println!("\n{} pending", items.len());
        }
    }

    Ok(())
}

pub fn run_decide(
    app: &App,
    id: i64,
    approve: bool,
    format: &OutputFormat,
    use_color: bool,
) -> Result<()> {
    let decision = if approve {
        Decision::Approve
    } else {
        Decision::Reject
    };
    let item = app
        .moderation()
        .decide(id, decision)
        .with_context(|| format!("Failed to decide on content item {}", id))?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&item)?),
        OutputFormat::Plain => println!("{}", terminal::item_summary(&item, use_color)),
    }
    Ok(())
}

pub fn run_set_default(
    app: &App,
    id: i64,
    make_default: bool,
    format: &OutputFormat,
    use_color: bool,
) -> Result<()> {
    let item = app
        .moderation()
        .set_default(id, make_default)
        .with_context(|| format!("Failed to update default for content item {}", id))?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&item)?),
        OutputFormat::Plain => println!("{}", terminal::item_summary(&item, use_color)),
    }
    Ok(())
}
