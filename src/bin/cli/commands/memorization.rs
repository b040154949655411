use anyhow::{Context, Result};
use chrono::Utc;

use quran_study_lib::memorization::algorithm::{format_interval, interval_days};
use quran_study_lib::memorization::{MemorizationRecord, MemorizationStatus, Recall};

use crate::app::App;
use crate::render::terminal::{self, Color};
use crate::OutputFormat;

fn print_records(records: &[MemorizationRecord], use_color: bool) {
    let now = Utc::now();
    println!("{:<8} {:<12} {:>5}  Next review", "Verse", "Status", "Level");
    println!("{}", "\u{2500}".repeat(48));
    for record in records {
        let next = match record.next_review {
            Some(due) if due <= now => terminal::paint("due", Color::RED, use_color),
            Some(due) => due.format("%Y-%m-%d").to_string(),
            None => "-".to_string(),
        };
        // Pad the label before coloring so ANSI codes don't skew the columns
        let status = format!("{:<12}", record.status.as_str());
        let status = status.replacen(
            record.status.as_str(),
            &terminal::memorization_status(record.status, use_color),
            1,
        );
        println!(
            "{:<8} {} {:>5}  {}",
            format!("{}:{}", record.surah_id, record.ayah_number),
            status,
            record.srs_level,
            next
        );
    }
}

pub fn run_review(
    app: &App,
    user: i64,
    surah: u16,
    ayah: u16,
    status: MemorizationStatus,
    level: Option<i32>,
    recall: Option<Recall>,
    format: &OutputFormat,
) -> Result<()> {
    let scheduler = app.scheduler();
    let record = match recall {
        Some(recall) if level.is_none() => scheduler.record_recall(user, surah, ayah, status, recall),
        _ => scheduler.record_review(user, surah, ayah, status, level),
    }
    .with_context(|| format!("Failed to record review of {}:{}", surah, ayah))?;
    let rescheduled = level.is_some() || recall.is_some();

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&record)?),
        OutputFormat::Plain => {
            print!(
                "{}:{} is {} at level {}",
                record.surah_id, record.ayah_number, record.status, record.srs_level
            );
            match (rescheduled, record.next_review) {
                (true, Some(due)) => println!(
                    ", next review in {} ({})",
                    format_interval(interval_days(record.srs_level)),
                    due.format("%Y-%m-%d %H:%M")
                ),
                _ => println!(),
            }
        }
    }
    Ok(())
}

pub fn run_progress(
    app: &App,
    user: i64,
    surah: Option<u16>,
    format: &OutputFormat,
    use_color: bool,
) -> Result<()> {
    let scheduler = app.scheduler();
    let records = scheduler
        .progress(user, surah)
        .context("Failed to load progress")?;
    let summary = scheduler.progress_summary(user, Utc::now())?;

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "summary": summary,
                "records": records,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            if records.is_empty() {
                println!("No memorization progress recorded.");
                return Ok(());
            }
            print_records(&records, use_color);
            println!(
                "\n{} memorized, {} learning, {} in review, {} due",
                summary.memorized, summary.learning, summary.review, summary.due
            );
        }
    }
    Ok(())
}

pub fn run_due(app: &App, user: i64, format: &OutputFormat, use_color: bool) -> Result<()> {
    let due = app
        .scheduler()
        .due_reviews(user, Utc::now())
        .context("Failed to load due reviews")?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&due)?),
        OutputFormat::Plain => {
            if due.is_empty() {
                println!("Nothing due for review.");
                return Ok(());
            }
            print_records(&due, use_color);
            println!("\n{} due", due.len());
        }
    }
    Ok(())
}
