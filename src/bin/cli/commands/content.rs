use std::collections::BTreeMap;

use anyhow::{bail, Context, Result};

use quran_study_lib::moderation::{
    select_presented, AuthorKind, ContentDetail, ContentDraft, ContentItem, ContentKind,
    ContentStatus, TafsirTarget,
};

use crate::app::App;
use crate::render::terminal::{self, Color};
use crate::OutputFormat;

pub struct SuggestRequest {
    pub user: i64,
    pub surah: u16,
    pub ayah: Option<u16>,
    pub kind: ContentKind,
    pub text: String,
    pub label: String,
    pub language: String,
    pub word: Option<u32>,
    pub notes: Option<String>,
    pub admin: bool,
    pub make_default: bool,
}

/// Presented word meaning per word position
fn presented_words(items: &[ContentItem]) -> Vec<ContentItem> {
    let mut by_word: BTreeMap<u32, Vec<ContentItem>> = BTreeMap::new();
    for item in items {
        if let ContentDetail::WordMeaning { word_index, .. } = &item.detail {
            by_word.entry(*word_index).or_default().push(item.clone());
        }
    }
    by_word
        .values()
        .filter_map(|group| select_presented(group).cloned())
        .collect()
}

pub fn run_verse(
    app: &App,
    surah: u16,
    ayah: u16,
    all: bool,
    format: &OutputFormat,
    use_color: bool,
) -> Result<()> {
    let verse = app.find_verse(surah, ayah)?;
    let engine = app.moderation();

    let translation = engine.presented(verse.id, ContentKind::Translation)?;
    let tafsir = engine.presented(verse.id, ContentKind::Tafsir)?;
    let surah_tafsir = engine.presented_surah_tafsir(surah)?;
    let words = presented_words(&engine.items_for_verse(
        verse.id,
        ContentKind::WordMeaning,
        Some(ContentStatus::Approved),
    )?);

    let mut versions = Vec::new();
    if all {
        for kind in [ContentKind::Translation, ContentKind::Tafsir, ContentKind::WordMeaning] {
            versions.extend(engine.items_for_verse(verse.id, kind, None)?);
        }
    }

    match format {
        OutputFormat::Json => {
            let mut output = serde_json::json!({
                "verse": verse,
                "translation": translation,
                "tafsir": tafsir,
                "surahTafsir": surah_tafsir,
                "wordMeanings": words,
            });
            if all {
                output["versions"] = serde_json::to_value(&versions)?;
            }
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            let heading = format!("{}:{}", verse.surah_id, verse.ayah_number);
            println!("{}", terminal::paint(&heading, Color::BOLD, use_color));
            println!("{}", verse.arabic_text);

            match &translation {
                Some(item) => {
                    println!();
                    println!(
                        "{}",
                        terminal::paint(
                            &format!("Translation ({})", item.version_label),
                            Color::DIM,
                            use_color
                        )
                    );
                    for line in terminal::wrap_lines(&item.body, "  ", 80) {
                        println!("{}", line);
                    }
                }
                None => println!("\n(no approved translation)"),
            }

            if let Some(item) = &tafsir {
                println!();
                println!(
                    "{}",
                    terminal::paint(&format!("Tafsir ({})", item.version_label), Color::DIM, use_color)
                );
                for line in terminal::wrap_lines(&item.body, "  ", 80) {
                    println!("{}", line);
                }
            }

            if let Some(item) = &surah_tafsir {
                println!();
                println!(
                    "{}",
                    terminal::paint(
                        &format!("Surah tafsir ({})", item.version_label),
                        Color::DIM,
                        use_color
                    )
                );
                for line in terminal::wrap_lines(&item.body, "  ", 80) {
                    println!("{}", line);
                }
            }

            if !words.is_empty() {
                println!();
                println!("{}", terminal::paint("Word meanings", Color::DIM, use_color));
                for item in &words {
                    if let ContentDetail::WordMeaning {
                        word_index,
                        arabic_word,
                        grammar_notes,
                        ..
                    } = &item.detail
                    {
                        println!("  {:>2}. {} - {}", word_index, arabic_word, item.body);
                        if let Some(notes) = grammar_notes {
                            println!("      {}", terminal::paint(notes, Color::GRAY, use_color));
                        }
                    }
                }
            }

            if all {
                println!();
                println!("{}", terminal::paint("All versions", Color::DIM, use_color));
                for item in &versions {
                    println!("  {}", terminal::item_summary(item, use_color));
                }
            }
        }
    }

    Ok(())
}

pub fn run_suggest(
    app: &App,
    request: SuggestRequest,
    format: &OutputFormat,
    use_color: bool,
) -> Result<()> {
    let detail = match request.ayah {
        None => {
            if request.kind != ContentKind::Tafsir {
                bail!("Only tafsir can target a whole surah; give a verse number for {}", request.kind);
            }
            ContentDetail::Tafsir {
                target: TafsirTarget::Surah {
                    surah_id: request.surah,
                },
            }
        }
        Some(ayah) => {
            let verse = app.find_verse(request.surah, ayah)?;
            match request.kind {
                ContentKind::Translation => ContentDetail::Translation {
                    ayah_id: verse.id,
                    language: request.language.clone(),
                },
                ContentKind::Tafsir => ContentDetail::Tafsir {
                    target: TafsirTarget::Ayah { ayah_id: verse.id },
                },
                ContentKind::WordMeaning => {
                    let word_index = request.word.context("--word is required for a word meaning")?;
                    let words = verse.words();
                    let arabic_word = words.get(word_index as usize).with_context(|| {
                        format!(
                            "Verse {}:{} has {} words, no word at position {}",
                            verse.surah_id,
                            verse.ayah_number,
                            words.len(),
                            word_index
                        )
                    })?;
                    ContentDetail::WordMeaning {
                        ayah_id: verse.id,
                        word_index,
                        arabic_word: arabic_word.to_string(),
                        grammar_notes: request.notes.clone(),
                    }
                }
            }
        }
    };

    let author = if request.admin {
        AuthorKind::Administrator(request.user)
    } else {
        AuthorKind::Contributor(request.user)
    };
    let mut draft = ContentDraft::new(detail, request.text.trim(), request.label.as_str());
    draft.make_default = request.make_default;

    let item = app
        .moderation()
        .submit(author, draft)
        .context("Failed to submit content")?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&item)?),
        OutputFormat::Plain => println!("Submitted {}", terminal::item_summary(&item, use_color)),
    }

    Ok(())
}
