//! Concurrent writers on one database file

use std::sync::Arc;
use std::thread;

use tempfile::TempDir;

use quran_study_lib::memorization::{MemorizationScheduler, MemorizationStatus, Recall};
use quran_study_lib::moderation::{
    AuthorKind, ContentDraft, ContentKind, ContentStatus, ModerationEngine,
};
use quran_study_lib::{Result, Store, StudyConfig};

/// Retry an operation while it reports a write conflict
fn with_retry<T>(mut op: impl FnMut() -> Result<T>) -> Result<T> {
    loop {
        match op() {
            Err(e) if e.is_retryable() => thread::yield_now(),
            other => return other,
        }
    }
}

fn test_config(temp: &TempDir) -> StudyConfig {
    StudyConfig {
        database_path: temp.path().join("hub.sqlite"),
        busy_timeout_ms: 10_000,
        ..StudyConfig::default()
    }
}

#[test]
fn racing_set_default_leaves_one_default() {
    let temp = TempDir::new().unwrap();
    let config = test_config(&temp);

    let store = Store::open(&config.database_path, &config).unwrap();
    let verse = store.insert_verse(2, 255, "ٱللَّهُ لَآ إِلَٰهَ إِلَّا هُوَ").unwrap().unwrap();
    let engine = ModerationEngine::new(&store);
    let ids: Vec<i64> = ["Asad", "Pickthall", "Sahih", "Yusuf Ali"]
        .iter()
        .map(|label| {
            engine
                .submit(
                    AuthorKind::Administrator(1),
                    ContentDraft::translation(verse.id, "en", format!("{} text", label), *label),
                )
                .unwrap()
                .id
        })
        .collect();

    // Each thread opens its own connection, as separate processes would
    let handles: Vec<_> = ids
        .iter()
        .copied()
        .map(|id| {
            let config = config.clone();
            thread::spawn(move || {
                let store = Store::open(&config.database_path, &config).unwrap();
                let engine = ModerationEngine::new(&store);
                for _ in 0..25 {
                    with_retry(|| engine.set_default(id, true)).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let defaults: Vec<i64> = engine
        .items_for_verse(verse.id, ContentKind::Translation, Some(ContentStatus::Approved))
        .unwrap()
        .into_iter()
        .filter(|item| item.is_default)
        .map(|item| item.id)
        .collect();
    assert_eq!(defaults.len(), 1, "defaults after race: {:?}", defaults);
    assert!(ids.contains(&defaults[0]));
}

#[test]
fn shared_store_serializes_writers() {
    let store = Arc::new(Store::open_in_memory().unwrap());
    let verse = store.insert_verse(1, 1, "بِسْمِ ٱللَّهِ").unwrap().unwrap();

    let handles: Vec<_> = (0..4)
        .map(|n| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                let engine = ModerationEngine::new(&store);
                let item = engine
                    .submit(
                        AuthorKind::Administrator(n),
                        ContentDraft::translation(verse.id, "en", "text", format!("V{}", n))
                            .as_default(),
                    )
                    .unwrap();
                engine.set_default(item.id, true).unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let engine = ModerationEngine::new(&store);
    let items = engine
        .items_for_verse(verse.id, ContentKind::Translation, None)
        .unwrap();
    assert_eq!(items.len(), 4);
    assert_eq!(items.iter().filter(|i| i.is_default).count(), 1);
}

#[test]
fn concurrent_reviews_are_not_lost() {
    let temp = TempDir::new().unwrap();
    let config = test_config(&temp);

    let store = Store::open(&config.database_path, &config).unwrap();
    for ayah in 1..=20 {
        store.insert_verse(2, ayah, "آيَة").unwrap();
    }

    let handles: Vec<_> = (0..4i64)
        .map(|user| {
            let config = config.clone();
            thread::spawn(move || {
                let store = Store::open(&config.database_path, &config).unwrap();
                let scheduler = MemorizationScheduler::new(&store);
                for ayah in 1..=20u16 {
                    with_retry(|| {
                        scheduler.record_review(
                            user,
                            2,
                            ayah,
                            MemorizationStatus::Learning,
                            Some((ayah % 9) as i32),
                        )
                    })
                    .unwrap();
                    // Every thread also touches a shared record
                    with_retry(|| {
                        scheduler.record_review(0, 2, 1, MemorizationStatus::Review, Some(user as i32))
                    })
                    .unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let scheduler = MemorizationScheduler::new(&store);
    for user in 1..4 {
        let records = scheduler.progress(user, Some(2)).unwrap();
        assert_eq!(records.len(), 20);
        for record in &records {
            assert_eq!(record.srs_level, (record.ayah_number % 9) as u32);
        }
    }

    // User 0 wrote its own 20 records plus the shared one overlaps verse 1
    let shared = scheduler.progress(0, Some(2)).unwrap();
    assert_eq!(shared.len(), 20);
    let first = shared.iter().find(|r| r.ayah_number == 1).unwrap();
    assert!(first.srs_level < 4);
}

#[test]
fn concurrent_recalls_each_advance_the_level() {
    let temp = TempDir::new().unwrap();
    let config = test_config(&temp);

    let store = Store::open(&config.database_path, &config).unwrap();
    store.insert_verse(112, 1, "قُلْ هُوَ ٱللَّهُ أَحَدٌ").unwrap();

    const THREADS: u32 = 4;
    const ROUNDS: u32 = 10;
    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let config = config.clone();
            thread::spawn(move || {
                let store = Store::open(&config.database_path, &config).unwrap();
                let scheduler = MemorizationScheduler::new(&store);
                for _ in 0..ROUNDS {
                    with_retry(|| {
                        scheduler.record_recall(7, 112, 1, MemorizationStatus::Review, Recall::Easy)
                    })
                    .unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let scheduler = MemorizationScheduler::new(&store);
    let records = scheduler.progress(7, Some(112)).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].srs_level, THREADS * ROUNDS);
}
