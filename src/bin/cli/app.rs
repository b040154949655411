use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use quran_study_lib::memorization::MemorizationScheduler;
use quran_study_lib::moderation::ModerationEngine;
use quran_study_lib::store::{Store, Verse};
use quran_study_lib::study::StudyStorage;
use quran_study_lib::StudyConfig;

/// Shared application state for CLI commands
pub struct App {
    pub config: StudyConfig,
    pub store: Store,
}

impl App {
    /// Load configuration and open the database
    pub fn new(config_path: Option<&Path>, db_path: Option<&Path>) -> Result<Self> {
        let config_path: Option<PathBuf> = match config_path {
            Some(path) => Some(path.to_path_buf()),
            None => StudyConfig::default_data_dir()
                .ok()
                .map(|dir| dir.join("config.toml")),
        };

        let mut config = StudyConfig::load_or_default(config_path.as_deref())
            .context("Failed to load configuration")?;
        if let Some(db) = db_path {
            config.database_path = db.to_path_buf();
        }

        let store = Store::open(&config.database_path, &config).with_context(|| {
            format!("Failed to open database {}", config.database_path.display())
        })?;

        Ok(Self { config, store })
    }

    /// Find a verse by reference or fail with a readable message
    pub fn find_verse(&self, surah: u16, ayah: u16) -> Result<Verse> {
        self.store
            .verse_by_ref(surah, ayah)
            .context("Failed to look up verse")?
            .with_context(|| format!("No verse {}:{} in the database", surah, ayah))
    }

    pub fn moderation(&self) -> ModerationEngine<'_> {
        ModerationEngine::new(&self.store)
    }

    pub fn scheduler(&self) -> MemorizationScheduler<'_> {
        MemorizationScheduler::new(&self.store)
    }

    pub fn study(&self) -> StudyStorage<'_> {
        StudyStorage::new(&self.store)
    }
}
