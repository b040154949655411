//! Quran study core
//!
//! Canonical verse text, contributed translations, tafsir and word meanings
//! with an admin moderation workflow, default-version selection, and
//! per-user memorization scheduling.

pub mod config;
pub mod error;
pub mod import;
pub mod memorization;
pub mod moderation;
pub mod store;
pub mod study;

pub use config::StudyConfig;
pub use error::{Result, StudyError};
pub use store::Store;
