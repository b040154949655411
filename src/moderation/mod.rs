//! Content moderation
//!
//! Translations, tafsir and word meanings are stored as [`ContentItem`]s.
//! Contributor submissions enter as pending and wait for an administrator;
//! approved items compete for the single default slot of their group.

mod engine;
mod models;
mod selection;

pub use engine::ModerationEngine;
pub(crate) use engine::submit_in;
pub use models::*;
pub use selection::select_presented;
