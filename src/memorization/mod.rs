//! Verse memorization (hifz) tracking with fixed-interval spaced repetition
//!
//! - `algorithm`: the interval table and recall-to-level helper
//! - `models`: status and progress records
//! - `scheduler`: recording reviews and querying what is due

pub mod algorithm;
pub mod models;
pub mod scheduler;

pub use algorithm::{interval_days, next_review_after, Recall, INTERVAL_DAYS};
pub use models::*;
pub use scheduler::MemorizationScheduler;
