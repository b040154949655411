//! Per-user study artifacts: bookmarks, private notes and the reading log

mod models;
mod storage;

pub use models::*;
pub use storage::StudyStorage;
