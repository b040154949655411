pub mod content;
pub mod import;
pub mod memorization;
pub mod moderation;
pub mod study;
