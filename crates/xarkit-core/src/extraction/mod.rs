//! Extraction of archive members to disk.

pub mod attributes;
pub mod engine;

pub use engine::extract_archive;
pub use engine::extract_archive_with_progress;
pub use engine::extract_from;
