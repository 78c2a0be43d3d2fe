//! Subcommand implementations.

pub mod completion;
pub mod create;
pub mod extract;
pub mod fixtures;
pub mod inspect;
pub mod list;
pub mod verify;
