//! Skymirror - mirror a public social profile onto your own account
//!
//! This library provides the core mirroring loop: poll an external profile
//! on an interval, detect new posts by content digest, and republish only
//! the unseen ones, with a bounded persisted seen-log deduplicating across
//! restarts.

pub mod config;
pub mod db;
pub mod error;
pub mod fetch;
pub mod identifier;
pub mod logging;
pub mod mirror;
pub mod publish;
pub mod seen_log;
pub mod types;

// Re-export commonly used types
pub use config::Config;
pub use db::Database;
pub use error::{Result, SkymirrorError};
pub use mirror::MirrorLoop;
pub use seen_log::{SeenLog, SeenLogStore};
pub use types::{Item, MirrorRecord};
