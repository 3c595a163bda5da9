//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Input events
//! - Storage (LocalStorage on web)
//! - Player identity
//! - Background music ducking
//! - Sharing scores

pub mod identity;
pub mod input;
pub mod music;
pub mod share;
pub mod storage;

pub use identity::PlayerIdentity;
pub use input::{Action, action_for_key, action_for_pointer};
pub use music::{MusicDuck, MusicPlayer};
pub use share::{ShareSink, score_summary};
pub use storage::{KeyValueStore, LocalStore, MemoryStore, StorageError};
