//! Storage layer for devhub - a string key-value store with JSON helpers.
//!
//! Every stateful component persists through [`KeyValueStore`]. The file
//! store keeps one JSON document per key on disk; the memory store backs
//! tests and throwaway sessions.

mod file;
pub mod history;
pub(crate) mod memory;
mod traits;

pub use file::FileStore;
pub use history::{ConfigHistoryEntry, KEY_PREFIX, ToolConfig, ToolConfigStore};
pub use memory::MemoryStore;
pub use traits::{KeyValueStore, KeyValueStoreExt, SharedStore};
