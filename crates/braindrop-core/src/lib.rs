//! braindrop-core: local idea store and query engine.
//!
//! Ideas (text notes, voice memos, images) live in one authoritative
//! [`IdeaStore`], which persists the whole collection as a single JSON blob
//! through a [`KeyValueStorage`] backend. Views over the collection come
//! from the pure functions in [`query`].

pub mod config;
pub mod error;
pub mod idea;
pub mod query;
pub mod stats;
pub mod storage;
pub mod store;
pub mod tags;
pub mod timestamp;
pub mod transfer;

pub use config::*;
pub use error::*;
pub use idea::*;
pub use query::{distinct_tags, filter, sort_by_created_at, IdeaFilter};
pub use stats::*;
pub use storage::{FileStorage, IdeaRepository, KeyValueStorage, MemoryStorage, DEFAULT_SLOT_KEY};
pub use store::*;
pub use tags::*;
pub use transfer::*;

#[cfg(feature = "sqlite")]
pub use storage::SqliteStorage;
