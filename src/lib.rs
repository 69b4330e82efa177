//! wishlist: save toward the things you want.

pub mod cli;
pub mod config;
pub mod detail;
pub mod error;
pub mod image;
pub mod interactive;
pub mod list;
pub mod models;
pub mod operations;
pub mod snapshot;
pub mod store;
pub mod utils;

// Re-export commonly used types
pub use detail::{DetailController, DetailHandoff, DetailResult};
pub use error::{Result, ValidationError, WishlistError};
pub use list::{ApplyOutcome, ListController, LoadReport};
pub use models::{ItemId, Tier, WishItem, Wishlist};
pub use store::{FileStore, KeyValueStore, MemoryStore};
