//! Core types shared by the tablemate discovery crates
//!
//! - **Records**: the immutable [`Restaurant`] input entity
//! - **Error handling**: errors with codes, context, and recovery suggestions
//! - **Configuration**: TOML-based configuration with validation
//! - **Caching**: a TTL + insertion-order bounded in-memory cache
//! - **Persistence**: the string-keyed [`store::KeyValueStore`] collaborator
//!
//! # Example
//!
//! ```rust
//! use tablemate_core::{config::Config, Restaurant};
//!
//! let config = Config::default();
//! let record = Restaurant::new("r1", "교촌치킨 강남점").at(37.4979, 127.0276);
//!
//! assert!(record.coordinate(&config.schema.bounds).is_some());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod cache;
pub mod config;
pub mod error;
pub mod restaurant;
pub mod store;

pub use error::{Error, ErrorCode, Result, ResultExt};
pub use restaurant::Restaurant;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::cache::{CacheConfig, TtlCache};
    pub use crate::config::{Config, ConfigSchema};
    pub use crate::error::{Error, ErrorCode, Result, ResultExt};
    pub use crate::restaurant::Restaurant;
    pub use crate::store::{FileStore, KeyValueStore, MemoryStore};
}
