//! Configuration loading and schema definitions
//!
//! Every engine receives its configuration explicitly; nothing reads global
//! state.

mod loader;
mod schema;

pub use loader::Config;
pub use schema::*;
