//! Core types for docqa
//!
//! Domain types, configuration and constants shared across all other crates.

pub mod constants;
mod config;
mod document;
mod env_config;
mod error;
mod session;

pub use config::{Config, EmbeddingBackend};
pub use document::*;
pub use env_config::{env_duration_secs, env_parse_with_default};
pub use error::*;
pub use session::*;
