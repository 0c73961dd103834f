//! Shared types, error model, and configuration for internwatch.
//!
//! This crate is the foundation depended on by all other internwatch crates.
//! It provides:
//! - [`InternwatchError`]: the unified error type
//! - Domain types ([`Posting`], [`Terms`], [`Season`])
//! - Configuration ([`AppConfig`], [`RunConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, CONFIG_FILE_NAME, DEFAULT_SOURCE_URL, PathsConfig, ReadmeConfig, RunConfig,
    RunOverrides, SourceConfig, init_config, load_config, load_config_from,
};
pub use error::{InternwatchError, Result};
pub use types::{Posting, RawPosting, Season, Terms};
