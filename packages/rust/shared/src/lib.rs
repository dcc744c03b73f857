//! Shared types, error model, and configuration for tubedigest.
//!
//! This crate is the foundation depended on by all other tubedigest crates.
//! It provides:
//! - [`TubedigestError`] — the unified error type
//! - Domain types ([`ChannelSnapshot`], [`VideoEntry`], [`RunId`])
//! - Configuration ([`AppConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DefaultsConfig, GitConfig, OpenAiConfig, SmtpConfig, config_dir, config_file_path,
    init_config, load_config, load_config_from, require_env, validate_credentials,
};
pub use error::{Result, TubedigestError};
pub use types::{ChannelSnapshot, RunId, VideoEntry, is_channel_id, watch_url};
