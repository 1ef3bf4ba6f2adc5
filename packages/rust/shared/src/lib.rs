//! Shared types, error model, and configuration for the CDP assistant.
//!
//! This crate is the foundation depended on by all other workspace crates.
//! It provides:
//! - [`AssistantError`] — the unified error type
//! - Domain types ([`Platform`], [`DocumentEntry`], [`SearchResult`], [`Message`])
//! - Configuration ([`AppConfig`], [`CrawlConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, CrawlConfig, CrawlPoliciesConfig, DataConfig, SearchConfig, SourceEntry,
    config_dir, config_file_path, init_config, load_config, load_config_from,
};
pub use error::{AssistantError, Result};
pub use types::{
    ChatReply, DocumentEntry, Message, MessageId, Platform, PlatformFilter, Role, SearchResult,
};
