//! Shared types, error model, and configuration for askmail.
//!
//! This crate is the foundation depended on by all other askmail crates.
//! It provides:
//! - [`AskmailError`]: the unified error type returned by collaborators
//! - Domain types ([`Artifact`])
//! - Configuration ([`AppConfig`], resolved [`LlmSettings`] / [`MailSettings`])

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, LlmConfig, LlmSettings, MailConfig, MailSettings, OutputConfig,
    PLACEHOLDER_CREDENTIALS, config_dir, config_file_path, init_config, load_config,
    load_config_from, resolve_llm_settings, resolve_mail_settings,
};
pub use error::{AskmailError, Result};
pub use types::{Artifact, PDF_CONTENT_TYPE};
