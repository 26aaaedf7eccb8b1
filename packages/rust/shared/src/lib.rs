//! Shared types, error model, and configuration for qaforge.
//!
//! This crate is the foundation depended on by all other qaforge crates.
//! It provides:
//! - [`QaForgeError`], the unified error type
//! - Domain types ([`QaPair`], [`ChatMessage`], [`QuestionCount`])
//! - Configuration ([`AppConfig`], [`OutputConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, FallbackStrategy, GenerationConfig, OpenAiConfig, OutputConfig, config_dir,
    config_file_path, init_config, load_config, load_config_from, resolve_api_key,
};
pub use error::{QaForgeError, Result};
pub use types::{ChatMessage, MAX_QUESTION_COUNT, QaPair, QuestionCount, Role};
