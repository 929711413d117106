//! sheetdrill-providers — LLM provider integrations.
//!
//! Implements the `LlmProvider` trait for Gemini and OpenAI, allowing
//! sheetdrill to grade conceptual answers and write reports with multiple
//! LLM backends.

pub mod config;
pub mod error;
pub mod gemini;
pub mod mock;
pub mod openai;

pub use config::{
    create_provider, load_config, load_config_from, require_provider, ProviderConfig,
    SheetdrillConfig,
};
pub use error::ProviderError;
