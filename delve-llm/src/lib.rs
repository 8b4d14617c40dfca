//! Delve LLM - text generation over siumai
//!
//! Builds a siumai client for the configured provider and exposes it through
//! the core `Generator` capability.

pub mod client;

pub use client::{default_model, LlmGenerator, ProviderSettings, OPENROUTER_BASE_URL};
