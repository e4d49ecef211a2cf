//! Vidhi daemon library - exposes modules for testing.

pub mod config;
pub mod engine;
pub mod events;
pub mod llm;
pub mod monitor;
pub mod prompts;
pub mod retrieval;
pub mod scoring;
