//! Chat-completions adapter
//!
//! Implements LlmGateway over any OpenAI-compatible `/chat/completions`
//! endpoint (OpenRouter, OpenAI, local servers).

pub mod error;
pub mod gateway;
pub mod protocol;
pub mod session;
