//! Local chat-completions provider
//!
//! Connects to an OpenAI-compatible server on the local machine or network
//! (LM Studio and similar).

mod client;

pub use client::{DEFAULT_LOCAL_URL, LocalInferenceAdapter};
