//! Hosted generative-content provider
//!
//! Talks to a `generateContent`-style REST API authenticated with an API key
//! passed as the `key` query parameter.

mod client;

pub use client::{CloudGenerativeAdapter, DEFAULT_CLOUD_MODEL, DEFAULT_ENDPOINT_TEMPLATE};
