//! Domain layer for VoxChat
//!
//! Contains the conversation model, provider descriptors, voice settings and
//! the pure content helpers shared by every other crate.
//! This layer performs no I/O.

pub mod content;
pub mod entities;
pub mod errors;
pub mod value_objects;

pub use content::{ContentSegment, extract_segments};
pub use entities::*;
pub use errors::DomainError;
pub use value_objects::*;
