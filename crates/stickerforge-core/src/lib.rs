//! stickerforge-core: shared types, IDs, errors and configuration.
//!
//! This crate is the foundational dependency for the other stickerforge
//! crates, providing job identifiers, a unified error type, sticker format
//! detection, pack metadata, and the conversion configuration.

pub mod config;
pub mod error;
pub mod ids;
pub mod media;

// Re-export the most commonly used items at the crate root.
pub use config::Config;
pub use error::{Error, Result, StrategyFailure};
pub use ids::JobId;
pub use media::{StickerFormat, StickerMetadata};
