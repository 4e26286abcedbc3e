//! Stickerforge - sticker conversion between chat platforms
//!
//! This library crate exposes config loading and conversion dispatch for
//! the CLI and its integration tests.

pub mod config;
pub mod dispatch;
