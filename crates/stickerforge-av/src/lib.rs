//! # stickerforge-av
//!
//! Sticker media conversion between chat platforms.
//!
//! This crate provides:
//!
//! - **Command execution** ([`ToolCommand`], [`CommandRunner`]) -- one seam
//!   for every external process, with failure classification in one place.
//! - **Tool discovery** ([`ToolRegistry`]) -- resolve ffmpeg, convert,
//!   webpmux and the TGS rasterizer.
//! - **Workspace management** ([`Workspace`]) -- per-job scratch directory,
//!   removed on every exit path.
//! - **Metadata embedding** ([`exif`]) -- the sticker-pack EXIF chunk and
//!   its `webpmux` splice.
//! - **Adaptive quality reduction** ([`QualityReducer`]) -- shrink quality
//!   and frame rate until a sticker fits the size ceiling.
//! - **Raster padding** ([`raster`]) -- centre still WEBPs on a transparent
//!   canvas.
//! - **Converters** ([`StickerConverter`]) -- TGS→WEBP, WEBM→WEBP,
//!   WEBP→WEBM, WEBP→GIF and the WEBM-then-GIF fallback chain.

pub mod chain;
pub mod command;
pub mod convert;
pub mod exif;
pub mod raster;
pub mod rasterize;
pub mod reducer;
pub mod tools;
pub mod workspace;

// ---- Re-exports for convenience ----

pub use chain::{first_success, ChainOutcome, Strategy};
pub use command::{CommandRunner, SystemRunner, ToolCommand, ToolOutput};
pub use convert::StickerConverter;
pub use exif::{build_exif_chunk, find_exif_chunk, parse_exif_chunk, MetadataEmbedder};
pub use rasterize::{ExternalRasterizer, VectorRasterizer};
pub use reducer::{QualityBudget, QualityReducer, Reduced};
pub use tools::{ToolInfo, ToolRegistry};
pub use workspace::Workspace;
