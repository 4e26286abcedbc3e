//! Conversion configuration types.
//!
//! The top-level [`Config`] is deserialized by the binary (TOML) and handed
//! to the converters at construction. Every section defaults sensibly so a
//! completely empty file is valid.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::media::StickerMetadata;

// ---------------------------------------------------------------------------
// Top-level Config
// ---------------------------------------------------------------------------

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub scratch: ScratchConfig,
    pub tools: ToolsConfig,
    pub sticker: StickerMetadata,
    pub limits: LimitsConfig,
}

impl Config {
    /// Reject values the converters cannot work with.
    pub fn check(&self) -> Result<()> {
        let reducer = &self.limits.reducer;
        if reducer.ceiling_bytes == 0 {
            return Err(Error::validation("limits.reducer.ceiling_bytes must be > 0"));
        }
        if !(reducer.initial_quality > 0.0 && reducer.initial_quality <= 100.0) {
            return Err(Error::validation(
                "limits.reducer.initial_quality must be in (0, 100]",
            ));
        }
        if reducer.initial_quality <= reducer.min_quality || reducer.initial_fps <= reducer.min_fps {
            return Err(Error::validation(
                "limits.reducer initial values must be above their floors",
            ));
        }
        if self.tools.rasterizer.program.as_os_str().is_empty() {
            return Err(Error::validation("tools.rasterizer.program must be set"));
        }
        if self.scratch.root.as_os_str().is_empty() {
            return Err(Error::validation("scratch.root must be set"));
        }
        Ok(())
    }

    /// Return a list of validation warnings (non-fatal issues).
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.sticker.emojis.is_empty() {
            warnings.push("sticker.emojis is empty; stickers will carry no emoji tags".into());
        }
        if self.sticker.pack_name.is_empty() {
            warnings.push("sticker.pack_name is empty".into());
        }

        let args = &self.tools.rasterizer.args;
        for placeholder in ["{input}", "{output}"] {
            if !args.iter().any(|a| a.contains(placeholder)) {
                warnings.push(format!(
                    "tools.rasterizer.args never references {placeholder}"
                ));
            }
        }

        if self.limits.webm_to_webp.size_cap_bytes > self.limits.reducer.ceiling_bytes as u64 {
            warnings.push(
                "limits.webm_to_webp.size_cap_bytes exceeds the sticker ceiling".into(),
            );
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// Where per-job scratch directories are created.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScratchConfig {
    pub root: PathBuf,
}

impl Default for ScratchConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("downloads"),
        }
    }
}

/// External tool locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub ffmpeg: PathBuf,
    /// ImageMagick `convert`.
    pub convert: PathBuf,
    pub webpmux: PathBuf,
    pub rasterizer: RasterizerConfig,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ffmpeg: PathBuf::from("ffmpeg"),
            convert: PathBuf::from("convert"),
            webpmux: PathBuf::from("webpmux"),
            rasterizer: RasterizerConfig::default(),
        }
    }
}

/// Command template for the vector (TGS) to WEBP rasterizer.
///
/// `{input}`, `{output}`, `{fps}` and `{quality}` are substituted in `args`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RasterizerConfig {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl Default for RasterizerConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from("tgs2webp"),
            args: [
                "--fps",
                "{fps}",
                "--quality",
                "{quality}",
                "{input}",
                "{output}",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}

/// Size and quality limits.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    pub reducer: ReducerConfig,
    pub webm_to_webp: WebmToWebpConfig,
}

/// Adaptive quality reducer bounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReducerConfig {
    pub initial_quality: f32,
    pub initial_fps: u32,
    /// The loop stops once quality is no longer above this.
    pub min_quality: f32,
    /// The loop stops once fps is no longer above this.
    pub min_fps: u32,
    /// Output must be strictly smaller than this.
    pub ceiling_bytes: usize,
}

impl Default for ReducerConfig {
    fn default() -> Self {
        Self {
            initial_quality: 100.0,
            initial_fps: 30,
            min_quality: 2.0,
            min_fps: 5,
            ceiling_bytes: 1024 * 1024,
        }
    }
}

/// ffmpeg settings for WEBM to animated WEBP.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebmToWebpConfig {
    /// Passed to ffmpeg `-fs`.
    pub size_cap_bytes: u64,
    pub fps: u32,
    /// Argument of the `scale=` filter.
    pub scale: String,
    /// Argument of the `pad=` filter.
    pub pad: String,
}

impl Default for WebmToWebpConfig {
    fn default() -> Self {
        Self {
            size_cap_bytes: 800_000,
            fps: 15,
            scale: "512:512:force_original_aspect_ratio=decrease".into(),
            pad: "512:512:(ow-iw)/2:(oh-ih)/2".into(),
        }
    }
}
