//! Sticker formats and pack metadata.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// StickerFormat
// ---------------------------------------------------------------------------

/// Sticker container formats handled by the converters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StickerFormat {
    /// Gzip-compressed Lottie animation.
    Tgs,
    /// Still WEBP image.
    Webp,
    /// WEBP with an animation flag in its VP8X header.
    AnimatedWebp,
    /// Matroska/WebM video.
    Webm,
    /// GIF image.
    Gif,
}

impl StickerFormat {
    /// Sniff the format from the leading bytes of a payload.
    pub fn detect(data: &[u8]) -> Option<Self> {
        if data.starts_with(&[0x1F, 0x8B]) {
            return Some(Self::Tgs);
        }
        if data.starts_with(&[0x1A, 0x45, 0xDF, 0xA3]) {
            return Some(Self::Webm);
        }
        if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
            return Some(Self::Gif);
        }
        if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            // VP8X flags live at offset 20; bit 1 marks animation.
            if data.len() >= 21 && &data[12..16] == b"VP8X" && data[20] & 0x02 != 0 {
                return Some(Self::AnimatedWebp);
            }
            return Some(Self::Webp);
        }
        None
    }

    /// File extension used for scratch files of this format.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Tgs => "tgs",
            Self::Webp | Self::AnimatedWebp => "webp",
            Self::Webm => "webm",
            Self::Gif => "gif",
        }
    }

    /// MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Tgs => "application/x-tgsticker",
            Self::Webp | Self::AnimatedWebp => "image/webp",
            Self::Webm => "video/webm",
            Self::Gif => "image/gif",
        }
    }
}

impl fmt::Display for StickerFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tgs => write!(f, "tgs"),
            Self::Webp => write!(f, "webp"),
            Self::AnimatedWebp => write!(f, "animated_webp"),
            Self::Webm => write!(f, "webm"),
            Self::Gif => write!(f, "gif"),
        }
    }
}

impl FromStr for StickerFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tgs" => Ok(Self::Tgs),
            "webp" => Ok(Self::Webp),
            "animated_webp" => Ok(Self::AnimatedWebp),
            "webm" => Ok(Self::Webm),
            "gif" => Ok(Self::Gif),
            _ => Err(format!("Unknown sticker format: {s}")),
        }
    }
}

// ---------------------------------------------------------------------------
// StickerMetadata
// ---------------------------------------------------------------------------

/// Sticker pack identity embedded into converted WEBP stickers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StickerMetadata {
    pub pack_id: String,
    pub pack_name: String,
    pub author_name: String,
    pub emojis: Vec<String>,
}

impl Default for StickerMetadata {
    fn default() -> Self {
        Self {
            pack_id: "stickerforge.github.".into(),
            pack_name: "stickerforge".into(),
            author_name: "stickerforge".into(),
            emojis: vec!["😀".into()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn webp_header(chunk: &[u8; 4], flags: u8) -> Vec<u8> {
        let mut data = b"RIFF\0\0\0\0WEBP".to_vec();
        data.extend_from_slice(chunk);
        data.extend_from_slice(&[10, 0, 0, 0, flags, 0, 0, 0]);
        data
    }

    #[test]
    fn detects_tgs_by_gzip_magic() {
        assert_eq!(
            StickerFormat::detect(&[0x1F, 0x8B, 0x08, 0x00]),
            Some(StickerFormat::Tgs)
        );
    }

    #[test]
    fn detects_webm_and_gif() {
        assert_eq!(
            StickerFormat::detect(&[0x1A, 0x45, 0xDF, 0xA3, 0x9F]),
            Some(StickerFormat::Webm)
        );
        assert_eq!(StickerFormat::detect(b"GIF89a\x01\x00"), Some(StickerFormat::Gif));
    }

    #[test]
    fn distinguishes_still_and_animated_webp() {
        assert_eq!(
            StickerFormat::detect(&webp_header(b"VP8L", 0)),
            Some(StickerFormat::Webp)
        );
        assert_eq!(
            StickerFormat::detect(&webp_header(b"VP8X", 0x10)),
            Some(StickerFormat::Webp)
        );
        assert_eq!(
            StickerFormat::detect(&webp_header(b"VP8X", 0x12)),
            Some(StickerFormat::AnimatedWebp)
        );
    }

    #[test]
    fn unknown_payloads() {
        assert_eq!(StickerFormat::detect(b""), None);
        assert_eq!(StickerFormat::detect(b"\x89PNG\r\n\x1a\n"), None);
        assert_eq!(StickerFormat::detect(b"RIFF\0\0\0\0WAVE"), None);
    }

    #[test]
    fn format_string_round_trip() {
        for format in [
            StickerFormat::Tgs,
            StickerFormat::Webp,
            StickerFormat::AnimatedWebp,
            StickerFormat::Webm,
            StickerFormat::Gif,
        ] {
            assert_eq!(format.to_string().parse::<StickerFormat>(), Ok(format));
        }
        assert!("png".parse::<StickerFormat>().is_err());
    }

    #[test]
    fn extensions_and_mime_types() {
        assert_eq!(StickerFormat::AnimatedWebp.extension(), "webp");
        assert_eq!(StickerFormat::Tgs.mime_type(), "application/x-tgsticker");
        assert_eq!(StickerFormat::Webm.mime_type(), "video/webm");
    }

    #[test]
    fn default_metadata_has_one_emoji() {
        let meta = StickerMetadata::default();
        assert_eq!(meta.emojis, vec!["😀".to_string()]);
        assert!(!meta.pack_id.is_empty());
    }
}
