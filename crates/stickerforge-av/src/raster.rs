//! Still-image padding.
//!
//! Destination platforms expect square stickers; non-square still WEBPs are
//! centred on a transparent canvas before upload.

use std::io::Cursor;

use image::codecs::webp::WebPEncoder;
use image::{ExtendedColorType, ImageFormat, RgbaImage};
use stickerforge_core::{Error, Result};

/// Decode a still WEBP into straight-alpha RGBA8.
pub fn decode_webp(data: &[u8]) -> Result<RgbaImage> {
    let image = image::load_from_memory_with_format(data, ImageFormat::WebP)
        .map_err(|e| Error::Decode(format!("failed to decode webp image: {e}")))?;
    Ok(image.to_rgba8())
}

/// Encode RGBA8 as lossless WEBP.
pub fn encode_webp(image: &RgbaImage) -> Result<Vec<u8>> {
    let mut out = Cursor::new(Vec::new());
    WebPEncoder::new_lossless(&mut out)
        .encode(
            image.as_raw(),
            image.width(),
            image.height(),
            ExtendedColorType::Rgba8,
        )
        .map_err(|e| Error::Encode(format!("failed to encode padded image into webp: {e}")))?;
    Ok(out.into_inner())
}

/// Grow `image` by `width_pad` x `height_pad` transparent pixels.
///
/// The source lands at `(width_pad / 2, height_pad / 2)`, so an odd padding
/// puts the extra pixel on the right/bottom edge. Source pixels are copied
/// unchanged; every new pixel is `[0, 0, 0, 0]`.
pub fn pad(image: &RgbaImage, width_pad: u32, height_pad: u32) -> Result<RgbaImage> {
    let width = image
        .width()
        .checked_add(width_pad)
        .ok_or_else(|| Error::validation("padded width overflows u32"))?;
    let height = image
        .height()
        .checked_add(height_pad)
        .ok_or_else(|| Error::validation("padded height overflows u32"))?;

    let mut canvas = RgbaImage::new(width, height);
    // On a fully transparent canvas a straight copy is the same as
    // source-over compositing, without the float round trip.
    image::imageops::replace(
        &mut canvas,
        image,
        i64::from(width_pad / 2),
        i64::from(height_pad / 2),
    );
    Ok(canvas)
}

/// Decode, pad and re-encode a still WEBP.
pub fn pad_webp(data: &[u8], width_pad: u32, height_pad: u32) -> Result<Vec<u8>> {
    let image = decode_webp(data)?;
    let padded = pad(&image, width_pad, height_pad)?;
    encode_webp(&padded)
}
