//! Image decoding and encoding helpers.

use std::io::Cursor;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::{DynamicImage, ImageOutputFormat, RgbaImage};

use crate::error::{MediaError, MediaResult};

/// Strip a `data:<mime>;base64,` prefix if present.
pub fn strip_data_url(input: &str) -> &str {
    let trimmed = input.trim();
    if trimmed.starts_with("data:") {
        if let Some((_, payload)) = trimmed.split_once(',') {
            return payload;
        }
    }
    trimmed
}

/// Decode raw image bytes in any supported raster format.
pub fn decode_image(bytes: &[u8]) -> MediaResult<DynamicImage> {
    image::load_from_memory(bytes).map_err(|e| MediaError::Decode(e.to_string()))
}

/// Decode a base64 string or `data:` URL into raw bytes.
pub fn decode_base64(input: &str) -> MediaResult<Vec<u8>> {
    STANDARD
        .decode(strip_data_url(input).as_bytes())
        .map_err(|e| MediaError::InvalidBase64(e.to_string()))
}

/// Decode a base64 string or `data:` URL into an image.
pub fn decode_base64_image(input: &str) -> MediaResult<DynamicImage> {
    decode_image(&decode_base64(input)?)
}

/// Encode an RGBA canvas as PNG.
pub fn encode_png(image: &RgbaImage) -> MediaResult<Vec<u8>> {
    let mut buf = Vec::new();
    DynamicImage::ImageRgba8(image.clone())
        .write_to(&mut Cursor::new(&mut buf), ImageOutputFormat::Png)
        .map_err(|e| MediaError::Encode(e.to_string()))?;
    Ok(buf)
}

/// Encode an RGBA canvas as base64 PNG.
pub fn encode_png_base64(image: &RgbaImage) -> MediaResult<String> {
    Ok(STANDARD.encode(encode_png(image)?))
}
