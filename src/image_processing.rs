use anyhow::{anyhow, Result};
use image::{DynamicImage, ImageFormat};

pub const JPEG_MIME_TYPE: &str = "image/jpeg";

const JPEG_QUALITY: u8 = 90;

pub fn detect_mime_type(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
        return Some("image/png");
    }
    if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return Some(JPEG_MIME_TYPE);
    }
    if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        return Some("image/gif");
    }
    if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        return Some("image/webp");
    }
    if bytes.starts_with(b"BM") {
        return Some("image/bmp");
    }
    None
}

pub fn mime_to_format(mime_type: &str) -> Result<ImageFormat> {
    match mime_type {
        "image/png" => Ok(ImageFormat::Png),
        "image/jpeg" | "image/jpg" => Ok(ImageFormat::Jpeg),
        "image/gif" => Ok(ImageFormat::Gif),
        "image/webp" => Ok(ImageFormat::WebP),
        "image/bmp" => Ok(ImageFormat::Bmp),
        _ => Err(anyhow!("unsupported mime type: {mime_type}")),
    }
}

/// Returns JPEG bytes for any supported image. JPEG input is passed through
/// untouched; the hint is only used when the magic bytes are inconclusive.
pub fn to_jpeg(bytes: &[u8], mime_hint: Option<&str>) -> Result<Vec<u8>> {
    let mime_type = detect_mime_type(bytes)
        .or(mime_hint)
        .ok_or_else(|| anyhow!("content is not a recognised image"))?;
    let format = mime_to_format(mime_type)?;
    if format == ImageFormat::Jpeg {
        return Ok(bytes.to_vec());
    }
    let image = image::load_from_memory_with_format(bytes, format)
        .map_err(|err| anyhow!("decode image failed: {err}"))?;
    // JPEG has no alpha channel.
    let rgb = DynamicImage::ImageRgb8(image.to_rgb8());
    let mut output = Vec::new();
    let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut output, JPEG_QUALITY);
    rgb.write_with_encoder(encoder)
        .map_err(|err| anyhow!("encode jpeg failed: {err}"))?;
    Ok(output)
}

#[cfg(test)]
pub(crate) fn sample_png() -> Vec<u8> {
    let image = image::RgbaImage::from_pixel(4, 4, image::Rgba([200, 40, 40, 255]));
    let mut output = Vec::new();
    DynamicImage::ImageRgba8(image)
        .write_to(&mut std::io::Cursor::new(&mut output), ImageFormat::Png)
        .unwrap();
    output
}
