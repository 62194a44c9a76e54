//! Image validation and preparation for document embedding.
//!
//! Only PNG input is accepted for embedding. The pipeline flattens any alpha
//! channel onto a white background, scales the image down proportionally so
//! its width fits the page, and re-encodes to PNG.

use crate::config::{MAX_IMAGE_BYTES, MAX_IMAGE_WIDTH_INCHES, EMUS_PER_INCH, PIXELS_PER_INCH};
use crate::error::{Result, ServiceError};
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageFormat, RgbImage, Rgba};
use log::debug;
use std::io::Cursor;

pub const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];

/// An image ready to be inserted into a document.
pub struct PreparedImage {
    pub png_bytes: Vec<u8>,
    pub width_px: u32,
    pub height_px: u32,
    pub width_emu: i64,
    pub height_emu: i64,
}

/// Detect the image format from magic bytes, independent of any file
/// extension the upload claimed.
pub fn detect_format(bytes: &[u8]) -> Option<&'static str> {
    const MAGICS: [(&[u8], &str); 7] = [
        (&PNG_MAGIC, "PNG"),
        (&[0xFF, 0xD8, 0xFF], "JPEG"),
        (b"GIF87a", "GIF"),
        (b"GIF89a", "GIF"),
        (b"BM", "BMP"),
        (b"II*\x00", "TIFF"),
        (b"MM\x00*", "TIFF"),
    ];
    MAGICS
        .iter()
        .find(|(magic, _)| bytes.starts_with(magic))
        .map(|(_, name)| *name)
}

/// Reject anything that is not a PNG within the size limit.
pub fn validate_for_embedding(bytes: &[u8]) -> Result<()> {
    if bytes.len() > MAX_IMAGE_BYTES {
        return Err(ServiceError::Validation(format!(
            "image too large ({} bytes, max {} MB)",
            bytes.len(),
            MAX_IMAGE_BYTES / (1024 * 1024)
        )));
    }
    if bytes.len() < PNG_MAGIC.len() || !bytes.starts_with(&PNG_MAGIC) {
        return Err(ServiceError::Validation(
            "image is not a PNG (bad magic header)".to_string(),
        ));
    }
    Ok(())
}

/// Decode, flatten transparency onto white, resize to fit the maximum page
/// width, and re-encode as PNG.
pub fn prepare_for_embedding(bytes: &[u8]) -> Result<PreparedImage> {
    validate_for_embedding(bytes)?;

    let decoded = image::load_from_memory(bytes)?;
    let (orig_w, orig_h) = decoded.dimensions();
    debug!("decoded image {}x{}", orig_w, orig_h);

    let mut flattened = flatten_onto_white(&decoded);

    let max_width_px = (MAX_IMAGE_WIDTH_INCHES * PIXELS_PER_INCH as f64) as u32;
    let (w, h) = flattened.dimensions();
    if w > max_width_px {
        let new_h = ((h as f64) * (max_width_px as f64) / (w as f64)).round() as u32;
        flattened = flattened.resize_exact(max_width_px, new_h.max(1), FilterType::Lanczos3);
        debug!("resized image {}x{} -> {}x{}", w, h, max_width_px, new_h);
    }

    let (width_px, height_px) = flattened.dimensions();
    let mut png_bytes = Vec::new();
    flattened.write_to(&mut Cursor::new(&mut png_bytes), ImageFormat::Png)?;

    Ok(PreparedImage {
        png_bytes,
        width_px,
        height_px,
        width_emu: px_to_emu(width_px),
        height_emu: px_to_emu(height_px),
    })
}

fn px_to_emu(px: u32) -> i64 {
    px as i64 * EMUS_PER_INCH / PIXELS_PER_INCH as i64
}

fn flatten_onto_white(img: &DynamicImage) -> DynamicImage {
    let rgba = img.to_rgba8();
    let (w, h) = rgba.dimensions();
    let mut out = RgbImage::new(w, h);
    for (x, y, Rgba([r, g, b, a])) in rgba.enumerate_pixels().map(|(x, y, p)| (x, y, *p)) {
        let alpha = a as u32;
        let blend = |c: u8| ((c as u32 * alpha + 255 * (255 - alpha)) / 255) as u8;
        out.put_pixel(x, y, image::Rgb([blend(r), blend(g), blend(b)]));
    }
    DynamicImage::ImageRgb8(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_png(w: u32, h: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(w, h, image::Rgb([10, 20, 30])));
        let mut out = Vec::new();
        img.write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
            .unwrap();
        out
    }

    #[test]
    fn rejects_non_png_regardless_of_claims() {
        // JPEG magic, even if a caller swears it is a .png
        let jpeg = [0xFF, 0xD8, 0xFF, 0xE0, 0, 0, 0, 0];
        assert!(matches!(
            validate_for_embedding(&jpeg),
            Err(ServiceError::Validation(_))
        ));
        assert_eq!(detect_format(&jpeg), Some("JPEG"));
    }

    #[test]
    fn rejects_truncated_input() {
        assert!(validate_for_embedding(&PNG_MAGIC[..4]).is_err());
    }

    #[test]
    fn accepts_valid_png() {
        let png = tiny_png(4, 4);
        assert!(validate_for_embedding(&png).is_ok());
        assert_eq!(detect_format(&png), Some("PNG"));
    }

    #[test]
    fn resizes_wide_images_proportionally() {
        let png = tiny_png(1152, 576); // twice the max width at 96 dpi
        let prepared = prepare_for_embedding(&png).unwrap();
        assert_eq!(prepared.width_px, 576);
        assert_eq!(prepared.height_px, 288);
        assert_eq!(prepared.width_emu, 576 * EMUS_PER_INCH / 96);
    }

    #[test]
    fn small_images_keep_their_size() {
        let png = tiny_png(100, 40);
        let prepared = prepare_for_embedding(&png).unwrap();
        assert_eq!((prepared.width_px, prepared.height_px), (100, 40));
        assert!(prepared.png_bytes.starts_with(&PNG_MAGIC));
    }
}
