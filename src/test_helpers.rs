//! Shared test utilities for the print-sheet test suite.
//!
//! Synthetic photos are generated in memory so no binary fixtures need to
//! live in the repository.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let bytes = encode_jpeg(&gradient_photo(413, 531));
//! let tmp = tempfile::TempDir::new().unwrap();
//! write_photo(&tmp.path().join("001-anna.png"), &solid_photo(40, 50, [200, 10, 10]));
//! ```

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{Rgb, RgbImage};
use std::path::Path;

use crate::imaging::Rgb as Color;

// =========================================================================
// Synthetic photos
// =========================================================================

/// A single-colour photo.
pub fn solid_photo(width: u32, height: u32, color: Color) -> RgbImage {
    RgbImage::from_pixel(width, height, Rgb(color))
}

/// Top half `top`, bottom half `bottom` (rows `0..height/2` are the top).
pub fn split_photo(width: u32, height: u32, top: Color, bottom: Color) -> RgbImage {
    RgbImage::from_fn(width, height, |_, y| {
        if y < height / 2 { Rgb(top) } else { Rgb(bottom) }
    })
}

/// A smooth gradient, handy when exact pixel values do not matter.
pub fn gradient_photo(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    })
}

// =========================================================================
// Encoding
// =========================================================================

pub fn encode_jpeg(img: &RgbImage) -> Vec<u8> {
    let mut buf = Vec::new();
    img.write_with_encoder(JpegEncoder::new_with_quality(&mut buf, 90))
        .unwrap();
    buf
}

pub fn encode_png(img: &RgbImage) -> Vec<u8> {
    let mut buf = Vec::new();
    img.write_with_encoder(PngEncoder::new(&mut buf)).unwrap();
    buf
}

/// Write `img` to `path`, encoding by extension (`.png`, anything else = JPEG).
pub fn write_photo(path: &Path, img: &RgbImage) {
    let bytes = match path.extension().and_then(|e| e.to_str()) {
        Some("png") => encode_png(img),
        _ => encode_jpeg(img),
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, bytes).unwrap();
}

// =========================================================================
// Pixel assertions
// =========================================================================

/// Count pixels that are not `background`.
pub fn count_non_background(img: &RgbImage, background: Color) -> usize {
    img.pixels().filter(|p| p.0 != background).count()
}

/// Bounding box `(min_x, min_y, max_x, max_y)` of all non-background pixels.
pub fn content_bounds(img: &RgbImage, background: Color) -> Option<(u32, u32, u32, u32)> {
    let mut bounds: Option<(u32, u32, u32, u32)> = None;
    for (x, y, p) in img.enumerate_pixels() {
        if p.0 == background {
            continue;
        }
        bounds = Some(match bounds {
            None => (x, y, x, y),
            Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
        });
    }
    bounds
}
