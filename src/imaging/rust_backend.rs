//! Pure Rust sheet backend built on the `image` crate.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, TIFF, WebP) | `image::load_from_memory` |
//! | Scale photo to standard size | `image::imageops::resize` with `Lanczos3` |
//! | Compose cells + cut guides | per-pixel writes through [`CellTransform`] |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` |
//! | Encode → PNG | `image::codecs::png::PngEncoder` |

use super::backend::{BackendError, SheetBackend};
use super::calculations::{CellTransform, guide_points};
use super::params::{ComposeParams, EncodeParams, OutputFormat, Rgb};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::imageops::FilterType;
use image::{ImageFormat, RgbImage};
use std::path::Path;
use std::sync::LazyLock;

const PHOTO_CANDIDATES: &[(&str, ImageFormat)] = &[
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("png", ImageFormat::Png),
    ("tif", ImageFormat::Tiff),
    ("tiff", ImageFormat::Tiff),
    ("webp", ImageFormat::WebP),
];

static SUPPORTED_EXTENSIONS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    PHOTO_CANDIDATES
        .iter()
        .filter(|(_, fmt)| fmt.reading_enabled())
        .map(|(ext, _)| *ext)
        .collect()
});

/// Returns the set of photo file extensions that have working decoders compiled in.
pub fn supported_input_extensions() -> &'static [&'static str] {
    &SUPPORTED_EXTENSIONS
}

/// Whether `path` has an extension we can decode (case-insensitive).
pub fn is_supported_photo(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| {
            supported_input_extensions()
                .iter()
                .any(|s| s.eq_ignore_ascii_case(e))
        })
}

/// Backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn put_clipped(canvas: &mut RgbImage, x: i64, y: i64, color: Rgb) {
    let (w, h) = canvas.dimensions();
    if x < 0 || y < 0 || x >= i64::from(w) || y >= i64::from(h) {
        return;
    }
    canvas.put_pixel(x as u32, y as u32, image::Rgb(color));
}

impl SheetBackend for RustBackend {
    fn decode(&self, bytes: &[u8]) -> Result<RgbImage, BackendError> {
        let img = image::load_from_memory(bytes).map_err(|e| BackendError::Decode(e.to_string()))?;
        // Alpha is dropped, not composited: the photo must already be flat.
        Ok(img.to_rgb8())
    }

    fn compose(&self, params: &ComposeParams, photo: &RgbImage) -> Result<RgbImage, BackendError> {
        let (page_w, page_h) = params.page;
        let mut canvas = RgbImage::from_pixel(page_w, page_h, image::Rgb(params.style.background));

        if params.placements.is_empty() {
            return Ok(canvas);
        }

        let (native_w, native_h) = params.native;
        let scaled;
        let tile: &RgbImage = if photo.dimensions() == params.native {
            photo
        } else {
            scaled = image::imageops::resize(photo, native_w, native_h, FilterType::Lanczos3);
            &scaled
        };
        let guide = guide_points(native_w, native_h, &params.style.guides);

        for cell in &params.placements {
            let transform = CellTransform::for_cell(cell, params.native);

            for (sx, sy, pixel) in tile.enumerate_pixels() {
                let (x, y) = transform.map(sx, sy);
                put_clipped(&mut canvas, x, y, pixel.0);
            }
            for &(gx, gy) in &guide {
                let (x, y) = transform.map(gx, gy);
                put_clipped(&mut canvas, x, y, params.style.guides.color);
            }
        }

        Ok(canvas)
    }

    fn encode(&self, sheet: &RgbImage, params: &EncodeParams) -> Result<Vec<u8>, BackendError> {
        let mut buf = Vec::new();
        let result = match params.format {
            OutputFormat::Jpeg => {
                let quality = params.quality.value() as u8;
                sheet.write_with_encoder(JpegEncoder::new_with_quality(&mut buf, quality))
            }
            OutputFormat::Png => sheet.write_with_encoder(PngEncoder::new(&mut buf)),
        };
        result.map_err(|e| BackendError::Encode(e.to_string()))?;
        Ok(buf)
    }
}
