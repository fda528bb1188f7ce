//! End-to-end sheet rendering through the public API.
//!
//! Photos are synthesized with the `image` crate and every sheet is decoded
//! again to check what actually landed on the page.

use image::codecs::png::PngEncoder;
use image::{Rgb, RgbImage};
use print_sheet::config::{SheetConfig, SizeEntry, resolve_config};
use print_sheet::imaging::{OutputFormat, RustBackend, solve_grid};
use print_sheet::sheet::generate_print_sheet_with;
use print_sheet::{SheetError, generate_print_sheet, plan_print_sheet};
use sha2::{Digest, Sha256};

const WHITE: [u8; 3] = [255, 255, 255];

fn png(img: &RgbImage) -> Vec<u8> {
    let mut buf = Vec::new();
    img.write_with_encoder(PngEncoder::new(&mut buf)).unwrap();
    buf
}

fn portrait_photo() -> Vec<u8> {
    png(&RgbImage::from_fn(70, 90, |x, y| {
        Rgb([(x * 3) as u8, (y * 2) as u8, 90])
    }))
}

fn png_config() -> SheetConfig {
    let overlay: toml::Value = toml::from_str("[output]\nformat = \"png\"").unwrap();
    resolve_config(Some(overlay)).unwrap()
}

fn decode(bytes: &[u8]) -> RgbImage {
    image::load_from_memory(bytes).unwrap().to_rgb8()
}

fn bounds(img: &RgbImage) -> (u32, u32, u32, u32) {
    let (mut x0, mut y0, mut x1, mut y1) = (u32::MAX, u32::MAX, 0, 0);
    for (x, y, p) in img.enumerate_pixels() {
        if p.0 != WHITE {
            x0 = x0.min(x);
            y0 = y0.min(y);
            x1 = x1.max(x);
            y1 = y1.max(y);
        }
    }
    (x0, y0, x1, y1)
}

#[test]
fn four_by_six_landscape_holds_eight_upright_photos() {
    let sheet = generate_print_sheet_with(
        &RustBackend::new(),
        &png_config(),
        &portrait_photo(),
        "4x6_L",
        "35x45",
    )
    .unwrap();

    assert_eq!(sheet.layout.upright.count, 8);
    assert_eq!(sheet.layout.rotated.count, 6);
    assert!(!sheet.layout.grid.rotated);
    assert_eq!(sheet.layout.cells.len(), 8);
    assert!(sheet.layout.cells.iter().all(|c| !c.rotated));
    assert_eq!(sheet.suggested_filename, "passport-print-4x6_L.png");

    let img = decode(&sheet.bytes);
    assert_eq!(img.dimensions(), (1800, 1200));
}

#[test]
fn content_is_centered_within_one_pixel() {
    for (page, standard) in [
        ("4x6_L", "35x45"),
        ("4x6_P", "35x45"),
        ("A4_P", "2x2"),
        ("5x7_L", "35x45"),
    ] {
        let sheet = generate_print_sheet_with(
            &RustBackend::new(),
            &png_config(),
            &portrait_photo(),
            page,
            standard,
        )
        .unwrap();
        let img = decode(&sheet.bytes);
        let (w, h) = img.dimensions();
        let (x0, y0, x1, y1) = bounds(&img);
        let right = w - 1 - x1;
        let bottom = h - 1 - y1;
        assert!(x0.abs_diff(right) <= 1, "{page}/{standard}: {x0} vs {right}");
        assert!(y0.abs_diff(bottom) <= 1, "{page}/{standard}: {y0} vs {bottom}");
    }
}

#[test]
fn oversized_standard_gives_blank_page() {
    let mut config = png_config();
    config.standards.insert(
        "poster".to_string(),
        SizeEntry {
            width: 2000,
            height: 2000,
            label: None,
        },
    );
    let sheet = generate_print_sheet_with(
        &RustBackend::new(),
        &config,
        &portrait_photo(),
        "4x6_L",
        "poster",
    )
    .unwrap();

    assert_eq!(sheet.layout.grid.count, 0);
    let img = decode(&sheet.bytes);
    assert_eq!(img.dimensions(), (1800, 1200));
    assert!(img.pixels().all(|p| p.0 == WHITE));
}

#[test]
fn unknown_page_key_renders_default_page() {
    let sheet = generate_print_sheet_with(
        &RustBackend::new(),
        &png_config(),
        &portrait_photo(),
        "Tabloid",
        "35x45",
    )
    .unwrap();

    assert!(sheet.layout.page.fell_back);
    assert_eq!(sheet.layout.page.requested, "Tabloid");
    assert_eq!(sheet.layout.page.entry.key, "4x6_L");
    assert_eq!(decode(&sheet.bytes).dimensions(), (1800, 1200));
}

#[test]
fn output_dimensions_match_every_builtin_page() {
    let config = png_config();
    for (key, dims) in [
        ("4x6_L", (1800, 1200)),
        ("4x6_P", (1200, 1800)),
        ("5x7_L", (2100, 1500)),
        ("Letter_P", (2550, 3300)),
    ] {
        let sheet =
            generate_print_sheet_with(&RustBackend::new(), &config, &portrait_photo(), key, "2x2")
                .unwrap();
        assert_eq!(decode(&sheet.bytes).dimensions(), dims, "{key}");
    }
}

#[test]
fn rendering_is_deterministic() {
    let photo = portrait_photo();
    let digest = || {
        let sheet = generate_print_sheet(&photo, "4x6_P", "35x45").unwrap();
        format!("{:x}", Sha256::digest(&sheet.bytes))
    };
    assert_eq!(digest(), digest());
}

#[test]
fn jpeg_is_the_default_output() {
    let sheet = generate_print_sheet(&portrait_photo(), "4x6_L", "2x2").unwrap();
    assert_eq!(sheet.format, OutputFormat::Jpeg);
    assert_eq!(&sheet.bytes[..2], &[0xFF, 0xD8]);
    assert_eq!(decode(&sheet.bytes).dimensions(), (1800, 1200));
}

#[test]
fn undecodable_photo_is_a_decode_error() {
    let err = generate_print_sheet(b"\x89PNG but not really", "4x6_L", "35x45").unwrap_err();
    assert!(matches!(err, SheetError::Decode(_)));
}

#[test]
fn plan_never_overflows_the_usable_area() {
    let config = SheetConfig::default();
    for page in ["4x6_L", "4x6_P", "5x7_L", "A4_P", "Letter_P"] {
        for standard in ["35x45", "2x2"] {
            let layout = plan_print_sheet(&config, page, standard);
            let (pw, ph) = layout.page.entry.dimensions();
            let margin = config.layout.margin;
            assert!(layout.extent.0 <= pw.saturating_sub(2 * margin));
            assert!(layout.extent.1 <= ph.saturating_sub(2 * margin));
            assert_eq!(layout.cells.len() as u32, layout.grid.count);
        }
    }
}

#[test]
fn solve_grid_is_public() {
    let fit = solve_grid(1800, 1200, 413, 531, 25, 20);
    assert_eq!((fit.cols, fit.rows, fit.count), (4, 2, 8));
}
