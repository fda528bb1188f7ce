//! Parameter types for sheet composition and encoding.
//!
//! These structs describe *what* to draw, not *how* to draw it. They are the
//! interface between the pure [`calculations`](super::calculations) (which
//! decide where every cell goes) and the [`backend`](super::backend) (which
//! does the actual pixel work). Keeping them plain data lets the pipeline be
//! tested against a mock backend without touching pixels.
//!
//! ## Types
//!
//! - [`Quality`]: Lossy encoding quality (1-100, default 100). Clamped on construction.
//! - [`OutputFormat`]: Encoded sheet format (JPEG or PNG).
//! - [`LayoutParams`]: Margin, gap and the orientation threshold shared by every request.
//! - [`GuideStyle`]: Cut-guide stroke: colour, width, dash pattern.
//! - [`RenderStyle`]: Background colour plus guide style.
//! - [`ComposeParams`]: Everything needed to compose one sheet.
//! - [`EncodeParams`]: Format + quality for the final buffer.

use super::calculations::CellPlacement;
use serde::{Deserialize, Serialize};

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    /// Sheets go to a printer, so the default is maximum quality.
    fn default() -> Self {
        Self(100)
    }
}

/// Encoded output format for a finished sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Jpeg,
    Png,
}

impl OutputFormat {
    /// File extension used for suggested filenames.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Png => "png",
        }
    }

    /// Parse a user-supplied format name (`jpeg`, `jpg`, `png`).
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "jpeg" | "jpg" => Some(OutputFormat::Jpeg),
            "png" => Some(OutputFormat::Png),
            _ => None,
        }
    }
}

/// Grid fitting parameters.
///
/// - `margin`: empty border kept around the usable area, used only for fitting
/// - `gap`: spacing between adjacent cells
/// - `minimum_acceptable`: the upright count below which a denser rotated
///   layout may replace it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutParams {
    pub margin: u32,
    pub gap: u32,
    pub minimum_acceptable: u32,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            margin: 25,
            gap: 20,
            minimum_acceptable: 8,
        }
    }
}

/// An opaque 8-bit RGB colour.
pub type Rgb = [u8; 3];

pub const WHITE: Rgb = [255, 255, 255];
pub const LIGHT_GREY: Rgb = [0xcc, 0xcc, 0xcc];

/// Parse `#rgb` or `#rrggbb` (leading `#` optional).
pub fn parse_hex_color(value: &str) -> Option<Rgb> {
    let hex = value.trim().trim_start_matches('#');
    if !hex.is_ascii() {
        return None;
    }
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    match hex.len() {
        3 => {
            let mut rgb = [0u8; 3];
            for (i, slot) in rgb.iter_mut().enumerate() {
                // #abc expands to #aabbcc
                *slot = channel(&hex[i..=i])? * 17;
            }
            Some(rgb)
        }
        6 => Some([
            channel(&hex[0..2])?,
            channel(&hex[2..4])?,
            channel(&hex[4..6])?,
        ]),
        _ => None,
    }
}

/// Cut-guide stroke around every cell.
///
/// - `width`: stroke thickness in pixels, drawn inward from the cell edge (0 = no guides)
/// - `dash`/`gap`: dash pattern along the perimeter; either being 0 gives a solid line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuideStyle {
    pub color: Rgb,
    pub width: u32,
    pub dash: u32,
    pub gap: u32,
}

impl GuideStyle {
    /// Whether the pixel at `offset` along the perimeter is inked.
    pub fn is_inked(&self, offset: u32) -> bool {
        if self.dash == 0 || self.gap == 0 {
            return true;
        }
        offset % (self.dash + self.gap) < self.dash
    }
}

impl Default for GuideStyle {
    fn default() -> Self {
        Self {
            color: LIGHT_GREY,
            width: 1,
            dash: 10,
            gap: 10,
        }
    }
}

/// Everything about a sheet's look that is not geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderStyle {
    pub background: Rgb,
    pub guides: GuideStyle,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            background: WHITE,
            guides: GuideStyle::default(),
        }
    }
}

/// Parameters for composing one sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct ComposeParams {
    /// Canvas size (width, height).
    pub page: (u32, u32),
    /// The photo's native (unrotated) footprint.
    pub native: (u32, u32),
    /// Cells in row-major order.
    pub placements: Vec<CellPlacement>,
    pub style: RenderStyle,
}

/// Parameters for encoding a composed sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EncodeParams {
    pub format: OutputFormat,
    pub quality: Quality,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_clamps_to_valid_range() {
        assert_eq!(Quality::new(0).value(), 1);
        assert_eq!(Quality::new(50).value(), 50);
        assert_eq!(Quality::new(150).value(), 100);
    }

    #[test]
    fn quality_default_is_maximum() {
        assert_eq!(Quality::default().value(), 100);
    }

    #[test]
    fn output_format_parse_and_extension() {
        assert_eq!(OutputFormat::parse("JPG"), Some(OutputFormat::Jpeg));
        assert_eq!(OutputFormat::parse("jpeg"), Some(OutputFormat::Jpeg));
        assert_eq!(OutputFormat::parse("png"), Some(OutputFormat::Png));
        assert_eq!(OutputFormat::parse("gif"), None);
        assert_eq!(OutputFormat::Jpeg.extension(), "jpg");
        assert_eq!(OutputFormat::Png.extension(), "png");
    }

    #[test]
    fn layout_defaults() {
        let layout = LayoutParams::default();
        assert_eq!(layout.margin, 25);
        assert_eq!(layout.gap, 20);
        assert_eq!(layout.minimum_acceptable, 8);
    }

    #[test]
    fn parse_hex_long_and_short() {
        assert_eq!(parse_hex_color("#ffffff"), Some(WHITE));
        assert_eq!(parse_hex_color("#ccc"), Some(LIGHT_GREY));
        assert_eq!(parse_hex_color("102030"), Some([0x10, 0x20, 0x30]));
    }

    #[test]
    fn parse_hex_rejects_garbage() {
        assert_eq!(parse_hex_color("#12345"), None);
        assert_eq!(parse_hex_color("#gggggg"), None);
        assert_eq!(parse_hex_color("white"), None);
        assert_eq!(parse_hex_color(""), None);
    }

    #[test]
    fn dash_pattern_alternates() {
        let style = GuideStyle::default();
        assert!(style.is_inked(0));
        assert!(style.is_inked(9));
        assert!(!style.is_inked(10));
        assert!(!style.is_inked(19));
        assert!(style.is_inked(20));
    }

    #[test]
    fn zero_dash_or_gap_is_solid() {
        let solid = GuideStyle {
            dash: 0,
            ..GuideStyle::default()
        };
        assert!((0..50).all(|i| solid.is_inked(i)));
        let solid = GuideStyle {
            gap: 0,
            ..GuideStyle::default()
        };
        assert!((0..50).all(|i| solid.is_inked(i)));
    }
}
