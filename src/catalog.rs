//! Page sizes and photo standards.
//!
//! Everything is measured in pixels at 300 DPI. The built-in tables cover
//! the common photo-lab and office papers and the two ID photo sizes most
//! offices accept; `print-sheet.toml` can add more (see [`crate::config`]).
//!
//! Lookups never fail: an unknown key resolves to the configured default
//! (stock: `4x6_L` and `35x45`) and the result records that it fell back,
//! so a caller can warn without refusing to render.

use crate::config::{SheetConfig, SizeEntry};
use serde::Serialize;

/// A printable sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageSpec {
    pub key: String,
    pub label: String,
    pub width_px: u32,
    pub height_px: u32,
}

impl PageSpec {
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width_px, self.height_px)
    }
}

impl Default for PageSpec {
    /// The 4×6 landscape photo-lab sheet.
    fn default() -> Self {
        Self {
            key: "4x6_L".to_string(),
            label: "4x6 Inch (Landscape)".to_string(),
            width_px: 1800,
            height_px: 1200,
        }
    }
}

/// The physical size of one ID photo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhotoStandard {
    pub key: String,
    pub label: String,
    pub width_px: u32,
    pub height_px: u32,
}

impl PhotoStandard {
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width_px, self.height_px)
    }
}

impl Default for PhotoStandard {
    /// 35×45 mm, the most widely accepted passport size.
    fn default() -> Self {
        Self {
            key: "35x45".to_string(),
            label: "35x45mm (Universal)".to_string(),
            width_px: 413,
            height_px: 531,
        }
    }
}

/// `(key, width, height, label)`
const BUILTIN_PAGES: &[(&str, u32, u32, &str)] = &[
    ("4x6_L", 1800, 1200, "4x6 Inch (Landscape)"),
    ("4x6_P", 1200, 1800, "4x6 Inch (Portrait)"),
    ("5x7_L", 2100, 1500, "5x7 Inch (Landscape)"),
    ("A4_P", 2480, 3508, "A4 (Portrait)"),
    ("Letter_P", 2550, 3300, "US Letter (Portrait)"),
];

const BUILTIN_STANDARDS: &[(&str, u32, u32, &str)] = &[
    ("35x45", 413, 531, "35x45mm (Universal)"),
    ("2x2", 600, 600, "2x2 inch (US/India)"),
];

/// A catalog lookup, remembering whether the requested key was found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolved<T> {
    /// The key the caller asked for.
    pub requested: String,
    /// True when `requested` was unknown and the default was used instead.
    pub fell_back: bool,
    pub entry: T,
}

/// Page and standard tables for one configuration.
#[derive(Debug, Clone)]
pub struct Catalog {
    pages: Vec<PageSpec>,
    standards: Vec<PhotoStandard>,
    default_page: String,
    default_standard: String,
}

impl Catalog {
    /// Only the built-in entries, with stock defaults.
    pub fn builtin() -> Self {
        Self::from_config(&SheetConfig::default())
    }

    /// Built-ins in table order, then config entries sorted by key.
    /// A config entry with a built-in key replaces that entry in place.
    pub fn from_config(config: &SheetConfig) -> Self {
        let pages = merge_entries(BUILTIN_PAGES, &config.pages, |key, label, w, h| PageSpec {
            key,
            label,
            width_px: w,
            height_px: h,
        });
        let standards =
            merge_entries(BUILTIN_STANDARDS, &config.standards, |key, label, w, h| {
                PhotoStandard {
                    key,
                    label,
                    width_px: w,
                    height_px: h,
                }
            });

        Self {
            pages,
            standards,
            default_page: config.default_page.clone(),
            default_standard: config.default_standard.clone(),
        }
    }

    pub fn pages(&self) -> &[PageSpec] {
        &self.pages
    }

    pub fn standards(&self) -> &[PhotoStandard] {
        &self.standards
    }

    pub fn page(&self, key: &str) -> Option<&PageSpec> {
        self.pages.iter().find(|p| p.key == key)
    }

    pub fn standard(&self, key: &str) -> Option<&PhotoStandard> {
        self.standards.iter().find(|s| s.key == key)
    }

    /// Look up a page, falling back to the default page for unknown keys.
    pub fn resolve_page(&self, key: &str) -> Resolved<PageSpec> {
        match self.page(key) {
            Some(page) => Resolved {
                requested: key.to_string(),
                fell_back: false,
                entry: page.clone(),
            },
            None => Resolved {
                requested: key.to_string(),
                fell_back: true,
                entry: self.page(&self.default_page).cloned().unwrap_or_default(),
            },
        }
    }

    /// Look up a photo standard, falling back to the default for unknown keys.
    pub fn resolve_standard(&self, key: &str) -> Resolved<PhotoStandard> {
        match self.standard(key) {
            Some(standard) => Resolved {
                requested: key.to_string(),
                fell_back: false,
                entry: standard.clone(),
            },
            None => Resolved {
                requested: key.to_string(),
                fell_back: true,
                entry: self
                    .standard(&self.default_standard)
                    .cloned()
                    .unwrap_or_default(),
            },
        }
    }
}

fn merge_entries<T>(
    builtin: &[(&str, u32, u32, &str)],
    extra: &std::collections::BTreeMap<String, SizeEntry>,
    make: impl Fn(String, String, u32, u32) -> T,
) -> Vec<T> {
    let mut out: Vec<T> = builtin
        .iter()
        .map(|&(key, w, h, label)| match extra.get(key) {
            Some(entry) => make(
                key.to_string(),
                entry.label.clone().unwrap_or_else(|| label.to_string()),
                entry.width,
                entry.height,
            ),
            None => make(key.to_string(), label.to_string(), w, h),
        })
        .collect();

    for (key, entry) in extra {
        if builtin.iter().any(|(k, ..)| *k == key.as_str()) {
            continue;
        }
        out.push(make(
            key.clone(),
            entry.label.clone().unwrap_or_else(|| key.clone()),
            entry.width,
            entry.height,
        ));
    }

    out
}
