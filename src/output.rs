//! CLI output formatting for every command.
//!
//! # Information-First Display
//!
//! Each entity leads with its identity (catalog key, positional index, photo
//! name) and follows with indented context lines. Pixel figures are always
//! written `WxH`; positions as `(x, y)`.
//!
//! # Output Format
//!
//! ## List
//!
//! ```text
//! Pages
//!     4x6_L      1800x1200  4x6 Inch (Landscape)
//!     ...
//! Standards
//!     35x45      413x531    35x45mm (Universal)
//! ```
//!
//! ## Plan
//!
//! ```text
//! Page: 4x6_L 4x6 Inch (Landscape) 1800x1200
//! Standard: 35x45 35x45mm (Universal) 413x531
//!     Upright: 4 x 2 = 8
//!     Rotated: 3 x 2 = 6
//! Layout: 8 photos, upright, grid 1712x1082 at (44, 59)
//!     001 row 1 col 1 at (44, 59) 413x531
//!     ...
//! ```
//!
//! ## Batch
//!
//! ```text
//! Rendering 2 photos: 4x6_L / 35x45 (8 per sheet)
//!     Unknown page "Tabloid", used 4x6_L         (only after a fallback)
//!     001 anna.jpg → anna-4x6_L.jpg (rendered)
//!     002 ben.png: failed (Photo could not be decoded: ...)
//! Sheets: 1 written, 1 failed
//! Cache: 1 rendered
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::batch::{BatchEvent, BatchReport, SheetStatus};
use crate::catalog::{Catalog, Resolved};
use crate::imaging::GridFit;
use crate::sheet::{PrintSheet, SheetLayout};
use std::path::Path;

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

fn dims(w: u32, h: u32) -> String {
    format!("{}x{}", w, h)
}

fn fit_line(label: &str, fit: &GridFit) -> String {
    format!("    {}: {} x {} = {}", label, fit.cols, fit.rows, fit.count)
}

/// `key label WxH`, plus a note when the requested key was unknown.
fn resolved_line<T>(
    kind: &str,
    resolved: &Resolved<T>,
    key: &str,
    label: &str,
    size: (u32, u32),
) -> String {
    let mut line = format!("{}: {} {} {}", kind, key, label, dims(size.0, size.1));
    if resolved.fell_back {
        line.push_str(&format!(" (unknown key {:?}, using default)", resolved.requested));
    }
    line
}

fn photo_count(n: usize) -> String {
    if n == 1 {
        "1 photo".to_string()
    } else {
        format!("{} photos", n)
    }
}

// ============================================================================
// list
// ============================================================================

pub fn format_catalog(catalog: &Catalog) -> Vec<String> {
    let mut lines = vec!["Pages".to_string()];
    for page in catalog.pages() {
        lines.push(format!(
            "    {:<10} {:<10} {}",
            page.key,
            dims(page.width_px, page.height_px),
            page.label
        ));
    }
    lines.push("Standards".to_string());
    for standard in catalog.standards() {
        lines.push(format!(
            "    {:<10} {:<10} {}",
            standard.key,
            dims(standard.width_px, standard.height_px),
            standard.label
        ));
    }
    lines
}

pub fn print_catalog(catalog: &Catalog) {
    for line in format_catalog(catalog) {
        println!("{}", line);
    }
}

// ============================================================================
// plan
// ============================================================================

/// Format the grid decision and every cell placement.
pub fn format_plan(layout: &SheetLayout) -> Vec<String> {
    let page = &layout.page.entry;
    let standard = &layout.standard.entry;
    let mut lines = vec![
        resolved_line(
            "Page",
            &layout.page,
            &page.key,
            &page.label,
            page.dimensions(),
        ),
        resolved_line(
            "Standard",
            &layout.standard,
            &standard.key,
            &standard.label,
            standard.dimensions(),
        ),
        fit_line("Upright", &layout.upright),
        fit_line("Rotated", &layout.rotated),
    ];

    if layout.grid.count == 0 {
        lines.push("Layout: no photos fit, sheet will be blank".to_string());
        return lines;
    }

    lines.push(format!(
        "Layout: {}, {}, grid {} at ({}, {})",
        photo_count(layout.grid.count as usize),
        if layout.grid.rotated { "rotated" } else { "upright" },
        dims(layout.extent.0, layout.extent.1),
        layout.origin.0,
        layout.origin.1
    ));
    for (i, cell) in layout.cells.iter().enumerate() {
        lines.push(format!(
            "    {} row {} col {} at ({}, {}) {}",
            format_index(i + 1),
            cell.row + 1,
            cell.col + 1,
            cell.x,
            cell.y,
            dims(cell.width, cell.height)
        ));
    }
    lines
}

pub fn print_plan(layout: &SheetLayout) {
    for line in format_plan(layout) {
        println!("{}", line);
    }
}

// ============================================================================
// render
// ============================================================================

/// Format the result of rendering one sheet to `written`.
pub fn format_render(sheet: &PrintSheet, written: &Path) -> Vec<String> {
    let layout = &sheet.layout;
    let mut lines = vec![format!("Wrote {}", written.display())];
    lines.push(format!(
        "    {} on {} ({}), {}",
        photo_count(layout.grid.count as usize),
        layout.page.entry.key,
        layout.standard.entry.key,
        if layout.grid.rotated { "rotated" } else { "upright" }
    ));
    if layout.page.fell_back {
        lines.push(fallback_line("page", &layout.page.requested, &layout.page.entry.key));
    }
    if layout.standard.fell_back {
        lines.push(fallback_line(
            "standard",
            &layout.standard.requested,
            &layout.standard.entry.key,
        ));
    }
    lines
}

fn fallback_line(kind: &str, requested: &str, used: &str) -> String {
    format!("    Unknown {} {:?}, used {}", kind, requested, used)
}

pub fn print_render(sheet: &PrintSheet, written: &Path) {
    for line in format_render(sheet, written) {
        println!("{}", line);
    }
}

// ============================================================================
// batch
// ============================================================================

/// Format a single batch progress event as display lines.
pub fn format_batch_event(event: &BatchEvent) -> Vec<String> {
    match event {
        BatchEvent::Started {
            photo_count: count,
            page,
            standard,
            cells,
            unknown_page,
            unknown_standard,
        } => {
            let mut lines = vec![format!(
                "Rendering {}: {} / {} ({} per sheet)",
                photo_count(*count),
                page,
                standard,
                cells
            )];
            if let Some(requested) = unknown_page {
                lines.push(fallback_line("page", requested, page));
            }
            if let Some(requested) = unknown_standard {
                lines.push(fallback_line("standard", requested, standard));
            }
            lines
        }
        BatchEvent::SheetRendered {
            index,
            source,
            output,
            status,
        } => {
            let status = match status {
                SheetStatus::Cached => "cached",
                SheetStatus::Copied => "copied",
                SheetStatus::Rendered => "rendered",
            };
            vec![format!(
                "    {} {} \u{2192} {} ({})",
                format_index(*index),
                source,
                output,
                status
            )]
        }
        BatchEvent::SheetFailed {
            index,
            source,
            error,
        } => vec![format!(
            "    {} {}: failed ({})",
            format_index(*index),
            source,
            error
        )],
    }
}

/// Format the closing summary of a batch run.
pub fn format_batch_summary(report: &BatchReport) -> Vec<String> {
    let mut summary = format!("Sheets: {} written", report.sheets.len());
    if !report.failures.is_empty() {
        summary.push_str(&format!(", {} failed", report.failures.len()));
    }
    vec![summary, format!("Cache: {}", report.cache_stats)]
}

pub fn print_batch_summary(report: &BatchReport) {
    for line in format_batch_summary(report) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::{BatchFailure, BatchSheet};
    use crate::cache::CacheStats;
    use crate::config::SheetConfig;
    use crate::imaging::OutputFormat;
    use crate::sheet::plan_print_sheet;
    use std::path::PathBuf;

    #[test]
    fn format_index_pads_to_three() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
        assert_eq!(format_index(1000), "1000");
    }

    // =========================================================================
    // list
    // =========================================================================

    #[test]
    fn catalog_lists_pages_then_standards() {
        let lines = format_catalog(&Catalog::builtin());
        assert_eq!(lines[0], "Pages");
        assert_eq!(lines[1], "    4x6_L      1800x1200  4x6 Inch (Landscape)");
        assert_eq!(lines[6], "Standards");
        assert_eq!(lines[7], "    35x45      413x531    35x45mm (Universal)");
        assert_eq!(lines.len(), 9);
    }

    // =========================================================================
    // plan
    // =========================================================================

    #[test]
    fn plan_shows_both_candidates_and_cells() {
        let layout = plan_print_sheet(&SheetConfig::default(), "4x6_L", "35x45");
        let lines = format_plan(&layout);
        assert_eq!(lines[0], "Page: 4x6_L 4x6 Inch (Landscape) 1800x1200");
        assert_eq!(lines[1], "Standard: 35x45 35x45mm (Universal) 413x531");
        assert_eq!(lines[2], "    Upright: 4 x 2 = 8");
        assert_eq!(lines[3], "    Rotated: 3 x 2 = 6");
        assert_eq!(
            lines[4],
            "Layout: 8 photos, upright, grid 1712x1082 at (44, 59)"
        );
        assert_eq!(lines[5], "    001 row 1 col 1 at (44, 59) 413x531");
        assert_eq!(lines.len(), 13);
    }

    #[test]
    fn plan_notes_fallback() {
        let layout = plan_print_sheet(&SheetConfig::default(), "Tabloid", "35x45");
        let lines = format_plan(&layout);
        assert!(lines[0].ends_with("(unknown key \"Tabloid\", using default)"));
    }

    #[test]
    fn plan_with_no_fit_says_blank() {
        let mut config = SheetConfig::default();
        config.standards.insert(
            "huge".into(),
            crate::config::SizeEntry {
                width: 5000,
                height: 5000,
                label: None,
            },
        );
        let lines = format_plan(&plan_print_sheet(&config, "4x6_L", "huge"));
        assert_eq!(lines.last().unwrap(), "Layout: no photos fit, sheet will be blank");
    }

    // =========================================================================
    // render
    // =========================================================================

    #[test]
    fn render_summary_lines() {
        let sheet = PrintSheet {
            bytes: Vec::new(),
            format: OutputFormat::Jpeg,
            suggested_filename: "passport-print-4x6_L.jpg".into(),
            layout: plan_print_sheet(&SheetConfig::default(), "4x6_L", "nope"),
        };
        let lines = format_render(&sheet, Path::new("out/passport-print-4x6_L.jpg"));
        assert_eq!(lines[0], "Wrote out/passport-print-4x6_L.jpg");
        assert_eq!(lines[1], "    8 photos on 4x6_L (35x45), upright");
        assert_eq!(lines[2], "    Unknown standard \"nope\", used 35x45");
        assert_eq!(lines.len(), 3);
    }

    // =========================================================================
    // batch
    // =========================================================================

    #[test]
    fn batch_started_event() {
        let event = BatchEvent::Started {
            photo_count: 1,
            page: "4x6_L".into(),
            standard: "2x2".into(),
            cells: 2,
            unknown_page: None,
            unknown_standard: None,
        };
        assert_eq!(
            format_batch_event(&event),
            vec!["Rendering 1 photo: 4x6_L / 2x2 (2 per sheet)"]
        );
    }

    #[test]
    fn batch_started_event_warns_about_fallbacks() {
        let event = BatchEvent::Started {
            photo_count: 3,
            page: "4x6_L".into(),
            standard: "35x45".into(),
            cells: 8,
            unknown_page: Some("Tabloid".into()),
            unknown_standard: Some("visa".into()),
        };
        assert_eq!(
            format_batch_event(&event),
            vec![
                "Rendering 3 photos: 4x6_L / 35x45 (8 per sheet)",
                "    Unknown page \"Tabloid\", used 4x6_L",
                "    Unknown standard \"visa\", used 35x45",
            ]
        );
    }

    #[test]
    fn batch_sheet_events() {
        let ok = BatchEvent::SheetRendered {
            index: 3,
            source: "anna.jpg".into(),
            output: "anna-4x6_L.jpg".into(),
            status: SheetStatus::Cached,
        };
        assert_eq!(
            format_batch_event(&ok),
            vec!["    003 anna.jpg \u{2192} anna-4x6_L.jpg (cached)"]
        );

        let failed = BatchEvent::SheetFailed {
            index: 4,
            source: "ben.png".into(),
            error: "bad header".into(),
        };
        assert_eq!(
            format_batch_event(&failed),
            vec!["    004 ben.png: failed (bad header)"]
        );
    }

    #[test]
    fn batch_summary_counts_failures() {
        let report = BatchReport {
            layout: plan_print_sheet(&SheetConfig::default(), "4x6_L", "35x45"),
            sheets: vec![BatchSheet {
                source: PathBuf::from("a.jpg"),
                output: PathBuf::from("a-4x6_L.jpg"),
                status: SheetStatus::Rendered,
            }],
            failures: vec![BatchFailure {
                source: PathBuf::from("b.jpg"),
                error: "x".into(),
            }],
            cache_stats: CacheStats {
                hits: 0,
                copies: 0,
                misses: 1,
            },
        };
        assert_eq!(
            format_batch_summary(&report),
            vec!["Sheets: 1 written, 1 failed", "Cache: 1 rendered"]
        );
    }
}
