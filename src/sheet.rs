//! Print-sheet pipeline: resolve → plan → decode → compose → encode.
//!
//! [`generate_print_sheet`] is the one-call entry point: photo bytes and two
//! catalog keys in, an encoded sheet plus its placement metadata out. It is
//! a pure function of its inputs; callers re-run it whenever the page or
//! standard selection changes.
//!
//! Planning is split out as [`plan_print_sheet`] so the layout can be
//! inspected (or shown to a user) without an image.
//!
//! ## Failure modes
//!
//! | Situation | Result |
//! |---|---|
//! | Unknown page/standard key | Default entry, `fell_back = true` in [`SheetLayout`] |
//! | Photo larger than the page | Blank page-sized sheet, `grid.count == 0` |
//! | Photo bytes undecodable | [`SheetError::Decode`], never a blank sheet |

use crate::catalog::{Catalog, PageSpec, PhotoStandard, Resolved};
use crate::config::SheetConfig;
use crate::imaging::{
    BackendError, CellPlacement, ComposeParams, EncodeParams, Grid, GridFit, OutputFormat,
    Quality, RustBackend, SheetBackend, cell_placements, centered_origin, choose_orientation,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SheetError {
    #[error("Photo could not be decoded: {0}")]
    Decode(String),
    #[error("Sheet rendering failed: {0}")]
    Imaging(BackendError),
}

impl From<BackendError> for SheetError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Decode(msg) => SheetError::Decode(msg),
            other => SheetError::Imaging(other),
        }
    }
}

/// Everything decided about a sheet before any pixel is drawn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SheetLayout {
    pub page: Resolved<PageSpec>,
    pub standard: Resolved<PhotoStandard>,
    /// The chosen arrangement.
    pub grid: Grid,
    /// Both candidates, for display.
    pub upright: GridFit,
    pub rotated: GridFit,
    /// Gap between cells used for this layout.
    pub gap: u32,
    /// Top-left of the centered grid.
    pub origin: (u32, u32),
    /// Width and height of the grid including inner gaps.
    pub extent: (u32, u32),
    /// Cells in row-major order.
    pub cells: Vec<CellPlacement>,
}

/// A rendered, encoded sheet.
#[derive(Debug, Clone)]
pub struct PrintSheet {
    pub bytes: Vec<u8>,
    pub format: OutputFormat,
    /// e.g. `passport-print-4x6_L.jpg`
    pub suggested_filename: String,
    pub layout: SheetLayout,
}

/// Download name offered for a sheet.
pub fn suggested_filename(page_key: &str, format: OutputFormat) -> String {
    format!("passport-print-{}.{}", page_key, format.extension())
}

/// Resolve keys and compute the full placement for a sheet.
pub fn plan_print_sheet(config: &SheetConfig, page_key: &str, standard_key: &str) -> SheetLayout {
    let catalog = Catalog::from_config(config);
    let page = catalog.resolve_page(page_key);
    let standard = catalog.resolve_standard(standard_key);

    let page_dims = page.entry.dimensions();
    let choice = choose_orientation(page_dims, standard.entry.dimensions(), &config.layout);
    let gap = config.layout.gap;
    let cells = cell_placements(page_dims, &choice.grid, gap);
    let extent = choice.grid.extent(gap);
    let origin = centered_origin(page_dims, extent);

    SheetLayout {
        page,
        standard,
        grid: choice.grid,
        upright: choice.upright,
        rotated: choice.rotated,
        gap,
        origin,
        extent,
        cells,
    }
}

/// Render a sheet with the stock configuration and the `image` backend.
pub fn generate_print_sheet(
    photo: &[u8],
    page_key: &str,
    standard_key: &str,
) -> Result<PrintSheet, SheetError> {
    generate_print_sheet_with(
        &RustBackend::new(),
        &SheetConfig::default(),
        photo,
        page_key,
        standard_key,
    )
}

/// Render a sheet with an explicit backend and configuration.
pub fn generate_print_sheet_with(
    backend: &impl SheetBackend,
    config: &SheetConfig,
    photo: &[u8],
    page_key: &str,
    standard_key: &str,
) -> Result<PrintSheet, SheetError> {
    let layout = plan_print_sheet(config, page_key, standard_key);

    let decoded = backend.decode(photo)?;

    let compose = ComposeParams {
        page: layout.page.entry.dimensions(),
        native: layout.standard.entry.dimensions(),
        placements: layout.cells.clone(),
        style: config.render_style(),
    };
    let canvas = backend.compose(&compose, &decoded)?;

    let encode = EncodeParams {
        format: config.output.format,
        quality: Quality::new(config.output.quality),
    };
    let bytes = backend.encode(&canvas, &encode)?;

    Ok(PrintSheet {
        bytes,
        format: encode.format,
        suggested_filename: suggested_filename(&layout.page.entry.key, encode.format),
        layout,
    })
}
