//! Sheet imaging: layout math plus pixel work on the `image` crate.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Fit + orientation** | pure integer math ([`solve_grid`], [`choose_orientation`]) |
//! | **Decode photo** | `image::load_from_memory` |
//! | **Compose sheet** | Lanczos3 scale + per-cell transform |
//! | **Encode sheet** | JPEG (quality 1-100) or PNG |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for grid and placement math (unit testable)
//! - **Parameters**: Data structures describing what to draw and encode
//! - **Backend**: [`SheetBackend`] trait + [`RustBackend`]

pub mod backend;
mod calculations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, SheetBackend};
pub use calculations::{
    CellPlacement, CellTransform, Grid, GridFit, OrientationChoice, cell_placements,
    centered_origin, choose_orientation, guide_points, solve_grid, span_of,
};
pub use params::{
    ComposeParams, EncodeParams, GuideStyle, LayoutParams, OutputFormat, Quality, RenderStyle,
    Rgb, parse_hex_color,
};
pub use rust_backend::{RustBackend, is_supported_photo, supported_input_extensions};
