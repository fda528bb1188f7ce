//! # Print Sheet
//!
//! Lays out passport and ID photos on printable sheets. One photo goes in,
//! along with a page size and a photo standard; a page-sized image comes
//! out, tiled with as many copies as fit, centered, each framed by a dashed
//! cut guide.
//!
//! # Architecture: Plan, Then Draw
//!
//! ```text
//! 1. Resolve   page key + standard key  →  catalog entries (fallback on unknown keys)
//! 2. Plan      entries + layout params  →  SheetLayout (grid, orientation, cells)
//! 3. Draw      photo bytes + layout     →  encoded sheet
//! ```
//!
//! Planning needs no image, so the CLI can show a layout (`plan`) without a
//! photo and tests can check every geometric property without pixels.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`sheet`] | The pipeline: [`generate_print_sheet`], [`plan_print_sheet`] |
//! | [`catalog`] | Built-in page sizes and photo standards, plus config-defined extras |
//! | [`imaging`] | Grid math, orientation choice, and the `image`-crate backend |
//! | [`config`] | `print-sheet.toml` loading, merging onto stock defaults, validation |
//! | [`batch`] | A sheet for every photo in a directory, in parallel |
//! | [`cache`] | Content-addressed manifest so unchanged batch sheets are not redrawn |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Integer Pixels at 300 DPI
//!
//! Every size in the catalog is a whole number of pixels at 300 DPI, and all
//! layout math is integer arithmetic. The same inputs always produce the same
//! grid and, with the same encoder, the same bytes.
//!
//! ## Upright Unless Clearly Better
//!
//! A rotated grid only wins when it fits strictly more photos *and* the
//! upright grid falls short of `layout.minimum_acceptable` (default 8).
//! People cut sheets by hand; a mix of orientations between runs would be
//! more confusing than the odd missing photo.
//!
//! ## Fallback Over Failure
//!
//! An unknown page or standard key is never an error. The default entry is
//! used and the result says so ([`catalog::Resolved::fell_back`]). A photo
//! that does not fit renders a blank, correctly sized page. Only a photo
//! that cannot be decoded fails, as [`sheet::SheetError::Decode`].

pub mod batch;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod imaging;
pub mod output;
pub mod sheet;

pub use sheet::{PrintSheet, SheetError, SheetLayout, generate_print_sheet, plan_print_sheet};

#[cfg(test)]
pub(crate) mod test_helpers;
