//! Pure layout calculations for print sheets.
//!
//! All functions here are pure and testable without any I/O or images:
//! grid fitting, orientation choice, centering, per-cell placement and the
//! coordinate transform each cell is drawn through.

use super::params::{GuideStyle, LayoutParams};
use serde::Serialize;

/// How many items fit on a page in one orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct GridFit {
    pub cols: u32,
    pub rows: u32,
    pub count: u32,
}

/// Count how many `item_w × item_h` items, separated by `gap`, fit inside
/// the page once `margin` is removed from every side.
///
/// `cols = ⌊(usable_w + gap) / (item_w + gap)⌋`, so `cols·(item_w + gap) ≤
/// usable_w + gap`, which rearranges to `cols·item_w + (cols − 1)·gap ≤
/// usable_w`. The same holds for rows. A usable span that goes negative
/// (margins wider than the page) fits nothing.
///
/// # Examples
/// ```
/// # use print_sheet::imaging::solve_grid;
/// // 413×531 photos on a 1800×1200 sheet, margin 25, gap 20
/// let fit = solve_grid(1800, 1200, 413, 531, 25, 20);
/// assert_eq!((fit.cols, fit.rows, fit.count), (4, 2, 8));
/// ```
pub fn solve_grid(
    page_w: u32,
    page_h: u32,
    item_w: u32,
    item_h: u32,
    margin: u32,
    gap: u32,
) -> GridFit {
    let cols = fit_along(page_w, item_w, margin, gap);
    let rows = fit_along(page_h, item_h, margin, gap);
    GridFit {
        cols,
        rows,
        count: cols.saturating_mul(rows),
    }
}

fn fit_along(span: u32, item: u32, margin: u32, gap: u32) -> u32 {
    let usable = i64::from(span) - 2 * i64::from(margin);
    if usable < 0 {
        return 0;
    }
    let step = i64::from(item) + i64::from(gap);
    if item == 0 || step == 0 {
        return 0;
    }
    ((usable + i64::from(gap)) / step) as u32
}

/// Total width (or height) of `n` cells of size `cell` separated by `gap`.
///
/// Zero when `n` is zero.
pub fn span_of(n: u32, cell: u32, gap: u32) -> u32 {
    if n == 0 {
        return 0;
    }
    n * cell + (n - 1) * gap
}

/// The chosen arrangement for one sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Grid {
    pub cols: u32,
    pub rows: u32,
    pub count: u32,
    /// Footprint of one cell on the page, after rotation.
    pub cell_width: u32,
    pub cell_height: u32,
    /// Whether each photo is drawn rotated 90° clockwise.
    pub rotated: bool,
}

impl Grid {
    /// Bounding box (width, height) of all cells including inner gaps.
    pub fn extent(&self, gap: u32) -> (u32, u32) {
        if self.count == 0 {
            return (0, 0);
        }
        (
            span_of(self.cols, self.cell_width, gap),
            span_of(self.rows, self.cell_height, gap),
        )
    }
}

/// Result of comparing both orientations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OrientationChoice {
    pub grid: Grid,
    pub upright: GridFit,
    pub rotated: GridFit,
}

/// Pick upright or rotated placement for `photo` on `page`.
///
/// Upright wins unless the rotated fit holds strictly more cells **and** the
/// upright count is below `layout.minimum_acceptable`. Ties go to upright,
/// and so does the case where nothing fits at all.
pub fn choose_orientation(
    page: (u32, u32),
    photo: (u32, u32),
    layout: &LayoutParams,
) -> OrientationChoice {
    let (page_w, page_h) = page;
    let (photo_w, photo_h) = photo;

    let upright = solve_grid(page_w, page_h, photo_w, photo_h, layout.margin, layout.gap);
    let rotated = solve_grid(page_w, page_h, photo_h, photo_w, layout.margin, layout.gap);

    let use_rotated = rotated.count > upright.count && upright.count < layout.minimum_acceptable;

    let grid = if use_rotated {
        Grid {
            cols: rotated.cols,
            rows: rotated.rows,
            count: rotated.count,
            cell_width: photo_h,
            cell_height: photo_w,
            rotated: true,
        }
    } else {
        Grid {
            cols: upright.cols,
            rows: upright.rows,
            count: upright.count,
            cell_width: photo_w,
            cell_height: photo_h,
            rotated: false,
        }
    };

    OrientationChoice {
        grid,
        upright,
        rotated,
    }
}

/// Top-left corner of a centered block of size `extent` on `page`.
///
/// Odd leftovers round down, so the block sits at most 1px left/up of true center.
pub fn centered_origin(page: (u32, u32), extent: (u32, u32)) -> (u32, u32) {
    (
        page.0.saturating_sub(extent.0) / 2,
        page.1.saturating_sub(extent.1) / 2,
    )
}

/// Where one cell lands on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CellPlacement {
    pub row: u32,
    pub col: u32,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub rotated: bool,
}

/// Lay out every cell of `grid`, centered on `page`, in row-major order.
pub fn cell_placements(page: (u32, u32), grid: &Grid, gap: u32) -> Vec<CellPlacement> {
    let (start_x, start_y) = centered_origin(page, grid.extent(gap));
    let mut cells = Vec::with_capacity(grid.count as usize);

    for row in 0..grid.rows {
        for col in 0..grid.cols {
            cells.push(CellPlacement {
                row,
                col,
                x: start_x + col * (grid.cell_width + gap),
                y: start_y + row * (grid.cell_height + gap),
                width: grid.cell_width,
                height: grid.cell_height,
                rotated: grid.rotated,
            });
        }
    }

    cells
}

/// Maps a pixel of the photo's native frame onto the page for one cell.
///
/// The photo is centered on the cell; when rotated, it is turned 90°
/// clockwise about that center, so the native `w × h` frame covers the
/// `h × w` cell footprint exactly. Built fresh per cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellTransform {
    origin_x: i64,
    origin_y: i64,
    native_h: u32,
    rotated: bool,
}

impl CellTransform {
    pub fn for_cell(cell: &CellPlacement, native: (u32, u32)) -> Self {
        Self {
            origin_x: i64::from(cell.x),
            origin_y: i64::from(cell.y),
            native_h: native.1,
            rotated: cell.rotated,
        }
    }

    /// Page coordinates of native pixel `(sx, sy)`.
    pub fn map(&self, sx: u32, sy: u32) -> (i64, i64) {
        if self.rotated {
            (
                self.origin_x + i64::from(self.native_h) - 1 - i64::from(sy),
                self.origin_y + i64::from(sx),
            )
        } else {
            (
                self.origin_x + i64::from(sx),
                self.origin_y + i64::from(sy),
            )
        }
    }
}

/// Native-frame pixels inked by the cut guide of a `w × h` photo.
///
/// The rectangle is traced clockwise from its top-left corner with the dash
/// pattern running continuously along the perimeter. Thicker strokes add
/// concentric rectangles inset by one pixel each.
pub fn guide_points(w: u32, h: u32, style: &GuideStyle) -> Vec<(u32, u32)> {
    let mut points = Vec::new();

    for inset in 0..style.width {
        if 2 * inset >= w || 2 * inset >= h {
            break;
        }
        let (x0, y0) = (inset, inset);
        let (x1, y1) = (w - 1 - inset, h - 1 - inset);

        let mut offset = 0u32;
        let mut visit = |x: u32, y: u32| {
            if style.is_inked(offset) {
                points.push((x, y));
            }
            offset += 1;
        };

        if x0 == x1 || y0 == y1 {
            // Degenerate one-pixel-wide ring: a straight line.
            for y in y0..=y1 {
                for x in x0..=x1 {
                    visit(x, y);
                }
            }
            continue;
        }

        for x in x0..=x1 {
            visit(x, y0);
        }
        for y in y0 + 1..=y1 {
            visit(x1, y);
        }
        for x in (x0..x1).rev() {
            visit(x, y1);
        }
        for y in (y0 + 1..y1).rev() {
            visit(x0, y);
        }
    }

    points
}
