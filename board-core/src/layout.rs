//! Grid geometry for widgets.
//!
//! All values are grid units: columns horizontally, rows vertically. Pixel
//! conversion happens when a board is rendered to a surface.

use serde::{Deserialize, Serialize};

use crate::WidgetId;

/// Rows addressable on a board. Row origins and heights are clamped so the
/// bottom edge never passes this limit.
pub const MAX_ROWS: u32 = 100_000;

/// Geometry for one widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayoutEntry {
    /// Widget this geometry belongs to.
    pub id: WidgetId,
    /// Column origin.
    pub x: u32,
    /// Row origin.
    pub y: u32,
    /// Width in columns.
    pub w: u32,
    /// Height in rows.
    pub h: u32,
    /// Smallest width a resize may produce.
    pub min_w: u32,
    /// Smallest height a resize may produce.
    pub min_h: u32,
}

/// Partial geometry update as requested by a position control.
///
/// Fields are signed so that out-of-range input can be clamped instead of
/// rejected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeometryPatch {
    /// New column origin.
    pub x: Option<i64>,
    /// New row origin.
    pub y: Option<i64>,
    /// New width.
    pub w: Option<i64>,
    /// New height.
    pub h: Option<i64>,
}

impl LayoutEntry {
    /// Right edge (exclusive), in columns.
    #[must_use]
    pub const fn right(&self) -> u32 {
        self.x.saturating_add(self.w)
    }

    /// Bottom edge (exclusive), in rows.
    #[must_use]
    pub const fn bottom(&self) -> u32 {
        self.y.saturating_add(self.h)
    }

    /// Whether this entry occupies any column in `[x, x + w)`.
    #[must_use]
    pub const fn overlaps_columns(&self, x: u32, w: u32) -> bool {
        self.x < x.saturating_add(w) && x < self.right()
    }

    /// Whether the geometry satisfies its bounds for `columns`.
    ///
    /// A minimum wider than the grid itself is satisfied by spanning the full
    /// grid.
    #[must_use]
    pub fn fits(&self, columns: u32) -> bool {
        self.w >= self.min_w.min(columns) && self.h >= self.min_h && self.right() <= columns
    }

    /// Apply a geometry patch, clamping every field into range.
    #[must_use]
    pub fn patched(&self, patch: GeometryPatch, columns: u32) -> Self {
        let columns = columns.max(1);
        let min_w = self.min_w.min(columns);
        let w = patch.w.map_or(self.w, to_u32).clamp(min_w, columns);
        let h = clamp_height(patch.h.map_or(self.h, to_u32), self.min_h);
        let x = patch.x.map_or(self.x, to_u32).min(columns - w);
        let y = patch.y.map_or(self.y, to_u32).min(MAX_ROWS - h);
        Self { x, y, w, h, ..*self }
    }

    /// Bring stored geometry into range for `columns`: minimums of at least
    /// one cell, `h >= min_h`, rows within [`MAX_ROWS`], then reprojection.
    #[must_use]
    pub fn normalized(&self, columns: u32) -> Self {
        let min_w = self.min_w.max(1);
        let min_h = self.min_h.clamp(1, MAX_ROWS);
        let h = clamp_height(self.h, min_h);
        let entry = Self {
            x: self.x.min(columns.max(1)),
            y: self.y.min(MAX_ROWS - h),
            w: self.w.max(1),
            h,
            min_w,
            min_h,
            ..*self
        };
        entry.reprojected(columns)
    }

    /// Reproject this entry onto a grid with `columns` columns.
    ///
    /// Width is given up before position: the entry first shrinks toward its
    /// minimum, and only moves left once the minimum is reached.
    #[must_use]
    pub fn reprojected(&self, columns: u32) -> Self {
        let columns = columns.max(1);
        if self.right() <= columns && self.w >= self.min_w.min(columns) {
            return *self;
        }
        let min_w = self.min_w.min(columns);
        let available = columns.saturating_sub(self.x);
        let (x, w) = if available >= min_w {
            (self.x, self.w.min(available).max(min_w))
        } else {
            (columns - min_w, min_w)
        };
        Self { x, w, ..*self }
    }
}

/// First free row below everything occupying the column span `[x, x + w)`.
#[must_use]
pub fn bottom_in_span(entries: &[LayoutEntry], x: u32, w: u32) -> u32 {
    entries
        .iter()
        .filter(|e| e.overlaps_columns(x, w))
        .map(LayoutEntry::bottom)
        .max()
        .unwrap_or(0)
}

/// First free row below every entry.
#[must_use]
pub fn bottom(entries: &[LayoutEntry]) -> u32 {
    entries.iter().map(LayoutEntry::bottom).max().unwrap_or(0)
}

fn clamp_height(h: u32, min_h: u32) -> u32 {
    h.max(min_h).min(MAX_ROWS)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_u32(value: i64) -> u32 {
    value.clamp(0, i64::from(u32::MAX)) as u32
}
