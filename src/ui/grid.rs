//! Thumbnail grid geometry.
//!
//! [`GridGeometry`] maps result indices to tile rectangles and back. Scrolling
//! is expressed as a row offset: the index of the first visible grid row.
//!
//! ```
//! use pixgrid::ui::grid::GridGeometry;
//! use ratatui::layout::Rect;
//!
//! let grid = GridGeometry::new(Rect::new(0, 3, 80, 24));
//! assert_eq!(grid.columns(), 3);
//! assert_eq!(grid.visible_range(0, 20), 0..6);
//! ```

use std::ops::Range;

use ratatui::layout::Rect;

/// Minimum tile width in columns, border included.
pub const TILE_MIN_WIDTH: u16 = 24;
/// Tile height in rows, border and caption included.
pub const TILE_HEIGHT: u16 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridGeometry {
    area: Rect,
    columns: usize,
    visible_rows: usize,
    tile_width: u16,
}

impl GridGeometry {
    pub fn new(area: Rect) -> Self {
        let columns = (area.width / TILE_MIN_WIDTH).max(1);
        let tile_width = (area.width / columns).max(1);
        let visible_rows = (area.height / TILE_HEIGHT).max(1);
        Self {
            area,
            columns: usize::from(columns),
            visible_rows: usize::from(visible_rows),
            tile_width,
        }
    }

    pub const fn area(&self) -> Rect {
        self.area
    }

    pub const fn columns(&self) -> usize {
        self.columns
    }

    /// Number of whole tile rows that fit (at least one).
    pub const fn visible_rows(&self) -> usize {
        self.visible_rows
    }

    /// Number of tiles that fit on one screen.
    pub const fn page_len(&self) -> usize {
        self.columns * self.visible_rows
    }

    /// Grid row holding `index`.
    pub const fn row_of(&self, index: usize) -> usize {
        index / self.columns
    }

    /// Total rows needed for `len` tiles.
    pub const fn rows_for(&self, len: usize) -> usize {
        len.div_ceil(self.columns)
    }

    /// Largest useful row offset for `len` tiles.
    pub const fn max_offset(&self, len: usize) -> usize {
        self.rows_for(len).saturating_sub(self.visible_rows)
    }

    /// Indices visible when scrolled to `offset`.
    pub fn visible_range(&self, offset: usize, len: usize) -> Range<usize> {
        let start = (offset * self.columns).min(len);
        let end = ((offset + self.visible_rows) * self.columns).min(len);
        start..end
    }

    /// Screen rectangle of tile `index` when scrolled to `offset`.
    pub fn tile_rect(&self, index: usize, offset: usize) -> Option<Rect> {
        let row = self.row_of(index).checked_sub(offset)?;
        if row >= self.visible_rows {
            return None;
        }
        let col = index % self.columns;
        let x = self.area.x + u16::try_from(col).ok()? * self.tile_width;
        let y = self.area.y + u16::try_from(row).ok()? * TILE_HEIGHT;
        let bottom = self.area.y + self.area.height;
        if y >= bottom {
            return None;
        }
        Some(Rect::new(
            x,
            y,
            self.tile_width.min(self.area.x + self.area.width - x),
            TILE_HEIGHT.min(bottom - y),
        ))
    }

    /// Tile under a screen cell, if any.
    pub fn tile_at(&self, column: u16, row: u16, offset: usize, len: usize) -> Option<usize> {
        if !self.contains(column, row) {
            return None;
        }
        let col = usize::from((column - self.area.x) / self.tile_width);
        let grid_row = usize::from((row - self.area.y) / TILE_HEIGHT);
        if col >= self.columns || grid_row >= self.visible_rows {
            return None;
        }
        let index = (offset + grid_row) * self.columns + col;
        (index < len).then_some(index)
    }

    /// Offset that keeps `index` on screen, moving as little as possible from `offset`.
    pub const fn offset_showing(&self, index: usize, offset: usize) -> usize {
        let row = self.row_of(index);
        if row < offset {
            row
        } else if row >= offset + self.visible_rows {
            row + 1 - self.visible_rows
        } else {
            offset
        }
    }

    pub const fn contains(&self, column: u16, row: u16) -> bool {
        column >= self.area.x
            && column < self.area.x + self.area.width
            && row >= self.area.y
            && row < self.area.y + self.area.height
    }
}
