//! Grid storage: column-major cell array, borrowed views, obstacle mask.
//!
//! Cells are stored column-major (`index = x * rows + y`) so that a
//! contiguous range of columns is a contiguous memory band; the engine
//! partitions work by columns and hands each worker one band.

use std::ops::Range;

use crate::cell::Cell;

/// Owned rectangular grid of cells.
#[derive(Clone, Debug, PartialEq)]
pub struct Lattice {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
}

impl Lattice {
    /// All-zero lattice of the given shape.
    pub fn new(rows: usize, cols: usize) -> Self {
        assert!(rows > 0 && cols > 0, "lattice must have at least one cell");
        Self {
            rows,
            cols,
            cells: vec![Cell::default(); rows * cols],
        }
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    fn idx(&self, x: usize, y: usize) -> usize {
        debug_assert!(x < self.cols && y < self.rows);
        x * self.rows + y
    }

    #[inline]
    pub fn cell(&self, x: usize, y: usize) -> &Cell {
        &self.cells[self.idx(x, y)]
    }

    #[inline]
    pub fn cell_mut(&mut self, x: usize, y: usize) -> &mut Cell {
        let i = self.idx(x, y);
        &mut self.cells[i]
    }

    /// One column as a contiguous slice.
    pub fn column(&self, x: usize) -> &[Cell] {
        &self.cells[x * self.rows..(x + 1) * self.rows]
    }

    /// Flat column-major cell storage.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Consume the lattice, keeping its storage.
    pub fn into_cells(self) -> Vec<Cell> {
        self.cells
    }

    /// Borrowed read view of the whole grid.
    pub fn as_ref(&self) -> LatticeRef<'_> {
        LatticeRef::new(self.rows, self.cols, &self.cells)
    }

    /// Mutable view of one contiguous column range.
    pub fn band_mut(&mut self, cols: Range<usize>) -> ColumnBand<'_> {
        assert!(cols.start <= cols.end && cols.end <= self.cols);
        let rows = self.rows;
        let cells = &mut self.cells[cols.start * rows..cols.end * rows];
        ColumnBand::new(cols.start, rows, cells)
    }

    /// Split the grid into disjoint mutable column bands.
    ///
    /// `ranges` must be sorted, contiguous and cover `[0, cols)`, the shape
    /// the engine's column partition produces. Empty ranges are allowed.
    pub fn bands_mut(&mut self, ranges: &[Range<usize>]) -> Vec<ColumnBand<'_>> {
        let rows = self.rows;
        let mut bands = Vec::with_capacity(ranges.len());
        let mut rest: &mut [Cell] = &mut self.cells;
        let mut next_col = 0;
        for r in ranges {
            assert_eq!(r.start, next_col, "ranges must be contiguous");
            assert!(r.end <= self.cols);
            let (band, tail) = std::mem::take(&mut rest).split_at_mut((r.end - r.start) * rows);
            bands.push(ColumnBand::new(r.start, rows, band));
            rest = tail;
            next_col = r.end;
        }
        assert_eq!(next_col, self.cols, "ranges must cover every column");
        bands
    }

    /// Total mass on the grid.
    pub fn total_density(&self) -> f64 {
        self.cells.iter().map(Cell::density).sum()
    }

    /// Largest velocity magnitude on the grid.
    pub fn max_speed(&self) -> f64 {
        self.cells.iter().map(Cell::speed).fold(0.0, f64::max)
    }
}

/// Borrowed read-only view of a lattice.
///
/// The step kernel and the result extractor read through this view; the
/// engine also builds it over its shared buffers.
#[derive(Clone, Copy)]
pub struct LatticeRef<'a> {
    rows: usize,
    cols: usize,
    cells: &'a [Cell],
}

impl<'a> LatticeRef<'a> {
    pub fn new(rows: usize, cols: usize, cells: &'a [Cell]) -> Self {
        assert_eq!(cells.len(), rows * cols);
        Self { rows, cols, cells }
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn cell(&self, x: usize, y: usize) -> &'a Cell {
        debug_assert!(x < self.cols && y < self.rows);
        &self.cells[x * self.rows + y]
    }
}

/// Mutable view of a contiguous column range, addressed by global column.
pub struct ColumnBand<'a> {
    first_col: usize,
    rows: usize,
    cells: &'a mut [Cell],
}

impl<'a> ColumnBand<'a> {
    pub fn new(first_col: usize, rows: usize, cells: &'a mut [Cell]) -> Self {
        assert!(rows > 0);
        assert_eq!(cells.len() % rows, 0);
        Self {
            first_col,
            rows,
            cells,
        }
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Global column range this band covers.
    pub fn cols(&self) -> Range<usize> {
        self.first_col..self.first_col + self.cells.len() / self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[inline]
    pub fn cell_mut(&mut self, x: usize, y: usize) -> &mut Cell {
        debug_assert!(self.cols().contains(&x) && y < self.rows);
        &mut self.cells[(x - self.first_col) * self.rows + y]
    }

    /// One column as a contiguous mutable slice.
    pub fn column_mut(&mut self, x: usize) -> &mut [Cell] {
        debug_assert!(self.cols().contains(&x));
        let start = (x - self.first_col) * self.rows;
        &mut self.cells[start..start + self.rows]
    }
}

/// Solid-site bitmap, same shape as the lattice, fixed for a run.
#[derive(Clone, Debug, PartialEq)]
pub struct ObstacleMask {
    rows: usize,
    cols: usize,
    solid: Vec<bool>,
}

impl ObstacleMask {
    /// Fully open (no obstacle) domain.
    pub fn open(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            solid: vec![false; rows * cols],
        }
    }

    /// Build from a predicate over `(x, y)` = (column, row).
    pub fn from_fn(rows: usize, cols: usize, mut is_solid: impl FnMut(usize, usize) -> bool) -> Self {
        let mut mask = Self::open(rows, cols);
        for x in 0..cols {
            for y in 0..rows {
                mask.solid[x * rows + y] = is_solid(x, y);
            }
        }
        mask
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn solid(&self, x: usize, y: usize) -> bool {
        debug_assert!(x < self.cols && y < self.rows);
        self.solid[x * self.rows + y]
    }

    /// Number of solid sites.
    pub fn solid_cells(&self) -> usize {
        self.solid.iter().filter(|&&s| s).count()
    }
}
