// src/layout.rs

//! Maps logical grid coordinates onto the wiring order of an LED strip.
//!
//! A matrix is usually built from one long strip folded into rows (or
//! columns). With serpentine wiring every other strip segment runs in the
//! opposite direction, so the physical index of a pixel depends on the
//! parity of its row. `CoordinateMapper` owns nothing but the grid
//! dimensions and the wiring description; every lookup is a pure function.

use crate::error::MatrixError;
use serde::{Deserialize, Serialize};

/// Immutable grid size, both sides at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridDimensions {
    rows: usize,
    cols: usize,
}

impl GridDimensions {
    pub fn new(rows: usize, cols: usize) -> Result<Self, MatrixError> {
        if rows == 0 {
            return Err(MatrixError::out_of_range("row count", rows, 1));
        }
        if cols == 0 {
            return Err(MatrixError::out_of_range("column count", cols, 1));
        }
        rows.checked_mul(cols)
            .ok_or_else(|| MatrixError::out_of_range("pixel count", rows, usize::MAX / cols))?;
        Ok(GridDimensions { rows, cols })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn len(&self) -> usize {
        self.rows * self.cols
    }

    pub fn check(&self, row: usize, col: usize) -> Result<(), MatrixError> {
        if row >= self.rows {
            return Err(MatrixError::out_of_range("row", row, self.rows));
        }
        if col >= self.cols {
            return Err(MatrixError::out_of_range("column", col, self.cols));
        }
        Ok(())
    }

    /// Row-major offset of an already checked coordinate.
    pub(crate) fn offset(&self, row: usize, col: usize) -> usize {
        row * self.cols + col
    }
}

/// Direction the strip segments run in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StripOrientation {
    /// Segments run across each row.
    #[default]
    Rows,
    /// Segments run down each column.
    Columns,
}

/// Corner holding the first LED of the strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    /// Top-left: the first row starts on the left.
    #[default]
    NorthWest,
    /// Top-right: the first row starts on the right.
    NorthEast,
}

/// How the strip is laid across the matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Wiring {
    pub orientation: StripOrientation,
    /// Alternate segments reverse direction.
    pub serpentine: bool,
    pub origin: Origin,
}

impl Default for Wiring {
    fn default() -> Self {
        Wiring {
            orientation: StripOrientation::Rows,
            serpentine: true,
            origin: Origin::NorthWest,
        }
    }
}

impl Wiring {
    /// Serpentine row wiring; `starts_left` puts the first LED top-left.
    pub fn serpentine_rows(starts_left: bool) -> Self {
        Wiring {
            orientation: StripOrientation::Rows,
            serpentine: true,
            origin: if starts_left {
                Origin::NorthWest
            } else {
                Origin::NorthEast
            },
        }
    }
}

/// Converts between logical `(row, col)` and physical strip indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinateMapper {
    dims: GridDimensions,
    wiring: Wiring,
}

impl CoordinateMapper {
    pub fn new(dims: GridDimensions, wiring: Wiring) -> Self {
        CoordinateMapper { dims, wiring }
    }

    pub fn dimensions(&self) -> GridDimensions {
        self.dims
    }

    pub fn physical_index(&self, row: usize, col: usize) -> Result<usize, MatrixError> {
        self.dims.check(row, col)?;
        let (rows, cols) = (self.dims.rows, self.dims.cols);
        let index = match self.wiring.orientation {
            StripOrientation::Rows => {
                let base = row * cols;
                if self.segment_reversed(row, self.wiring.origin == Origin::NorthEast) {
                    base + (cols - 1 - col)
                } else {
                    base + col
                }
            }
            StripOrientation::Columns => {
                let strip = self.column_strip(col);
                let base = strip * rows;
                if self.segment_reversed(strip, false) {
                    base + (rows - 1 - row)
                } else {
                    base + row
                }
            }
        };
        Ok(index)
    }

    /// Inverse of `physical_index`.
    pub fn logical_coords(&self, index: usize) -> Result<(usize, usize), MatrixError> {
        if index >= self.dims.len() {
            return Err(MatrixError::out_of_range("physical index", index, self.dims.len()));
        }
        let (rows, cols) = (self.dims.rows, self.dims.cols);
        let coords = match self.wiring.orientation {
            StripOrientation::Rows => {
                let row = index / cols;
                let offset = index % cols;
                if self.segment_reversed(row, self.wiring.origin == Origin::NorthEast) {
                    (row, cols - 1 - offset)
                } else {
                    (row, offset)
                }
            }
            StripOrientation::Columns => {
                let strip = index / rows;
                let offset = index % rows;
                // column_strip is its own inverse
                let col = self.column_strip(strip);
                if self.segment_reversed(strip, false) {
                    (rows - 1 - offset, col)
                } else {
                    (offset, col)
                }
            }
        };
        Ok(coords)
    }

    fn segment_reversed(&self, segment: usize, starts_reversed: bool) -> bool {
        let flipped = self.wiring.serpentine && segment % 2 == 1;
        starts_reversed != flipped
    }

    fn column_strip(&self, col: usize) -> usize {
        match self.wiring.origin {
            Origin::NorthWest => col,
            Origin::NorthEast => self.dims.cols - 1 - col,
        }
    }
}
