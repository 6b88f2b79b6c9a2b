// src/frame.rs

//! The frame buffer: one color per logical coordinate, plus the snapshot
//! type handed to render backends.

use crate::color::Color;
use crate::error::MatrixError;
use crate::layout::{CoordinateMapper, GridDimensions};

/// Grid of pixel colors addressed by logical `(row, col)`.
///
/// Storage is row-major and always fully populated. The dirty flag is set
/// whenever a write changes a pixel and cleared by `mark_clean` once the
/// frame has been presented.
#[derive(Debug, Clone)]
pub struct FrameBuffer {
    mapper: CoordinateMapper,
    pixels: Vec<Color>,
    dirty: bool,
}

impl FrameBuffer {
    pub fn new(mapper: CoordinateMapper) -> Self {
        FrameBuffer {
            mapper,
            pixels: vec![Color::BLACK; mapper.dimensions().len()],
            dirty: true,
        }
    }

    pub fn dimensions(&self) -> GridDimensions {
        self.mapper.dimensions()
    }

    pub fn get(&self, row: usize, col: usize) -> Result<Color, MatrixError> {
        let dims = self.dimensions();
        dims.check(row, col)?;
        Ok(self.pixels[dims.offset(row, col)])
    }

    pub fn set(&mut self, row: usize, col: usize, color: Color) -> Result<(), MatrixError> {
        let dims = self.dimensions();
        dims.check(row, col)?;
        let pixel = &mut self.pixels[dims.offset(row, col)];
        if *pixel != color {
            *pixel = color;
            self.dirty = true;
        }
        Ok(())
    }

    pub fn fill(&mut self, color: Color) {
        for pixel in self.pixels.iter_mut().filter(|p| **p != color) {
            *pixel = color;
            self.dirty = true;
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// Buffer contents in ascending physical-index order.
    pub fn snapshot(&self) -> Result<FrameSnapshot, MatrixError> {
        let dims = self.dimensions();
        let mut ordered = vec![Color::BLACK; dims.len()];
        for row in 0..dims.rows() {
            for col in 0..dims.cols() {
                let index = self.mapper.physical_index(row, col)?;
                ordered[index] = self.pixels[dims.offset(row, col)];
            }
        }
        Ok(FrameSnapshot {
            mapper: self.mapper,
            pixels: ordered.into_iter().enumerate().collect(),
        })
    }
}

/// An immutable copy of a frame in wire order, ready for a backend.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSnapshot {
    mapper: CoordinateMapper,
    pixels: Vec<(usize, Color)>,
}

impl FrameSnapshot {
    pub fn dimensions(&self) -> GridDimensions {
        self.mapper.dimensions()
    }

    /// `(physical_index, color)` pairs, ascending by index.
    pub fn pixels(&self) -> &[(usize, Color)] {
        &self.pixels
    }

    /// Colors of one logical row, left to right.
    pub fn logical_row(&self, row: usize) -> Result<Vec<Color>, MatrixError> {
        (0..self.dimensions().cols())
            .map(|col| {
                let index = self.mapper.physical_index(row, col)?;
                Ok(self.pixels[index].1)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests;
