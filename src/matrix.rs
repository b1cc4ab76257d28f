//! Dense 2D matrix of `f64` values with bounds-checked access.
use crate::error::{NetError, Result};
use rand::Rng;
use std::fmt;
use std::ops::{Index, IndexMut};

/// A dense row-major matrix with fixed dimensions.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Matrix {
    /// Create a zero-filled matrix. Both dimensions must be positive.
    pub fn new(rows: usize, cols: usize) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(NetError::config(format!(
                "matrix dimensions must be positive, got {}x{}",
                rows, cols
            )));
        }
        Ok(Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Checked read access.
    pub fn get(&self, row: usize, col: usize) -> Result<f64> {
        self.check_bounds(row, col)?;
        Ok(self.data[row * self.cols + col])
    }

    /// Checked mutable access.
    pub fn get_mut(&mut self, row: usize, col: usize) -> Result<&mut f64> {
        self.check_bounds(row, col)?;
        let cols = self.cols;
        Ok(&mut self.data[row * cols + col])
    }

    fn check_bounds(&self, row: usize, col: usize) -> Result<()> {
        if row >= self.rows || col >= self.cols {
            return Err(NetError::shape(format!(
                "index ({}, {}) out of bounds for {}x{} matrix",
                row, col, self.rows, self.cols
            )));
        }
        Ok(())
    }

    /// Overwrite every entry with an independent uniform draw from `[min, max)`.
    pub fn fill_random<R: Rng + ?Sized>(&mut self, rng: &mut R, min: f64, max: f64) {
        for v in &mut self.data {
            *v = rng.gen_range(min..max);
        }
    }

    /// Elementwise scalar multiply, returning a new matrix.
    pub fn scaled(&self, scalar: f64) -> Matrix {
        let mut out = self.clone();
        out.scale_in_place(scalar);
        out
    }

    /// Elementwise scalar multiply in place.
    pub fn scale_in_place(&mut self, scalar: f64) {
        for v in &mut self.data {
            *v *= scalar;
        }
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = f64;

    fn index(&self, (row, col): (usize, usize)) -> &f64 {
        assert!(
            row < self.rows && col < self.cols,
            "index ({}, {}) out of bounds for {}x{} matrix",
            row,
            col,
            self.rows,
            self.cols
        );
        &self.data[row * self.cols + col]
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut f64 {
        assert!(
            row < self.rows && col < self.cols,
            "index ({}, {}) out of bounds for {}x{} matrix",
            row,
            col,
            self.rows,
            self.cols
        );
        &mut self.data[row * self.cols + col]
    }
}

/// Row-major, space-separated diagnostic rendering.
impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.rows {
            for col in 0..self.cols {
                write!(f, "{} ", self.data[row * self.cols + col])?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
