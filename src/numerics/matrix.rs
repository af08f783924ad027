//! Small dense matrix for the closed-form match quality

use std::ops::{Add, Mul};

use crate::error::{Result, SkillError};

/// Pivots smaller than this are treated as zero.
const SINGULARITY_EPSILON: f64 = 1e-12;

#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    rows: usize,
    columns: usize,
    values: Vec<f64>,
}

impl Matrix {
    pub fn zeros(rows: usize, columns: usize) -> Self {
        Self {
            rows,
            columns,
            values: vec![0.0; rows * columns],
        }
    }

    pub fn diagonal(diagonal_values: &[f64]) -> Self {
        let mut matrix = Self::zeros(diagonal_values.len(), diagonal_values.len());
        for (i, value) in diagonal_values.iter().enumerate() {
            matrix.set(i, i, *value);
        }
        matrix
    }

    pub fn column_vector(values: &[f64]) -> Self {
        Self {
            rows: values.len(),
            columns: 1,
            values: values.to_vec(),
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn get(&self, row: usize, column: usize) -> f64 {
        self.values[row * self.columns + column]
    }

    pub fn set(&mut self, row: usize, column: usize, value: f64) {
        self.values[row * self.columns + column] = value;
    }

    pub fn transpose(&self) -> Self {
        let mut result = Self::zeros(self.columns, self.rows);
        for row in 0..self.rows {
            for column in 0..self.columns {
                result.set(column, row, self.get(row, column));
            }
        }
        result
    }

    pub fn scale(&self, factor: f64) -> Self {
        Self {
            rows: self.rows,
            columns: self.columns,
            values: self.values.iter().map(|v| v * factor).collect(),
        }
    }

    /// Determinant by Gaussian elimination with partial pivoting.
    pub fn determinant(&self) -> Result<f64> {
        self.require_square()?;

        let n = self.rows;
        let mut work = self.clone();
        let mut determinant = 1.0;

        for pivot_column in 0..n {
            let pivot_row = (pivot_column..n)
                .max_by(|&a, &b| {
                    work.get(a, pivot_column)
                        .abs()
                        .total_cmp(&work.get(b, pivot_column).abs())
                })
                .unwrap_or(pivot_column);

            let pivot = work.get(pivot_row, pivot_column);
            if pivot == 0.0 {
                return Ok(0.0);
            }

            if pivot_row != pivot_column {
                work.swap_rows(pivot_row, pivot_column);
                determinant = -determinant;
            }

            determinant *= pivot;

            for row in (pivot_column + 1)..n {
                let factor = work.get(row, pivot_column) / pivot;
                for column in pivot_column..n {
                    let value = work.get(row, column) - factor * work.get(pivot_column, column);
                    work.set(row, column, value);
                }
            }
        }

        Ok(determinant)
    }

    /// Inverse by Gauss-Jordan elimination.
    pub fn inverse(&self) -> Result<Self> {
        self.require_square()?;

        let n = self.rows;
        let mut work = self.clone();
        let mut inverse = Self::diagonal(&vec![1.0; n]);

        for pivot_column in 0..n {
            let pivot_row = (pivot_column..n)
                .max_by(|&a, &b| {
                    work.get(a, pivot_column)
                        .abs()
                        .total_cmp(&work.get(b, pivot_column).abs())
                })
                .unwrap_or(pivot_column);

            if work.get(pivot_row, pivot_column).abs() < SINGULARITY_EPSILON {
                return Err(SkillError::invalid_operation("matrix is singular"));
            }

            work.swap_rows(pivot_row, pivot_column);
            inverse.swap_rows(pivot_row, pivot_column);

            let pivot = work.get(pivot_column, pivot_column);
            for column in 0..n {
                work.set(pivot_column, column, work.get(pivot_column, column) / pivot);
                inverse.set(pivot_column, column, inverse.get(pivot_column, column) / pivot);
            }

            for row in 0..n {
                if row == pivot_column {
                    continue;
                }
                let factor = work.get(row, pivot_column);
                if factor == 0.0 {
                    continue;
                }
                for column in 0..n {
                    work.set(
                        row,
                        column,
                        work.get(row, column) - factor * work.get(pivot_column, column),
                    );
                    inverse.set(
                        row,
                        column,
                        inverse.get(row, column) - factor * inverse.get(pivot_column, column),
                    );
                }
            }
        }

        Ok(inverse)
    }

    fn swap_rows(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        for column in 0..self.columns {
            self.values.swap(a * self.columns + column, b * self.columns + column);
        }
    }

    fn require_square(&self) -> Result<()> {
        if self.rows != self.columns {
            return Err(SkillError::invalid_operation(format!(
                "expected a square matrix, got {}x{}",
                self.rows, self.columns
            )));
        }
        Ok(())
    }
}

impl Mul for &Matrix {
    type Output = Matrix;

    /// # Panics
    /// Panics if the inner dimensions differ.
    fn mul(self, rhs: &Matrix) -> Matrix {
        assert_eq!(
            self.columns, rhs.rows,
            "cannot multiply {}x{} by {}x{}",
            self.rows, self.columns, rhs.rows, rhs.columns
        );

        let mut result = Matrix::zeros(self.rows, rhs.columns);
        for row in 0..self.rows {
            for column in 0..rhs.columns {
                let sum = (0..self.columns)
                    .map(|k| self.get(row, k) * rhs.get(k, column))
                    .sum();
                result.set(row, column, sum);
            }
        }
        result
    }
}

impl Add for &Matrix {
    type Output = Matrix;

    /// # Panics
    /// Panics if the dimensions differ.
    fn add(self, rhs: &Matrix) -> Matrix {
        assert_eq!(
            (self.rows, self.columns),
            (rhs.rows, rhs.columns),
            "cannot add matrices of different sizes"
        );

        Matrix {
            rows: self.rows,
            columns: self.columns,
            values: self
                .values
                .iter()
                .zip(&rhs.values)
                .map(|(a, b)| a + b)
                .collect(),
        }
    }
}
