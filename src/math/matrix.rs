use rand::Rng;
use serde::{Serialize, Deserialize};
use std::f64::consts::PI;
use std::ops::{Index, IndexMut};

use crate::error::{NnError, Result};

/// Dense row-major matrix.  Weights are stored `outputs × (inputs + 1)`, so a
/// row belongs to one output neuron and column 0 holds its bias.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matrix {
    pub rows: usize,
    pub cols: usize,
    pub data: Vec<Vec<f64>>,
}

impl Matrix {
    pub fn zeros(rows: usize, cols: usize) -> Matrix {
        Matrix::filled(rows, cols, 0.0)
    }

    pub fn filled(rows: usize, cols: usize, value: f64) -> Matrix {
        Matrix {
            rows,
            cols,
            data: vec![vec![value; cols]; rows],
        }
    }

    /// Builds a matrix from row vectors.  Every row must have the same length.
    pub fn from_data(data: Vec<Vec<f64>>) -> Result<Matrix> {
        let rows = data.len();
        let cols = data.first().map_or(0, Vec::len);
        for row in &data {
            if row.len() != cols {
                return Err(NnError::mismatch("matrix row length", cols, row.len()));
            }
        }
        Ok(Matrix { rows, cols, data })
    }

    /// Samples every cell from U(min, max).
    pub fn random_uniform<R: Rng + ?Sized>(
        rows: usize,
        cols: usize,
        min: f64,
        max: f64,
        rng: &mut R,
    ) -> Matrix {
        let mut res = Matrix::zeros(rows, cols);
        for row in res.data.iter_mut() {
            for cell in row.iter_mut() {
                *cell = min + (max - min) * rng.gen::<f64>();
            }
        }
        res
    }

    /// Samples a single value from N(0, 1) using the Box-Muller transform.
    fn sample_standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
        // u1, u2 in (0, 1] so ln never sees zero.
        let u1: f64 = 1.0 - rng.gen::<f64>();
        let u2: f64 = 1.0 - rng.gen::<f64>();
        (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
    }

    fn gaussian<R: Rng + ?Sized>(rows: usize, cols: usize, std_dev: f64, rng: &mut R) -> Matrix {
        let mut res = Matrix::zeros(rows, cols);
        for row in res.data.iter_mut() {
            for cell in row.iter_mut() {
                *cell = Matrix::sample_standard_normal(rng) * std_dev;
            }
        }
        res
    }

    /// He initialization: samples from N(0, sqrt(2 / cols)).
    ///
    /// Suited to ReLU layers.  `cols` is the fan-in, bias column included.
    pub fn he<R: Rng + ?Sized>(rows: usize, cols: usize, rng: &mut R) -> Matrix {
        Matrix::gaussian(rows, cols, (2.0 / cols as f64).sqrt(), rng)
    }

    /// Xavier (Glorot) initialization: samples from N(0, sqrt(1 / cols)).
    ///
    /// Suited to Sigmoid/Tanh/Identity layers.
    pub fn xavier<R: Rng + ?Sized>(rows: usize, cols: usize, rng: &mut R) -> Matrix {
        Matrix::gaussian(rows, cols, (1.0 / cols as f64).sqrt(), rng)
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn zero(&mut self) {
        self.fill(0.0);
    }

    pub fn fill(&mut self, value: f64) {
        for row in self.data.iter_mut() {
            row.iter_mut().for_each(|cell| *cell = value);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.data.iter().flat_map(|row| row.iter().copied())
    }

    /// Matrix-vector product `self · v`.
    pub fn mul_vec(&self, v: &[f64]) -> Result<Vec<f64>> {
        if v.len() != self.cols {
            return Err(NnError::mismatch("matrix-vector product", self.cols, v.len()));
        }
        Ok(self.data
            .iter()
            .map(|row| row.iter().zip(v).map(|(w, x)| w * x).sum())
            .collect())
    }

    /// `self -= scale · other`.
    pub fn sub_scaled(&mut self, other: &Matrix, scale: f64) -> Result<()> {
        self.check_shape("scaled subtraction", other)?;
        for (row, other_row) in self.data.iter_mut().zip(&other.data) {
            for (cell, o) in row.iter_mut().zip(other_row) {
                *cell -= scale * o;
            }
        }
        Ok(())
    }

    /// `self -= rates ⊙ other`, the element-wise (Hadamard) product.
    pub fn sub_hadamard(&mut self, rates: &Matrix, other: &Matrix) -> Result<()> {
        self.check_shape("element-wise subtraction", rates)?;
        self.check_shape("element-wise subtraction", other)?;
        for ((row, rate_row), other_row) in self.data.iter_mut().zip(&rates.data).zip(&other.data) {
            for ((cell, r), o) in row.iter_mut().zip(rate_row).zip(other_row) {
                *cell -= r * o;
            }
        }
        Ok(())
    }

    fn check_shape(&self, context: &'static str, other: &Matrix) -> Result<()> {
        if self.rows != other.rows {
            return Err(NnError::mismatch(context, self.rows, other.rows));
        }
        if self.cols != other.cols {
            return Err(NnError::mismatch(context, self.cols, other.cols));
        }
        Ok(())
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = f64;

    fn index(&self, (row, col): (usize, usize)) -> &f64 {
        &self.data[row][col]
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut f64 {
        &mut self.data[row][col]
    }
}
