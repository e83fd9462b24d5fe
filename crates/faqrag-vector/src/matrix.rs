use serde::{Deserialize, Serialize};

use faqrag_core::error::{Error, Result};

/// Norms below this are treated as this value when normalizing rows.
pub const NORM_EPS: f32 = 1e-12;

/// Dense row-major `f32` matrix.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f32>,
}

impl Matrix {
    /// Build from a rank-2 batch: at least one row, every row the same
    /// non-zero width, all values finite.
    pub fn from_rows(rows: &[Vec<f32>]) -> Result<Self> {
        let Some(first) = rows.first() else {
            return Err(Error::Validation("embeddings are empty (no rows)".to_string()));
        };
        let cols = first.len();
        if cols == 0 {
            return Err(Error::Validation("embeddings have zero width".to_string()));
        }
        let mut data = Vec::with_capacity(rows.len() * cols);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != cols {
                return Err(Error::Validation(format!(
                    "embeddings must be rank-2: row {i} has width {} but row 0 has {cols}",
                    row.len()
                )));
            }
            if row.iter().any(|x| !x.is_finite()) {
                return Err(Error::Validation(format!("embedding row {i} has a non-finite value")));
            }
            data.extend_from_slice(row);
        }
        Ok(Self { rows: rows.len(), cols, data })
    }

    pub fn rows(&self) -> usize { self.rows }

    pub fn cols(&self) -> usize { self.cols }

    pub fn row(&self, i: usize) -> &[f32] { &self.data[i * self.cols..(i + 1) * self.cols] }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[f32]> {
        // chunks_exact panics on 0; an empty matrix has no rows anyway
        self.data.chunks_exact(self.cols.max(1))
    }

    /// Stack `other` below `self`. Widths must already agree.
    pub(crate) fn append(&mut self, other: Matrix) {
        if self.rows == 0 {
            *self = other;
            return;
        }
        debug_assert_eq!(self.cols, other.cols);
        self.rows += other.rows;
        self.data.extend(other.data);
    }

    /// Every row divided by `max(norm, NORM_EPS)`.
    pub fn normalized_rows(&self) -> Matrix {
        let mut data = self.data.clone();
        for row in data.chunks_exact_mut(self.cols.max(1)) {
            normalize_row(row);
        }
        Matrix { rows: self.rows, cols: self.cols, data }
    }

    /// Cross-check the persisted shape against the payload.
    pub(crate) fn check_shape(&self) -> Result<()> {
        if self.rows == 0 || self.cols == 0 {
            return Err(Error::Consistency(format!("embedding matrix has shape ({}, {})", self.rows, self.cols)));
        }
        if self.rows.checked_mul(self.cols) != Some(self.data.len()) {
            return Err(Error::Consistency(format!(
                "embedding matrix declares ({}, {}) but holds {} values",
                self.rows,
                self.cols,
                self.data.len()
            )));
        }
        if self.data.iter().any(|x| !x.is_finite()) {
            return Err(Error::Consistency("embedding matrix has a non-finite value".to_string()));
        }
        Ok(())
    }
}

/// L2-normalize in place, accumulating in f64 so large raw values do not
/// overflow the norm.
pub fn normalize_row(row: &mut [f32]) {
    let norm = row.iter().map(|&x| f64::from(x).powi(2)).sum::<f64>().sqrt().max(f64::from(NORM_EPS));
    for x in row.iter_mut() {
        *x = (f64::from(*x) / norm) as f32;
    }
}

pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}
