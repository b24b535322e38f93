use std::ops::{Index, IndexMut};

/// Dense row-major `f32` matrix.
#[derive(Clone, Debug, PartialEq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    inner: Vec<f32>,
}

impl Index<(usize, usize)> for Matrix {
    type Output = f32;
    fn index(&self, (row, col): (usize, usize)) -> &Self::Output {
        &self.inner[row * self.cols + col]
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut Self::Output {
        &mut self.inner[row * self.cols + col]
    }
}

impl Matrix {
    pub fn zeroed(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            inner: vec![0.0; rows * cols],
        }
    }

    /// Wraps row-major data. Returns `None` when `data.len() != rows * cols`.
    pub fn from_raw(rows: usize, cols: usize, data: Vec<f32>) -> Option<Self> {
        if data.len() != rows * cols {
            return None;
        }

        Some(Self {
            rows,
            cols,
            inner: data,
        })
    }

    pub fn from_fn<F: FnMut(usize, usize) -> f32>(rows: usize, cols: usize, mut f: F) -> Self {
        let mut inner = Vec::with_capacity(rows * cols);

        for i in 0..rows {
            for j in 0..cols {
                inner.push(f(i, j));
            }
        }

        Self { rows, cols, inner }
    }

    /// Builds a matrix from equally sized rows.
    ///
    /// # Panics
    ///
    /// Panics if the rows have differing lengths.
    pub fn from_rows<R: AsRef<[f32]>>(rows: &[R]) -> Self {
        let cols = rows.first().map_or(0, |r| r.as_ref().len());
        let mut inner = Vec::with_capacity(rows.len() * cols);

        for row in rows {
            let row = row.as_ref();
            assert_eq!(row.len(), cols, "ragged rows");
            inner.extend_from_slice(row);
        }

        Self {
            rows: rows.len(),
            cols,
            inner,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.inner
    }

    pub fn row(&self, row: usize) -> &[f32] {
        &self.inner[row * self.cols..(row + 1) * self.cols]
    }

    pub fn column(&self, col: usize) -> Vec<f32> {
        (0..self.rows).map(|i| self[(i, col)]).collect()
    }

    /// Sum of squares down each column.
    pub fn column_sq_norms(&self) -> Vec<f32> {
        let mut norms = vec![0.0; self.cols];

        for i in 0..self.rows {
            for (norm, w) in norms.iter_mut().zip(self.row(i)) {
                *norm += w * w;
            }
        }

        norms
    }

    /// New matrix whose column `j` is column `order[j]` of `self`.
    pub fn select_columns(&self, order: &[usize]) -> Self {
        Self::from_fn(self.rows, order.len(), |i, j| self[(i, order[j])])
    }

    pub fn transpose(&self) -> Self {
        Self::from_fn(self.cols, self.rows, |i, j| self[(j, i)])
    }

    /// Matrix product `self · rhs`, or `None` when the inner dimensions differ.
    pub fn dot(&self, rhs: &Matrix) -> Option<Self> {
        if self.cols != rhs.rows {
            return None;
        }

        let mut result = Self::zeroed(self.rows, rhs.cols);

        for i in 0..self.rows {
            let out = &mut result.inner[i * rhs.cols..(i + 1) * rhs.cols];
            for (k, &a) in self.row(i).iter().enumerate() {
                for (o, &b) in out.iter_mut().zip(rhs.row(k)) {
                    *o += a * b;
                }
            }
        }

        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_access() {
        let m = Matrix::from_rows(&[[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]]);

        assert_eq!(m.shape(), (3, 2));
        assert_eq!(m.column(1), vec![2.0, 4.0, 6.0]);
        assert_eq!(m.column_sq_norms(), vec![35.0, 56.0]);
    }

    #[test]
    fn test_dot() {
        let a = Matrix::from_rows(&[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);
        let b = Matrix::from_rows(&[[7.0, 8.0], [9.0, 10.0], [11.0, 12.0]]);

        let c = a.dot(&b).unwrap();

        assert_eq!(c, Matrix::from_rows(&[[58.0, 64.0], [139.0, 154.0]]));
        assert!(a.dot(&a).is_none());
    }

    #[test]
    fn test_transpose() {
        let a = Matrix::from_rows(&[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);
        let t = a.transpose();

        assert_eq!(t.shape(), (3, 2));
        assert_eq!(t.row(2), &[3.0, 6.0]);
    }

    #[test]
    fn test_from_raw_rejects_bad_length() {
        assert!(Matrix::from_raw(2, 2, vec![0.0; 3]).is_none());
    }
}
