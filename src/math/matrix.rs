use rand::Rng;
use serde::{Serialize, Deserialize};
use std::ops::{Add, Sub, Mul};

/// Dense row-major matrix. A batch of samples is stored one sample per row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matrix {
    pub rows: usize,
    pub cols: usize,
    pub data: Vec<Vec<f64>>,
}

impl Matrix {
    pub fn zeros(rows: usize, cols: usize) -> Matrix {
        Matrix {
            rows,
            cols,
            data: vec![vec![0.0; cols]; rows],
        }
    }

    /// Samples every entry uniformly from `[-limit, limit)`.
    pub fn uniform<R: Rng>(rows: usize, cols: usize, limit: f64, rng: &mut R) -> Matrix {
        let mut res = Matrix::zeros(rows, cols);
        if limit <= 0.0 {
            return res;
        }
        for row in res.data.iter_mut() {
            for value in row.iter_mut() {
                *value = rng.gen_range(-limit..limit);
            }
        }
        res
    }

    /// Builds a `rows x cols` matrix from a flat row-major slice.
    ///
    /// The caller guarantees `flat.len() == rows * cols`.
    pub fn from_flat(rows: usize, cols: usize, flat: &[f64]) -> Matrix {
        debug_assert_eq!(flat.len(), rows * cols);
        let data = if cols == 0 {
            vec![Vec::new(); rows]
        } else {
            flat.chunks(cols).map(|row| row.to_vec()).collect()
        };
        Matrix { rows, cols, data }
    }

    pub fn from_data(data: Vec<Vec<f64>>) -> Matrix {
        let cols = data.first().map_or(0, |row| row.len());
        Matrix {
            rows: data.len(),
            cols,
            data,
        }
    }

    /// Row-major flattening, the inverse of `from_flat`.
    pub fn to_flat(&self) -> Vec<f64> {
        self.data.iter().flatten().copied().collect()
    }

    pub fn transpose(&self) -> Matrix {
        let mut res = Matrix::zeros(self.cols, self.rows);
        for (i, row) in self.data.iter().enumerate() {
            for (j, value) in row.iter().enumerate() {
                res.data[j][i] = *value;
            }
        }
        res
    }

    pub fn map<F>(&self, functor: F) -> Matrix
    where
        F: Fn(f64) -> f64,
    {
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self
                .data
                .iter()
                .map(|row| row.iter().map(|&x| functor(x)).collect())
                .collect(),
        }
    }

    /// Element-wise (Hadamard) product of two same-shape matrices.
    pub fn hadamard(&self, rhs: &Matrix) -> Matrix {
        self.zip_with(rhs, |a, b| a * b)
    }

    /// Adds the single row `row` to every row of `self`.
    pub fn add_row(&self, row: &Matrix) -> Matrix {
        assert_eq!(row.rows, 1, "broadcast operand must be a single row");
        assert_eq!(row.cols, self.cols, "broadcast operand has the wrong width");
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self
                .data
                .iter()
                .map(|r| r.iter().zip(row.data[0].iter()).map(|(a, b)| a + b).collect())
                .collect(),
        }
    }

    /// Column sums as a single row.
    pub fn sum_rows(&self) -> Matrix {
        let mut res = Matrix::zeros(1, self.cols);
        for row in &self.data {
            for (acc, value) in res.data[0].iter_mut().zip(row.iter()) {
                *acc += value;
            }
        }
        res
    }

    pub fn sum(&self) -> f64 {
        self.data.iter().flatten().sum()
    }

    fn zip_with<F>(&self, rhs: &Matrix, functor: F) -> Matrix
    where
        F: Fn(f64, f64) -> f64,
    {
        assert!(
            self.rows == rhs.rows && self.cols == rhs.cols,
            "Matrices are of incorrect sizes"
        );
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self
                .data
                .iter()
                .zip(rhs.data.iter())
                .map(|(a, b)| a.iter().zip(b.iter()).map(|(&x, &y)| functor(x, y)).collect())
                .collect(),
        }
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Matrix { rows: 0, cols: 0, data: vec![] }
    }
}

impl Add for &Matrix {
    type Output = Matrix;

    fn add(self, rhs: &Matrix) -> Matrix {
        self.zip_with(rhs, |a, b| a + b)
    }
}

impl Sub for &Matrix {
    type Output = Matrix;

    fn sub(self, rhs: &Matrix) -> Matrix {
        self.zip_with(rhs, |a, b| a - b)
    }
}

impl Mul for &Matrix {
    type Output = Matrix;

    fn mul(self, rhs: &Matrix) -> Matrix {
        assert_eq!(self.cols, rhs.rows, "Matrices are of incorrect sizes");

        let mut res = Matrix::zeros(self.rows, rhs.cols);
        for (i, row) in self.data.iter().enumerate() {
            for (k, &lhs) in row.iter().enumerate() {
                for (out, &r) in res.data[i].iter_mut().zip(rhs.data[k].iter()) {
                    *out += lhs * r;
                }
            }
        }
        res
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn multiply_propagates_non_finite_values_through_zeros() {
        let a = Matrix::from_data(vec![vec![0.0, 1.0]]);
        let b = Matrix::from_data(vec![vec![f64::INFINITY], vec![2.0]]);
        assert!((&a * &b).data[0][0].is_nan());
    }

    #[test]
    fn multiply_matches_hand_computation() {
        let a = Matrix::from_data(vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
        let b = Matrix::from_data(vec![vec![5.0], vec![6.0]]);
        let c = &a * &b;
        assert_eq!(c, Matrix::from_data(vec![vec![17.0], vec![39.0]]));
    }

    #[test]
    fn flat_layout_is_row_major() {
        let m = Matrix::from_flat(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(m.data[1], vec![4.0, 5.0, 6.0]);
        assert_eq!(m.transpose().data[0], vec![1.0, 4.0]);
        assert_eq!(m.to_flat(), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn broadcast_and_column_sums() {
        let m = Matrix::from_data(vec![vec![1.0, 1.0], vec![2.0, 3.0]]);
        let bias = Matrix::from_data(vec![vec![0.5, -1.0]]);
        assert_eq!(m.add_row(&bias).data, vec![vec![1.5, 0.0], vec![2.5, 2.0]]);
        assert_eq!(m.sum_rows().data, vec![vec![3.0, 4.0]]);
        assert_eq!(m.sum(), 7.0);
    }

    #[test]
    fn uniform_respects_limit_and_seed() {
        let a = Matrix::uniform(4, 5, 0.3, &mut StdRng::seed_from_u64(7));
        let b = Matrix::uniform(4, 5, 0.3, &mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
        assert!(a.data.iter().flatten().all(|x| x.abs() <= 0.3));
    }

    #[test]
    #[should_panic(expected = "incorrect sizes")]
    fn mismatched_add_panics() {
        let _ = &Matrix::zeros(1, 2) + &Matrix::zeros(2, 1);
    }
}
