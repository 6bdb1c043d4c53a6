use crate::math::matrix::Matrix;

/// Sum-of-squared-error cost over a whole batch.
pub struct SseLoss;

impl SseLoss {
    /// Scalar cost: Σ (predicted - expected)² over every sample and output.
    pub fn loss(predicted: &Matrix, expected: &Matrix) -> f64 {
        (predicted - expected).map(|d| d * d).sum()
    }

    /// Per-output gradient ∂C/∂a: 2(predicted - expected).
    pub fn derivative(predicted: &Matrix, expected: &Matrix) -> Matrix {
        (predicted - expected).map(|d| 2.0 * d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sums_squares_across_samples() {
        let predicted = Matrix::from_data(vec![vec![0.5, 1.0], vec![0.0, 0.25]]);
        let expected = Matrix::from_data(vec![vec![0.0, 1.0], vec![1.0, 0.0]]);
        assert_eq!(SseLoss::loss(&predicted, &expected), 0.25 + 1.0 + 0.0625);
        assert_eq!(
            SseLoss::derivative(&predicted, &expected).data,
            vec![vec![1.0, 0.0], vec![-2.0, 0.5]]
        );
    }
}
