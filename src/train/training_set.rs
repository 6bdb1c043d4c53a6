use crate::error::{EngineError, Result};
use crate::math::matrix::Matrix;

/// Append-only store of training examples, kept as flat row-major buffers.
#[derive(Debug, Clone, Default)]
pub struct TrainingSet {
    input_width: usize,
    output_width: usize,
    inputs: Vec<f64>,
    outputs: Vec<f64>,
}

impl TrainingSet {
    pub fn new(input_width: usize, output_width: usize) -> TrainingSet {
        TrainingSet {
            input_width,
            output_width,
            inputs: Vec::new(),
            outputs: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        if self.input_width == 0 {
            return 0;
        }
        self.inputs.len() / self.input_width
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    /// Appends `count` examples sliced from the flat buffers.
    ///
    /// Either every example is appended or none is.
    pub fn push_flat(&mut self, count: usize, inputs: &[f64], outputs: &[f64]) -> Result<()> {
        check_shape("inputs", count, self.input_width, inputs.len())?;
        check_shape("outputs", count, self.output_width, outputs.len())?;
        check_finite("inputs", inputs)?;
        check_finite("outputs", outputs)?;

        self.inputs.extend_from_slice(inputs);
        self.outputs.extend_from_slice(outputs);
        Ok(())
    }

    /// Inputs as a `len x input_width` batch.
    pub fn input_matrix(&self) -> Matrix {
        Matrix::from_flat(self.len(), self.input_width, &self.inputs)
    }

    /// Expected outputs as a `len x output_width` batch.
    pub fn output_matrix(&self) -> Matrix {
        Matrix::from_flat(self.len(), self.output_width, &self.outputs)
    }
}

/// `count` rows of `width` values must fill the buffer exactly.
///
/// A `count` whose row total overflows `usize` can never match a real buffer
/// and reports `usize::MAX` as the expected length.
pub(crate) fn check_shape(what: &'static str, count: usize, width: usize, actual: usize) -> Result<()> {
    let expected = count.checked_mul(width).unwrap_or(usize::MAX);
    if count == 0 || actual != expected {
        return Err(EngineError::ShapeMismatch { what, expected, actual });
    }
    Ok(())
}

pub(crate) fn check_finite(what: &str, values: &[f64]) -> Result<()> {
    match values.iter().find(|v| !v.is_finite()) {
        Some(&bad) => Err(EngineError::invalid_value(what, bad, "sample values must be finite")),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slices_flat_buffers_in_order() {
        let mut set = TrainingSet::new(2, 1);
        set.push_flat(2, &[0.0, 1.0, 1.0, 0.0], &[1.0, 1.0]).unwrap();
        set.push_flat(1, &[1.0, 1.0], &[0.0]).unwrap();
        assert_eq!(set.len(), 3);
        assert_eq!(set.input_matrix().data[2], vec![1.0, 1.0]);
        assert_eq!(set.output_matrix().to_flat(), vec![1.0, 1.0, 0.0]);
    }

    #[test]
    fn rejects_buffers_that_do_not_fill_count_rows() {
        let mut set = TrainingSet::new(3, 2);
        let err = set.push_flat(2, &[0.0; 5], &[0.0; 4]).unwrap_err();
        assert!(matches!(
            err,
            EngineError::ShapeMismatch { what: "inputs", expected: 6, actual: 5 }
        ));
        assert!(matches!(
            set.push_flat(2, &[0.0; 6], &[0.0; 3]),
            Err(EngineError::ShapeMismatch { what: "outputs", .. })
        ));
        assert!(matches!(
            set.push_flat(0, &[], &[]),
            Err(EngineError::ShapeMismatch { .. })
        ));
        assert!(set.is_empty());
    }

    #[test]
    fn overflowing_counts_are_a_shape_mismatch() {
        let mut set = TrainingSet::new(2, 1);
        let err = set.push_flat(usize::MAX / 2 + 1, &[0.0, 0.0], &[0.0]).unwrap_err();
        assert!(matches!(
            err,
            EngineError::ShapeMismatch { what: "inputs", expected: usize::MAX, actual: 2 }
        ));
        assert!(set.is_empty());
    }

    #[test]
    fn non_finite_samples_are_rejected_atomically() {
        let mut set = TrainingSet::new(1, 1);
        assert!(matches!(
            set.push_flat(2, &[0.0, f64::NAN], &[0.0, 1.0]),
            Err(EngineError::InvalidValue { .. })
        ));
        assert_eq!(set.len(), 0);
    }
}
