use crate::HdbscanError;
use num_traits::Float;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct DataValidator<'a, T> {
    data: &'a [Vec<T>],
}

impl<'a, T: Float> DataValidator<'a, T> {
    pub(crate) fn new(data: &'a [Vec<T>]) -> Self {
        Self { data }
    }

    /// Checks every point has the same dimensionality as the first and only finite coordinates.
    /// An empty data set is valid.
    pub(crate) fn validate_input_data(&self) -> Result<(), HdbscanError> {
        match self.data.first() {
            Some(first) => self.validate_against_dims(first.len()),
            None => Ok(()),
        }
    }

    /// Same checks as [`Self::validate_input_data`], but against a known dimensionality.
    pub(crate) fn validate_against_dims(&self, n_dims: usize) -> Result<(), HdbscanError> {
        for (n, datapoint) in self.data.iter().enumerate() {
            if datapoint.len() != n_dims {
                return Err(HdbscanError::WrongDimension {
                    index: n,
                    expected: n_dims,
                    got: datapoint.len(),
                });
            }
            if datapoint.iter().any(|element| !element.is_finite()) {
                return Err(HdbscanError::NonFiniteCoordinate { index: n });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_data_is_valid() {
        let data: Vec<Vec<f32>> = Vec::new();
        assert!(DataValidator::new(&data).validate_input_data().is_ok());
    }

    #[test]
    fn mismatched_dimensions() {
        let data = vec![vec![1.5, 2.2], vec![1.0, 1.1], vec![1.2]];
        let result = DataValidator::new(&data).validate_input_data();
        assert_eq!(
            Err(HdbscanError::WrongDimension {
                index: 2,
                expected: 2,
                got: 1,
            }),
            result
        );
    }

    #[test]
    fn non_finite_coordinates() {
        let data = vec![vec![1.5, 2.2], vec![f64::NAN, 1.1]];
        let result = DataValidator::new(&data).validate_input_data();
        assert_eq!(Err(HdbscanError::NonFiniteCoordinate { index: 1 }), result);

        let data = vec![vec![1.5, f32::infinity()]];
        let result = DataValidator::new(&data).validate_input_data();
        assert_eq!(Err(HdbscanError::NonFiniteCoordinate { index: 0 }), result);
    }

    #[test]
    fn known_dimensionality() {
        let data = vec![vec![1.0, 2.0, 3.0]];
        let result = DataValidator::new(&data).validate_against_dims(2);
        assert!(matches!(result, Err(HdbscanError::WrongDimension { .. })));
    }
}
