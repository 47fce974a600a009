use serde::{Serialize, Deserialize};

use crate::error::{NnError, Result};

/// One example: an input vector plus, for supervised data, a target vector
/// and/or a category index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub input: Vec<f64>,
    pub target: Option<Vec<f64>>,
    pub category: Option<usize>,
}

impl DataPoint {
    /// Regression example.
    pub fn regression(input: Vec<f64>, target: Vec<f64>) -> DataPoint {
        DataPoint { input, target: Some(target), category: None }
    }

    /// Classification example; call `one_hot` before training on it.
    pub fn classification(input: Vec<f64>, category: usize) -> DataPoint {
        DataPoint { input, target: None, category: Some(category) }
    }

    /// Unlabelled example.
    pub fn unsupervised(input: Vec<f64>) -> DataPoint {
        DataPoint { input, target: None, category: None }
    }

    pub fn target(&self) -> Result<&[f64]> {
        self.target.as_deref().ok_or(NnError::MissingTarget)
    }

    /// Sets the target to the one-hot encoding of the point's category in a
    /// space of `categories` classes.
    pub fn one_hot(&mut self, categories: usize) -> Result<()> {
        let category = self.category.ok_or_else(|| {
            NnError::InvalidArgument("one-hot encoding needs a category".into())
        })?;
        if category >= categories {
            return Err(NnError::out_of_range("category", category, categories));
        }
        let mut target = vec![0.0; categories];
        target[category] = 1.0;
        self.target = Some(target);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_hot_marks_only_the_category() {
        let mut point = DataPoint::classification(vec![0.2, 0.9], 2);
        point.one_hot(4).unwrap();
        assert_eq!(point.target().unwrap(), &[0.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn one_hot_rejects_out_of_range_category() {
        let mut point = DataPoint::classification(vec![0.0], 4);
        assert!(matches!(
            point.one_hot(4),
            Err(NnError::IndexOutOfRange { index: 4, len: 4, .. })
        ));
        assert!(point.target.is_none());
    }

    #[test]
    fn unlabelled_point_has_no_target() {
        let mut point = DataPoint::unsupervised(vec![1.0]);
        assert!(matches!(point.target(), Err(NnError::MissingTarget)));
        assert!(point.one_hot(2).is_err());
    }
}
