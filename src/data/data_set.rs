use std::collections::VecDeque;

use rand::Rng;
use serde::{Serialize, Deserialize};
use tracing::{debug, warn};

use crate::data::data_point::DataPoint;
use crate::data::normaliser::DataNormaliser;
use crate::error::{check_len, NnError, Result};

/// What the targets of a data set mean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSetKind {
    Regression,
    Classification,
    Unsupervised,
}

/// In-memory examples split into training, validation and test partitions.
///
/// Points are added unassigned and moved into the partitions by
/// `assign_data_points`.  `outputs` is the target width: the regression output
/// count, the number of categories for classification, 0 when unsupervised.
#[derive(Debug, Clone)]
pub struct DataSet {
    kind: DataSetKind,
    inputs: usize,
    outputs: usize,
    training: Vec<DataPoint>,
    validation: Vec<DataPoint>,
    test: Vec<DataPoint>,
    unassigned: VecDeque<DataPoint>,
}

impl DataSet {
    pub fn regression(inputs: usize, outputs: usize) -> DataSet {
        DataSet::with_kind(DataSetKind::Regression, inputs, outputs)
    }

    pub fn classification(inputs: usize, categories: usize) -> DataSet {
        DataSet::with_kind(DataSetKind::Classification, inputs, categories)
    }

    pub fn unsupervised(inputs: usize) -> DataSet {
        DataSet::with_kind(DataSetKind::Unsupervised, inputs, 0)
    }

    fn with_kind(kind: DataSetKind, inputs: usize, outputs: usize) -> DataSet {
        DataSet {
            kind,
            inputs,
            outputs,
            training: Vec::new(),
            validation: Vec::new(),
            test: Vec::new(),
            unassigned: VecDeque::new(),
        }
    }

    pub fn kind(&self) -> DataSetKind {
        self.kind
    }

    pub fn inputs(&self) -> usize {
        self.inputs
    }

    pub fn outputs(&self) -> usize {
        self.outputs
    }

    /// Queues a pre-built point after checking its widths against the set.
    /// Only unsupervised sets accept points with neither target nor category.
    pub fn add_data_point(&mut self, point: DataPoint) -> Result<()> {
        check_len("data point input", self.inputs, point.input.len())?;
        let unlabelled = point.target.is_none() && point.category.is_none();
        if unlabelled && self.kind != DataSetKind::Unsupervised {
            return Err(NnError::MissingTarget);
        }
        if let Some(target) = &point.target {
            check_len("data point target", self.outputs, target.len())?;
        }
        if let Some(category) = point.category {
            if self.kind != DataSetKind::Classification {
                return Err(NnError::InvalidArgument(format!(
                    "{:?} data set cannot hold categorised points",
                    self.kind
                )));
            }
            if category >= self.outputs {
                return Err(NnError::out_of_range("category", category, self.outputs));
            }
        }
        self.unassigned.push_back(point);
        Ok(())
    }

    pub fn add_regression_point(&mut self, input: Vec<f64>, target: Vec<f64>) -> Result<()> {
        self.expect_kind(DataSetKind::Regression)?;
        self.add_data_point(DataPoint::regression(input, target))
    }

    pub fn add_classification_point(&mut self, input: Vec<f64>, category: usize) -> Result<()> {
        self.expect_kind(DataSetKind::Classification)?;
        self.add_data_point(DataPoint::classification(input, category))
    }

    pub fn add_unsupervised_point(&mut self, input: Vec<f64>) -> Result<()> {
        self.expect_kind(DataSetKind::Unsupervised)?;
        self.add_data_point(DataPoint::unsupervised(input))
    }

    fn expect_kind(&self, kind: DataSetKind) -> Result<()> {
        if self.kind == kind {
            Ok(())
        } else {
            Err(NnError::InvalidArgument(format!(
                "expected a {kind:?} data set, found {:?}",
                self.kind
            )))
        }
    }

    /// Moves every unassigned point into a partition.  Each point draws one
    /// uniform number and lands in training, validation or test according to
    /// the cumulative normalised ratios, so partition sizes are only
    /// proportional in expectation.
    pub fn assign_data_points<R: Rng + ?Sized>(
        &mut self,
        training_ratio: f64,
        validation_ratio: f64,
        test_ratio: f64,
        rng: &mut R,
    ) -> Result<()> {
        let ratios = [training_ratio, validation_ratio, test_ratio];
        if ratios.iter().any(|r| !r.is_finite() || *r < 0.0) {
            return Err(NnError::InvalidArgument(format!(
                "split ratios must be finite and non-negative, got {ratios:?}"
            )));
        }
        let total: f64 = ratios.iter().sum();
        if total <= 0.0 {
            return Err(NnError::InvalidArgument("split ratios sum to zero".into()));
        }

        let training_cutoff = training_ratio / total;
        let validation_cutoff = (training_ratio + validation_ratio) / total;

        let count = self.unassigned.len();
        let before = self.training.len();
        while let Some(point) = self.unassigned.pop_front() {
            let draw: f64 = rng.gen();
            if draw < training_cutoff {
                self.training.push(point);
            } else if draw < validation_cutoff {
                self.validation.push(point);
            } else {
                self.test.push(point);
            }
        }

        debug!(
            assigned = count,
            training = self.training.len(),
            validation = self.validation.len(),
            test = self.test.len(),
            "assigned data points"
        );
        if count > 0 && self.training.len() == before {
            warn!(assigned = count, "no points were assigned to the training set");
        }
        Ok(())
    }

    pub fn unassigned_len(&self) -> usize {
        self.unassigned.len()
    }

    pub fn training(&self) -> &[DataPoint] {
        &self.training
    }

    pub fn validation(&self) -> &[DataPoint] {
        &self.validation
    }

    pub fn test(&self) -> &[DataPoint] {
        &self.test
    }

    /// Training, validation, test, then unassigned points.
    pub fn whole_set(&self) -> Vec<&DataPoint> {
        self.training
            .iter()
            .chain(&self.validation)
            .chain(&self.test)
            .chain(&self.unassigned)
            .collect()
    }

    pub fn training_example(&self, index: usize) -> Option<&DataPoint> {
        self.training.get(index)
    }

    pub fn validation_example(&self, index: usize) -> Option<&DataPoint> {
        self.validation.get(index)
    }

    pub fn test_example(&self, index: usize) -> Option<&DataPoint> {
        self.test.get(index)
    }

    pub fn random_training_example<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&DataPoint> {
        random_example(&self.training, rng)
    }

    pub fn random_validation_example<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&DataPoint> {
        random_example(&self.validation, rng)
    }

    pub fn random_test_example<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&DataPoint> {
        random_example(&self.test, rng)
    }

    /// `count` training points drawn independently with replacement.  Empty
    /// if the training set is empty.
    pub fn random_training_subset<R: Rng + ?Sized>(&self, count: usize, rng: &mut R) -> Vec<&DataPoint> {
        random_subset(&self.training, count, rng)
    }

    pub fn random_validation_subset<R: Rng + ?Sized>(&self, count: usize, rng: &mut R) -> Vec<&DataPoint> {
        random_subset(&self.validation, count, rng)
    }

    pub fn random_test_subset<R: Rng + ?Sized>(&self, count: usize, rng: &mut R) -> Vec<&DataPoint> {
        random_subset(&self.test, count, rng)
    }

    /// Replaces the target of every categorised point with its one-hot
    /// encoding over `outputs()` categories.
    pub fn one_hot_all(&mut self) -> Result<()> {
        self.expect_kind(DataSetKind::Classification)?;
        let categories = self.outputs;
        for point in self.points_mut() {
            if point.category.is_some() {
                point.one_hot(categories)?;
            }
        }
        Ok(())
    }

    /// Normalises every point, fitting `normaliser` to the whole set first if
    /// it has not been fitted.
    pub fn normalise_by<N: DataNormaliser + ?Sized>(&mut self, normaliser: &mut N) -> Result<()> {
        if !normaliser.has_been_fit() {
            normaliser.fit(&self.whole_set())?;
        }
        for point in self.points_mut() {
            normaliser.normalise(point)?;
        }
        Ok(())
    }

    /// Inverts `normalise_by`.  The normaliser must already be fitted.
    pub fn denormalise_by<N: DataNormaliser + ?Sized>(&mut self, normaliser: &N) -> Result<()> {
        if !normaliser.has_been_fit() {
            return Err(NnError::InvalidArgument(
                "cannot denormalise with a normaliser that has not been fit".into(),
            ));
        }
        for point in self.points_mut() {
            normaliser.denormalise(point)?;
        }
        Ok(())
    }

    fn points_mut(&mut self) -> impl Iterator<Item = &mut DataPoint> {
        self.training
            .iter_mut()
            .chain(self.validation.iter_mut())
            .chain(self.test.iter_mut())
            .chain(self.unassigned.iter_mut())
    }
}

fn random_example<'a, R: Rng + ?Sized>(set: &'a [DataPoint], rng: &mut R) -> Option<&'a DataPoint> {
    if set.is_empty() {
        None
    } else {
        set.get(rng.gen_range(0..set.len()))
    }
}

fn random_subset<'a, R: Rng + ?Sized>(set: &'a [DataPoint], count: usize, rng: &mut R) -> Vec<&'a DataPoint> {
    (0..count).filter_map(|_| random_example(set, rng)).collect()
}
