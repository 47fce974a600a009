use std::fmt;

use rand::rngs::StdRng;

use crate::data::{DataPoint, DataSet};

type SelectFn = dyn for<'a> FnMut(&'a DataSet, &mut StdRng) -> Vec<&'a DataPoint>;

/// Chooses the data points of one training iteration.
///
/// Batches need not be disjoint and need not cover the training set; an epoch
/// simply keeps drawing until it has consumed as many points as the training
/// set holds.
pub struct BatchSelector {
    select: Box<SelectFn>,
}

impl BatchSelector {
    pub fn new<F>(select: F) -> BatchSelector
    where
        F: for<'a> FnMut(&'a DataSet, &mut StdRng) -> Vec<&'a DataPoint> + 'static,
    {
        BatchSelector { select: Box::new(select) }
    }

    /// Every training point, in order.  One iteration per epoch.
    pub fn full_training_set() -> BatchSelector {
        BatchSelector::new(|data, _| data.training().iter().collect())
    }

    /// `count` training points drawn with replacement.
    pub fn random_training_subset(count: usize) -> BatchSelector {
        BatchSelector::new(move |data, rng| data.random_training_subset(count, rng))
    }

    pub fn select<'a>(&mut self, data: &'a DataSet, rng: &mut StdRng) -> Vec<&'a DataPoint> {
        (self.select)(data, rng)
    }
}

impl fmt::Debug for BatchSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchSelector").finish_non_exhaustive()
    }
}
