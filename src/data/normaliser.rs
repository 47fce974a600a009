use serde::{Serialize, Deserialize};

use crate::data::data_point::DataPoint;
use crate::error::{check_len, NnError, Result};

/// Rescales data points according to parameters fitted on a data set.
pub trait DataNormaliser {
    /// Fits the normaliser's parameters (e.g. mean and standard deviation).
    fn fit(&mut self, points: &[&DataPoint]) -> Result<()>;

    fn has_been_fit(&self) -> bool;

    fn normalise(&self, point: &mut DataPoint) -> Result<()>;

    fn denormalise(&self, point: &mut DataPoint) -> Result<()>;
}

/// Z-score normalisation of the input vector: `(x − mean) / std_dev` per
/// component.  Components with zero spread are only shifted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StandardScore {
    means: Vec<f64>,
    std_devs: Vec<f64>,
    fitted: bool,
}

impl StandardScore {
    pub fn new() -> StandardScore {
        StandardScore::default()
    }

    pub fn means(&self) -> &[f64] {
        &self.means
    }

    pub fn std_devs(&self) -> &[f64] {
        &self.std_devs
    }

    fn scale(&self, i: usize) -> f64 {
        if self.std_devs[i] > 0.0 { self.std_devs[i] } else { 1.0 }
    }

    fn check_fitted(&self, point: &DataPoint) -> Result<()> {
        if !self.fitted {
            return Err(NnError::InvalidArgument("normaliser has not been fit".into()));
        }
        check_len("normalised input", self.means.len(), point.input.len())
    }
}

impl DataNormaliser for StandardScore {
    fn fit(&mut self, points: &[&DataPoint]) -> Result<()> {
        let first = points
            .first()
            .ok_or_else(|| NnError::InvalidArgument("cannot fit a normaliser to no points".into()))?;
        let width = first.input.len();
        let n = points.len() as f64;

        let mut means = vec![0.0; width];
        for point in points {
            check_len("normalised input", width, point.input.len())?;
            for (m, x) in means.iter_mut().zip(&point.input) {
                *m += x / n;
            }
        }

        let mut std_devs = vec![0.0; width];
        for point in points {
            for ((s, x), m) in std_devs.iter_mut().zip(&point.input).zip(&means) {
                *s += (x - m).powi(2) / n;
            }
        }
        std_devs.iter_mut().for_each(|s| *s = s.sqrt());

        self.means = means;
        self.std_devs = std_devs;
        self.fitted = true;
        Ok(())
    }

    fn has_been_fit(&self) -> bool {
        self.fitted
    }

    fn normalise(&self, point: &mut DataPoint) -> Result<()> {
        self.check_fitted(point)?;
        for (i, x) in point.input.iter_mut().enumerate() {
            *x = (*x - self.means[i]) / self.scale(i);
        }
        Ok(())
    }

    fn denormalise(&self, point: &mut DataPoint) -> Result<()> {
        self.check_fitted(point)?;
        for (i, x) in point.input.iter_mut().enumerate() {
            *x = *x * self.scale(i) + self.means[i];
        }
        Ok(())
    }
}
