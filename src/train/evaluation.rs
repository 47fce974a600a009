use serde::{Serialize, Deserialize};

/// One snapshot of the evaluation log, taken before every epoch whose index is
/// a multiple of the evaluation frequency.
///
/// Losses are means over the respective partition, regulariser penalties
/// included.  `None` marks an empty partition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    /// Completed epochs at the time of the snapshot.
    pub epoch: usize,
    pub training_loss: Option<f64>,
    pub validation_loss: Option<f64>,
}

impl Evaluation {
    /// True when every recorded loss is a finite number.
    pub fn is_finite(&self) -> bool {
        [self.training_loss, self.validation_loss]
            .iter()
            .flatten()
            .all(|loss| loss.is_finite())
    }
}
