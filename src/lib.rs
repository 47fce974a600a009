pub mod error;
pub mod math;
pub mod activation;
pub mod layers;
pub mod network;
pub mod loss;
pub mod data;
pub mod train;

// Convenience re-exports
pub use error::{NnError, Result};
pub use math::matrix::Matrix;
pub use activation::activation::{Activation, ActivationFunction};
pub use layers::{DenseLayer, Gradient, Layer, LayerShape, LearningRate, SparseLayer};
pub use network::{Network, NetworkSpec};
pub use loss::LossFunction;
pub use data::{DataNormaliser, DataPoint, DataSet, DataSetKind, StandardScore};
pub use train::{
    BatchSelector, EpochLimit, Evaluation, Initialiser, Regulariser, StopFlag, TerminationCondition,
    TrainConfig, Trainer, TrainerState, TrainingLossBelow, TrainingProgress,
};
