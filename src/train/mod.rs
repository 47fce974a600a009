pub mod batch;
pub mod evaluation;
pub mod initialiser;
pub mod learning_rate;
pub mod regulariser;
pub mod termination;
pub mod train_config;
pub mod trainer;

pub use batch::BatchSelector;
pub use evaluation::Evaluation;
pub use initialiser::Initialiser;
pub use learning_rate::{LayerRates, LearningRates};
pub use regulariser::Regulariser;
pub use termination::{EpochLimit, StopFlag, TerminationCondition, TrainingLossBelow, TrainingProgress};
pub use train_config::TrainConfig;
pub use trainer::{Trainer, TrainerState};
