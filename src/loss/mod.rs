pub mod binary_cross_entropy;
pub mod loss_type;
pub mod negative_log_prob;
pub mod squared_error;

pub use binary_cross_entropy::BinaryCrossEntropy;
pub use loss_type::LossFunction;
pub use negative_log_prob::NegativeLogProb;
pub use squared_error::SquaredError;
