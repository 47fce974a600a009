pub mod data_point;
pub mod data_set;
pub mod normaliser;

pub use data_point::DataPoint;
pub use data_set::{DataSet, DataSetKind};
pub use normaliser::{DataNormaliser, StandardScore};
