use thiserror::Error;

/// Result type alias for this crate.
pub type Result<T> = std::result::Result<T, NnError>;

/// Every failure the library reports.  Nothing here is recoverable at the
/// point it is raised; callers are expected to validate shapes and
/// configuration up front (see `Trainer::troubleshoot`).
#[derive(Debug, Error)]
pub enum NnError {
    /// Operand or vector lengths do not line up.
    #[error("dimension mismatch in {context}: expected {expected}, got {actual}")]
    DimensionMismatch {
        context: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A configuration value was read or written through the wrong accessor,
    /// e.g. the scalar learning rate while per-weight rates are active.
    #[error("invalid configuration access: {0}")]
    InvalidAccess(String),

    /// `Trainer::train` was called while readiness checks fail.
    #[error("trainer is not ready: {}", .0.join(", "))]
    NotReady(Vec<String>),

    /// Known-incomplete feature path (sparse layers).
    #[error("not implemented: {0}")]
    NotImplemented(&'static str),

    /// Backpropagation was asked for on a layer whose cached forward pass is
    /// out of date with its input or weights.
    #[error("layer forward pass is stale; run a forward pass before backpropagating")]
    StaleForwardPass,

    #[error("{context} index {index} out of range for length {len}")]
    IndexOutOfRange {
        context: &'static str,
        index: usize,
        len: usize,
    },

    #[error("data point has no target vector")]
    MissingTarget,

    #[error("batch selector returned no data points")]
    EmptyBatch,

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl NnError {
    pub(crate) fn mismatch(context: &'static str, expected: usize, actual: usize) -> Self {
        NnError::DimensionMismatch { context, expected, actual }
    }

    pub(crate) fn out_of_range(context: &'static str, index: usize, len: usize) -> Self {
        NnError::IndexOutOfRange { context, index, len }
    }
}

/// Fails with `DimensionMismatch` unless `actual == expected`.
pub(crate) fn check_len(context: &'static str, expected: usize, actual: usize) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(NnError::mismatch(context, expected, actual))
    }
}
