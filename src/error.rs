use thiserror::Error;

/// Failures of loading or running a tape machine program.
///
/// A run either completes or fails as a whole; only `BudgetExceeded` carries
/// anything usable from the partial run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("unmatched `]` at position {position}")]
    UnmatchedClose { position: usize },
    #[error("unmatched `[` at position {position}")]
    UnmatchedOpen { position: usize },
    #[error("data pointer moved below 0 at step {step} (instruction {instruction})")]
    OutOfBounds { step: u64, instruction: usize },
    #[error("exceeded {max_steps} steps; output so far: {partial_output:?}")]
    BudgetExceeded {
        max_steps: u64,
        partial_output: String,
    },
    #[error("cell size must be nonzero")]
    InvalidCellSize,
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// True for bracket mismatches detected before execution.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Error::UnmatchedClose { .. } | Error::UnmatchedOpen { .. }
        )
    }

    /// Output produced before the step budget ran out.
    pub fn partial_output(&self) -> Option<&str> {
        match self {
            Error::BudgetExceeded { partial_output, .. } => Some(partial_output),
            _ => None,
        }
    }
}
