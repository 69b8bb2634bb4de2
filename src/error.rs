use thiserror::Error;

/// Fatal conditions of a matching run.
///
/// None of them is recoverable: the run stops and no matching is reported.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MatchingError {
    /// A structural precondition of a transition does not hold
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    /// No alternating path connects the anchors of two trees
    #[error("no alternating path between vertices {from} and {to}")]
    SearchExhausted { from: usize, to: usize },

    /// Dual potentials can grow without bound
    #[error("graph has no perfect matching")]
    NoPerfectMatching,

    #[error("iteration limit of {0} reached")]
    IterationLimit(u32),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

pub(crate) fn violation(message: impl Into<String>) -> MatchingError {
    MatchingError::InvariantViolation(message.into())
}
