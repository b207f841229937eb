use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("communication failure: {0}")]
    CommunicationFailure(String),
    #[error("internal invariant violated: {0}")]
    Inconsistent(String),
    /// Soft-failure (spec §7): coarsening could not reach the requested
    /// contraction ratio before stalling. Carries the coarsest graph reached.
    #[error("coarsening stalled before reaching the requested ratio")]
    RatioNotMet,
    #[error("fold-communication pattern needs more than {0} messages per process")]
    FoldCommOverflow(usize),
}
