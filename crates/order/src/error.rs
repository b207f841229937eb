use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("internal invariant violated: {0}")]
    Inconsistent(String),
    #[error(transparent)]
    Partition(#[from] scotch_partition::Error),
    #[error(transparent)]
    Strategy(#[from] scotch_strategy::Error),
}
