use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("out of memory")]
    OutOfMemory,
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("strategy error: {0}")]
    StrategyError(String),
}
