use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("strategy parse error at offset {offset}: {message}")]
    Parse { offset: usize, message: String },
    #[error("unknown method {name:?} in table {table:?}")]
    UnknownMethod { table: String, name: String },
    #[error("unknown parameter {name:?} for method {method:?}")]
    UnknownParam { method: String, name: String },
    #[error("type mismatch for parameter {name:?}: {message}")]
    ParamType { name: String, message: String },
    #[error("method {0} failed")]
    MethodFailed(String),
}
