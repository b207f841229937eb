//! Strategy tree algebra, method tables, a textual parser and a tree
//! interpreter for per-problem method dispatch (spec §4.2).

pub mod condition;
pub mod dispatch;
pub mod error;
pub mod parser;
pub mod table;
pub mod tree;

pub use crate::condition::{Expr, Features, Op};
pub use crate::dispatch::{dispatch, MethodDispatch, ProblemState};
pub use crate::error::Error;
pub use crate::parser::parse;
pub use crate::table::{case, double, int, MethodEntry, ParamDescriptor, ParamKind, StrategyTable};
pub use crate::tree::{ParamValue, Params, Strategy};
