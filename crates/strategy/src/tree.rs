//! Strategy tree node tags (spec §4.2): `Empty`, `Method`, `Concat`,
//! `Cond`, `Select`.

use std::collections::BTreeMap;

use crate::condition::Expr;

/// A parameter value bound to a method invocation. `Strat` lets a method
/// parameter reference a callee strategy tree, e.g. recursive-bisection's
/// bipartition-method parameter.
#[derive(Clone, Debug)]
pub enum ParamValue {
    Int(i64),
    Double(f64),
    Case(char),
    Strat(Box<Strategy>),
}

pub type Params = BTreeMap<String, ParamValue>;

#[derive(Clone, Debug)]
pub enum Strategy {
    /// No-op; identity element for `Concat`.
    Empty,
    /// Invoke method `name` of the active table with `params`.
    Method { name: String, params: Params },
    /// Run `first`; if it succeeds, run `second` on the resulting state.
    Concat(Box<Strategy>, Box<Strategy>),
    /// Evaluate `test`; run `then_branch` or `else_branch` accordingly.
    Cond {
        test: Expr,
        then_branch: Box<Strategy>,
        else_branch: Option<Box<Strategy>>,
    },
    /// Clone the problem state into two save areas, run `first` on one and
    /// `second` on the other, keep the better outcome.
    Select(Box<Strategy>, Box<Strategy>),
}

impl Strategy {
    pub fn method(name: impl Into<String>, params: Params) -> Self {
        Strategy::Method {
            name: name.into(),
            params,
        }
    }

    pub fn then(self, next: Strategy) -> Self {
        Strategy::Concat(Box::new(self), Box::new(next))
    }
}
