//! Strategy tree interpreter (spec §4.2): walks a parsed [`Strategy`] tree
//! against a live problem instance, calling into a method table for each
//! `Method` node and implementing `Concat`/`Cond`/`Select` control flow.

use crate::condition::Features;
use crate::tree::{Params, Strategy};
use crate::Error;

/// A problem instance mutated in place by method calls, e.g. a graph
/// bipartition under construction or a column-block ordering tree.
///
/// `better_than` gives `Select` a way to pick a winner between two
/// independently-evolved copies of the same state (smaller edge cut, smaller
/// separator, lower fill-in — whatever the problem table cares about).
pub trait ProblemState: Clone + Features {
    fn better_than(&self, other: &Self) -> bool;
}

/// Problem-specific method table: executes one named method against a
/// mutable problem state.
pub trait MethodDispatch<S> {
    fn call(&self, method: &str, params: &Params, state: &mut S) -> Result<(), Error>;
}

/// Interprets `tree` against `state`, invoking `table` for every `Method`
/// node. `Concat` stops at the first failing stage; `Cond` branches on
/// `state`'s features; `Select` runs both arms on independent clones and
/// keeps the one `ProblemState::better_than` prefers.
pub fn dispatch<S, D>(tree: &Strategy, state: &mut S, table: &D) -> Result<(), Error>
where
    S: ProblemState,
    D: MethodDispatch<S>,
{
    match tree {
        Strategy::Empty => Ok(()),
        Strategy::Method { name, params } => table.call(name, params, state),
        Strategy::Concat(first, second) => {
            dispatch(first, state, table)?;
            dispatch(second, state, table)
        }
        Strategy::Cond {
            test,
            then_branch,
            else_branch,
        } => {
            if test.eval(state) {
                dispatch(then_branch, state, table)
            } else if let Some(else_branch) = else_branch {
                dispatch(else_branch, state, table)
            } else {
                Ok(())
            }
        }
        Strategy::Select(first, second) => {
            let mut lhs = state.clone();
            let mut rhs = state.clone();
            let lhs_result = dispatch(first, &mut lhs, table);
            let rhs_result = dispatch(second, &mut rhs, table);
            match (lhs_result, rhs_result) {
                (Ok(()), Ok(())) => {
                    *state = if lhs.better_than(&rhs) { lhs } else { rhs };
                    Ok(())
                }
                (Ok(()), Err(_)) => {
                    *state = lhs;
                    Ok(())
                }
                (Err(_), Ok(())) => {
                    *state = rhs;
                    Ok(())
                }
                (Err(e), Err(_)) => Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::{Expr, Op};
    use crate::tree::ParamValue;

    #[derive(Clone, Debug, PartialEq)]
    struct Counter(i64);

    impl Features for Counter {
        fn feature(&self, name: &str) -> f64 {
            match name {
                "value" => self.0 as f64,
                _ => 0.0,
            }
        }
    }

    impl ProblemState for Counter {
        fn better_than(&self, other: &Self) -> bool {
            self.0 < other.0
        }
    }

    struct CounterTable;

    impl MethodDispatch<Counter> for CounterTable {
        fn call(&self, method: &str, params: &Params, state: &mut Counter) -> Result<(), Error> {
            match method {
                "add" => {
                    let amount = match params.get("amount") {
                        Some(ParamValue::Int(v)) => *v,
                        _ => return Err(Error::MethodFailed("add".into())),
                    };
                    state.0 += amount;
                    Ok(())
                }
                "fail" => Err(Error::MethodFailed("fail".into())),
                _ => Err(Error::UnknownMethod {
                    table: "counter".into(),
                    name: method.into(),
                }),
            }
        }
    }

    fn add(amount: i64) -> Strategy {
        let mut params = Params::new();
        params.insert("amount".into(), ParamValue::Int(amount));
        Strategy::method("add", params)
    }

    #[test]
    fn concat_runs_both_stages_in_order() {
        let tree = add(3).then(add(4));
        let mut state = Counter(0);
        dispatch(&tree, &mut state, &CounterTable).unwrap();
        assert_eq!(state.0, 7);
    }

    #[test]
    fn concat_short_circuits_on_failure() {
        let tree = Strategy::Concat(
            Box::new(Strategy::method("fail", Params::new())),
            Box::new(add(100)),
        );
        let mut state = Counter(0);
        assert!(dispatch(&tree, &mut state, &CounterTable).is_err());
        assert_eq!(state.0, 0);
    }

    #[test]
    fn cond_picks_branch_by_feature() {
        let tree = Strategy::Cond {
            test: Expr::Cmp {
                feature: "value".into(),
                op: Op::Ge,
                value: 10.0,
            },
            then_branch: Box::new(add(1)),
            else_branch: Some(Box::new(add(-1))),
        };

        let mut low = Counter(0);
        dispatch(&tree, &mut low, &CounterTable).unwrap();
        assert_eq!(low.0, -1);

        let mut high = Counter(10);
        dispatch(&tree, &mut high, &CounterTable).unwrap();
        assert_eq!(high.0, 11);
    }

    #[test]
    fn select_keeps_the_better_outcome() {
        let tree = Strategy::Select(Box::new(add(5)), Box::new(add(-5)));
        let mut state = Counter(0);
        dispatch(&tree, &mut state, &CounterTable).unwrap();
        assert_eq!(state.0, -5);
    }

    #[test]
    fn select_falls_back_to_the_surviving_arm() {
        let tree = Strategy::Select(
            Box::new(Strategy::method("fail", Params::new())),
            Box::new(add(2)),
        );
        let mut state = Counter(0);
        dispatch(&tree, &mut state, &CounterTable).unwrap();
        assert_eq!(state.0, 2);
    }
}
