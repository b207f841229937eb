//! Strategy tables (spec §4.2): for every method, a name, a default
//! parameter record, and a parameter-descriptor list giving name, type and
//! — for `strat`-typed parameters — the callee table's name.

use std::collections::BTreeMap;

use crate::tree::{ParamValue, Params};
use crate::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParamKind {
    Int,
    Double,
    Case,
    Strat,
}

#[derive(Clone, Debug)]
pub struct ParamDescriptor {
    pub name: &'static str,
    pub kind: ParamKind,
    /// For `ParamKind::Strat` parameters: the name of the callee table.
    pub callee_table: Option<&'static str>,
}

#[derive(Clone, Debug)]
pub struct MethodEntry {
    pub name: &'static str,
    pub params: Vec<ParamDescriptor>,
    pub defaults: Params,
}

/// A method table: the set of methods available to the strategy parser and
/// dispatcher for one problem (graph partitioning, halo-graph ordering,
/// vertex-separator computation, ...).
#[derive(Clone, Debug, Default)]
pub struct StrategyTable {
    pub name: &'static str,
    methods: BTreeMap<&'static str, MethodEntry>,
}

impl StrategyTable {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            methods: BTreeMap::new(),
        }
    }

    pub fn register(&mut self, entry: MethodEntry) {
        self.methods.insert(entry.name, entry);
    }

    pub fn get(&self, name: &str) -> Option<&MethodEntry> {
        self.methods.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    /// Fills in any parameter missing from `given` with the method's
    /// default, and validates that every supplied parameter is declared.
    pub fn resolve_params(&self, method: &str, given: &Params) -> Result<Params, Error> {
        let entry = self
            .get(method)
            .ok_or_else(|| Error::UnknownMethod {
                table: self.name.to_string(),
                name: method.to_string(),
            })?;

        for key in given.keys() {
            if !entry.params.iter().any(|p| p.name == key) {
                return Err(Error::UnknownParam {
                    method: method.to_string(),
                    name: key.clone(),
                });
            }
        }

        let mut resolved = entry.defaults.clone();
        for (k, v) in given {
            resolved.insert(k.clone(), v.clone());
        }
        Ok(resolved)
    }
}

pub fn int(v: i64) -> ParamValue {
    ParamValue::Int(v)
}

pub fn double(v: f64) -> ParamValue {
    ParamValue::Double(v)
}

pub fn case(v: char) -> ParamValue {
    ParamValue::Case(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_params_fills_defaults() {
        let mut table = StrategyTable::new("partition");
        let mut defaults = Params::new();
        defaults.insert("ratio".into(), double(0.8));
        table.register(MethodEntry {
            name: "coarsen",
            params: vec![ParamDescriptor {
                name: "ratio",
                kind: ParamKind::Double,
                callee_table: None,
            }],
            defaults,
        });

        let mut given = Params::new();
        given.insert("ratio".into(), double(0.5));
        let resolved = table.resolve_params("coarsen", &given).unwrap();
        assert!(matches!(resolved.get("ratio"), Some(ParamValue::Double(v)) if (*v - 0.5).abs() < 1e-9));

        let resolved_default = table.resolve_params("coarsen", &Params::new()).unwrap();
        assert!(
            matches!(resolved_default.get("ratio"), Some(ParamValue::Double(v)) if (*v - 0.8).abs() < 1e-9)
        );
    }

    #[test]
    fn unknown_method_is_rejected() {
        let table = StrategyTable::new("partition");
        assert!(table.resolve_params("nope", &Params::new()).is_err());
    }
}
