//! The evaluation environment a checker snippet runs in.
//!
//! A `Sandbox` is built fresh for every evaluation and holds everything the
//! snippet may touch: the `submitted`/`expected` bindings, variables the
//! snippet assigns, the builtin dispatch table, and the remaining step
//! budget. There is no other lookup path; a name that is not here does not
//! exist.

use std::collections::HashMap;

use quizcheck_core::answer::{self, BUILTIN_NAMES};
use quizcheck_core::snippet::BOUND_NAMES;
use quizcheck_core::value::Value;

use crate::eval::Fault;

/// Per-evaluation environment and step budget.
pub struct Sandbox {
    bindings: HashMap<String, Value>,
    fuel: u64,
}

impl Sandbox {
    /// Create an environment for one evaluation.
    ///
    /// `expected` is bound only when the question provides it; referencing
    /// it otherwise is reported as a misconfigured question, not a
    /// capability escape.
    pub fn new(submitted: &str, expected: Option<Value>, fuel: u64) -> Self {
        let mut bindings = HashMap::new();
        bindings.insert("submitted".to_string(), Value::Str(submitted.to_string()));
        if let Some(expected) = expected {
            bindings.insert("expected".to_string(), expected);
        }
        Self { bindings, fuel }
    }

    /// Charge `cost` steps against the budget.
    pub fn spend(&mut self, cost: u64) -> Result<(), Fault> {
        if self.fuel < cost {
            return Err(Fault::Budget);
        }
        self.fuel -= cost;
        Ok(())
    }

    pub fn fuel_remaining(&self) -> u64 {
        self.fuel
    }

    /// Resolve a variable reference.
    pub fn lookup(&self, name: &str) -> Result<Value, Fault> {
        if let Some(value) = self.bindings.get(name) {
            return Ok(value.clone());
        }
        if BOUND_NAMES.contains(&name) {
            // `expected` without expected-answer data on the question.
            return Err(Fault::Type(format!(
                "question provides no '{name}' value"
            )));
        }
        Err(Fault::UnknownName(name.to_string()))
    }

    /// Bind or rebind a snippet variable.
    pub fn assign(&mut self, name: &str, value: Value) {
        self.bindings.insert(name.to_string(), value);
    }

    /// Dispatch a builtin call. The only callable names are the three value
    /// parsers; each takes exactly one text argument.
    pub fn call_builtin(&self, name: &str, args: &[Value]) -> Result<Value, Fault> {
        if !BUILTIN_NAMES.contains(&name) {
            return Err(Fault::UnknownName(name.to_string()));
        }

        let text = match args {
            [Value::Str(s)] => s.as_str(),
            [other] => {
                return Err(Fault::Type(format!(
                    "{name}() expects text, got {}",
                    other.type_name()
                )))
            }
            _ => {
                return Err(Fault::Type(format!(
                    "{name}() expects exactly 1 argument, got {}",
                    args.len()
                )))
            }
        };

        let result = match name {
            "to_int" => answer::to_int(text),
            "distance" => answer::distance(text),
            "direction_angle" => answer::direction_angle(text),
            _ => unreachable!("name checked against BUILTIN_NAMES"),
        };

        result.map(Value::Int).map_err(Fault::Parse)
    }
}
