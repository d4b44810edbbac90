use crate::Error;
use crate::ast::Value;
use std::collections::HashMap;

/// The single flat binding store of an evaluation session.
///
/// There are no nested scopes: a symbol is either absent or bound to exactly
/// one value. `define` requires absence ([`Environment::bind`]) and `set!`
/// requires presence ([`Environment::rebind`]).
///
/// The environment is owned by the caller and mutated in place. Evaluation
/// takes it by `&mut`, so one environment serves one evaluation at a time;
/// sharing it between threads requires external synchronisation such as a
/// `Mutex<Environment>`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Environment {
    bindings: HashMap<String, Value>,
}

impl Environment {
    pub fn new() -> Self {
        Environment {
            bindings: HashMap::new(),
        }
    }

    pub fn lookup(&self, name: &str) -> Option<&Value> {
        self.bindings.get(name)
    }

    pub fn is_bound(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    /// Create a new binding. Fails with [`Error::AlreadyDefined`] if `name`
    /// is already bound; the existing value is left untouched.
    pub fn bind(&mut self, name: &str, value: Value) -> Result<(), Error> {
        if self.is_bound(name) {
            return Err(Error::AlreadyDefined(name.to_owned()));
        }
        self.bindings.insert(name.to_owned(), value);
        Ok(())
    }

    /// Replace an existing binding. Fails with [`Error::NotDefined`] if
    /// `name` is not bound.
    pub fn rebind(&mut self, name: &str, value: Value) -> Result<(), Error> {
        match self.bindings.get_mut(name) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(Error::NotDefined(name.to_owned())),
        }
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Get all bindings as (name, value) pairs sorted by name
    pub fn get_all_bindings(&self) -> Vec<(String, Value)> {
        let mut result: Vec<_> = self
            .bindings
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();
        result.sort_by(|a, b| a.0.cmp(&b.0));
        result
    }
}

impl<S: Into<String>> FromIterator<(S, Value)> for Environment {
    fn from_iter<I: IntoIterator<Item = (S, Value)>>(iter: I) -> Self {
        Environment {
            bindings: iter
                .into_iter()
                .map(|(name, value)| (name.into(), value))
                .collect(),
        }
    }
}
