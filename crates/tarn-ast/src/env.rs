use std::rc::Rc;

use crate::value::Value;

/// A persistent, immutable environment realized as a cons-list of scopes.
///
/// Extending an environment never mutates the parent: it produces a new
/// `Frame` whose `parent` shares the old chain by reference count. This is
/// what lets a closure capture "the environment in force right now" simply
/// by cloning the `Rc` -- later extension of the defining scope can never
/// be observed through an already-captured handle.
#[derive(Debug)]
pub enum Env {
    Empty,
    Frame {
        name: String,
        value: Value,
        parent: Rc<Env>,
    },
}

impl Env {
    pub fn empty() -> Rc<Env> {
        Rc::new(Env::Empty)
    }

    /// Extend `parent` with a new binding, returning the extended scope.
    /// `parent` itself is untouched.
    pub fn extend(parent: &Rc<Env>, name: impl Into<String>, value: Value) -> Rc<Env> {
        Rc::new(Env::Frame {
            name: name.into(),
            value,
            parent: Rc::clone(parent),
        })
    }

    /// Look up the nearest binding for `name`, walking outward from the
    /// innermost frame.
    pub fn lookup(&self, name: &str) -> Option<&Value> {
        match self {
            Env::Empty => None,
            Env::Frame {
                name: bound,
                value,
                parent,
            } => {
                if bound == name {
                    Some(value)
                } else {
                    parent.lookup(name)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_finds_nearest_binding() {
        let base = Env::empty();
        let outer = Env::extend(&base, "x", Value::Int(1));
        let inner = Env::extend(&outer, "x", Value::Int(2));
        assert_eq!(inner.lookup("x"), Some(&Value::Int(2)));
        assert_eq!(outer.lookup("x"), Some(&Value::Int(1)));
    }

    #[test]
    fn lookup_missing_name_is_none() {
        let base = Env::empty();
        assert_eq!(base.lookup("z"), None);
    }

    #[test]
    fn extending_does_not_mutate_parent() {
        let base = Env::empty();
        let outer = Env::extend(&base, "x", Value::Int(1));
        let _inner = Env::extend(&outer, "y", Value::Int(2));
        assert_eq!(outer.lookup("y"), None);
        assert_eq!(outer.lookup("x"), Some(&Value::Int(1)));
    }
}
