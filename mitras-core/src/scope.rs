//! Variable bindings threaded through an expression list.
//!
//! A [`Scope`] is never changed in place: binding a name produces a new
//! scope, so expression *i* can only ever observe what expressions before
//! it produced.

use crate::value::Value;

/// Ordered name → value mapping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scope {
    bindings: Vec<(String, Value)>,
}

impl Scope {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.bindings
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// A copy of this scope with `name` bound to `value`. Rebinding keeps
    /// the name's original position.
    #[must_use]
    pub fn with(&self, name: &str, value: Value) -> Self {
        let mut bindings = self.bindings.clone();
        match bindings.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = value,
            None => bindings.push((name.to_owned(), value)),
        }
        Self { bindings }
    }

    /// Bindings in first-assignment order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.bindings.iter().map(|(n, v)| (n.as_str(), v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_leaves_original_untouched() {
        let empty = Scope::new();
        let a = empty.with("a", Value::Number(2.0));
        assert!(empty.is_empty());
        assert_eq!(a.get("a"), Some(&Value::Number(2.0)));
    }

    #[test]
    fn rebinding_keeps_order() {
        let s = Scope::new()
            .with("a", Value::Number(1.0))
            .with("b", Value::Number(2.0))
            .with("a", Value::Number(3.0));
        let names: Vec<_> = s.iter().map(|(n, _)| n).collect();
        assert_eq!(names, ["a", "b"]);
        assert_eq!(s.get("a"), Some(&Value::Number(3.0)));
    }
}
