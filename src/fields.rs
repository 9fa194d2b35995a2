//! The field map behind [`Value::Object`](crate::Value::Object).
//!
//! TJSON objects keep their members in document order and never hold two members
//! with the same tag-stripped name. [`Fields`] is a [`Vec`] of pairs that upholds
//! both: [`Fields::insert`] replaces an existing member in place instead of appending
//! a second one.
//!
//! # Example
//!
//! ```
//! use tjson::prelude::*;
//!
//! let mut fields = Fields::new();
//! fields.insert("b", Value::from(1));
//! fields.insert("a", Value::from("x"));
//!
//! // insertion order is kept
//! let names: Vec<&str> = fields.names().collect();
//! assert_eq!(names, vec!["b", "a"]);
//!
//! // replacing keeps the position
//! assert_eq!(fields.insert("b", Value::from(2)), Some(Value::from(1)));
//! assert_eq!(fields.names().next(), Some("b"));
//! ```

use std::{collections::BTreeMap, iter::FromIterator, slice::Iter, vec::IntoIter};

use crate::Value;

#[derive(PartialEq, Clone, Debug, Default)]
/// An insertion-ordered map from field names to values.
///
/// See also: [module level documentation](`crate::fields`).
pub struct Fields(Vec<(String, Value)>);

impl Fields {
    /// Creates an empty [`Fields`].
    pub fn new() -> Self { Fields(Vec::new()) }

    /// Creates an empty [`Fields`] with room for `cap` members.
    pub fn with_capacity(cap: usize) -> Self { Fields(Vec::with_capacity(cap)) }

    /// Inserts a member. If `name` is already present its value is replaced in place
    /// and the old value returned.
    ///
    /// # Arguments
    ///
    /// * `name` - The tag-stripped field name.
    /// * `value` - The field's value.
    pub fn insert<S: Into<String>>(&mut self, name: S, value: Value) -> Option<Value> {
        let name = name.into();
        match self.position(&name) {
            Some(i) => Some(std::mem::replace(&mut self.0[i].1, value)),
            None => {
                self.0.push((name, value));
                None
            }
        }
    }

    /// Returns the value stored under `name`.
    ///
    /// ```
    /// use tjson::prelude::*;
    ///
    /// let fields: Fields = vec![("n".to_string(), Value::from(1))].into();
    ///
    /// assert_eq!(fields.get("n"), Some(&Value::from(1)));
    /// assert!(fields.get("m").is_none());
    /// ```
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.position(name).map(|i| &self.0[i].1)
    }

    /// Removes the member called `name`, keeping the order of the rest.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.position(name).map(|i| self.0.remove(i).1)
    }

    /// Indicates whether a member called `name` exists.
    pub fn contains_key(&self, name: &str) -> bool { self.position(name).is_some() }

    /// Returns the number of members.
    pub fn len(&self) -> usize { self.0.len() }

    /// Indicates whether there are no members.
    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    /// Returns an [`Iter`] of the members in insertion order.
    pub fn iter(&self) -> Iter<(String, Value)> { self.0.iter() }

    /// Returns the field names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> { self.0.iter().map(|(k, _)| k.as_str()) }

    /// Returns the members sorted by name, leaving `self` untouched.
    pub fn sorted(&self) -> Vec<&(String, Value)> {
        let mut members: Vec<&(String, Value)> = self.0.iter().collect();
        members.sort_by(|(k1, _), (k2, _)| k1.cmp(k2));
        members
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.0.iter().position(|(k, _)| k == name)
    }
}

impl From<Vec<(String, Value)>> for Fields {
    /// Later duplicates overwrite earlier ones, in the earlier position.
    fn from(v: Vec<(String, Value)>) -> Self { v.into_iter().collect() }
}

impl From<BTreeMap<String, Value>> for Fields {
    fn from(bt: BTreeMap<String, Value>) -> Self { bt.into_iter().collect() }
}

impl IntoIterator for Fields {
    type IntoIter = IntoIter<(String, Value)>;
    type Item = (String, Value);

    fn into_iter(self) -> IntoIter<(String, Value)> { self.0.into_iter() }
}

impl<'a> IntoIterator for &'a Fields {
    type IntoIter = Iter<'a, (String, Value)>;
    type Item = &'a (String, Value);

    fn into_iter(self) -> Iter<'a, (String, Value)> { self.0.iter() }
}

impl<S: Into<String>> FromIterator<(S, Value)> for Fields {
    fn from_iter<I: IntoIterator<Item = (S, Value)>>(iter: I) -> Fields {
        let iter = iter.into_iter();
        let mut fields = Fields::with_capacity(iter.size_hint().0);
        for (k, v) in iter {
            fields.insert(k, v);
        }
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicates_collapse() {
        let fields = Fields::from(vec![
            ("a".to_string(), Value::from(1)),
            ("b".to_string(), Value::from(2)),
            ("a".to_string(), Value::from(3)),
        ]);
        assert_eq!(fields.len(), 2);
        assert_eq!(fields.get("a"), Some(&Value::from(3)));
        assert_eq!(fields.names().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn sorted_view() {
        let fields: Fields = vec![("b", Value::Null), ("a", Value::Null), ("c", Value::Null)]
            .into_iter()
            .collect();
        let names: Vec<&str> = fields.sorted().into_iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        // unchanged
        assert_eq!(fields.names().collect::<Vec<_>>(), vec!["b", "a", "c"]);
    }

    #[test]
    fn remove_keeps_order() {
        let mut fields: Fields = vec![("x", Value::Null), ("y", Value::Null), ("z", Value::Null)]
            .into_iter()
            .collect();
        assert_eq!(fields.remove("y"), Some(Value::Null));
        assert_eq!(fields.remove("y"), None);
        assert_eq!(fields.names().collect::<Vec<_>>(), vec!["x", "z"]);
        assert!(!fields.contains_key("y"));
    }

    #[test]
    fn order_is_significant() {
        let a: Fields = vec![("x", Value::Null), ("y", Value::Null)].into_iter().collect();
        let b: Fields = vec![("y", Value::Null), ("x", Value::Null)].into_iter().collect();
        assert_ne!(a, b);
    }
}
