use crate::Value;
use derive_more::{Deref, DerefMut, IntoIterator};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

///
/// Row
///
/// One tuple keyed by attribute name.
///

#[derive(
    Clone,
    Debug,
    Default,
    Deref,
    DerefMut,
    Deserialize,
    Eq,
    IntoIterator,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
pub struct Row(BTreeMap<String, Value>);

impl Row {
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Builder-style attribute setter.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    /// Restrict the row to `names`, in order; missing attributes become `Null`.
    #[must_use]
    pub fn project<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> Self {
        Self(
            names
                .into_iter()
                .map(|name| {
                    let value = self.0.get(name).cloned().unwrap_or(Value::Null);
                    (name.to_string(), value)
                })
                .collect(),
        )
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_keeps_requested_attributes_only() {
        let row = Row::new().with("subject_id", 1).with("name", "mouse");
        let key = row.project(["subject_id"]);

        assert_eq!(key.len(), 1);
        assert_eq!(key.get("subject_id"), Some(&Value::Int(1)));
    }

    #[test]
    fn project_fills_missing_with_null() {
        let row = Row::new().with("a", 1);

        assert_eq!(row.project(["b"]).get("b"), Some(&Value::Null));
    }
}
