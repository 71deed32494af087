use crate::{err, error::ErrorTree, node::ValidateNode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tierdb_primitives::AttributeType;

///
/// Attribute
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Attribute {
    pub name: String,
    pub ty: AttributeType,

    #[serde(default)]
    pub nullable: bool,
}

impl Attribute {
    #[must_use]
    pub fn new(name: impl Into<String>, ty: AttributeType) -> Self {
        Self {
            name: name.into(),
            ty,
            nullable: false,
        }
    }
}

///
/// Heading
///
/// Ordered primary-key attributes followed by dependent attributes.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Heading {
    pub primary_key: Vec<Attribute>,

    #[serde(default)]
    pub attributes: Vec<Attribute>,
}

impl Heading {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a primary-key attribute.
    #[must_use]
    pub fn key(mut self, name: impl Into<String>, ty: AttributeType) -> Self {
        self.primary_key.push(Attribute::new(name, ty));
        self
    }

    /// Append a required dependent attribute.
    #[must_use]
    pub fn attr(mut self, name: impl Into<String>, ty: AttributeType) -> Self {
        self.attributes.push(Attribute::new(name, ty));
        self
    }

    /// Append a nullable dependent attribute.
    #[must_use]
    pub fn nullable(mut self, name: impl Into<String>, ty: AttributeType) -> Self {
        self.attributes.push(Attribute {
            nullable: true,
            ..Attribute::new(name, ty)
        });
        self
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Attribute> {
        self.iter().find(|a| a.name == name)
    }

    #[must_use]
    pub fn is_key(&self, name: &str) -> bool {
        self.primary_key.iter().any(|a| a.name == name)
    }

    pub fn primary_key_names(&self) -> impl Iterator<Item = &str> {
        self.primary_key.iter().map(|a| a.name.as_str())
    }

    /// All attributes, primary key first.
    pub fn iter(&self) -> impl Iterator<Item = &Attribute> {
        self.primary_key.iter().chain(&self.attributes)
    }
}

impl ValidateNode for Heading {
    fn validate(&self) -> Result<(), ErrorTree> {
        let mut errs = ErrorTree::new();

        if self.primary_key.is_empty() {
            err!(errs, "heading must declare at least one primary key attribute");
        }

        let mut seen = BTreeSet::new();
        for attr in self.iter() {
            if !is_attribute_name(&attr.name) {
                err!(
                    errs,
                    "attribute name '{}' must be lower snake_case starting with a letter",
                    attr.name
                );
            }
            if !seen.insert(attr.name.as_str()) {
                err!(errs, "duplicate attribute '{}'", attr.name);
            }
        }

        for attr in &self.primary_key {
            if attr.nullable {
                err!(errs, "primary key attribute '{}' cannot be nullable", attr.name);
            }
        }

        errs.result()
    }
}

fn is_attribute_name(name: &str) -> bool {
    name.chars().next().is_some_and(|c| c.is_ascii_lowercase())
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

///
/// TESTS
///
