use crate::node::NodeError;
use serde::{Deserialize, Serialize};
use tierdb_utils::case::from_camel_case;

///
/// Def
///
/// Identity of a user table: its CamelCase class identifier plus an
/// optional description carried into diagnostics.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Def {
    pub ident: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl Def {
    #[must_use]
    pub fn new(ident: impl Into<String>) -> Self {
        Self {
            ident: ident.into(),
            comment: None,
        }
    }

    /// Class identifier in the store's naming convention.
    pub fn converted(&self) -> Result<String, NodeError> {
        Ok(from_camel_case(&self.ident)?)
    }
}
