use crate::{
    node::{NodeError, TableDef},
    types::Tier,
};
use serde::{Deserialize, Serialize};
use tierdb_utils::case::from_camel_case;

///
/// MasterRef
///
/// Back-reference from a part table to its owning master. It is filled in
/// by whatever builds the master (`TableDef::with_parts`, `Schema::insert`)
/// or explicitly through `TableDef::bind_master`; it is never looked up
/// implicitly.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct MasterRef {
    pub ident: String,
    pub tier: Tier,
    pub primary_key: Vec<String>,
}

impl MasterRef {
    /// Snapshot the parts of `master` a part table depends on.
    #[must_use]
    pub fn capture(master: &TableDef) -> Self {
        Self {
            ident: master.def.ident.clone(),
            tier: master.tier,
            primary_key: master
                .heading
                .primary_key_names()
                .map(ToString::to_string)
                .collect(),
        }
    }

    /// Physical name of the master table.
    pub fn table_name(&self) -> Result<String, NodeError> {
        let converted = from_camel_case(&self.ident)?;

        self.tier
            .table_name(&converted)
            .ok_or_else(|| NodeError::PartAsMaster {
                ident: self.ident.clone(),
            })
    }
}
