use crate::{
    PART_SEPARATOR, err,
    error::ErrorTree,
    node::{Def, Heading, MasterRef, NodeError, ValidateNode, VisitableNode},
    types::Tier,
    visit::Visitor,
};
use serde::{Deserialize, Serialize};
use tierdb_primitives::Row;

///
/// TableDef
///
/// One user table: identity, tier, heading, and tier-specific extras.
/// Part tables are nested under their master in `parts`; `master` holds
/// the back-reference once it has been bound.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct TableDef {
    pub def: Def,
    pub tier: Tier,
    pub heading: Heading,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub master: Option<MasterRef>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parts: Vec<Self>,

    /// Seed rows for Lookup tables.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contents: Vec<Row>,
}

impl TableDef {
    #[must_use]
    pub fn new(ident: impl Into<String>, tier: Tier, heading: Heading) -> Self {
        Self {
            def: Def::new(ident),
            tier,
            heading,
            master: None,
            parts: Vec::new(),
            contents: Vec::new(),
        }
    }

    #[must_use]
    pub fn manual(ident: impl Into<String>, heading: Heading) -> Self {
        Self::new(ident, Tier::Manual, heading)
    }

    #[must_use]
    pub fn lookup(ident: impl Into<String>, heading: Heading) -> Self {
        Self::new(ident, Tier::Lookup, heading)
    }

    #[must_use]
    pub fn imported(ident: impl Into<String>, heading: Heading) -> Self {
        Self::new(ident, Tier::Imported, heading)
    }

    #[must_use]
    pub fn computed(ident: impl Into<String>, heading: Heading) -> Self {
        Self::new(ident, Tier::Computed, heading)
    }

    #[must_use]
    pub fn part(ident: impl Into<String>, heading: Heading) -> Self {
        Self::new(ident, Tier::Part, heading)
    }

    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.def.comment = Some(comment.into());
        self
    }

    #[must_use]
    pub fn with_contents(mut self, contents: impl IntoIterator<Item = Row>) -> Self {
        self.contents.extend(contents);
        self
    }

    /// Nest `parts` under this table and bind each one's master reference.
    #[must_use]
    pub fn with_parts(mut self, parts: impl IntoIterator<Item = Self>) -> Self {
        self.parts.extend(parts);
        self.rebind_parts();
        self
    }

    /// Refresh the master reference of every nested part from `self`.
    pub fn rebind_parts(&mut self) {
        let master = MasterRef::capture(self);
        for part in &mut self.parts {
            part.master = Some(master.clone());
        }
    }

    /// Explicitly attach `master` as this part table's owner.
    pub fn bind_master(&mut self, master: &Self) -> Result<(), NodeError> {
        if !self.tier.is_part() {
            return Err(NodeError::NotAPart {
                ident: self.def.ident.clone(),
                tier: self.tier,
            });
        }
        if master.tier.is_part() {
            return Err(NodeError::PartAsMaster {
                ident: master.def.ident.clone(),
            });
        }

        self.master = Some(MasterRef::capture(master));

        Ok(())
    }

    /// The owning master; fails if this part has not been bound.
    pub fn master(&self) -> Result<&MasterRef, NodeError> {
        self.master.as_ref().ok_or_else(|| NodeError::MissingMaster {
            part: self.def.ident.clone(),
        })
    }

    ///
    /// table_name
    ///
    /// Physical name derived from the class identifier and tier:
    /// `subject`, `#subject`, `_subject`, `__subject`, or for a part
    /// `<master table name>__<part>`.
    ///

    pub fn table_name(&self) -> Result<String, NodeError> {
        let converted = self.def.converted()?;

        match self.tier.table_name(&converted) {
            Some(name) => Ok(name),
            None => {
                let master = self.master()?;

                Ok(format!("{}{PART_SEPARATOR}{converted}", master.table_name()?))
            }
        }
    }
}

impl ValidateNode for TableDef {
    fn validate(&self) -> Result<(), ErrorTree> {
        let mut errs = ErrorTree::new();

        if let Err(e) = self.def.converted() {
            errs.add(e);
        }

        // master
        match (self.tier, &self.master) {
            (Tier::Part, None) => errs.add(NodeError::MissingMaster {
                part: self.def.ident.clone(),
            }),
            (Tier::Part, Some(master)) if master.tier.is_part() => {
                errs.add(NodeError::PartAsMaster {
                    ident: master.ident.clone(),
                });
            }
            (tier, Some(_)) if !tier.is_part() => errs.add(NodeError::NotAPart {
                ident: self.def.ident.clone(),
                tier,
            }),
            _ => {}
        }

        // parts
        if self.tier.is_part() && !self.parts.is_empty() {
            err!(errs, "part table '{}' cannot declare parts of its own", self.def.ident);
        }
        for part in &self.parts {
            if !part.tier.is_part() {
                err!(
                    errs,
                    "nested table '{}' is a {} table; only part tables can be nested",
                    part.def.ident,
                    part.tier
                );
            }
        }

        // contents
        if !self.contents.is_empty() && self.tier != Tier::Lookup {
            err!(errs, "only lookup tables can declare contents, found {} table", self.tier);
        }
        for (i, row) in self.contents.iter().enumerate() {
            for name in row.keys() {
                if self.heading.get(name).is_none() {
                    err!(errs, "contents row {i} has unknown attribute '{name}'");
                }
            }
            for key in self.heading.primary_key_names() {
                if row.get(key).is_none_or(tierdb_primitives::Value::is_null) {
                    err!(errs, "contents row {i} is missing primary key attribute '{key}'");
                }
            }
        }

        errs.result()
    }
}

impl VisitableNode for Heading {
    fn route_key(&self) -> String {
        "heading".to_string()
    }
}

impl VisitableNode for TableDef {
    fn route_key(&self) -> String {
        self.def.ident.clone()
    }

    fn drive<V: Visitor>(&self, v: &mut V) {
        self.heading.accept(v);
        for part in &self.parts {
            part.accept(v);
        }
    }
}

///
/// TESTS
///
