mod def;
mod heading;
mod master;
mod schema;
mod table;

pub use def::*;
pub use heading::*;
pub use master::*;
pub use schema::*;
pub use table::*;

use crate::{error::ErrorTree, visit::Visitor};
use thiserror::Error as ThisError;
use tierdb_utils::case::CaseError;

///
/// NodeError
///

#[derive(Debug, Eq, PartialEq, ThisError)]
#[remain::sorted]
pub enum NodeError {
    #[error(transparent)]
    InvalidIdent(#[from] CaseError),

    #[error("part table '{part}' has no master; part tables must be declared inside a master table")]
    MissingMaster { part: String },

    #[error("table '{ident}' is a {tier} table; only part tables have a master")]
    NotAPart { ident: String, tier: crate::types::Tier },

    #[error("table '{ident}' is a part table and cannot be a master")]
    PartAsMaster { ident: String },
}

///
/// ValidateNode
/// local, structural checks for a single node
///

pub trait ValidateNode {
    fn validate(&self) -> Result<(), ErrorTree> {
        Ok(())
    }
}

///
/// VisitableNode
///

pub trait VisitableNode: ValidateNode {
    /// Route segment used when reporting errors for this node.
    fn route_key(&self) -> String;

    /// Visit child nodes.
    fn drive<V: Visitor>(&self, _: &mut V) {}

    fn accept<V: Visitor>(&self, visitor: &mut V)
    where
        Self: Sized,
    {
        visitor.push(&self.route_key());
        visitor.visit(self);
        self.drive(visitor);
        visitor.pop();
    }
}
