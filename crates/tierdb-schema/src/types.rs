use crate::PART_SEPARATOR;
use derive_more::{Display, FromStr};
use serde::{Deserialize, Serialize};
use std::fmt;
use tierdb_utils::case::{from_camel_case, to_camel_case};

///
/// Tier
///
/// How a table's rows come to exist. The tier decides the physical name
/// prefix; `Part` tables take their name from their master instead.
///

#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    FromStr,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
pub enum Tier {
    /// Rows are entered by hand.
    #[default]
    Manual,
    /// Small reference tables, optionally seeded from `contents`.
    Lookup,
    /// Rows are pulled in from external sources by auto-population.
    Imported,
    /// Rows are computed from other tables by auto-population.
    Computed,
    /// Rows are details of an entry in a master table.
    Part,
}

impl Tier {
    pub const ALL: [Self; 5] = [
        Self::Manual,
        Self::Lookup,
        Self::Imported,
        Self::Computed,
        Self::Part,
    ];

    /// Physical name prefix; empty for `Manual` and `Part`.
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Manual | Self::Part => "",
            Self::Lookup => "#",
            Self::Imported => "_",
            Self::Computed => "__",
        }
    }

    #[must_use]
    pub const fn is_part(self) -> bool {
        matches!(self, Self::Part)
    }

    /// Imported and Computed tables are filled by `populate`, not by hand.
    #[must_use]
    pub const fn is_auto_populated(self) -> bool {
        matches!(self, Self::Imported | Self::Computed)
    }

    /// Name of a non-part table whose class name converts to `converted`.
    /// Returns `None` for `Part`, which needs its master's name.
    #[must_use]
    pub fn table_name(self, converted: &str) -> Option<String> {
        if self.is_part() {
            return None;
        }

        Some(format!("{}{converted}", self.prefix()))
    }
}

///
/// TableName
///
/// A physical table name broken back into its parts.
///
/// `#subject_type` parses as a Lookup named `SubjectType`;
/// `_scan__channel` parses as the Part `Channel` of the Imported `Scan`.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TableName {
    pub tier: Tier,
    pub class_name: String,
    pub master: Option<Box<Self>>,
}

impl TableName {
    /// Parse a physical table name; returns `None` if it does not follow
    /// the tier naming convention.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        let (tier, rest) = if let Some(rest) = name.strip_prefix("__") {
            (Tier::Computed, rest)
        } else if let Some(rest) = name.strip_prefix('_') {
            (Tier::Imported, rest)
        } else if let Some(rest) = name.strip_prefix('#') {
            (Tier::Lookup, rest)
        } else {
            (Tier::Manual, name)
        };

        match rest.split_once(PART_SEPARATOR) {
            None => Some(Self {
                tier,
                class_name: segment_class_name(rest)?,
                master: None,
            }),
            Some((master, part)) => Some(Self {
                tier: Tier::Part,
                class_name: segment_class_name(part)?,
                master: Some(Box::new(Self {
                    tier,
                    class_name: segment_class_name(master)?,
                    master: None,
                })),
            }),
        }
    }

    /// Tier of the outermost master (or of the table itself if not a part).
    #[must_use]
    pub fn root_tier(&self) -> Tier {
        self.master.as_ref().map_or(self.tier, |m| m.root_tier())
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let converted = segment_of(&self.class_name);
        match &self.master {
            Some(master) => write!(f, "{master}{PART_SEPARATOR}{converted}"),
            None => write!(f, "{}{converted}", self.tier.prefix()),
        }
    }
}

// segment_class_name
// a segment is valid only if it is exactly what its class name converts to
fn segment_class_name(segment: &str) -> Option<String> {
    let class_name = to_camel_case(segment);

    (from_camel_case(&class_name).ok()? == segment).then_some(class_name)
}

fn segment_of(class_name: &str) -> String {
    from_camel_case(class_name).unwrap_or_else(|_| class_name.to_string())
}

///
/// TESTS
///
