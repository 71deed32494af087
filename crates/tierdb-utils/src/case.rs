use convert_case::{Case, Casing};
use thiserror::Error as ThisError;

///
/// CaseError
///

#[derive(Debug, Eq, PartialEq, ThisError)]
pub enum CaseError {
    #[error("class name is empty")]
    Empty,

    #[error("class name '{0}' must begin with an uppercase ASCII letter")]
    LeadingNotUpper(String),

    #[error("class name '{name}' contains invalid character '{ch}'; only ASCII alphanumerics are allowed")]
    InvalidChar { name: String, ch: char },
}

/// Check that `s` is an UpperCamelCase class identifier (`[A-Z][A-Za-z0-9]*`).
pub fn validate_camel_case(s: &str) -> Result<(), CaseError> {
    let mut chars = s.chars();

    match chars.next() {
        None => return Err(CaseError::Empty),
        Some(first) if !first.is_ascii_uppercase() => {
            return Err(CaseError::LeadingNotUpper(s.to_string()));
        }
        Some(_) => {}
    }

    if let Some(ch) = chars.find(|c| !c.is_ascii_alphanumeric()) {
        return Err(CaseError::InvalidChar {
            name: s.to_string(),
            ch,
        });
    }

    Ok(())
}

///
/// from_camel_case
///
/// Convert a class identifier into the store's naming convention.
/// Every uppercase letter becomes lowercase and, unless it starts the
/// identifier, is preceded by an underscore:
///
/// - `TableName` -> `table_name`
/// - `ABC` -> `a_b_c`
/// - `Scan2D` -> `scan2_d`
///

pub fn from_camel_case(s: &str) -> Result<String, CaseError> {
    validate_camel_case(s)?;

    let mut out = String::with_capacity(s.len() + 4);
    for (i, ch) in s.chars().enumerate() {
        if ch.is_ascii_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }

    Ok(out)
}

/// Convert a snake_case table segment back into a class identifier.
/// Only underscores are treated as word boundaries.
#[must_use]
pub fn to_camel_case(s: &str) -> String {
    s.from_case(Case::Snake).to_case(Case::Pascal)
}

///
/// TESTS
///
