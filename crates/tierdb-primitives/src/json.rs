use crate::{Row, Value};
use thiserror::Error as ThisError;

///
/// JsonValueError
///

#[derive(Debug, ThisError)]
pub enum JsonValueError {
    #[error("invalid json: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("expected a json array of objects")]
    NotArrayOfObjects,

    #[error("attribute '{attr}' has unsupported json value {value}")]
    Unsupported {
        attr: String,
        value: serde_json::Value,
    },
}

/// Parse a json array of flat objects into rows, e.g. lookup contents kept
/// alongside the schema.
pub fn rows_from_json(json: &str) -> Result<Vec<Row>, JsonValueError> {
    let parsed: serde_json::Value = serde_json::from_str(json)?;
    let serde_json::Value::Array(items) = parsed else {
        return Err(JsonValueError::NotArrayOfObjects);
    };

    items
        .into_iter()
        .map(|item| {
            let serde_json::Value::Object(fields) = item else {
                return Err(JsonValueError::NotArrayOfObjects);
            };

            fields
                .into_iter()
                .map(|(attr, value)| {
                    let converted = from_json(&value)
                        .ok_or_else(|| JsonValueError::Unsupported {
                            attr: attr.clone(),
                            value,
                        })?;

                    Ok((attr, converted))
                })
                .collect::<Result<Row, _>>()
        })
        .collect()
}

fn from_json(value: &serde_json::Value) -> Option<Value> {
    match value {
        serde_json::Value::Null => Some(Value::Null),
        serde_json::Value::Bool(v) => Some(Value::Bool(*v)),
        serde_json::Value::Number(n) => n
            .as_i64()
            .map(Value::Int)
            .or_else(|| n.as_u64().map(Value::Uint)),
        serde_json::Value::String(s) => Some(Value::Text(s.clone())),
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => None,
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_flat_objects() {
        let json = r#"[{"species": "mouse", "legs": 4}, {"species": "fly", "legs": 6}]"#;
        let rows = rows_from_json(json).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("species"), Some(&Value::from("mouse")));
        assert_eq!(rows[1].get("legs"), Some(&Value::Int(6)));
    }

    #[test]
    fn rejects_nested_and_float_values() {
        assert!(matches!(
            rows_from_json(r#"[{"a": [1]}]"#),
            Err(JsonValueError::Unsupported { .. })
        ));
        assert!(matches!(
            rows_from_json(r#"[{"a": 1.5}]"#),
            Err(JsonValueError::Unsupported { .. })
        ));
        assert!(matches!(
            rows_from_json(r#"{"a": 1}"#),
            Err(JsonValueError::NotArrayOfObjects)
        ));
    }
}
