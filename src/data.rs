use serde::ser::{SerializeMap, SerializeSeq, Serializer};
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::fmt;

use crate::error::ParseError;

/// A single cell of tabular data.
///
/// `Missing` models a key that is absent from a record (a lookup miss), as
/// opposed to `Null` which was present in the input. Parsed datasets only
/// contain `Str`/`Num`/`Null`; `Missing` arises during projection.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Str(String),
    Num(f64),
    Null,
    Missing,
}

impl Value {
    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    /// Numeric view of the value, if it has one.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Num(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => f.write_str(s),
            Value::Num(n) => write!(f, "{}", n),
            Value::Null | Value::Missing => Ok(()),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Str(s) => serializer.serialize_str(s),
            Value::Num(n) => serializer.serialize_f64(*n),
            Value::Null | Value::Missing => serializer.serialize_unit(),
        }
    }
}

/// An immutable table: one header plus positionally aligned rows.
///
/// Every row holds exactly `headers.len()` values in header order. A dataset
/// is built atomically from one input and replaced wholesale on re-upload.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl Dataset {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self { headers, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a field in the header, exact match.
    pub fn field_index(&self, field: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == field)
    }

    /// Create a Dataset from a parsed JSON value.
    ///
    /// An array yields one record per element (each must be an object); a
    /// single object is wrapped as a one-record dataset. The header is the
    /// first object's key order.
    pub fn from_json(value: &JsonValue) -> Result<Self, ParseError> {
        let elements: Vec<&JsonValue> = match value {
            JsonValue::Array(items) => items.iter().collect(),
            JsonValue::Object(_) => vec![value],
            other => {
                return Err(ParseError::EmptyOrInvalid(format!(
                    "expected a JSON object or array of objects, got {}",
                    json_type_name(other)
                )))
            }
        };

        if elements.is_empty() {
            return Err(ParseError::EmptyOrInvalid(
                "JSON array contains no records".to_string(),
            ));
        }

        let first = elements[0].as_object().ok_or_else(|| {
            ParseError::EmptyOrInvalid("items in a JSON array must be objects".to_string())
        })?;
        let headers: Vec<String> = first.keys().cloned().collect();

        let mut rows = Vec::with_capacity(elements.len());
        for item in elements {
            let obj = item.as_object().ok_or_else(|| {
                ParseError::EmptyOrInvalid("items in a JSON array must be objects".to_string())
            })?;

            let mut row = Vec::with_capacity(headers.len());
            for header in &headers {
                let cell = match obj.get(header) {
                    Some(JsonValue::String(s)) => Value::Str(s.clone()),
                    Some(JsonValue::Number(n)) => {
                        // Arbitrary-precision integers outside f64 are out of scope.
                        Value::Num(n.as_f64().ok_or_else(|| {
                            ParseError::EmptyOrInvalid(format!(
                                "number for field '{}' does not fit a float",
                                header
                            ))
                        })?)
                    }
                    Some(JsonValue::Bool(b)) => Value::Str(b.to_string()),
                    Some(JsonValue::Null) | None => Value::Null,
                    Some(other) => {
                        return Err(ParseError::EmptyOrInvalid(format!(
                            "unsupported nested {} for field '{}'",
                            json_type_name(other),
                            header
                        )))
                    }
                };
                row.push(cell);
            }
            rows.push(row);
        }

        Ok(Self { headers, rows })
    }
}

// Serializes to a JSON array of field-name -> value objects, in header order.
impl Serialize for Dataset {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.rows.len()))?;
        for row in &self.rows {
            seq.serialize_element(&RecordRef {
                headers: &self.headers,
                row,
            })?;
        }
        seq.end()
    }
}

struct RecordRef<'a> {
    headers: &'a [String],
    row: &'a [Value],
}

impl Serialize for RecordRef<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.headers.len()))?;
        for (header, value) in self.headers.iter().zip(self.row.iter()) {
            map.serialize_entry(header, value)?;
        }
        map.end()
    }
}

fn json_type_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_array() {
        let value = json!([
            {"name": "Alice", "score": 10},
            {"name": "Bob", "score": 7}
        ]);
        let data = Dataset::from_json(&value).unwrap();
        assert_eq!(data.headers, vec!["name", "score"]);
        assert_eq!(data.rows.len(), 2);
        assert_eq!(data.rows[0][0], Value::Str("Alice".to_string()));
        assert_eq!(data.rows[1][1], Value::Num(7.0));
    }

    #[test]
    fn test_from_json_single_object_wraps() {
        let value = json!({"city": "Oslo", "pop": 709037});
        let data = Dataset::from_json(&value).unwrap();
        assert_eq!(data.rows.len(), 1);
        assert_eq!(data.headers, vec!["city", "pop"]);
    }

    #[test]
    fn test_from_json_header_preserves_key_order() {
        let value = json!([{"z": 1, "a": 2, "m": 3}]);
        let data = Dataset::from_json(&value).unwrap();
        assert_eq!(data.headers, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_from_json_non_object_element() {
        let value = json!([{"a": 1}, 42]);
        let err = Dataset::from_json(&value).unwrap_err();
        assert!(matches!(err, ParseError::EmptyOrInvalid(_)));
    }

    #[test]
    fn test_from_json_empty_array() {
        let value = json!([]);
        let err = Dataset::from_json(&value).unwrap_err();
        assert!(matches!(err, ParseError::EmptyOrInvalid(_)));
    }

    #[test]
    fn test_from_json_missing_key_is_null() {
        let value = json!([{"a": 1, "b": 2}, {"a": 3}]);
        let data = Dataset::from_json(&value).unwrap();
        assert_eq!(data.rows[1], vec![Value::Num(3.0), Value::Null]);
    }

    #[test]
    fn test_from_json_bool_is_stringified() {
        let value = json!([{"flag": true}]);
        let data = Dataset::from_json(&value).unwrap();
        assert_eq!(data.rows[0][0], Value::Str("true".to_string()));
    }

    #[test]
    fn test_from_json_nested_rejected() {
        let value = json!([{"a": {"nested": 1}}]);
        assert!(Dataset::from_json(&value).is_err());
    }

    #[test]
    fn test_value_display() {
        assert_eq!(Value::Str("x".to_string()).to_string(), "x");
        assert_eq!(Value::Num(42.0).to_string(), "42");
        assert_eq!(Value::Null.to_string(), "");
        assert_eq!(Value::Missing.to_string(), "");
    }
}
