//! Serialization for fieldpath types.

use super::path::PathElement;
use super::set::Set;
use crate::value::{Field, FieldList, Value};
use serde_json;

/// Error type for serialization/deserialization.
#[derive(Debug, Clone)]
pub struct SerializeError {
    pub message: String,
}

impl SerializeError {
    pub fn new(message: impl Into<String>) -> Self {
        SerializeError {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for SerializeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for SerializeError {}

/// Serializes a PathElement to its string representation.
///
/// Format:
/// - FieldName: "f:name"
/// - Value: "v:json_value"
/// - Key: "k:{json_object}"
/// - Index: "i:number"
pub fn serialize_path_element(pe: &PathElement) -> Result<String, SerializeError> {
    match pe {
        PathElement::FieldName(name) => Ok(format!("f:{}", name)),
        PathElement::Value(v) => {
            let json = value_to_json(v)?;
            Ok(format!("v:{}", json))
        }
        PathElement::Key(fields) => {
            let json = field_list_to_json(fields)?;
            Ok(format!("k:{}", json))
        }
        PathElement::Index(i) => Ok(format!("i:{}", i)),
    }
}

/// Deserializes a PathElement from its string representation.
pub fn deserialize_path_element(s: &str) -> Result<PathElement, SerializeError> {
    if s.len() < 2 {
        return Err(SerializeError::new("key must be at least 2 characters long"));
    }

    let prefix = &s[..2];
    let content = &s[2..];

    match prefix {
        "f:" => Ok(PathElement::FieldName(content.to_string())),
        "v:" => {
            let v = json_to_value(content)?;
            Ok(PathElement::Value(v))
        }
        "k:" => {
            let fields = json_to_field_list(content)?;
            Ok(PathElement::Key(fields))
        }
        "i:" => {
            let i = content
                .parse::<i32>()
                .map_err(|e| SerializeError::new(format!("invalid index: {}", e)))?;
            Ok(PathElement::Index(i))
        }
        _ => Err(SerializeError::new(format!(
            "unknown path element type: {}",
            prefix
        ))),
    }
}

/// Converts a Value to JSON string.
fn value_to_json(v: &Value) -> Result<String, SerializeError> {
    let json_value = value_to_serde_json(v);
    serde_json::to_string(&json_value).map_err(|e| SerializeError::new(format!("JSON error: {}", e)))
}

/// Converts a Value to serde_json::Value.
fn value_to_serde_json(v: &Value) -> serde_json::Value {
    match v {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Int(i) => serde_json::Value::Number((*i).into()),
        Value::Float(f) => {
            if let Some(n) = serde_json::Number::from_f64(*f) {
                serde_json::Value::Number(n)
            } else {
                serde_json::Value::Null
            }
        }
        Value::String(s) => serde_json::Value::String(s.to_string()),
        Value::List(items) => {
            let arr: Vec<serde_json::Value> = items.iter().map(value_to_serde_json).collect();
            serde_json::Value::Array(arr)
        }
        Value::Map(map) => {
            let obj: serde_json::Map<String, serde_json::Value> = map
                .iter()
                .map(|(k, v)| (k.clone(), value_to_serde_json(v)))
                .collect();
            serde_json::Value::Object(obj)
        }
    }
}

/// Converts a FieldList to JSON string.
fn field_list_to_json(fields: &FieldList) -> Result<String, SerializeError> {
    let mut obj = serde_json::Map::new();
    for field in &fields.fields {
        obj.insert(field.name.clone(), value_to_serde_json(&field.value));
    }
    serde_json::to_string(&serde_json::Value::Object(obj))
        .map_err(|e| SerializeError::new(format!("JSON error: {}", e)))
}

/// Converts a JSON string to Value.
fn json_to_value(s: &str) -> Result<Value, SerializeError> {
    let json_value: serde_json::Value =
        serde_json::from_str(s).map_err(|e| SerializeError::new(format!("JSON parse error: {}", e)))?;
    Ok(serde_json_to_value(&json_value))
}

/// Converts serde_json::Value to Value.
fn serde_json_to_value(v: &serde_json::Value) -> Value {
    match v {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Int(i)
            } else if let Some(f) = n.as_f64() {
                Value::Float(f)
            } else {
                Value::Null
            }
        }
        serde_json::Value::String(s) => Value::String(s.clone()),
        serde_json::Value::Array(arr) => {
            let items: Vec<Value> = arr.iter().map(serde_json_to_value).collect();
            Value::List(items)
        }
        serde_json::Value::Object(obj) => {
            let mut map = crate::value::Map::new();
            for (k, v) in obj {
                map.set(k.clone(), serde_json_to_value(v));
            }
            Value::Map(map)
        }
    }
}

/// Converts a JSON string to FieldList.
fn json_to_field_list(s: &str) -> Result<FieldList, SerializeError> {
    let json_value: serde_json::Value =
        serde_json::from_str(s).map_err(|e| SerializeError::new(format!("JSON parse error: {}", e)))?;

    match json_value {
        serde_json::Value::Object(obj) => {
            let mut fields: Vec<Field> = obj
                .into_iter()
                .map(|(name, v)| Field {
                    name,
                    value: serde_json_to_value(&v),
                })
                .collect();
            fields.sort_by(|a, b| a.name.cmp(&b.name));
            Ok(FieldList { fields })
        }
        _ => Err(SerializeError::new("expected JSON object for key")),
    }
}

/// Serializes a Set to JSON bytes.
impl Set {
    pub fn to_json(&self) -> Result<Vec<u8>, SerializeError> {
        let json_obj = self.to_json_object(false)?;
        serde_json::to_vec(&json_obj).map_err(|e| SerializeError::new(format!("JSON error: {}", e)))
    }

    /// Deserializes a Set from JSON bytes.
    pub fn from_json(data: &[u8]) -> Result<Set, SerializeError> {
        let json_value: serde_json::Value =
            serde_json::from_slice(data).map_err(|e| SerializeError::new(format!("JSON parse error: {}", e)))?;

        match json_value {
            serde_json::Value::Object(obj) => Self::from_json_object(obj),
            _ => Err(SerializeError::new("expected JSON object")),
        }
    }

    fn to_json_object(&self, include_self: bool) -> Result<serde_json::Map<String, serde_json::Value>, SerializeError> {
        let mut result = serde_json::Map::new();

        // If we need to mark the current path as being in the set
        if include_self && !(self.members.is_empty() && self.children.is_empty()) {
            result.insert(".".to_string(), serde_json::Value::Object(serde_json::Map::new()));
        }

        // Merge members and children in sorted order
        let mut all_elements: Vec<(&PathElement, Option<&Set>)> = Vec::new();

        // Add members (with None for child set)
        for member in self.members.iter() {
            all_elements.push((member, None));
        }

        // Add children
        for (pe, child) in &self.children {
            all_elements.push((pe, Some(child)));
        }

        // Sort by path element
        all_elements.sort_by(|(a, _), (b, _)| a.cmp(b));

        // Deduplicate and merge where both member and child exist
        let mut i = 0;
        while i < all_elements.len() {
            let (pe, child) = &all_elements[i];
            let key = serialize_path_element(pe)?;

            // Check if next element is the same path element
            let has_child_next = i + 1 < all_elements.len()
                && all_elements[i + 1].0 == *pe
                && all_elements[i + 1].1.is_some();

            if child.is_some() {
                // This is a child set
                let child_obj = child.unwrap().to_json_object(false)?;
                result.insert(key, serde_json::Value::Object(child_obj));
            } else if has_child_next {
                // This is a member but next is the child - emit with include_self=true
                let child_set = all_elements[i + 1].1.unwrap();
                let child_obj = child_set.to_json_object(true)?;
                result.insert(key, serde_json::Value::Object(child_obj));
                i += 1; // Skip the child entry
            } else {
                // Just a member with no children
                result.insert(key, serde_json::Value::Object(serde_json::Map::new()));
            }

            i += 1;
        }

        Ok(result)
    }

    fn from_json_object(obj: serde_json::Map<String, serde_json::Value>) -> Result<Set, SerializeError> {
        let mut set = Set::new();

        for (key, value) in obj {
            if key == "." {
                // Mark current path as in set (handled at parent level)
                continue;
            }

            // Try to parse the path element
            let pe = match deserialize_path_element(&key) {
                Ok(pe) => pe,
                Err(e) => {
                    // Skip unknown path element types (for forward compatibility)
                    if e.message.starts_with("unknown path element type") {
                        continue;
                    }
                    return Err(e);
                }
            };

            // Parse the child object
            match value {
                serde_json::Value::Object(child_obj) => {
                    if child_obj.is_empty() {
                        // Empty object means this is just a member
                        set.members.insert(pe);
                    } else {
                        // Check if "." is present (means this path is also a member)
                        let is_member = child_obj.contains_key(".");

                        // Parse children
                        let child_set = Self::from_json_object(child_obj)?;

                        if is_member {
                            set.members.insert(pe.clone());
                        }

                        if !child_set.is_empty() {
                            set.children.insert(pe, child_set);
                        }
                    }
                }
                _ => {
                    return Err(SerializeError::new(format!(
                        "expected object value for key: {}",
                        key
                    )));
                }
            }
        }

        Ok(set)
    }
}
