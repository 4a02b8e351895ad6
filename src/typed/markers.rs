//! Marker-based unset: a sentinel map value that signals intent to relinquish
//! a field rather than to set it, extracted from a value before it reaches the
//! merger proper.

use crate::fieldpath::{Path, PathElement, Set};
use crate::schema::{Atom, ElementRelationship};
use crate::value::{Map, Value};
use super::typed_value::TypedValue;
use super::validation::{ValidationError, ValidationErrors};

/// The single field name that, alone in a map, marks that map as an unset sentinel.
pub const MARKER_KEY: &str = "k8s_io__value";

/// The only value the marker field is ever allowed to carry.
pub const MARKER_UNSET: &str = "unset";

/// Returns true if `value` is exactly the sentinel map `{k8s_io__value: "unset"}`.
pub fn is_marker(value: &Value) -> bool {
    match value {
        Value::Map(m) => {
            m.len() == 1
                && matches!(m.get(MARKER_KEY), Some(Value::String(s)) if s == MARKER_UNSET)
        }
        _ => false,
    }
}

/// Builds the sentinel marker value.
pub fn marker_value() -> Value {
    let mut m = Map::new();
    m.set(MARKER_KEY.to_string(), Value::String(MARKER_UNSET.to_string()));
    Value::Map(m)
}

fn atom_accepts_marker(atom: &Atom, is_associative_entry: bool) -> bool {
    if is_associative_entry {
        return true;
    }
    if atom.scalar.is_some() {
        return true;
    }
    if let Some(ref map) = atom.map {
        return map.element_relationship == ElementRelationship::Atomic;
    }
    if let Some(ref list) = atom.list {
        return list.element_relationship == ElementRelationship::Atomic;
    }
    false
}

/// Outcome of walking a single (value, type) position for markers.
enum Walked {
    /// The position keeps this value (markers, if any, were found deeper down).
    Kept(Value),
    /// The position itself is unset: the caller removes it from its parent and
    /// records the path (the caller decides which path to record, since an
    /// orphaned parent bubbles the unset up instead of recording children).
    Unset,
}

/// Extracts unset markers from a typed value. Returns the value with every
/// marker (and every map/list left with no non-marker descendants) removed,
/// plus the Set of paths the caller asked to unset.
pub fn extract_markers(tv: &TypedValue) -> Result<(TypedValue, Set), ValidationErrors> {
    let mut set = Set::new();
    let mut errors = ValidationErrors::new();

    let walked = walk(
        tv,
        tv.value(),
        tv.type_ref(),
        Path::new(),
        false,
        &mut set,
        &mut errors,
    );

    if !errors.is_empty() {
        return Err(errors);
    }

    let new_value = match walked {
        Walked::Kept(v) => v,
        // The document root is itself a marker or wholly orphaned: nothing survives.
        Walked::Unset => Value::Null,
    };

    Ok((TypedValue::new(new_value, tv.schema().clone(), tv.type_ref().clone()), set))
}

fn walk(
    tv: &TypedValue,
    value: &Value,
    type_ref: &crate::schema::TypeRef,
    path: Path,
    is_associative_entry: bool,
    set: &mut Set,
    errors: &mut ValidationErrors,
) -> Walked {
    let atom = match tv.schema().resolve(type_ref) {
        Some(atom) => atom,
        None => return Walked::Kept(value.clone()),
    };

    if is_marker(value) {
        if atom_accepts_marker(&atom, is_associative_entry) {
            return Walked::Unset;
        }
        errors.add(ValidationError::invalid_value(
            format!("{}", path),
            "unset marker is not valid at this location",
        ));
        return Walked::Kept(value.clone());
    }

    match value {
        Value::Map(fields) => {
            let Some(ref map_atom) = atom.map else {
                return Walked::Kept(value.clone());
            };
            if map_atom.element_relationship == ElementRelationship::Atomic {
                // Atomic interiors are opaque; markers cannot appear inside them.
                return Walked::Kept(value.clone());
            }

            let mut new_map = Map::new();
            let total = fields.len();
            let mut unset_count = 0usize;
            let mut unset_paths = Vec::new();

            for (key, val) in fields.iter() {
                let field_path = path.with(PathElement::field_name(key.clone()));
                let field_type = if let Some(field) = map_atom.find_field(key) {
                    field.field_type.clone()
                } else {
                    map_atom.element_type.clone()
                };

                match walk(tv, val, &field_type, field_path.clone(), false, set, errors) {
                    Walked::Kept(v) => {
                        new_map.set(key.clone(), v);
                    }
                    Walked::Unset => {
                        unset_count += 1;
                        unset_paths.push(field_path);
                    }
                }
            }

            if total > 0 && unset_count == total {
                // Every field was unset: the whole map is orphaned. Bubble a
                // single unset up instead of leaving an empty shell behind.
                return Walked::Unset;
            }

            for p in unset_paths {
                set.insert(&p);
            }
            Walked::Kept(Value::Map(new_map))
        }
        Value::List(items) => {
            let Some(ref list_atom) = atom.list else {
                return Walked::Kept(value.clone());
            };
            if list_atom.element_relationship == ElementRelationship::Atomic {
                return Walked::Kept(value.clone());
            }

            let is_associative = list_atom.element_relationship == ElementRelationship::Associative;
            let mut new_items = Vec::with_capacity(items.len());
            let mut unset_count = 0usize;
            let mut unset_paths = Vec::new();

            for (i, item) in items.iter().enumerate() {
                let pe = if is_associative {
                    if list_atom.keys.is_empty() {
                        PathElement::value(item.clone())
                    } else {
                        match tv.list_item_to_key(item, list_atom) {
                            Ok(key) => PathElement::Key(key),
                            Err(_) => PathElement::index(i as i32),
                        }
                    }
                } else {
                    PathElement::index(i as i32)
                };
                let item_path = path.with(pe);

                match walk(tv, item, &list_atom.element_type, item_path.clone(), is_associative, set, errors) {
                    Walked::Kept(v) => new_items.push(v),
                    Walked::Unset => {
                        unset_count += 1;
                        unset_paths.push(item_path);
                    }
                }
            }

            if !items.is_empty() && unset_count == items.len() {
                return Walked::Unset;
            }

            for p in unset_paths {
                set.insert(&p);
            }
            Walked::Kept(Value::List(new_items))
        }
        _ => Walked::Kept(value.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Atom as SAtom, ElementRelationship, Map as SMap, Scalar, Schema, StructField, TypeDef, TypeRef};

    fn named(name: &str) -> TypeRef {
        TypeRef {
            named_type: Some(name.to_string()),
            ..Default::default()
        }
    }

    fn test_schema() -> Schema {
        Schema::with_types(vec![
            TypeDef {
                name: "Root".to_string(),
                atom: SAtom {
                    map: Some(SMap {
                        fields: vec![
                            StructField {
                                name: "name".to_string(),
                                field_type: named("string"),
                                default: None,
                            },
                            StructField {
                                name: "nested".to_string(),
                                field_type: named("Nested"),
                                default: None,
                            },
                        ],
                        element_relationship: ElementRelationship::Separable,
                        ..Default::default()
                    }),
                    ..Default::default()
                },
            },
            TypeDef {
                name: "Nested".to_string(),
                atom: SAtom {
                    map: Some(SMap {
                        fields: vec![StructField {
                            name: "value".to_string(),
                            field_type: named("string"),
                            default: None,
                        }],
                        element_relationship: ElementRelationship::Separable,
                        ..Default::default()
                    }),
                    ..Default::default()
                },
            },
            TypeDef {
                name: "string".to_string(),
                atom: SAtom {
                    scalar: Some(Scalar::String),
                    ..Default::default()
                },
            },
        ])
    }

    #[test]
    fn test_extract_top_level_marker() {
        let schema = test_schema();
        let mut map = Map::new();
        map.set("name".to_string(), marker_value());
        let mut nested = Map::new();
        nested.set("value".to_string(), Value::String("kept".to_string()));
        map.set("nested".to_string(), Value::Map(nested));
        let tv = TypedValue::new(Value::Map(map), schema, named("Root"));

        let (new_tv, set) = extract_markers(&tv).unwrap();
        assert!(matches!(new_tv.value(), Value::Map(m) if !m.has("name") && m.has("nested")));
        let mut path = Path::new();
        path.push(PathElement::field_name("name"));
        assert!(set.has(&path));
    }

    #[test]
    fn test_orphaned_nested_map_removed_wholesale() {
        let schema = test_schema();
        let mut nested = Map::new();
        nested.set("value".to_string(), marker_value());
        let mut map = Map::new();
        map.set("name".to_string(), Value::String("kept".to_string()));
        map.set("nested".to_string(), Value::Map(nested));
        let tv = TypedValue::new(Value::Map(map), schema, named("Root"));

        let (new_tv, set) = extract_markers(&tv).unwrap();
        assert!(matches!(new_tv.value(), Value::Map(m) if !m.has("nested")));
        let mut path = Path::new();
        path.push(PathElement::field_name("nested"));
        assert!(set.has(&path));
        let mut deeper = path.clone();
        deeper.push(PathElement::field_name("value"));
        assert!(!set.has(&deeper));
    }

    #[test]
    fn test_invalid_location_reports_error() {
        // The document root resolves to a separable map, which is not one of
        // the positions a marker is allowed to occupy.
        let schema = test_schema();
        let tv = TypedValue::new(marker_value(), schema, named("Root"));
        let result = extract_markers(&tv);
        assert!(result.is_err());
    }
}
