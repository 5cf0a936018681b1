//! Property projection from domain models onto resource objects.
//!
//! Only scalar fields (strings, numbers, booleans) and non-empty arrays made
//! entirely of scalars are copied. Nested objects, `null`, empty arrays and
//! arrays holding anything but scalars are skipped; those belong in `_embedded`.

use crate::hal::{ResourceObject, is_reserved_key};
use serde::Serialize;
use serde_json::{Map, Value};

/// `true` when `value` is copied by [`copy_primitive_properties`].
#[must_use]
pub fn is_primitive_value(value: &Value) -> bool {
    match value {
        Value::String(_) | Value::Number(_) | Value::Bool(_) => true,
        Value::Array(items) => !items.is_empty() && items.iter().all(is_scalar),
        Value::Null | Value::Object(_) => false,
    }
}

const fn is_scalar(value: &Value) -> bool {
    matches!(value, Value::String(_) | Value::Number(_) | Value::Bool(_))
}

/// Copy the primitive fields of `source` onto `target`, overwriting existing
/// properties with the same key.
pub fn copy_primitive_properties(source: &Map<String, Value>, target: &mut ResourceObject) {
    for (key, value) in source {
        if is_primitive_value(value) && !is_reserved_key(key) {
            target.set_property(key.clone(), value.clone());
        }
    }
}

/// Serialize `model` into a JSON object map.
///
/// Models that do not serialize to an object yield an empty map.
#[must_use]
pub fn to_property_map<T: Serialize + ?Sized>(model: &T) -> Map<String, Value> {
    match serde_json::to_value(model) {
        Ok(Value::Object(map)) => map,
        Ok(_) => Map::new(),
        Err(error) => {
            tracing::warn!(error = %error, "Model could not be serialized for projection");
            Map::new()
        }
    }
}

/// Turns a model into the properties of its resource object.
pub trait PropertyProjector<T: ?Sized> {
    /// Properties to copy for `model`.
    fn project(&self, model: &T) -> Map<String, Value>;
}

/// Default projector: every primitive field of the serialized model.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrimitiveProjector;

impl<T: Serialize + ?Sized> PropertyProjector<T> for PrimitiveProjector {
    fn project(&self, model: &T) -> Map<String, Value> {
        to_property_map(model)
            .into_iter()
            .filter(|(key, value)| is_primitive_value(value) && !is_reserved_key(key))
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scalars_and_scalar_arrays_are_primitive() {
        assert!(is_primitive_value(&json!("a")));
        assert!(is_primitive_value(&json!(1.5)));
        assert!(is_primitive_value(&json!(false)));
        assert!(is_primitive_value(&json!(["a", "b"])));
        assert!(!is_primitive_value(&json!([])));
        assert!(!is_primitive_value(&json!([{ "a": 1 }])));
        assert!(!is_primitive_value(&json!(["a", { "a": 1 }])));
        assert!(!is_primitive_value(&json!([1, null])));
        assert!(!is_primitive_value(&json!([1, [2]])));
        assert!(!is_primitive_value(&json!({ "a": 1 })));
        assert!(!is_primitive_value(&Value::Null));
    }

    #[test]
    fn nested_objects_are_not_copied() {
        let source = json!({
            "id": "1",
            "tags": ["x"],
            "author": { "name": "n" },
            "missing": null
        });
        let mut target = ResourceObject::new("/r/1");
        copy_primitive_properties(source.as_object().unwrap(), &mut target);

        assert_eq!(target.property("id"), Some(&json!("1")));
        assert_eq!(target.property("tags"), Some(&json!(["x"])));
        assert!(!target.has_property("author"));
        assert!(!target.has_property("missing"));
    }

    #[test]
    fn mixed_arrays_are_not_copied() {
        let source = json!({ "tags": ["a", { "secret": { "deep": 1 } }], "ids": [1, 2] });
        let mut target = ResourceObject::new("/r/1");
        copy_primitive_properties(source.as_object().unwrap(), &mut target);

        assert!(!target.has_property("tags"));
        assert_eq!(target.property("ids"), Some(&json!([1, 2])));
    }

    #[test]
    fn primitive_projector_skips_non_objects() {
        assert!(PrimitiveProjector.project(&42).is_empty());
        let projected = PrimitiveProjector.project(&json!({ "a": 1, "b": { "c": 2 } }));
        assert_eq!(projected.len(), 1);
    }
}
