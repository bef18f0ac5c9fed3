//! JSON object flattening.

use serde_json::{Map, Value};

/// Flatten nested objects into dot-separated keys.
///
/// Arrays are kept under their own path; object elements inside an array
/// are flattened independently. A scalar at the root is stored under the
/// empty key.
pub fn flatten(value: &Value) -> Map<String, Value> {
    let mut result = Map::new();
    flatten_into(value, &mut result, "");
    result
}

fn flatten_into(value: &Value, result: &mut Map<String, Value>, prefix: &str) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                flatten_into(child, result, &path);
            }
        }
        Value::Array(items) => {
            let items = items
                .iter()
                .map(|item| match item {
                    Value::Object(_) => Value::Object(flatten(item)),
                    other => other.clone(),
                })
                .collect();
            result.insert(prefix.to_string(), Value::Array(items));
        }
        scalar => {
            result.insert(prefix.to_string(), scalar.clone());
        }
    }
}

/// Remove each of `properties` from `object` if present.
pub fn remove_properties<S: AsRef<str>>(object: &mut Map<String, Value>, properties: &[S]) {
    for property in properties {
        object.remove(property.as_ref());
    }
}
