use schemars::{schema_for, JsonSchema};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Types that can describe themselves as a strict JSON schema.
///
/// Used to tell a model exactly which JSON object to answer with. The
/// generated schema closes every object (`additionalProperties: false`) and
/// lists all properties as required, which is what OpenAI's strict mode wants
/// and what weaker models follow most reliably when it is pasted into a prompt.
pub trait StructuredOutput: JsonSchema + DeserializeOwned {
    fn strict_schema() -> Value {
        let mut value = serde_json::to_value(schema_for!(Self)).unwrap_or_default();
        close_objects(&mut value);
        if let Value::Object(map) = &mut value {
            map.remove("$schema");
            map.remove("definitions");
            map.remove("title");
        }
        value
    }
}

impl<T: JsonSchema + DeserializeOwned> StructuredOutput for T {}

fn close_objects(value: &mut Value) {
    match value {
        Value::Object(map) => {
            if map.get("type").and_then(Value::as_str) == Some("object") {
                map.insert("additionalProperties".into(), Value::Bool(false));
                let keys: Option<Vec<Value>> = map
                    .get("properties")
                    .and_then(Value::as_object)
                    .map(|props| props.keys().cloned().map(Value::String).collect());
                if let Some(keys) = keys {
                    map.insert("required".into(), Value::Array(keys));
                }
            }
            map.values_mut().for_each(close_objects);
        }
        Value::Array(items) => items.iter_mut().for_each(close_objects),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize, JsonSchema)]
    #[allow(dead_code)]
    struct Rating {
        score: u8,
        reason: Option<String>,
    }

    #[test]
    fn test_schema_is_closed_object() {
        let schema = Rating::strict_schema();
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["additionalProperties"], Value::Bool(false));
        assert!(schema.get("$schema").is_none());
    }

    #[test]
    fn test_optional_fields_are_required() {
        let schema = Rating::strict_schema();
        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(Value::as_str)
            .collect();
        assert!(required.contains(&"score"));
        assert!(required.contains(&"reason"));
    }
}
