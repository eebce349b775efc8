//! Schema validation helpers – compiled into WASM.

use crate::models::JsonMap;
use jsonschema::{Draft, JSONSchema};
use serde_json::Value;

/// Validate an assistant `configurable` against the graph's `config_schema`.
///
/// Schemas that wrap the configurable under `properties.configurable` are
/// checked against `{"configurable": ...}`; flat schemas against the map
/// itself.  A schema that does not compile is skipped (the service remains
/// the authority) and the update goes through.
pub fn validate_configurable(schema: &Value, configurable: &JsonMap) -> Result<(), Vec<String>> {
    let compiled = match JSONSchema::options().with_draft(Draft::Draft202012).compile(schema) {
        Ok(compiled) => compiled,
        Err(e) => {
            crate::warn_log!("Skipping configuration validation, schema does not compile: {}", e);
            return Ok(());
        }
    };

    let wrapped = schema
        .get("properties")
        .and_then(|p| p.get("configurable"))
        .is_some();
    let instance = if wrapped {
        let mut outer = JsonMap::new();
        outer.insert("configurable".to_string(), Value::Object(configurable.clone()));
        Value::Object(outer)
    } else {
        Value::Object(configurable.clone())
    };

    let result = compiled.validate(&instance).map_err(|errors| {
        errors
            .map(|e| {
                let path = e.instance_path.to_string();
                if path.is_empty() {
                    e.to_string()
                } else {
                    format!("{}: {}", path, e)
                }
            })
            .collect::<Vec<_>>()
    });
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(v: Value) -> JsonMap {
        match v {
            Value::Object(m) => m,
            _ => unreachable!(),
        }
    }

    fn schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "model": {"type": "string", "enum": ["small", "large"]},
                "temperature": {"type": "number", "minimum": 0, "maximum": 2}
            }
        })
    }

    #[test]
    fn accepts_conforming_config() {
        assert!(validate_configurable(&schema(), &map(json!({"model": "small", "temperature": 0.5}))).is_ok());
    }

    #[test]
    fn reports_each_violation_with_its_path() {
        let errors = validate_configurable(&schema(), &map(json!({"model": "huge", "temperature": 9}))).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().any(|e| e.starts_with("/model")));
        assert!(errors.iter().any(|e| e.starts_with("/temperature")));
    }

    #[test]
    fn wrapped_schemas_validate_the_configurable_key() {
        let wrapped = json!({
            "type": "object",
            "properties": {
                "configurable": {
                    "type": "object",
                    "properties": {"model": {"type": "string"}}
                }
            }
        });
        assert!(validate_configurable(&wrapped, &map(json!({"model": "x"}))).is_ok());
        let errors = validate_configurable(&wrapped, &map(json!({"model": 3}))).unwrap_err();
        assert!(errors[0].starts_with("/configurable/model"));
    }

    #[test]
    fn broken_schema_is_skipped() {
        assert!(validate_configurable(&json!({"type": 12}), &map(json!({"a": 1}))).is_ok());
    }
}
