/*!
 * Copyright 2025 Release Workshop Ltd
 * Licensed under the Elastic License 2.0; you may not use this file except in compliance with the Elastic License 2.0.
 * See the LICENSE file in the project root for details.
 *
 * Reads query schema documents from YAML or JSON strings.
 * Works only with in-memory strings (no file I/O).
 */

use serde_json::{Map, Number, Value};
use yaml_rust::{Yaml, YamlLoader};

use crate::error::SchemaError;

/// Parse a schema document written in YAML or JSON.
///
/// The format is picked from the file extension when one is given,
/// otherwise JSON is tried first and YAML second.
pub fn read_document(content: &str, file_path: Option<&str>) -> Result<Value, SchemaError> {
    if let Some(path) = file_path {
        let path_lower = path.to_lowercase();
        if path_lower.ends_with(".json") {
            return read_json(content);
        }
        if path_lower.ends_with(".yaml") || path_lower.ends_with(".yml") {
            return read_yaml(content);
        }
    }

    read_json(content).or_else(|_| read_yaml(content))
}

fn read_json(content: &str) -> Result<Value, SchemaError> {
    serde_json::from_str(content).map_err(|e| SchemaError::InvalidJson(e.to_string()))
}

fn read_yaml(content: &str) -> Result<Value, SchemaError> {
    let docs = YamlLoader::load_from_str(content)
        .map_err(|e| SchemaError::InvalidYaml(e.to_string()))?;

    let first = docs
        .first()
        .ok_or_else(|| SchemaError::InvalidYaml("YAML document is empty".to_string()))?;

    yaml_to_json(first).ok_or_else(|| {
        SchemaError::InvalidYaml("YAML document cannot be represented as JSON".to_string())
    })
}

/// Convert a yaml-rust node to a `serde_json::Value`.
///
/// Aliases and bad values have no JSON form and are dropped.
fn yaml_to_json(yaml: &Yaml) -> Option<Value> {
    match yaml {
        Yaml::String(s) => Some(Value::String(s.clone())),
        Yaml::Boolean(b) => Some(Value::Bool(*b)),
        Yaml::Integer(i) => Some(Value::Number(Number::from(*i))),
        Yaml::Real(s) => s
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .or_else(|| Some(Value::String(s.clone()))),
        Yaml::Array(items) => Some(Value::Array(items.iter().filter_map(yaml_to_json).collect())),
        Yaml::Hash(hash) => {
            let mut map = Map::new();
            for (k, v) in hash {
                if let (Some(key), Some(value)) = (yaml_key(k), yaml_to_json(v)) {
                    map.insert(key, value);
                }
            }
            Some(Value::Object(map))
        }
        Yaml::Null => Some(Value::Null),
        Yaml::Alias(_) | Yaml::BadValue => None,
    }
}

fn yaml_key(yaml: &Yaml) -> Option<String> {
    match yaml {
        Yaml::String(s) | Yaml::Real(s) => Some(s.clone()),
        Yaml::Integer(i) => Some(i.to_string()),
        Yaml::Boolean(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_json_document() {
        let doc = read_document(r#"{"fields": [{"name": "text"}]}"#, Some("schema.json")).unwrap();
        assert_eq!(doc["fields"][0]["name"], "text");
    }

    #[test]
    fn test_read_yaml_document() {
        let yaml = r"
fields:
  - name: text
    label: Text
    valueKind: text
    operators: [contains, in]
";
        let doc = read_document(yaml, Some("schema.yaml")).unwrap();
        assert_eq!(doc["fields"][0]["label"], "Text");
        assert_eq!(doc["fields"][0]["operators"][1], "in");
    }

    #[test]
    fn test_unknown_extension_falls_back_to_yaml() {
        let doc = read_document("fields: []", None).unwrap();
        assert!(doc["fields"].is_array());

        let doc = read_document(r#"{"fields": []}"#, Some("schema.txt")).unwrap();
        assert!(doc["fields"].is_array());
    }

    #[test]
    fn test_invalid_json_is_reported() {
        let err = read_document(r#"{"fields": "#, Some("schema.json")).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidJson(_)));
    }

    #[test]
    fn test_invalid_yaml_is_reported() {
        let err = read_document("fields: [unclosed", Some("schema.yml")).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidYaml(_)));
    }

    #[test]
    fn test_empty_yaml_is_reported() {
        let err = read_document("", Some("schema.yaml")).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidYaml(_)));
    }
}
