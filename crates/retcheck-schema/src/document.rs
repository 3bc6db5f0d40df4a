//! # Document Loading
//!
//! Reads a retention configuration file and parses it as YAML. Checks run
//! directly on the resulting `serde_yaml::Value`, so any scalar the parser
//! accepts (including `.inf` and `.nan`) loads, wherever it appears.
//!
//! Only a single retention policy entry is ever turned into JSON, right
//! before the strict schema check. [`policy_entry_to_json`] does that and
//! reports the first value JSON cannot hold.

use std::path::Path;

use retcheck_core::RetentionError;
use serde_yaml::Value;

/// File validated when no path is given on the command line.
pub const DEFAULT_DOCUMENT_PATH: &str = "example.yml";

/// Load and parse the document at `path`.
///
/// # Errors
///
/// Returns `RetentionError::DocumentLoad` if the file cannot be read or is
/// not valid YAML.
pub fn load_document(path: &Path) -> Result<Value, RetentionError> {
    let content = std::fs::read_to_string(path).map_err(|e| RetentionError::DocumentLoad {
        path: path.display().to_string(),
        reason: format!("cannot read file: {e}"),
    })?;
    parse_document(&content, &path.display().to_string())
}

/// Parse YAML text into a document. `origin` names the source in errors.
pub fn parse_document(content: &str, origin: &str) -> Result<Value, RetentionError> {
    serde_yaml::from_str(content).map_err(|e| RetentionError::DocumentLoad {
        path: origin.to_string(),
        reason: format!("invalid YAML: {e}"),
    })
}

/// A value inside a policy entry that has no JSON form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Unrepresentable {
    /// JSON Pointer to the value within the entry.
    pub pointer: String,
    pub reason: String,
}

/// Convert one retention policy entry to JSON for schema validation.
///
/// Tags are ignored. String, number and boolean mapping keys become JSON
/// object keys; anything else, and non-finite floats, are unrepresentable.
pub(crate) fn policy_entry_to_json(entry: &Value) -> Result<serde_json::Value, Unrepresentable> {
    convert(entry, &mut String::new())
}

fn unrepresentable(pointer: &str, reason: String) -> Unrepresentable {
    Unrepresentable {
        pointer: pointer.to_string(),
        reason,
    }
}

fn convert(value: &Value, pointer: &mut String) -> Result<serde_json::Value, Unrepresentable> {
    Ok(match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::String(s) => serde_json::Value::String(s.clone()),
        Value::Number(n) => match (n.as_i64(), n.as_u64(), n.as_f64()) {
            (Some(i), _, _) => i.into(),
            (None, Some(u), _) => u.into(),
            (None, None, Some(f)) => serde_json::Number::from_f64(f)
                .map(serde_json::Value::Number)
                .ok_or_else(|| unrepresentable(pointer.as_str(), format!("{n} is not a finite number")))?,
            (None, None, None) => {
                return Err(unrepresentable(pointer.as_str(), format!("{n} is not a number JSON can hold")))
            }
        },
        Value::Sequence(items) => {
            let mut array = Vec::with_capacity(items.len());
            for (index, item) in items.iter().enumerate() {
                let len = pointer.len();
                pointer.push_str(&format!("/{index}"));
                let converted = convert(item, pointer);
                pointer.truncate(len);
                array.push(converted?);
            }
            serde_json::Value::Array(array)
        }
        Value::Mapping(mapping) => {
            let mut object = serde_json::Map::with_capacity(mapping.len());
            for (key, item) in mapping {
                let key = match key {
                    Value::String(s) => s.clone(),
                    Value::Number(_) | Value::Bool(_) => render_value(key),
                    other => {
                        return Err(unrepresentable(
                            pointer.as_str(),
                            format!("mapping key of type {} cannot be an object key", type_name(other)),
                        ))
                    }
                };
                let len = pointer.len();
                pointer.push('/');
                pointer.push_str(&key.replace('~', "~0").replace('/', "~1"));
                let converted = convert(item, pointer);
                pointer.truncate(len);
                object.insert(key, converted?);
            }
            serde_json::Value::Object(object)
        }
        Value::Tagged(tagged) => convert(&tagged.value, pointer)?,
    })
}

/// Short type name of a document value, used in diagnostics.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(tagged) => type_name(&tagged.value),
    }
}

/// Render a document value for a diagnostic.
///
/// Scalars are shown bare (strings unquoted); collections in YAML flow style.
pub fn render_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Sequence(items) => {
            let items: Vec<String> = items.iter().map(render_value).collect();
            format!("[{}]", items.join(", "))
        }
        Value::Mapping(mapping) => {
            let entries: Vec<String> = mapping
                .iter()
                .map(|(k, v)| format!("{}: {}", render_value(k), render_value(v)))
                .collect();
            format!("{{{}}}", entries.join(", "))
        }
        Value::Tagged(tagged) => render_value(&tagged.value),
    }
}
