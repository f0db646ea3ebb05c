//! Typed access to the per-operation parameter mapping.
//!
//! Every operation is configured by a single JSON object. Required keys are
//! enforced up front (all missing keys reported in one error); optional keys
//! fall back to documented defaults through the typed getters.

use serde_json::{Map, Value};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Default)]
pub struct ParameterSet(Map<String, Value>);

impl ParameterSet {
    pub fn new(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Parse a JSON string into a parameter set. The top level must be an object.
    pub fn from_json(raw: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(raw)
            .map_err(|e| Error::validation_invalid_json(e, Some("parse parameters".to_string())))?;
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(Error::validation_invalid_value(
                "parameters",
                Some(other.to_string()),
                "Parameters must be a JSON object",
            )),
        }
    }

    /// Enforce presence of required keys, reporting every missing key at once.
    pub fn require(&self, keys: &[&str]) -> Result<()> {
        let missing: Vec<String> = keys
            .iter()
            .filter(|k| !self.0.contains_key(**k))
            .map(|k| k.to_string())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(Error::validation_missing_parameters(missing))
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn str_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.str(key).unwrap_or(default)
    }

    /// String value of a required key. Call after `require` has passed;
    /// still validates the type.
    pub fn required_str(&self, key: &str) -> Result<&str> {
        self.str(key).ok_or_else(|| {
            Error::validation_invalid_value(key, self.raw_display(key), "Expected a string value")
        })
    }

    pub fn bool_or(&self, key: &str, default: bool) -> bool {
        self.0.get(key).and_then(Value::as_bool).unwrap_or(default)
    }

    pub fn f64_or(&self, key: &str, default: f64) -> f64 {
        self.0.get(key).and_then(Value::as_f64).unwrap_or(default)
    }

    /// Unsigned integer value; out-of-range numbers read as absent.
    pub fn u32_opt(&self, key: &str) -> Option<u32> {
        self.0
            .get(key)
            .and_then(Value::as_u64)
            .and_then(|n| u32::try_from(n).ok())
    }

    /// List of strings; missing key yields the provided default.
    pub fn str_list_or(&self, key: &str, default: &[&str]) -> Vec<String> {
        match self.0.get(key).and_then(Value::as_array) {
            Some(items) => items
                .iter()
                .filter_map(Value::as_str)
                .map(String::from)
                .collect(),
            None => default.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Nested object value; missing key yields an empty map.
    pub fn object(&self, key: &str) -> Map<String, Value> {
        self.0
            .get(key)
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default()
    }

    /// Validate that a key's value belongs to an enumerated set.
    pub fn require_one_of(&self, key: &str, allowed: &[&str]) -> Result<&str> {
        let value = self.required_str(key)?;
        if allowed.contains(&value) {
            Ok(value)
        } else {
            Err(Error::validation_invalid_value(
                key,
                Some(value.to_string()),
                format!("Unsupported value. Supported: {}", allowed.join(", ")),
            ))
        }
    }

    /// Tilde-expanded path value for a key.
    pub fn path_or(&self, key: &str, default: &str) -> String {
        shellexpand::tilde(self.str_or(key, default)).into_owned()
    }

    fn raw_display(&self, key: &str) -> Option<String> {
        self.0.get(key).map(|v| v.to_string())
    }
}

/// Assert a directory exists before any process is spawned.
pub fn require_dir_exists(key: &str, path: &str) -> Result<()> {
    if std::path::Path::new(path).is_dir() {
        Ok(())
    } else {
        Err(Error::precondition_failed(
            format!("Directory for '{}' does not exist", key),
            Some(path.to_string()),
        ))
    }
}

/// Assert a file exists before any process is spawned.
pub fn require_file_exists(key: &str, path: &str) -> Result<()> {
    if std::path::Path::new(path).is_file() {
        Ok(())
    } else {
        Err(Error::precondition_failed(
            format!("File for '{}' not found", key),
            Some(path.to_string()),
        ))
    }
}
