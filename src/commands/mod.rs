use clap::Args;
use serde_json::{json, Map, Value};
use std::io::Read;
use std::path::Path;

use stagehand::params::ParameterSet;

pub mod build;
pub mod docker;
pub mod terraform;

/// Shared argument surface for every pipeline step.
///
/// Parameters arrive as a single JSON object, from the positional spec,
/// `--json`, `@file`, `-` (stdin), or trailing `--key value` flags. Flags
/// override spec values.
///
/// When combining `--json` with dynamic flags, add an explicit `--`
/// separator before the flags:
///
/// ```sh
/// stagehand build --json '{"build_tool":"maven"}' -- --skip_tests true
/// ```
#[derive(Args, Default, Debug)]
pub struct StepArgs {
    /// JSON parameter spec (positional, supports @file and - for stdin)
    pub spec: Option<String>,

    /// Explicit JSON parameter spec (takes precedence over positional)
    #[arg(long, value_name = "JSON")]
    pub json: Option<String>,

    /// Dynamic key=value flags (e.g., --build_tool maven).
    /// When combined with --json, add '--' separator first.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub extra: Vec<String>,
}

impl StepArgs {
    fn json_spec(&self) -> Option<&str> {
        self.json.as_deref().or(self.spec.as_deref())
    }

    /// Resolve all input sources into one parameter set.
    pub fn parameters(&self) -> stagehand::Result<ParameterSet> {
        let merged = merge_json_sources(self.json_spec(), &self.extra)?;
        match merged {
            Value::Object(map) => Ok(ParameterSet::new(map)),
            other => Err(stagehand::Error::validation_invalid_value(
                "parameters",
                Some(other.to_string()),
                "Parameters must be a JSON object",
            )),
        }
    }
}

/// Parse --key value pairs into a JSON object.
fn parse_kv_flags(extra: &[String]) -> stagehand::Result<Value> {
    let mut obj = Map::new();
    let mut iter = extra.iter().peekable();

    while let Some(arg) = iter.next() {
        if let Some(key) = arg.strip_prefix("--") {
            let value = iter.next().ok_or_else(|| {
                stagehand::Error::validation_invalid_value(
                    key,
                    None,
                    format!("Missing value for flag --{}", key),
                )
            })?;
            obj.insert(key.to_string(), parse_value(value));
        }
    }

    Ok(Value::Object(obj))
}

/// Parse a string value into appropriate JSON type.
/// Order: JSON literal → bool → number → string
fn parse_value(s: &str) -> Value {
    if let Ok(v) = serde_json::from_str(s) {
        return v;
    }
    if s == "true" {
        return json!(true);
    }
    if s == "false" {
        return json!(false);
    }
    if let Ok(n) = s.parse::<i64>() {
        return json!(n);
    }
    if let Ok(n) = s.parse::<f64>() {
        return json!(n);
    }
    json!(s)
}

/// Read JSON spec from string, file (@path), or stdin (-).
fn read_json_spec_to_string(spec: &str) -> stagehand::Result<String> {
    use std::io::IsTerminal;

    if spec.trim() == "-" {
        let mut buf = String::new();
        let mut stdin = std::io::stdin();
        if stdin.is_terminal() {
            return Err(stagehand::Error::validation_invalid_value(
                "json",
                None,
                "Cannot read JSON from stdin when stdin is a TTY",
            ));
        }
        stdin.read_to_string(&mut buf).map_err(|e| {
            stagehand::Error::internal_io(e.to_string(), Some("read stdin".to_string()))
        })?;
        return Ok(buf);
    }

    if let Some(path) = spec.strip_prefix('@') {
        if path.trim().is_empty() {
            return Err(stagehand::Error::validation_invalid_value(
                "json",
                None,
                "Invalid JSON spec '@' (missing file path)",
            ));
        }
        return std::fs::read_to_string(Path::new(path)).map_err(|e| {
            stagehand::Error::internal_io(e.to_string(), Some(format!("read {}", path)))
        });
    }

    Ok(spec.to_string())
}

/// Merge JSON spec with --key value flags. Flags override spec values.
fn merge_json_sources(spec: Option<&str>, extra: &[String]) -> stagehand::Result<Value> {
    let mut base = if let Some(spec) = spec {
        let raw = read_json_spec_to_string(spec)?;
        serde_json::from_str(&raw).map_err(|e| {
            stagehand::Error::validation_invalid_json(e, Some("parse JSON spec".to_string()))
        })?
    } else {
        Value::Object(Map::new())
    };

    if !extra.is_empty() {
        let flags = parse_kv_flags(extra)?;
        if let (Value::Object(base_obj), Value::Object(flags_obj)) = (&mut base, flags) {
            for (k, v) in flags_obj {
                base_obj.insert(k, v);
            }
        }
    }

    Ok(base)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_value_types() {
        assert_eq!(parse_value("true"), json!(true));
        assert_eq!(parse_value("42"), json!(42));
        assert_eq!(parse_value("3.5"), json!(3.5));
        assert_eq!(parse_value("maven"), json!("maven"));
        assert_eq!(parse_value(r#"["a","b"]"#), json!(["a", "b"]));
        assert_eq!(parse_value(r#"{"k":1}"#), json!({"k": 1}));
    }

    #[test]
    fn flags_override_spec_values() {
        let merged = merge_json_sources(
            Some(r#"{"build_tool": "maven", "skip_tests": false}"#),
            &["--skip_tests".to_string(), "true".to_string()],
        )
        .unwrap();
        assert_eq!(merged["build_tool"], "maven");
        assert_eq!(merged["skip_tests"], true);
    }

    #[test]
    fn flag_without_value_is_rejected() {
        let err = parse_kv_flags(&["--skip_tests".to_string()]).unwrap_err();
        assert!(err.message.contains("skip_tests"));
    }

    #[test]
    fn spec_from_file_reference() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("params.json");
        std::fs::write(&path, r#"{"operation": "plan"}"#).unwrap();
        let merged =
            merge_json_sources(Some(&format!("@{}", path.display())), &[]).unwrap();
        assert_eq!(merged["operation"], "plan");
    }

    #[test]
    fn step_args_produce_parameter_set() {
        let args = StepArgs {
            spec: Some(r#"{"test_framework": "pytest"}"#.to_string()),
            json: None,
            extra: vec!["--coverage_enabled".to_string(), "true".to_string()],
        };
        let params = args.parameters().unwrap();
        assert_eq!(params.str("test_framework"), Some("pytest"));
        assert!(params.bool_or("coverage_enabled", false));
    }
}
