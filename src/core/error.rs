use serde::Serialize;
use serde_json::Value;

/// Error taxonomy for pipeline operations.
///
/// The first four categories are fatal and surface through the result
/// envelope; parse gaps are not errors (parsers default missing fields).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ValidationMissingParameter,
    ValidationInvalidValue,
    ValidationInvalidJson,

    PreconditionFailed,

    ProcessFailed,

    RegistryAuthFailed,

    InternalIoError,
    InternalJsonError,
    InternalUnexpected,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ValidationMissingParameter => "validation.missing_parameter",
            ErrorCode::ValidationInvalidValue => "validation.invalid_value",
            ErrorCode::ValidationInvalidJson => "validation.invalid_json",

            ErrorCode::PreconditionFailed => "precondition.failed",

            ErrorCode::ProcessFailed => "process.failed",

            ErrorCode::RegistryAuthFailed => "registry.auth_failed",

            ErrorCode::InternalIoError => "internal.io_error",
            ErrorCode::InternalJsonError => "internal.json_error",
            ErrorCode::InternalUnexpected => "internal.unexpected",
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MissingParameterDetails {
    pub parameters: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidValueDetails {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    pub problem: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreconditionDetails {
    pub requirement: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessFailedDetails {
    pub command: String,
    pub exit_code: i32,
    pub output: String,
}

#[derive(Debug, Clone)]
pub struct Error {
    pub code: ErrorCode,
    pub message: String,
    pub details: Value,
}

pub type Result<T> = std::result::Result<T, Error>;

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}

impl Error {
    pub fn new(code: ErrorCode, message: impl Into<String>, details: Value) -> Self {
        Self {
            code,
            message: message.into(),
            details,
        }
    }

    /// Full human-readable description: message plus any structured detail.
    /// Used as `error_details` in the result envelope.
    pub fn description(&self) -> String {
        match &self.details {
            Value::Null => self.message.clone(),
            Value::Object(map) if map.is_empty() => self.message.clone(),
            other => format!(
                "{}\n{}",
                self.message,
                serde_json::to_string_pretty(other).unwrap_or_default()
            ),
        }
    }

    pub fn validation_missing_parameters(parameters: Vec<String>) -> Self {
        let message = format!("Missing required parameters: {}", parameters.join(", "));
        let details = serde_json::to_value(MissingParameterDetails { parameters })
            .unwrap_or_else(|_| Value::Object(serde_json::Map::new()));
        Self::new(ErrorCode::ValidationMissingParameter, message, details)
    }

    pub fn validation_invalid_value(
        key: impl Into<String>,
        value: Option<String>,
        problem: impl Into<String>,
    ) -> Self {
        let key = key.into();
        let problem = problem.into();
        let message = format!("Invalid value for '{}': {}", key, problem);
        let details = serde_json::to_value(InvalidValueDetails {
            key,
            value,
            problem,
        })
        .unwrap_or_else(|_| Value::Object(serde_json::Map::new()));
        Self::new(ErrorCode::ValidationInvalidValue, message, details)
    }

    pub fn validation_invalid_json(err: serde_json::Error, context: Option<String>) -> Self {
        let details = serde_json::json!({
            "error": err.to_string(),
            "context": context,
        });
        Self::new(ErrorCode::ValidationInvalidJson, "Invalid JSON", details)
    }

    pub fn precondition_failed(
        requirement: impl Into<String>,
        path: Option<String>,
    ) -> Self {
        let requirement = requirement.into();
        let message = match &path {
            Some(p) => format!("{}: {}", requirement, p),
            None => requirement.clone(),
        };
        let details = serde_json::to_value(PreconditionDetails { requirement, path })
            .unwrap_or_else(|_| Value::Object(serde_json::Map::new()));
        Self::new(ErrorCode::PreconditionFailed, message, details)
    }

    pub fn process_failed(command: impl Into<String>, exit_code: i32, output: String) -> Self {
        let command = command.into();
        let message = format!("Command failed with exit code {}: {}", exit_code, command);
        let details = serde_json::to_value(ProcessFailedDetails {
            command,
            exit_code,
            output,
        })
        .unwrap_or_else(|_| Value::Object(serde_json::Map::new()));
        Self::new(ErrorCode::ProcessFailed, message, details)
    }

    pub fn registry_auth_failed(detail: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::RegistryAuthFailed,
            format!("Registry authentication failed: {}", detail.into()),
            Value::Object(serde_json::Map::new()),
        )
    }

    pub fn internal_io(error: impl Into<String>, context: Option<String>) -> Self {
        let details = serde_json::json!({
            "error": error.into(),
            "context": context,
        });
        Self::new(ErrorCode::InternalIoError, "IO error", details)
    }

    pub fn internal_json(error: impl Into<String>, context: Option<String>) -> Self {
        let details = serde_json::json!({
            "error": error.into(),
            "context": context,
        });
        Self::new(ErrorCode::InternalJsonError, "JSON error", details)
    }

    pub fn internal_unexpected(error: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::InternalUnexpected,
            "Unexpected error",
            serde_json::json!({ "error": error.into() }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_parameters_lists_all_keys_in_one_message() {
        let err = Error::validation_missing_parameters(vec![
            "build_tool".to_string(),
            "project_path".to_string(),
        ]);
        assert_eq!(err.code, ErrorCode::ValidationMissingParameter);
        assert_eq!(
            err.message,
            "Missing required parameters: build_tool, project_path"
        );
    }

    #[test]
    fn process_failed_carries_output_in_details() {
        let err = Error::process_failed("mvn clean install", 1, "BUILD FAILURE".to_string());
        assert_eq!(err.code, ErrorCode::ProcessFailed);
        assert!(err.description().contains("BUILD FAILURE"));
        assert!(err.description().contains("exit code 1"));
    }

    #[test]
    fn description_without_details_is_message_only() {
        let err = Error::registry_auth_failed("bad credentials");
        assert_eq!(
            err.description(),
            "Registry authentication failed: bad credentials"
        );
    }
}
