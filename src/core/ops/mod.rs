//! The uniform operation contract: validate → assemble → invoke → parse →
//! decide outcome → report envelope.
//!
//! `execute` is the single top-level boundary. Every error raised by any
//! stage is caught here exactly once and converted into a failed envelope;
//! callers never see an unhandled fault.

use serde::Serialize;
use serde_json::Value;

use crate::error::{Error, ErrorCode, Result};

pub mod build;
pub mod docker;
pub mod terraform;

pub use build::BuildOperation;
pub use docker::DockerOperation;
pub use terraform::TerraformOperation;
pub use test::TestOperation;

/// One discrete pipeline step. Validation runs strictly before execution so
/// invalid input never spawns a process.
pub trait Operation {
    fn validate(&self) -> Result<()>;
    fn execute(&self) -> Result<Outcome>;
}

/// What an operation reports after it ran. `success: false` with data means
/// the step ran and reported failures (red tests); framework-level faults
/// never reach this type.
#[derive(Debug)]
pub struct Outcome {
    pub success: bool,
    pub message: String,
    pub data: Value,
}

impl Outcome {
    pub fn new(success: bool, message: impl Into<String>, data: Value) -> Self {
        Self {
            success,
            message: message.into(),
            data,
        }
    }

    pub fn succeeded(message: impl Into<String>, data: Value) -> Self {
        Self::new(true, message, data)
    }
}

/// The single stable result shape returned by every operation.
#[derive(Debug, Serialize)]
pub struct Envelope {
    pub success: bool,
    pub message: String,
    pub output_data: Option<Value>,
    pub error_details: Option<String>,
    #[serde(skip)]
    pub error_code: Option<ErrorCode>,
}

impl Envelope {
    pub fn from_error(err: &Error) -> Self {
        Self {
            success: false,
            message: format!("Command execution failed: {}", err.code.as_str()),
            output_data: None,
            error_details: Some(err.description()),
            error_code: Some(err.code),
        }
    }

    fn from_outcome(outcome: Outcome) -> Self {
        Self {
            success: outcome.success,
            message: outcome.message,
            output_data: Some(outcome.data),
            error_details: None,
            error_code: None,
        }
    }
}

/// Run an operation end to end, catching every error category at this
/// boundary.
pub fn execute(op: &dyn Operation) -> Envelope {
    match op.validate().and_then(|()| op.execute()) {
        Ok(outcome) => Envelope::from_outcome(outcome),
        Err(err) => Envelope::from_error(&err),
    }
}
