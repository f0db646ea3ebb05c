//! Envelope printing and exit code mapping.

use stagehand::ops::Envelope;
use stagehand::{Error, ErrorCode, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Text,
}

/// Print the result envelope to stdout in the requested format.
///
/// Text format mirrors the JSON fields line by line, with error details
/// routed to stderr.
pub fn print_envelope(envelope: &Envelope, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let payload = serde_json::to_string_pretty(envelope).map_err(|e| {
                Error::internal_json(e.to_string(), Some("serialize envelope".to_string()))
            })?;
            write_stdout(&payload)
        }
        OutputFormat::Text => {
            write_stdout(&format!("Success: {}", envelope.success))?;
            write_stdout(&format!("Message: {}", envelope.message))?;

            if let Some(data) = &envelope.output_data {
                let rendered = serde_json::to_string_pretty(data).map_err(|e| {
                    Error::internal_json(e.to_string(), Some("serialize output data".to_string()))
                })?;
                write_stdout(&format!("Output Data: {}", rendered))?;
            }

            if let Some(details) = &envelope.error_details {
                eprintln!("Error: {}", details);
            }
            Ok(())
        }
    }
}

fn write_stdout(line: &str) -> Result<()> {
    use std::io::{self, Write};

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    if let Err(e) = writeln!(handle, "{}", line) {
        if e.kind() == io::ErrorKind::BrokenPipe {
            return Ok(()); // Exit gracefully on SIGPIPE
        }
        return Err(Error::internal_io(
            e.to_string(),
            Some("write stdout".to_string()),
        ));
    }
    Ok(())
}

/// Process exit code for a finished step. Step-reported failures (red
/// tests) exit 1; framework errors map by category.
pub fn exit_code_for(envelope: &Envelope) -> u8 {
    if envelope.success {
        return 0;
    }

    match envelope.error_code {
        Some(
            ErrorCode::ValidationMissingParameter
            | ErrorCode::ValidationInvalidValue
            | ErrorCode::ValidationInvalidJson,
        ) => 2,
        Some(ErrorCode::PreconditionFailed) => 4,
        Some(ErrorCode::RegistryAuthFailed) => 10,
        Some(ErrorCode::ProcessFailed) => 20,
        Some(
            ErrorCode::InternalIoError
            | ErrorCode::InternalJsonError
            | ErrorCode::InternalUnexpected,
        ) => 1,
        None => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stagehand::ops::Outcome;

    fn success_envelope() -> Envelope {
        let op = PassThrough(Outcome::succeeded("done", serde_json::json!({})));
        stagehand::ops::execute(&op)
    }

    struct PassThrough(Outcome);

    impl stagehand::ops::Operation for PassThrough {
        fn validate(&self) -> Result<()> {
            Ok(())
        }
        fn execute(&self) -> Result<Outcome> {
            Ok(Outcome::new(
                self.0.success,
                self.0.message.clone(),
                self.0.data.clone(),
            ))
        }
    }

    #[test]
    fn success_exits_zero() {
        assert_eq!(exit_code_for(&success_envelope()), 0);
    }

    #[test]
    fn step_reported_failure_exits_one() {
        let op = PassThrough(Outcome::new(false, "2 failed", serde_json::json!({})));
        let envelope = stagehand::ops::execute(&op);
        assert_eq!(exit_code_for(&envelope), 1);
    }

    #[test]
    fn error_categories_map_to_distinct_codes() {
        let cases = [
            (Error::validation_missing_parameters(vec!["x".into()]), 2),
            (Error::precondition_failed("missing dir", None), 4),
            (Error::registry_auth_failed("denied"), 10),
            (Error::process_failed("mvn", 1, String::new()), 20),
            (Error::internal_io("broken", None), 1),
        ];
        for (err, expected) in cases {
            let envelope = Envelope::from_error(&err);
            assert_eq!(exit_code_for(&envelope), expected, "{:?}", err.code);
        }
    }
}
