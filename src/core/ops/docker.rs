//! Container image build and push operation.
//!
//! Operations: `build`, `push`, `build-and-push`. Tagging combines explicit
//! tags with derived commit, branch, and date tags. Registry login runs only
//! when both credentials are present and feeds the password over stdin so it
//! never appears in an argument vector.

use serde_json::{json, Value};

use crate::error::{Error, Result};
use crate::git;
use crate::invoke::{self, ExitPolicy, Invocation, ProcessOutcome};
use crate::params::{require_file_exists, ParameterSet};
use crate::parse::docker::{extract_digest, extract_image_id};

use super::{Operation, Outcome};

const OPERATIONS: &[&str] = &["build", "push", "build-and-push"];

pub struct DockerOperation {
    params: ParameterSet,
}

impl DockerOperation {
    pub fn new(params: ParameterSet) -> Self {
        Self { params }
    }

    fn operation(&self) -> Result<&str> {
        self.params.require_one_of("operation", OPERATIONS)
    }

    fn dockerfile_path(&self) -> String {
        self.params.path_or("dockerfile_path", "./Dockerfile")
    }

    /// Explicit tags first (default `latest`), then derived tags in a fixed
    /// order: commit, branch, date. Git queries run in the given directory;
    /// derived tags are skipped silently when the repository context is
    /// unavailable.
    fn generate_tags(&self, repo_dir: &str) -> Vec<String> {
        let mut tags = self.params.str_list_or("tags", &["latest"]);

        if self.params.bool_or("auto_tag_commit", false) {
            if let Some(sha) = git::commit_sha(repo_dir) {
                tags.push(format!("commit-{}", &sha[..sha.len().min(8)]));
            }
        }

        if self.params.bool_or("auto_tag_branch", false) {
            if let Some(branch) = git::branch_name(repo_dir) {
                tags.push(format!("branch-{}", sanitize_tag(&branch)));
            }
        }

        if self.params.bool_or("auto_tag_date", false) {
            tags.push(chrono::Local::now().format("%Y%m%d").to_string());
        }

        tags
    }

    fn build_invocation(&self, image_name: &str, tags: &[String]) -> Invocation {
        let mut args = vec!["build".to_string()];

        for tag in tags {
            args.push("-t".to_string());
            args.push(format!("{}:{}", image_name, tag));
        }

        args.push("-f".to_string());
        args.push(self.dockerfile_path());

        for (name, value) in self.params.object("build_args") {
            args.push("--build-arg".to_string());
            args.push(format!("{}={}", name, flag_value(&value)));
        }

        if let Some(target) = self.params.str("target_stage") {
            args.push("--target".to_string());
            args.push(target.to_string());
        }

        if self.params.bool_or("no_cache", false) {
            args.push("--no-cache".to_string());
        }

        args.push(self.params.str_or("build_context", ".").to_string());

        Invocation::argv("docker", args, None)
    }

    /// Login invocation plus the password to feed over stdin. None unless
    /// both credentials are present; the password never appears in the
    /// argument vector.
    fn login_invocation(&self) -> Option<(Invocation, &str)> {
        let username = self.params.str("registry_username")?;
        let password = self.params.str("registry_password")?;

        let mut args = vec![
            "login".to_string(),
            "-u".to_string(),
            username.to_string(),
            "--password-stdin".to_string(),
        ];
        if let Some(url) = self.params.str("registry_url") {
            args.push(url.to_string());
        }

        Some((Invocation::argv("docker", args, None), password))
    }

    /// Log in to the registry when credentials are present. A missing
    /// credential pair skips authentication entirely; a failed login is
    /// always fatal.
    fn authenticate_registry(&self) -> Result<()> {
        let Some((invocation, password)) = self.login_invocation() else {
            return Ok(());
        };

        let outcome = invoke::run_with_stdin(&invocation, password)?;
        verify_login(&outcome)
    }

    fn push_tags(&self, image_name: &str, tags: &[String]) -> Result<Vec<Value>> {
        let mut results = Vec::with_capacity(tags.len());

        for tag in tags {
            let full_name = format!("{}:{}", image_name, tag);
            let invocation =
                Invocation::argv("docker", vec!["push".to_string(), full_name.clone()], None);
            let outcome = invoke::run(&invocation, ExitPolicy::FailOnNonZero)?;

            results.push(json!({
                "tag": tag,
                "full_name": full_name,
                "digest": extract_digest(&outcome.output),
                "success": true,
            }));
        }

        Ok(results)
    }
}

/// A non-zero login exit is always fatal, regardless of the operation's
/// exit policy.
fn verify_login(outcome: &ProcessOutcome) -> Result<()> {
    if outcome.exit_code != 0 {
        return Err(Error::registry_auth_failed(outcome.output.clone()));
    }
    Ok(())
}

/// Characters outside the docker tag alphabet collapse to `-`.
fn sanitize_tag(raw: &str) -> String {
    raw.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '-'
            }
        })
        .collect()
}

/// Render a JSON value as a flag argument without quoting scalars.
fn flag_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn image_size(image_name: &str, tag: &str) -> Option<String> {
    crate::utils::command::run_in_optional(
        ".",
        "docker",
        &[
            "images",
            &format!("{}:{}", image_name, tag),
            "--format",
            "{{.Size}}",
        ],
    )
}

impl Operation for DockerOperation {
    fn validate(&self) -> Result<()> {
        self.params.require(&["operation", "image_name"])?;
        let operation = self.operation()?;

        if matches!(operation, "build" | "build-and-push") {
            require_file_exists("dockerfile_path", &self.dockerfile_path())?;
        }
        Ok(())
    }

    fn execute(&self) -> Result<Outcome> {
        let operation = self.operation()?.to_string();
        let image_name = self.params.required_str("image_name")?.to_string();

        let tags = self.generate_tags(self.params.str_or("build_context", "."));
        let builds = matches!(operation.as_str(), "build" | "build-and-push");
        let pushes = matches!(operation.as_str(), "push" | "build-and-push");

        let mut image_id = None;
        let mut size = None;
        if builds {
            let invocation = self.build_invocation(&image_name, &tags);
            let outcome = invoke::run(&invocation, ExitPolicy::FailOnNonZero)?;
            image_id = extract_image_id(&outcome.output);
            if let Some(first_tag) = tags.first() {
                size = image_size(&image_name, first_tag);
            }
        }

        let mut push_results = None;
        if pushes {
            self.authenticate_registry()?;
            push_results = Some(self.push_tags(&image_name, &tags)?);
        }

        let message = result_message(&operation, &image_name, &tags, size.as_deref());

        Ok(Outcome::succeeded(
            message,
            json!({
                "operation": operation,
                "image_name": image_name,
                "tags_applied": tags,
                "build_completed": builds,
                "push_completed": pushes,
                "image_id": image_id,
                "image_size": size,
                "push_results": push_results,
            }),
        ))
    }
}

fn result_message(operation: &str, image_name: &str, tags: &[String], size: Option<&str>) -> String {
    let verb = match operation {
        "build" => "built",
        "push" => "pushed",
        _ => "built and pushed",
    };
    let mut message = format!(
        "Successfully {} image {} with tags: {}",
        verb,
        image_name,
        tags.join(", ")
    );
    if let Some(size) = size {
        message.push_str(&format!(" (Size: {})", size));
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::ops;

    fn params(raw: &str) -> ParameterSet {
        ParameterSet::from_json(raw).unwrap()
    }

    #[test]
    fn build_invocation_orders_flags_then_context() {
        let op = DockerOperation::new(params(
            r#"{"operation": "build", "image_name": "myapp",
                "dockerfile_path": "docker/Dockerfile", "build_context": "src",
                "build_args": {"VERSION": "1.2", "PORT": 8080},
                "target_stage": "runtime", "no_cache": true}"#,
        ));
        let invocation = op.build_invocation("myapp", &["latest".to_string(), "v1".to_string()]);
        assert_eq!(
            invocation.display(),
            "docker build -t myapp:latest -t myapp:v1 -f docker/Dockerfile \
             --build-arg PORT=8080 --build-arg VERSION=1.2 \
             --target runtime --no-cache src"
        );
    }

    #[test]
    fn explicit_tags_default_to_latest() {
        let op = DockerOperation::new(params(r#"{"operation": "push", "image_name": "myapp"}"#));
        assert_eq!(op.generate_tags("."), vec!["latest"]);
    }

    #[test]
    fn explicit_tags_replace_the_default() {
        let op = DockerOperation::new(params(
            r#"{"operation": "push", "image_name": "myapp", "tags": ["v2", "stable"]}"#,
        ));
        assert_eq!(op.generate_tags("."), vec!["v2", "stable"]);
    }

    #[test]
    fn date_tag_uses_compact_format() {
        let op = DockerOperation::new(params(
            r#"{"operation": "push", "image_name": "myapp", "tags": [], "auto_tag_date": true}"#,
        ));
        let tags = op.generate_tags(".");
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].len(), 8);
        assert!(tags[0].chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn derived_tags_skipped_outside_a_repository() {
        let dir = tempfile::tempdir().unwrap();
        let op = DockerOperation::new(params(
            r#"{"operation": "push", "image_name": "myapp", "tags": ["v1"],
                "auto_tag_commit": true, "auto_tag_branch": true}"#,
        ));
        assert_eq!(
            op.generate_tags(dir.path().to_str().unwrap()),
            vec!["v1"]
        );
    }

    #[test]
    fn branch_names_are_sanitized() {
        assert_eq!(sanitize_tag("feature/login"), "feature-login");
        assert_eq!(sanitize_tag("release-1.2_rc"), "release-1.2_rc");
        assert_eq!(sanitize_tag("feature/My Fix!"), "feature-My-Fix-");
    }

    #[test]
    fn login_requires_both_credentials() {
        let base = r#"{"operation": "push", "image_name": "myapp"}"#;
        assert!(DockerOperation::new(params(base)).login_invocation().is_none());

        let op = DockerOperation::new(params(
            r#"{"operation": "push", "image_name": "myapp", "registry_username": "bot"}"#,
        ));
        assert!(op.login_invocation().is_none());

        let op = DockerOperation::new(params(
            r#"{"operation": "push", "image_name": "myapp", "registry_password": "hunter2"}"#,
        ));
        assert!(op.login_invocation().is_none());

        let op = DockerOperation::new(params(
            r#"{"operation": "push", "image_name": "myapp",
                "registry_username": "bot", "registry_password": "hunter2"}"#,
        ));
        let (invocation, password) = op.login_invocation().unwrap();
        assert_eq!(invocation.display(), "docker login -u bot --password-stdin");
        assert_eq!(password, "hunter2");
    }

    #[test]
    fn login_appends_registry_url_when_given() {
        let op = DockerOperation::new(params(
            r#"{"operation": "push", "image_name": "myapp",
                "registry_username": "bot", "registry_password": "hunter2",
                "registry_url": "registry.example.com"}"#,
        ));
        let (invocation, _) = op.login_invocation().unwrap();
        assert_eq!(
            invocation.display(),
            "docker login -u bot --password-stdin registry.example.com"
        );
    }

    #[test]
    fn failed_login_is_an_auth_failure() {
        let err = verify_login(&ProcessOutcome {
            exit_code: 1,
            output: "unauthorized: incorrect username or password".to_string(),
        })
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::RegistryAuthFailed);
        assert!(err.message.contains("unauthorized"));

        assert!(verify_login(&ProcessOutcome {
            exit_code: 0,
            output: "Login Succeeded".to_string(),
        })
        .is_ok());
    }

    #[test]
    fn unknown_operation_is_invalid_value() {
        let op = DockerOperation::new(params(
            r#"{"operation": "deploy", "image_name": "myapp"}"#,
        ));
        let err = op.validate().unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationInvalidValue);
        assert!(err.message.contains("build, push, build-and-push"));
    }

    #[test]
    fn build_requires_dockerfile() {
        let op = DockerOperation::new(params(
            r#"{"operation": "build", "image_name": "myapp",
                "dockerfile_path": "/nonexistent/Dockerfile"}"#,
        ));
        let err = op.validate().unwrap_err();
        assert_eq!(err.code, ErrorCode::PreconditionFailed);
    }

    #[test]
    fn push_does_not_require_dockerfile() {
        let op = DockerOperation::new(params(
            r#"{"operation": "push", "image_name": "myapp",
                "dockerfile_path": "/nonexistent/Dockerfile"}"#,
        ));
        assert!(op.validate().is_ok());
    }

    #[test]
    fn missing_parameters_reported_together() {
        let envelope = ops::execute(&DockerOperation::new(params("{}")));
        assert!(!envelope.success);
        assert_eq!(envelope.error_code, Some(ErrorCode::ValidationMissingParameter));
        let details = envelope.error_details.unwrap();
        assert!(details.contains("operation"));
        assert!(details.contains("image_name"));
    }

    #[test]
    fn result_message_mentions_size_when_known() {
        assert_eq!(
            result_message("build-and-push", "myapp", &["latest".to_string()], Some("120MB")),
            "Successfully built and pushed image myapp with tags: latest (Size: 120MB)"
        );
        assert_eq!(
            result_message("push", "myapp", &["v1".to_string(), "v2".to_string()], None),
            "Successfully pushed image myapp with tags: v1, v2"
        );
    }
}
