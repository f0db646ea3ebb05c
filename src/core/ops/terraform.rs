//! Infrastructure provisioning operation wrapping the terraform CLI.
//!
//! Operations: `init`, `plan`, `apply`, `destroy`, `validate`, `output`.
//! Every invocation appends `-no-color` so the summary parsers see plain
//! text. All commands run inside the configured working directory.

use std::path::Path;

use serde_json::{json, Map, Value};

use crate::error::{Error, Result};
use crate::invoke::{self, ExitPolicy, Invocation, ProcessOutcome};
use crate::params::ParameterSet;
use crate::parse::terraform::{
    count_destroyed, parse_apply_results, parse_plan_changes, parse_providers,
};

use super::{Operation, Outcome};

const OPERATIONS: &[&str] = &["init", "plan", "apply", "destroy", "validate", "output"];

pub struct TerraformOperation {
    params: ParameterSet,
}

impl TerraformOperation {
    pub fn new(params: ParameterSet) -> Self {
        Self { params }
    }

    fn operation(&self) -> Result<&str> {
        self.params.require_one_of("operation", OPERATIONS)
    }

    fn working_dir(&self) -> String {
        self.params.path_or("working_dir", ".")
    }

    /// `-var-file` plus one `-var name=value` per entry. Complex values are
    /// JSON-encoded so terraform reparses them as HCL-compatible structures.
    fn var_flags(&self, args: &mut Vec<String>) {
        if let Some(var_file) = self.params.str("var_file") {
            args.push("-var-file".to_string());
            args.push(var_file.to_string());
        }

        for (name, value) in self.params.object("variables") {
            args.push("-var".to_string());
            args.push(format!("{}={}", name, variable_value(&value)));
        }
    }

    fn common_flags(&self, args: &mut Vec<String>) {
        for target in self.params.str_list_or("target", &[]) {
            args.push("-target".to_string());
            args.push(target);
        }

        if let Some(parallelism) = self.params.u32_opt("parallelism") {
            args.push("-parallelism".to_string());
            args.push(parallelism.to_string());
        }

        if !self.params.bool_or("lock", true) {
            args.push("-lock=false".to_string());
        }

        if let Some(timeout) = self.params.str("lock_timeout") {
            args.push("-lock-timeout".to_string());
            args.push(timeout.to_string());
        }
    }

    fn assemble(&self, operation: &str) -> Vec<String> {
        let mut args = vec![operation.to_string()];

        match operation {
            "init" => {
                for (key, value) in self.params.object("backend_config") {
                    args.push("-backend-config".to_string());
                    args.push(format!("{}={}", key, variable_value(&value)));
                }
                if self.params.bool_or("reconfigure", false) {
                    args.push("-reconfigure".to_string());
                }
                if self.params.bool_or("upgrade", false) {
                    args.push("-upgrade".to_string());
                }
            }
            "plan" => {
                self.var_flags(&mut args);
                self.common_flags(&mut args);
                if let Some(out) = self.params.str("plan_output_file") {
                    args.push("-out".to_string());
                    args.push(out.to_string());
                }
                if self.params.bool_or("destroy_plan", false) {
                    args.push("-destroy".to_string());
                }
            }
            "apply" => {
                // A previously saved plan file takes precedence over fresh
                // variable and targeting flags.
                let saved_plan = self.params.str("plan_output_file").filter(|file| {
                    Path::new(&self.working_dir()).join(file).exists()
                });
                match saved_plan {
                    Some(file) => args.push(file.to_string()),
                    None => {
                        self.var_flags(&mut args);
                        self.common_flags(&mut args);
                    }
                }
                if self.params.bool_or("auto_approve", false) {
                    args.push("-auto-approve".to_string());
                }
            }
            "destroy" => {
                self.var_flags(&mut args);
                self.common_flags(&mut args);
                if self.params.bool_or("auto_approve", false) {
                    args.push("-auto-approve".to_string());
                }
            }
            "output" => {
                args.push("-json".to_string());
            }
            _ => {}
        }

        args.push("-no-color".to_string());
        args
    }

    fn run(&self, args: Vec<String>) -> Result<String> {
        let invocation = Invocation::argv("terraform", args, Some(self.working_dir()));
        let outcome = invoke::run(&invocation, ExitPolicy::FailOnNonZero)?;
        Ok(outcome.output)
    }

    /// Workspace to select before the operation runs. init bootstraps the
    /// directory and never selects one.
    fn workspace_to_select(&self, operation: &str) -> Option<&str> {
        if operation == "init" {
            return None;
        }
        self.params.str("workspace")
    }

    fn workspace_invocation(&self, action: &str, workspace: &str) -> Invocation {
        Invocation::argv(
            "terraform",
            vec![
                "workspace".to_string(),
                action.to_string(),
                workspace.to_string(),
            ],
            Some(self.working_dir()),
        )
    }

    /// Select the workspace, creating it on first use. Selection failure is
    /// the expected signal that the workspace does not exist yet; creation
    /// failure is fatal.
    fn select_or_create(
        &self,
        workspace: &str,
        mut run: impl FnMut(&Invocation, ExitPolicy) -> Result<ProcessOutcome>,
    ) -> Result<()> {
        let select = self.workspace_invocation("select", workspace);
        let outcome = run(&select, ExitPolicy::ToleratesNonZero)?;
        if outcome.exit_code == 0 {
            return Ok(());
        }

        let new = self.workspace_invocation("new", workspace);
        run(&new, ExitPolicy::FailOnNonZero)?;
        Ok(())
    }
}

/// Strings pass through unquoted; everything else is JSON-encoded.
fn variable_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn has_tf_files(dir: &str) -> bool {
    let pattern = Path::new(dir).join("*.tf");
    pattern
        .to_str()
        .and_then(|p| glob::glob(p).ok())
        .map(|mut paths| paths.next().is_some())
        .unwrap_or(false)
}

impl Operation for TerraformOperation {
    fn validate(&self) -> Result<()> {
        self.params.require(&["operation", "working_dir"])?;
        let operation = self.operation()?;
        let working_dir = self.working_dir();

        if !Path::new(&working_dir).is_dir() {
            return Err(Error::precondition_failed(
                "Working directory does not exist",
                Some(working_dir),
            ));
        }

        // init bootstraps empty directories; everything else needs config
        if operation != "init" && !has_tf_files(&working_dir) {
            return Err(Error::precondition_failed(
                "No Terraform files found in working directory",
                Some(working_dir),
            ));
        }

        Ok(())
    }

    fn execute(&self) -> Result<Outcome> {
        let operation = self.operation()?.to_string();
        let working_dir = self.working_dir();

        let workspace = self.params.str("workspace");
        if let Some(selected) = self.workspace_to_select(&operation) {
            self.select_or_create(selected, |invocation, policy| {
                invoke::run(invocation, policy)
            })?;
        }

        let mut data = Map::new();
        data.insert("operation".to_string(), json!(operation));
        data.insert("working_dir".to_string(), json!(working_dir));
        data.insert(
            "workspace".to_string(),
            json!(workspace.unwrap_or("default")),
        );

        let message = match operation.as_str() {
            "init" => {
                let output = self.run(self.assemble("init"))?;
                let providers = parse_providers(&output);
                data.insert("initialized".to_string(), json!(true));
                data.insert("providers".to_string(), json!(providers));
                init_message(&providers)
            }
            "validate" => {
                self.run(self.assemble("validate"))?;
                data.insert("valid".to_string(), json!(true));
                "Terraform configuration is valid".to_string()
            }
            "plan" => {
                let output = self.run(self.assemble("plan"))?;
                let changes = parse_plan_changes(&output);
                let message = if changes.has_changes() {
                    format!(
                        "Plan: {} to add, {} to change, {} to destroy",
                        changes.add, changes.change, changes.destroy
                    )
                } else {
                    "No changes. Infrastructure is up-to-date".to_string()
                };
                data.insert("has_changes".to_string(), json!(changes.has_changes()));
                data.insert("changes".to_string(), json!(changes));
                message
            }
            "apply" => {
                let output = self.run(self.assemble("apply"))?;
                let resources = parse_apply_results(&output);
                let message = format!(
                    "Apply complete: {} added, {} changed, {} destroyed",
                    resources.added, resources.changed, resources.destroyed
                );
                data.insert("applied".to_string(), json!(true));
                data.insert("resources".to_string(), json!(resources));
                message
            }
            "destroy" => {
                let output = self.run(self.assemble("destroy"))?;
                let count = count_destroyed(&output);
                data.insert("destroyed".to_string(), json!(true));
                data.insert("resources_destroyed".to_string(), json!(count));
                format!("Destroy complete: {} resources destroyed", count)
            }
            _ => {
                let output = self.run(self.assemble("output"))?;
                // Unparseable output (e.g. no outputs defined) yields an
                // empty map rather than an error.
                let outputs: Map<String, Value> =
                    serde_json::from_str(&output).unwrap_or_default();
                let count = outputs.len();
                data.insert("outputs".to_string(), Value::Object(outputs));
                format!("Retrieved {} output values", count)
            }
        };

        Ok(Outcome::succeeded(message, Value::Object(data)))
    }
}

fn init_message(providers: &[String]) -> String {
    if providers.is_empty() {
        "Terraform initialized successfully".to_string()
    } else {
        format!(
            "Terraform initialized successfully with providers: {}",
            providers.join(", ")
        )
    }
}
