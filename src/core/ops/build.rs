//! Project build operation.
//!
//! Required parameters: `build_tool` (maven, gradle, npm, pip, go) and
//! `project_path`. Optional: `build_command` (full override),
//! `build_arguments`, `skip_tests` (default false), `clean_before_build`
//! (default true).

use serde_json::json;
use std::path::Path;

use crate::error::Result;
use crate::invoke::{self, ExitPolicy, Invocation};
use crate::params::{require_dir_exists, ParameterSet};
use crate::tool::{BuildTool, CommandBuilder};

use super::{Operation, Outcome};

pub struct BuildOperation {
    params: ParameterSet,
}

impl BuildOperation {
    pub fn new(params: ParameterSet) -> Self {
        Self { params }
    }

    fn tool(&self) -> Result<BuildTool> {
        BuildTool::parse(self.params.required_str("build_tool")?)
    }

    fn project_path(&self) -> String {
        self.params.path_or("project_path", ".")
    }

    fn assemble(&self, tool: BuildTool) -> String {
        let base = match self.params.str("build_command") {
            Some(custom) => custom.to_string(),
            None => tool.default_command(),
        };
        let mut builder = CommandBuilder::new(base);

        apply_skip_tests(&mut builder, tool, self.params.bool_or("skip_tests", false));
        apply_clean_policy(&mut builder, self.params.bool_or("clean_before_build", true));

        if let Some(extra) = self.params.str("build_arguments") {
            builder.append(extra);
        }

        builder.build()
    }
}

/// Skip-tests transformation: appends the tool's flag where the capability
/// exists, no-op otherwise.
fn apply_skip_tests(builder: &mut CommandBuilder, tool: BuildTool, skip: bool) {
    if skip {
        if let Some(flag) = tool.skip_tests_flag() {
            builder.append(flag);
        }
    }
}

/// Clean-before-build defaults on; disabling removes the `clean` token from
/// the base command.
fn apply_clean_policy(builder: &mut CommandBuilder, clean: bool) {
    if !clean {
        builder.remove_token("clean");
    }
}

impl Operation for BuildOperation {
    fn validate(&self) -> Result<()> {
        self.params.require(&["build_tool", "project_path"])?;
        self.tool()?;
        require_dir_exists("project_path", &self.project_path())
    }

    fn execute(&self) -> Result<Outcome> {
        let tool = self.tool()?;
        let project_path = self.project_path();
        let command = self.assemble(tool);

        let invocation = Invocation::shell(command.clone(), Some(project_path.clone()));
        let outcome = invoke::run(&invocation, ExitPolicy::FailOnNonZero)?;

        let artifacts = find_artifacts(tool, &project_path);

        Ok(Outcome::succeeded(
            format!("Build completed successfully using {}", tool.key()),
            json!({
                "build_tool": tool.key(),
                "project_path": project_path,
                "command_executed": command,
                "artifacts": artifacts,
                // split, not lines(): the segment after a trailing newline counts
                "build_output_lines": outcome.output.split('\n').count(),
            }),
        ))
    }
}

/// Discover build artifacts via the tool's glob patterns, reported relative
/// to the project root.
fn find_artifacts(tool: BuildTool, project_path: &str) -> Vec<String> {
    let root = Path::new(project_path);
    let mut artifacts = Vec::new();

    for pattern in tool.artifact_patterns() {
        let full = root.join(pattern);
        let Some(full) = full.to_str() else { continue };
        let Ok(paths) = glob::glob(full) else { continue };

        for entry in paths.flatten() {
            if let Ok(relative) = entry.strip_prefix(root) {
                artifacts.push(relative.to_string_lossy().to_string());
            }
        }
    }

    artifacts
}
