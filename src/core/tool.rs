//! Tool families and their capability tables.
//!
//! Flag vocabularies live here as per-tool lookup methods instead of
//! substring checks on an assembled command string. When a caller supplies
//! an override command, capabilities are still resolved from the declared
//! tool, never sniffed from the command text.

use crate::defaults;
use crate::error::{Error, Result};
use crate::utils::shell;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildTool {
    Maven,
    Gradle,
    Npm,
    Pip,
    Go,
}

impl BuildTool {
    pub const KEYS: [&'static str; 5] = ["maven", "gradle", "npm", "pip", "go"];

    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "maven" => Ok(Self::Maven),
            "gradle" => Ok(Self::Gradle),
            "npm" => Ok(Self::Npm),
            "pip" => Ok(Self::Pip),
            "go" => Ok(Self::Go),
            other => Err(Error::validation_invalid_value(
                "build_tool",
                Some(other.to_string()),
                format!("Unsupported build tool. Supported: {}", Self::KEYS.join(", ")),
            )),
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Self::Maven => "maven",
            Self::Gradle => "gradle",
            Self::Npm => "npm",
            Self::Pip => "pip",
            Self::Go => "go",
        }
    }

    pub fn default_command(&self) -> String {
        defaults::get()
            .build_commands
            .get(self.key())
            .cloned()
            .unwrap_or_else(|| {
                defaults::builtin()
                    .build_commands
                    .get(self.key())
                    .cloned()
                    .unwrap_or_default()
            })
    }

    /// Flag to skip test execution during the build, where the tool supports it.
    pub fn skip_tests_flag(&self) -> Option<&'static str> {
        match self {
            Self::Maven => Some("-DskipTests"),
            Self::Gradle => Some("-x test"),
            _ => None,
        }
    }

    /// Glob patterns for build artifacts relative to the project root.
    pub fn artifact_patterns(&self) -> &'static [&'static str] {
        match self {
            Self::Maven => &["target/*.jar", "target/*.war"],
            Self::Gradle => &["build/libs/*.jar"],
            Self::Npm => &["dist/**/*", "build/**/*"],
            Self::Pip => &[],
            Self::Go => &["bin/*"],
        }
    }
}

/// How a framework enables coverage instrumentation.
pub enum CoverageMode {
    /// The base command is swapped for a dedicated coverage invocation.
    ReplaceBase(&'static str),
    /// Coverage flags are appended to the base command.
    Append(&'static str),
    /// The framework has no coverage integration here.
    Unsupported,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestFramework {
    Maven,
    Gradle,
    Pytest,
    Jest,
    GoTest,
}

impl TestFramework {
    pub const KEYS: [&'static str; 5] = ["maven", "gradle", "pytest", "jest", "gotest"];

    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "maven" => Ok(Self::Maven),
            "gradle" => Ok(Self::Gradle),
            "pytest" => Ok(Self::Pytest),
            "jest" => Ok(Self::Jest),
            "gotest" => Ok(Self::GoTest),
            other => Err(Error::validation_invalid_value(
                "test_framework",
                Some(other.to_string()),
                format!(
                    "Unsupported test framework. Supported: {}",
                    Self::KEYS.join(", ")
                ),
            )),
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Self::Maven => "maven",
            Self::Gradle => "gradle",
            Self::Pytest => "pytest",
            Self::Jest => "jest",
            Self::GoTest => "gotest",
        }
    }

    pub fn default_command(&self) -> String {
        defaults::get()
            .test_commands
            .get(self.key())
            .cloned()
            .unwrap_or_else(|| {
                defaults::builtin()
                    .test_commands
                    .get(self.key())
                    .cloned()
                    .unwrap_or_default()
            })
    }

    pub fn coverage_mode(&self) -> CoverageMode {
        match self {
            Self::Maven => CoverageMode::ReplaceBase("mvn test jacoco:report"),
            Self::Gradle => CoverageMode::Append("jacocoTestReport"),
            Self::Pytest => CoverageMode::Append("--cov --cov-report=term --cov-report=html"),
            Self::Jest => CoverageMode::Append("--coverage"),
            Self::GoTest => CoverageMode::Unsupported,
        }
    }

    pub fn fail_fast_flag(&self) -> Option<&'static str> {
        match self {
            Self::Pytest => Some("-x"),
            Self::Maven => Some("-DfailIfNoTests=false"),
            _ => None,
        }
    }

    pub fn parallel_flag(&self) -> Option<&'static str> {
        match self {
            Self::Pytest => Some("-n auto"),
            Self::Maven => Some("-T 1C"),
            Self::Jest => Some("--maxWorkers=50%"),
            _ => None,
        }
    }

    /// Arguments selecting tests by name/file pattern. The pattern is shell
    /// quoted because test commands run through `sh -c`.
    pub fn pattern_args(&self, pattern: &str) -> Option<String> {
        match self {
            Self::Pytest => Some(format!("-k {}", shell::quote_arg(pattern))),
            Self::Maven => Some(format!("-Dtest={}", shell::quote_arg(pattern))),
            _ => None,
        }
    }
}

/// Mutable builder state for assembling a shell command line through a
/// sequence of named transformations. Order of application matters and is
/// owned by each operation's assembler.
#[derive(Debug, Clone)]
pub struct CommandBuilder {
    command: String,
}

impl CommandBuilder {
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            command: base.into(),
        }
    }

    /// Replace the entire base command (coverage swaps, caller overrides).
    pub fn replace_base(&mut self, base: impl Into<String>) -> &mut Self {
        self.command = base.into();
        self
    }

    /// Append a token (or token group) separated by a single space.
    pub fn append(&mut self, token: &str) -> &mut Self {
        if !token.is_empty() {
            if !self.command.is_empty() {
                self.command.push(' ');
            }
            self.command.push_str(token);
        }
        self
    }

    /// Remove a single word token from the command, collapsing the space.
    /// Used to disable default safety behaviors (e.g. dropping `clean`).
    pub fn remove_token(&mut self, token: &str) -> &mut Self {
        let leading = format!("{} ", token);
        if let Some(pos) = self.find_word(&leading) {
            self.command.replace_range(pos..pos + leading.len(), "");
            return self;
        }
        let trailing = format!(" {}", token);
        if self.command.ends_with(&trailing) {
            let len = self.command.len();
            self.command.truncate(len - trailing.len());
        }
        self
    }

    pub fn build(&self) -> String {
        self.command.clone()
    }

    fn find_word(&self, needle: &str) -> Option<usize> {
        // Only match at a word boundary so `clean ` does not hit `goclean `.
        let mut start = 0;
        while let Some(rel) = self.command[start..].find(needle) {
            let pos = start + rel;
            let boundary = pos == 0
                || self.command[..pos]
                    .chars()
                    .next_back()
                    .is_some_and(|c| c == ' ');
            if boundary {
                return Some(pos);
            }
            start = pos + 1;
        }
        None
    }
}
