//! Default command templates for supported tools.
//!
//! Process-wide immutable configuration, resolved once on first access.
//! A `stagehand.json` file (path taken from `STAGEHAND_CONFIG`, falling back
//! to `./stagehand.json`) may override individual entries; a missing or
//! invalid file silently yields the built-in table.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::sync::OnceLock;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StagehandConfig {
    #[serde(default)]
    pub defaults: Defaults,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Defaults {
    #[serde(default = "default_build_commands")]
    pub build_commands: BTreeMap<String, String>,

    #[serde(default = "default_test_commands")]
    pub test_commands: BTreeMap<String, String>,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            build_commands: default_build_commands(),
            test_commands: default_test_commands(),
        }
    }
}

fn default_build_commands() -> BTreeMap<String, String> {
    [
        ("maven", "mvn clean install"),
        ("gradle", "./gradlew clean build"),
        ("npm", "npm run build"),
        ("pip", "pip install -e ."),
        ("go", "go build -o ./bin/app"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

fn default_test_commands() -> BTreeMap<String, String> {
    [
        ("maven", "mvn test"),
        ("gradle", "./gradlew test"),
        ("pytest", "pytest"),
        ("jest", "npm test"),
        ("gotest", "go test ./..."),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

static DEFAULTS: OnceLock<Defaults> = OnceLock::new();

/// The resolved default-command tables. Loaded once; never mutated.
pub fn get() -> &'static Defaults {
    DEFAULTS.get_or_init(|| load_from_file().unwrap_or_default())
}

fn load_from_file() -> Option<Defaults> {
    let path = std::env::var("STAGEHAND_CONFIG").unwrap_or_else(|_| "stagehand.json".to_string());
    let content = fs::read_to_string(path).ok()?;
    let config: StagehandConfig = serde_json::from_str(&content).ok()?;
    Some(config.defaults)
}

/// Built-in defaults, ignoring any file override.
pub fn builtin() -> Defaults {
    Defaults::default()
}
