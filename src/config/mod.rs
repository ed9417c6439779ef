// ABOUTME: Configuration types and parsing for tdl.yml.
// ABOUTME: Handles YAML parsing, env var interpolation, and per-stage overrides.

mod env_value;
mod init;
mod local;
mod retry;

pub use env_value::{EnvValue, resolve_env_map};
pub use init::init_config;
pub use local::{LocalConfig, ServicesConfig};
pub use retry::{RetryConfig, WaitConfig};

use crate::cloud::ClientConfig;
use crate::error::{Error, Result};
use crate::invoke::InvokeTarget;
use crate::types::StackName;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub const CONFIG_FILENAME: &str = "tdl.yml";
pub const CONFIG_FILENAME_ALT: &str = "tdl.yaml";
pub const CONFIG_FILENAME_DIR: &str = ".tdl/config.yml";

/// Default limit for nested stack traversal.
pub const DEFAULT_MAX_NESTING_DEPTH: usize = 5;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub org: String,

    pub stage: String,

    pub region: String,

    #[serde(default)]
    pub profile: Option<EnvValue>,

    /// Directory holding deploy item payloads (`style.json`, `bot.yml`, ...).
    #[serde(default = "default_items_dir")]
    pub items_dir: PathBuf,

    /// Root the local emulator runs in.
    #[serde(default = "default_project_dir")]
    pub project_dir: PathBuf,

    /// Remote commands that run without a confirmation prompt.
    #[serde(default = "default_safe_commands")]
    pub safe_commands: Vec<String>,

    #[serde(default)]
    pub target: InvokeTarget,

    #[serde(default)]
    pub retry: RetryConfig,

    #[serde(default)]
    pub wait: WaitConfig,

    #[serde(default)]
    pub local: LocalConfig,

    #[serde(default)]
    pub services: Option<ServicesConfig>,

    #[serde(default = "default_max_nesting_depth")]
    pub max_nesting_depth: usize,

    #[serde(default)]
    pub stages: HashMap<String, StageOverride>,

    /// Directory the config was loaded from; relative paths resolve against it.
    #[serde(skip)]
    pub base_dir: PathBuf,
}

/// Per-stage overrides, selected with `--stage`.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct StageOverride {
    #[serde(default)]
    pub org: Option<String>,

    #[serde(default)]
    pub region: Option<String>,

    #[serde(default)]
    pub profile: Option<EnvValue>,
}

fn default_items_dir() -> PathBuf {
    PathBuf::from("config")
}

fn default_project_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_safe_commands() -> Vec<String> {
    vec!["get-config".to_string()]
}

fn default_max_nesting_depth() -> usize {
    DEFAULT_MAX_NESTING_DEPTH
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.stack_name()?;
        if config.max_nesting_depth == 0 {
            return Err(Error::invalid_field(
                "max_nesting_depth",
                "max_nesting_depth must be at least 1",
            ));
        }
        if config.retry.max_attempts == 0 {
            return Err(Error::invalid_field(
                "retry.max_attempts",
                "retry.max_attempts must be at least 1",
            ));
        }
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_yaml(&content)?;
        config.base_dir = config_root(path);
        Ok(config)
    }

    pub fn discover(dir: &Path) -> Result<Self> {
        let candidates = [
            dir.join(CONFIG_FILENAME),
            dir.join(CONFIG_FILENAME_ALT),
            dir.join(CONFIG_FILENAME_DIR),
        ];

        for path in &candidates {
            if path.exists() {
                tracing::debug!(path = %path.display(), "loading config");
                return Self::load(path);
            }
        }

        Err(Error::not_found(
            "config",
            format!("no {CONFIG_FILENAME} found in {}", dir.display()),
        ))
    }

    /// Switch to another stage, applying its overrides if any are declared.
    pub fn for_stage(&self, stage: &str) -> Result<Config> {
        let mut merged = self.clone();
        merged.stage = stage.to_string();

        if let Some(overrides) = self.stages.get(stage) {
            if let Some(ref org) = overrides.org {
                merged.org = org.clone();
            }
            if let Some(ref region) = overrides.region {
                merged.region = region.clone();
            }
            if overrides.profile.is_some() {
                merged.profile = overrides.profile.clone();
            }
        }

        merged.stack_name()?;
        Ok(merged)
    }

    /// The primary stack name, `tdl-<org>-ltd-<stage>`.
    pub fn stack_name(&self) -> Result<StackName> {
        StackName::new(&self.org, &self.stage)
            .map_err(|e| Error::invalid_field("org/stage", e.to_string()))
    }

    pub fn client_config(&self) -> Result<ClientConfig> {
        let mut client = ClientConfig::new(&self.region).max_wait(self.wait.max_wait);
        if let Some(profile) = EnvValue::resolve_opt(self.profile.as_ref())? {
            client = client.profile(profile);
        }
        Ok(client)
    }

    pub fn project_dir(&self) -> PathBuf {
        self.base_dir.join(&self.project_dir)
    }

    pub fn items_dir(&self) -> PathBuf {
        self.base_dir.join(&self.items_dir)
    }

    pub fn template() -> Self {
        Config {
            org: "my-org".to_string(),
            stage: "dev".to_string(),
            region: "us-east-1".to_string(),
            profile: None,
            items_dir: default_items_dir(),
            project_dir: default_project_dir(),
            safe_commands: default_safe_commands(),
            target: InvokeTarget::default(),
            retry: RetryConfig::default(),
            wait: WaitConfig::default(),
            local: LocalConfig::default(),
            services: None,
            max_nesting_depth: default_max_nesting_depth(),
            stages: HashMap::new(),
            base_dir: PathBuf::new(),
        }
    }
}

/// Directory relative config paths resolve against: the file's directory, or
/// the project root for `.tdl/config.yml`.
fn config_root(path: &Path) -> PathBuf {
    let parent = path.parent().unwrap_or_else(|| Path::new(""));
    if parent.file_name().is_some_and(|name| name == ".tdl") {
        parent.parent().unwrap_or(parent).to_path_buf()
    } else {
        parent.to_path_buf()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = "org: acme\nstage: prod\nregion: eu-west-1\n";

    #[test]
    fn minimal_config_gets_defaults() {
        let config = Config::from_yaml(MINIMAL).unwrap();
        assert_eq!(config.items_dir, PathBuf::from("config"));
        assert_eq!(config.safe_commands, vec!["get-config".to_string()]);
        assert_eq!(config.max_nesting_depth, DEFAULT_MAX_NESTING_DEPTH);
        assert_eq!(config.target, InvokeTarget::Remote);
        assert_eq!(config.stack_name().unwrap().as_str(), "tdl-acme-ltd-prod");
    }

    #[test]
    fn rejects_invalid_stage() {
        let err = Config::from_yaml("org: acme\nstage: Prod-1\nregion: eu-west-1\n").unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::InvalidInput);
    }

    #[test]
    fn rejects_zero_nesting_depth() {
        let yaml = format!("{MINIMAL}max_nesting_depth: 0\n");
        assert!(Config::from_yaml(&yaml).is_err());
    }

    #[test]
    fn dotdir_config_resolves_against_project_root() {
        assert_eq!(
            config_root(Path::new("/work/app/.tdl/config.yml")),
            PathBuf::from("/work/app")
        );
        assert_eq!(
            config_root(Path::new("/work/app/tdl.yml")),
            PathBuf::from("/work/app")
        );
    }
}
