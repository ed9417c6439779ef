// ABOUTME: Local emulator configuration.
// ABOUTME: Executable, leading arguments, and environment for local invocations.

use serde::Deserialize;
use std::collections::HashMap;

use super::EnvValue;

#[derive(Debug, Clone, Deserialize)]
pub struct LocalConfig {
    /// Emulator executable, looked up on `PATH` unless absolute.
    #[serde(default = "default_command")]
    pub command: String,

    /// Arguments placed before the per-invocation flags.
    #[serde(default = "default_args")]
    pub args: Vec<String>,

    /// Extra environment for the emulator process.
    #[serde(default)]
    pub env: HashMap<String, EnvValue>,
}

fn default_command() -> String {
    "tdl-emulator".to_string()
}

fn default_args() -> Vec<String> {
    vec!["invoke".to_string()]
}

impl Default for LocalConfig {
    fn default() -> Self {
        LocalConfig {
            command: default_command(),
            args: default_args(),
            env: HashMap::new(),
        }
    }
}

/// Companion services stack settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ServicesConfig {
    /// Template the companion stack is created or updated from.
    pub template_url: String,

    /// Features that can be toggled on the companion stack.
    #[serde(default)]
    pub features: Vec<String>,

    /// Default key pair for instances the companion stack launches.
    #[serde(default)]
    pub key_pair: Option<EnvValue>,
}
