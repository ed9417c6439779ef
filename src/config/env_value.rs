// ABOUTME: Config values that are either literal or read from the environment.
// ABOUTME: Used for credential profiles, key pairs, and emulator environment.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::collections::HashMap;

/// `profile: default` or `profile: { env: AWS_PROFILE, default: default }`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum EnvValue {
    Literal(String),
    FromEnv {
        #[serde(rename = "env")]
        var: String,
        #[serde(default)]
        default: Option<String>,
    },
}

impl EnvValue {
    pub fn literal(value: impl Into<String>) -> Self {
        EnvValue::Literal(value.into())
    }

    pub fn resolve(&self) -> Result<String> {
        match self {
            EnvValue::Literal(value) => Ok(value.clone()),
            EnvValue::FromEnv { var, default } => std::env::var(var)
                .ok()
                .or_else(|| default.clone())
                .ok_or_else(|| {
                    Error::invalid_field(var, format!("environment variable {var} is not set"))
                }),
        }
    }

    /// Resolve an optional value; an absent value stays absent.
    pub fn resolve_opt(value: Option<&EnvValue>) -> Result<Option<String>> {
        value.map(EnvValue::resolve).transpose()
    }
}

/// Resolve every value of an environment map.
pub fn resolve_env_map(map: &HashMap<String, EnvValue>) -> Result<HashMap<String, String>> {
    map.iter()
        .map(|(k, v)| v.resolve().map(|resolved| (k.clone(), resolved)))
        .collect()
}
