// ABOUTME: Config scaffolding for new projects.
// ABOUTME: Creates tdl.yml template files.

use std::path::Path;

use crate::error::{Error, Result};
use crate::types::StackName;

use super::{CONFIG_FILENAME, Config};

pub fn init_config(
    dir: &Path,
    org: Option<&str>,
    stage: Option<&str>,
    region: Option<&str>,
    force: bool,
) -> Result<()> {
    let config_path = dir.join(CONFIG_FILENAME);

    if config_path.exists() && !force {
        return Err(Error::invalid_field(
            "path",
            format!("{} already exists (use --force to overwrite)", config_path.display()),
        ));
    }

    let mut config = Config::template();
    if let Some(org) = org {
        config.org = org.to_string();
    }
    if let Some(stage) = stage {
        config.stage = stage.to_string();
    }
    if let Some(region) = region {
        config.region = region.to_string();
    }

    StackName::new(&config.org, &config.stage)
        .map_err(|e| Error::invalid_field("org/stage", e.to_string()))?;

    std::fs::write(&config_path, generate_template_yaml(&config))?;
    tracing::info!(path = %config_path.display(), "wrote config template");

    Ok(())
}

fn generate_template_yaml(config: &Config) -> String {
    format!(
        r#"org: {}
stage: {}
region: {}
# profile: {{ env: AWS_PROFILE, default: default }}
items_dir: {}
safe_commands:
  - get-config
# Target remote functions by default; switch to `local` to use the emulator.
target: remote
local:
  command: {}
# services:
#   template_url: https://example.s3.amazonaws.com/services.yml
#   features: [inference]
"#,
        config.org,
        config.stage,
        config.region,
        config.items_dir.display(),
        config.local.command,
    )
}
