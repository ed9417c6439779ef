// ABOUTME: Integration tests for configuration parsing and validation.
// ABOUTME: Tests YAML parsing, env var interpolation, discovery, stage overrides, and init.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;
use tdlctl::config::*;
use tdlctl::error::ErrorKind;
use tdlctl::invoke::InvokeTarget;

const MINIMAL: &str = "org: acme\nstage: prod\nregion: eu-west-1\n";

mod parsing {
    use super::*;

    #[test]
    fn parse_full_config() {
        let yaml = r#"
org: acme
stage: prod
region: eu-west-1
profile: ops
items_dir: deploy/items
project_dir: backend
safe_commands: [get-config, list-bots]
target: local
retry:
  delay: 5s
  max_attempts: 12
wait:
  max_wait: 30m
local:
  command: /opt/tdl/emulator
  args: [run]
  env:
    STAGE: prod
services:
  template_url: https://example.com/services.yml
  features: [inference, image-gen]
max_nesting_depth: 3
"#;
        let config = Config::from_yaml(yaml).unwrap();

        assert_eq!(config.items_dir, PathBuf::from("deploy/items"));
        assert_eq!(config.safe_commands, ["get-config", "list-bots"]);
        assert_eq!(config.target, InvokeTarget::Local);
        assert_eq!(config.retry.delay, Duration::from_secs(5));
        assert_eq!(config.retry.max_attempts, 12);
        assert_eq!(config.wait.max_wait, Duration::from_secs(30 * 60));
        assert_eq!(config.local.command, "/opt/tdl/emulator");
        assert_eq!(config.local.args, ["run"]);
        assert_eq!(config.max_nesting_depth, 3);

        let services = config.services.as_ref().unwrap();
        assert_eq!(services.features, ["inference", "image-gen"]);

        let client = config.client_config().unwrap();
        assert_eq!(client.region, "eu-west-1");
        assert_eq!(client.profile.as_deref(), Some("ops"));
        assert_eq!(client.max_wait, Duration::from_secs(30 * 60));
    }

    #[test]
    fn defaults_cover_retry_wait_and_emulator() {
        let config = Config::from_yaml(MINIMAL).unwrap();

        assert_eq!(config.retry, RetryConfig::default());
        assert_eq!(config.retry.delay, Duration::from_secs(10));
        assert_eq!(config.retry.max_attempts, 60);
        assert_eq!(config.wait.max_wait, Duration::from_secs(2 * 60 * 60));
        assert_eq!(config.local.command, "tdl-emulator");
        assert_eq!(config.local.args, ["invoke"]);
        assert!(config.services.is_none());
    }

    #[test]
    fn missing_org_is_rejected() {
        assert!(Config::from_yaml("stage: prod\nregion: eu-west-1\n").is_err());
    }

    #[test]
    fn uppercase_org_is_invalid_input() {
        let err = Config::from_yaml("org: ACME\nstage: prod\nregion: eu-west-1\n").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn zero_retry_attempts_is_rejected() {
        let yaml = format!("{MINIMAL}retry:\n  max_attempts: 0\n");
        let err = Config::from_yaml(&yaml).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }
}

mod env_values {
    use super::*;

    #[test]
    fn profile_reads_from_environment() {
        let yaml = format!("{MINIMAL}profile:\n  env: TDL_TEST_PROFILE\n  default: fallback\n");
        let config = Config::from_yaml(&yaml).unwrap();

        temp_env::with_var("TDL_TEST_PROFILE", Some("from-env"), || {
            let client = config.client_config().unwrap();
            assert_eq!(client.profile.as_deref(), Some("from-env"));
        });
        temp_env::with_var_unset("TDL_TEST_PROFILE", || {
            let client = config.client_config().unwrap();
            assert_eq!(client.profile.as_deref(), Some("fallback"));
        });
    }

    #[test]
    fn unset_variable_without_default_is_an_error() {
        let value = EnvValue::FromEnv {
            var: "TDL_TEST_UNSET".to_string(),
            default: None,
        };
        temp_env::with_var_unset("TDL_TEST_UNSET", || {
            let err = value.resolve().unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidInput);
        });
    }

    #[test]
    fn env_map_resolves_every_entry() {
        let map = HashMap::from([
            ("STAGE".to_string(), EnvValue::literal("prod")),
            (
                "TOKEN".to_string(),
                EnvValue::FromEnv {
                    var: "TDL_TEST_TOKEN".to_string(),
                    default: None,
                },
            ),
        ]);
        temp_env::with_var("TDL_TEST_TOKEN", Some("secret"), || {
            let resolved = resolve_env_map(&map).unwrap();
            assert_eq!(resolved["STAGE"], "prod");
            assert_eq!(resolved["TOKEN"], "secret");
        });
    }
}

mod stages {
    use super::*;

    const WITH_STAGES: &str = r#"
org: acme
stage: dev
region: eu-west-1
stages:
  prod:
    region: us-east-1
    profile: prod-admin
  partner:
    org: partner-co
"#;

    #[test]
    fn stage_override_applies_region_and_profile() {
        let config = Config::from_yaml(WITH_STAGES).unwrap();
        let prod = config.for_stage("prod").unwrap();

        assert_eq!(prod.stack_name().unwrap().as_str(), "tdl-acme-ltd-prod");
        assert_eq!(prod.region, "us-east-1");
        assert_eq!(prod.client_config().unwrap().profile.as_deref(), Some("prod-admin"));
    }

    #[test]
    fn stage_without_overrides_only_renames() {
        let config = Config::from_yaml(WITH_STAGES).unwrap();
        let qa = config.for_stage("qa").unwrap();

        assert_eq!(qa.stack_name().unwrap().as_str(), "tdl-acme-ltd-qa");
        assert_eq!(qa.region, "eu-west-1");
    }

    #[test]
    fn stage_can_switch_org() {
        let config = Config::from_yaml(WITH_STAGES).unwrap();
        let partner = config.for_stage("partner").unwrap();

        assert_eq!(partner.stack_name().unwrap().as_str(), "tdl-partner-co-ltd-partner");
    }

    #[test]
    fn invalid_stage_name_is_rejected() {
        let config = Config::from_yaml(WITH_STAGES).unwrap();
        assert!(config.for_stage("Prod!").is_err());
    }
}

mod discovery {
    use super::*;
    use std::fs;

    #[test]
    fn discovers_tdl_yml_and_resolves_paths_against_it() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("tdl.yml"), MINIMAL).unwrap();

        let config = Config::discover(dir.path()).unwrap();

        assert_eq!(config.base_dir, dir.path());
        assert_eq!(config.items_dir(), dir.path().join("config"));
        assert_eq!(config.project_dir(), dir.path().join("."));
    }

    #[test]
    fn discovers_dotdir_config() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join(".tdl")).unwrap();
        fs::write(dir.path().join(CONFIG_FILENAME_DIR), MINIMAL).unwrap();

        let config = Config::discover(dir.path()).unwrap();

        assert_eq!(config.base_dir, dir.path());
    }

    #[test]
    fn missing_config_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::discover(dir.path()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}

mod init {
    use super::*;
    use std::fs;

    #[test]
    fn writes_a_loadable_template() {
        let dir = tempfile::tempdir().unwrap();

        init_config(dir.path(), Some("acme"), Some("prod"), Some("eu-west-1"), false).unwrap();

        let config = Config::discover(dir.path()).unwrap();
        assert_eq!(config.stack_name().unwrap().as_str(), "tdl-acme-ltd-prod");
        assert_eq!(config.region, "eu-west-1");
    }

    #[test]
    fn refuses_to_overwrite_without_force() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILENAME), "existing: config").unwrap();

        let err = init_config(dir.path(), None, None, None, false).unwrap_err();
        assert!(err.to_string().contains("already exists"));

        init_config(dir.path(), None, None, None, true).unwrap();
        assert!(Config::discover(dir.path()).is_ok());
    }

    #[test]
    fn invalid_org_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();

        assert!(init_config(dir.path(), Some("Bad Org"), None, None, false).is_err());
        assert!(!dir.path().join(CONFIG_FILENAME).exists());
    }
}
