// ABOUTME: Invoker that shells out to a local emulator process.
// ABOUTME: Passes the argument and result through a fresh pair of temporary JSON files.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tokio::sync::Mutex;

use super::{Envelope, InvokeOptions, InvokeTarget, Invoker, parse_payload};
use crate::config::{Config, resolve_env_map};
use crate::error::{Error, Result};

/// Runs `<command> <args..> --function <name> --no-logs --input <in> --output <out>`
/// inside the project directory.
///
/// Invocations from one `LocalInvoker` are serialized; a second call waits for
/// the first to finish.
pub struct LocalInvoker {
    command: String,
    args: Vec<String>,
    project_dir: PathBuf,
    env: HashMap<String, String>,
    running: Mutex<()>,
}

impl LocalInvoker {
    pub fn new(command: impl Into<String>, project_dir: impl Into<PathBuf>) -> Self {
        Self {
            command: command.into(),
            args: Vec::new(),
            project_dir: project_dir.into(),
            env: HashMap::new(),
            running: Mutex::new(()),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(&config.local.command, config.project_dir())
            .args(config.local.args.clone())
            .envs(resolve_env_map(&config.local.env)?))
    }

    /// Arguments placed before the per-invocation flags.
    pub fn args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    pub fn envs(mut self, env: HashMap<String, String>) -> Self {
        self.env = env;
        self
    }

    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    async fn call(&self, function: &str, argument: &Value) -> Result<Value> {
        if !self.project_dir.is_dir() {
            return Err(Error::invalid_environment(format!(
                "project directory {} does not exist",
                self.project_dir.display()
            )));
        }

        let _running = self.running.lock().await;

        let input = tempfile::Builder::new()
            .prefix("tdl-input-")
            .suffix(".json")
            .tempfile()?;
        let output_file = tempfile::Builder::new()
            .prefix("tdl-output-")
            .suffix(".json")
            .tempfile()?;
        tokio::fs::write(input.path(), serde_json::to_vec(argument)?).await?;

        tracing::info!(command = %self.command, function, "running local emulator");

        let spawned = Command::new(&self.command)
            .args(&self.args)
            .arg("--function")
            .arg(function)
            .arg("--no-logs")
            .arg("--input")
            .arg(input.path())
            .arg("--output")
            .arg(output_file.path())
            .current_dir(&self.project_dir)
            .envs(&self.env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await;

        let output = match spawned {
            Ok(output) => output,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::missing_executable(&self.command));
            }
            Err(e) => return Err(e.into()),
        };

        let content = tokio::fs::read(output_file.path()).await?;

        if !output.status.success() {
            tracing::warn!(function, exit_code = ?output.status.code(), "local emulator failed");
            return Err(Error::server(failure_message(
                &output.stderr,
                &content,
                &output.stdout,
                output.status.code(),
            )));
        }

        parse_payload(&content, function)
    }
}

/// Error output first, then the result file, then standard output.
fn failure_message(stderr: &[u8], content: &[u8], stdout: &[u8], code: Option<i32>) -> String {
    [stderr, content, stdout]
        .into_iter()
        .map(|bytes| String::from_utf8_lossy(bytes).trim().to_string())
        .find(|text| !text.is_empty())
        .unwrap_or_else(|| match code {
            Some(code) => format!("local emulator exited with status {code}"),
            None => "local emulator was terminated by a signal".to_string(),
        })
}

#[async_trait]
impl Invoker for LocalInvoker {
    fn target(&self) -> InvokeTarget {
        InvokeTarget::Local
    }

    async fn invoke(&self, function: &str, argument: &Value, _options: &InvokeOptions) -> Envelope<Value> {
        Envelope::from_result(self.call(function, argument).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_prefers_error_output() {
        assert_eq!(failure_message(b"boom\n", b"{}", b"out", Some(1)), "boom");
    }

    #[test]
    fn failure_falls_back_to_result_then_stdout() {
        assert_eq!(failure_message(b"  ", b"{\"x\":1}", b"out", Some(1)), "{\"x\":1}");
        assert_eq!(failure_message(b"", b"", b"out", Some(1)), "out");
    }

    #[test]
    fn failure_without_output_names_the_status() {
        assert_eq!(
            failure_message(b"", b"", b"", Some(4)),
            "local emulator exited with status 4"
        );
    }

    #[tokio::test]
    async fn missing_project_dir_is_invalid_environment() {
        let invoker = LocalInvoker::new("sh", "/nonexistent/tdl-project");
        let envelope = invoker
            .invoke("get-config", &Value::Null, &InvokeOptions::default())
            .await;
        assert_eq!(
            envelope.error().map(Error::kind),
            Some(crate::error::ErrorKind::InvalidEnvironment)
        );
    }
}
