// ABOUTME: Uniform invocation of named operations on remote functions or a local emulator.
// ABOUTME: Both backends return the same envelope; second-order commands unwrap one more layer.

mod command;
mod confirm;
mod envelope;
mod local;
mod remote;

pub use command::{GET_CONFIG, INITIALIZE, SET_CONFIG, run_command, unwrap_command_response};
pub use confirm::{AutoApprove, Confirm, StdinConfirm, require};
pub use envelope::Envelope;
pub use local::LocalInvoker;
pub use remote::RemoteInvoker;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

/// Where invocations run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvokeTarget {
    #[default]
    Remote,
    Local,
}

/// Per-call options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InvokeOptions {
    /// The operator already approved this action (e.g. `--yes`).
    pub pre_approved: bool,
    /// The operator explicitly asked for the remote environment (e.g. `--remote`).
    pub remote_explicit: bool,
}

impl InvokeOptions {
    pub fn approved() -> Self {
        Self {
            pre_approved: true,
            remote_explicit: false,
        }
    }
}

/// Dispatches a named operation and reports its outcome as an envelope.
///
/// `invoke` never fails; every error is carried in [`Envelope::Error`].
#[async_trait]
pub trait Invoker: Send + Sync {
    fn target(&self) -> InvokeTarget;

    async fn invoke(&self, function: &str, argument: &Value, options: &InvokeOptions) -> Envelope<Value>;

    /// Invoke and unwrap, failing on an error envelope.
    async fn invoke_and_return(
        &self,
        function: &str,
        argument: &Value,
        options: &InvokeOptions,
    ) -> Result<Value> {
        self.invoke(function, argument, options).await.into_result()
    }
}

/// Parse a raw response payload; an empty payload is `null`.
fn parse_payload(raw: &[u8], source: &str) -> Result<Value> {
    if raw.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(raw).map_err(|e| {
        crate::error::Error::server(format!("{source} returned invalid JSON ({e}): {}", String::from_utf8_lossy(raw)))
    })
}
