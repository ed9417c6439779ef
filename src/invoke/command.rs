// ABOUTME: Second-order remote commands whose payload is itself an envelope.
// ABOUTME: Unwraps the inner `{error, result}` and rebuilds typed errors by their kind tag.

use serde_json::Value;

use super::{InvokeOptions, Invoker};
use crate::error::{Error, Result};

pub const SET_CONFIG: &str = "set-config";
pub const GET_CONFIG: &str = "get-config";
pub const INITIALIZE: &str = "initialize";

/// Invoke a command and unwrap both the invocation envelope and the
/// command's own envelope.
pub async fn run_command(
    invoker: &dyn Invoker,
    command: &str,
    argument: &Value,
    options: &InvokeOptions,
) -> Result<Value> {
    let response = invoker.invoke_and_return(command, argument, options).await?;
    unwrap_command_response(response)
}

/// Normalize a command's own `{error, result}` payload.
///
/// A `null` member counts as absent. Both members present is malformed; neither
/// present is a `null` result.
pub fn unwrap_command_response(response: Value) -> Result<Value> {
    let mut members = match response {
        Value::Object(members) => members,
        other => {
            return Err(Error::server(format!(
                "malformed command response, expected an object: {other}"
            )));
        }
    };

    let error = members.remove("error").filter(|v| !v.is_null());
    let result = members.remove("result").filter(|v| !v.is_null());

    match (error, result) {
        (Some(_), Some(_)) => Err(Error::server(
            "malformed command response: both error and result are set",
        )),
        (Some(Value::String(message)), None) => Err(Error::server(message)),
        (Some(error), None) => Err(Error::from_serialized(&error)),
        (None, Some(result)) => Ok(result),
        (None, None) => Ok(Value::Null),
    }
}
