// ABOUTME: Invoker backed by synchronous remote function calls.
// ABOUTME: Qualifies names with the stack prefix and gates unsafe commands behind confirmation.

use async_trait::async_trait;
use serde_json::Value;

use super::confirm::Confirm;
use super::{Envelope, InvokeOptions, InvokeTarget, Invoker, parse_payload};
use crate::cloud::{FunctionOps, ProviderError};
use crate::error::{Error, Result};
use crate::types::{FunctionName, StackName};

pub struct RemoteInvoker<'a, F: ?Sized> {
    api: &'a F,
    stack: StackName,
    confirm: &'a dyn Confirm,
    safe_commands: Vec<String>,
}

impl<'a, F: FunctionOps + ?Sized> RemoteInvoker<'a, F> {
    pub fn new(api: &'a F, stack: StackName, confirm: &'a dyn Confirm) -> Self {
        Self {
            api,
            stack,
            confirm,
            safe_commands: vec![super::GET_CONFIG.to_string()],
        }
    }

    /// Commands that run without asking, by short name.
    pub fn safe_commands(mut self, commands: Vec<String>) -> Self {
        self.safe_commands = commands;
        self
    }

    fn needs_confirmation(&self, function: &FunctionName, options: &InvokeOptions) -> bool {
        if options.pre_approved || options.remote_explicit {
            return false;
        }
        let short = function.short_name(&self.stack);
        !self.safe_commands.iter().any(|safe| safe == short)
    }

    async fn call(&self, function: &str, argument: &Value, options: &InvokeOptions) -> Result<Value> {
        let function = FunctionName::qualify(&self.stack, function);

        if self.needs_confirmation(&function, options) {
            let prompt = format!(
                "Run `{}` against the remote stack {}?",
                function.short_name(&self.stack),
                self.stack
            );
            super::require(self.confirm, &prompt).await?;
        }

        let payload = serde_json::to_vec(argument)?;
        tracing::debug!(function = %function, bytes = payload.len(), "invoking remote function");

        let response = self
            .api
            .invoke_function(&function, payload)
            .await
            .map_err(|e| match e {
                ProviderError::NotFound(message) => Error::not_found(function.as_str(), message),
                other => Error::server(format!("invoking {function} failed: {other}")),
            })?;

        if response.is_failure() {
            tracing::warn!(
                function = %function,
                status = response.status_code,
                function_error = ?response.function_error,
                "remote function failed"
            );
            return Err(Error::server(String::from_utf8_lossy(&response.payload).into_owned()));
        }

        parse_payload(&response.payload, function.as_str())
    }
}

#[async_trait]
impl<F: FunctionOps + ?Sized> Invoker for RemoteInvoker<'_, F> {
    fn target(&self) -> InvokeTarget {
        InvokeTarget::Remote
    }

    async fn invoke(&self, function: &str, argument: &Value, options: &InvokeOptions) -> Envelope<Value> {
        Envelope::from_result(self.call(function, argument, options).await)
    }
}
