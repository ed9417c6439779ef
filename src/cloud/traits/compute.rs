// ABOUTME: Function invocation trait for cloud providers.
// ABOUTME: Synchronous request/response calls against remote compute functions.

use crate::cloud::ProviderError;
use crate::types::FunctionName;
use async_trait::async_trait;

/// Remote function invocation.
#[async_trait]
pub trait FunctionOps: Send + Sync {
    /// Invoke a function synchronously with a raw payload.
    async fn invoke_function(
        &self,
        function: &FunctionName,
        payload: Vec<u8>,
    ) -> Result<FunctionResponse, ProviderError>;
}

/// Raw response of a synchronous invocation.
#[derive(Debug, Clone)]
pub struct FunctionResponse {
    pub status_code: i32,
    /// Set when the function itself raised (e.g. `Unhandled`).
    pub function_error: Option<String>,
    pub payload: Vec<u8>,
}

impl FunctionResponse {
    pub fn is_failure(&self) -> bool {
        self.function_error.is_some() || self.status_code >= 300
    }
}
