// ABOUTME: Stack lifecycle error types with SNAFU pattern.
// ABOUTME: One variant per operation, carrying the stack it targeted and the provider cause.

use snafu::Snafu;

use super::template::TemplateError;
use crate::cloud::{ProviderError, StackEvent};
use crate::error::Error;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum StackError {
    #[snafu(display("failed to list stacks: {source}"))]
    ListStacks { source: ProviderError },

    #[snafu(display("failed to list resources of {stack}: {source}"))]
    ListResources { stack: String, source: ProviderError },

    #[snafu(display("nested stacks below {stack} exceed the depth limit of {max_depth}"))]
    NestingTooDeep { stack: String, max_depth: usize },

    #[snafu(display("failed to describe {stack}: {source}"))]
    Describe { stack: String, source: ProviderError },

    #[snafu(display("failed to fetch template of {stack}: {source}"))]
    FetchTemplate { stack: String, source: ProviderError },

    #[snafu(display("template of {stack} cannot be parsed: {source}"))]
    ParseTemplate { stack: String, source: TemplateError },

    #[snafu(display("template validation failed: {source}"))]
    ValidateTemplate { source: ProviderError },

    #[snafu(display("failed to create {stack}: {source}"))]
    Create { stack: String, source: ProviderError },

    #[snafu(display("failed to update {stack}: {source}"))]
    Update { stack: String, source: ProviderError },

    #[snafu(display("failed to delete {stack}: {source}"))]
    Delete { stack: String, source: ProviderError },

    #[snafu(display("{stack} was still cleaning up after {attempts} delete attempts"))]
    DeleteConflict { stack: String, attempts: u32 },

    #[snafu(display("failed to change termination protection of {stack}: {source}"))]
    TerminationProtection { stack: String, source: ProviderError },

    #[snafu(display("waiting for {event} on {stack} failed: {source}"))]
    Wait {
        stack: String,
        event: StackEvent,
        console_url: String,
        source: ProviderError,
    },
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackErrorKind {
    /// The stack (or a nested stack) does not exist.
    NotFound,
    /// A delete kept colliding with an in-flight cleanup.
    Conflict,
    /// The template could not be parsed or was rejected.
    InvalidTemplate,
    /// Nested stacks are deeper than the configured limit.
    TooDeep,
    /// A completion waiter failed.
    WaitFailed,
    /// Any other provider failure.
    Provider,
}

impl StackError {
    /// Returns the error kind for programmatic handling.
    pub fn kind(&self) -> StackErrorKind {
        match self {
            StackError::NestingTooDeep { .. } => StackErrorKind::TooDeep,
            StackError::ParseTemplate { .. } | StackError::ValidateTemplate { .. } => {
                StackErrorKind::InvalidTemplate
            }
            StackError::DeleteConflict { .. } => StackErrorKind::Conflict,
            StackError::Wait { .. } => StackErrorKind::WaitFailed,
            other => match other.provider_error() {
                Some(source) if source.is_not_found() => StackErrorKind::NotFound,
                _ => StackErrorKind::Provider,
            },
        }
    }

    /// The underlying provider error, when there is one.
    pub fn provider_error(&self) -> Option<&ProviderError> {
        match self {
            StackError::ListStacks { source }
            | StackError::ListResources { source, .. }
            | StackError::Describe { source, .. }
            | StackError::FetchTemplate { source, .. }
            | StackError::ValidateTemplate { source }
            | StackError::Create { source, .. }
            | StackError::Update { source, .. }
            | StackError::Delete { source, .. }
            | StackError::TerminationProtection { source, .. }
            | StackError::Wait { source, .. } => Some(source),
            StackError::NestingTooDeep { .. }
            | StackError::ParseTemplate { .. }
            | StackError::DeleteConflict { .. } => None,
        }
    }

    fn stack(&self) -> Option<&str> {
        match self {
            StackError::ListResources { stack, .. }
            | StackError::NestingTooDeep { stack, .. }
            | StackError::Describe { stack, .. }
            | StackError::FetchTemplate { stack, .. }
            | StackError::ParseTemplate { stack, .. }
            | StackError::Create { stack, .. }
            | StackError::Update { stack, .. }
            | StackError::Delete { stack, .. }
            | StackError::DeleteConflict { stack, .. }
            | StackError::TerminationProtection { stack, .. }
            | StackError::Wait { stack, .. } => Some(stack),
            StackError::ListStacks { .. } | StackError::ValidateTemplate { .. } => None,
        }
    }
}

impl From<StackError> for Error {
    fn from(err: StackError) -> Self {
        let message = err.to_string();
        match err.kind() {
            StackErrorKind::NotFound => Error::NotFound {
                message,
                entity: err.stack().map(str::to_string),
            },
            StackErrorKind::TooDeep | StackErrorKind::InvalidTemplate => {
                Error::invalid_input(message)
            }
            StackErrorKind::WaitFailed => match err {
                StackError::Wait { console_url, .. } => {
                    Error::server_with_console(message, console_url)
                }
                _ => Error::server(message),
            },
            StackErrorKind::Conflict | StackErrorKind::Provider => Error::server(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn missing_stack_maps_to_not_found() {
        let err = StackError::Describe {
            stack: "tdl-acme-ltd-prod".to_string(),
            source: ProviderError::NotFound("Stack does not exist".to_string()),
        };
        assert_eq!(err.kind(), StackErrorKind::NotFound);

        let converted = Error::from(err);
        assert_eq!(converted.kind(), ErrorKind::NotFound);
        assert!(matches!(
            converted,
            Error::NotFound { entity: Some(ref e), .. } if e == "tdl-acme-ltd-prod"
        ));
    }

    #[test]
    fn wait_failure_carries_console_url() {
        let err = StackError::Wait {
            stack: "tdl-acme-ltd-prod".to_string(),
            event: StackEvent::DeleteComplete,
            console_url: "https://console.example/stacks".to_string(),
            source: ProviderError::WaiterFailed("DELETE_FAILED".to_string()),
        };
        match Error::from(err) {
            Error::ServerError { console_url, .. } => {
                assert_eq!(console_url.as_deref(), Some("https://console.example/stacks"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn nesting_limit_is_invalid_input() {
        let err = StackError::NestingTooDeep {
            stack: "child".to_string(),
            max_depth: 5,
        };
        assert_eq!(Error::from(err).kind(), ErrorKind::InvalidInput);
    }
}
