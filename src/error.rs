// ABOUTME: Application-wide error taxonomy for tdlctl.
// ABOUTME: Closed set of kind-tagged variants that also travel inside invocation envelopes.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Every failure surfaced by tdlctl falls into one of these kinds.
///
/// The enum is serialized with a `kind` discriminator so that errors produced by
/// a remote command can be reconstructed without losing their identity.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Error {
    #[error("invalid input: {message}")]
    InvalidInput {
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        field: Option<String>,
    },

    #[error("invalid environment: {message}")]
    InvalidEnvironment {
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        executable: Option<String>,
    },

    #[error("server error: {message}{}", console_hint(.console_url))]
    ServerError {
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        console_url: Option<String>,
    },

    #[error("not found: {message}")]
    NotFound {
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        entity: Option<String>,
    },

    #[error("aborted: {message}")]
    UserAborted { message: String },
}

fn console_hint(url: &Option<String>) -> String {
    url.as_deref()
        .map(|u| format!(" (inspect: {u})"))
        .unwrap_or_default()
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidInput,
    InvalidEnvironment,
    ServerError,
    NotFound,
    UserAborted,
}

impl ErrorKind {
    pub const ALL: [ErrorKind; 5] = [
        ErrorKind::InvalidInput,
        ErrorKind::InvalidEnvironment,
        ErrorKind::ServerError,
        ErrorKind::NotFound,
        ErrorKind::UserAborted,
    ];

    /// The discriminator used on the wire.
    pub fn tag(&self) -> &'static str {
        match self {
            ErrorKind::InvalidInput => "InvalidInput",
            ErrorKind::InvalidEnvironment => "InvalidEnvironment",
            ErrorKind::ServerError => "ServerError",
            ErrorKind::NotFound => "NotFound",
            ErrorKind::UserAborted => "UserAborted",
        }
    }

    /// Look up a kind by its wire discriminator. Unknown tags yield `None`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.tag() == tag)
    }
}

impl Error {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Error::InvalidInput {
            message: message.into(),
            field: None,
        }
    }

    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Error::InvalidInput {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    pub fn invalid_environment(message: impl Into<String>) -> Self {
        Error::InvalidEnvironment {
            message: message.into(),
            executable: None,
        }
    }

    pub fn missing_executable(executable: impl Into<String>) -> Self {
        let executable = executable.into();
        Error::InvalidEnvironment {
            message: format!("required executable `{executable}` was not found"),
            executable: Some(executable),
        }
    }

    pub fn server(message: impl Into<String>) -> Self {
        Error::ServerError {
            message: message.into(),
            console_url: None,
        }
    }

    pub fn server_with_console(message: impl Into<String>, console_url: impl Into<String>) -> Self {
        Error::ServerError {
            message: message.into(),
            console_url: Some(console_url.into()),
        }
    }

    pub fn not_found(entity: impl Into<String>, message: impl Into<String>) -> Self {
        Error::NotFound {
            message: message.into(),
            entity: Some(entity.into()),
        }
    }

    pub fn aborted(message: impl Into<String>) -> Self {
        Error::UserAborted {
            message: message.into(),
        }
    }

    /// Returns the error kind for programmatic handling.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidInput { .. } => ErrorKind::InvalidInput,
            Error::InvalidEnvironment { .. } => ErrorKind::InvalidEnvironment,
            Error::ServerError { .. } => ErrorKind::ServerError,
            Error::NotFound { .. } => ErrorKind::NotFound,
            Error::UserAborted { .. } => ErrorKind::UserAborted,
        }
    }

    /// Rebuild a typed error from its serialized form.
    ///
    /// The `kind` field is matched against the closed taxonomy first. A known
    /// kind always yields that kind, even when the rest of the payload is
    /// incomplete; a payload with an unknown or missing kind becomes a
    /// `ServerError` carrying the raw payload.
    pub fn from_serialized(value: &serde_json::Value) -> Self {
        let tag = value.get("kind").and_then(|k| k.as_str());
        match tag.and_then(ErrorKind::from_tag) {
            Some(kind) => serde_json::from_value(value.clone()).unwrap_or_else(|e| {
                tracing::debug!(kind = kind.tag(), error = %e, "rebuilding incomplete remote error");
                Self::from_parts(kind, value)
            }),
            None => {
                let message = string_member(value, "message").unwrap_or_else(|| value.to_string());
                match tag {
                    Some(unknown) => {
                        Error::server(format!("unrecognized remote error kind `{unknown}`: {message}"))
                    }
                    None => Error::server(message),
                }
            }
        }
    }

    /// Build `kind` from whatever string members `value` carries; the raw
    /// payload stands in for a missing message.
    fn from_parts(kind: ErrorKind, value: &serde_json::Value) -> Self {
        let message = string_member(value, "message").unwrap_or_else(|| value.to_string());
        match kind {
            ErrorKind::InvalidInput => Error::InvalidInput {
                message,
                field: string_member(value, "field"),
            },
            ErrorKind::InvalidEnvironment => Error::InvalidEnvironment {
                message,
                executable: string_member(value, "executable"),
            },
            ErrorKind::ServerError => Error::ServerError {
                message,
                console_url: string_member(value, "console_url"),
            },
            ErrorKind::NotFound => Error::NotFound {
                message,
                entity: string_member(value, "entity"),
            },
            ErrorKind::UserAborted => Error::UserAborted { message },
        }
    }
}

fn string_member(value: &serde_json::Value, key: &str) -> Option<String> {
    value.get(key).and_then(|m| m.as_str()).map(str::to_string)
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::invalid_environment(format!("I/O error: {err}"))
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::invalid_input(format!("YAML parse error: {err}"))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::invalid_input(format!("JSON error: {err}"))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
