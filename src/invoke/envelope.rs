// ABOUTME: The result-or-error envelope every invocation returns.
// ABOUTME: Serialized as exactly one of `{"error": ...}` or `{"result": ...}`.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Outcome of an invocation, carried without raising.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Envelope<T> {
    Error(Error),
    Result(T),
}

impl<T> Envelope<T> {
    pub fn from_result(result: Result<T>) -> Self {
        match result {
            Ok(value) => Envelope::Result(value),
            Err(err) => Envelope::Error(err),
        }
    }

    pub fn into_result(self) -> Result<T> {
        match self {
            Envelope::Result(value) => Ok(value),
            Envelope::Error(err) => Err(err),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Envelope::Error(_))
    }

    pub fn error(&self) -> Option<&Error> {
        match self {
            Envelope::Error(err) => Some(err),
            Envelope::Result(_) => None,
        }
    }
}

impl<T> From<Result<T>> for Envelope<T> {
    fn from(result: Result<T>) -> Self {
        Envelope::from_result(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    #[test]
    fn result_serializes_under_result_key() {
        let envelope: Envelope<Value> = Envelope::Result(json!({"botId": "b-1"}));
        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            json!({"result": {"botId": "b-1"}})
        );
    }

    #[test]
    fn error_serializes_with_kind() {
        let envelope: Envelope<Value> = Envelope::Error(Error::aborted("declined"));
        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            json!({"error": {"kind": "UserAborted", "message": "declined"}})
        );
    }

    #[test]
    fn both_keys_do_not_deserialize() {
        let value = json!({"error": {"kind": "NotFound", "message": "x"}, "result": 1});
        assert!(serde_json::from_value::<Envelope<Value>>(value).is_err());
    }
}
