// ABOUTME: Remote function name qualification.
// ABOUTME: Prefixes short command names with the owning stack name.

use std::fmt;

use super::StackName;

/// Fully-qualified name of a remote function, `<stackName>-<shortName>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FunctionName(String);

impl FunctionName {
    /// Qualify `name` with the stack prefix unless it already carries it.
    pub fn qualify(stack: &StackName, name: &str) -> Self {
        let prefix = format!("{stack}-");
        if name.starts_with(&prefix) {
            Self(name.to_string())
        } else {
            Self(format!("{prefix}{name}"))
        }
    }

    /// Short command name with the stack prefix removed.
    pub fn short_name<'a>(&'a self, stack: &StackName) -> &'a str {
        self.0
            .strip_prefix(stack.as_str())
            .and_then(|rest| rest.strip_prefix('-'))
            .unwrap_or(&self.0)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FunctionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
