// ABOUTME: Confirmation gate consulted before remote and destructive actions.
// ABOUTME: Interactive y/N prompt on stdin, or unconditional approval for --yes.

use async_trait::async_trait;

use crate::error::{Error, Result};

/// Asks the operator to approve an action.
#[async_trait]
pub trait Confirm: Send + Sync {
    /// Returns `true` when the action is approved.
    async fn confirm(&self, prompt: &str) -> Result<bool>;
}

/// Fail with `UserAborted` unless the prompt is approved.
pub async fn require(confirm: &dyn Confirm, prompt: &str) -> Result<()> {
    if confirm.confirm(prompt).await? {
        Ok(())
    } else {
        Err(Error::aborted(format!("declined: {prompt}")))
    }
}

/// Reads a `y`/`yes` answer from stdin; anything else (including EOF) declines.
pub struct StdinConfirm;

#[async_trait]
impl Confirm for StdinConfirm {
    async fn confirm(&self, prompt: &str) -> Result<bool> {
        let prompt = prompt.to_string();
        let answer = tokio::task::spawn_blocking(move || -> std::io::Result<String> {
            use std::io::{self, Write};
            print!("{prompt} [y/N] ");
            io::stdout().flush()?;

            let mut input = String::new();
            io::stdin().read_line(&mut input)?;
            Ok(input)
        })
        .await
        .map_err(|e| Error::invalid_environment(format!("confirmation prompt failed: {e}")))??;

        Ok(is_yes(&answer))
    }
}

/// Approves everything. Used for `--yes`.
pub struct AutoApprove;

#[async_trait]
impl Confirm for AutoApprove {
    async fn confirm(&self, prompt: &str) -> Result<bool> {
        tracing::debug!(prompt, "auto-approved");
        Ok(true)
    }
}

fn is_yes(answer: &str) -> bool {
    let answer = answer.trim();
    answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_explicit_yes_approves() {
        assert!(is_yes("y\n"));
        assert!(is_yes("YES"));
        assert!(!is_yes(""));
        assert!(!is_yes("n"));
        assert!(!is_yes("yep"));
    }

    #[tokio::test]
    async fn require_maps_approval_to_unit() {
        assert!(require(&AutoApprove, "destroy everything?").await.is_ok());
    }
}
