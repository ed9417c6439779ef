// ABOUTME: Raw invoke command implementation.
// ABOUTME: Prints the envelope a single invocation returns.

use super::{Session, confirmer, invoke_options};
use crate::cli::TargetArgs;
use serde_json::Value;
use tdlctl::error::{Error, Result};

pub async fn invoke(
    session: Session,
    function: String,
    payload: String,
    yes: bool,
    target: TargetArgs,
) -> Result<()> {
    let argument: Value = serde_json::from_str(&payload)
        .map_err(|e| Error::invalid_field("payload", format!("payload is not valid JSON: {e}")))?;

    let confirm = confirmer(yes);
    let invoker = session
        .invoker(session.target(target), confirm.as_ref())
        .await?;

    let envelope = invoker
        .invoke(&function, &argument, &invoke_options(yes, target))
        .await;
    tracing::debug!(function = %function, failed = envelope.is_error(), "invocation finished");
    session.output.value(&envelope);

    envelope.into_result().map(|_| ())
}
