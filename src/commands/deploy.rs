// ABOUTME: Deploy and initialize command implementations.
// ABOUTME: Select an invoker, then run the matching coordinator sequence.

use super::{Session, confirmer, invoke_options};
use crate::cli::TargetArgs;
use serde_json::Value;
use tdlctl::coordinator::{DeployRequest, ProjectItemSource};
use tdlctl::error::Result;

/// Send the selected deploy items to the set-config command.
pub async fn deploy(
    mut session: Session,
    request: DeployRequest,
    yes: bool,
    target: TargetArgs,
) -> Result<()> {
    session.output.start_timer();
    let confirm = confirmer(yes);
    let invoker = session
        .invoker(session.target(target), confirm.as_ref())
        .await?;
    let source = ProjectItemSource::new(session.config.items_dir());

    let report = session
        .coordinator(confirm.as_ref())
        .deploy(
            invoker.as_ref(),
            &request,
            &source,
            invoke_options(yes, target),
        )
        .await?;

    let items = report
        .categories
        .iter()
        .map(|c| c.key())
        .collect::<Vec<_>>()
        .join(", ");

    if report.dry_run {
        session
            .output
            .success(&format!("Dry run complete: {items} not deployed"));
        return Ok(());
    }

    if let Some(result) = report.result.as_ref().filter(|r| !r.is_null()) {
        session.output.value(result);
    }
    session
        .output
        .success(&format!("Deployed {items} to {}", session.stack));
    Ok(())
}

pub async fn initialize(mut session: Session, yes: bool, target: TargetArgs) -> Result<()> {
    session.output.start_timer();
    let confirm = confirmer(yes);
    let invoker = session
        .invoker(session.target(target), confirm.as_ref())
        .await?;

    session
        .coordinator(confirm.as_ref())
        .initialize(
            invoker.as_ref(),
            &Value::Object(Default::default()),
            invoke_options(yes, target),
        )
        .await?;

    session
        .output
        .success(&format!("Initialized {}", session.stack));
    Ok(())
}
