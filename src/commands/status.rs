// ABOUTME: Status command implementation.
// ABOUTME: Resolves the primary and companion stacks and shows their status and outputs.

use super::Session;
use serde::Serialize;
use std::collections::BTreeMap;
use tdlctl::error::Result;
use tdlctl::output::OutputMode;
use tdlctl::types::StackId;

#[derive(Serialize)]
struct StackStatusReport {
    name: String,
    id: Option<StackId>,
    status: Option<String>,
    outputs: BTreeMap<String, String>,
}

pub async fn status(session: Session) -> Result<()> {
    let clients = session.clients().await?;
    let manager = session.stack_manager(clients);

    let mut reports = Vec::new();
    for name in [session.stack.as_str().to_string(), session.stack.companion()] {
        let report = match manager.resolve_id(&name).await? {
            Some(id) => {
                let stack = manager.describe(&id).await?;
                StackStatusReport {
                    name,
                    id: Some(id),
                    status: Some(stack.status.to_string()),
                    outputs: stack.outputs,
                }
            }
            None => StackStatusReport {
                name,
                id: None,
                status: None,
                outputs: BTreeMap::new(),
            },
        };
        reports.push(report);
    }

    if session.output.mode() == OutputMode::Json {
        session.output.value(&reports);
        return Ok(());
    }

    for report in &reports {
        match (&report.id, &report.status) {
            (Some(id), Some(status)) => {
                session.output.success(&format!("{}: {status}", report.name));
                session.output.progress(&format!("  id: {id}"));
                for (key, value) in &report.outputs {
                    session.output.progress(&format!("  {key}: {value}"));
                }
            }
            _ => session
                .output
                .success(&format!("{}: not deployed", report.name)),
        }
    }
    Ok(())
}
