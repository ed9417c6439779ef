// ABOUTME: Destroy command implementation.
// ABOUTME: Tears down the primary stack and its buckets with interactive confirmation.

use super::{Session, confirmer};
use tdlctl::bucket::BucketDestroyer;
use tdlctl::coordinator::DestroyRequest;
use tdlctl::error::Result;

pub async fn destroy(mut session: Session, request: DestroyRequest) -> Result<()> {
    request.require_remote_target(&session.stack)?;
    session.output.start_timer();
    let confirm = confirmer(false);
    let clients = session.clients().await?;
    let manager = session.stack_manager(clients);
    let destroyer = BucketDestroyer::new(clients);

    let report = session
        .coordinator(confirm.as_ref())
        .destroy(manager, &destroyer, &request)
        .await?;

    session.report(&report.diagnostics);
    session.output.success(&format!(
        "Destroyed {} ({} bucket(s) deleted, {} scheduled for expiry)",
        report.stack_id,
        report.destroyed.len(),
        report.scheduled.len()
    ));
    Ok(())
}
