// ABOUTME: Services command implementation.
// ABOUTME: Creates or updates the companion services stack with the requested features.

use super::{Session, confirmer};
use tdlctl::config::EnvValue;
use tdlctl::coordinator::ServicesRequest;
use tdlctl::error::{Error, Result};

pub async fn services(
    mut session: Session,
    enable: Vec<String>,
    key_pair: Option<String>,
    yes: bool,
) -> Result<()> {
    session.output.start_timer();
    let services = session
        .config
        .services
        .clone()
        .ok_or_else(|| Error::invalid_field("services", "no `services` section in tdl.yml"))?;

    let key_pair = match key_pair {
        Some(key_pair) => Some(key_pair),
        None => EnvValue::resolve_opt(services.key_pair.as_ref())?,
    };
    let request = ServicesRequest { enable, key_pair };

    let confirm = confirmer(yes);
    let clients = session.clients().await?;
    let manager = session.stack_manager(clients);

    let report = session
        .coordinator(confirm.as_ref())
        .enable_services(manager, &services, &request)
        .await?;

    session.report(&report.diagnostics);
    let verb = if report.created { "Created" } else { "Updated" };
    session
        .output
        .success(&format!("{verb} services stack {}", report.stack_id));
    Ok(())
}
