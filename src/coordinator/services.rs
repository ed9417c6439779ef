// ABOUTME: Enable-services sequence for the companion services stack.
// ABOUTME: Decides create vs update, assembles feature toggles, fires, then awaits the mutation.

use super::{Coordinator, Pipeline};
use crate::cloud::{Parameter, StackOps, StackRequest, TemplateSource};
use crate::config::ServicesConfig;
use crate::diagnostics::{Diagnostics, Warning};
use crate::error::{Error, Result};
use crate::invoke::require;
use crate::stack::{PendingMutation, StackManager};
use crate::types::StackId;

/// Features to turn on and an optional key pair for the companion stack.
#[derive(Debug, Clone, Default)]
pub struct ServicesRequest {
    pub enable: Vec<String>,
    pub key_pair: Option<String>,
}

#[derive(Debug)]
pub struct ServicesReport {
    pub stack_id: StackId,
    /// `true` when the companion stack was created rather than updated.
    pub created: bool,
    pub diagnostics: Diagnostics,
}

/// Stack parameter toggling a feature: `inference` -> `EnableInference`.
pub fn feature_parameter(feature: &str) -> String {
    let pascal: String = feature
        .split(['-', '_'])
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect();
    format!("Enable{pascal}")
}

/// Parameters for the companion stack.
///
/// Requested features are switched on. On create every other declared feature
/// is off; on update the others keep their previous value, as does an
/// unspecified key pair.
fn assemble_parameters(
    primary: &str,
    declared: &[String],
    request: &ServicesRequest,
    updating: bool,
) -> Vec<Parameter> {
    let mut parameters: Vec<Parameter> = declared
        .iter()
        .map(|feature| {
            let key = feature_parameter(feature);
            if request.enable.contains(feature) {
                Parameter::new(key, "true")
            } else if updating {
                Parameter::use_previous(key)
            } else {
                Parameter::new(key, "false")
            }
        })
        .collect();

    match (&request.key_pair, updating) {
        (Some(key_pair), _) => parameters.push(Parameter::new("KeyPairName", key_pair)),
        (None, true) => parameters.push(Parameter::use_previous("KeyPairName")),
        (None, false) => {}
    }
    parameters.push(Parameter::new("PrimaryStackName", primary));
    parameters
}

struct ServicesContext<'m, S: ?Sized> {
    existing: Option<StackId>,
    request: Option<StackRequest>,
    pending: Option<PendingMutation<'m, S>>,
    stack_id: Option<StackId>,
    diagnostics: Diagnostics,
}

impl Coordinator<'_> {
    pub async fn enable_services<'m, S: StackOps + ?Sized>(
        &self,
        manager: StackManager<'m, S>,
        config: &ServicesConfig,
        request: &ServicesRequest,
    ) -> Result<ServicesReport> {
        let this = *self;
        let companion = self.stack.companion();
        let primary = self.stack.as_str().to_string();

        if request.enable.is_empty() {
            return Err(Error::invalid_field("enable", "no services selected"));
        }
        if let Some(unknown) = request
            .enable
            .iter()
            .find(|feature| !config.features.contains(feature))
        {
            return Err(Error::invalid_field(
                "enable",
                format!(
                    "unknown service `{unknown}`; declared services: {}",
                    config.features.join(", ")
                ),
            ));
        }

        let template = TemplateSource::Url(config.template_url.clone());
        let companion_ref = companion.as_str();
        let template_ref = &template;

        let ctx = Pipeline::new("enable-services")
            .task("Confirm services", move |ctx: ServicesContext<'m, S>| async move {
                require(
                    this.confirm,
                    &format!(
                        "Enable {} on companion stack {companion_ref}?",
                        request.enable.join(", ")
                    ),
                )
                .await?;
                require(
                    this.confirm,
                    "Has access to the required models and instance quotas been granted for this account and region?",
                )
                .await?;
                Ok::<_, Error>(ctx)
            })
            .task("Resolve companion stack", move |mut ctx: ServicesContext<'m, S>| async move {
                ctx.existing = manager.resolve_id(companion_ref).await?;
                match &ctx.existing {
                    Some(id) => this.output.progress(&format!("Updating existing stack {id}")),
                    None => this.output.progress(&format!("Creating stack {companion_ref}")),
                }
                Ok::<_, Error>(ctx)
            })
            .task("Assemble parameters", move |mut ctx: ServicesContext<'m, S>| async move {
                let updating = ctx.existing.is_some();
                let stack_id = ctx
                    .existing
                    .clone()
                    .unwrap_or_else(|| StackId::new(companion_ref));
                let mut stack_request = StackRequest::new(stack_id, template_ref.clone());
                stack_request.parameters =
                    assemble_parameters(&primary, &config.features, request, updating);
                ctx.request = Some(stack_request);
                Ok::<_, Error>(ctx)
            })
            .task("Validate template", move |ctx: ServicesContext<'m, S>| async move {
                manager.validate_template(template_ref).await?;
                Ok::<_, Error>(ctx)
            })
            .task("Trigger stack mutation", move |mut ctx: ServicesContext<'m, S>| async move {
                let stack_request = ctx
                    .request
                    .take()
                    .ok_or_else(|| Error::invalid_input("stack request was not assembled"))?;
                let pending = if ctx.existing.is_some() {
                    manager.update(&stack_request).await?
                } else {
                    manager.create(&stack_request).await?
                };
                if pending.is_settled() {
                    ctx.diagnostics.warn(Warning::no_updates(companion_ref));
                }
                ctx.pending = Some(pending);
                Ok::<_, Error>(ctx)
            })
            .task("Wait for completion", move |mut ctx: ServicesContext<'m, S>| async move {
                if let Some(pending) = ctx.pending.take() {
                    ctx.stack_id = Some(pending.wait().await?);
                }
                Ok::<_, Error>(ctx)
            })
            .run(
                ServicesContext {
                    existing: None,
                    request: None,
                    pending: None,
                    stack_id: None,
                    diagnostics: Diagnostics::default(),
                },
                self.output,
            )
            .await?;

        let created = ctx.existing.is_none();
        let stack_id = ctx
            .stack_id
            .ok_or_else(|| Error::server("companion stack mutation did not complete"))?;
        Ok(ServicesReport {
            stack_id,
            created,
            diagnostics: ctx.diagnostics,
        })
    }
}
