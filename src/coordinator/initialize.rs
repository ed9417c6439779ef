// ABOUTME: Initialize sequence for a freshly deployed stack.
// ABOUTME: Confirms, runs the remote initialize command, and reports its result.

use serde_json::Value;

use super::{Coordinator, Pipeline};
use crate::error::{Error, Result};
use crate::invoke::{INITIALIZE, InvokeOptions, Invoker, require, run_command};

#[derive(Default)]
struct InitializeContext {
    result: Option<Value>,
}

impl Coordinator<'_> {
    pub async fn initialize(
        &self,
        invoker: &dyn Invoker,
        argument: &Value,
        options: InvokeOptions,
    ) -> Result<Value> {
        let this = *self;

        let ctx = Pipeline::new("initialize")
            .task_when(!options.pre_approved, "Confirm initialization", move |ctx: InitializeContext| async move {
                require(this.confirm, &format!("Initialize {}?", this.stack)).await?;
                Ok::<_, Error>(ctx)
            })
            .task("Run initialize", move |mut ctx: InitializeContext| async move {
                let approved = InvokeOptions {
                    pre_approved: true,
                    ..options
                };
                ctx.result = Some(run_command(invoker, INITIALIZE, argument, &approved).await?);
                Ok::<_, Error>(ctx)
            })
            .task("Report result", move |ctx: InitializeContext| async move {
                if let Some(result) = ctx.result.as_ref().filter(|r| !r.is_null()) {
                    this.output.value(result);
                }
                Ok::<_, Error>(ctx)
            })
            .run(InitializeContext::default(), self.output)
            .await?;

        Ok(ctx.result.unwrap_or(Value::Null))
    }
}
