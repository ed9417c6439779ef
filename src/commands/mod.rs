// ABOUTME: Command handlers for the tdlctl CLI.
// ABOUTME: Shared session setup: config discovery, confirmation, invoker selection, provider clients.

mod deploy;
mod destroy;
mod invoke;
mod services;
mod status;

pub use deploy::{deploy, initialize};
pub use destroy::destroy;
pub use invoke::invoke;
pub use services::services;
pub use status::status;

use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use tdlctl::cloud::{AwsClientSet, ClientCache};
use tdlctl::config::Config;
use tdlctl::coordinator::Coordinator;
use tdlctl::diagnostics::Diagnostics;
use tdlctl::error::{Error, Result};
use tdlctl::invoke::{
    AutoApprove, Confirm, InvokeOptions, InvokeTarget, Invoker, LocalInvoker, RemoteInvoker,
    StdinConfirm,
};
use tdlctl::output::Output;
use tdlctl::stack::StackManager;
use tdlctl::types::StackName;
use tokio::sync::OnceCell;

use crate::cli::TargetArgs;

pub fn current_dir() -> Result<PathBuf> {
    env::current_dir()
        .map_err(|e| Error::invalid_environment(format!("cannot read current directory: {e}")))
}

/// `--yes` approves every prompt; otherwise ask on stdin.
pub fn confirmer(yes: bool) -> Box<dyn Confirm> {
    if yes {
        Box::new(AutoApprove)
    } else {
        Box::new(StdinConfirm)
    }
}

pub fn invoke_options(yes: bool, target: TargetArgs) -> InvokeOptions {
    InvokeOptions {
        pre_approved: yes,
        remote_explicit: target.remote,
    }
}

/// Everything one command run needs: the resolved config, the primary
/// stack name, output, and lazily built provider clients.
pub struct Session {
    pub config: Config,
    pub stack: StackName,
    pub output: Output,
    cache: ClientCache<AwsClientSet>,
    clients: OnceCell<Arc<AwsClientSet>>,
}

impl Session {
    pub fn load(stage: Option<&str>, output: Output) -> Result<Self> {
        let config = Config::discover(&current_dir()?)?;
        let config = match stage {
            Some(stage) => config.for_stage(stage)?,
            None => config,
        };
        let stack = config.stack_name()?;
        tracing::debug!(stack = %stack, region = %config.region, "session loaded");

        Ok(Self {
            config,
            stack,
            output,
            cache: ClientCache::new(),
            clients: OnceCell::new(),
        })
    }

    pub async fn clients(&self) -> Result<&AwsClientSet> {
        let client_config = self.config.client_config()?;
        let clients = self
            .clients
            .get_or_try_init(|| self.cache.get_or_connect(&client_config, AwsClientSet::connect))
            .await?;
        Ok(&**clients)
    }

    pub fn stack_manager<'a>(&self, clients: &'a AwsClientSet) -> StackManager<'a, AwsClientSet> {
        StackManager::new(clients)
            .with_retry(self.config.retry)
            .with_max_depth(self.config.max_nesting_depth)
    }

    pub fn coordinator<'a>(&'a self, confirm: &'a dyn Confirm) -> Coordinator<'a> {
        Coordinator::new(&self.stack, confirm, &self.output)
    }

    /// Flags win over the configured default target.
    pub fn target(&self, args: TargetArgs) -> InvokeTarget {
        if args.local {
            InvokeTarget::Local
        } else if args.remote {
            InvokeTarget::Remote
        } else {
            self.config.target
        }
    }

    pub async fn invoker<'a>(
        &'a self,
        target: InvokeTarget,
        confirm: &'a dyn Confirm,
    ) -> Result<Box<dyn Invoker + 'a>> {
        let invoker: Box<dyn Invoker + 'a> = match target {
            InvokeTarget::Local => Box::new(LocalInvoker::from_config(&self.config)?),
            InvokeTarget::Remote => Box::new(
                RemoteInvoker::new(self.clients().await?, self.stack.clone(), confirm)
                    .safe_commands(self.config.safe_commands.clone()),
            ),
        };
        tracing::debug!(invoke_target = ?target, "selected invoker");
        Ok(invoker)
    }

    pub fn report(&self, diagnostics: &Diagnostics) {
        if !diagnostics.has_warnings() {
            return;
        }
        for warning in diagnostics.warnings() {
            self.output.warning(warning);
        }
    }
}
