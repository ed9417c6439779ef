// ABOUTME: Composes invocations and stack operations into titled sequences.
// ABOUTME: Deploy, initialize, and enable-services run as pipelines; destroy is a typestate teardown.

mod deploy;
mod initialize;
mod pipeline;
mod services;
mod state;
mod teardown;

pub use deploy::{
    DeployItem, DeployItems, DeployReport, DeployRequest, DeploySelection, ItemCategory,
    ItemSource, ProjectItemSource,
};
pub use pipeline::Pipeline;
pub use services::{ServicesReport, ServicesRequest, feature_parameter};
pub use state::{BucketsCleared, Confirmed, Deleting, Destroyed, Enumerated, Requested, Unprotected};
pub use teardown::{DestroyReport, DestroyRequest, Teardown};

use crate::invoke::Confirm;
use crate::output::Output;
use crate::types::StackName;

/// Shared collaborators of every sequence: the target stack, the
/// confirmation gate, and progress output.
#[derive(Clone, Copy)]
pub struct Coordinator<'a> {
    stack: &'a StackName,
    confirm: &'a dyn Confirm,
    output: &'a Output,
}

impl<'a> Coordinator<'a> {
    pub fn new(stack: &'a StackName, confirm: &'a dyn Confirm, output: &'a Output) -> Self {
        Self {
            stack,
            confirm,
            output,
        }
    }

    pub fn stack(&self) -> &'a StackName {
        self.stack
    }
}
