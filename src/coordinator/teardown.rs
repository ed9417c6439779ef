// ABOUTME: Stack destroy as a typestate sequence.
// ABOUTME: Explicit remote target, two confirmations, bucket teardown, unprotect, delete, wait.

use super::Coordinator;
use super::state::{
    BucketsCleared, Confirmed, Deleting, Destroyed, Enumerated, Requested, Unprotected,
};
use crate::bucket::{BucketDestroyer, DestroyOutcome};
use crate::cloud::{BucketOps, StackOps, StackResource};
use crate::diagnostics::{Diagnostics, Warning};
use crate::error::{Error, Result};
use crate::invoke::{Confirm, require};
use crate::stack::StackManager;
use crate::types::{BucketId, StackId, StackName};

#[derive(Debug, Clone, Copy, Default)]
pub struct DestroyRequest {
    /// The operator explicitly targeted the remote environment.
    pub remote_explicit: bool,
    /// Leave retained buckets to a one-day expiry rule instead of emptying them.
    pub schedule_bucket_deletion: bool,
}

impl DestroyRequest {
    /// Destroying requires an explicit remote target.
    pub fn require_remote_target(&self, stack: &StackName) -> Result<()> {
        if self.remote_explicit {
            Ok(())
        } else {
            Err(Error::invalid_field(
                "remote",
                format!("destroying {stack} requires explicitly targeting the remote environment (--remote)"),
            ))
        }
    }
}

#[derive(Debug)]
pub struct DestroyReport {
    pub stack_id: StackId,
    pub destroyed: Vec<BucketId>,
    pub scheduled: Vec<BucketId>,
    pub diagnostics: Diagnostics,
}

/// A stack teardown in progress, parameterized by its current state.
#[derive(Debug)]
pub struct Teardown<S> {
    stack: StackName,
    state: S,
}

impl<S> Teardown<S> {
    pub fn stack(&self) -> &StackName {
        &self.stack
    }

    fn with<T>(self, state: T) -> Teardown<T> {
        Teardown {
            stack: self.stack,
            state,
        }
    }
}

impl Teardown<Requested> {
    /// Start a teardown. Destroying requires an explicit remote target.
    pub fn new(stack: StackName, request: &DestroyRequest) -> Result<Self> {
        request.require_remote_target(&stack)?;
        Ok(Teardown {
            stack,
            state: Requested,
        })
    }

    /// Ask twice, the second time more pointedly.
    pub async fn confirm(self, confirm: &dyn Confirm) -> Result<Teardown<Confirmed>> {
        require(
            confirm,
            &format!("Destroy stack {} and every resource it owns?", self.stack),
        )
        .await?;
        require(
            confirm,
            &format!(
                "This permanently deletes {} and its stored data. Are you absolutely sure?",
                self.stack
            ),
        )
        .await?;
        Ok(self.with(Confirmed))
    }
}

impl Teardown<Confirmed> {
    /// Resolve the live stack and list every bucket in its tree.
    pub async fn enumerate<S: StackOps + ?Sized>(
        self,
        manager: &StackManager<'_, S>,
    ) -> Result<Teardown<Enumerated>> {
        let summary = manager
            .resolve_destroy_target(self.stack.as_str())
            .await?
            .ok_or_else(|| {
                Error::not_found(
                    self.stack.as_str(),
                    format!("no stack named {} that can be destroyed in {}", self.stack, manager.region()),
                )
            })?;
        if summary.status.is_failed() {
            tracing::warn!(stack = %summary.id, status = %summary.status, "tearing down a stack in a failed state");
        }
        let stack_id = summary.id;
        let buckets = manager.buckets(&stack_id).await?;
        tracing::info!(stack = %stack_id, buckets = buckets.len(), "enumerated buckets");
        Ok(self.with(Enumerated { stack_id, buckets }))
    }
}

impl Teardown<Enumerated> {
    pub fn stack_id(&self) -> &StackId {
        &self.state.stack_id
    }

    pub fn buckets(&self) -> &[StackResource] {
        &self.state.buckets
    }

    /// Confirm the bucket list. Nothing is asked when there are no buckets.
    pub async fn confirm_buckets(self, confirm: &dyn Confirm) -> Result<Self> {
        let names: Vec<String> = self
            .state
            .buckets
            .iter()
            .filter_map(|b| b.physical_id.clone())
            .collect();
        if names.is_empty() {
            return Ok(self);
        }
        require(
            confirm,
            &format!(
                "Delete {} bucket(s) and all of their objects: {}?",
                names.len(),
                names.join(", ")
            ),
        )
        .await?;
        Ok(self)
    }

    /// Destroy each bucket in turn. With `schedule`, buckets the stack would
    /// retain get a one-day expiry rule instead.
    pub async fn clear_buckets<B: BucketOps + ?Sized>(
        self,
        destroyer: &BucketDestroyer<'_, B>,
        schedule: bool,
        diagnostics: &mut Diagnostics,
    ) -> Result<Teardown<BucketsCleared>> {
        let mut destroyed = Vec::new();
        let mut scheduled = Vec::new();

        for resource in &self.state.buckets {
            let Some(bucket) = resource.bucket_id() else {
                tracing::debug!(logical_id = %resource.logical_id, "bucket was never created");
                continue;
            };
            let retained = resource
                .deletion_policy
                .is_some_and(|policy| policy.retains());

            if schedule && retained {
                destroyer.schedule_deletion(&bucket).await?;
                diagnostics.warn(Warning::bucket_deletion_scheduled(bucket.as_str()));
                scheduled.push(bucket);
            } else if let DestroyOutcome::Destroyed { .. } = destroyer.destroy(&bucket, diagnostics).await? {
                destroyed.push(bucket);
            }
        }

        let stack_id = self.state.stack_id.clone();
        Ok(self.with(BucketsCleared {
            stack_id,
            destroyed,
            scheduled,
        }))
    }
}

impl Teardown<BucketsCleared> {
    pub async fn disable_protection<S: StackOps + ?Sized>(
        self,
        manager: &StackManager<'_, S>,
    ) -> Result<Teardown<Unprotected>> {
        manager
            .disable_termination_protection(&self.state.stack_id)
            .await?;
        let Teardown { stack, state } = self;
        Ok(Teardown {
            stack,
            state: Unprotected {
                stack_id: state.stack_id,
                destroyed: state.destroyed,
                scheduled: state.scheduled,
            },
        })
    }
}

impl Teardown<Unprotected> {
    pub async fn delete<'m, S: StackOps + ?Sized>(
        self,
        manager: StackManager<'m, S>,
    ) -> Result<Teardown<Deleting<'m, S>>> {
        let pending = manager.delete(&self.state.stack_id).await?;
        let Teardown { stack, state } = self;
        Ok(Teardown {
            stack,
            state: Deleting {
                pending,
                destroyed: state.destroyed,
                scheduled: state.scheduled,
            },
        })
    }
}

impl<'m, S: StackOps + ?Sized> Teardown<Deleting<'m, S>> {
    pub async fn wait(self) -> Result<Teardown<Destroyed>> {
        let Teardown { stack, state } = self;
        let stack_id = state.pending.wait().await?;
        Ok(Teardown {
            stack,
            state: Destroyed {
                stack_id,
                destroyed: state.destroyed,
                scheduled: state.scheduled,
            },
        })
    }
}

impl Teardown<Destroyed> {
    pub fn finish(self, diagnostics: Diagnostics) -> DestroyReport {
        DestroyReport {
            stack_id: self.state.stack_id,
            destroyed: self.state.destroyed,
            scheduled: self.state.scheduled,
            diagnostics,
        }
    }
}

const DESTROY_STEPS: usize = 8;

impl Coordinator<'_> {
    /// Run the full destroy sequence against the primary stack.
    pub async fn destroy<'m, S, B>(
        &self,
        manager: StackManager<'m, S>,
        destroyer: &BucketDestroyer<'_, B>,
        request: &DestroyRequest,
    ) -> Result<DestroyReport>
    where
        S: StackOps + ?Sized,
        B: BucketOps + ?Sized,
    {
        let mut diagnostics = Diagnostics::default();
        let step = |index: usize, title: &str, skipped: bool| {
            self.output.step(index, DESTROY_STEPS, title, skipped)
        };

        step(1, "Check target", false);
        let teardown = Teardown::new(self.stack.clone(), request)?;

        step(2, "Confirm destroy", false);
        let teardown = teardown.confirm(self.confirm).await?;

        step(3, "Enumerate buckets", false);
        let teardown = teardown.enumerate(&manager).await?;
        let has_buckets = !teardown.buckets().is_empty();

        step(4, "Confirm bucket deletion", !has_buckets);
        let teardown = teardown.confirm_buckets(self.confirm).await?;

        step(5, "Clear buckets", !has_buckets);
        let teardown = teardown
            .clear_buckets(destroyer, request.schedule_bucket_deletion, &mut diagnostics)
            .await?;

        step(6, "Disable termination protection", false);
        let teardown = teardown.disable_protection(&manager).await?;

        step(7, "Delete stack", false);
        let teardown = teardown.delete(manager).await?;

        step(8, "Wait for delete to complete", false);
        let teardown = teardown.wait().await?;

        Ok(teardown.finish(diagnostics))
    }
}
