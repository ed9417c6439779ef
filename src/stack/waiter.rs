// ABOUTME: Deferred completion waiter returned by stack mutations.
// ABOUTME: Separates firing a mutation from awaiting its terminal event.

use super::error::StackError;
use super::manager::StackManager;
use crate::cloud::{StackEvent, StackOps};
use crate::types::StackId;

/// A mutation that has been accepted by the provider but not yet awaited.
///
/// Several mutations can be fired before any of them is awaited. A settled
/// mutation (e.g. an update with nothing to change) resolves immediately.
#[must_use = "a fired mutation should be awaited with `wait`"]
pub struct PendingMutation<'a, S: ?Sized> {
    manager: StackManager<'a, S>,
    stack_id: StackId,
    event: StackEvent,
    settled: bool,
}

impl<'a, S: StackOps + ?Sized> PendingMutation<'a, S> {
    pub(super) fn new(manager: StackManager<'a, S>, stack_id: StackId, event: StackEvent) -> Self {
        Self {
            manager,
            stack_id,
            event,
            settled: false,
        }
    }

    pub(super) fn settled(manager: StackManager<'a, S>, stack_id: StackId, event: StackEvent) -> Self {
        Self {
            manager,
            stack_id,
            event,
            settled: true,
        }
    }

    pub fn stack_id(&self) -> &StackId {
        &self.stack_id
    }

    pub fn event(&self) -> StackEvent {
        self.event
    }

    /// Whether the mutation was already complete when it was fired.
    pub fn is_settled(&self) -> bool {
        self.settled
    }

    /// Block until the provider reports the terminal event.
    pub async fn wait(self) -> Result<StackId, StackError> {
        if !self.settled {
            self.manager.await_event(&self.stack_id, self.event).await?;
        }
        Ok(self.stack_id)
    }
}

impl<S: ?Sized> std::fmt::Debug for PendingMutation<'_, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingMutation")
            .field("stack_id", &self.stack_id)
            .field("event", &self.event)
            .field("settled", &self.settled)
            .finish()
    }
}
