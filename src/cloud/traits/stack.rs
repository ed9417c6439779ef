// ABOUTME: Stack operations trait for cloud providers.
// ABOUTME: Paged listings, describe, template access, mutations, and native completion waiters.

use super::shared_types::{
    Page, Stack, StackEvent, StackRequest, StackResource, StackStatus, StackSummary,
    TemplateSource,
};
use crate::cloud::ProviderError;
use crate::types::StackId;
use async_trait::async_trait;

/// Raw stack operations. One call maps to one provider request.
#[async_trait]
pub trait StackOps: Send + Sync {
    /// Region the provider handle is bound to.
    fn region(&self) -> &str;

    /// List one page of stacks whose status is in `statuses`.
    async fn list_stacks(
        &self,
        statuses: &[StackStatus],
        next_token: Option<&str>,
    ) -> Result<Page<StackSummary>, ProviderError>;

    /// List one page of a stack's resources.
    async fn list_stack_resources(
        &self,
        stack: &StackId,
        next_token: Option<&str>,
    ) -> Result<Page<StackResource>, ProviderError>;

    /// Describe a single stack.
    async fn describe_stack(&self, stack: &StackId) -> Result<Stack, ProviderError>;

    /// Fetch the raw template body of a stack.
    async fn get_template_body(&self, stack: &StackId) -> Result<String, ProviderError>;

    /// Ask the provider to validate a template.
    async fn validate_template(&self, template: &TemplateSource) -> Result<(), ProviderError>;

    /// Start creating a stack. Returns as soon as the request is accepted.
    async fn create_stack(&self, request: &StackRequest) -> Result<StackId, ProviderError>;

    /// Start updating a stack. Returns as soon as the request is accepted.
    async fn update_stack(&self, request: &StackRequest) -> Result<StackId, ProviderError>;

    /// Start deleting a stack.
    async fn delete_stack(&self, stack: &StackId) -> Result<(), ProviderError>;

    /// Toggle termination protection.
    async fn set_termination_protection(
        &self,
        stack: &StackId,
        enabled: bool,
    ) -> Result<(), ProviderError>;

    /// Block until the provider's native waiter observes `event`.
    async fn wait_for(&self, stack: &StackId, event: StackEvent) -> Result<(), ProviderError>;
}
