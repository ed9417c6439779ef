// ABOUTME: Stack lifecycle manager: lookups, listings, templates, and mutations.
// ABOUTME: Borrows the provider per call; mutations return deferred waiters.

use futures::future::BoxFuture;
use futures::{FutureExt, StreamExt, TryStreamExt, stream};
use snafu::{IntoError, ResultExt};
use std::collections::{BTreeMap, HashMap};
use std::future::Future;

use super::console::console_url;
use super::error::{
    CreateSnafu, DeleteConflictSnafu, DeleteSnafu, DescribeSnafu, FetchTemplateSnafu,
    ListResourcesSnafu, ListStacksSnafu, NestingTooDeepSnafu, ParseTemplateSnafu, StackError,
    TerminationProtectionSnafu, UpdateSnafu, ValidateTemplateSnafu, WaitSnafu,
};
use super::template::TemplateDocument;
use super::waiter::PendingMutation;
use crate::cloud::{
    DeletionPolicy, Page, ProviderError, Stack, StackEvent, StackOps, StackRequest, StackResource,
    StackStatus, StackSummary, TemplateSource, BUCKET_TYPE,
};
use crate::config::{DEFAULT_MAX_NESTING_DEPTH, RetryConfig};
use crate::types::StackId;

/// Sibling nested stacks listed at the same time during a recursive walk.
pub const NESTED_LISTING_CONCURRENCY: usize = 4;

/// Lifecycle operations over a borrowed stack provider.
pub struct StackManager<'a, S: ?Sized> {
    api: &'a S,
    retry: RetryConfig,
    max_depth: usize,
}

impl<S: ?Sized> Clone for StackManager<'_, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S: ?Sized> Copy for StackManager<'_, S> {}

/// Drain a paginated listing, re-issuing the call with the last continuation
/// token until none is returned.
async fn collect_pages<T, F, Fut>(mut fetch: F) -> Result<Vec<T>, ProviderError>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<Page<T>, ProviderError>>,
{
    let mut items = Vec::new();
    let mut token = None;
    loop {
        let page = fetch(token.take()).await?;
        items.extend(page.items);
        match page.next_token {
            Some(next) if !next.is_empty() => token = Some(next),
            _ => return Ok(items),
        }
    }
}

impl<'a, S: StackOps + ?Sized> StackManager<'a, S> {
    pub fn new(api: &'a S) -> Self {
        Self {
            api,
            retry: RetryConfig::default(),
            max_depth: DEFAULT_MAX_NESTING_DEPTH,
        }
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Levels of nested stacks below the root that recursive listings may walk.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn region(&self) -> &str {
        self.api.region()
    }

    /// List every stack whose status is in `statuses`.
    pub async fn list_stacks(&self, statuses: &[StackStatus]) -> Result<Vec<StackSummary>, StackError> {
        collect_pages(|token| async move {
            tracing::debug!(token = ?token, "listing stacks");
            self.api.list_stacks(statuses, token.as_deref()).await
        })
        .await
        .context(ListStacksSnafu)
    }

    /// Resolve a stack name to the id of a live, settled stack.
    ///
    /// Only updateable statuses are considered, so a stack that is mid-mutation
    /// or being deleted resolves to `None`.
    pub async fn resolve_id(&self, name: &str) -> Result<Option<StackId>, StackError> {
        Ok(self
            .find(name, &StackStatus::updateable())
            .await?
            .map(|summary| summary.id))
    }

    /// Resolve a stack name for teardown. Unlike [`resolve_id`](Self::resolve_id)
    /// this also matches stacks left in a failed state, so a teardown that
    /// stopped halfway can be run again.
    pub async fn resolve_destroy_target(&self, name: &str) -> Result<Option<StackSummary>, StackError> {
        self.find(name, &StackStatus::destroyable()).await
    }

    async fn find(&self, name: &str, statuses: &[StackStatus]) -> Result<Option<StackSummary>, StackError> {
        let stacks = self.list_stacks(statuses).await?;
        Ok(stacks.into_iter().find(|summary| summary.name == name))
    }

    /// List a stack's own resources, optionally keeping only one resource type.
    pub async fn list_resources(
        &self,
        stack: &StackId,
        type_filter: Option<&str>,
    ) -> Result<Vec<StackResource>, StackError> {
        let resources = collect_pages(|token| async move {
            tracing::debug!(stack = %stack, token = ?token, "listing stack resources");
            self.api.list_stack_resources(stack, token.as_deref()).await
        })
        .await
        .context(ListResourcesSnafu {
            stack: stack.as_str(),
        })?;

        Ok(match type_filter {
            Some(wanted) => resources
                .into_iter()
                .filter(|r| r.resource_type == wanted)
                .collect(),
            None => resources,
        })
    }

    /// List a stack's resources followed by those of every nested stack.
    ///
    /// Up to [`NESTED_LISTING_CONCURRENCY`] sibling nested stacks are listed
    /// at once; results keep resource order. Nesting deeper than the configured limit is an error.
    pub async fn list_resources_recursive(
        &self,
        stack: &StackId,
    ) -> Result<Vec<StackResource>, StackError> {
        self.walk(stack.clone(), 0).await
    }

    fn walk(self, stack: StackId, depth: usize) -> BoxFuture<'a, Result<Vec<StackResource>, StackError>> {
        async move {
            if depth > self.max_depth {
                return NestingTooDeepSnafu {
                    stack: stack.as_str(),
                    max_depth: self.max_depth,
                }
                .fail();
            }

            let mut resources = self.list_resources(&stack, None).await?;
            let children: Vec<StackId> = resources
                .iter()
                .filter_map(StackResource::nested_stack_id)
                .collect();
            if !children.is_empty() {
                tracing::debug!(stack = %stack, depth, nested = children.len(), "descending into nested stacks");
            }

            let nested: Vec<Vec<StackResource>> = stream::iter(children)
                .map(|child| self.walk(child, depth + 1))
                .buffered(NESTED_LISTING_CONCURRENCY)
                .try_collect()
                .await?;
            resources.extend(nested.into_iter().flatten());
            Ok(resources)
        }
        .boxed()
    }

    /// Every bucket in the stack tree, annotated with the deletion policy its
    /// owning stack's template declares (`Delete` when none is declared).
    pub async fn buckets(&self, stack: &StackId) -> Result<Vec<StackResource>, StackError> {
        let buckets: Vec<StackResource> = self
            .list_resources_recursive(stack)
            .await?
            .into_iter()
            .filter(|r| r.resource_type == BUCKET_TYPE)
            .collect();

        let mut templates: HashMap<StackId, TemplateDocument> = HashMap::new();
        let mut annotated = Vec::with_capacity(buckets.len());
        for mut bucket in buckets {
            if !templates.contains_key(&bucket.stack_id) {
                let template = self.get_template(&bucket.stack_id).await?;
                templates.insert(bucket.stack_id.clone(), template);
            }
            let policy = templates
                .get(&bucket.stack_id)
                .and_then(|t| t.deletion_policy(&bucket.logical_id))
                .unwrap_or(DeletionPolicy::Delete);
            bucket.deletion_policy = Some(policy);
            annotated.push(bucket);
        }
        Ok(annotated)
    }

    /// Fetch and parse a stack's template.
    pub async fn get_template(&self, stack: &StackId) -> Result<TemplateDocument, StackError> {
        let body = self
            .api
            .get_template_body(stack)
            .await
            .context(FetchTemplateSnafu {
                stack: stack.as_str(),
            })?;
        let template = TemplateDocument::parse(&body).context(ParseTemplateSnafu {
            stack: stack.as_str(),
        })?;
        tracing::debug!(stack = %stack, json = template.is_json(), "parsed template");
        Ok(template)
    }

    pub async fn describe(&self, stack: &StackId) -> Result<Stack, StackError> {
        self.api.describe_stack(stack).await.context(DescribeSnafu {
            stack: stack.as_str(),
        })
    }

    pub async fn outputs(&self, stack: &StackId) -> Result<BTreeMap<String, String>, StackError> {
        Ok(self.describe(stack).await?.outputs)
    }

    pub async fn parameters(&self, stack: &StackId) -> Result<BTreeMap<String, String>, StackError> {
        Ok(self.describe(stack).await?.parameters)
    }

    pub async fn validate_template(&self, template: &TemplateSource) -> Result<(), StackError> {
        self.api
            .validate_template(template)
            .await
            .context(ValidateTemplateSnafu)
    }

    /// Fire a create; await the returned waiter for completion.
    pub async fn create(&self, request: &StackRequest) -> Result<PendingMutation<'a, S>, StackError> {
        tracing::info!(stack = %request.stack_id, "creating stack");
        let id = self.api.create_stack(request).await.context(CreateSnafu {
            stack: request.stack_id.as_str(),
        })?;
        Ok(PendingMutation::new(*self, id, StackEvent::CreateComplete))
    }

    /// Fire an update; await the returned waiter for completion.
    ///
    /// An update with nothing to change yields an already-settled waiter.
    pub async fn update(&self, request: &StackRequest) -> Result<PendingMutation<'a, S>, StackError> {
        tracing::info!(stack = %request.stack_id, "updating stack");
        match self.api.update_stack(request).await {
            Ok(id) => Ok(PendingMutation::new(*self, id, StackEvent::UpdateComplete)),
            Err(ProviderError::NoUpdates(message)) => {
                tracing::info!(stack = %request.stack_id, %message, "stack already up to date");
                Ok(PendingMutation::settled(
                    *self,
                    request.stack_id.clone(),
                    StackEvent::UpdateComplete,
                ))
            }
            Err(source) => Err(UpdateSnafu {
                stack: request.stack_id.as_str(),
            }
            .into_error(source)),
        }
    }

    /// Fire a delete, retrying with a fixed delay while the provider reports
    /// a cleanup still in progress. Any other error fails immediately.
    pub async fn delete(&self, stack: &StackId) -> Result<PendingMutation<'a, S>, StackError> {
        let mut attempt: u32 = 1;
        loop {
            tracing::info!(stack = %stack, attempt, "deleting stack");
            match self.api.delete_stack(stack).await {
                Ok(()) => {
                    return Ok(PendingMutation::new(
                        *self,
                        stack.clone(),
                        StackEvent::DeleteComplete,
                    ));
                }
                Err(ProviderError::CleanupInProgress(message)) if attempt < self.retry.max_attempts => {
                    tracing::warn!(
                        stack = %stack,
                        attempt,
                        delay = ?self.retry.delay,
                        %message,
                        "delete blocked by cleanup, retrying"
                    );
                    tokio::time::sleep(self.retry.delay).await;
                    attempt += 1;
                }
                Err(ProviderError::CleanupInProgress(_)) => {
                    return DeleteConflictSnafu {
                        stack: stack.as_str(),
                        attempts: attempt,
                    }
                    .fail();
                }
                Err(source) => {
                    return Err(DeleteSnafu {
                        stack: stack.as_str(),
                    }
                    .into_error(source));
                }
            }
        }
    }

    /// Block until the provider's native waiter observes `event`.
    pub async fn await_event(&self, stack: &StackId, event: StackEvent) -> Result<(), StackError> {
        tracing::debug!(stack = %stack, %event, "waiting for stack event");
        self.api.wait_for(stack, event).await.context(WaitSnafu {
            stack: stack.as_str(),
            event,
            console_url: console_url(self.api.region(), stack.as_str()),
        })
    }

    pub async fn disable_termination_protection(&self, stack: &StackId) -> Result<(), StackError> {
        self.api
            .set_termination_protection(stack, false)
            .await
            .context(TerminationProtectionSnafu {
                stack: stack.as_str(),
            })
    }
}
