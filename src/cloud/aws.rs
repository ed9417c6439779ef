// ABOUTME: AWS SDK backed provider implementation.
// ABOUTME: CloudFormation for stacks, S3 for buckets, Lambda for remote functions.

use crate::cloud::client::ClientConfig;
use crate::cloud::error::ProviderError;
use crate::cloud::traits::{
    BucketOps, FunctionOps, FunctionResponse, LifecycleRule, ObjectVersion, Page, ParameterValue,
    Stack, StackEvent, StackOps, StackRequest, StackResource, StackStatus, StackSummary,
    TemplateSource, VersionMarker, VersionPage,
};
use crate::types::{BucketId, FunctionName, StackId};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_cloudformation::client::Waiters;
use aws_sdk_cloudformation::config::Region;
use aws_sdk_cloudformation::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_cloudformation::primitives::DateTime as SdkDateTime;
use aws_sdk_cloudformation::types as cfn;
use aws_sdk_lambda::primitives::Blob;
use aws_sdk_s3::types as s3;
use chrono::{DateTime, Utc};
use std::time::Duration;

// =============================================================================
// Error Mapping Helpers
// =============================================================================

fn map_sdk_error<E, R>(err: SdkError<E, R>) -> ProviderError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
    R: std::fmt::Debug + Send + Sync + 'static,
{
    let code = err.as_service_error().and_then(|e| e.code()).map(str::to_string);
    let message = err
        .as_service_error()
        .and_then(|e| e.message())
        .map(str::to_string)
        .unwrap_or_else(|| DisplayErrorContext(&err).to_string());
    ProviderError::classify(code.as_deref(), &message)
}

fn map_build_error(err: impl std::fmt::Display) -> ProviderError {
    ProviderError::Service(format!("invalid request: {err}"))
}

fn to_chrono(value: &SdkDateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(value.secs(), value.subsec_nanos())
}

// =============================================================================
// Client Set
// =============================================================================

/// Provider handles for one region/credential profile.
#[derive(Debug, Clone)]
pub struct AwsClientSet {
    region: String,
    max_wait: Duration,
    cloudformation: aws_sdk_cloudformation::Client,
    s3: aws_sdk_s3::Client,
    lambda: aws_sdk_lambda::Client,
}

impl AwsClientSet {
    /// Build handles from the default credential chain for `config`.
    pub async fn connect(config: ClientConfig) -> crate::error::Result<Self> {
        let mut loader =
            aws_config::defaults(BehaviorVersion::latest()).region(Region::new(config.region.clone()));
        if let Some(profile) = &config.profile {
            loader = loader.profile_name(profile);
        }
        let sdk_config = loader.load().await;

        tracing::debug!(region = %config.region, "connected provider clients");

        Ok(Self {
            region: config.region,
            max_wait: config.max_wait,
            cloudformation: aws_sdk_cloudformation::Client::new(&sdk_config),
            s3: aws_sdk_s3::Client::new(&sdk_config),
            lambda: aws_sdk_lambda::Client::new(&sdk_config),
        })
    }
}

fn convert_parameters(request: &StackRequest) -> Vec<cfn::Parameter> {
    request
        .parameters
        .iter()
        .map(|p| match &p.value {
            ParameterValue::Value(value) => cfn::Parameter::builder()
                .parameter_key(&p.key)
                .parameter_value(value)
                .build(),
            ParameterValue::UsePrevious => cfn::Parameter::builder()
                .parameter_key(&p.key)
                .use_previous_value(true)
                .build(),
        })
        .collect()
}

fn convert_capabilities(request: &StackRequest) -> Vec<cfn::Capability> {
    request
        .capabilities
        .iter()
        .map(|c| cfn::Capability::from(c.as_str()))
        .collect()
}

/// A summary without a name or status cannot be matched by name; skip it.
fn convert_summary(summary: &cfn::StackSummary) -> Option<StackSummary> {
    let (Some(name), Some(status)) = (summary.stack_name(), summary.stack_status()) else {
        tracing::debug!(stack_id = ?summary.stack_id(), "skipping stack summary without name or status");
        return None;
    };
    Some(StackSummary {
        id: StackId::new(summary.stack_id().unwrap_or(name)),
        name: name.to_string(),
        status: StackStatus::new(status.as_str()),
        created_at: summary.creation_time().and_then(to_chrono),
        updated_at: summary.last_updated_time().and_then(to_chrono),
    })
}

/// Resources need a logical id and a type to be walked or torn down.
fn convert_resource(stack: &StackId, resource: &cfn::StackResourceSummary) -> Option<StackResource> {
    let (Some(logical_id), Some(resource_type)) =
        (resource.logical_resource_id(), resource.resource_type())
    else {
        tracing::debug!(stack = %stack, "skipping stack resource without logical id or type");
        return None;
    };
    Some(StackResource {
        stack_id: stack.clone(),
        logical_id: logical_id.to_string(),
        physical_id: resource.physical_resource_id().map(str::to_string),
        resource_type: resource_type.to_string(),
        status: resource
            .resource_status()
            .map(|status| status.as_str().to_string())
            .unwrap_or_default(),
        deletion_policy: None,
    })
}

// =============================================================================
// StackOps
// =============================================================================

#[async_trait]
impl StackOps for AwsClientSet {
    fn region(&self) -> &str {
        &self.region
    }

    async fn list_stacks(
        &self,
        statuses: &[StackStatus],
        next_token: Option<&str>,
    ) -> Result<Page<StackSummary>, ProviderError> {
        let filter = statuses
            .iter()
            .map(|s| cfn::StackStatus::from(s.as_str()))
            .collect();
        let output = self
            .cloudformation
            .list_stacks()
            .set_stack_status_filter(Some(filter))
            .set_next_token(next_token.map(str::to_string))
            .send()
            .await
            .map_err(map_sdk_error)?;

        let items = output
            .stack_summaries()
            .iter()
            .filter_map(convert_summary)
            .collect();

        Ok(Page {
            items,
            next_token: output.next_token().map(str::to_string),
        })
    }

    async fn list_stack_resources(
        &self,
        stack: &StackId,
        next_token: Option<&str>,
    ) -> Result<Page<StackResource>, ProviderError> {
        let output = self
            .cloudformation
            .list_stack_resources()
            .stack_name(stack.as_str())
            .set_next_token(next_token.map(str::to_string))
            .send()
            .await
            .map_err(map_sdk_error)?;

        let items = output
            .stack_resource_summaries()
            .iter()
            .filter_map(|r| convert_resource(stack, r))
            .collect();

        Ok(Page {
            items,
            next_token: output.next_token().map(str::to_string),
        })
    }

    async fn describe_stack(&self, stack: &StackId) -> Result<Stack, ProviderError> {
        let output = self
            .cloudformation
            .describe_stacks()
            .stack_name(stack.as_str())
            .send()
            .await
            .map_err(map_sdk_error)?;

        let described = output
            .stacks()
            .first()
            .ok_or_else(|| ProviderError::NotFound(format!("stack {stack} does not exist")))?;

        let (Some(name), Some(status)) = (described.stack_name(), described.stack_status()) else {
            return Err(ProviderError::Service(format!(
                "stack {stack} was described without a name or status"
            )));
        };

        Ok(Stack {
            id: StackId::new(described.stack_id().unwrap_or(name)),
            name: name.to_string(),
            status: StackStatus::new(status.as_str()),
            parameters: described
                .parameters()
                .iter()
                .filter_map(|p| {
                    Some((
                        p.parameter_key()?.to_string(),
                        p.parameter_value().unwrap_or_default().to_string(),
                    ))
                })
                .collect(),
            outputs: described
                .outputs()
                .iter()
                .filter_map(|o| {
                    Some((
                        o.output_key()?.to_string(),
                        o.output_value().unwrap_or_default().to_string(),
                    ))
                })
                .collect(),
            termination_protection: described.enable_termination_protection().unwrap_or(false),
        })
    }

    async fn get_template_body(&self, stack: &StackId) -> Result<String, ProviderError> {
        let output = self
            .cloudformation
            .get_template()
            .stack_name(stack.as_str())
            .send()
            .await
            .map_err(map_sdk_error)?;

        Ok(output.template_body().unwrap_or_default().to_string())
    }

    async fn validate_template(&self, template: &TemplateSource) -> Result<(), ProviderError> {
        let request = self.cloudformation.validate_template();
        let request = match template {
            TemplateSource::Url(url) => request.template_url(url),
            TemplateSource::Body(body) => request.template_body(body),
        };
        request.send().await.map_err(map_sdk_error)?;
        Ok(())
    }

    async fn create_stack(&self, request: &StackRequest) -> Result<StackId, ProviderError> {
        let call = self
            .cloudformation
            .create_stack()
            .stack_name(request.stack_id.as_str())
            .set_parameters(Some(convert_parameters(request)))
            .set_capabilities(Some(convert_capabilities(request)))
            .enable_termination_protection(request.termination_protection);
        let call = match &request.template {
            TemplateSource::Url(url) => call.template_url(url),
            TemplateSource::Body(body) => call.template_body(body),
        };

        let output = call.send().await.map_err(map_sdk_error)?;
        Ok(output
            .stack_id()
            .map(StackId::new)
            .unwrap_or_else(|| request.stack_id.clone()))
    }

    async fn update_stack(&self, request: &StackRequest) -> Result<StackId, ProviderError> {
        let call = self
            .cloudformation
            .update_stack()
            .stack_name(request.stack_id.as_str())
            .set_parameters(Some(convert_parameters(request)))
            .set_capabilities(Some(convert_capabilities(request)));
        let call = match &request.template {
            TemplateSource::Url(url) => call.template_url(url),
            TemplateSource::Body(body) => call.template_body(body),
        };

        let output = call.send().await.map_err(map_sdk_error)?;
        Ok(output
            .stack_id()
            .map(StackId::new)
            .unwrap_or_else(|| request.stack_id.clone()))
    }

    async fn delete_stack(&self, stack: &StackId) -> Result<(), ProviderError> {
        self.cloudformation
            .delete_stack()
            .stack_name(stack.as_str())
            .send()
            .await
            .map_err(map_sdk_error)?;
        Ok(())
    }

    async fn set_termination_protection(
        &self,
        stack: &StackId,
        enabled: bool,
    ) -> Result<(), ProviderError> {
        self.cloudformation
            .update_termination_protection()
            .stack_name(stack.as_str())
            .enable_termination_protection(enabled)
            .send()
            .await
            .map_err(map_sdk_error)?;
        Ok(())
    }

    async fn wait_for(&self, stack: &StackId, event: StackEvent) -> Result<(), ProviderError> {
        let name = stack.as_str();
        let outcome = match event {
            StackEvent::CreateComplete => self
                .cloudformation
                .wait_until_stack_create_complete()
                .stack_name(name)
                .wait(self.max_wait)
                .await
                .map(|_| ())
                .map_err(|e| DisplayErrorContext(&e).to_string()),
            StackEvent::UpdateComplete => self
                .cloudformation
                .wait_until_stack_update_complete()
                .stack_name(name)
                .wait(self.max_wait)
                .await
                .map(|_| ())
                .map_err(|e| DisplayErrorContext(&e).to_string()),
            StackEvent::DeleteComplete => self
                .cloudformation
                .wait_until_stack_delete_complete()
                .stack_name(name)
                .wait(self.max_wait)
                .await
                .map(|_| ())
                .map_err(|e| DisplayErrorContext(&e).to_string()),
        };
        outcome.map_err(ProviderError::WaiterFailed)
    }
}

// =============================================================================
// BucketOps
// =============================================================================

#[async_trait]
impl BucketOps for AwsClientSet {
    async fn list_object_versions(
        &self,
        bucket: &BucketId,
        marker: Option<&VersionMarker>,
    ) -> Result<VersionPage, ProviderError> {
        let output = self
            .s3
            .list_object_versions()
            .bucket(bucket.as_str())
            .set_key_marker(marker.and_then(|m| m.key_marker.clone()))
            .set_version_id_marker(marker.and_then(|m| m.version_id_marker.clone()))
            .send()
            .await
            .map_err(map_sdk_error)?;

        let versions = output
            .versions()
            .iter()
            .filter_map(|v| Some(ObjectVersion::new(v.key()?, v.version_id())));
        let markers = output
            .delete_markers()
            .iter()
            .filter_map(|m| Some(ObjectVersion::new(m.key()?, m.version_id())));
        let objects = versions.chain(markers).collect();

        let next = if output.is_truncated().unwrap_or(false) {
            Some(VersionMarker {
                key_marker: output.next_key_marker().map(str::to_string),
                version_id_marker: output.next_version_id_marker().map(str::to_string),
            })
        } else {
            None
        };

        Ok(VersionPage { objects, next })
    }

    async fn delete_objects(
        &self,
        bucket: &BucketId,
        objects: &[ObjectVersion],
    ) -> Result<(), ProviderError> {
        let identifiers = objects
            .iter()
            .map(|o| {
                s3::ObjectIdentifier::builder()
                    .key(&o.key)
                    .set_version_id(o.version_id.clone())
                    .build()
                    .map_err(map_build_error)
            })
            .collect::<Result<Vec<_>, _>>()?;
        let delete = s3::Delete::builder()
            .set_objects(Some(identifiers))
            .quiet(true)
            .build()
            .map_err(map_build_error)?;

        let output = self
            .s3
            .delete_objects()
            .bucket(bucket.as_str())
            .delete(delete)
            .send()
            .await
            .map_err(map_sdk_error)?;

        if let Some(failed) = output.errors().first() {
            return Err(ProviderError::Service(format!(
                "failed to delete {} object(s) from {}, first: {} ({})",
                output.errors().len(),
                bucket,
                failed.key().unwrap_or_default(),
                failed.message().unwrap_or_default()
            )));
        }
        Ok(())
    }

    async fn delete_bucket(&self, bucket: &BucketId) -> Result<(), ProviderError> {
        self.s3
            .delete_bucket()
            .bucket(bucket.as_str())
            .send()
            .await
            .map_err(map_sdk_error)?;
        Ok(())
    }

    async fn put_lifecycle_rule(
        &self,
        bucket: &BucketId,
        rule: &LifecycleRule,
    ) -> Result<(), ProviderError> {
        let status = if rule.enabled {
            s3::ExpirationStatus::Enabled
        } else {
            s3::ExpirationStatus::Disabled
        };
        #[allow(deprecated)]
        let lifecycle_rule = s3::LifecycleRule::builder()
            .id(&rule.id)
            .prefix(&rule.prefix)
            .status(status)
            .expiration(
                s3::LifecycleExpiration::builder()
                    .days(rule.expiration_days)
                    .build(),
            )
            .noncurrent_version_expiration(
                s3::NoncurrentVersionExpiration::builder()
                    .noncurrent_days(rule.noncurrent_expiration_days)
                    .build(),
            )
            .build()
            .map_err(map_build_error)?;
        let configuration = s3::BucketLifecycleConfiguration::builder()
            .rules(lifecycle_rule)
            .build()
            .map_err(map_build_error)?;

        self.s3
            .put_bucket_lifecycle_configuration()
            .bucket(bucket.as_str())
            .lifecycle_configuration(configuration)
            .send()
            .await
            .map_err(map_sdk_error)?;
        Ok(())
    }
}

// =============================================================================
// FunctionOps
// =============================================================================

#[async_trait]
impl FunctionOps for AwsClientSet {
    async fn invoke_function(
        &self,
        function: &FunctionName,
        payload: Vec<u8>,
    ) -> Result<FunctionResponse, ProviderError> {
        let output = self
            .lambda
            .invoke()
            .function_name(function.as_str())
            .payload(Blob::new(payload))
            .send()
            .await
            .map_err(map_sdk_error)?;

        Ok(FunctionResponse {
            status_code: output.status_code(),
            function_error: output.function_error().map(str::to_string),
            payload: output
                .payload()
                .map(|blob| blob.as_ref().to_vec())
                .unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_without_status_is_skipped() {
        let summary = cfn::StackSummary::builder()
            .stack_name("tdl-acme-ltd-prod")
            .build();
        assert!(convert_summary(&summary).is_none());
    }

    #[test]
    fn summary_falls_back_to_name_for_id_and_tolerates_missing_times() {
        let summary = cfn::StackSummary::builder()
            .stack_name("tdl-acme-ltd-prod")
            .stack_status(cfn::StackStatus::DeleteFailed)
            .last_updated_time(SdkDateTime::from_secs(1_700_000_000))
            .build();

        let converted = convert_summary(&summary).unwrap();

        assert_eq!(converted.id, StackId::new("tdl-acme-ltd-prod"));
        assert_eq!(converted.status, StackStatus::new("DELETE_FAILED"));
        assert!(converted.created_at.is_none());
        assert_eq!(
            converted.updated_at.map(|t| t.timestamp()),
            Some(1_700_000_000)
        );
    }

    #[test]
    fn resource_without_type_is_skipped() {
        let stack = StackId::new("arn:primary");
        let untyped = cfn::StackResourceSummary::builder()
            .logical_resource_id("Assets")
            .build();
        assert!(convert_resource(&stack, &untyped).is_none());

        let bucket = cfn::StackResourceSummary::builder()
            .logical_resource_id("Assets")
            .physical_resource_id("assets-bucket")
            .resource_type("AWS::S3::Bucket")
            .build();
        let converted = convert_resource(&stack, &bucket).unwrap();
        assert!(converted.is_bucket());
        assert_eq!(converted.status, "");
    }
}
