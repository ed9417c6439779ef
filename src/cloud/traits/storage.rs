// ABOUTME: Bucket operations trait for cloud providers.
// ABOUTME: Version listing, batched deletes, bucket removal, and lifecycle rules.

use super::shared_types::{LifecycleRule, ObjectVersion, VersionMarker, VersionPage};
use crate::cloud::ProviderError;
use crate::types::BucketId;
use async_trait::async_trait;

/// Largest batch a single delete request accepts.
pub const MAX_DELETE_BATCH: usize = 1000;

/// Raw storage bucket operations.
#[async_trait]
pub trait BucketOps: Send + Sync {
    /// List one page of object versions and delete markers.
    async fn list_object_versions(
        &self,
        bucket: &BucketId,
        marker: Option<&VersionMarker>,
    ) -> Result<VersionPage, ProviderError>;

    /// Delete up to [`MAX_DELETE_BATCH`] object versions in one request.
    async fn delete_objects(
        &self,
        bucket: &BucketId,
        objects: &[ObjectVersion],
    ) -> Result<(), ProviderError>;

    /// Delete an empty bucket.
    async fn delete_bucket(&self, bucket: &BucketId) -> Result<(), ProviderError>;

    /// Replace the bucket's lifecycle configuration with a single rule.
    async fn put_lifecycle_rule(
        &self,
        bucket: &BucketId,
        rule: &LifecycleRule,
    ) -> Result<(), ProviderError>;
}
