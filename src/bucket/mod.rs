// ABOUTME: Storage bucket teardown: empty every object version, then delete.
// ABOUTME: Missing buckets count as already destroyed; large buckets can expire via lifecycle rule.

use crate::cloud::{BucketOps, LifecycleRule, MAX_DELETE_BATCH, ProviderError, VersionMarker};
use crate::diagnostics::{Diagnostics, Warning};
use crate::error::{Error, Result};
use crate::types::BucketId;

/// How a bucket teardown ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestroyOutcome {
    /// The bucket was emptied and deleted; carries the number of versions removed.
    Destroyed { versions: usize },
    /// The bucket did not exist.
    AlreadyGone,
}

/// Empties and deletes buckets through a borrowed provider.
pub struct BucketDestroyer<'a, B: ?Sized> {
    api: &'a B,
}

impl<'a, B: BucketOps + ?Sized> BucketDestroyer<'a, B> {
    pub fn new(api: &'a B) -> Self {
        Self { api }
    }

    /// Delete every object version and delete marker in the bucket.
    ///
    /// Returns the number of versions removed.
    pub async fn empty(&self, bucket: &BucketId) -> std::result::Result<usize, ProviderError> {
        let mut removed = 0;
        let mut marker: Option<VersionMarker> = None;

        loop {
            let page = self.api.list_object_versions(bucket, marker.as_ref()).await?;
            tracing::debug!(bucket = %bucket, versions = page.objects.len(), "listed object versions");

            for batch in page.objects.chunks(MAX_DELETE_BATCH) {
                self.api.delete_objects(bucket, batch).await?;
                removed += batch.len();
            }

            match page.next {
                Some(next) => marker = Some(next),
                None => break,
            }
        }

        tracing::info!(bucket = %bucket, removed, "bucket emptied");
        Ok(removed)
    }

    /// Empty and delete the bucket. A bucket that no longer exists is
    /// reported through `diagnostics` and treated as destroyed.
    pub async fn destroy(
        &self,
        bucket: &BucketId,
        diagnostics: &mut Diagnostics,
    ) -> Result<DestroyOutcome> {
        let versions = match self.empty(bucket).await {
            Ok(versions) => versions,
            Err(e) if e.is_not_found() => return Ok(already_gone(bucket, diagnostics)),
            Err(e) => return Err(bucket_error(bucket, "empty", e)),
        };

        match self.api.delete_bucket(bucket).await {
            Ok(()) => {
                tracing::info!(bucket = %bucket, "bucket deleted");
                Ok(DestroyOutcome::Destroyed { versions })
            }
            Err(e) if e.is_not_found() => Ok(already_gone(bucket, diagnostics)),
            Err(e) => Err(bucket_error(bucket, "delete", e)),
        }
    }

    /// Leave the bucket in place with a rule expiring all of its objects
    /// after one day.
    pub async fn schedule_deletion(&self, bucket: &BucketId) -> Result<()> {
        let rule = LifecycleRule::expire_all_after_one_day();
        self.api
            .put_lifecycle_rule(bucket, &rule)
            .await
            .map_err(|e| bucket_error(bucket, "schedule deletion of", e))?;
        tracing::info!(bucket = %bucket, rule = %rule.id, "bucket deletion scheduled");
        Ok(())
    }
}

fn already_gone(bucket: &BucketId, diagnostics: &mut Diagnostics) -> DestroyOutcome {
    diagnostics.warn(Warning::bucket_already_gone(bucket.as_str()));
    DestroyOutcome::AlreadyGone
}

fn bucket_error(bucket: &BucketId, action: &str, err: ProviderError) -> Error {
    match err {
        ProviderError::NotFound(message) => Error::not_found(bucket.as_str(), message),
        other => Error::server(format!("failed to {action} bucket {bucket}: {other}")),
    }
}
