use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio_util::sync::CancellationToken;

use pawprint_core::{PolicyTable, StorageObject, UploadPolicy, UploadRequest};
use pawprint_storage::{
    generate_object_key, BucketProvisioner, ProvisionOutcome, Storage, StorageError,
};

use super::state::{UploadRun, UploadState};
use super::types::{UploadError, UploadReport, UploadWarning};
use crate::image::{ImageTransformer, TransformOutcome};
use crate::validator::UploadValidator;

/// Orchestrates validate → transform → provision → write for one upload attempt.
///
/// The coordinator holds only shared, immutable handles; concurrent calls do not
/// interact. There is no automatic retry: each call makes at most one write.
///
/// Every backend call made during the upload step has its own time limit: the
/// container check, the write and the cleanup after an abandoned write.
#[derive(Clone)]
pub struct UploadCoordinator {
    storage: Arc<dyn Storage>,
    provisioner: BucketProvisioner,
    policies: Arc<PolicyTable>,
    timeout: Duration,
    provision_timeout: Duration,
    cleanup_timeout: Duration,
}

impl UploadCoordinator {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
    pub const DEFAULT_PROVISION_TIMEOUT: Duration = Duration::from_secs(10);
    pub const DEFAULT_CLEANUP_TIMEOUT: Duration = Duration::from_secs(5);

    pub fn new(storage: Arc<dyn Storage>, policies: PolicyTable) -> Self {
        Self {
            provisioner: BucketProvisioner::new(storage.clone()),
            storage,
            policies: Arc::new(policies),
            timeout: Self::DEFAULT_TIMEOUT,
            provision_timeout: Self::DEFAULT_PROVISION_TIMEOUT,
            cleanup_timeout: Self::DEFAULT_CLEANUP_TIMEOUT,
        }
    }

    pub fn with_provisioner(mut self, provisioner: BucketProvisioner) -> Self {
        self.provisioner = provisioner;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Bound on the container check. Expiry becomes a provisioning warning.
    pub fn with_provision_timeout(mut self, timeout: Duration) -> Self {
        self.provision_timeout = timeout;
        self
    }

    /// Bound on removing an abandoned write after a cancel or timeout
    pub fn with_cleanup_timeout(mut self, timeout: Duration) -> Self {
        self.cleanup_timeout = timeout;
        self
    }

    /// Run one upload attempt.
    ///
    /// `policy_override` replaces the category policy for this call only and is
    /// validated first. `cancel` aborts the upload step with [`UploadError::Cancelled`].
    #[tracing::instrument(
        skip_all,
        fields(
            category = %request.category,
            owner_id = request.owner_id.as_deref().unwrap_or("public"),
            size_bytes = request.size()
        )
    )]
    pub async fn upload(
        &self,
        request: UploadRequest,
        policy_override: Option<UploadPolicy>,
        cancel: Option<CancellationToken>,
    ) -> Result<UploadReport, UploadError> {
        let start = std::time::Instant::now();
        let cancel = cancel.unwrap_or_else(CancellationToken::new);
        let mut run = UploadRun::default();

        let result = self
            .run(&mut run, request, policy_override, &cancel)
            .await;

        match result {
            Ok(mut report) => {
                run.advance(UploadState::Completed);
                report.states = run.into_history();
                tracing::info!(
                    key = %report.object.path,
                    warnings = report.warnings.len(),
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Upload completed"
                );
                Ok(report)
            }
            Err(e) => {
                run.advance(e.terminal_state());
                match &e {
                    UploadError::Validation(_) | UploadError::Cancelled => {
                        tracing::debug!(error = %e, "Upload stopped")
                    }
                    _ => tracing::error!(
                        error = %e,
                        duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                        "Upload failed"
                    ),
                }
                Err(e)
            }
        }
    }

    /// Upload several files concurrently. Results are returned in input order.
    pub async fn upload_many(
        &self,
        requests: Vec<UploadRequest>,
        cancel: Option<CancellationToken>,
    ) -> Vec<Result<UploadReport, UploadError>> {
        let uploads = requests.into_iter().map(|request| {
            let token = cancel.as_ref().map(CancellationToken::child_token);
            self.upload(request, None, token)
        });
        futures::future::join_all(uploads).await
    }

    async fn run(
        &self,
        run: &mut UploadRun,
        request: UploadRequest,
        policy_override: Option<UploadPolicy>,
        cancel: &CancellationToken,
    ) -> Result<UploadReport, UploadError> {
        let mut warnings = Vec::new();

        let policy = match policy_override {
            Some(policy) => {
                policy.validate(request.category)?;
                policy
            }
            None => self.policies.get(request.category)?.clone(),
        };

        run.advance(UploadState::Validating);
        UploadValidator::new(&policy).validate(&request.content_type, request.size())?;

        run.advance(UploadState::Transforming);
        let outcome = ImageTransformer::from_policy(&policy)
            .transform_blocking(request.data.clone(), request.content_type.clone())
            .await;
        let resized = match &outcome {
            TransformOutcome::Resized { from, to, .. } => Some((*from, *to)),
            TransformOutcome::Degraded { reason, .. } => {
                tracing::warn!(reason = %reason, "Image transform failed, uploading original bytes");
                warnings.push(UploadWarning::Transform {
                    reason: reason.clone(),
                });
                None
            }
            TransformOutcome::Unchanged { .. } => None,
        };
        let data = outcome.into_data();

        run.advance(UploadState::Uploading);
        if cancel.is_cancelled() {
            return Err(UploadError::Cancelled);
        }

        let provisioning =
            tokio::time::timeout(self.provision_timeout, self.provisioner.ensure_destination());
        let provisioned = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(UploadError::Cancelled),
            res = provisioning => res.unwrap_or_else(|_| ProvisionOutcome::Unavailable {
                reason: format!(
                    "container check timed out after {}ms",
                    self.provision_timeout.as_millis()
                ),
            }),
        };

        if let ProvisionOutcome::Unavailable { reason } = provisioned {
            tracing::warn!(
                container = %self.storage.container(),
                reason = %reason,
                "Destination container not confirmed, attempting upload anyway"
            );
            warnings.push(UploadWarning::Provision { reason });
        }

        let key = generate_object_key(
            request.category,
            request.owner_id.as_deref(),
            &request.filename,
        );
        let size = data.len();

        let write = self.storage.put_object(&key, data, &request.content_type);
        let written = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(UploadError::Cancelled),
            res = tokio::time::timeout(self.timeout, write) => match res {
                Ok(Ok(stored_key)) => Ok(stored_key),
                Ok(Err(e)) => Err(UploadError::Backend(e)),
                Err(_) => Err(UploadError::Timeout(self.timeout)),
            },
        };

        let stored_key = match written {
            Ok(stored_key) => stored_key,
            Err(e @ (UploadError::Cancelled | UploadError::Timeout(_))) => {
                // The write may have landed before it was abandoned
                self.discard(&key).await;
                return Err(e);
            }
            Err(e) => return Err(e),
        };

        tracing::debug!(key = %stored_key, size_bytes = size, "Object stored");

        Ok(UploadReport {
            object: StorageObject {
                url: self.storage.public_url(&stored_key),
                path: stored_key,
                category: request.category,
                owner_id: request.owner_id,
                created_at: Utc::now(),
            },
            warnings,
            resized,
            states: Vec::new(),
        })
    }

    /// Remove a write abandoned by a cancel or timeout, within `cleanup_timeout`.
    ///
    /// Dropping the put future does not recall a request the backend already
    /// received, so the delete can arrive before the write lands. One existence check
    /// after the delete catches a write that landed in between; a write still in
    /// flight after that check can outlive the cleanup.
    async fn discard(&self, key: &str) {
        let cleanup = async {
            self.storage.delete_object(key).await?;
            if self.storage.exists(key).await? {
                tracing::debug!(key = %key, "Abandoned write landed after delete, retrying");
                self.storage.delete_object(key).await?;
            }
            Ok::<(), StorageError>(())
        };

        match tokio::time::timeout(self.cleanup_timeout, cleanup).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::warn!(key = %key, error = %e, "Failed to remove abandoned upload")
            }
            Err(_) => tracing::warn!(
                key = %key,
                timeout_ms = self.cleanup_timeout.as_millis() as u64,
                "Timed out removing abandoned upload"
            ),
        }
    }
}
