//! Idempotent container provisioning
//!
//! The provisioner never fails: callers get a [`ProvisionOutcome`] and decide what to
//! do with it. Backend create-if-missing is idempotent, so concurrent provisioning
//! of the same container is harmless.

use std::sync::Arc;

use crate::traits::Storage;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisionOutcome {
    /// The direct probe found the container
    Exists,
    /// The container was missing (or the probe was inconclusive) and creation succeeded
    Created,
    /// Neither the probe nor the privileged creation call could confirm the container
    Unavailable { reason: String },
}

impl ProvisionOutcome {
    pub fn is_ready(&self) -> bool {
        !matches!(self, ProvisionOutcome::Unavailable { .. })
    }
}

#[derive(Clone)]
pub struct BucketProvisioner {
    storage: Arc<dyn Storage>,
    privileged: Option<Arc<dyn Storage>>,
}

impl BucketProvisioner {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage,
            privileged: None,
        }
    }

    /// Use a client with elevated credentials for the creation call
    pub fn with_privileged(mut self, privileged: Arc<dyn Storage>) -> Self {
        self.privileged = Some(privileged);
        self
    }

    /// Ensure the storage's own destination container exists
    pub async fn ensure_destination(&self) -> ProvisionOutcome {
        let name = self.storage.container().to_string();
        self.ensure(&name).await
    }

    #[tracing::instrument(skip(self), fields(storage.backend = %self.storage.backend_type()))]
    pub async fn ensure(&self, name: &str) -> ProvisionOutcome {
        match self.storage.container_exists(name).await {
            Ok(true) => {
                tracing::debug!(container = %name, "Container exists");
                return ProvisionOutcome::Exists;
            }
            Ok(false) => {
                tracing::debug!(container = %name, "Container missing, requesting creation");
            }
            Err(e) => {
                tracing::debug!(
                    container = %name,
                    error = %e,
                    "Container probe inconclusive, requesting creation"
                );
            }
        }

        let creator = self.privileged.as_ref().unwrap_or(&self.storage);
        match creator.create_container(name).await {
            Ok(true) => {
                tracing::info!(container = %name, "Container provisioned");
                ProvisionOutcome::Created
            }
            Ok(false) => ProvisionOutcome::Unavailable {
                reason: format!("container {} could not be created", name),
            },
            Err(e) => ProvisionOutcome::Unavailable {
                reason: e.to_string(),
            },
        }
    }
}
