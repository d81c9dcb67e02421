//! Typed facade over the remote registry
//!
//! Scopes every call to one registry, applies the optional per-RPC deadline,
//! and hides the registry's asynchronous creation model: any operation that
//! observes a `Pending` version polls it with a bounded, linearly-spaced
//! budget until the status settles. The polling loop is the only place this
//! layer sleeps.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::config::SerdeConfig;
use crate::error::{SchemaError, SchemaResult};
use crate::registry::api::RegistryApi;
use crate::schema::{
    CompatibilityMode, DataFormat, SchemaVersion, SchemaVersionId, SchemaVersionStatus,
};

/// Client for a single named registry.
pub struct SchemaRegistryClient {
    api: Arc<dyn RegistryApi>,
    registry_name: String,
    max_wait_attempts: u32,
    wait_interval: Duration,
    request_timeout: Option<Duration>,
}

impl SchemaRegistryClient {
    pub fn new(api: Arc<dyn RegistryApi>, config: &SerdeConfig) -> Self {
        Self {
            api,
            registry_name: config.registry_name.clone(),
            max_wait_attempts: config.max_wait_attempts,
            wait_interval: config.wait_interval,
            request_timeout: config.request_timeout,
        }
    }

    pub fn registry_name(&self) -> &str {
        &self.registry_name
    }

    /// Get a version by id, polling until it is available.
    pub async fn get_schema_version(
        &self,
        version_id: SchemaVersionId,
    ) -> SchemaResult<SchemaVersion> {
        log::debug!("getting schema version by id {}", version_id);
        let version = self
            .call(self.api.get_schema_version_by_id(version_id))
            .await?;
        self.wait_until_available(version).await
    }

    /// Get the version holding exactly this definition, polling until it is
    /// available.
    pub async fn get_schema_by_definition(
        &self,
        schema_name: &str,
        definition: &str,
        data_format: DataFormat,
    ) -> SchemaResult<SchemaVersion> {
        log::debug!(
            "getting schema version id for name = {} in registry {}",
            schema_name,
            self.registry_name
        );
        let version = self
            .call(self.api.get_schema_version_by_definition(
                &self.registry_name,
                schema_name,
                definition,
                data_format,
            ))
            .await?;
        self.wait_until_available(version).await
    }

    /// Register a new version under an existing schema name and wait for the
    /// evolution check to settle.
    pub async fn register_schema_version(
        &self,
        schema_name: &str,
        definition: &str,
    ) -> SchemaResult<SchemaVersion> {
        log::debug!(
            "registering new version of schema {} in registry {}",
            schema_name,
            self.registry_name
        );
        let version = self
            .call(self.api.register_schema_version(
                &self.registry_name,
                schema_name,
                definition,
            ))
            .await?;
        self.wait_until_available(version).await
    }

    /// Create a new schema name with an initial version and wait for it to
    /// become available.
    pub async fn create_schema(
        &self,
        schema_name: &str,
        definition: &str,
        data_format: DataFormat,
        compatibility: CompatibilityMode,
    ) -> SchemaResult<SchemaVersion> {
        log::debug!(
            "creating schema {} in registry {} with compatibility {}",
            schema_name,
            self.registry_name,
            compatibility
        );
        let version = self
            .call(self.api.create_schema(
                &self.registry_name,
                schema_name,
                definition,
                data_format,
                compatibility,
            ))
            .await?;
        self.wait_until_available(version).await
    }

    /// Attach a metadata key/value pair to a version.
    pub async fn put_schema_version_metadata(
        &self,
        version_id: SchemaVersionId,
        key: &str,
        value: &str,
    ) -> SchemaResult<()> {
        self.call(self.api.put_schema_version_metadata(version_id, key, value))
            .await
    }

    /// Poll a version until its status is terminal.
    ///
    /// `Available` succeeds; `Failure` and `Deleting` surface as registration
    /// failures carrying the observed status; a budget of
    /// `max_wait_attempts` checks spaced `wait_interval` apart bounds the
    /// wait on `Pending`.
    async fn wait_until_available(
        &self,
        mut version: SchemaVersion,
    ) -> SchemaResult<SchemaVersion> {
        let mut attempts = 0u32;
        loop {
            match version.status {
                SchemaVersionStatus::Available => return Ok(version),
                SchemaVersionStatus::Pending => {
                    if attempts >= self.max_wait_attempts {
                        return Err(SchemaError::Timeout {
                            message: format!(
                                "schema version {} still pending after {} checks",
                                version.version_id, attempts
                            ),
                        });
                    }
                    attempts += 1;
                    tokio::time::sleep(self.wait_interval).await;
                    version = self
                        .call(self.api.get_schema_version_by_id(version.version_id))
                        .await?;
                }
                SchemaVersionStatus::Failure | SchemaVersionStatus::Deleting => {
                    return Err(SchemaError::RegistrationFailed {
                        name: version.schema_name,
                        status: version.status.to_string(),
                    });
                }
            }
        }
    }

    /// Run one RPC under the configured deadline, if any.
    async fn call<T>(&self, fut: impl Future<Output = SchemaResult<T>>) -> SchemaResult<T> {
        match self.request_timeout {
            Some(deadline) => match tokio::time::timeout(deadline, fut).await {
                Ok(result) => result,
                Err(_) => Err(SchemaError::Timeout {
                    message: format!("registry call exceeded {:?}", deadline),
                }),
            },
            None => fut.await,
        }
    }
}
