//! Schema cache and coordinator
//!
//! The process-wide, bidirectional schema cache behind the serde pipeline.
//! Producers resolve a schema to its version id; consumers resolve a version
//! id back to a schema. Both directions are monotonic for the lifetime of the
//! coordinator: a cached entry is never mutated or evicted, because the
//! registry-side identity of a version id is immutable by contract.
//!
//! Misses coalesce per key: at most one remote lookup is in flight for any
//! key, and concurrent callers clone the outcome of that one flight. Flight
//! entries are dropped once resolved, so only successful results stay cached
//! and a failed lookup is retried by the next caller.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt, Shared};
use tokio::sync::{Mutex, RwLock};

use crate::config::SerdeConfig;
use crate::error::{SchemaError, SchemaResult};
use crate::registry::client::SchemaRegistryClient;
use crate::schema::{CompatibilityMode, DataFormat, Schema, SchemaVersion, SchemaVersionId};

/// Forward-map key: what identifies a schema to a producer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct DefinitionKey {
    name: String,
    definition: String,
    data_format: DataFormat,
}

/// A coalesced remote lookup whose outcome every waiter clones.
type Flight<T> = Shared<BoxFuture<'static, SchemaResult<T>>>;

type DefinitionMap = Arc<RwLock<HashMap<DefinitionKey, SchemaVersionId>>>;
type IdMap = Arc<RwLock<HashMap<SchemaVersionId, Arc<Schema>>>>;

/// Thread-safe cache of registry schemas with auto-registration.
///
/// Explicitly constructed against one registry client and configuration so
/// that tests can isolate state; holds no OS resources and needs no teardown.
pub struct SchemaCoordinator {
    client: Arc<SchemaRegistryClient>,
    auto_registration: bool,
    default_compatibility: CompatibilityMode,
    metadata: Arc<HashMap<String, String>>,
    by_definition: DefinitionMap,
    by_id: IdMap,
    inflight_definitions: Mutex<HashMap<DefinitionKey, Flight<SchemaVersionId>>>,
    inflight_ids: Mutex<HashMap<SchemaVersionId, Flight<Arc<Schema>>>>,
}

impl SchemaCoordinator {
    pub fn new(client: Arc<SchemaRegistryClient>, config: &SerdeConfig) -> Self {
        Self {
            client,
            auto_registration: config.schema_auto_registration,
            default_compatibility: config.compatibility_mode,
            metadata: Arc::new(config.metadata.clone()),
            by_definition: Arc::new(RwLock::new(HashMap::new())),
            by_id: Arc::new(RwLock::new(HashMap::new())),
            inflight_definitions: Mutex::new(HashMap::new()),
            inflight_ids: Mutex::new(HashMap::new()),
        }
    }

    /// Resolve a schema to its version id, registering it if the registry
    /// does not know it yet (producer path).
    ///
    /// `schema_name` is the name the schema is filed under in the registry,
    /// usually [`Schema::name`] unless a naming strategy chose otherwise.
    pub async fn get_or_register(
        &self,
        schema: &Schema,
        schema_name: &str,
    ) -> SchemaResult<SchemaVersionId> {
        let key = DefinitionKey {
            name: schema_name.to_string(),
            definition: schema.definition().to_string(),
            data_format: schema.data_format(),
        };
        if let Some(id) = self.by_definition.read().await.get(&key) {
            return Ok(*id);
        }

        let flight = {
            let mut inflight = self.inflight_definitions.lock().await;
            match inflight.get(&key) {
                Some(flight) => flight.clone(),
                None => {
                    let compatibility = schema
                        .compatibility()
                        .unwrap_or(self.default_compatibility);
                    let flight = Self::resolve_definition(
                        self.client.clone(),
                        key.clone(),
                        Arc::new(schema.clone()),
                        self.auto_registration,
                        compatibility,
                        self.metadata.clone(),
                        self.by_definition.clone(),
                        self.by_id.clone(),
                    )
                    .boxed()
                    .shared();
                    inflight.insert(key.clone(), flight.clone());
                    flight
                }
            }
        };

        let result = flight.await;
        self.inflight_definitions.lock().await.remove(&key);
        result
    }

    /// Resolve a version id to its schema (consumer path).
    pub async fn get_by_id(&self, version_id: SchemaVersionId) -> SchemaResult<Arc<Schema>> {
        if let Some(schema) = self.by_id.read().await.get(&version_id) {
            return Ok(schema.clone());
        }

        let flight = {
            let mut inflight = self.inflight_ids.lock().await;
            match inflight.get(&version_id) {
                Some(flight) => flight.clone(),
                None => {
                    let flight = Self::resolve_id(
                        self.client.clone(),
                        version_id,
                        self.by_definition.clone(),
                        self.by_id.clone(),
                    )
                    .boxed()
                    .shared();
                    inflight.insert(version_id, flight.clone());
                    flight
                }
            }
        };

        let result = flight.await;
        self.inflight_ids.lock().await.remove(&version_id);
        result
    }

    /// Current entry counts of the (definition, id) maps, for diagnostics
    /// and tests.
    pub async fn cache_sizes(&self) -> (usize, usize) {
        (
            self.by_definition.read().await.len(),
            self.by_id.read().await.len(),
        )
    }

    /// One coalesced producer-side lookup.
    #[allow(clippy::too_many_arguments)]
    async fn resolve_definition(
        client: Arc<SchemaRegistryClient>,
        key: DefinitionKey,
        schema: Arc<Schema>,
        auto_registration: bool,
        compatibility: CompatibilityMode,
        metadata: Arc<HashMap<String, String>>,
        by_definition: DefinitionMap,
        by_id: IdMap,
    ) -> SchemaResult<SchemaVersionId> {
        // A flight that finished between the caller's miss and this one
        // starting already populated the map.
        if let Some(id) = by_definition.read().await.get(&key) {
            return Ok(*id);
        }

        let version = match client
            .get_schema_by_definition(&key.name, &key.definition, key.data_format)
            .await
        {
            Ok(version) => version,
            Err(SchemaError::SchemaNotFound { .. }) if auto_registration => {
                Self::auto_register(&client, &key, compatibility, &metadata).await?
            }
            Err(SchemaError::SchemaNotFound { .. }) => {
                return Err(SchemaError::SchemaNotFound {
                    name: key.name.clone(),
                });
            }
            Err(e) => return Err(e),
        };

        Self::insert(&by_definition, &by_id, key, version.version_id, schema).await;
        Ok(version.version_id)
    }

    /// Register the schema the registry does not know yet.
    ///
    /// Tries a new version under the existing name first; if the name itself
    /// is unknown, creates it. Losing a create race against another producer
    /// leaves the name existing, so the version is registered against it.
    async fn auto_register(
        client: &SchemaRegistryClient,
        key: &DefinitionKey,
        compatibility: CompatibilityMode,
        metadata: &HashMap<String, String>,
    ) -> SchemaResult<SchemaVersion> {
        log::info!(
            "schema {} unknown to registry {}, auto-registering",
            key.name,
            client.registry_name()
        );
        let version = match client
            .register_schema_version(&key.name, &key.definition)
            .await
        {
            Ok(version) => version,
            Err(SchemaError::SchemaNotFound { .. }) => {
                match client
                    .create_schema(&key.name, &key.definition, key.data_format, compatibility)
                    .await
                {
                    Ok(version) => version,
                    Err(SchemaError::AlreadyExists { .. }) => {
                        client
                            .register_schema_version(&key.name, &key.definition)
                            .await?
                    }
                    Err(e) => return Err(e),
                }
            }
            Err(e) => return Err(e),
        };

        for (k, v) in metadata.iter() {
            if let Err(e) = client
                .put_schema_version_metadata(version.version_id, k, v)
                .await
            {
                log::warn!(
                    "failed to attach metadata {}={} to schema version {}: {}",
                    k,
                    v,
                    version.version_id,
                    e
                );
            }
        }
        Ok(version)
    }

    /// One coalesced consumer-side lookup.
    async fn resolve_id(
        client: Arc<SchemaRegistryClient>,
        version_id: SchemaVersionId,
        by_definition: DefinitionMap,
        by_id: IdMap,
    ) -> SchemaResult<Arc<Schema>> {
        if let Some(schema) = by_id.read().await.get(&version_id) {
            return Ok(schema.clone());
        }

        let version = client.get_schema_version(version_id).await?;
        let key = DefinitionKey {
            name: version.schema_name.clone(),
            definition: version.definition.clone(),
            data_format: version.data_format,
        };
        let schema = Arc::new(Schema::from_version(&version));
        Ok(Self::insert(&by_definition, &by_id, key, version_id, schema).await)
    }

    /// Publish a resolved (key, id, schema) into both maps.
    ///
    /// First insert wins on either side; an already-present entry is returned
    /// unchanged so every caller observes the original value.
    async fn insert(
        by_definition: &DefinitionMap,
        by_id: &IdMap,
        key: DefinitionKey,
        version_id: SchemaVersionId,
        schema: Arc<Schema>,
    ) -> Arc<Schema> {
        let stored = {
            let mut ids = by_id.write().await;
            ids.entry(version_id).or_insert(schema).clone()
        };
        {
            let mut definitions = by_definition.write().await;
            definitions.entry(key).or_insert(version_id);
        }
        stored
    }
}
