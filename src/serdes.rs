//! Serializer/deserializer pipeline
//!
//! The deterministic composition of schema resolution, datum encoding,
//! compression and framing — and its inverse. The pipeline is stateless
//! beyond its references to the coordinator and its compression choice, so a
//! single instance is safe to share across any number of concurrent produce
//! and consume operations.

use std::sync::Arc;

use crate::codec;
use crate::compression::{CompressionKind, CompressionRegistry};
use crate::config::SerdeConfig;
use crate::error::SchemaResult;
use crate::registry::{RegistryApi, SchemaCoordinator, SchemaRegistryClient};
use crate::schema::{Datum, Schema};

/// A datum paired with the schema it was written under.
///
/// Producers hand this pair to the serializer; the deserializer hands it
/// back, carrying the writer schema recovered from the registry.
#[derive(Debug, Clone)]
pub struct DataAndSchema {
    pub data: Datum,
    pub schema: Arc<Schema>,
}

impl DataAndSchema {
    pub fn new(data: Datum, schema: Arc<Schema>) -> Self {
        Self { data, schema }
    }
}

/// Registry-backed serde pipeline.
pub struct RegistrySerde {
    coordinator: Arc<SchemaCoordinator>,
    compressions: Arc<CompressionRegistry>,
    compression: CompressionKind,
}

impl RegistrySerde {
    /// Build the full stack over an opaque registry RPC client.
    pub fn new(api: Arc<dyn RegistryApi>, config: SerdeConfig) -> Self {
        let client = Arc::new(SchemaRegistryClient::new(api, &config));
        let coordinator = Arc::new(SchemaCoordinator::new(client, &config));
        Self::with_coordinator(coordinator, Arc::new(CompressionRegistry::new()), &config)
    }

    /// Build over an existing coordinator, sharing its cache. Lets several
    /// pipelines (or a custom compression registry) reuse one cache.
    pub fn with_coordinator(
        coordinator: Arc<SchemaCoordinator>,
        compressions: Arc<CompressionRegistry>,
        config: &SerdeConfig,
    ) -> Self {
        Self {
            coordinator,
            compressions,
            compression: config.compression,
        }
    }

    pub fn coordinator(&self) -> &Arc<SchemaCoordinator> {
        &self.coordinator
    }

    /// Serialize a datum under its schema, filed in the registry under the
    /// schema's own name.
    pub async fn serialize(&self, data: &Datum, schema: &Schema) -> SchemaResult<Vec<u8>> {
        self.serialize_as(data, schema, schema.name()).await
    }

    /// Serialize a datum under its schema, filed under an explicit registry
    /// schema name (chosen by a naming strategy).
    pub async fn serialize_as(
        &self,
        data: &Datum,
        schema: &Schema,
        schema_name: &str,
    ) -> SchemaResult<Vec<u8>> {
        let version_id = self.coordinator.get_or_register(schema, schema_name).await?;
        let raw = schema.encode(data)?;
        let algorithm = self.compressions.for_code(self.compression.wire_code())?;
        let payload = algorithm.compress(&raw)?;
        Ok(codec::encode(version_id, algorithm.wire_code(), &payload))
    }

    /// Deserialize a framed value back into its datum and writer schema.
    pub async fn deserialize(&self, bytes: &[u8]) -> SchemaResult<DataAndSchema> {
        let (version_id, compression_code, payload) = codec::decode(bytes)?;
        let schema = self.coordinator.get_by_id(version_id).await?;
        let raw = self.compressions.for_code(compression_code)?.decompress(payload)?;
        let data = schema.decode(&raw)?;
        Ok(DataAndSchema::new(data, schema))
    }
}
