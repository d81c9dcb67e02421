//! Kafka-shaped transport adapter
//!
//! Surfaces the serde pipeline as the per-message transform callables Kafka
//! clients expect: `serialize(topic, value)` and `deserialize(topic, bytes)`.
//! The topic only feeds the naming strategy; no other transport semantics are
//! imposed, and connection lifecycle stays with the Kafka client.
//!
//! `None` values pass through unchanged in both directions, preserving Kafka
//! tombstone semantics.

pub mod naming;

use std::sync::Arc;

use crate::codec::{HEADER_SIZE, VERSION_BYTE};
use crate::error::SchemaResult;
use crate::serdes::{DataAndSchema, RegistrySerde};

pub use naming::NamingStrategy;

/// Deserializer invoked for frames this library does not recognize,
/// typically while migrating from another schema registry or consuming
/// schema-less topics.
pub type FallbackDeserializer =
    Box<dyn Fn(&str, &[u8]) -> SchemaResult<Option<DataAndSchema>> + Send + Sync>;

/// Producer-side transform: datum + schema in, framed bytes out.
pub struct KafkaSerializer {
    serde: Arc<RegistrySerde>,
    naming: NamingStrategy,
    is_key: bool,
}

impl KafkaSerializer {
    pub fn new(serde: Arc<RegistrySerde>) -> Self {
        Self {
            serde,
            naming: NamingStrategy::default(),
            is_key: false,
        }
    }

    /// Use a different schema naming strategy.
    pub fn with_naming_strategy(mut self, naming: NamingStrategy) -> Self {
        self.naming = naming;
        self
    }

    /// Mark this serializer as handling message keys rather than values.
    pub fn for_keys(mut self) -> Self {
        self.is_key = true;
        self
    }

    /// Serialize one message value. `None` stays `None`.
    pub async fn serialize(
        &self,
        topic: &str,
        value: Option<&DataAndSchema>,
    ) -> SchemaResult<Option<Vec<u8>>> {
        let pair = match value {
            Some(pair) => pair,
            None => return Ok(None),
        };
        let schema_name = self.naming.resolve(topic, self.is_key, &pair.schema);
        let bytes = self
            .serde
            .serialize_as(&pair.data, &pair.schema, &schema_name)
            .await?;
        Ok(Some(bytes))
    }
}

/// Consumer-side transform: framed bytes in, datum + writer schema out.
pub struct KafkaDeserializer {
    serde: Arc<RegistrySerde>,
    fallback: Option<FallbackDeserializer>,
}

impl KafkaDeserializer {
    pub fn new(serde: Arc<RegistrySerde>) -> Self {
        Self {
            serde,
            fallback: None,
        }
    }

    /// Pass unrecognized encodings through to `fallback` instead of failing
    /// with a malformed-data error.
    pub fn with_fallback(mut self, fallback: FallbackDeserializer) -> Self {
        self.fallback = Some(fallback);
        self
    }

    /// Deserialize one message value. `None` stays `None`.
    pub async fn deserialize(
        &self,
        topic: &str,
        bytes: Option<&[u8]>,
    ) -> SchemaResult<Option<DataAndSchema>> {
        let bytes = match bytes {
            Some(bytes) => bytes,
            None => return Ok(None),
        };
        if let Some(fallback) = &self.fallback {
            if bytes.len() < HEADER_SIZE || bytes[0] != VERSION_BYTE {
                return fallback(topic, bytes);
            }
        }
        self.serde.deserialize(bytes).await.map(Some)
    }
}
