//! Registry-backed schema serde for Kafka
//!
//! Client-side integration between Kafka (or similar message transports) and
//! a cloud-hosted schema registry. The registry stores versioned schemas
//! under globally unique 16-byte version ids; this crate attaches that
//! identity to every outbound message and recovers the writer schema for
//! every inbound message, transparently to application code.
//!
//! ```text
//! produce: (datum, schema) -> resolve/register id -> encode -> compress -> frame
//! consume: frame -> id -> fetch schema -> decompress -> decode -> (datum, schema)
//! ```
//!
//! The moving parts, leaves first:
//!
//! - [`codec`]: the bit-exact wire framing (magic byte, compression code,
//!   schema version id) shared with the upstream Java client
//! - [`compression`]: named algorithms keyed by their wire code
//! - [`schema`]: the schema value, its Avro codec and the registry data model
//! - [`registry`]: the RPC surface, the typed client and the process-wide
//!   schema cache with single-flight lookups and auto-registration
//! - [`serdes`]: the pipeline composing all of the above
//! - [`kafka`]: per-message transform callables shaped for Kafka clients
//!
//! All remote I/O happens on the caller's task; the crate spawns nothing in
//! the background and the only sleeps are inside the registry client's
//! bounded polling loop for pending schema versions.

pub mod codec;
pub mod compression;
pub mod config;
pub mod error;
pub mod kafka;
pub mod registry;
pub mod schema;
pub mod serdes;

// Re-export the public API surface
pub use compression::{CompressionAlgorithm, CompressionKind, CompressionRegistry};
pub use config::SerdeConfig;
pub use error::{SchemaError, SchemaResult};
pub use kafka::{KafkaDeserializer, KafkaSerializer, NamingStrategy};
pub use registry::{RegistryApi, SchemaCoordinator, SchemaRegistryClient};
pub use schema::{
    CompatibilityMode, DataFormat, Datum, Schema, SchemaVersion, SchemaVersionId,
    SchemaVersionStatus,
};
pub use serdes::{DataAndSchema, RegistrySerde};
