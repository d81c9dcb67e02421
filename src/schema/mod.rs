//! Schema data model
//!
//! Core types shared by the registry client, the cache and the serde
//! pipeline: the data-format and compatibility enums the registry understands,
//! the 16-byte schema version id that names a version globally, the
//! registry-side [`SchemaVersion`] record, and the client-side [`Schema`]
//! value that knows how to encode and decode datums.
//!
//! Two schemas are equivalent iff their `(data format, name, definition)`
//! triple matches exactly; the definition is compared as a string, no
//! semantic normalization is performed.

pub mod avro;

use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::OnceLock;

use apache_avro::Schema as AvroSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{SchemaError, SchemaResult};

/// Data formats the registry can store. Only Avro has a codec in this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DataFormat {
    Avro,
    Json,
}

impl std::fmt::Display for DataFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataFormat::Avro => write!(f, "AVRO"),
            DataFormat::Json => write!(f, "JSON"),
        }
    }
}

/// Checks the registry performs on new schema versions.
///
/// Values:
/// - `None`: no compatibility checks performed
/// - `Disabled`: no new versions can be added to the schema
/// - `Backward`: consumer can read both current and previous version
/// - `BackwardAll`: consumer can read current and all previous versions
/// - `Forward`: consumer can read both current and subsequent version
/// - `ForwardAll`: consumer can read current and all subsequent versions
/// - `Full`: combination of `Backward` and `Forward`
/// - `FullAll`: combination of `BackwardAll` and `ForwardAll`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompatibilityMode {
    None,
    Disabled,
    #[default]
    Backward,
    BackwardAll,
    Forward,
    ForwardAll,
    Full,
    FullAll,
}

impl std::fmt::Display for CompatibilityMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            CompatibilityMode::None => "NONE",
            CompatibilityMode::Disabled => "DISABLED",
            CompatibilityMode::Backward => "BACKWARD",
            CompatibilityMode::BackwardAll => "BACKWARD_ALL",
            CompatibilityMode::Forward => "FORWARD",
            CompatibilityMode::ForwardAll => "FORWARD_ALL",
            CompatibilityMode::Full => "FULL",
            CompatibilityMode::FullAll => "FULL_ALL",
        };
        write!(f, "{}", s)
    }
}

/// Lifecycle status of a schema version inside the registry.
///
/// Only `Available` versions are usable; `Pending` versions are polled until
/// they settle, the rest are terminal failures from the client's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SchemaVersionStatus {
    Available,
    Pending,
    Deleting,
    Failure,
}

impl std::fmt::Display for SchemaVersionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SchemaVersionStatus::Available => "AVAILABLE",
            SchemaVersionStatus::Pending => "PENDING",
            SchemaVersionStatus::Deleting => "DELETING",
            SchemaVersionStatus::Failure => "FAILURE",
        };
        write!(f, "{}", s)
    }
}

/// Globally unique 128-bit identifier the registry assigns to a version.
///
/// On the wire this is the 16 bytes of the canonical UUID text form in
/// standard 4-2-2-2-6 big-endian order; comparison is byte-wise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaVersionId(Uuid);

impl SchemaVersionId {
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        SchemaVersionId(Uuid::from_bytes(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }
}

impl From<Uuid> for SchemaVersionId {
    fn from(uuid: Uuid) -> Self {
        SchemaVersionId(uuid)
    }
}

impl std::fmt::Display for SchemaVersionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SchemaVersionId {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(SchemaVersionId)
            .map_err(|e| SchemaError::InvalidInput {
                message: format!("invalid schema version id {:?}: {}", s, e),
            })
    }
}

/// A schema version as the registry reports it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaVersion {
    pub schema_name: String,
    pub version_id: SchemaVersionId,
    pub definition: String,
    pub data_format: DataFormat,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compatibility: Option<CompatibilityMode>,
    pub status: SchemaVersionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_number: Option<i64>,
}

/// A record value carried opaquely through the pipeline.
///
/// Only the schema's encode/decode interpret the datum; everything else
/// passes it through untouched. The variant must match the schema's data
/// format, otherwise serialization fails with
/// [`SchemaError::InvalidInput`].
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Datum {
    Avro(apache_avro::types::Value),
    Json(serde_json::Value),
}

/// A schema as application code sees it: identity plus a codec.
///
/// Carries the data format, the registry schema name, an optional declared
/// compatibility mode, and the canonical definition text. For Avro the
/// definition is parsed lazily on first encode/decode and the parsed form is
/// cached for the lifetime of the value.
pub struct Schema {
    name: String,
    fqn: String,
    definition: String,
    data_format: DataFormat,
    compatibility: Option<CompatibilityMode>,
    parsed: OnceLock<AvroSchema>,
}

impl Schema {
    /// Build an Avro schema from its definition text.
    ///
    /// The definition must be a JSON object carrying a resolvable name; the
    /// full Avro parse is deferred until the first encode or decode.
    pub fn new_avro(definition: impl Into<String>) -> SchemaResult<Self> {
        let definition = definition.into();
        let fqn = avro::fqn_of(&definition)?;
        let name = fqn.rsplit('.').next().unwrap_or(&fqn).to_string();
        Ok(Schema {
            name,
            fqn,
            definition,
            data_format: DataFormat::Avro,
            compatibility: None,
            parsed: OnceLock::new(),
        })
    }

    /// Build the schema for a version fetched from the registry.
    pub fn from_version(version: &SchemaVersion) -> Self {
        let fqn = match version.data_format {
            DataFormat::Avro => {
                avro::fqn_of(&version.definition).unwrap_or_else(|_| version.schema_name.clone())
            }
            DataFormat::Json => version.schema_name.clone(),
        };
        Schema {
            name: version.schema_name.clone(),
            fqn,
            definition: version.definition.clone(),
            data_format: version.data_format,
            compatibility: version.compatibility,
            parsed: OnceLock::new(),
        }
    }

    /// Declare the compatibility mode used if this schema creates a new
    /// schema name in the registry.
    pub fn with_compatibility(mut self, mode: CompatibilityMode) -> Self {
        self.compatibility = Some(mode);
        self
    }

    /// The schema name used within a registry (last segment of the fqn).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The fully-qualified record name, namespace included.
    pub fn fqn(&self) -> &str {
        &self.fqn
    }

    /// The canonical definition text, compared verbatim for cache identity.
    pub fn definition(&self) -> &str {
        &self.definition
    }

    pub fn data_format(&self) -> DataFormat {
        self.data_format
    }

    /// The declared compatibility mode, if any.
    pub fn compatibility(&self) -> Option<CompatibilityMode> {
        self.compatibility
    }

    /// Encode a datum under this schema.
    pub fn encode(&self, datum: &Datum) -> SchemaResult<Vec<u8>> {
        match (self.data_format, datum) {
            (DataFormat::Avro, Datum::Avro(value)) => avro::encode(self.parsed_avro()?, value),
            (DataFormat::Avro, _) => Err(SchemaError::InvalidInput {
                message: format!("datum is not an Avro value for schema {}", self.name),
            }),
            (DataFormat::Json, _) => Err(SchemaError::UnsupportedFormat {
                format: DataFormat::Json,
            }),
        }
    }

    /// Decode bytes written under this schema. The schema itself acts as the
    /// writer schema; reader-schema projection is the application's job.
    pub fn decode(&self, bytes: &[u8]) -> SchemaResult<Datum> {
        match self.data_format {
            DataFormat::Avro => Ok(Datum::Avro(avro::decode(self.parsed_avro()?, bytes)?)),
            DataFormat::Json => Err(SchemaError::UnsupportedFormat {
                format: DataFormat::Json,
            }),
        }
    }

    /// The parsed Avro form, built once and cached.
    fn parsed_avro(&self) -> SchemaResult<&AvroSchema> {
        if let Some(parsed) = self.parsed.get() {
            return Ok(parsed);
        }
        let parsed = avro::parse(&self.definition)?;
        // A racing parse of the same definition yields the same value.
        Ok(self.parsed.get_or_init(|| parsed))
    }
}

impl Clone for Schema {
    fn clone(&self) -> Self {
        let parsed = OnceLock::new();
        if let Some(p) = self.parsed.get() {
            let _ = parsed.set(p.clone());
        }
        Schema {
            name: self.name.clone(),
            fqn: self.fqn.clone(),
            definition: self.definition.clone(),
            data_format: self.data_format,
            compatibility: self.compatibility,
            parsed,
        }
    }
}

impl std::fmt::Debug for Schema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Schema")
            .field("name", &self.name)
            .field("data_format", &self.data_format)
            .field("compatibility", &self.compatibility)
            .finish()
    }
}

impl PartialEq for Schema {
    fn eq(&self, other: &Self) -> bool {
        self.data_format == other.data_format
            && self.name == other.name
            && self.definition == other.definition
    }
}

impl Eq for Schema {}

impl Hash for Schema {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.data_format.hash(state);
        self.name.hash(state);
        self.definition.hash(state);
    }
}
