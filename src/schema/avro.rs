//! Avro codec internals
//!
//! Thin wrappers over `apache-avro` single-object ("datum") encoding: no
//! object container framing, just the binary encoding of one record under its
//! writer schema. The registry frame around it carries the schema identity.

use std::io::Cursor;

use apache_avro::types::Value as AvroValue;
use apache_avro::{from_avro_datum, to_avro_datum, Schema as AvroSchema};

use crate::error::{SchemaError, SchemaResult};

/// Parse a definition into the apache-avro schema form.
pub(crate) fn parse(definition: &str) -> SchemaResult<AvroSchema> {
    AvroSchema::parse_str(definition).map_err(|e| SchemaError::InvalidInput {
        message: format!("invalid Avro schema definition: {}", e),
    })
}

/// Resolve the fully-qualified name of a definition without a full parse.
///
/// Reads the definition as JSON and joins `namespace` and `name` the way Avro
/// does; a name that already contains dots is taken as fully qualified. Named
/// non-record types fall back to their `type` string.
pub(crate) fn fqn_of(definition: &str) -> SchemaResult<String> {
    let root: serde_json::Value =
        serde_json::from_str(definition).map_err(|e| SchemaError::InvalidInput {
            message: format!("schema definition is not valid JSON: {}", e),
        })?;
    let obj = root.as_object().ok_or_else(|| SchemaError::InvalidInput {
        message: "schema definition must be a JSON object".to_string(),
    })?;

    let name = obj
        .get("name")
        .and_then(|n| n.as_str())
        .or_else(|| obj.get("type").and_then(|t| t.as_str()))
        .ok_or_else(|| SchemaError::InvalidInput {
            message: "schema definition carries no name".to_string(),
        })?;

    if name.contains('.') {
        return Ok(name.to_string());
    }
    match obj.get("namespace").and_then(|ns| ns.as_str()) {
        Some(ns) if !ns.is_empty() => Ok(format!("{}.{}", ns, name)),
        _ => Ok(name.to_string()),
    }
}

/// Encode a value as a schemaless Avro datum.
pub(crate) fn encode(schema: &AvroSchema, value: &AvroValue) -> SchemaResult<Vec<u8>> {
    to_avro_datum(schema, value.clone()).map_err(|e| SchemaError::InvalidInput {
        message: format!("failed to encode Avro datum: {}", e),
    })
}

/// Decode a schemaless Avro datum under its writer schema.
pub(crate) fn decode(schema: &AvroSchema, bytes: &[u8]) -> SchemaResult<AvroValue> {
    let mut cursor = Cursor::new(bytes);
    from_avro_datum(schema, &mut cursor, None).map_err(|e| SchemaError::MalformedData {
        message: format!("failed to decode Avro datum: {}", e),
    })
}
