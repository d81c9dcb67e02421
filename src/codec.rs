//! Wire codec for registry-framed payloads
//!
//! Every value written through the registry carries an 18-byte prefix ahead of
//! the (possibly compressed) payload:
//!
//! ```text
//! byte  | value
//! ------|------------------------------------------------------
//! 0     | magic byte, 0x03
//! 1     | compression wire code
//! 2-17  | schema version id, standard big-endian UUID layout
//! 18+   | payload bytes
//! ```
//!
//! The layout is bit-exact with the Java Glue Schema Registry client so that
//! producers and consumers written against either library interoperate. A
//! leading byte other than 0x03 means the data was written by an incompatible
//! client, for a different registry, or by a schema-less producer.

use crate::error::{SchemaError, SchemaResult};
use crate::schema::SchemaVersionId;

/// Magic byte expected at the start of every frame.
pub const VERSION_BYTE: u8 = 0x03;

/// Number of bytes reserved for the schema version id.
pub const SCHEMA_VERSION_ID_SIZE: usize = 16;

/// Total size of the fixed prefix: magic + compression code + version id.
pub const HEADER_SIZE: usize = 2 + SCHEMA_VERSION_ID_SIZE;

/// Frame a payload with its schema version id and compression code.
pub fn encode(version_id: SchemaVersionId, compression_code: u8, payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(HEADER_SIZE + payload.len());
    out.push(VERSION_BYTE);
    out.push(compression_code);
    out.extend_from_slice(version_id.as_bytes());
    out.extend_from_slice(payload);
    out
}

/// Split a frame into its schema version id, compression code and payload.
///
/// The payload is borrowed from the input; decompression is the caller's
/// concern. Fails with [`SchemaError::MalformedData`] if the input is shorter
/// than the fixed header or the magic byte does not match.
pub fn decode(bytes: &[u8]) -> SchemaResult<(SchemaVersionId, u8, &[u8])> {
    if bytes.len() < HEADER_SIZE {
        return Err(SchemaError::MalformedData {
            message: format!(
                "need at least {} bytes, got {}",
                HEADER_SIZE,
                bytes.len()
            ),
        });
    }
    if bytes[0] != VERSION_BYTE {
        return Err(SchemaError::MalformedData {
            message: format!("leading byte {:#04x} not recognized", bytes[0]),
        });
    }
    let compression_code = bytes[1];
    let mut id = [0u8; SCHEMA_VERSION_ID_SIZE];
    id.copy_from_slice(&bytes[2..HEADER_SIZE]);
    Ok((
        SchemaVersionId::from_bytes(id),
        compression_code,
        &bytes[HEADER_SIZE..],
    ))
}
