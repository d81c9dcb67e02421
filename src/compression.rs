//! Payload compression for framed values
//!
//! Each algorithm owns a single-byte wire code that is written into the frame
//! header, so codes are stable across library versions and languages. The
//! registry ships with the two codes the upstream clients know about and
//! accepts user-supplied algorithms for additional codes.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::sync::Arc;

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;

use crate::error::{SchemaError, SchemaResult};

/// Wire code written when compression is disabled.
pub const COMPRESSION_NONE: u8 = 0x00;

/// Wire code for the zlib deflate stream format.
pub const COMPRESSION_ZLIB: u8 = 0x05;

/// A named compression strategy with symmetric compress/decompress.
pub trait CompressionAlgorithm: Send + Sync + std::fmt::Debug {
    /// Single-byte code identifying this algorithm inside a frame header.
    fn wire_code(&self) -> u8;

    /// Human-readable algorithm name, used in logs.
    fn name(&self) -> &str;

    fn compress(&self, data: &[u8]) -> SchemaResult<Vec<u8>>;

    fn decompress(&self, data: &[u8]) -> SchemaResult<Vec<u8>>;
}

/// Passthrough algorithm: both directions are the identity.
#[derive(Debug)]
pub struct NoCompression;

impl CompressionAlgorithm for NoCompression {
    fn wire_code(&self) -> u8 {
        COMPRESSION_NONE
    }

    fn name(&self) -> &str {
        "none"
    }

    fn compress(&self, data: &[u8]) -> SchemaResult<Vec<u8>> {
        Ok(data.to_vec())
    }

    fn decompress(&self, data: &[u8]) -> SchemaResult<Vec<u8>> {
        Ok(data.to_vec())
    }
}

/// Zlib at the default level, the stream format the Java client emits.
#[derive(Debug)]
pub struct ZlibCompression;

impl CompressionAlgorithm for ZlibCompression {
    fn wire_code(&self) -> u8 {
        COMPRESSION_ZLIB
    }

    fn name(&self) -> &str {
        "zlib"
    }

    fn compress(&self, data: &[u8]) -> SchemaResult<Vec<u8>> {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder
            .write_all(data)
            .map_err(|e| SchemaError::MalformedData {
                message: format!("zlib compression failed: {}", e),
            })?;
        encoder.finish().map_err(|e| SchemaError::MalformedData {
            message: format!("zlib compression failed: {}", e),
        })
    }

    fn decompress(&self, data: &[u8]) -> SchemaResult<Vec<u8>> {
        let mut decoder = ZlibDecoder::new(data);
        let mut out = Vec::new();
        decoder
            .read_to_end(&mut out)
            .map_err(|e| SchemaError::MalformedData {
                message: format!("zlib decompression failed: {}", e),
            })?;
        Ok(out)
    }
}

/// Producer-side compression selection, part of the serde configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompressionKind {
    #[default]
    None,
    Zlib,
}

impl CompressionKind {
    pub fn wire_code(&self) -> u8 {
        match self {
            CompressionKind::None => COMPRESSION_NONE,
            CompressionKind::Zlib => COMPRESSION_ZLIB,
        }
    }
}

/// Registry of compression algorithms keyed by wire code.
///
/// Lookup is a plain `HashMap` hit; the registry is built once at pipeline
/// construction and shared read-only afterwards.
pub struct CompressionRegistry {
    by_code: HashMap<u8, Arc<dyn CompressionAlgorithm>>,
}

impl CompressionRegistry {
    /// Create a registry with the built-in algorithms registered.
    pub fn new() -> Self {
        let mut registry = Self {
            by_code: HashMap::new(),
        };
        registry.register(Arc::new(NoCompression));
        registry.register(Arc::new(ZlibCompression));
        registry
    }

    /// Register an algorithm under its wire code, replacing any previous one.
    pub fn register(&mut self, algorithm: Arc<dyn CompressionAlgorithm>) {
        self.by_code.insert(algorithm.wire_code(), algorithm);
    }

    /// Look up an algorithm by the code found in a frame header.
    pub fn for_code(&self, code: u8) -> SchemaResult<&Arc<dyn CompressionAlgorithm>> {
        self.by_code
            .get(&code)
            .ok_or(SchemaError::UnsupportedCompression { code })
    }
}

impl Default for CompressionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
