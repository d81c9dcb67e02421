//! Configuration for the registry serde pipeline
//!
//! One bundle consumed at construction time. Only the registry name is
//! required; everything else defaults to the behavior of the upstream
//! clients: auto-registration on, no compression, backward compatibility for
//! new schema names, and a 30 × 100 ms polling budget for pending versions.

use std::collections::HashMap;
use std::time::Duration;

use crate::compression::CompressionKind;
use crate::schema::CompatibilityMode;

/// Configuration bundle for [`RegistrySerde`](crate::serdes::RegistrySerde)
/// and the layers underneath it.
#[derive(Debug, Clone)]
pub struct SerdeConfig {
    /// Registry scope for all operations.
    pub registry_name: String,
    /// Allow creating/registering schemas the registry does not know yet.
    pub schema_auto_registration: bool,
    /// Producer-side compression selection.
    pub compression: CompressionKind,
    /// Compatibility applied when creating a new schema name and the schema
    /// itself declares no mode.
    pub compatibility_mode: CompatibilityMode,
    /// Key/value metadata attached to auto-registered versions.
    pub metadata: HashMap<String, String>,
    /// Delay between checks on a pending schema version.
    pub wait_interval: Duration,
    /// Maximum number of checks on a pending schema version.
    pub max_wait_attempts: u32,
    /// Optional per-RPC deadline; expiry surfaces as a timeout error.
    pub request_timeout: Option<Duration>,
}

impl SerdeConfig {
    pub fn new(registry_name: impl Into<String>) -> Self {
        Self {
            registry_name: registry_name.into(),
            schema_auto_registration: true,
            compression: CompressionKind::None,
            compatibility_mode: CompatibilityMode::Backward,
            metadata: HashMap::new(),
            wait_interval: Duration::from_millis(100),
            max_wait_attempts: 30,
            request_timeout: None,
        }
    }

    pub fn with_auto_registration(mut self, enabled: bool) -> Self {
        self.schema_auto_registration = enabled;
        self
    }

    pub fn with_compression(mut self, compression: CompressionKind) -> Self {
        self.compression = compression;
        self
    }

    pub fn with_compatibility_mode(mut self, mode: CompatibilityMode) -> Self {
        self.compatibility_mode = mode;
        self
    }

    pub fn with_metadata_entry(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn with_polling(mut self, max_wait_attempts: u32, wait_interval: Duration) -> Self {
        self.max_wait_attempts = max_wait_attempts;
        self.wait_interval = wait_interval;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }
}
