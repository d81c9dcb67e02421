//! Remote registry RPC surface
//!
//! The registry's transport is out of scope for this crate; it is consumed as
//! an opaque client behind this trait. Implementations wrap whatever RPC
//! stack the hosting service exposes; tests supply scripted doubles.
//!
//! Every operation is idempotent on the server side except
//! [`register_schema_version`](RegistryApi::register_schema_version) and
//! [`create_schema`](RegistryApi::create_schema), whose creation model is
//! asynchronous: a new version may come back `Pending` and must be polled by
//! the caller until it settles.

use async_trait::async_trait;

use crate::error::SchemaResult;
use crate::schema::{CompatibilityMode, DataFormat, SchemaVersion, SchemaVersionId};

/// Typed call surface of the remote registry.
///
/// Expected failure modes map onto [`SchemaError`](crate::SchemaError)
/// variants: lookups that match nothing return `SchemaNotFound`, a create
/// racing an existing schema returns `AlreadyExists`, a rejected evolution
/// returns `Evolution`, and anything else wraps into `Transport`.
#[async_trait]
pub trait RegistryApi: Send + Sync {
    /// Look up the version holding exactly this definition under a schema
    /// name.
    async fn get_schema_version_by_definition(
        &self,
        registry_name: &str,
        schema_name: &str,
        definition: &str,
        data_format: DataFormat,
    ) -> SchemaResult<SchemaVersion>;

    /// Look up a version by its globally unique id.
    async fn get_schema_version_by_id(
        &self,
        version_id: SchemaVersionId,
    ) -> SchemaResult<SchemaVersion>;

    /// Create a new schema name with an initial version.
    async fn create_schema(
        &self,
        registry_name: &str,
        schema_name: &str,
        definition: &str,
        data_format: DataFormat,
        compatibility: CompatibilityMode,
    ) -> SchemaResult<SchemaVersion>;

    /// Register a new version under an existing schema name, subject to the
    /// schema's compatibility checks.
    async fn register_schema_version(
        &self,
        registry_name: &str,
        schema_name: &str,
        definition: &str,
    ) -> SchemaResult<SchemaVersion>;

    /// Attach a key/value metadata pair to a version.
    async fn put_schema_version_metadata(
        &self,
        version_id: SchemaVersionId,
        key: &str,
        value: &str,
    ) -> SchemaResult<()>;
}
