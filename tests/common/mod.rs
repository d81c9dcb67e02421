//! Shared test fixtures: a scriptable in-memory registry API.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use schema_registry_serde::schema::{
    CompatibilityMode, DataFormat, SchemaVersion, SchemaVersionId, SchemaVersionStatus,
};
use schema_registry_serde::{RegistryApi, SchemaError, SchemaResult};

pub const USER_SCHEMA: &str = r#"{
    "type": "record",
    "name": "User",
    "fields": [
        {"name": "name", "type": "string"},
        {"name": "favorite_number", "type": "int"}
    ]
}"#;

/// Avro binary encoding of `{name: "Jane", favorite_number: 7}` under
/// `USER_SCHEMA`: length-prefixed string, then zigzag int.
pub const JANE_AVRO: &[u8] = &[0x08, b'J', b'a', b'n', b'e', 0x0e];

pub fn jane() -> schema_registry_serde::Datum {
    use apache_avro::types::Value;
    schema_registry_serde::Datum::Avro(Value::Record(vec![
        ("name".to_string(), Value::String("Jane".to_string())),
        ("favorite_number".to_string(), Value::Int(7)),
    ]))
}

pub fn version_id(n: u64) -> SchemaVersionId {
    let mut bytes = [0u8; 16];
    bytes[8..].copy_from_slice(&n.to_be_bytes());
    SchemaVersionId::from_bytes(bytes)
}

/// In-memory registry double with per-operation call counters and scriptable
/// failures.
pub struct MockRegistryApi {
    versions_by_id: Mutex<HashMap<SchemaVersionId, SchemaVersion>>,
    versions_by_definition: Mutex<HashMap<(String, String), SchemaVersionId>>,
    schema_names: Mutex<HashSet<String>>,
    id_counter: AtomicU64,

    pub get_by_definition_calls: AtomicUsize,
    pub get_by_id_calls: AtomicUsize,
    pub create_calls: AtomicUsize,
    pub register_calls: AtomicUsize,
    pub metadata_calls: AtomicUsize,

    /// Metadata pairs attached via `put_schema_version_metadata`.
    pub attached_metadata: Mutex<Vec<(SchemaVersionId, String, String)>>,

    /// Errors popped by successive `register_schema_version` calls before
    /// default behavior applies.
    register_errors: Mutex<VecDeque<SchemaError>>,
    /// Error every `create_schema` call returns, if set.
    create_error: Mutex<Option<SchemaError>>,
    /// Fail `put_schema_version_metadata` with a transport error.
    fail_metadata: AtomicBool,
    /// Number of `PENDING` responses `get_schema_version_by_id` serves
    /// before falling through to `poll_status`.
    pending_polls: AtomicUsize,
    /// Status served once `pending_polls` is exhausted.
    poll_status: Mutex<SchemaVersionStatus>,
    /// Status stamped on versions returned by create/register.
    initial_status: Mutex<SchemaVersionStatus>,
    /// Artificial latency on definition lookups and registrations.
    call_delay: Mutex<Option<Duration>>,
}

impl MockRegistryApi {
    pub fn new() -> Self {
        Self {
            versions_by_id: Mutex::new(HashMap::new()),
            versions_by_definition: Mutex::new(HashMap::new()),
            schema_names: Mutex::new(HashSet::new()),
            id_counter: AtomicU64::new(1),
            get_by_definition_calls: AtomicUsize::new(0),
            get_by_id_calls: AtomicUsize::new(0),
            create_calls: AtomicUsize::new(0),
            register_calls: AtomicUsize::new(0),
            metadata_calls: AtomicUsize::new(0),
            attached_metadata: Mutex::new(Vec::new()),
            register_errors: Mutex::new(VecDeque::new()),
            create_error: Mutex::new(None),
            fail_metadata: AtomicBool::new(false),
            pending_polls: AtomicUsize::new(0),
            poll_status: Mutex::new(SchemaVersionStatus::Available),
            initial_status: Mutex::new(SchemaVersionStatus::Available),
            call_delay: Mutex::new(None),
        }
    }

    /// Insert an available version, as if it had been registered earlier.
    pub fn seed(&self, schema_name: &str, definition: &str, data_format: DataFormat) -> SchemaVersionId {
        let id = self.next_id();
        self.insert(schema_name, definition, data_format, id);
        id
    }

    pub fn seed_schema_name(&self, schema_name: &str) {
        self.schema_names.lock().unwrap().insert(schema_name.to_string());
    }

    pub fn script_register_error(&self, error: SchemaError) {
        self.register_errors.lock().unwrap().push_back(error);
    }

    pub fn script_create_error(&self, error: SchemaError) {
        *self.create_error.lock().unwrap() = Some(error);
    }

    pub fn fail_metadata(&self) {
        self.fail_metadata.store(true, Ordering::SeqCst);
    }

    /// Serve `polls` PENDING responses, then `status`; new versions come
    /// back PENDING.
    pub fn script_pending(&self, polls: usize, status: SchemaVersionStatus) {
        self.pending_polls.store(polls, Ordering::SeqCst);
        *self.poll_status.lock().unwrap() = status;
        *self.initial_status.lock().unwrap() = SchemaVersionStatus::Pending;
    }

    pub fn set_call_delay(&self, delay: Duration) {
        *self.call_delay.lock().unwrap() = Some(delay);
    }

    pub fn version_id_for(&self, schema_name: &str, definition: &str) -> Option<SchemaVersionId> {
        self.versions_by_definition
            .lock()
            .unwrap()
            .get(&(schema_name.to_string(), definition.to_string()))
            .copied()
    }

    fn next_id(&self) -> SchemaVersionId {
        version_id(self.id_counter.fetch_add(1, Ordering::SeqCst))
    }

    fn insert(
        &self,
        schema_name: &str,
        definition: &str,
        data_format: DataFormat,
        id: SchemaVersionId,
    ) {
        let version = SchemaVersion {
            schema_name: schema_name.to_string(),
            version_id: id,
            definition: definition.to_string(),
            data_format,
            compatibility: None,
            status: SchemaVersionStatus::Available,
            version_number: Some(1),
        };
        self.versions_by_id.lock().unwrap().insert(id, version);
        self.versions_by_definition
            .lock()
            .unwrap()
            .insert((schema_name.to_string(), definition.to_string()), id);
        self.schema_names.lock().unwrap().insert(schema_name.to_string());
    }

    async fn maybe_delay(&self) {
        let delay = *self.call_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }

    fn initial_status(&self) -> SchemaVersionStatus {
        *self.initial_status.lock().unwrap()
    }
}

#[async_trait]
impl RegistryApi for MockRegistryApi {
    async fn get_schema_version_by_definition(
        &self,
        _registry_name: &str,
        schema_name: &str,
        definition: &str,
        _data_format: DataFormat,
    ) -> SchemaResult<SchemaVersion> {
        self.get_by_definition_calls.fetch_add(1, Ordering::SeqCst);
        self.maybe_delay().await;
        let id = self
            .versions_by_definition
            .lock()
            .unwrap()
            .get(&(schema_name.to_string(), definition.to_string()))
            .copied();
        match id {
            Some(id) => Ok(self.versions_by_id.lock().unwrap()[&id].clone()),
            None => Err(SchemaError::SchemaNotFound {
                name: schema_name.to_string(),
            }),
        }
    }

    async fn get_schema_version_by_id(
        &self,
        version_id: SchemaVersionId,
    ) -> SchemaResult<SchemaVersion> {
        self.get_by_id_calls.fetch_add(1, Ordering::SeqCst);
        let version = self
            .versions_by_id
            .lock()
            .unwrap()
            .get(&version_id)
            .cloned()
            .ok_or(SchemaError::SchemaNotFound {
                name: version_id.to_string(),
            })?;

        if self
            .pending_polls
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Ok(SchemaVersion {
                status: SchemaVersionStatus::Pending,
                ..version
            });
        }
        Ok(SchemaVersion {
            status: *self.poll_status.lock().unwrap(),
            ..version
        })
    }

    async fn create_schema(
        &self,
        _registry_name: &str,
        schema_name: &str,
        definition: &str,
        data_format: DataFormat,
        _compatibility: CompatibilityMode,
    ) -> SchemaResult<SchemaVersion> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        self.maybe_delay().await;
        if let Some(error) = self.create_error.lock().unwrap().clone() {
            return Err(error);
        }
        if self.schema_names.lock().unwrap().contains(schema_name) {
            return Err(SchemaError::AlreadyExists {
                name: schema_name.to_string(),
            });
        }
        let id = self.next_id();
        self.insert(schema_name, definition, data_format, id);
        let mut version = self.versions_by_id.lock().unwrap()[&id].clone();
        version.status = self.initial_status();
        Ok(version)
    }

    async fn register_schema_version(
        &self,
        _registry_name: &str,
        schema_name: &str,
        definition: &str,
    ) -> SchemaResult<SchemaVersion> {
        self.register_calls.fetch_add(1, Ordering::SeqCst);
        self.maybe_delay().await;
        if let Some(error) = self.register_errors.lock().unwrap().pop_front() {
            return Err(error);
        }
        if !self.schema_names.lock().unwrap().contains(schema_name) {
            return Err(SchemaError::SchemaNotFound {
                name: schema_name.to_string(),
            });
        }
        let id = self.next_id();
        self.insert(schema_name, definition, DataFormat::Avro, id);
        let mut version = self.versions_by_id.lock().unwrap()[&id].clone();
        version.status = self.initial_status();
        Ok(version)
    }

    async fn put_schema_version_metadata(
        &self,
        version_id: SchemaVersionId,
        key: &str,
        value: &str,
    ) -> SchemaResult<()> {
        self.metadata_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_metadata.load(Ordering::SeqCst) {
            return Err(SchemaError::Transport {
                message: "metadata endpoint unavailable".to_string(),
            });
        }
        self.attached_metadata.lock().unwrap().push((
            version_id,
            key.to_string(),
            value.to_string(),
        ));
        Ok(())
    }
}
