//! Strategies for choosing schema names in the registry
//!
//! The serializer files every schema under a registry schema name; these
//! strategies control how that name is derived from the topic and the schema
//! being written.

use crate::schema::Schema;

/// How the Kafka serializer names schemas in the registry.
#[derive(Clone)]
pub enum NamingStrategy {
    /// `<topic>-key` for keys, `<topic>-value` for values.
    ///
    /// Sensible for topics whose records follow a uniform schema, but does
    /// not allow mixing different schemas on the same topic.
    TopicName,
    /// The record's fully-qualified name.
    ///
    /// Allows a topic to contain records with multiple incompatible schemas,
    /// provided record names uniquely identify a schema across the registry.
    RecordName,
    /// `<topic>-<record fqn>`.
    ///
    /// Additionally allows different topics to use the same record name for
    /// incompatible schemas.
    TopicRecordName,
    /// User-supplied strategy.
    Custom(fn(topic: &str, is_key: bool, schema: &Schema) -> String),
}

impl Default for NamingStrategy {
    fn default() -> Self {
        NamingStrategy::RecordName
    }
}

impl NamingStrategy {
    pub fn resolve(&self, topic: &str, is_key: bool, schema: &Schema) -> String {
        match self {
            NamingStrategy::TopicName => {
                format!("{}-{}", topic, if is_key { "key" } else { "value" })
            }
            NamingStrategy::RecordName => schema.fqn().to_string(),
            NamingStrategy::TopicRecordName => format!("{}-{}", topic, schema.fqn()),
            NamingStrategy::Custom(f) => f(topic, is_key, schema),
        }
    }
}

impl std::fmt::Debug for NamingStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            NamingStrategy::TopicName => "TopicName",
            NamingStrategy::RecordName => "RecordName",
            NamingStrategy::TopicRecordName => "TopicRecordName",
            NamingStrategy::Custom(_) => "Custom",
        };
        write!(f, "NamingStrategy::{}", name)
    }
}
