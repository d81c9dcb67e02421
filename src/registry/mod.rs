//! Registry access: RPC surface, typed client, schema cache
//!
//! Three layers. [`RegistryApi`] is the opaque call surface of the remote
//! registry, implemented by whatever transport hosts it.
//! [`SchemaRegistryClient`] scopes the surface to one named registry and
//! hides the asynchronous creation model behind a bounded polling loop.
//! [`SchemaCoordinator`] is the process-wide cache both halves of the serde
//! pipeline resolve schemas through.

pub mod api;
pub mod client;
pub mod coordinator;

pub use api::RegistryApi;
pub use client::SchemaRegistryClient;
pub use coordinator::SchemaCoordinator;
