//! Application Ports (Driven)
//!
//! Interfaces the importer uses to reach the security registry, the board
//! registry and message storage. Calls are synchronous; adapters serialize
//! their own writes.

mod security_registry_port;
mod storage_port;

pub use security_registry_port::{BoardProviderPort, RegistryError, SecurityRegistryPort};
pub use storage_port::{MessageSink, StorageError, StoragePort};
