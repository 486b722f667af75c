//! Security Registry Port (Driven Port)
//!
//! Lookup and upsert of security definitions and adapter id mappings.

use crate::domain::messages::{BoardRecord, SecurityIdMapping, SecurityRecord};
use crate::domain::shared::SecurityId;

/// Registry error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// Insert without update permission hit an existing record.
    #[error("registry entry already exists: {0}")]
    AlreadyExists(String),

    /// Backing store failure.
    #[error("registry unavailable: {0}")]
    Unavailable(String),
}

/// Port for the persistent security registry.
///
/// Lookups are case-insensitive on both codes and return the stored
/// (canonical) identifier.
pub trait SecurityRegistryPort: Send + Sync {
    /// Find a security by identifier.
    fn lookup_by_id(&self, id: &SecurityId) -> Result<Option<SecurityRecord>, RegistryError>;

    /// Insert, or replace when `allow_update` is set.
    fn save(&self, security: &SecurityRecord, allow_update: bool) -> Result<(), RegistryError>;

    /// Store an adapter id mapping.
    fn save_mapping(&self, mapping: &SecurityIdMapping) -> Result<(), RegistryError>;
}

/// Port for the board registry.
pub trait BoardProviderPort: Send + Sync {
    /// Existing board with the same code, or `board` after storing it.
    fn get_or_create_board(&self, board: &BoardRecord) -> Result<BoardRecord, RegistryError>;
}
