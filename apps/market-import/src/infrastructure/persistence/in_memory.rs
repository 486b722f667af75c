//! In-memory registries and storage.
//!
//! Suitable for testing and development. Not for production use.

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use crate::application::ports::{
    BoardProviderPort, MessageSink, RegistryError, SecurityRegistryPort, StorageError, StoragePort,
};
use crate::domain::messages::{BoardRecord, Message, SecurityIdMapping, SecurityRecord};
use crate::domain::shared::SecurityId;

/// In-memory implementation of `SecurityRegistryPort`.
#[derive(Debug, Default)]
pub struct InMemorySecurityRegistry {
    securities: RwLock<BTreeMap<String, SecurityRecord>>,
    mappings: RwLock<Vec<SecurityIdMapping>>,
}

impl InMemorySecurityRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with `securities` (for test setup).
    #[must_use]
    pub fn with_securities(securities: impl IntoIterator<Item = SecurityRecord>) -> Self {
        let registry = Self::new();
        {
            let mut stored = registry
                .securities
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            for security in securities {
                stored.insert(security.security_id.lookup_key(), security);
            }
        }
        registry
    }

    /// Number of stored securities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.securities
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Registry holds no securities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stored securities ordered by lookup key.
    #[must_use]
    pub fn securities(&self) -> Vec<SecurityRecord> {
        self.securities
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect()
    }

    /// Stored adapter mappings in save order.
    #[must_use]
    pub fn mappings(&self) -> Vec<SecurityIdMapping> {
        self.mappings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl SecurityRegistryPort for InMemorySecurityRegistry {
    fn lookup_by_id(&self, id: &SecurityId) -> Result<Option<SecurityRecord>, RegistryError> {
        let securities = self
            .securities
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        Ok(securities.get(&id.lookup_key()).cloned())
    }

    fn save(&self, security: &SecurityRecord, allow_update: bool) -> Result<(), RegistryError> {
        let key = security.security_id.lookup_key();
        let mut securities = self
            .securities
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if !allow_update && securities.contains_key(&key) {
            return Err(RegistryError::AlreadyExists(key));
        }
        securities.insert(key, security.clone());
        drop(securities);
        Ok(())
    }

    fn save_mapping(&self, mapping: &SecurityIdMapping) -> Result<(), RegistryError> {
        let mut mappings = self
            .mappings
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let key = mapping.adapter_id.lookup_key();
        mappings.retain(|m| !(m.adapter == mapping.adapter && m.adapter_id.lookup_key() == key));
        mappings.push(mapping.clone());
        drop(mappings);
        Ok(())
    }
}

/// In-memory implementation of `BoardProviderPort`; codes are case-insensitive.
#[derive(Debug, Default)]
pub struct InMemoryBoardProvider {
    boards: RwLock<BTreeMap<String, BoardRecord>>,
}

impl InMemoryBoardProvider {
    /// Create an empty provider.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored boards ordered by code.
    #[must_use]
    pub fn boards(&self) -> Vec<BoardRecord> {
        self.boards
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect()
    }
}

impl BoardProviderPort for InMemoryBoardProvider {
    fn get_or_create_board(&self, board: &BoardRecord) -> Result<BoardRecord, RegistryError> {
        let key = board.code.trim().to_uppercase();
        let mut boards = self.boards.write().unwrap_or_else(PoisonError::into_inner);
        let stored = boards.entry(key).or_insert_with(|| board.clone()).clone();
        drop(boards);
        Ok(stored)
    }
}

/// A stored batch: target security (`None` for the default sink) and messages.
pub type StoredBatch = (Option<SecurityId>, Vec<Message>);

/// In-memory implementation of `StoragePort`; records every saved batch.
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    batches: RwLock<Vec<StoredBatch>>,
}

impl InMemoryStorage {
    /// Create empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Batches in save order.
    #[must_use]
    pub fn batches(&self) -> Vec<StoredBatch> {
        self.batches
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// All messages saved for a security, in save order.
    #[must_use]
    pub fn messages_for(&self, security: Option<&SecurityId>) -> Vec<Message> {
        self.batches
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|(id, _)| id.as_ref() == security)
            .flat_map(|(_, messages)| messages.iter().cloned())
            .collect()
    }
}

struct InMemorySink<'a> {
    storage: &'a InMemoryStorage,
    security: Option<SecurityId>,
}

impl MessageSink for InMemorySink<'_> {
    fn save(&mut self, messages: &[Message]) -> Result<(), StorageError> {
        let mut batches = self
            .storage
            .batches
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        batches.push((self.security.clone(), messages.to_vec()));
        drop(batches);
        Ok(())
    }
}

impl StoragePort for InMemoryStorage {
    fn sink(&self, security: Option<&SecurityId>) -> Result<Box<dyn MessageSink + '_>, StorageError> {
        Ok(Box::new(InMemorySink {
            storage: self,
            security: security.cloned(),
        }))
    }
}
