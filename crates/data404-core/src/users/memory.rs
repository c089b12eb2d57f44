use std::collections::BTreeMap;
use std::sync::RwLock;

use crate::error::CoreError;

use super::backend::UserBackend;
use super::types::UserRecord;

/// Process-local backend. Nothing is persisted.
#[derive(Default)]
pub struct MemoryBackend {
    users: RwLock<BTreeMap<String, UserRecord>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UserBackend for MemoryBackend {
    fn get(&self, username: &str) -> Result<Option<UserRecord>, CoreError> {
        let users = self.users.read().map_err(|_| CoreError::LockPoisoned)?;
        Ok(users.get(username).cloned())
    }

    fn put(&self, record: UserRecord) -> Result<(), CoreError> {
        let mut users = self.users.write().map_err(|_| CoreError::LockPoisoned)?;
        users.insert(record.username.clone(), record);
        Ok(())
    }

    fn scan(&self) -> Result<Vec<UserRecord>, CoreError> {
        let users = self.users.read().map_err(|_| CoreError::LockPoisoned)?;
        Ok(users.values().cloned().collect())
    }
}
