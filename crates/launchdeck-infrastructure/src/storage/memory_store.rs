//! In-memory key-value store.

use std::collections::HashMap;
use std::sync::RwLock;

use launchdeck_core::LaunchdeckError;
use launchdeck_core::error::Result;
use launchdeck_core::favorites::KeyValueStore;

/// Non-durable store for tests and for environments without usable storage.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let values = self
            .values
            .read()
            .map_err(|e| LaunchdeckError::internal(format!("Memory store poisoned: {}", e)))?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self
            .values
            .write()
            .map_err(|e| LaunchdeckError::internal(format!("Memory store poisoned: {}", e)))?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut values = self
            .values
            .write()
            .map_err(|e| LaunchdeckError::internal(format!("Memory store poisoned: {}", e)))?;
        values.remove(key);
        Ok(())
    }
}
