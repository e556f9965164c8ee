//! Local key-value persistence.
//!
//! Values are JSON. The quota manager and the result store each keep their
//! own store so a corrupt file only affects one of them.

mod file;

use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

pub use file::FilePreferences;

/// Why a value could not be persisted.
#[derive(Debug)]
pub enum PersistenceError {
    Io { path: PathBuf, source: io::Error },
    Serialize(serde_json::Error),
}

impl std::fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PersistenceError::Io { path, source } => {
                write!(f, "failed to write {}: {}", path.display(), source)
            }
            PersistenceError::Serialize(e) => write!(f, "failed to serialize value: {}", e),
        }
    }
}

impl std::error::Error for PersistenceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PersistenceError::Io { source, .. } => Some(source),
            PersistenceError::Serialize(e) => Some(e),
        }
    }
}

impl From<serde_json::Error> for PersistenceError {
    fn from(err: serde_json::Error) -> Self {
        PersistenceError::Serialize(err)
    }
}

pub trait PreferenceStore: Send {
    fn get_value(&self, key: &str) -> Option<Value>;
    fn set_value(&mut self, key: &str, value: Value) -> Result<(), PersistenceError>;
}

impl dyn PreferenceStore {
    /// Typed read. A value that no longer decodes is treated as absent.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.get_value(key)?;
        match serde_json::from_value(value) {
            Ok(v) => Some(v),
            Err(e) => {
                warn!(target: "storage", %key, error = %e, "Stored value has unexpected shape");
                None
            }
        }
    }

    pub fn set<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<(), PersistenceError> {
        let value = serde_json::to_value(value)?;
        self.set_value(key, value)
    }
}

/// In-process store. Clones share the same map, which lets a test reopen a
/// service over the same state.
#[derive(Debug, Clone, Default)]
pub struct MemoryPreferences {
    values: Arc<Mutex<HashMap<String, Value>>>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPreferences {
    fn get_value(&self, key: &str) -> Option<Value> {
        let values = self.values.lock().ok()?;
        values.get(key).cloned()
    }

    fn set_value(&mut self, key: &str, value: Value) -> Result<(), PersistenceError> {
        if let Ok(mut values) = self.values.lock() {
            values.insert(key.to_string(), value);
        }
        Ok(())
    }
}
