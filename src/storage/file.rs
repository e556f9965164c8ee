use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::{PersistenceError, PreferenceStore};

/// A JSON object on disk used as a key-value map.
///
/// The file is read once on open and rewritten whole on every write. A
/// missing or unreadable file opens as an empty map.
#[derive(Debug)]
pub struct FilePreferences {
    path: PathBuf,
    values: Map<String, Value>,
}

impl FilePreferences {
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let values = match fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<Map<String, Value>>(&content) {
                Ok(values) => values,
                Err(e) => {
                    warn!(target: "storage", path = %path.display(), error = %e, "Preferences file is corrupt; starting empty");
                    Map::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Map::new(),
            Err(e) => {
                warn!(target: "storage", path = %path.display(), error = %e, "Preferences file unreadable; starting empty");
                Map::new()
            }
        };
        Self { path, values }
    }

    fn flush(&self) -> Result<(), PersistenceError> {
        let io_err = |source| PersistenceError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let content = serde_json::to_string_pretty(&self.values)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, content).map_err(io_err)?;
        fs::rename(&tmp, &self.path).map_err(io_err)?;

        debug!(target: "storage", path = %self.path.display(), "Preferences written");
        Ok(())
    }
}

impl PreferenceStore for FilePreferences {
    fn get_value(&self, key: &str) -> Option<Value> {
        self.values.get(key).cloned()
    }

    fn set_value(&mut self, key: &str, value: Value) -> Result<(), PersistenceError> {
        self.values.insert(key.to_string(), value);
        self.flush()
    }
}
