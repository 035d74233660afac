//! Local storage configuration

use std::path::PathBuf;

use serde::Deserialize;

use super::error::ValidationError;

/// Location of the durable preference file backing the entitlement cache
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Path of the JSON preference file
    #[serde(default = "default_path")]
    pub path: PathBuf,
}

fn default_path() -> PathBuf {
    PathBuf::from("entitlement_prefs.json")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
        }
    }
}

impl StorageConfig {
    /// Validate the storage path
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.path.as_os_str().is_empty() {
            return Err(ValidationError::EmptyStoragePath);
        }
        if self.path.file_name().is_none() {
            return Err(ValidationError::StoragePathIsDirectory);
        }
        Ok(())
    }
}
