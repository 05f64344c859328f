//! Flat JSON settings file: tracking id, hostname, consent.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::collect::DEFAULT_HOSTNAME;
use crate::error::{AnalyticsError, Result};

const SETTINGS_DIR: &str = ".galog";
const SETTINGS_FILE: &str = "settings.json";

/// Persisted user configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub tracking_id: String,
    #[serde(default = "default_hostname")]
    pub hostname: String,
    #[serde(default)]
    pub consent: bool,
}

fn default_hostname() -> String {
    DEFAULT_HOSTNAME.to_string()
}

impl Settings {
    pub fn new(tracking_id: impl Into<String>) -> Self {
        Self {
            tracking_id: tracking_id.into(),
            hostname: default_hostname(),
            consent: false,
        }
    }

    /// All fields as a key-value map suitable for [`save`].
    pub fn to_partial(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("tracking_id".into(), Value::from(self.tracking_id.clone()));
        map.insert("hostname".into(), Value::from(self.hostname.clone()));
        map.insert("consent".into(), Value::from(self.consent));
        map
    }
}

/// `<home>/.galog/settings.json`, or `None` if the home directory cannot
/// be determined.
pub fn default_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(SETTINGS_DIR).join(SETTINGS_FILE))
}

/// Read settings from `path`.
pub fn load(path: &Path) -> Result<Settings> {
    let raw = fs::read_to_string(path).map_err(|e| io_error(path, e))?;
    serde_json::from_str(&raw).map_err(|source| AnalyticsError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Merge `partial` onto whatever is stored at `path` and write the result
/// back. Keys in `partial` win.
pub fn save(path: &Path, partial: &Map<String, Value>) -> Result<()> {
    let mut merged = match read_object(path) {
        Ok(existing) => existing,
        Err(AnalyticsError::NotFound { .. }) => Map::new(),
        Err(e) => return Err(e),
    };
    for (key, value) in partial {
        merged.insert(key.clone(), value.clone());
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
    }

    let data = serde_json::to_string_pretty(&Value::Object(merged)).map_err(|source| {
        AnalyticsError::Json {
            path: path.to_path_buf(),
            source,
        }
    })?;
    fs::write(path, data).map_err(|e| io_error(path, e))?;
    log::info!("[galog] Saved settings to {}", path.display());
    Ok(())
}

/// Remove the settings file. Returns `false` (and logs) if there was none.
pub fn delete(path: &Path) -> Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => {
            log::info!("[galog] Deleted settings file {}", path.display());
            Ok(true)
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            log::warn!("[galog] No settings file to delete at {}", path.display());
            Ok(false)
        }
        Err(e) => Err(io_error(path, e)),
    }
}

fn read_object(path: &Path) -> Result<Map<String, Value>> {
    let raw = fs::read_to_string(path).map_err(|e| io_error(path, e))?;
    match serde_json::from_str(&raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Ok(Map::new()),
        Err(source) => Err(AnalyticsError::Json {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn io_error(path: &Path, source: std::io::Error) -> AnalyticsError {
    if source.kind() == ErrorKind::NotFound {
        AnalyticsError::NotFound {
            path: path.to_path_buf(),
        }
    } else {
        AnalyticsError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn default_path_is_under_home() {
        if let Some(path) = default_path() {
            assert!(path.ends_with(".galog/settings.json"));
        }
    }

    #[test]
    fn missing_fields_take_defaults() {
        let settings: Settings = serde_json::from_value(json!({"tracking_id": "UA-1-1"})).unwrap();
        assert_eq!(settings, Settings::new("UA-1-1"));
        assert_eq!(settings.hostname, "Google.com");
        assert!(!settings.consent);
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let settings: Settings =
            serde_json::from_value(json!({"tracking_id": "UA-1-1", "extra": [1, 2]})).unwrap();
        assert_eq!(settings.tracking_id, "UA-1-1");
    }

    #[test]
    fn to_partial_has_all_keys() {
        let map = Settings::new("UA-1-1").to_partial();
        assert_eq!(map.len(), 3);
        assert_eq!(map["consent"], json!(false));
    }

    #[test]
    fn load_missing_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, AnalyticsError::NotFound { .. }));
    }

    #[test]
    fn save_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        save(&path, &Settings::new("UA-1-1").to_partial()).unwrap();
        assert_eq!(load(&path).unwrap().tracking_id, "UA-1-1");
    }
}
