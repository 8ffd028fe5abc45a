//! Single-file property store
//!
//! One instance backs each category. Holds typed, defaulted properties and a
//! dirty bit tracking in-memory changes since the last load/save. The on-disk
//! format is line-oriented `key=value`; blank lines and `#` comments are
//! skipped. Keys found on disk that were never defined are discarded on load.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, SplitCfgError};
use crate::value::{Value, ValueKind};

#[derive(Debug, Clone)]
struct Property {
    kind: ValueKind,
    default: Value,
    value: Value,
}

/// File-backed key/value store for a single category
#[derive(Debug)]
pub struct PropertyStore {
    path: PathBuf,
    properties: BTreeMap<String, Property>,
    dirty: bool,
}

impl PropertyStore {
    /// Create an empty store bound to the given file path.
    ///
    /// The file is not touched; `load` reads it, `save` writes it.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            properties: BTreeMap::new(),
            dirty: false,
        }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Define a property with its kind and default value.
    ///
    /// The current value starts at the default. Redefining an existing key
    /// replaces its definition. Definitions are schema, not data, so this
    /// does not mark the store dirty.
    pub fn define(&mut self, key: &str, kind: ValueKind, default: Value) -> Result<()> {
        validate_key(key)?;
        validate_value(key, &default)?;
        if !default.fits(kind) {
            return Err(SplitCfgError::TypeMismatch {
                key: key.to_string(),
                expected: kind.to_string(),
                actual: describe(&default),
            });
        }
        self.properties.insert(
            key.to_string(),
            Property {
                kind,
                value: default.clone(),
                default,
            },
        );
        Ok(())
    }

    /// Remove a property; marks the store dirty only if the key existed
    pub fn undefine(&mut self, key: &str) {
        if self.properties.remove(key).is_some() {
            self.dirty = true;
        }
    }

    pub fn has(&self, key: &str) -> bool {
        self.properties.contains_key(key)
    }

    /// Current value of a defined property
    pub fn get(&self, key: &str) -> Result<&Value> {
        self.properties
            .get(key)
            .map(|p| &p.value)
            .ok_or_else(|| SplitCfgError::KeyNotFound {
                key: key.to_string(),
            })
    }

    /// Assign a new value to a defined property and mark the store dirty.
    ///
    /// `Value::Null` is accepted for any kind.
    pub fn set(&mut self, key: &str, value: Value) -> Result<()> {
        let property = self
            .properties
            .get_mut(key)
            .ok_or_else(|| SplitCfgError::KeyNotFound {
                key: key.to_string(),
            })?;
        validate_value(key, &value)?;
        if !value.fits(property.kind) {
            return Err(SplitCfgError::TypeMismatch {
                key: key.to_string(),
                expected: property.kind.to_string(),
                actual: describe(&value),
            });
        }
        property.value = value;
        self.dirty = true;
        Ok(())
    }

    /// Whether in-memory values differ from the last load/save
    pub fn has_unsaved_changes(&self) -> bool {
        self.dirty
    }

    /// Load values from the backing file.
    ///
    /// A missing file is not an error: every property reverts to its default.
    /// A malformed line or an unparseable value fails the whole load and the
    /// in-memory state is left untouched. On success the dirty bit is cleared.
    pub fn load(&mut self) -> Result<()> {
        let mut loaded: Vec<(String, Value)> = Vec::new();

        if self.path.exists() {
            let content = fs::read_to_string(&self.path)?;
            for (number, line) in content.lines().enumerate() {
                let line = line.trim();
                if line.is_empty() || line.starts_with('#') {
                    continue;
                }
                let (key, text) = line.split_once('=').ok_or_else(|| SplitCfgError::Parse {
                    path: self.path.clone(),
                    line: number + 1,
                    message: format!("expected 'key=value', got '{line}'"),
                })?;
                let key = key.trim();
                // Undefined keys are discarded; callers define before loading.
                let Some(property) = self.properties.get(key) else {
                    continue;
                };
                let value =
                    property
                        .kind
                        .parse(key, text.trim())
                        .map_err(|e| SplitCfgError::Parse {
                            path: self.path.clone(),
                            line: number + 1,
                            message: e.to_string(),
                        })?;
                loaded.push((key.to_string(), value));
            }
        }

        for property in self.properties.values_mut() {
            property.value = property.default.clone();
        }
        for (key, value) in loaded {
            if let Some(property) = self.properties.get_mut(&key) {
                property.value = value;
            }
        }
        self.dirty = false;
        Ok(())
    }

    /// Write all defined properties to the backing file and clear the dirty
    /// bit. Keys are written in sorted order so files diff cleanly.
    pub fn save(&mut self) -> Result<()> {
        let mut content = String::new();
        for (key, property) in &self.properties {
            content.push_str(key);
            content.push('=');
            content.push_str(&property.value.render());
            content.push('\n');
        }
        fs::write(&self.path, content)?;
        self.dirty = false;
        Ok(())
    }
}

/// Keys become the left side of a `key=value` line, so anything that
/// collides with the format is rejected: `=`, a leading `#`, and control
/// characters (a key with an embedded newline would split into two lines).
fn validate_key(key: &str) -> Result<()> {
    let reason = if key.trim().is_empty() {
        "key is empty"
    } else if key.contains('=') {
        "key may not contain '='"
    } else if key.starts_with('#') {
        "key may not start with '#'"
    } else if key.chars().any(char::is_control) {
        "key may not contain control characters"
    } else {
        return Ok(());
    };
    Err(SplitCfgError::InvalidKey {
        key: key.to_string(),
        reason: reason.to_string(),
    })
}

/// A text value with a line break would be truncated on reload and its tail
/// parsed as sibling `key=value` lines, so it is rejected up front.
fn validate_value(key: &str, value: &Value) -> Result<()> {
    if let Value::Text(text) = value {
        if text.contains(['\n', '\r']) {
            return Err(SplitCfgError::InvalidValue {
                key: key.to_string(),
                reason: "text may not contain line breaks".to_string(),
            });
        }
    }
    Ok(())
}

fn describe(value: &Value) -> String {
    match value.kind() {
        Some(kind) => kind.to_string(),
        None => "null".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(tmp: &TempDir) -> PropertyStore {
        PropertyStore::new(tmp.path().join("test.cfg"))
    }

    #[test]
    fn test_define_starts_at_default() {
        let tmp = TempDir::new().unwrap();
        let mut store = store_in(&tmp);
        store.define("volume", ValueKind::Int, Value::Int(50)).unwrap();

        assert!(store.has("volume"));
        assert_eq!(store.get("volume").unwrap(), &Value::Int(50));
        assert!(!store.has_unsaved_changes());
    }

    #[test]
    fn test_define_rejects_mismatched_default() {
        let tmp = TempDir::new().unwrap();
        let mut store = store_in(&tmp);
        let err = store
            .define("volume", ValueKind::Int, Value::Text("loud".into()))
            .unwrap_err();
        assert!(matches!(err, SplitCfgError::TypeMismatch { .. }));
    }

    #[test]
    fn test_define_rejects_empty_key() {
        let tmp = TempDir::new().unwrap();
        let mut store = store_in(&tmp);
        let err = store.define("  ", ValueKind::Int, Value::Int(0)).unwrap_err();
        assert!(matches!(err, SplitCfgError::InvalidKey { .. }));
    }

    #[test]
    fn test_define_rejects_format_colliding_keys() {
        let tmp = TempDir::new().unwrap();
        let mut store = store_in(&tmp);
        for key in ["a=b", "#volume", "vol\nume", "vol\tume"] {
            let err = store.define(key, ValueKind::Int, Value::Int(0)).unwrap_err();
            assert!(matches!(err, SplitCfgError::InvalidKey { .. }), "{key:?}");
        }
    }

    #[test]
    fn test_define_rejects_default_with_line_breaks() {
        let tmp = TempDir::new().unwrap();
        let mut store = store_in(&tmp);
        let err = store
            .define("motd", ValueKind::Text, Value::Text("hi\nthere".into()))
            .unwrap_err();
        assert!(matches!(err, SplitCfgError::InvalidValue { .. }));
    }

    #[test]
    fn test_set_rejects_text_with_line_breaks() {
        let tmp = TempDir::new().unwrap();
        let mut store = store_in(&tmp);
        store
            .define("fontColor", ValueKind::Text, Value::Text("black".into()))
            .unwrap();

        let err = store
            .set("fontColor", Value::Text("red\nfontSize=99".into()))
            .unwrap_err();
        assert!(matches!(err, SplitCfgError::InvalidValue { .. }));
        // The rejected value must not stick, nor mark the store dirty.
        assert_eq!(store.get("fontColor").unwrap(), &Value::Text("black".into()));
        assert!(!store.has_unsaved_changes());
    }

    #[test]
    fn test_set_marks_dirty_and_checks_kind() {
        let tmp = TempDir::new().unwrap();
        let mut store = store_in(&tmp);
        store.define("volume", ValueKind::Int, Value::Int(50)).unwrap();

        store.set("volume", Value::Int(80)).unwrap();
        assert_eq!(store.get("volume").unwrap(), &Value::Int(80));
        assert!(store.has_unsaved_changes());

        let err = store.set("volume", Value::Bool(true)).unwrap_err();
        assert!(matches!(err, SplitCfgError::TypeMismatch { .. }));
    }

    #[test]
    fn test_set_null_allowed() {
        let tmp = TempDir::new().unwrap();
        let mut store = store_in(&tmp);
        store
            .define("fontColor", ValueKind::Text, Value::Text("black".into()))
            .unwrap();
        store.set("fontColor", Value::Null).unwrap();
        assert!(store.get("fontColor").unwrap().is_null());
    }

    #[test]
    fn test_undefine_only_dirties_on_removal() {
        let tmp = TempDir::new().unwrap();
        let mut store = store_in(&tmp);
        store.define("volume", ValueKind::Int, Value::Int(50)).unwrap();

        store.undefine("unknown");
        assert!(!store.has_unsaved_changes());

        store.undefine("volume");
        assert!(!store.has("volume"));
        assert!(store.has_unsaved_changes());
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let tmp = TempDir::new().unwrap();
        let mut store = store_in(&tmp);
        store.define("volume", ValueKind::Int, Value::Int(50)).unwrap();
        store.set("volume", Value::Int(80)).unwrap();
        store.save().unwrap();
        assert!(!store.has_unsaved_changes());

        let content = fs::read_to_string(store.path()).unwrap();
        assert_eq!(content, "volume=80\n");

        let mut fresh = PropertyStore::new(store.path());
        fresh.define("volume", ValueKind::Int, Value::Int(50)).unwrap();
        fresh.load().unwrap();
        assert_eq!(fresh.get("volume").unwrap(), &Value::Int(80));
    }

    #[test]
    fn test_load_missing_file_reverts_to_defaults() {
        let tmp = TempDir::new().unwrap();
        let mut store = store_in(&tmp);
        store.define("volume", ValueKind::Int, Value::Int(50)).unwrap();
        store.set("volume", Value::Int(80)).unwrap();

        store.load().unwrap();
        assert_eq!(store.get("volume").unwrap(), &Value::Int(50));
        assert!(!store.has_unsaved_changes());
    }

    #[test]
    fn test_load_discards_undefined_keys() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("test.cfg");
        fs::write(&path, "volume=80\nstale=1\n").unwrap();

        let mut store = PropertyStore::new(&path);
        store.define("volume", ValueKind::Int, Value::Int(50)).unwrap();
        store.load().unwrap();

        assert_eq!(store.get("volume").unwrap(), &Value::Int(80));
        assert!(!store.has("stale"));
    }

    #[test]
    fn test_load_skips_comments_and_blanks() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("test.cfg");
        fs::write(&path, "# audio\n\nvolume=80\n").unwrap();

        let mut store = PropertyStore::new(&path);
        store.define("volume", ValueKind::Int, Value::Int(50)).unwrap();
        store.load().unwrap();
        assert_eq!(store.get("volume").unwrap(), &Value::Int(80));
    }

    #[test]
    fn test_load_rejects_malformed_line() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("test.cfg");
        fs::write(&path, "volume 80\n").unwrap();

        let mut store = PropertyStore::new(&path);
        store.define("volume", ValueKind::Int, Value::Int(50)).unwrap();
        let err = store.load().unwrap_err();
        assert!(matches!(err, SplitCfgError::Parse { line: 1, .. }));
    }

    #[test]
    fn test_load_rejects_unparseable_value() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("test.cfg");
        fs::write(&path, "volume=loud\n").unwrap();

        let mut store = PropertyStore::new(&path);
        store.define("volume", ValueKind::Int, Value::Int(50)).unwrap();
        assert!(store.load().is_err());
        // Failed load leaves the previous value in place.
        assert_eq!(store.get("volume").unwrap(), &Value::Int(50));
    }

    #[test]
    fn test_load_empty_value_is_null() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("test.cfg");
        fs::write(&path, "fontColor=\n").unwrap();

        let mut store = PropertyStore::new(&path);
        store
            .define("fontColor", ValueKind::Text, Value::Text("black".into()))
            .unwrap();
        store.load().unwrap();
        assert!(store.get("fontColor").unwrap().is_null());
    }
}
