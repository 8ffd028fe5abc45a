//! Categorized configuration store
//!
//! Presents one logical property namespace over a set of per-category
//! file-backed stores. Callers define a property into a category once, then
//! address it by key alone; lookups route to whichever category owns the key.
//! Key uniqueness is global across categories, enforced here since no single
//! sub-store can see beyond its own file.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{error, info};

use crate::category::{Category, ALL_CATEGORIES};
use crate::error::{Result, SplitCfgError};
use crate::store::PropertyStore;
use crate::value::{Value, ValueKind};

/// A per-category failure collected during a load/save sweep
#[derive(Debug)]
pub struct CategoryFailure {
    pub category: Category,
    pub error: SplitCfgError,
}

/// Configuration store split across one file per category
#[derive(Debug)]
pub struct SplitConfig {
    root: PathBuf,
    stores: Vec<PropertyStore>,
}

impl SplitConfig {
    /// Create a store rooted at the given directory.
    ///
    /// The directory is created if absent. An existing root must be a
    /// read/write accessible directory. One sub-store is bound per category;
    /// nothing is loaded yet.
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        if root.as_os_str().is_empty() {
            return Err(SplitCfgError::InvalidRoot {
                path: root.to_path_buf(),
                reason: "root path is empty".to_string(),
            });
        }

        if root.exists() {
            if !root.is_dir() {
                return Err(SplitCfgError::InvalidRoot {
                    path: root.to_path_buf(),
                    reason: "not a directory".to_string(),
                });
            }
            if let Err(e) = fs::read_dir(root) {
                return Err(SplitCfgError::InvalidRoot {
                    path: root.to_path_buf(),
                    reason: format!("read access denied: {e}"),
                });
            }
            // readonly() reflects the permission bits only, not whether this
            // process can actually write here; a root we cannot even stat is
            // treated as invalid rather than as a plain IO failure.
            let readonly = fs::metadata(root)
                .map_err(|e| SplitCfgError::InvalidRoot {
                    path: root.to_path_buf(),
                    reason: format!("inaccessible: {e}"),
                })?
                .permissions()
                .readonly();
            if readonly {
                return Err(SplitCfgError::InvalidRoot {
                    path: root.to_path_buf(),
                    reason: "write access denied".to_string(),
                });
            }
        } else {
            fs::create_dir_all(root).map_err(|e| SplitCfgError::DirectoryCreate {
                path: root.to_path_buf(),
                source: e,
            })?;
        }

        let stores = ALL_CATEGORIES
            .iter()
            .map(|category| PropertyStore::new(root.join(category.path())))
            .collect();

        Ok(Self {
            root: root.to_path_buf(),
            stores,
        })
    }

    /// Root directory holding the category files
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Define a property in the given category.
    ///
    /// The key must be unique across the whole store, not just within the
    /// target category; a key already defined elsewhere is rejected. The
    /// default value must fit the declared kind.
    pub fn define(
        &mut self,
        category: Category,
        kind: ValueKind,
        key: &str,
        default: Value,
    ) -> Result<()> {
        if let Some(owner) = self.owner_elsewhere(category, key) {
            return Err(SplitCfgError::DuplicateKey {
                key: key.to_string(),
                category: owner.to_string(),
            });
        }
        self.store_mut(category).define(key, kind, default)
    }

    /// Remove a property from whichever category owns it.
    ///
    /// Unknown keys are a no-op.
    pub fn undefine(&mut self, key: &str) {
        for store in &mut self.stores {
            if store.has(key) {
                store.undefine(key);
            }
        }
    }

    /// True if any category defines the key
    pub fn has(&self, key: &str) -> bool {
        self.stores.iter().any(|store| store.has(key))
    }

    /// Current value of the property, wherever it is defined
    pub fn get(&self, key: &str) -> Result<&Value> {
        self.stores
            .iter()
            .find(|store| store.has(key))
            .map(|store| store.get(key))
            .unwrap_or_else(|| {
                Err(SplitCfgError::KeyNotFound {
                    key: key.to_string(),
                })
            })
    }

    /// Assign a value to the property, wherever it is defined.
    ///
    /// Marks the owning category unsaved. `Value::Null` is accepted when the
    /// property's kind allows an absent value (all kinds do).
    pub fn set(&mut self, key: &str, value: Value) -> Result<()> {
        for store in &mut self.stores {
            if store.has(key) {
                return store.set(key, value);
            }
        }
        Err(SplitCfgError::KeyNotFound {
            key: key.to_string(),
        })
    }

    /// Load every category file, in registry order.
    ///
    /// Call after all properties are defined; keys on disk that were never
    /// defined are discarded. A failure in one category is logged, collected
    /// and does not stop the remaining categories from loading. An empty
    /// return means every category loaded.
    pub fn load(&mut self) -> Vec<CategoryFailure> {
        let mut failures = Vec::new();
        for category in ALL_CATEGORIES {
            let store = self.store_mut(*category);
            info!("parsing {}", store.path().display());
            if let Err(e) = store.load() {
                error!("failed to load {}: {e}", category.path());
                failures.push(CategoryFailure {
                    category: *category,
                    error: e,
                });
            }
        }
        failures
    }

    /// Save every category file, in registry order.
    ///
    /// A failure in one category is logged and collected without stopping the
    /// sweep; that category keeps its unsaved status.
    pub fn save(&mut self) -> Vec<CategoryFailure> {
        let mut failures = Vec::new();
        for category in ALL_CATEGORIES {
            let store = self.store_mut(*category);
            info!("writing {}", store.path().display());
            if let Err(e) = store.save() {
                error!("failed to save {}: {e}", category.path());
                failures.push(CategoryFailure {
                    category: *category,
                    error: e,
                });
            }
        }
        failures
    }

    /// Categories with in-memory changes not yet saved, in registry order
    pub fn unsaved_categories(&self) -> Vec<Category> {
        ALL_CATEGORIES
            .iter()
            .copied()
            .filter(|category| self.store(*category).has_unsaved_changes())
            .collect()
    }

    fn store(&self, category: Category) -> &PropertyStore {
        &self.stores[category.index()]
    }

    fn store_mut(&mut self, category: Category) -> &mut PropertyStore {
        &mut self.stores[category.index()]
    }

    /// Category other than `category` that already defines `key`, if any.
    ///
    /// This scan is what makes keys unique store-wide: each sub-store only
    /// knows its own keys, so duplication is detectable only here.
    fn owner_elsewhere(&self, category: Category, key: &str) -> Option<Category> {
        ALL_CATEGORIES
            .iter()
            .copied()
            .filter(|c| *c != category)
            .find(|c| self.store(*c).has(key))
    }
}
