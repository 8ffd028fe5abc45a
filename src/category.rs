//! Fixed set of configuration categories
//!
//! Each category persists to its own file under the configuration root:
//! - Setting (settings.cfg) - behavioral settings
//! - Theme (theme.cfg) - visual customization
//!
//! The set is closed; no categories are added or removed at runtime.
//! `ALL` fixes the iteration order used by load/save sweeps.

use serde::{Deserialize, Serialize};

/// A partition of the configuration namespace, bound to one backing file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    /// Behavioral settings (settings.cfg)
    Setting,
    /// Visual customization (theme.cfg)
    Theme,
}

/// All categories in deterministic registry order
pub const ALL_CATEGORIES: &[Category] = &[Category::Setting, Category::Theme];

impl Category {
    /// Relative file name for this category's backing file
    pub fn path(&self) -> &'static str {
        match self {
            Self::Setting => "settings.cfg",
            Self::Theme => "theme.cfg",
        }
    }

    /// Short identifier for display and error messages
    pub fn name(&self) -> &'static str {
        match self {
            Self::Setting => "setting",
            Self::Theme => "theme",
        }
    }

    /// Position in registry order
    pub(crate) fn index(&self) -> usize {
        *self as usize
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
