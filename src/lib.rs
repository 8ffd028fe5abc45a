//! splitcfg - a categorized configuration store
//!
//! Properties live in a single logical namespace but are partitioned into a
//! fixed set of categories, each persisting to its own file under a common
//! root directory. See [`SplitConfig`] for the entry point.

pub mod category;
pub mod error;
pub mod split;
pub mod store;
pub mod value;

pub use category::{Category, ALL_CATEGORIES};
pub use error::{Result, SplitCfgError};
pub use split::{CategoryFailure, SplitConfig};
pub use store::PropertyStore;
pub use value::{Value, ValueKind};
