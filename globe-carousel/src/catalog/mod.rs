//! Location catalog and selection.
//!
//! The catalog is a static, validated set of viewing targets. The selector
//! layers anti-repetition state on top of it for the cycling controller.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use globe_carousel::catalog::{Catalog, NoRepeatSelector};
//!
//! let catalog = Arc::new(Catalog::builtin().clone());
//! assert!(catalog.validate_dataset().is_valid);
//!
//! let mut selector = NoRepeatSelector::new(catalog, 5);
//! let first = selector.select_no_repeat().unwrap();
//! let second = selector.select_no_repeat().unwrap();
//! assert_ne!(first.code, second.code);
//! ```

mod dataset;
mod location;
mod region;
mod selector;

pub use dataset::{
    Catalog, CatalogError, DatasetIssue, DatasetReport, MIN_RECOMMENDED_ENTRIES,
};
pub use location::{validate, LatLng, Location, MAX_LAT, MAX_LNG, MAX_ZOOM, MIN_LAT, MIN_LNG, MIN_ZOOM};
pub use region::{Region, UnknownRegion};
pub use selector::{NoRepeatSelector, SelectionError, DEFAULT_RECENT_BOUND};
