//! Globe Carousel - autonomous country cycling for an embedded map viewer
//!
//! The viewer loads a third-party map SDK, then pans and zooms the map
//! through a catalog of countries until the user takes over. Interaction
//! pauses cycling; after an idle timeout it resumes on its own.
//!
//! # Modules
//!
//! - [`catalog`]: country dataset, validation, non-repeating selection
//! - [`loader`]: idempotent SDK loading with categorized errors and retry
//! - [`cycling`]: the cycling state machine and its timers
//! - [`viewport`]: the driver boundary and the binding to the controller
//! - [`viewer`]: bootstrap tying the pieces together
//! - [`config`], [`logging`]: ambient setup

pub mod catalog;
pub mod config;
pub mod cycling;
pub mod loader;
pub mod logging;
pub mod viewer;
pub mod viewport;

pub use viewer::{MapViewer, ViewerError, ViewportFactory};

/// Crate version, as reported in logs.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
