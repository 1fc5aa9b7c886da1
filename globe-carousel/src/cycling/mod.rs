//! Autonomous viewport cycling.
//!
//! # Example
//!
//! ```ignore
//! use globe_carousel::cycling::{CyclingConfig, CyclingController};
//!
//! let controller = CyclingController::new(config, selector, binding);
//! controller.bind(driver.element());
//!
//! // Surrounding UI can hold cycling indefinitely
//! controller.set_timeout_prevented(true);
//! ```

mod config;
mod controller;
mod state;
mod timer;

pub use config::{
    CyclingConfig, DEFAULT_CYCLE_INTERVAL, DEFAULT_IDLE_TIMEOUT, OVERRIDE_SETTLE_DELAY,
};
pub use controller::CyclingController;
pub use state::{CyclingPhase, CyclingState};
