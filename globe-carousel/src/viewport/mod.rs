//! Viewport boundary and the binding that adapts it to the controller.

mod binding;
mod driver;

pub use binding::{InteractionCallback, ViewportBinding, POINTER_JITTER_THRESHOLD_PX, ZOOM_DELAY};
pub use driver::{
    DriverError, InteractionEvent, InteractionHandler, InteractionKind, InteractionTarget,
    ListenerId, ViewportDriver,
};

#[cfg(test)]
pub(crate) use binding::tests::{FakeDriver, FakeElement};
