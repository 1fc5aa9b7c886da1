//! Viewport driver boundary.
//!
//! The rendered map is an external collaborator. It is consumed through
//! [`ViewportDriver`] (camera control) and [`InteractionTarget`] (the
//! element user input arrives on).

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::catalog::LatLng;

/// Errors raised by a viewport driver call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DriverError {
    /// The map has been torn down.
    #[error("viewport is detached")]
    Detached,

    /// The underlying SDK rejected the call.
    #[error("viewport call failed: {0}")]
    CallFailed(String),
}

/// Camera control over the rendered map.
pub trait ViewportDriver: Send + Sync + 'static {
    /// Animate the map center to `point`.
    fn pan_to(&self, point: LatLng) -> Result<(), DriverError>;

    /// Set the zoom level.
    fn set_zoom(&self, zoom: i32) -> Result<(), DriverError>;

    /// Current zoom level.
    fn zoom(&self) -> Result<i32, DriverError>;

    /// The element user input arrives on, if the map is mounted.
    fn element(&self) -> Option<Arc<dyn InteractionTarget>>;
}

/// Kinds of user input the controller reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InteractionKind {
    PointerDown,
    PointerMove,
    Wheel,
    TouchStart,
    TouchMove,
    KeyDown,
}

impl InteractionKind {
    /// Every kind the binding subscribes to.
    pub const ALL: [InteractionKind; 6] = [
        InteractionKind::PointerDown,
        InteractionKind::PointerMove,
        InteractionKind::Wheel,
        InteractionKind::TouchStart,
        InteractionKind::TouchMove,
        InteractionKind::KeyDown,
    ];

    /// DOM event name.
    pub fn event_name(&self) -> &'static str {
        match self {
            InteractionKind::PointerDown => "pointerdown",
            InteractionKind::PointerMove => "pointermove",
            InteractionKind::Wheel => "wheel",
            InteractionKind::TouchStart => "touchstart",
            InteractionKind::TouchMove => "touchmove",
            InteractionKind::KeyDown => "keydown",
        }
    }
}

impl fmt::Display for InteractionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.event_name())
    }
}

/// A single input event as delivered by the element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InteractionEvent {
    pub kind: InteractionKind,
    /// Pointer movement since the previous event, in device-independent pixels.
    pub movement_x: f64,
    pub movement_y: f64,
}

impl InteractionEvent {
    /// An event without movement.
    pub fn new(kind: InteractionKind) -> Self {
        Self {
            kind,
            movement_x: 0.0,
            movement_y: 0.0,
        }
    }

    /// A pointer-move event with the given deltas.
    pub fn pointer_move(movement_x: f64, movement_y: f64) -> Self {
        Self {
            kind: InteractionKind::PointerMove,
            movement_x,
            movement_y,
        }
    }
}

/// Identifies a registered listener so it can be removed later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// Listener callback. Registered as passive: it never prevents default handling.
pub type InteractionHandler = Arc<dyn Fn(&InteractionEvent) + Send + Sync>;

/// The element user input arrives on.
pub trait InteractionTarget: Send + Sync + 'static {
    fn add_listener(&self, kind: InteractionKind, handler: InteractionHandler) -> ListenerId;

    fn remove_listener(&self, id: ListenerId);
}
