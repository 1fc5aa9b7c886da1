//! Adapter between the cycling controller and the viewport driver.
//!
//! Outbound: a selected [`Location`] becomes a pan followed, after a short
//! delay, by a zoom. Inbound: raw element events become interaction
//! notifications, with pointer jitter filtered out.
//!
//! Driver failures are absorbed here and logged; a broken frame never
//! reaches the controller.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::driver::{
    InteractionEvent, InteractionHandler, InteractionKind, InteractionTarget, ListenerId,
    ViewportDriver,
};
use crate::catalog::Location;

/// Pointer movement below this (in both axes) is treated as noise.
pub const POINTER_JITTER_THRESHOLD_PX: f64 = 2.0;

/// Delay between the pan and the zoom so the pan animation starts first.
pub const ZOOM_DELAY: Duration = Duration::from_millis(300);

/// Notification sink for qualifying interactions.
pub type InteractionCallback = Arc<dyn Fn(InteractionKind) + Send + Sync>;

struct Registration {
    target: Arc<dyn InteractionTarget>,
    listeners: Vec<ListenerId>,
}

/// Binds one driver to the controller.
pub struct ViewportBinding {
    driver: Arc<dyn ViewportDriver>,
    zoom_delay: Duration,
    registration: Mutex<Option<Registration>>,
    pending_zoom: Mutex<Option<CancellationToken>>,
}

impl std::fmt::Debug for ViewportBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewportBinding")
            .field("zoom_delay", &self.zoom_delay)
            .field("bound", &self.is_bound())
            .finish_non_exhaustive()
    }
}

impl ViewportBinding {
    pub fn new(driver: Arc<dyn ViewportDriver>) -> Self {
        Self::with_zoom_delay(driver, ZOOM_DELAY)
    }

    pub fn with_zoom_delay(driver: Arc<dyn ViewportDriver>, zoom_delay: Duration) -> Self {
        Self {
            driver,
            zoom_delay,
            registration: Mutex::new(None),
            pending_zoom: Mutex::new(None),
        }
    }

    pub fn driver(&self) -> &Arc<dyn ViewportDriver> {
        &self.driver
    }

    /// Returns `true` while listeners are attached.
    pub fn is_bound(&self) -> bool {
        self.registration.lock().is_some()
    }

    /// Replace the listener registration.
    ///
    /// Previously attached listeners are always removed first, even when
    /// `element` is `None`.
    pub fn bind(
        &self,
        element: Option<Arc<dyn InteractionTarget>>,
        on_interaction: InteractionCallback,
    ) {
        self.unbind();

        let Some(target) = element else {
            return;
        };

        let listeners = InteractionKind::ALL
            .iter()
            .map(|kind| {
                let callback = Arc::clone(&on_interaction);
                let handler: InteractionHandler = Arc::new(move |event: &InteractionEvent| {
                    if is_significant(event) {
                        callback(event.kind);
                    }
                });
                target.add_listener(*kind, handler)
            })
            .collect::<Vec<_>>();

        debug!(listeners = listeners.len(), "Viewport listeners attached");
        *self.registration.lock() = Some(Registration { target, listeners });
    }

    /// Remove all attached listeners.
    pub fn unbind(&self) {
        let previous = self.registration.lock().take();
        if let Some(registration) = previous {
            for id in &registration.listeners {
                registration.target.remove_listener(*id);
            }
            debug!(
                listeners = registration.listeners.len(),
                "Viewport listeners removed"
            );
        }
    }

    /// Point the viewport at `location`.
    ///
    /// Pans immediately; if the zoom differs, schedules a zoom after the
    /// configured delay, replacing any zoom still pending. Must be called
    /// from within a tokio runtime when a zoom change is needed.
    pub fn on_location_change(&self, location: &Location) {
        self.cancel_pending();

        if let Err(e) = self.driver.pan_to(location.center) {
            warn!(code = %location.code, error = %e, "Viewport pan failed");
            return;
        }

        let current_zoom = match self.driver.zoom() {
            Ok(zoom) => zoom,
            Err(e) => {
                warn!(code = %location.code, error = %e, "Viewport zoom query failed");
                return;
            }
        };
        if current_zoom == location.zoom {
            return;
        }

        let token = CancellationToken::new();
        *self.pending_zoom.lock() = Some(token.clone());

        let driver = Arc::clone(&self.driver);
        let delay = self.zoom_delay;
        let target_zoom = location.zoom;
        let code = location.code.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = tokio::time::sleep(delay) => {
                    if let Err(e) = driver.set_zoom(target_zoom) {
                        warn!(code = %code, zoom = target_zoom, error = %e, "Viewport zoom failed");
                    }
                }
            }
        });
    }

    /// Cancel a zoom scheduled by [`on_location_change`](Self::on_location_change).
    pub fn cancel_pending(&self) {
        if let Some(token) = self.pending_zoom.lock().take() {
            token.cancel();
        }
    }
}

impl Drop for ViewportBinding {
    fn drop(&mut self) {
        self.cancel_pending();
        self.unbind();
    }
}

fn is_significant(event: &InteractionEvent) -> bool {
    match event.kind {
        InteractionKind::PointerMove => {
            event.movement_x.abs() >= POINTER_JITTER_THRESHOLD_PX
                || event.movement_y.abs() >= POINTER_JITTER_THRESHOLD_PX
        }
        _ => true,
    }
}
