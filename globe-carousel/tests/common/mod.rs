//! Recording fakes shared by the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use parking_lot::Mutex;

use globe_carousel::catalog::LatLng;
use globe_carousel::loader::MapSdk;
use globe_carousel::viewport::{
    DriverError, InteractionEvent, InteractionHandler, InteractionKind, InteractionTarget,
    ListenerId, ViewportDriver,
};
use globe_carousel::ViewportFactory;

pub const API_KEY: &str = "AIzaSyINTEGRATION-key_0123456789";

#[derive(Default)]
pub struct RecordingElement {
    next_id: AtomicU64,
    listeners: Mutex<HashMap<ListenerId, (InteractionKind, InteractionHandler)>>,
}

impl RecordingElement {
    pub fn fire(&self, event: InteractionEvent) {
        let handlers: Vec<InteractionHandler> = self
            .listeners
            .lock()
            .values()
            .filter(|(kind, _)| *kind == event.kind)
            .map(|(_, h)| Arc::clone(h))
            .collect();
        for handler in handlers {
            handler(&event);
        }
    }

    pub fn press(&self) {
        self.fire(InteractionEvent::new(InteractionKind::PointerDown));
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().len()
    }
}

impl InteractionTarget for RecordingElement {
    fn add_listener(&self, kind: InteractionKind, handler: InteractionHandler) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.listeners.lock().insert(id, (kind, handler));
        id
    }

    fn remove_listener(&self, id: ListenerId) {
        self.listeners.lock().remove(&id);
    }
}

pub struct RecordingDriver {
    pub pans: Mutex<Vec<LatLng>>,
    pub zooms: Mutex<Vec<i32>>,
    zoom: Mutex<i32>,
    pub element: Arc<RecordingElement>,
}

impl RecordingDriver {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            pans: Mutex::new(Vec::new()),
            zooms: Mutex::new(Vec::new()),
            zoom: Mutex::new(2),
            element: Arc::new(RecordingElement::default()),
        })
    }

    pub fn pan_count(&self) -> usize {
        self.pans.lock().len()
    }
}

impl ViewportDriver for RecordingDriver {
    fn pan_to(&self, point: LatLng) -> Result<(), DriverError> {
        self.pans.lock().push(point);
        Ok(())
    }

    fn set_zoom(&self, zoom: i32) -> Result<(), DriverError> {
        self.zooms.lock().push(zoom);
        *self.zoom.lock() = zoom;
        Ok(())
    }

    fn zoom(&self) -> Result<i32, DriverError> {
        Ok(*self.zoom.lock())
    }

    fn element(&self) -> Option<Arc<dyn InteractionTarget>> {
        Some(Arc::clone(&self.element) as Arc<dyn InteractionTarget>)
    }
}

pub struct SingleDriverFactory(pub Arc<RecordingDriver>);

impl ViewportFactory for SingleDriverFactory {
    fn create(&self) -> Result<Arc<dyn ViewportDriver>, DriverError> {
        Ok(Arc::clone(&self.0) as Arc<dyn ViewportDriver>)
    }
}

/// SDK whose acquisitions fail with the queued messages, then succeed.
pub struct ScriptedSdk {
    failures: Mutex<Vec<String>>,
    pub acquisitions: AtomicU64,
}

impl ScriptedSdk {
    pub fn new(failures: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            failures: Mutex::new(failures.iter().rev().map(|s| s.to_string()).collect()),
            acquisitions: AtomicU64::new(0),
        })
    }
}

impl MapSdk for ScriptedSdk {
    fn acquire(&self) -> BoxFuture<'_, Result<(), String>> {
        self.acquisitions.fetch_add(1, Ordering::SeqCst);
        let failure = self.failures.lock().pop();
        Box::pin(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            match failure {
                Some(message) => Err(message),
                None => Ok(()),
            }
        })
    }

    fn is_ready(&self) -> bool {
        true
    }
}
